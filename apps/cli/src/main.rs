mod config;
mod main_lib;

use clap::Parser;
use config::{Args, Config};
use main_lib::{init_tracing, run};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?.with_args(Args::parse());
    init_tracing();

    let summary = run(&config)?;
    tracing::info!(
        "Wrote {} yearly reports ({} realized records) to {}",
        summary.report_files.len(),
        summary.realized_records,
        config.output_dir.display()
    );
    if let Some(path) = &summary.open_positions_file {
        tracing::info!("Open positions written to {}", path.display());
    }
    if !summary.failures.is_empty() {
        tracing::warn!("{} codes were skipped", summary.failures.len());
    }
    Ok(())
}
