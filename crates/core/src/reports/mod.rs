//! Yearly realized gain tables with per-currency annual summaries.

mod report_aggregator;
mod report_model;
pub mod report_writer;

pub use report_aggregator::*;
pub use report_model::*;
pub use report_writer::{
    report_file_name, write_open_positions, write_open_positions_file, write_year_report,
    write_year_reports, OPEN_POSITIONS_FILE_NAME, REPORT_HEADERS,
};
