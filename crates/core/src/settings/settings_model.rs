//! Run settings: output note texts and side spelling aliases.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{Error, Result};
use crate::trades::TradeSide;

/// Note texts written on realized records and summary rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Remarks {
    pub sell_without_position: String,
    pub oversold_position: String,
    pub short_close: String,
    pub expired_worthless: String,
    pub short_expired: String,
    pub expiration_unparsable: String,
    /// `{year}` and `{currency}` are substituted
    pub summary_label: String,
    /// `{fee}` and `{currency}` are substituted
    pub summary_note: String,
    /// `{count}` is substituted; appended to the summary note when the group
    /// contains manual-review rows
    pub summary_review_suffix: String,
}

impl Default for Remarks {
    fn default() -> Self {
        Remarks {
            sell_without_position: "sell with no position — needs manual review".to_string(),
            oversold_position: "oversold position — needs manual review".to_string(),
            short_close: "short close".to_string(),
            expired_worthless: "expired worthless".to_string(),
            short_expired: "short expired".to_string(),
            expiration_unparsable: "expiration date unparsable, last trade date used"
                .to_string(),
            summary_label: "{year} annual summary ({currency})".to_string(),
            summary_note: "profit net of fees {fee} ({currency})".to_string(),
            summary_review_suffix: "; approximate, {count} manual-review rows included"
                .to_string(),
        }
    }
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub remarks: Remarks,
    /// Extra broker spellings, keyed by lower-cased spelling
    pub side_aliases: HashMap<String, TradeSide>,
    /// Zero the fee on all but the first fill of a multi-leg order
    pub dedupe_combo_fees: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            remarks: Remarks::default(),
            side_aliases: HashMap::new(),
            dedupe_combo_fees: true,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings: Settings = serde_json::from_str(&content)?;
        info!("Loaded settings from {}", path.display());
        debug!(
            "{} custom side aliases, combo fee de-duplication {}",
            settings.side_aliases.len(),
            if settings.dedupe_combo_fees { "on" } else { "off" }
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "remarks": { "shortClose": "buy to close" },
            "sideAliases": { "cover": "BUY" }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.remarks.short_close, "buy to close");
        assert_eq!(
            settings.remarks.expired_worthless,
            Remarks::default().expired_worthless
        );
        assert_eq!(settings.side_aliases.get("cover"), Some(&TradeSide::Buy));
        assert!(settings.dedupe_combo_fees);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "dedupeComboFees": false }}"#).unwrap();
        let settings = Settings::from_json_file(file.path()).unwrap();
        assert!(!settings.dedupe_combo_fees);
        assert_eq!(settings.remarks, Remarks::default());
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = Settings::from_json_file("/nonexistent/gainbook.json").unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }
}
