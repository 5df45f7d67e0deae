//! Source export adapters
//!
//! One adapter per device feed. Each parses that device's raw CSV export,
//! resamples it to one typed row per calendar date, and emits a per-source
//! daily table in source-native fields. Adapters are independent and
//! side-effect-free; any I/O or schema failure is returned as an error and
//! degraded to an empty table by the pipeline, never raised further.

mod dexcom;
mod elitehrv;
mod pison;
mod starfit;
mod whoop;

pub use dexcom::{DexcomAdapter, DexcomDaily};
pub use elitehrv::{ElitehrvAdapter, ElitehrvDaily};
pub use pison::{PisonAdapter, PisonDaily};
pub use starfit::{StarfitAdapter, StarfitDaily};
pub use whoop::{WhoopAdapter, WhoopDaily};

use crate::error::HarmonizeError;
use crate::types::Source;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;

/// Trait for source export adapters
pub trait SourceAdapter {
    /// Daily table row type this adapter produces
    type Daily: DatedRecord;

    /// Source this adapter covers
    const SOURCE: Source;

    /// Export location relative to the data directory
    const EXPORT_PATH: &'static str;

    /// Parse the raw export into one record per calendar date, sorted by date
    fn load(&self, path: &Path) -> Result<Vec<Self::Daily>, HarmonizeError>;
}

/// A record keyed by calendar date
pub trait DatedRecord {
    fn date(&self) -> NaiveDate;
}

/// Timestamp layouts seen across the five exports
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Pounds to kilograms
pub(crate) const LB_TO_KG: f64 = 0.453592;

/// Parse an export timestamp into its calendar date.
///
/// Timezone-naive local truncation: whatever wall-clock date the export
/// recorded is the date the reading belongs to. Returns `None` for layouts
/// none of the known formats match.
pub(crate) fn parse_export_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

/// Lenient numeric parse: unparseable values become null, never an error
pub(crate) fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// Parse the numeric prefix of a unit-suffixed measurement
/// (e.g. "172.4lb", "18.2%", "3.1L/Min/㎡").
pub(crate) fn parse_unit_f64(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        let numeric = c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'));
        if !numeric {
            break;
        }
        end = i + c.len_utf8();
    }
    trimmed[..end].parse().ok()
}

/// Serde helper: deserialize a CSV field as a lenient numeric value
pub(crate) fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_f64))
}

/// Serde helper: deserialize a CSV field as a unit-suffixed numeric value
pub(crate) fn de_unit_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_unit_f64))
}

/// Collect the non-null values of one field across a day's raw rows
pub(crate) fn field_values<T>(rows: &[T], get: impl Fn(&T) -> Option<f64>) -> Vec<f64> {
    rows.iter().filter_map(get).collect()
}

/// Daily mean; null when no values survived parsing
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Daily sum; null when no values survived parsing
pub(crate) fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// Daily peak
pub(crate) fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Last measurement of the day wins (point-in-time readings)
pub(crate) fn last_value(values: &[f64]) -> Option<f64> {
    values.last().copied()
}

/// Verify the export carries every expected column before parsing rows.
///
/// A missing column degrades the whole source rather than producing a
/// partial schema downstream.
pub(crate) fn require_columns(
    headers: &csv::StringRecord,
    source: Source,
    expected: &[&str],
) -> Result<(), HarmonizeError> {
    for column in expected {
        if !headers.iter().any(|h| h == *column) {
            return Err(HarmonizeError::MissingColumn {
                source,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        assert_eq!(parse_export_date("2025-10-03 06:30:00"), Some(expected));
        assert_eq!(parse_export_date("2025-10-03T06:30:00.000"), Some(expected));
        assert_eq!(parse_export_date("2025-10-03T06:30:00Z"), Some(expected));
        assert_eq!(parse_export_date("10/03/2025 06:30"), Some(expected));
        assert_eq!(parse_export_date("2025-10-03"), Some(expected));
        assert_eq!(parse_export_date("10/03/2025"), Some(expected));
        assert_eq!(parse_export_date("not a date"), None);
        assert_eq!(parse_export_date(""), None);
    }

    #[test]
    fn test_parse_unit_f64() {
        assert_eq!(parse_unit_f64("172.4lb"), Some(172.4));
        assert_eq!(parse_unit_f64("18.2%"), Some(18.2));
        assert_eq!(parse_unit_f64("62bpm"), Some(62.0));
        assert_eq!(parse_unit_f64("3.1L/Min/㎡"), Some(3.1));
        assert_eq!(parse_unit_f64("1700kcal"), Some(1700.0));
        assert_eq!(parse_unit_f64("-0.4C"), Some(-0.4));
        assert_eq!(parse_unit_f64("lb"), None);
        assert_eq!(parse_unit_f64(""), None);
    }

    #[test]
    fn test_aggregators() {
        assert_eq!(mean(&[60.0, 62.0, 64.0]), Some(62.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(sum(&[100.0, 250.0]), Some(350.0));
        assert_eq!(sum(&[]), None);
        assert_eq!(max(&[120.0, 165.0, 140.0]), Some(165.0));
        assert_eq!(max(&[]), None);
        assert_eq!(last_value(&[80.1, 80.4]), Some(80.4));
        assert_eq!(last_value(&[]), None);
    }

    #[test]
    fn test_require_columns_reports_missing() {
        let headers = csv::StringRecord::from(vec!["timestamp", "glucose_mg_dl"]);
        assert!(require_columns(&headers, Source::Dexcom, &["timestamp"]).is_ok());

        let err = require_columns(&headers, Source::Dexcom, &["timestamp", "gmi_percent"])
            .unwrap_err();
        match err {
            HarmonizeError::MissingColumn { source, column } => {
                assert_eq!(source, Source::Dexcom);
                assert_eq!(column, "gmi_percent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
