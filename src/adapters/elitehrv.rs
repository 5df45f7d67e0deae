//! EliteHRV chest-strap adapter
//!
//! Parses the EliteHRV readings export (recorded via a Polar strap). Multiple
//! readings per day are averaged per field.

use crate::error::HarmonizeError;
use crate::types::Source;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{
    de_lenient_f64, field_values, mean, parse_export_date, require_columns, DatedRecord,
    SourceAdapter,
};

/// EliteHRV export adapter
pub struct ElitehrvAdapter;

/// Columns the readings export must carry
const EXPECTED_COLUMNS: &[&str] = &[
    "Date Time Start",
    "HRV",
    "Morning Readiness",
    "HR",
    "Rmssd",
    "Sdnn",
    "LF/HF Ratio",
    "Total Power",
];

impl SourceAdapter for ElitehrvAdapter {
    type Daily = ElitehrvDaily;

    const SOURCE: Source = Source::EliteHrv;
    const EXPORT_PATH: &'static str = "polar/elitehrv_03292024.csv";

    fn load(&self, path: &Path) -> Result<Vec<ElitehrvDaily>, HarmonizeError> {
        let mut reader = csv::Reader::from_path(path)?;
        require_columns(reader.headers()?, Self::SOURCE, EXPECTED_COLUMNS)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<ReadingRow>> = BTreeMap::new();
        for result in reader.deserialize::<ReadingRow>() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    debug!(source = %Source::EliteHrv, error = %err, "skipping malformed row");
                    continue;
                }
            };
            let Some(date) = parse_export_date(&row.date_time_start) else {
                continue;
            };
            by_date.entry(date).or_default().push(row);
        }

        Ok(by_date
            .into_iter()
            .map(|(date, rows)| reduce_day(date, &rows))
            .collect())
    }
}

/// One day of averaged HRV readings
#[derive(Debug, Clone)]
pub struct ElitehrvDaily {
    pub date: NaiveDate,
    /// EliteHRV score (vendor scale)
    pub hrv: Option<f64>,
    /// Morning readiness (1-10)
    pub morning_readiness: Option<f64>,
    /// Heart rate during reading (bpm)
    pub hr_bpm: Option<f64>,
    /// RMSSD (ms)
    pub rmssd: Option<f64>,
    /// SDNN (ms)
    pub sdnn: Option<f64>,
    /// Low/high frequency power ratio
    pub lf_hf_ratio: Option<f64>,
    /// Total spectral power
    pub total_power: Option<f64>,
}

impl DatedRecord for ElitehrvDaily {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl ElitehrvDaily {
    #[cfg(test)]
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            hrv: None,
            morning_readiness: None,
            hr_bpm: None,
            rmssd: None,
            sdnn: None,
            lf_hf_ratio: None,
            total_power: None,
        }
    }
}

fn reduce_day(date: NaiveDate, rows: &[ReadingRow]) -> ElitehrvDaily {
    ElitehrvDaily {
        date,
        hrv: mean(&field_values(rows, |r| r.hrv)),
        morning_readiness: mean(&field_values(rows, |r| r.morning_readiness)),
        hr_bpm: mean(&field_values(rows, |r| r.hr)),
        rmssd: mean(&field_values(rows, |r| r.rmssd)),
        sdnn: mean(&field_values(rows, |r| r.sdnn)),
        lf_hf_ratio: mean(&field_values(rows, |r| r.lf_hf_ratio)),
        total_power: mean(&field_values(rows, |r| r.total_power)),
    }
}

// Raw export row

#[derive(Debug, Deserialize)]
struct ReadingRow {
    #[serde(rename = "Date Time Start")]
    date_time_start: String,
    #[serde(rename = "HRV", deserialize_with = "de_lenient_f64")]
    hrv: Option<f64>,
    #[serde(rename = "Morning Readiness", deserialize_with = "de_lenient_f64")]
    morning_readiness: Option<f64>,
    #[serde(rename = "HR", deserialize_with = "de_lenient_f64")]
    hr: Option<f64>,
    #[serde(rename = "Rmssd", deserialize_with = "de_lenient_f64")]
    rmssd: Option<f64>,
    #[serde(rename = "Sdnn", deserialize_with = "de_lenient_f64")]
    sdnn: Option<f64>,
    #[serde(rename = "LF/HF Ratio", deserialize_with = "de_lenient_f64")]
    lf_hf_ratio: Option<f64>,
    #[serde(rename = "Total Power", deserialize_with = "de_lenient_f64")]
    total_power: Option<f64>,
}
