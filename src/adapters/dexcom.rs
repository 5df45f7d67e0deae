//! Dexcom continuous-glucose-monitor adapter
//!
//! Parses the Dexcom CGM readings export. Intraday readings are averaged
//! per field onto the calendar date.

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

/// Dexcom export adapter
pub struct DexcomAdapter;

/// Columns the CGM export must carry
const EXPECTED_COLUMNS: &[&str] = &[
    "timestamp",
    "glucose_mg_dl",
    "time_in_range_pct",
    "gmi_percent",
    "coefficient_variation",
    "mean_glucose_mg_dl",
    "sensor_usage_pct",
];

impl SourceAdapter for DexcomAdapter {
    type Daily = DexcomDaily;

    const SOURCE: Source = Source::Dexcom;
    const EXPORT_PATH: &'static str = "dexcom/glucose_readings_oct2025.csv";

    fn load(&self, path: &Path) -> Result<Vec<DexcomDaily>, HarmonizeError> {
        let mut reader = csv::Reader::from_path(path)?;
        require_columns(reader.headers()?, Self::SOURCE, EXPECTED_COLUMNS)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<GlucoseRow>> = BTreeMap::new();
        for result in reader.deserialize::<GlucoseRow>() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    debug!(source = %Source::Dexcom, error = %err, "skipping malformed row");
                    continue;
                }
            };
            let Some(date) = parse_export_date(&row.timestamp) else {
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

/// One day of averaged CGM metrics
#[derive(Debug, Clone)]
pub struct DexcomDaily {
    pub date: NaiveDate,
    /// Average glucose (mg/dL)
    pub glucose_mg_dl: Option<f64>,
    /// Time in target range (percentage)
    pub time_in_range_pct: Option<f64>,
    /// Glucose management indicator (percentage)
    pub gmi_percent: Option<f64>,
    /// Glucose coefficient of variation
    pub coefficient_variation: Option<f64>,
    /// Sensor-reported mean glucose (mg/dL)
    pub mean_glucose_mg_dl: Option<f64>,
    /// Sensor wear time (percentage)
    pub sensor_usage_pct: Option<f64>,
}

impl DatedRecord for DexcomDaily {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl DexcomDaily {
    #[cfg(test)]
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            glucose_mg_dl: None,
            time_in_range_pct: None,
            gmi_percent: None,
            coefficient_variation: None,
            mean_glucose_mg_dl: None,
            sensor_usage_pct: None,
        }
    }
}

fn reduce_day(date: NaiveDate, rows: &[GlucoseRow]) -> DexcomDaily {
    DexcomDaily {
        date,
        glucose_mg_dl: mean(&field_values(rows, |r| r.glucose_mg_dl)),
        time_in_range_pct: mean(&field_values(rows, |r| r.time_in_range_pct)),
        gmi_percent: mean(&field_values(rows, |r| r.gmi_percent)),
        coefficient_variation: mean(&field_values(rows, |r| r.coefficient_variation)),
        mean_glucose_mg_dl: mean(&field_values(rows, |r| r.mean_glucose_mg_dl)),
        sensor_usage_pct: mean(&field_values(rows, |r| r.sensor_usage_pct)),
    }
}

// Raw export row

#[derive(Debug, Deserialize)]
struct GlucoseRow {
    timestamp: String,
    #[serde(deserialize_with = "de_lenient_f64")]
    glucose_mg_dl: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    time_in_range_pct: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    gmi_percent: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    coefficient_variation: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    mean_glucose_mg_dl: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    sensor_usage_pct: Option<f64>,
}
