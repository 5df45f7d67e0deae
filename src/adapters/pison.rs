//! Pison neuromuscular-wristband adapter
//!
//! Parses the Pison EMG readings export. Scores and physiological rates are
//! averaged onto the calendar date; steps and calories accumulate.

use crate::error::HarmonizeError;
use crate::types::Source;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{
    de_lenient_f64, field_values, mean, parse_export_date, require_columns, sum, DatedRecord,
    SourceAdapter,
};

/// Pison export adapter
pub struct PisonAdapter;

/// Columns the EMG export must carry
const EXPECTED_COLUMNS: &[&str] = &[
    "timestamp",
    "readiness_score",
    "mental_agility_score",
    "focus_score",
    "neural_sleep_quality",
    "neural_sleep_debt_min",
    "sleep_efficiency_pct",
    "hrv_ms",
    "heart_rate_bpm",
    "steps_count",
    "calories_burned",
    "eda_stress_level",
    "skin_temp_celsius",
    "circadian_compliance_pct",
];

impl SourceAdapter for PisonAdapter {
    type Daily = PisonDaily;

    const SOURCE: Source = Source::Pison;
    const EXPORT_PATH: &'static str = "pison/emg_readings_oct2025.csv";

    fn load(&self, path: &Path) -> Result<Vec<PisonDaily>, HarmonizeError> {
        let mut reader = csv::Reader::from_path(path)?;
        require_columns(reader.headers()?, Self::SOURCE, EXPECTED_COLUMNS)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<EmgRow>> = BTreeMap::new();
        for result in reader.deserialize::<EmgRow>() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    debug!(source = %Source::Pison, error = %err, "skipping malformed row");
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

/// One day of aggregated wristband data
#[derive(Debug, Clone)]
pub struct PisonDaily {
    pub date: NaiveDate,
    /// Cognitive readiness score
    pub readiness_score: Option<f64>,
    pub mental_agility_score: Option<f64>,
    pub focus_score: Option<f64>,
    /// Neural sleep quality (vendor scale)
    pub neural_sleep_quality: Option<f64>,
    /// Neural sleep debt (minutes)
    pub neural_sleep_debt_min: Option<f64>,
    /// Sleep efficiency (percentage)
    pub sleep_efficiency_pct: Option<f64>,
    /// Heart rate variability (ms)
    pub hrv_ms: Option<f64>,
    /// Heart rate (bpm)
    pub heart_rate_bpm: Option<f64>,
    /// Steps (daily total)
    pub steps_count: Option<f64>,
    /// Calories burned (kcal, daily total)
    pub calories_burned: Option<f64>,
    /// Electrodermal stress level (device scale)
    pub eda_stress_level: Option<f64>,
    /// Skin temperature (celsius)
    pub skin_temp_celsius: Option<f64>,
    /// Circadian compliance (percentage)
    pub circadian_compliance_pct: Option<f64>,
}

impl DatedRecord for PisonDaily {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl PisonDaily {
    #[cfg(test)]
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            readiness_score: None,
            mental_agility_score: None,
            focus_score: None,
            neural_sleep_quality: None,
            neural_sleep_debt_min: None,
            sleep_efficiency_pct: None,
            hrv_ms: None,
            heart_rate_bpm: None,
            steps_count: None,
            calories_burned: None,
            eda_stress_level: None,
            skin_temp_celsius: None,
            circadian_compliance_pct: None,
        }
    }
}

fn reduce_day(date: NaiveDate, rows: &[EmgRow]) -> PisonDaily {
    PisonDaily {
        date,
        readiness_score: mean(&field_values(rows, |r| r.readiness_score)),
        mental_agility_score: mean(&field_values(rows, |r| r.mental_agility_score)),
        focus_score: mean(&field_values(rows, |r| r.focus_score)),
        neural_sleep_quality: mean(&field_values(rows, |r| r.neural_sleep_quality)),
        neural_sleep_debt_min: mean(&field_values(rows, |r| r.neural_sleep_debt_min)),
        sleep_efficiency_pct: mean(&field_values(rows, |r| r.sleep_efficiency_pct)),
        hrv_ms: mean(&field_values(rows, |r| r.hrv_ms)),
        heart_rate_bpm: mean(&field_values(rows, |r| r.heart_rate_bpm)),
        steps_count: sum(&field_values(rows, |r| r.steps_count)),
        calories_burned: sum(&field_values(rows, |r| r.calories_burned)),
        eda_stress_level: mean(&field_values(rows, |r| r.eda_stress_level)),
        skin_temp_celsius: mean(&field_values(rows, |r| r.skin_temp_celsius)),
        circadian_compliance_pct: mean(&field_values(rows, |r| r.circadian_compliance_pct)),
    }
}

// Raw export row

#[derive(Debug, Deserialize)]
struct EmgRow {
    timestamp: String,
    #[serde(deserialize_with = "de_lenient_f64")]
    readiness_score: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    mental_agility_score: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    focus_score: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    neural_sleep_quality: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    neural_sleep_debt_min: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    sleep_efficiency_pct: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    hrv_ms: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    heart_rate_bpm: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    steps_count: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    calories_burned: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    eda_stress_level: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    skin_temp_celsius: Option<f64>,
    #[serde(deserialize_with = "de_lenient_f64")]
    circadian_compliance_pct: Option<f64>,
}
