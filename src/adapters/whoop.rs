//! WHOOP recovery-tracker adapter
//!
//! Parses the WHOOP physiological-cycles export. Cycles sharing a calendar
//! date are reduced per field (means for rates and scores, sums for
//! durations and energy, max for peak heart rate), then the sleep composites
//! are derived from the aggregated stage durations.

use crate::error::HarmonizeError;
use crate::types::Source;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{
    de_lenient_f64, field_values, max, mean, parse_export_date, require_columns, sum,
    DatedRecord, SourceAdapter,
};

/// WHOOP export adapter
pub struct WhoopAdapter;

/// Columns the physiological-cycles export must carry
const EXPECTED_COLUMNS: &[&str] = &[
    "Cycle start time",
    "Recovery score %",
    "Resting heart rate (bpm)",
    "Heart rate variability (ms)",
    "Skin temp (celsius)",
    "Blood oxygen %",
    "Day Strain",
    "Energy burned (cal)",
    "Max HR (bpm)",
    "Average HR (bpm)",
    "Sleep performance %",
    "Respiratory rate (rpm)",
    "Asleep duration (min)",
    "In bed duration (min)",
    "Light sleep duration (min)",
    "Deep (SWS) duration (min)",
    "REM duration (min)",
    "Awake duration (min)",
    "Sleep need (min)",
    "Sleep debt (min)",
    "Sleep efficiency %",
    "Sleep consistency %",
];

impl SourceAdapter for WhoopAdapter {
    type Daily = WhoopDaily;

    const SOURCE: Source = Source::Whoop;
    const EXPORT_PATH: &'static str = "whoop/physiological_cycles.csv";

    fn load(&self, path: &Path) -> Result<Vec<WhoopDaily>, HarmonizeError> {
        let mut reader = csv::Reader::from_path(path)?;
        require_columns(reader.headers()?, Self::SOURCE, EXPECTED_COLUMNS)?;

        // Group cycles by calendar date
        let mut by_date: BTreeMap<NaiveDate, Vec<CycleRow>> = BTreeMap::new();
        for result in reader.deserialize::<CycleRow>() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    debug!(source = %Source::Whoop, error = %err, "skipping malformed row");
                    continue;
                }
            };
            let Some(date) = parse_export_date(&row.cycle_start_time) else {
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

/// One day of aggregated WHOOP data
#[derive(Debug, Clone)]
pub struct WhoopDaily {
    pub date: NaiveDate,
    /// Recovery score (percentage)
    pub recovery_score_pct: Option<f64>,
    /// Resting heart rate (bpm)
    pub resting_hr_bpm: Option<f64>,
    /// Heart rate variability (ms)
    pub hrv_ms: Option<f64>,
    /// Skin temperature (celsius)
    pub skin_temp_celsius: Option<f64>,
    /// Blood oxygen saturation (percentage)
    pub blood_oxygen_pct: Option<f64>,
    /// Day strain (0-21 scale)
    pub day_strain: Option<f64>,
    /// Energy burned (kcal, daily total)
    pub energy_burned_cal: Option<f64>,
    /// Peak heart rate (bpm)
    pub max_hr_bpm: Option<f64>,
    /// Average heart rate (bpm)
    pub avg_hr_bpm: Option<f64>,
    /// Sleep performance (percentage)
    pub sleep_performance_pct: Option<f64>,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate_rpm: Option<f64>,
    /// Asleep duration (minutes, daily total)
    pub asleep_duration_min: Option<f64>,
    /// In-bed duration (minutes, daily total)
    pub in_bed_duration_min: Option<f64>,
    /// Light sleep duration (minutes, daily total)
    pub light_sleep_min: Option<f64>,
    /// Deep (SWS) sleep duration (minutes, daily total)
    pub deep_sleep_min: Option<f64>,
    /// REM sleep duration (minutes, daily total)
    pub rem_sleep_min: Option<f64>,
    /// Awake duration during sleep (minutes, daily total)
    pub awake_duration_min: Option<f64>,
    /// Sleep need (minutes)
    pub sleep_need_min: Option<f64>,
    /// Sleep debt (minutes)
    pub sleep_debt_min: Option<f64>,
    /// Sleep efficiency (percentage)
    pub sleep_efficiency_pct: Option<f64>,
    /// Sleep consistency (percentage)
    pub sleep_consistency_pct: Option<f64>,
    /// Total sleep duration (hours, derived from asleep duration)
    pub sleep_duration_hours: Option<f64>,
    /// Deep sleep share of total sleep (percentage, derived)
    pub deep_sleep_pct: Option<f64>,
    /// REM sleep share of total sleep (percentage, derived)
    pub rem_sleep_pct: Option<f64>,
    /// Sleep debt (hours, derived)
    pub sleep_debt_hours: Option<f64>,
}

impl DatedRecord for WhoopDaily {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl WhoopDaily {
    #[cfg(test)]
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            recovery_score_pct: None,
            resting_hr_bpm: None,
            hrv_ms: None,
            skin_temp_celsius: None,
            blood_oxygen_pct: None,
            day_strain: None,
            energy_burned_cal: None,
            max_hr_bpm: None,
            avg_hr_bpm: None,
            sleep_performance_pct: None,
            respiratory_rate_rpm: None,
            asleep_duration_min: None,
            in_bed_duration_min: None,
            light_sleep_min: None,
            deep_sleep_min: None,
            rem_sleep_min: None,
            awake_duration_min: None,
            sleep_need_min: None,
            sleep_debt_min: None,
            sleep_efficiency_pct: None,
            sleep_consistency_pct: None,
            sleep_duration_hours: None,
            deep_sleep_pct: None,
            rem_sleep_pct: None,
            sleep_debt_hours: None,
        }
    }
}

fn reduce_day(date: NaiveDate, rows: &[CycleRow]) -> WhoopDaily {
    let asleep_min = sum(&field_values(rows, |r| r.asleep_duration_min));
    let deep_min = sum(&field_values(rows, |r| r.deep_sleep_min));
    let rem_min = sum(&field_values(rows, |r| r.rem_sleep_min));
    let debt_min = mean(&field_values(rows, |r| r.sleep_debt_min));

    WhoopDaily {
        date,
        recovery_score_pct: mean(&field_values(rows, |r| r.recovery_score_pct)),
        resting_hr_bpm: mean(&field_values(rows, |r| r.resting_hr_bpm)),
        hrv_ms: mean(&field_values(rows, |r| r.hrv_ms)),
        skin_temp_celsius: mean(&field_values(rows, |r| r.skin_temp_celsius)),
        blood_oxygen_pct: mean(&field_values(rows, |r| r.blood_oxygen_pct)),
        day_strain: mean(&field_values(rows, |r| r.day_strain)),
        energy_burned_cal: sum(&field_values(rows, |r| r.energy_burned_cal)),
        max_hr_bpm: max(&field_values(rows, |r| r.max_hr_bpm)),
        avg_hr_bpm: mean(&field_values(rows, |r| r.avg_hr_bpm)),
        sleep_performance_pct: mean(&field_values(rows, |r| r.sleep_performance_pct)),
        respiratory_rate_rpm: mean(&field_values(rows, |r| r.respiratory_rate_rpm)),
        asleep_duration_min: asleep_min,
        in_bed_duration_min: sum(&field_values(rows, |r| r.in_bed_duration_min)),
        light_sleep_min: sum(&field_values(rows, |r| r.light_sleep_min)),
        deep_sleep_min: deep_min,
        rem_sleep_min: rem_min,
        awake_duration_min: sum(&field_values(rows, |r| r.awake_duration_min)),
        sleep_need_min: mean(&field_values(rows, |r| r.sleep_need_min)),
        sleep_debt_min: debt_min,
        sleep_efficiency_pct: mean(&field_values(rows, |r| r.sleep_efficiency_pct)),
        sleep_consistency_pct: mean(&field_values(rows, |r| r.sleep_consistency_pct)),
        sleep_duration_hours: asleep_min.map(|m| m / 60.0),
        deep_sleep_pct: stage_share(deep_min, asleep_min),
        rem_sleep_pct: stage_share(rem_min, asleep_min),
        sleep_debt_hours: debt_min.map(|m| m / 60.0),
    }
}

/// Sleep-stage share of total asleep time (percentage)
fn stage_share(stage_min: Option<f64>, asleep_min: Option<f64>) -> Option<f64> {
    match (stage_min, asleep_min) {
        (Some(stage), Some(total)) if total > 0.0 => Some(stage / total * 100.0),
        _ => None,
    }
}

// Raw export row

#[derive(Debug, Deserialize)]
struct CycleRow {
    #[serde(rename = "Cycle start time")]
    cycle_start_time: String,
    #[serde(rename = "Recovery score %", deserialize_with = "de_lenient_f64")]
    recovery_score_pct: Option<f64>,
    #[serde(rename = "Resting heart rate (bpm)", deserialize_with = "de_lenient_f64")]
    resting_hr_bpm: Option<f64>,
    #[serde(rename = "Heart rate variability (ms)", deserialize_with = "de_lenient_f64")]
    hrv_ms: Option<f64>,
    #[serde(rename = "Skin temp (celsius)", deserialize_with = "de_lenient_f64")]
    skin_temp_celsius: Option<f64>,
    #[serde(rename = "Blood oxygen %", deserialize_with = "de_lenient_f64")]
    blood_oxygen_pct: Option<f64>,
    #[serde(rename = "Day Strain", deserialize_with = "de_lenient_f64")]
    day_strain: Option<f64>,
    #[serde(rename = "Energy burned (cal)", deserialize_with = "de_lenient_f64")]
    energy_burned_cal: Option<f64>,
    #[serde(rename = "Max HR (bpm)", deserialize_with = "de_lenient_f64")]
    max_hr_bpm: Option<f64>,
    #[serde(rename = "Average HR (bpm)", deserialize_with = "de_lenient_f64")]
    avg_hr_bpm: Option<f64>,
    #[serde(rename = "Sleep performance %", deserialize_with = "de_lenient_f64")]
    sleep_performance_pct: Option<f64>,
    #[serde(rename = "Respiratory rate (rpm)", deserialize_with = "de_lenient_f64")]
    respiratory_rate_rpm: Option<f64>,
    #[serde(rename = "Asleep duration (min)", deserialize_with = "de_lenient_f64")]
    asleep_duration_min: Option<f64>,
    #[serde(rename = "In bed duration (min)", deserialize_with = "de_lenient_f64")]
    in_bed_duration_min: Option<f64>,
    #[serde(rename = "Light sleep duration (min)", deserialize_with = "de_lenient_f64")]
    light_sleep_min: Option<f64>,
    #[serde(rename = "Deep (SWS) duration (min)", deserialize_with = "de_lenient_f64")]
    deep_sleep_min: Option<f64>,
    #[serde(rename = "REM duration (min)", deserialize_with = "de_lenient_f64")]
    rem_sleep_min: Option<f64>,
    #[serde(rename = "Awake duration (min)", deserialize_with = "de_lenient_f64")]
    awake_duration_min: Option<f64>,
    #[serde(rename = "Sleep need (min)", deserialize_with = "de_lenient_f64")]
    sleep_need_min: Option<f64>,
    #[serde(rename = "Sleep debt (min)", deserialize_with = "de_lenient_f64")]
    sleep_debt_min: Option<f64>,
    #[serde(rename = "Sleep efficiency %", deserialize_with = "de_lenient_f64")]
    sleep_efficiency_pct: Option<f64>,
    #[serde(rename = "Sleep consistency %", deserialize_with = "de_lenient_f64")]
    sleep_consistency_pct: Option<f64>,
}
