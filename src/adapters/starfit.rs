//! Starfit smart-scale adapter
//!
//! Parses the Starfit body-composition export. Scale readings are
//! point-in-time measurements, so the last reading of each day wins, never
//! an average. Most columns arrive as unit-suffixed strings ("172.4lb",
//! "18.2%"); units are stripped at parse time and pound masses converted to
//! kilograms.

use crate::error::HarmonizeError;
use crate::types::Source;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{
    de_lenient_f64, de_unit_f64, field_values, last_value, parse_export_date, require_columns,
    DatedRecord, SourceAdapter, LB_TO_KG,
};

/// Starfit export adapter
pub struct StarfitAdapter;

/// Columns the scale export must carry
const EXPECTED_COLUMNS: &[&str] = &[
    "Date",
    "Weight",
    "BMI",
    "Body Fat",
    "Heart Rate",
    "Cardiac Index",
    "Visceral Fat",
    "Body Water",
    "Muscle Mass",
    "Bone Mass",
    "BMR",
];

impl SourceAdapter for StarfitAdapter {
    type Daily = StarfitDaily;

    const SOURCE: Source = Source::Starfit;
    const EXPORT_PATH: &'static str = "starfit/Starfit-Tuck.csv";

    fn load(&self, path: &Path) -> Result<Vec<StarfitDaily>, HarmonizeError> {
        let mut reader = csv::Reader::from_path(path)?;
        require_columns(reader.headers()?, Self::SOURCE, EXPECTED_COLUMNS)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<ScaleRow>> = BTreeMap::new();
        for result in reader.deserialize::<ScaleRow>() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    debug!(source = %Source::Starfit, error = %err, "skipping malformed row");
                    continue;
                }
            };
            let Some(date) = parse_export_date(&row.date) else {
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

/// One day of scale readings (last measurement of the day)
#[derive(Debug, Clone)]
pub struct StarfitDaily {
    pub date: NaiveDate,
    /// Body weight (kg)
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    /// Body fat (percentage)
    pub body_fat_pct: Option<f64>,
    /// Heart rate at measurement (bpm)
    pub heart_rate_bpm: Option<f64>,
    /// Cardiac index (L/min/m²)
    pub cardiac_index: Option<f64>,
    pub visceral_fat_level: Option<f64>,
    /// Body water (percentage)
    pub body_water_pct: Option<f64>,
    /// Muscle mass (kg)
    pub muscle_mass_kg: Option<f64>,
    /// Bone mass (kg)
    pub bone_mass_kg: Option<f64>,
    /// Basal metabolic rate (kcal)
    pub bmr_kcal: Option<f64>,
}

impl DatedRecord for StarfitDaily {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl StarfitDaily {
    #[cfg(test)]
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            weight_kg: None,
            bmi: None,
            body_fat_pct: None,
            heart_rate_bpm: None,
            cardiac_index: None,
            visceral_fat_level: None,
            body_water_pct: None,
            muscle_mass_kg: None,
            bone_mass_kg: None,
            bmr_kcal: None,
        }
    }
}

fn reduce_day(date: NaiveDate, rows: &[ScaleRow]) -> StarfitDaily {
    StarfitDaily {
        date,
        weight_kg: last_value(&field_values(rows, |r| r.weight_lb)).map(|lb| lb * LB_TO_KG),
        bmi: last_value(&field_values(rows, |r| r.bmi)),
        body_fat_pct: last_value(&field_values(rows, |r| r.body_fat_pct)),
        heart_rate_bpm: last_value(&field_values(rows, |r| r.heart_rate_bpm)),
        cardiac_index: last_value(&field_values(rows, |r| r.cardiac_index)),
        visceral_fat_level: last_value(&field_values(rows, |r| r.visceral_fat)),
        body_water_pct: last_value(&field_values(rows, |r| r.body_water_pct)),
        muscle_mass_kg: last_value(&field_values(rows, |r| r.muscle_mass_lb)).map(|lb| lb * LB_TO_KG),
        bone_mass_kg: last_value(&field_values(rows, |r| r.bone_mass_lb)).map(|lb| lb * LB_TO_KG),
        bmr_kcal: last_value(&field_values(rows, |r| r.bmr_kcal)),
    }
}

// Raw export row; masses in pounds, several columns unit-suffixed

#[derive(Debug, Deserialize)]
struct ScaleRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Weight", deserialize_with = "de_unit_f64")]
    weight_lb: Option<f64>,
    #[serde(rename = "BMI", deserialize_with = "de_lenient_f64")]
    bmi: Option<f64>,
    #[serde(rename = "Body Fat", deserialize_with = "de_unit_f64")]
    body_fat_pct: Option<f64>,
    #[serde(rename = "Heart Rate", deserialize_with = "de_unit_f64")]
    heart_rate_bpm: Option<f64>,
    #[serde(rename = "Cardiac Index", deserialize_with = "de_unit_f64")]
    cardiac_index: Option<f64>,
    #[serde(rename = "Visceral Fat", deserialize_with = "de_lenient_f64")]
    visceral_fat: Option<f64>,
    #[serde(rename = "Body Water", deserialize_with = "de_unit_f64")]
    body_water_pct: Option<f64>,
    #[serde(rename = "Muscle Mass", deserialize_with = "de_unit_f64")]
    muscle_mass_lb: Option<f64>,
    #[serde(rename = "Bone Mass", deserialize_with = "de_unit_f64")]
    bone_mass_lb: Option<f64>,
    #[serde(rename = "BMR", deserialize_with = "de_unit_f64")]
    bmr_kcal: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Date,Weight,BMI,Body Fat,Heart Rate,Cardiac Index,Visceral Fat,Body Water,Muscle Mass,Bone Mass,BMR";

    fn write_export(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_unit_stripping_and_kg_conversion() {
        let file = write_export(&[
            "2025-10-01,172.4lb,24.1,18.2%,62bpm,3.1L/Min/㎡,7,55%,130.0lb,7.5lb,1700kcal",
        ]);
        let days = StarfitAdapter.load(file.path()).unwrap();

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert!((day.weight_kg.unwrap() - 172.4 * LB_TO_KG).abs() < 1e-9);
        assert_eq!(day.bmi, Some(24.1));
        assert_eq!(day.body_fat_pct, Some(18.2));
        assert_eq!(day.heart_rate_bpm, Some(62.0));
        assert_eq!(day.cardiac_index, Some(3.1));
        assert_eq!(day.body_water_pct, Some(55.0));
        assert!((day.muscle_mass_kg.unwrap() - 130.0 * LB_TO_KG).abs() < 1e-9);
        assert!((day.bone_mass_kg.unwrap() - 7.5 * LB_TO_KG).abs() < 1e-9);
        assert_eq!(day.bmr_kcal, Some(1700.0));
    }

    #[test]
    fn test_last_measurement_of_day_wins() {
        let file = write_export(&[
            "2025-10-01,172.4lb,24.1,18.2%,62bpm,3.1L/Min/㎡,7,55%,130.0lb,7.5lb,1700kcal",
            "2025-10-01,171.0lb,24.0,18.0%,64bpm,3.2L/Min/㎡,7,56%,129.5lb,7.5lb,1695kcal",
        ]);
        let days = StarfitAdapter.load(file.path()).unwrap();

        assert_eq!(days.len(), 1);
        assert!((days[0].weight_kg.unwrap() - 171.0 * LB_TO_KG).abs() < 1e-9);
        assert_eq!(days[0].heart_rate_bpm, Some(64.0));
    }

    #[test]
    fn test_garbled_measurement_is_null() {
        let file = write_export(&[
            "2025-10-01,err,24.1,18.2%,62bpm,3.1L/Min/㎡,7,55%,130.0lb,7.5lb,1700kcal",
        ]);
        let days = StarfitAdapter.load(file.path()).unwrap();

        assert_eq!(days[0].weight_kg, None);
        assert_eq!(days[0].bmi, Some(24.1));
    }

    #[test]
    fn test_missing_column_fails_whole_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Weight").unwrap();
        writeln!(file, "2025-10-01,172.4lb").unwrap();

        let err = StarfitAdapter.load(file.path()).unwrap_err();
        assert!(matches!(err, HarmonizeError::MissingColumn { .. }));
    }
}
