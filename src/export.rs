//! Output table encoding
//!
//! Writes the unified table as one delimited file, one row per date,
//! ascending. Column names and order are a compatibility contract with the
//! dashboard and chat context builder; `UNIFIED_COLUMNS` is the canonical
//! statement of that contract and a test pins the record serialization to
//! it. Null numerics serialize as empty fields.

use crate::error::HarmonizeError;
use crate::types::UnifiedDailyRecord;
use std::io::Write;
use std::path::Path;

/// The unified schema, in output order
pub const UNIFIED_COLUMNS: &[&str] = &[
    "date",
    "patient_id",
    "data_quality_score",
    // Cardiovascular health
    "avg_resting_hr_bpm",
    "avg_hrv_ms",
    "hrv_trend",
    "cardiac_index",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    // Metabolic health
    "avg_glucose_mg_dl",
    "time_in_range_pct",
    "gmi_percent",
    "glucose_variability_cv",
    "insulin_sensitivity_index",
    // Body composition
    "weight_kg",
    "bmi",
    "body_fat_pct",
    "muscle_mass_kg",
    "visceral_fat_level",
    "bone_mass_kg",
    "body_water_pct",
    // Sleep & recovery
    "sleep_duration_hours",
    "sleep_efficiency_pct",
    "sleep_consistency_pct",
    "deep_sleep_pct",
    "rem_sleep_pct",
    "sleep_debt_hours",
    "recovery_score_pct",
    // Cognitive & neurological
    "cognitive_readiness_score",
    "mental_agility_score",
    "focus_score",
    "stress_level",
    "circadian_compliance_pct",
    // Activity & fitness
    "daily_strain_score",
    "energy_expenditure_kcal",
    "steps_count",
    "exercise_duration_min",
    "cardio_fitness_score",
    // Vital signs
    "skin_temperature_celsius",
    "blood_oxygen_pct",
    "respiratory_rate_rpm",
    // Clinical risk scores
    "cardiovascular_risk_score",
    "neurological_risk_score",
    "metabolic_risk_score",
    "skeletal_risk_score",
    // Clinical indicators
    "inflammation_markers",
    "oxidative_stress_level",
    "autonomic_balance_score",
    "metabolic_age",
    // Trend indicators
    "weight_trend_30d",
    "glucose_trend_30d",
    "hrv_trend_30d",
    "sleep_trend_30d",
    "recovery_trend_30d",
    // Data completeness
    "whoop_data_pct",
    "dexcom_data_pct",
    "pison_data_pct",
    "starfit_data_pct",
    "elitehrv_data_pct",
    // Clinical notes
    "physician_notes",
    "patient_reported_symptoms",
    "medication_changes",
    "life_events",
];

/// Write the unified table, header included even when empty
pub fn write_csv<W: Write>(
    records: &[UnifiedDailyRecord],
    writer: W,
) -> Result<(), HarmonizeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv_writer.write_record(UNIFIED_COLUMNS)?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize the unified table to a CSV string
pub fn to_csv_string(records: &[UnifiedDailyRecord]) -> Result<String, HarmonizeError> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the unified table to a file
pub fn write_csv_file(
    records: &[UnifiedDailyRecord],
    path: &Path,
) -> Result<(), HarmonizeError> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)
}
