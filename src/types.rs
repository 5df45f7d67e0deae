//! Core types for the Harmona pipeline
//!
//! This module defines the identifiers and records that flow through the
//! pipeline: the source discriminant, the categorical derived labels, and the
//! unified daily record that every source maps into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Source identifier for provenance tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Whoop,
    Starfit,
    EliteHrv,
    Dexcom,
    Pison,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Whoop => "whoop",
            Source::Starfit => "starfit",
            Source::EliteHrv => "elitehrv",
            Source::Dexcom => "dexcom",
            Source::Pison => "pison",
        }
    }

    /// All sources in indicator-weighting order
    pub const ALL: [Source; 5] = [
        Source::Whoop,
        Source::Starfit,
        Source::EliteHrv,
        Source::Dexcom,
        Source::Pison,
    ];
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// `Source` appears as the `source` field of `HarmonizeError::MissingColumn`,
// where thiserror requires it to implement `std::error::Error`. The default
// `source()` returns `None`, so no error-chain behavior is added.
impl std::error::Error for Source {}

/// Rolling-trend classification for a tracked metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    InsufficientData,
    Improving,
    Declining,
    Stable,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::InsufficientData => "insufficient_data",
            TrendLabel::Improving => "improving",
            TrendLabel::Declining => "declining",
            TrendLabel::Stable => "stable",
        }
    }
}

/// Per-system risk classification
///
/// Serialized with the exact phrasing downstream consumers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Abnormality suspected")]
    AbnormalitySuspected,
    #[serde(rename = "No abnormality suspected")]
    NoAbnormalitySuspected,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::AbnormalitySuspected => "Abnormality suspected",
            RiskLabel::NoAbnormalitySuspected => "No abnormality suspected",
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, RiskLabel::AbnormalitySuspected)
    }
}

/// One harmonized row per calendar date.
///
/// Field order is the output column order, a compatibility contract with the
/// dashboard and chat context builder (see `export::UNIFIED_COLUMNS`). Nulls
/// serialize as empty fields. Several columns are declared for contract
/// stability but never derived (`hrv_trend`, blood pressure, insulin
/// sensitivity, exercise duration, cardio fitness, the clinical indicator
/// block); they stay null on every row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedDailyRecord {
    /// Calendar date (no time component)
    pub date: NaiveDate,
    /// Patient identifier (single patient in current scope)
    pub patient_id: String,
    /// Weighted multi-source completeness, 0-100
    pub data_quality_score: f64,

    // Cardiovascular health
    /// Resting heart rate (bpm)
    pub avg_resting_hr_bpm: Option<f64>,
    /// Heart rate variability (ms)
    pub avg_hrv_ms: Option<f64>,
    pub hrv_trend: Option<TrendLabel>,
    /// Cardiac index (L/min/m²)
    pub cardiac_index: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,

    // Metabolic health
    /// Average glucose (mg/dL)
    pub avg_glucose_mg_dl: Option<f64>,
    /// Time in glucose target range (percentage)
    pub time_in_range_pct: Option<f64>,
    /// Glucose management indicator (percentage)
    pub gmi_percent: Option<f64>,
    /// Glucose coefficient of variation
    pub glucose_variability_cv: Option<f64>,
    pub insulin_sensitivity_index: Option<f64>,

    // Body composition
    /// Body weight (kg)
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_pct: Option<f64>,
    /// Muscle mass (kg)
    pub muscle_mass_kg: Option<f64>,
    pub visceral_fat_level: Option<f64>,
    /// Bone mass (kg)
    pub bone_mass_kg: Option<f64>,
    pub body_water_pct: Option<f64>,

    // Sleep & recovery
    /// Total sleep duration (hours)
    pub sleep_duration_hours: Option<f64>,
    pub sleep_efficiency_pct: Option<f64>,
    pub sleep_consistency_pct: Option<f64>,
    /// Deep sleep share of total sleep (percentage)
    pub deep_sleep_pct: Option<f64>,
    /// REM sleep share of total sleep (percentage)
    pub rem_sleep_pct: Option<f64>,
    /// Accumulated sleep debt (hours)
    pub sleep_debt_hours: Option<f64>,
    /// Recovery score (percentage)
    pub recovery_score_pct: Option<f64>,

    // Cognitive & neurological
    pub cognitive_readiness_score: Option<f64>,
    pub mental_agility_score: Option<f64>,
    pub focus_score: Option<f64>,
    /// Electrodermal stress level (device scale)
    pub stress_level: Option<f64>,
    pub circadian_compliance_pct: Option<f64>,

    // Activity & fitness
    pub daily_strain_score: Option<f64>,
    /// Total energy expenditure (kcal)
    pub energy_expenditure_kcal: Option<f64>,
    pub steps_count: Option<f64>,
    pub exercise_duration_min: Option<f64>,
    pub cardio_fitness_score: Option<f64>,

    // Vital signs
    pub skin_temperature_celsius: Option<f64>,
    /// Blood oxygen saturation (percentage)
    pub blood_oxygen_pct: Option<f64>,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate_rpm: Option<f64>,

    // Clinical risk scores
    pub cardiovascular_risk_score: RiskLabel,
    pub neurological_risk_score: RiskLabel,
    pub metabolic_risk_score: RiskLabel,
    pub skeletal_risk_score: RiskLabel,

    // Clinical indicators (declared, never derived)
    pub inflammation_markers: Option<String>,
    pub oxidative_stress_level: Option<String>,
    pub autonomic_balance_score: Option<String>,
    pub metabolic_age: Option<f64>,

    // Trend indicators (trailing 30-row window)
    pub weight_trend_30d: TrendLabel,
    pub glucose_trend_30d: TrendLabel,
    pub hrv_trend_30d: TrendLabel,
    pub sleep_trend_30d: TrendLabel,
    pub recovery_trend_30d: TrendLabel,

    // Data completeness (per-source indicator coverage, percentage)
    pub whoop_data_pct: f64,
    pub dexcom_data_pct: f64,
    pub pison_data_pct: f64,
    pub starfit_data_pct: f64,
    pub elitehrv_data_pct: f64,

    // Clinical notes (free text, populated by downstream tooling)
    pub physician_notes: String,
    pub patient_reported_symptoms: String,
    pub medication_changes: String,
    pub life_events: String,
}

impl UnifiedDailyRecord {
    /// Create a record for `date` with every metric null and derived fields
    /// at their pre-computation defaults.
    pub fn empty(date: NaiveDate, patient_id: &str) -> Self {
        Self {
            date,
            patient_id: patient_id.to_string(),
            data_quality_score: 0.0,
            avg_resting_hr_bpm: None,
            avg_hrv_ms: None,
            hrv_trend: None,
            cardiac_index: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            avg_glucose_mg_dl: None,
            time_in_range_pct: None,
            gmi_percent: None,
            glucose_variability_cv: None,
            insulin_sensitivity_index: None,
            weight_kg: None,
            bmi: None,
            body_fat_pct: None,
            muscle_mass_kg: None,
            visceral_fat_level: None,
            bone_mass_kg: None,
            body_water_pct: None,
            sleep_duration_hours: None,
            sleep_efficiency_pct: None,
            sleep_consistency_pct: None,
            deep_sleep_pct: None,
            rem_sleep_pct: None,
            sleep_debt_hours: None,
            recovery_score_pct: None,
            cognitive_readiness_score: None,
            mental_agility_score: None,
            focus_score: None,
            stress_level: None,
            circadian_compliance_pct: None,
            daily_strain_score: None,
            energy_expenditure_kcal: None,
            steps_count: None,
            exercise_duration_min: None,
            cardio_fitness_score: None,
            skin_temperature_celsius: None,
            blood_oxygen_pct: None,
            respiratory_rate_rpm: None,
            cardiovascular_risk_score: RiskLabel::NoAbnormalitySuspected,
            neurological_risk_score: RiskLabel::NoAbnormalitySuspected,
            metabolic_risk_score: RiskLabel::NoAbnormalitySuspected,
            skeletal_risk_score: RiskLabel::NoAbnormalitySuspected,
            inflammation_markers: None,
            oxidative_stress_level: None,
            autonomic_balance_score: None,
            metabolic_age: None,
            weight_trend_30d: TrendLabel::InsufficientData,
            glucose_trend_30d: TrendLabel::InsufficientData,
            hrv_trend_30d: TrendLabel::InsufficientData,
            sleep_trend_30d: TrendLabel::InsufficientData,
            recovery_trend_30d: TrendLabel::InsufficientData,
            whoop_data_pct: 0.0,
            dexcom_data_pct: 0.0,
            pison_data_pct: 0.0,
            starfit_data_pct: 0.0,
            elitehrv_data_pct: 0.0,
            physician_notes: String::new(),
            patient_reported_symptoms: String::new(),
            medication_changes: String::new(),
            life_events: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_label_serialization() {
        let json = serde_json::to_string(&TrendLabel::InsufficientData).unwrap();
        assert_eq!(json, "\"insufficient_data\"");
        let json = serde_json::to_string(&TrendLabel::Improving).unwrap();
        assert_eq!(json, "\"improving\"");
    }

    #[test]
    fn test_risk_label_serialization() {
        let json = serde_json::to_string(&RiskLabel::AbnormalitySuspected).unwrap();
        assert_eq!(json, "\"Abnormality suspected\"");
        let json = serde_json::to_string(&RiskLabel::NoAbnormalitySuspected).unwrap();
        assert_eq!(json, "\"No abnormality suspected\"");
    }

    #[test]
    fn test_empty_record_defaults() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let record = UnifiedDailyRecord::empty(date, "patient_001");

        assert_eq!(record.date, date);
        assert_eq!(record.patient_id, "patient_001");
        assert!(record.avg_hrv_ms.is_none());
        assert_eq!(record.weight_trend_30d, TrendLabel::InsufficientData);
        assert!(!record.cardiovascular_risk_score.is_abnormal());
        assert_eq!(record.whoop_data_pct, 0.0);
    }
}
