//! Threshold risk classification
//!
//! Applies fixed screening thresholds per physiological system to every
//! unified row. These are heuristic flags, not validated clinical
//! instruments. A rule only fires on a present value; a null never
//! triggers an abnormality.

use crate::types::{RiskLabel, UnifiedDailyRecord};

/// HRV below this suggests cardiovascular stress (ms)
pub const HRV_LOW_MS: f64 = 30.0;
/// Resting heart rate above this is flagged (bpm)
pub const RESTING_HR_HIGH_BPM: f64 = 100.0;
/// Recovery score below this is flagged (percentage)
pub const RECOVERY_LOW_PCT: f64 = 40.0;

/// Cognitive readiness below this is flagged
pub const COGNITIVE_READINESS_LOW: f64 = 50.0;
/// Focus score below this is flagged
pub const FOCUS_LOW: f64 = 50.0;
/// Stress level above this is flagged (device scale)
pub const STRESS_HIGH: f64 = 4.0;

/// Time-in-range below this is flagged (percentage)
pub const TIME_IN_RANGE_LOW_PCT: f64 = 60.0;
/// Glucose management indicator above this is flagged (percentage)
pub const GMI_HIGH_PCT: f64 = 6.5;

/// Muscle mass below this is flagged (kg)
pub const MUSCLE_MASS_LOW_KG: f64 = 50.0;
/// Bone mass below this is flagged (kg)
pub const BONE_MASS_LOW_KG: f64 = 5.0;

fn below(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v < threshold)
}

fn above(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v > threshold)
}

fn label(abnormal: bool) -> RiskLabel {
    if abnormal {
        RiskLabel::AbnormalitySuspected
    } else {
        RiskLabel::NoAbnormalitySuspected
    }
}

pub fn cardiovascular(record: &UnifiedDailyRecord) -> RiskLabel {
    label(
        below(record.avg_hrv_ms, HRV_LOW_MS)
            || above(record.avg_resting_hr_bpm, RESTING_HR_HIGH_BPM)
            || below(record.recovery_score_pct, RECOVERY_LOW_PCT),
    )
}

pub fn neurological(record: &UnifiedDailyRecord) -> RiskLabel {
    label(
        below(record.cognitive_readiness_score, COGNITIVE_READINESS_LOW)
            || below(record.focus_score, FOCUS_LOW)
            || above(record.stress_level, STRESS_HIGH),
    )
}

pub fn metabolic(record: &UnifiedDailyRecord) -> RiskLabel {
    label(
        below(record.time_in_range_pct, TIME_IN_RANGE_LOW_PCT)
            || above(record.gmi_percent, GMI_HIGH_PCT),
    )
}

pub fn skeletal(record: &UnifiedDailyRecord) -> RiskLabel {
    label(
        below(record.muscle_mass_kg, MUSCLE_MASS_LOW_KG)
            || below(record.bone_mass_kg, BONE_MASS_LOW_KG),
    )
}

/// Stamp all four system classifications onto the record
pub fn apply(record: &mut UnifiedDailyRecord) {
    record.cardiovascular_risk_score = cardiovascular(record);
    record.neurological_risk_score = neurological(record);
    record.metabolic_risk_score = metabolic(record);
    record.skeletal_risk_score = skeletal(record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> UnifiedDailyRecord {
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        UnifiedDailyRecord::empty(date, "patient_001")
    }

    #[test]
    fn test_healthy_values_pass() {
        let mut r = record();
        r.avg_hrv_ms = Some(65.0);
        r.avg_resting_hr_bpm = Some(52.0);
        r.recovery_score_pct = Some(75.0);
        r.time_in_range_pct = Some(80.0);
        r.gmi_percent = Some(5.6);
        r.muscle_mass_kg = Some(58.0);
        r.bone_mass_kg = Some(7.5);
        apply(&mut r);

        assert!(!r.cardiovascular_risk_score.is_abnormal());
        assert!(!r.metabolic_risk_score.is_abnormal());
        assert!(!r.skeletal_risk_score.is_abnormal());
    }

    #[test]
    fn test_low_hrv_flags_cardiovascular() {
        let mut r = record();
        r.avg_hrv_ms = Some(25.0);
        r.avg_resting_hr_bpm = Some(60.0);
        r.recovery_score_pct = Some(70.0);

        assert!(cardiovascular(&r).is_abnormal());
    }

    #[test]
    fn test_any_single_rule_fires() {
        let mut r = record();
        r.avg_resting_hr_bpm = Some(105.0);
        assert!(cardiovascular(&r).is_abnormal());

        let mut r = record();
        r.stress_level = Some(4.5);
        assert!(neurological(&r).is_abnormal());

        let mut r = record();
        r.gmi_percent = Some(7.0);
        assert!(metabolic(&r).is_abnormal());

        let mut r = record();
        r.bone_mass_kg = Some(3.2);
        assert!(skeletal(&r).is_abnormal());
    }

    #[test]
    fn test_boundary_values_do_not_fire() {
        let mut r = record();
        r.avg_hrv_ms = Some(HRV_LOW_MS);
        r.avg_resting_hr_bpm = Some(RESTING_HR_HIGH_BPM);
        r.recovery_score_pct = Some(RECOVERY_LOW_PCT);
        assert!(!cardiovascular(&r).is_abnormal());

        let mut r = record();
        r.time_in_range_pct = Some(TIME_IN_RANGE_LOW_PCT);
        r.gmi_percent = Some(GMI_HIGH_PCT);
        assert!(!metabolic(&r).is_abnormal());
    }

    #[test]
    fn test_nulls_never_trigger() {
        let mut r = record();
        apply(&mut r);

        assert!(!r.cardiovascular_risk_score.is_abnormal());
        assert!(!r.neurological_risk_score.is_abnormal());
        assert!(!r.metabolic_risk_score.is_abnormal());
        assert!(!r.skeletal_risk_score.is_abnormal());
    }
}
