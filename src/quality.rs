//! Data-quality scoring
//!
//! Each source is judged by a small fixed set of indicator fields on the
//! unified record. A source's completeness for a date is the fraction of its
//! indicators that are non-null; the data-quality score averages the five
//! fractions and expresses the result as a percentage. Because indicators
//! are measured post-resolution, a source whose indicator was filled by a
//! higher-priority feed still counts as covered: coverage is about the
//! record, not the wire.

use crate::types::{Source, UnifiedDailyRecord};

/// Indicator fields for one source, read off the unified record
fn indicator_values(source: Source, record: &UnifiedDailyRecord) -> Vec<Option<f64>> {
    match source {
        Source::Whoop => vec![
            record.avg_resting_hr_bpm,
            record.avg_hrv_ms,
            record.recovery_score_pct,
        ],
        Source::Starfit => vec![record.weight_kg, record.bmi, record.body_fat_pct],
        Source::EliteHrv => vec![record.avg_hrv_ms],
        Source::Dexcom => vec![record.avg_glucose_mg_dl, record.time_in_range_pct],
        Source::Pison => vec![
            record.cognitive_readiness_score,
            record.mental_agility_score,
        ],
    }
}

/// Fraction of a source's indicator fields present on the record, 0-1
pub fn source_completeness(source: Source, record: &UnifiedDailyRecord) -> f64 {
    let indicators = indicator_values(source, record);
    let present = indicators.iter().filter(|v| v.is_some()).count();
    present as f64 / indicators.len() as f64
}

/// Average per-source completeness as a percentage, 0-100
pub fn quality_score(record: &UnifiedDailyRecord) -> f64 {
    let total: f64 = Source::ALL
        .iter()
        .map(|source| source_completeness(*source, record))
        .sum();
    total / Source::ALL.len() as f64 * 100.0
}

/// Stamp the quality score and the five per-source completeness
/// percentages onto the record
pub fn apply(record: &mut UnifiedDailyRecord) {
    record.data_quality_score = quality_score(record);
    record.whoop_data_pct = source_completeness(Source::Whoop, record) * 100.0;
    record.dexcom_data_pct = source_completeness(Source::Dexcom, record) * 100.0;
    record.pison_data_pct = source_completeness(Source::Pison, record) * 100.0;
    record.starfit_data_pct = source_completeness(Source::Starfit, record) * 100.0;
    record.elitehrv_data_pct = source_completeness(Source::EliteHrv, record) * 100.0;
}
