//! Unified date-axis join
//!
//! Combines the five per-source daily tables onto one canonical date axis:
//! the sorted union of every date any source covered. Each date is joined
//! via date-keyed lookup into a `DaySources` view and resolved into the
//! unified schema. A date with partial source coverage yields null fields,
//! never a dropped row; source columns with no unified counterpart are
//! dropped silently.

use crate::adapters::{
    DatedRecord, DexcomDaily, ElitehrvDaily, PisonDaily, StarfitDaily, WhoopDaily,
};
use crate::priority;
use crate::types::UnifiedDailyRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// The five per-source daily tables produced by the adapters
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub whoop: Vec<WhoopDaily>,
    pub starfit: Vec<StarfitDaily>,
    pub elitehrv: Vec<ElitehrvDaily>,
    pub dexcom: Vec<DexcomDaily>,
    pub pison: Vec<PisonDaily>,
}

impl SourceTables {
    /// Total source-days across all tables
    pub fn total_days(&self) -> usize {
        self.whoop.len()
            + self.starfit.len()
            + self.elitehrv.len()
            + self.dexcom.len()
            + self.pison.len()
    }
}

/// Per-date view across the five source tables
#[derive(Debug, Clone, Copy, Default)]
pub struct DaySources<'a> {
    pub whoop: Option<&'a WhoopDaily>,
    pub starfit: Option<&'a StarfitDaily>,
    pub elitehrv: Option<&'a ElitehrvDaily>,
    pub dexcom: Option<&'a DexcomDaily>,
    pub pison: Option<&'a PisonDaily>,
}

fn index_by_date<T: DatedRecord>(rows: &[T]) -> BTreeMap<NaiveDate, &T> {
    rows.iter().map(|row| (row.date(), row)).collect()
}

/// Join the source tables onto the canonical date axis and resolve every
/// unified field. One output row per date present in any source, ascending.
pub fn unify(tables: &SourceTables, patient_id: &str) -> Vec<UnifiedDailyRecord> {
    let whoop = index_by_date(&tables.whoop);
    let starfit = index_by_date(&tables.starfit);
    let elitehrv = index_by_date(&tables.elitehrv);
    let dexcom = index_by_date(&tables.dexcom);
    let pison = index_by_date(&tables.pison);

    let mut axis: BTreeSet<NaiveDate> = BTreeSet::new();
    axis.extend(whoop.keys().copied());
    axis.extend(starfit.keys().copied());
    axis.extend(elitehrv.keys().copied());
    axis.extend(dexcom.keys().copied());
    axis.extend(pison.keys().copied());

    axis.into_iter()
        .map(|date| {
            let day = DaySources {
                whoop: whoop.get(&date).copied(),
                starfit: starfit.get(&date).copied(),
                elitehrv: elitehrv.get(&date).copied(),
                dexcom: dexcom.get(&date).copied(),
                pison: pison.get(&date).copied(),
            };
            resolve_record(date, &day, patient_id)
        })
        .collect()
}

fn resolve_record(date: NaiveDate, day: &DaySources, patient_id: &str) -> UnifiedDailyRecord {
    let mut record = UnifiedDailyRecord::empty(date, patient_id);

    // Cardiovascular health
    record.avg_resting_hr_bpm = priority::resting_heart_rate(day);
    record.avg_hrv_ms = priority::heart_rate_variability(day);
    record.cardiac_index = day.starfit.and_then(|s| s.cardiac_index);

    // Metabolic health
    record.avg_glucose_mg_dl = day.dexcom.and_then(|d| d.glucose_mg_dl);
    record.time_in_range_pct = day.dexcom.and_then(|d| d.time_in_range_pct);
    record.gmi_percent = day.dexcom.and_then(|d| d.gmi_percent);
    record.glucose_variability_cv = day.dexcom.and_then(|d| d.coefficient_variation);

    // Body composition
    record.weight_kg = day.starfit.and_then(|s| s.weight_kg);
    record.bmi = day.starfit.and_then(|s| s.bmi);
    record.body_fat_pct = day.starfit.and_then(|s| s.body_fat_pct);
    record.muscle_mass_kg = day.starfit.and_then(|s| s.muscle_mass_kg);
    record.visceral_fat_level = day.starfit.and_then(|s| s.visceral_fat_level);
    record.bone_mass_kg = day.starfit.and_then(|s| s.bone_mass_kg);
    record.body_water_pct = day.starfit.and_then(|s| s.body_water_pct);

    // Sleep & recovery
    record.sleep_duration_hours = day.whoop.and_then(|w| w.sleep_duration_hours);
    record.sleep_efficiency_pct = priority::sleep_efficiency(day);
    record.sleep_consistency_pct = day.whoop.and_then(|w| w.sleep_consistency_pct);
    record.deep_sleep_pct = day.whoop.and_then(|w| w.deep_sleep_pct);
    record.rem_sleep_pct = day.whoop.and_then(|w| w.rem_sleep_pct);
    record.sleep_debt_hours = day.whoop.and_then(|w| w.sleep_debt_hours);
    record.recovery_score_pct = day.whoop.and_then(|w| w.recovery_score_pct);

    // Cognitive & neurological
    record.cognitive_readiness_score = day.pison.and_then(|p| p.readiness_score);
    record.mental_agility_score = day.pison.and_then(|p| p.mental_agility_score);
    record.focus_score = day.pison.and_then(|p| p.focus_score);
    record.stress_level = day.pison.and_then(|p| p.eda_stress_level);
    record.circadian_compliance_pct = day.pison.and_then(|p| p.circadian_compliance_pct);

    // Activity & fitness
    record.daily_strain_score = day.whoop.and_then(|w| w.day_strain);
    record.energy_expenditure_kcal = priority::energy_expenditure(day);
    record.steps_count = day.pison.and_then(|p| p.steps_count);

    // Vital signs
    record.skin_temperature_celsius = priority::skin_temperature(day);
    record.blood_oxygen_pct = day.whoop.and_then(|w| w.blood_oxygen_pct);
    record.respiratory_rate_rpm = day.whoop.and_then(|w| w.respiratory_rate_rpm);

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    /// Two overlapping sources unify onto the union axis: heart rate covers
    /// the first three dates, glucose the last three, and the middle dates
    /// carry both.
    #[test]
    fn test_two_source_outer_join() {
        let tables = SourceTables {
            whoop: vec![
                WhoopDaily {
                    resting_hr_bpm: Some(60.0),
                    ..WhoopDaily::empty(date(1))
                },
                WhoopDaily {
                    resting_hr_bpm: Some(62.0),
                    ..WhoopDaily::empty(date(2))
                },
                WhoopDaily {
                    resting_hr_bpm: Some(61.0),
                    ..WhoopDaily::empty(date(3))
                },
            ],
            dexcom: vec![
                DexcomDaily {
                    glucose_mg_dl: Some(90.0),
                    ..DexcomDaily::empty(date(2))
                },
                DexcomDaily {
                    glucose_mg_dl: Some(95.0),
                    ..DexcomDaily::empty(date(3))
                },
                DexcomDaily {
                    glucose_mg_dl: Some(92.0),
                    ..DexcomDaily::empty(date(4))
                },
            ],
            ..SourceTables::default()
        };

        let records = unify(&tables, "patient_001");

        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3), date(4)]);

        assert_eq!(records[0].avg_resting_hr_bpm, Some(60.0));
        assert_eq!(records[0].avg_glucose_mg_dl, None);
        assert_eq!(records[1].avg_resting_hr_bpm, Some(62.0));
        assert_eq!(records[1].avg_glucose_mg_dl, Some(90.0));
        assert_eq!(records[2].avg_resting_hr_bpm, Some(61.0));
        assert_eq!(records[2].avg_glucose_mg_dl, Some(95.0));
        assert_eq!(records[3].avg_resting_hr_bpm, None);
        assert_eq!(records[3].avg_glucose_mg_dl, Some(92.0));
    }

    #[test]
    fn test_each_date_appears_exactly_once() {
        let tables = SourceTables {
            whoop: vec![WhoopDaily::empty(date(1)), WhoopDaily::empty(date(2))],
            starfit: vec![StarfitDaily::empty(date(2)), StarfitDaily::empty(date(1))],
            elitehrv: vec![ElitehrvDaily::empty(date(1))],
            ..SourceTables::default()
        };

        let records = unify(&tables, "patient_001");

        assert_eq!(records.len(), 2);
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(1), date(2)]);
    }

    #[test]
    fn test_empty_sources_yield_empty_table() {
        let records = unify(&SourceTables::default(), "patient_001");
        assert!(records.is_empty());
    }

    #[test]
    fn test_single_source_fields_map_through() {
        let tables = SourceTables {
            starfit: vec![StarfitDaily {
                weight_kg: Some(78.2),
                bmi: Some(24.1),
                cardiac_index: Some(3.1),
                ..StarfitDaily::empty(date(5))
            }],
            pison: vec![PisonDaily {
                readiness_score: Some(72.0),
                steps_count: Some(10500.0),
                eda_stress_level: Some(2.5),
                ..PisonDaily::empty(date(5))
            }],
            ..SourceTables::default()
        };

        let records = unify(&tables, "patient_001");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.weight_kg, Some(78.2));
        assert_eq!(record.cardiac_index, Some(3.1));
        assert_eq!(record.cognitive_readiness_score, Some(72.0));
        assert_eq!(record.steps_count, Some(10500.0));
        assert_eq!(record.stress_level, Some(2.5));
        // No WHOOP coverage: sleep block stays null
        assert_eq!(record.sleep_duration_hours, None);
        assert_eq!(record.recovery_score_pct, None);
    }
}
