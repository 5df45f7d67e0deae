//! Pipeline orchestration
//!
//! Runs the full harmonization pass: load the five source exports (each
//! degrading to empty on failure), join them onto the unified date axis,
//! then stamp trends, quality, and risk onto every row. The run itself is
//! infallible: whatever sources fail, a complete unified table comes out.

use crate::adapters::{
    DexcomAdapter, ElitehrvAdapter, PisonAdapter, SourceAdapter, StarfitAdapter, WhoopAdapter,
};
use crate::config::HarmonizerConfig;
use crate::types::{Source, TrendLabel, UnifiedDailyRecord};
use crate::unifier::{unify, SourceTables};
use crate::{quality, risk, trends};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Batch harmonizer over one configuration
pub struct Harmonizer {
    config: HarmonizerConfig,
}

impl Default for Harmonizer {
    fn default() -> Self {
        Self::new(HarmonizerConfig::default())
    }
}

impl Harmonizer {
    pub fn new(config: HarmonizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarmonizerConfig {
        &self.config
    }

    /// Run the full harmonization pass.
    ///
    /// Adapter failures are logged and degrade that source to empty; the
    /// unified table is always produced, possibly with many null fields.
    pub fn run(&self) -> HarmonizedTable {
        let data_dir = &self.config.data_dir;
        let tables = SourceTables {
            whoop: load_or_empty(&WhoopAdapter, data_dir),
            starfit: load_or_empty(&StarfitAdapter, data_dir),
            elitehrv: load_or_empty(&ElitehrvAdapter, data_dir),
            dexcom: load_or_empty(&DexcomAdapter, data_dir),
            pison: load_or_empty(&PisonAdapter, data_dir),
        };

        info!(source_days = tables.total_days(), "all sources loaded");

        let mut records = unify(&tables, &self.config.patient_id);
        apply_trends(&mut records);
        for record in &mut records {
            quality::apply(record);
            risk::apply(record);
        }

        let summary = RunSummary::new(&tables, &records);
        info!(
            run_id = %summary.run_id,
            records = summary.record_count,
            mean_quality = summary.mean_quality_score.unwrap_or(0.0),
            "harmonization complete"
        );

        HarmonizedTable { records, summary }
    }
}

/// Load one source, degrading any failure to an empty table
fn load_or_empty<A: SourceAdapter>(adapter: &A, data_dir: &Path) -> Vec<A::Daily> {
    let path = data_dir.join(A::EXPORT_PATH);
    match adapter.load(&path) {
        Ok(days) => {
            info!(source = %A::SOURCE, days = days.len(), "loaded source export");
            days
        }
        Err(err) => {
            warn!(source = %A::SOURCE, error = %err, "source degraded to empty");
            Vec::new()
        }
    }
}

/// Classify the five tracked metrics over the date-sorted table
fn apply_trends(records: &mut [UnifiedDailyRecord]) {
    apply_metric(records, |r| r.weight_kg, |r, l| r.weight_trend_30d = l);
    apply_metric(records, |r| r.avg_glucose_mg_dl, |r, l| r.glucose_trend_30d = l);
    apply_metric(records, |r| r.avg_hrv_ms, |r, l| r.hrv_trend_30d = l);
    apply_metric(records, |r| r.sleep_duration_hours, |r, l| r.sleep_trend_30d = l);
    apply_metric(records, |r| r.recovery_score_pct, |r, l| r.recovery_trend_30d = l);
}

fn apply_metric(
    records: &mut [UnifiedDailyRecord],
    get: impl Fn(&UnifiedDailyRecord) -> Option<f64>,
    set: impl Fn(&mut UnifiedDailyRecord, TrendLabel),
) {
    let series: Vec<Option<f64>> = records.iter().map(get).collect();
    for (record, label) in records.iter_mut().zip(trends::classify_series(&series)) {
        set(record, label);
    }
}

/// Complete output of one harmonization run
pub struct HarmonizedTable {
    /// Unified rows, ascending by date
    pub records: Vec<UnifiedDailyRecord>,
    /// Per-run bookkeeping for logs and reports
    pub summary: RunSummary,
}

/// Per-run bookkeeping; stays out of the output table so re-runs on
/// unchanged inputs remain byte-identical
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub source_days: Vec<SourceCount>,
    pub record_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub mean_quality_score: Option<f64>,
}

/// Days of data one source contributed
#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: Source,
    pub days: usize,
}

impl RunSummary {
    fn new(tables: &SourceTables, records: &[UnifiedDailyRecord]) -> Self {
        let mean_quality_score = if records.is_empty() {
            None
        } else {
            let total: f64 = records.iter().map(|r| r.data_quality_score).sum();
            Some(total / records.len() as f64)
        };

        Self {
            run_id: Uuid::new_v4().to_string(),
            source_days: vec![
                SourceCount { source: Source::Whoop, days: tables.whoop.len() },
                SourceCount { source: Source::Starfit, days: tables.starfit.len() },
                SourceCount { source: Source::EliteHrv, days: tables.elitehrv.len() },
                SourceCount { source: Source::Dexcom, days: tables.dexcom.len() },
                SourceCount { source: Source::Pison, days: tables.pison.len() },
            ],
            record_count: records.len(),
            first_date: records.first().map(|r| r.date),
            last_date: records.last().map(|r| r.date),
            mean_quality_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export;
    use std::io::Write;
    use std::path::PathBuf;

    const WHOOP_HEADER: &str = "Cycle start time,Recovery score %,Resting heart rate (bpm),Heart rate variability (ms),Skin temp (celsius),Blood oxygen %,Day Strain,Energy burned (cal),Max HR (bpm),Average HR (bpm),Sleep performance %,Respiratory rate (rpm),Asleep duration (min),In bed duration (min),Light sleep duration (min),Deep (SWS) duration (min),REM duration (min),Awake duration (min),Sleep need (min),Sleep debt (min),Sleep efficiency %,Sleep consistency %";
    const DEXCOM_HEADER: &str = "timestamp,glucose_mg_dl,time_in_range_pct,gmi_percent,coefficient_variation,mean_glucose_mg_dl,sensor_usage_pct";

    fn write_file(path: &PathBuf, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        write!(file, "{contents}").unwrap();
    }

    fn whoop_line(date: &str, hr: f64) -> String {
        format!("{date} 06:30:00,75,{hr},65,33.4,97,12.5,2200,165,72,85,14.5,420,480,210,120,90,45,460,40,93.8,82")
    }

    /// Two sources with offset coverage: the union axis holds all four
    /// dates, edges carry one-sided nulls.
    #[test]
    fn test_two_source_scenario_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let whoop = format!(
            "{WHOOP_HEADER}\n{}\n{}\n{}\n",
            whoop_line("2025-10-01", 60.0),
            whoop_line("2025-10-02", 62.0),
            whoop_line("2025-10-03", 61.0),
        );
        write_file(&data_dir.join("whoop/physiological_cycles.csv"), &whoop);

        let dexcom = format!(
            "{DEXCOM_HEADER}\n\
             2025-10-02T06:00:00Z,90,72,5.9,18,95,98\n\
             2025-10-03T06:00:00Z,95,72,5.9,18,95,98\n\
             2025-10-04T06:00:00Z,92,72,5.9,18,95,98\n"
        );
        write_file(&data_dir.join("dexcom/glucose_readings_oct2025.csv"), &dexcom);

        let harmonizer = Harmonizer::new(HarmonizerConfig {
            data_dir,
            ..HarmonizerConfig::default()
        });
        let table = harmonizer.run();

        assert_eq!(table.records.len(), 4);
        assert_eq!(table.records[0].avg_glucose_mg_dl, None);
        assert_eq!(table.records[0].avg_resting_hr_bpm, Some(60.0));
        assert_eq!(table.records[1].avg_glucose_mg_dl, Some(90.0));
        assert_eq!(table.records[3].avg_resting_hr_bpm, None);
        assert_eq!(table.records[3].avg_glucose_mg_dl, Some(92.0));

        // Quality reflects two of five sources (3/3 WHOOP, 1/1 EliteHRV via
        // resolved HRV, 2/2 Dexcom on the overlap days)
        assert!(table.records[1].data_quality_score > 0.0);
        assert!(table.records[1].data_quality_score <= 100.0);

        // Missing sources degraded, run still summarizes cleanly
        assert_eq!(table.summary.record_count, 4);
        assert_eq!(
            table.summary.first_date,
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
        assert_eq!(
            table.summary.last_date,
            NaiveDate::from_ymd_opt(2025, 10, 4)
        );
        let pison_days = table
            .summary
            .source_days
            .iter()
            .find(|c| c.source == Source::Pison)
            .unwrap();
        assert_eq!(pison_days.days, 0);
    }

    #[test]
    fn test_all_sources_missing_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let harmonizer = Harmonizer::new(HarmonizerConfig {
            data_dir: dir.path().to_path_buf(),
            ..HarmonizerConfig::default()
        });

        let table = harmonizer.run();
        assert!(table.records.is_empty());
        assert_eq!(table.summary.record_count, 0);
        assert_eq!(table.summary.first_date, None);
        assert_eq!(table.summary.mean_quality_score, None);
    }

    #[test]
    fn test_trends_emerge_after_full_window() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let mut dexcom = format!("{DEXCOM_HEADER}\n");
        let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        for i in 0..35 {
            let date = start + chrono::Duration::days(i);
            // Glucose rises one mg/dL per day
            dexcom.push_str(&format!(
                "{date}T06:00:00Z,{},72,5.9,18,95,98\n",
                90.0 + i as f64
            ));
        }
        write_file(&data_dir.join("dexcom/glucose_readings_oct2025.csv"), &dexcom);

        let harmonizer = Harmonizer::new(HarmonizerConfig {
            data_dir,
            ..HarmonizerConfig::default()
        });
        let table = harmonizer.run();

        assert_eq!(table.records.len(), 35);
        for record in table.records.iter().take(29) {
            assert_eq!(record.glucose_trend_30d, TrendLabel::InsufficientData);
        }
        assert_eq!(table.records[29].glucose_trend_30d, TrendLabel::Improving);
        assert_eq!(table.records[34].glucose_trend_30d, TrendLabel::Improving);
        // Metric with no source coverage stays insufficient throughout
        assert_eq!(table.records[34].weight_trend_30d, TrendLabel::InsufficientData);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let whoop = format!("{WHOOP_HEADER}\n{}\n", whoop_line("2025-10-01", 60.0));
        write_file(&data_dir.join("whoop/physiological_cycles.csv"), &whoop);

        let harmonizer = Harmonizer::new(HarmonizerConfig {
            data_dir,
            ..HarmonizerConfig::default()
        });

        let first = export::to_csv_string(&harmonizer.run().records).unwrap();
        let second = export::to_csv_string(&harmonizer.run().records).unwrap();
        assert_eq!(first, second);
    }
}
