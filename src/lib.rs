//! Harmona - Harmonization engine for multi-device daily health metrics
//!
//! Harmona reconciles daily exports from five disjoint device feeds (WHOOP,
//! Starfit scale, EliteHRV strap, Dexcom CGM, Pison wristband) onto one
//! per-day clinical record through a deterministic pipeline: source
//! adaptation → date-axis unification → trend and quality derivation → risk
//! classification → table export.
//!
//! ## Modules
//!
//! - **adapters**: per-device export parsing onto typed daily tables
//! - **unifier/priority**: date-axis join and first-non-null field resolution
//! - **trends/quality/risk**: derived indicators over the unified table
//! - **pipeline/export**: run orchestration and the output-table contract

pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod quality;
pub mod risk;
pub mod trends;
pub mod types;
pub mod unifier;

mod priority;

pub use config::HarmonizerConfig;
pub use error::HarmonizeError;
pub use pipeline::{HarmonizedTable, Harmonizer, RunSummary};
pub use types::{RiskLabel, Source, TrendLabel, UnifiedDailyRecord};

/// Harmona version embedded in run summaries and CLI reports
pub const HARMONA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "harmona-core";
