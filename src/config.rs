//! Harmonizer configuration
//!
//! Settings for a harmonization run: where the device exports live, where the
//! unified table is written, and the patient the rows are attributed to.
//! Loadable from JSON with per-field defaults so partial files work.

use crate::error::HarmonizeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory holding the per-device export subdirectories
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default output artifact path
pub const DEFAULT_OUTPUT_PATH: &str = "harmonized_health_data.csv";

/// Default patient identifier (single-patient scope)
pub const DEFAULT_PATIENT_ID: &str = "patient_001";

/// Configuration for a harmonization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonizerConfig {
    /// Directory containing the source exports (each at its own relative path)
    pub data_dir: PathBuf,
    /// Where the unified table is written
    pub output_path: PathBuf,
    /// Patient id stamped on every unified row
    pub patient_id: String,
}

impl Default for HarmonizerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            patient_id: DEFAULT_PATIENT_ID.to_string(),
        }
    }
}

impl HarmonizerConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, HarmonizeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, HarmonizeError> {
        let config: Self = serde_json::from_str(json)?;
        if config.patient_id.is_empty() {
            return Err(HarmonizeError::ConfigError(
                "patient_id must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, HarmonizeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
