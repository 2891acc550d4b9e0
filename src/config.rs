use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::monte_carlo::SimulationParams;
use crate::search::DEFAULT_TOP_K;
use crate::session::HolidayCalendar;

pub const DEFAULT_EMBEDDING_DIM: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    /// Dimension used when embedding free-text queries. Must match the catalog.
    pub embedding_dim: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            top_k: DEFAULT_TOP_K,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

/// Engine settings read from a JSON file. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub holidays: HolidayCalendar,
    pub search: SearchConfig,
    pub simulation: SimulationParams,
}

impl EngineConfig {
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load from `path`. A missing or invalid file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("could not load config '{}': {} - using defaults", path.display(), e);
                EngineConfig::default()
            }
        }
    }
}
