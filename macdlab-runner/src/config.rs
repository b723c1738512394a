//! Serializable run configuration.
//!
//! Everything needed to reproduce a backtest or sweep lives here — including
//! the fee schedule and compounding toggles, which are deliberately config
//! values rather than module constants so they can be swapped per exchange
//! and exercised in tests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use macdlab_core::engine::StrategyConfig;
use macdlab_core::ParamSet;

use crate::ranker::WindowPlan;
use crate::sweep::GridSpec;

/// Unique identifier for a run (content-addressable hash of its config).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbol: String,
    pub params: ParamSet,
    pub strategy: StrategyConfig,
}

impl RunConfig {
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Deterministic content hash: identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        content_hash(self)
    }
}

/// Configuration for a grid sweep with stability ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub symbol: String,
    pub grid: GridSpec,
    pub strategy: StrategyConfig,
    pub plan: WindowPlan,
    /// Signal period whose profit matrix is rendered after the sweep.
    pub matrix_signal: usize,
}

impl SweepConfig {
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    pub fn run_id(&self) -> RunId {
        content_hash(self)
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("config serialization cannot fail");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}
