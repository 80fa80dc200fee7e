use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use mirror::SessionConfig;
use serde::{Deserialize, Serialize};

/// Parameters of one simulation run. Every field has a default, so a JSON
/// file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub sinks: u32,
    pub ops: u32,
    pub seed: u64,
    /// Claims land in `[-grid_radius, grid_radius)` on both axes.
    pub grid_radius: i32,
    /// Simulated time between operations.
    pub step_ms: u64,
    /// Index of the sink that loses deliveries.
    pub fail_sink: Option<u32>,
    /// Every `fail_every`-th delivery to the failing sink is lost.
    pub fail_every: u32,
    pub session: SessionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sinks: 4,
            ops: 500,
            seed: 1,
            grid_radius: 16,
            step_ms: 50,
            fail_sink: None,
            fail_every: 3,
            session: SessionConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parse sim config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("load {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sinks > 0, "at least one sink is required");
        ensure!(self.grid_radius > 0, "grid_radius must be positive");
        ensure!(self.fail_every > 0, "fail_every must be positive");
        if let Some(index) = self.fail_sink {
            ensure!(
                index < self.sinks,
                "fail_sink {index} out of range for {} sinks",
                self.sinks
            );
        }
        Ok(())
    }
}
