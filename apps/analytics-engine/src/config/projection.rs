//! Theta projection and stress test configuration.

use serde::{Deserialize, Serialize};

use crate::domain::analytics::{DEFAULT_HORIZON_DAYS, DEFAULT_SCENARIO_MOVES_PCT, ProjectionParams};

/// Projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Theta projection horizon in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Underlying moves for the stress test, in percent.
    #[serde(default = "default_scenario_moves")]
    pub scenario_moves_pct: Vec<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            scenario_moves_pct: default_scenario_moves(),
        }
    }
}

impl ProjectionConfig {
    /// Engine parameters.
    #[must_use]
    pub fn params(&self) -> ProjectionParams {
        ProjectionParams {
            horizon_days: self.horizon_days,
            scenario_moves_pct: self.scenario_moves_pct.clone(),
        }
    }
}

const fn default_horizon_days() -> u32 {
    DEFAULT_HORIZON_DAYS
}

fn default_scenario_moves() -> Vec<f64> {
    DEFAULT_SCENARIO_MOVES_PCT.to_vec()
}
