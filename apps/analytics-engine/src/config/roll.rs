//! Roll analysis configuration.

use serde::{Deserialize, Serialize};

use crate::domain::analytics::RollParams;

/// Roll analysis thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollConfig {
    /// Run roll analysis for vertical spreads.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Late-stage badge at or below this DTE.
    #[serde(default = "default_late_stage_dte")]
    pub late_stage_dte: i64,
    /// Minimum remaining reward:risk for credit spreads.
    #[serde(default = "default_credit_min_rr")]
    pub credit_min_reward_to_risk: f64,
    /// Minimum remaining reward:risk for debit spreads.
    #[serde(default = "default_debit_min_rr")]
    pub debit_min_reward_to_risk: f64,
    /// Reward:risk values above this display as "N+".
    #[serde(default = "default_rr_cap")]
    pub reward_to_risk_cap: f64,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            late_stage_dte: default_late_stage_dte(),
            credit_min_reward_to_risk: default_credit_min_rr(),
            debit_min_reward_to_risk: default_debit_min_rr(),
            reward_to_risk_cap: default_rr_cap(),
        }
    }
}

impl RollConfig {
    /// Analyzer parameters.
    #[must_use]
    pub const fn params(&self) -> RollParams {
        RollParams {
            enabled: self.enabled,
            late_stage_dte: self.late_stage_dte,
            credit_min_reward_to_risk: self.credit_min_reward_to_risk,
            debit_min_reward_to_risk: self.debit_min_reward_to_risk,
            reward_to_risk_cap: self.reward_to_risk_cap,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_late_stage_dte() -> i64 {
    21
}

const fn default_credit_min_rr() -> f64 {
    0.3
}

const fn default_debit_min_rr() -> f64 {
    0.6
}

const fn default_rr_cap() -> f64 {
    10.0
}
