//! Roll analysis for defined-risk vertical spreads.
//!
//! Scores an open vertical against its max profit and max loss and raises
//! alert badges when user targets, late-stage DTE, or poor remaining
//! reward:risk suggest rolling or closing.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::portfolio::{CONTRACT_MULTIPLIER, PositionGroup};
use crate::domain::pricing::EnrichedLeg;
use crate::domain::strategy::VerticalSpread;

// ============================================================================
// Configuration
// ============================================================================

/// Per-strategy profit and loss targets, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Strategy the target applies to.
    pub strategy_name: String,
    /// Profit badge at this percent of max profit.
    pub profit_target_pct: f64,
    /// Loss badge above this percent (of credit for credit spreads, of max loss for debit spreads).
    pub loss_target_pct: f64,
}

impl Target {
    /// Create a target.
    #[must_use]
    pub fn new(strategy_name: impl Into<String>, profit_target_pct: f64, loss_target_pct: f64) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            profit_target_pct,
            loss_target_pct,
        }
    }
}

/// Targets for the four verticals: take credit spreads at 50% with a 2x
/// credit stop, debit spreads at 80% with a 50% stop.
#[must_use]
pub fn default_targets() -> Vec<Target> {
    vec![
        Target::new(VerticalSpread::BullPut.name(), 50.0, 200.0),
        Target::new(VerticalSpread::BearCall.name(), 50.0, 200.0),
        Target::new(VerticalSpread::BullCall.name(), 80.0, 50.0),
        Target::new(VerticalSpread::BearPut.name(), 80.0, 50.0),
    ]
}

/// Roll analysis thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollParams {
    /// Analysis on/off.
    pub enabled: bool,
    /// Late-stage badge when `0 < dte ≤` this.
    pub late_stage_dte: i64,
    /// Low R:R badge threshold for credit spreads.
    pub credit_min_reward_to_risk: f64,
    /// Low R:R badge threshold for debit spreads.
    pub debit_min_reward_to_risk: f64,
    /// Display cap for reward:risk.
    pub reward_to_risk_cap: f64,
}

impl Default for RollParams {
    fn default() -> Self {
        Self {
            enabled: true,
            late_stage_dte: 21,
            credit_min_reward_to_risk: 0.3,
            debit_min_reward_to_risk: 0.6,
            reward_to_risk_cap: 10.0,
        }
    }
}

// ============================================================================
// Badges
// ============================================================================

/// Alert kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeKind {
    /// Profit target reached.
    ProfitTarget,
    /// Loss limit exceeded.
    LossLimit,
    /// Close to expiration.
    LateStage,
    /// Little reward left for the remaining risk.
    LowRewardToRisk,
}

/// How soon the user should act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Informational.
    Low,
    /// Act soon.
    Medium,
    /// Act now.
    High,
}

/// Display color, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No alert.
    #[default]
    Blue,
    /// Positive alert.
    Green,
    /// Caution.
    Yellow,
    /// Warning.
    Orange,
    /// Danger.
    Red,
}

/// One alert on a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Alert kind.
    pub kind: BadgeKind,
    /// Short label.
    pub label: String,
    /// Urgency.
    pub urgency: Urgency,
    /// Color.
    pub severity: Severity,
    /// Human-readable detail.
    pub message: String,
}

impl Badge {
    fn new(kind: BadgeKind, message: String) -> Self {
        let (label, urgency, severity) = match kind {
            BadgeKind::ProfitTarget => ("Profit Target", Urgency::Medium, Severity::Green),
            BadgeKind::LossLimit => ("Loss Limit", Urgency::High, Severity::Red),
            BadgeKind::LateStage => ("Late Stage", Urgency::Medium, Severity::Yellow),
            BadgeKind::LowRewardToRisk => ("Low R:R", Urgency::Low, Severity::Orange),
        };
        Self {
            kind,
            label: label.to_string(),
            urgency,
            severity,
            message,
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Efficiency metrics and alerts for one vertical spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollAnalysis {
    /// Strategy name.
    pub strategy: String,
    /// Opened for a net credit.
    pub is_credit: bool,
    /// Spread contracts.
    pub contracts: i64,
    /// Strike width.
    pub width: Decimal,
    /// Maximum profit.
    pub max_profit: Decimal,
    /// Maximum loss.
    pub max_loss: Decimal,
    /// Unrealized P&L of the open legs.
    pub current_pnl: Decimal,
    /// P&L banked by earlier closes and rolls.
    pub realized_pnl: Decimal,
    /// Current P&L as percent of max profit.
    pub pct_max_profit: f64,
    /// Current loss as percent of max loss; zero unless losing.
    pub pct_max_loss: f64,
    /// Remaining reward over remaining risk; `None` when no risk remains.
    pub reward_to_risk_raw: Option<f64>,
    /// Reward:risk for display, capped (e.g. "10+").
    pub reward_to_risk_display: String,
    /// Short leg |delta| in percent.
    pub delta_saturation: f64,
    /// Days to expiration of the short leg.
    pub dte: i64,
    /// Alerts, in evaluation order.
    pub badges: Vec<Badge>,
    /// Worst badge color, blue when none.
    pub severity: Severity,
}

impl RollAnalysis {
    /// Whether a badge of the given kind was raised.
    #[must_use]
    pub fn has_badge(&self, kind: BadgeKind) -> bool {
        self.badges.iter().any(|b| b.kind == kind)
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn percent_of(part: Decimal, whole: Decimal) -> f64 {
    if whole > Decimal::ZERO {
        to_f64(part / whole * Decimal::ONE_HUNDRED)
    } else {
        0.0
    }
}

/// Scores vertical spreads against targets.
#[derive(Debug, Clone, Default)]
pub struct RollAnalyzer {
    params: RollParams,
    targets: Vec<Target>,
}

impl RollAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub const fn new(params: RollParams, targets: Vec<Target>) -> Self {
        Self { params, targets }
    }

    /// Analyzer with default thresholds and vertical targets.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RollParams::default(), default_targets())
    }

    /// Target for a strategy, if configured.
    #[must_use]
    pub fn target(&self, strategy: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.strategy_name == strategy)
    }

    /// Analyze a classified group.
    ///
    /// `legs` are the group's consolidated, enriched legs. Returns `None`
    /// when analysis is disabled, the strategy is not one of the four
    /// verticals, or the legs do not form a short/long pair.
    #[must_use]
    pub fn analyze(&self, strategy: &str, group: &PositionGroup, legs: &[EnrichedLeg]) -> Option<RollAnalysis> {
        if !self.params.enabled {
            return None;
        }
        let kind = VerticalSpread::from_name(strategy)?;

        let mut short = None;
        let mut long = None;
        for leg in legs {
            match leg.leg.as_option() {
                Some(o) if o.signed_quantity < 0 => short = Some((leg, o)),
                Some(o) if o.signed_quantity > 0 => long = Some((leg, o)),
                _ => return None,
            }
        }
        let ((short_leg, short_opt), (_, long_opt)) = (short?, long?);
        if legs.len() != 2 {
            return None;
        }

        let is_credit = kind.is_credit();
        let contracts = short_opt.signed_quantity.abs();
        let width = (short_opt.strike - long_opt.strike).abs();
        let spread_value = width * Decimal::from(contracts * CONTRACT_MULTIPLIER);
        let net_premium: Decimal = legs.iter().map(|l| l.leg.cost_basis()).sum();

        let (max_profit, max_loss) = if is_credit {
            (net_premium, spread_value - net_premium)
        } else {
            (spread_value + net_premium, -net_premium)
        };

        let current_pnl: Decimal = legs.iter().map(|l| l.leg.unrealized_pnl()).sum();
        let pct_max_profit = percent_of(current_pnl, max_profit);
        let pct_max_loss = if current_pnl < Decimal::ZERO {
            percent_of(-current_pnl, max_loss)
        } else {
            0.0
        };

        let remaining_reward = to_f64(max_profit - current_pnl);
        let remaining_risk = to_f64(max_loss + current_pnl);
        let reward_to_risk_raw = (remaining_risk > 0.0).then(|| remaining_reward / remaining_risk);
        let reward_to_risk_display = match reward_to_risk_raw {
            Some(rr) if rr > self.params.reward_to_risk_cap => format!("{}+", self.params.reward_to_risk_cap),
            Some(rr) => format!("{rr:.2}"),
            None => "N/A".to_string(),
        };

        let delta_saturation = short_leg.greeks.delta.abs() * 100.0;
        let dte = short_leg.dte.unwrap_or_default();

        let mut badges = Vec::new();
        if let Some(target) = self.target(kind.name()) {
            if pct_max_profit >= target.profit_target_pct {
                badges.push(Badge::new(
                    BadgeKind::ProfitTarget,
                    format!(
                        "{pct_max_profit:.0}% of max profit (target {:.0}%)",
                        target.profit_target_pct
                    ),
                ));
            }
            let loss_pct = if is_credit {
                if current_pnl < Decimal::ZERO {
                    percent_of(-current_pnl, net_premium)
                } else {
                    0.0
                }
            } else {
                pct_max_loss
            };
            if loss_pct > target.loss_target_pct {
                let basis = if is_credit { "credit" } else { "max loss" };
                badges.push(Badge::new(
                    BadgeKind::LossLimit,
                    format!(
                        "Loss is {loss_pct:.0}% of {basis} (limit {:.0}%)",
                        target.loss_target_pct
                    ),
                ));
            }
        }
        if dte > 0 && dte <= self.params.late_stage_dte {
            badges.push(Badge::new(BadgeKind::LateStage, format!("{dte} DTE remaining")));
        }
        let min_rr = if is_credit {
            self.params.credit_min_reward_to_risk
        } else {
            self.params.debit_min_reward_to_risk
        };
        if let Some(rr) = reward_to_risk_raw.filter(|rr| *rr < min_rr) {
            badges.push(Badge::new(
                BadgeKind::LowRewardToRisk,
                format!("Reward:risk {rr:.2} below {min_rr:.2}"),
            ));
        }

        let severity = badges.iter().map(|b| b.severity).max().unwrap_or_default();

        Some(RollAnalysis {
            strategy: kind.name().to_string(),
            is_credit,
            contracts,
            width,
            max_profit,
            max_loss,
            current_pnl,
            realized_pnl: group.realized_pnl,
            pct_max_profit,
            pct_max_loss,
            reward_to_risk_raw,
            reward_to_risk_display,
            delta_saturation,
            dte,
            badges,
            severity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::{Greeks, GreeksSource, Leg, OptionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn enriched(leg: Leg, dte: i64, delta: f64) -> EnrichedLeg {
        EnrichedLeg {
            leg,
            dte: Some(dte),
            underlying_price: Some(100.0),
            iv: 0.3,
            greeks: Greeks::new(delta, 0.0, 0.0, 0.0),
            source: GreeksSource::Broker,
        }
    }

    /// Bull put 100/95, $1.50 credit, with the given open P&L.
    fn bull_put(pnl: Decimal, dte: i64) -> (PositionGroup, Vec<EnrichedLeg>) {
        let expiry = as_of() + chrono::Days::new(45);
        let short = Leg::option("SPY", OptionType::Put, dec!(100), expiry, -1, dec!(250))
            .with_unrealized_pnl(pnl);
        let long = Leg::option("SPY", OptionType::Put, dec!(95), expiry, 1, dec!(-100));
        let group = PositionGroup::new("g1", "acct", "SPY", vec![short.clone(), long.clone()]);
        let legs = vec![enriched(short, dte, -0.25), enriched(long, dte, -0.10)];
        (group, legs)
    }

    #[test]
    fn profit_target_badge_on_credit_spread() {
        // 60% of $150 max profit
        let (group, legs) = bull_put(dec!(90), 30);
        let analysis = RollAnalyzer::with_defaults()
            .analyze("Bull Put Spread", &group, &legs)
            .unwrap();

        assert!(analysis.is_credit);
        assert_eq!(analysis.max_profit, dec!(150));
        assert_eq!(analysis.max_loss, dec!(350));
        assert!((analysis.pct_max_profit - 60.0).abs() < 1e-9);
        let badge = &analysis.badges[0];
        assert_eq!(badge.kind, BadgeKind::ProfitTarget);
        assert_eq!(badge.urgency, Urgency::Medium);
        assert!((analysis.delta_saturation - 25.0).abs() < 1e-9);
    }

    #[test]
    fn reward_to_risk_and_low_rr_badge() {
        let (group, legs) = bull_put(dec!(90), 30);
        let analysis = RollAnalyzer::with_defaults()
            .analyze("Bull Put Spread", &group, &legs)
            .unwrap();
        // (150 - 90) / (350 + 90)
        let rr = analysis.reward_to_risk_raw.unwrap();
        assert!((rr - 60.0 / 440.0).abs() < 1e-9);
        assert_eq!(analysis.reward_to_risk_display, "0.14");
        assert!(analysis.has_badge(BadgeKind::LowRewardToRisk));
        assert_eq!(analysis.severity, Severity::Orange);
    }

    #[test]
    fn loss_limit_on_credit_spread_uses_credit() {
        // loss of $330 is 220% of the $150 credit
        let (group, legs) = bull_put(dec!(-330), 30);
        let analysis = RollAnalyzer::with_defaults()
            .analyze("Bull Put Spread", &group, &legs)
            .unwrap();
        assert!(analysis.has_badge(BadgeKind::LossLimit));
        assert!((analysis.pct_max_loss - 330.0 / 350.0 * 100.0).abs() < 1e-9);
        assert_eq!(analysis.severity, Severity::Red);
        // remaining reward 480 over remaining risk 20
        assert_eq!(analysis.reward_to_risk_display, "10+");
    }

    #[test]
    fn late_stage_badge() {
        let (group, legs) = bull_put(Decimal::ZERO, 14);
        let analysis = RollAnalyzer::with_defaults()
            .analyze("Bull Put Spread", &group, &legs)
            .unwrap();
        assert!(analysis.has_badge(BadgeKind::LateStage));
        assert!(!analysis.has_badge(BadgeKind::ProfitTarget));
        assert_eq!(analysis.dte, 14);

        let (group, legs) = bull_put(Decimal::ZERO, 0);
        let expired = RollAnalyzer::with_defaults()
            .analyze("Bull Put Spread", &group, &legs)
            .unwrap();
        assert!(!expired.has_badge(BadgeKind::LateStage));
    }

    #[test]
    fn debit_spread_bounds() {
        let expiry = as_of() + chrono::Days::new(60);
        let long = Leg::option("SPY", OptionType::Call, dec!(100), expiry, 2, dec!(-800))
            .with_unrealized_pnl(dec!(-250));
        let short = Leg::option("SPY", OptionType::Call, dec!(105), expiry, -2, dec!(300));
        let group = PositionGroup::new("g2", "acct", "SPY", vec![long.clone(), short.clone()]);
        let legs = vec![enriched(long, 60, 0.55), enriched(short, 60, 0.35)];

        let analysis = RollAnalyzer::with_defaults()
            .analyze("Bull Call Spread", &group, &legs)
            .unwrap();
        assert!(!analysis.is_credit);
        assert_eq!(analysis.contracts, 2);
        assert_eq!(analysis.max_loss, dec!(500));
        assert_eq!(analysis.max_profit, dec!(500));
        assert!((analysis.pct_max_loss - 50.0).abs() < 1e-9);
        // 50% is not above the 50% limit
        assert!(!analysis.has_badge(BadgeKind::LossLimit));
    }

    #[test]
    fn missing_target_suppresses_profit_and_loss_badges() {
        let (group, legs) = bull_put(dec!(140), 10);
        let analyzer = RollAnalyzer::new(RollParams::default(), Vec::new());
        let analysis = analyzer.analyze("Bull Put Spread", &group, &legs).unwrap();
        assert!(!analysis.has_badge(BadgeKind::ProfitTarget));
        assert!(analysis.has_badge(BadgeKind::LateStage));
    }

    #[test]
    fn non_verticals_and_disabled_return_none() {
        let (group, legs) = bull_put(dec!(90), 30);
        assert!(RollAnalyzer::with_defaults().analyze("Iron Condor", &group, &legs).is_none());

        let disabled = RollAnalyzer::new(
            RollParams {
                enabled: false,
                ..RollParams::default()
            },
            default_targets(),
        );
        assert!(disabled.analyze("Bull Put Spread", &group, &legs).is_none());
    }
}
