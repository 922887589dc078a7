//! Recompute Portfolio Use Case
//!
//! Runs the full analytics pipeline over one snapshot: validate legs,
//! enrich with greeks, classify and score each group, then aggregate and
//! project the whole portfolio.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::dto::{GroupReport, PortfolioReport, Snapshot};
use crate::config::{Config, ConfigError};
use crate::domain::analytics::{ProjectionEngine, RollAnalyzer};
use crate::domain::pricing::GreeksEngine;
use crate::domain::risk::PortfolioAggregator;
use crate::domain::strategy::StrategyClassifier;
use crate::observability;

/// Use case for recomputing portfolio analytics from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecomputePortfolioUseCase {
    greeks: GreeksEngine,
    classifier: StrategyClassifier,
    projection: ProjectionEngine,
    roll: RollAnalyzer,
}

impl RecomputePortfolioUseCase {
    /// Create a new `RecomputePortfolioUseCase`.
    #[must_use]
    pub const fn new(
        greeks: GreeksEngine,
        classifier: StrategyClassifier,
        projection: ProjectionEngine,
        roll: RollAnalyzer,
    ) -> Self {
        Self {
            greeks,
            classifier,
            projection,
            roll,
        }
    }

    /// Build the pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the strategy table is invalid.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let table = config
            .strategies
            .table()
            .map_err(|e| ConfigError::ValidationError(format!("strategies: {e}")))?;
        let greeks = GreeksEngine::new(config.pricing.params());

        Ok(Self::new(
            greeks,
            StrategyClassifier::new(Arc::new(table)),
            ProjectionEngine::new(greeks, config.projection.params()),
            RollAnalyzer::new(config.roll.params(), config.targets.clone()),
        ))
    }

    /// Execute the use case.
    ///
    /// Never fails: invalid legs are reported in `rejected_legs` and
    /// missing market data degrades the affected values.
    #[must_use]
    pub fn execute(&self, snapshot: &Snapshot) -> PortfolioReport {
        let started = Instant::now();
        let as_of = snapshot.as_of;
        let quotes = &snapshot.quotes;

        // 1. Validate legs
        let validated = snapshot.validate();

        // 2. Per-group enrichment, classification and scoring
        let mut groups = Vec::with_capacity(validated.groups.len());
        let mut all_legs = Vec::new();
        for group in &validated.groups {
            let legs = group.consolidated_legs();
            if legs.is_empty() {
                debug!(group_id = %group.group_id, "Group is flat after consolidation");
                continue;
            }

            let enriched = self.greeks.enrich_all(&legs, quotes, as_of);
            let strategy = self.classifier.classify_detailed(&legs);
            let underlying_price = enriched
                .iter()
                .find_map(|l| l.underlying_price)
                .or_else(|| quotes.price(&group.underlying));
            let risk = PortfolioAggregator::snapshot(&enriched, underlying_price, as_of);
            let roll = self.roll.analyze(&strategy.name, group, &enriched);

            debug!(
                group_id = %group.group_id,
                underlying = %group.underlying,
                strategy = %strategy.name,
                legs = legs.len(),
                "Group analyzed"
            );

            groups.push(GroupReport {
                group_id: group.group_id.clone(),
                underlying: group.underlying.clone(),
                account: group.account.clone(),
                strategy,
                risk,
                realized_pnl: group.realized_pnl,
                roll,
            });
            all_legs.extend(enriched);
        }

        // 3. Portfolio rollup and projections
        let portfolio = PortfolioAggregator::aggregate(&all_legs, as_of);
        let theta = self.projection.theta_projection(&all_legs);
        let scenarios = self.projection.stress_test(&all_legs);

        // 4. Metrics
        for leg in &all_legs {
            observability::record_greeks_source(leg.source);
        }
        let missing_quotes = portfolio.per_underlying.iter().filter(|u| u.quote_missing).count();
        observability::record_missing_quotes(missing_quotes);
        observability::record_rejected_legs(validated.rejected.len());
        let elapsed = started.elapsed();
        observability::record_recompute(groups.len(), elapsed.as_secs_f64());

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_us = elapsed.as_micros() as u64;
        info!(
            as_of = %as_of,
            groups = groups.len(),
            legs = all_legs.len(),
            rejected = validated.rejected.len(),
            missing_quotes,
            elapsed_us,
            "Portfolio recomputed"
        );

        PortfolioReport {
            as_of,
            groups,
            portfolio,
            theta,
            scenarios,
            rejected_legs: validated.rejected,
        }
    }
}
