//! Strategy rule table configuration.

use serde::{Deserialize, Serialize};

use crate::domain::strategy::{
    StrategyDefinition, StrategyTable, StrategyTableError, StrategyTableSpec, standard_definitions,
};

/// Optional override of the built-in rule table.
///
/// With no `definitions`, the built-in definitions are used and `priority`
/// only reorders them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategiesConfig {
    /// Replacement strategy definitions.
    #[serde(default)]
    pub definitions: Vec<StrategyDefinition>,
    /// Names in evaluation order.
    #[serde(default)]
    pub priority: Vec<String>,
}

impl StrategiesConfig {
    /// Build the validated rule table.
    ///
    /// # Errors
    ///
    /// Returns an error when the definitions or priority list are invalid.
    pub fn table(&self) -> Result<StrategyTable, StrategyTableError> {
        if self.definitions.is_empty() && self.priority.is_empty() {
            return Ok(StrategyTable::standard());
        }
        let definitions = if self.definitions.is_empty() {
            standard_definitions()
        } else {
            self.definitions.clone()
        };
        StrategyTable::from_spec(StrategyTableSpec {
            definitions,
            priority: self.priority.clone(),
        })
    }
}
