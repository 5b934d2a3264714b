//! Weights strategies
//!
//! A [`Weights`] implementation assigns each basic component a criticality
//! weight, decides which failed components count toward CFP accounting and
//! turns a failure state into a raw distance to critical failure. The
//! analysis only ever calls it through this trait.

use crate::evaluator::FailureStateVector;
use crate::tree::Component;
use indexmap::IndexMap;

/// Criticality strategy consulted by a CFP analysis
///
/// Shared by every simulation replica evaluating the same snapshot, so
/// implementations must be thread-safe and must not change their answers
/// after the analysis is built.
pub trait Weights: Send + Sync {
    /// Weight of one basic component
    fn calculate_component_failure_weight(&self, component: &Component) -> f64;

    /// Whether a failure of `component` is marked in the failure-state vector
    fn is_cfp_component(&self, component: &Component) -> bool;

    /// Raw distance to critical failure of a failure state
    fn calculate_distance_to_critical_failure(&self, state: &FailureStateVector) -> f64;
}

/// Every basic component weighs 1 and counts toward CFP accounting
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeights;

impl Weights for UniformWeights {
    fn calculate_component_failure_weight(&self, _component: &Component) -> f64 {
        1.0
    }

    fn is_cfp_component(&self, _component: &Component) -> bool {
        true
    }

    fn calculate_distance_to_critical_failure(&self, state: &FailureStateVector) -> f64 {
        state.count_marked() as f64
    }
}

/// Weights looked up by component name, zero when absent
///
/// Only components with a non-zero weight are CFP components.
#[derive(Debug, Clone, Default)]
pub struct TableWeights {
    weights: IndexMap<String, f64>,
}

impl TableWeights {
    pub fn new(weights: IndexMap<String, f64>) -> Self {
        Self { weights }
    }

    pub fn with_weight(mut self, component: &str, weight: f64) -> Self {
        self.weights.insert(component.to_string(), weight);
        self
    }

    fn weight_of(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }
}

impl Weights for TableWeights {
    fn calculate_component_failure_weight(&self, component: &Component) -> f64 {
        self.weight_of(&component.name)
    }

    fn is_cfp_component(&self, component: &Component) -> bool {
        self.weight_of(&component.name) != 0.0
    }

    fn calculate_distance_to_critical_failure(&self, state: &FailureStateVector) -> f64 {
        state.count_marked() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ComponentId;

    #[test]
    fn test_uniform_weights() {
        let pump = Component::basic(ComponentId(3), "PUMP");

        assert_eq!(UniformWeights.calculate_component_failure_weight(&pump), 1.0);
        assert!(UniformWeights.is_cfp_component(&pump));
    }

    #[test]
    fn test_table_weights_default_to_zero() {
        let weights = TableWeights::default().with_weight("PUMP", 2.5);
        let pump = Component::basic(ComponentId(0), "PUMP");
        let valve = Component::basic(ComponentId(1), "VALVE");

        assert_eq!(weights.calculate_component_failure_weight(&pump), 2.5);
        assert_eq!(weights.calculate_component_failure_weight(&valve), 0.0);
        assert!(weights.is_cfp_component(&pump));
        assert!(!weights.is_cfp_component(&valve));
    }

    #[test]
    fn test_distance_counts_marked_components() {
        let state = FailureStateVector::from_indices(4, [0, 3]);

        assert_eq!(UniformWeights.calculate_distance_to_critical_failure(&state), 2.0);
        assert_eq!(
            TableWeights::default().calculate_distance_to_critical_failure(&state),
            2.0
        );
    }
}
