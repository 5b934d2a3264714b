//! Analysis configuration
//!
//! Parsed from a TOML file such as:
//!
//! ```toml
//! system_root_component_name = "COOLING"
//! degenerate_threshold = "reject"
//! unknown_components = "ignore"
//!
//! [weights]
//! PUMP_A = 1.0
//! PUMP_B = 2.5
//! ```

use crate::error::{CfpError, CfpResult};
use crate::weights::{TableWeights, UniformWeights, Weights};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Handling of threshold gates whose required count is outside `1..=children`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateThresholdPolicy {
    /// Abort construction with `CfpError::DegenerateThreshold`
    #[default]
    Reject,
    /// Log a warning and give the node no failure paths
    ///
    /// A skipped gate then never contributes to a critical failure, even
    /// one like `KOutOfN { k }` with `k` above its child count that
    /// `ComponentTree::fails_with` reports as always failed.
    Skip,
}

/// Handling of ids in a runtime failed set that are not indexed basics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownComponentPolicy {
    #[default]
    Ignore,
    /// Fail the evaluation with `CfpError::UnknownComponent`
    Reject,
}

/// Configuration of one CFP analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfpConfig {
    /// Name of the component at which the analysis starts
    pub system_root_component_name: String,

    #[serde(default)]
    pub degenerate_threshold: DegenerateThresholdPolicy,

    #[serde(default)]
    pub unknown_components: UnknownComponentPolicy,

    /// Per-component weights by name; empty means uniform weights
    #[serde(default)]
    pub weights: IndexMap<String, f64>,
}

impl CfpConfig {
    /// Create a configuration with default policies
    pub fn new(system_root_component_name: &str) -> Self {
        Self {
            system_root_component_name: system_root_component_name.to_string(),
            degenerate_threshold: DegenerateThresholdPolicy::default(),
            unknown_components: UnknownComponentPolicy::default(),
            weights: IndexMap::new(),
        }
    }

    pub fn with_degenerate_threshold(mut self, policy: DegenerateThresholdPolicy) -> Self {
        self.degenerate_threshold = policy;
        self
    }

    pub fn with_unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.unknown_components = policy;
        self
    }

    pub fn with_weight(mut self, component: &str, weight: f64) -> Self {
        self.weights.insert(component.to_string(), weight);
        self
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(s: &str) -> CfpResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| CfpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> CfpResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> CfpResult<()> {
        if self.system_root_component_name.trim().is_empty() {
            return Err(CfpError::Config(
                "system_root_component_name must not be empty".to_string(),
            ));
        }
        if let Some((name, weight)) = self.weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(CfpError::Config(format!(
                "weight of '{}' is not finite: {}",
                name, weight
            )));
        }
        Ok(())
    }

    /// Weights strategy described by this configuration
    pub fn weights_strategy(&self) -> Arc<dyn Weights> {
        if self.weights.is_empty() {
            Arc::new(UniformWeights)
        } else {
            Arc::new(TableWeights::new(self.weights.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_parse() {
        let config = CfpConfig::from_toml_str(r#"system_root_component_name = "ROOT""#).unwrap();

        assert_eq!(config.system_root_component_name, "ROOT");
        assert_eq!(config.degenerate_threshold, DegenerateThresholdPolicy::Reject);
        assert_eq!(config.unknown_components, UnknownComponentPolicy::Ignore);
        assert!(config.weights.is_empty());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
            system_root_component_name = "COOLING"
            degenerate_threshold = "skip"
            unknown_components = "reject"

            [weights]
            PUMP_B = 2.5
            PUMP_A = 1.0
        "#;

        let config = CfpConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.degenerate_threshold, DegenerateThresholdPolicy::Skip);
        assert_eq!(config.unknown_components, UnknownComponentPolicy::Reject);
        assert_eq!(config.weights.len(), 2);
        assert_eq!(config.weights.get("PUMP_B"), Some(&2.5));
    }

    #[test]
    fn test_missing_root_name_rejected() {
        assert!(matches!(
            CfpConfig::from_toml_str("degenerate_threshold = \"skip\""),
            Err(CfpError::Config(_))
        ));
        assert!(matches!(
            CfpConfig::from_toml_str(r#"system_root_component_name = "  ""#),
            Err(CfpError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_policy_value_rejected() {
        let toml = r#"
            system_root_component_name = "ROOT"
            degenerate_threshold = "maybe"
        "#;
        assert!(CfpConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "system_root_component_name = \"SYSTEM\"").unwrap();

        let config = CfpConfig::from_path(file.path()).unwrap();
        assert_eq!(config, CfpConfig::new("SYSTEM"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            CfpConfig::from_path(dir.path().join("absent.toml")),
            Err(CfpError::Io(_))
        ));
    }
}
