//! Error types for critical failure path analysis

use crate::tree::ComponentId;
use thiserror::Error;

/// Result type for CFP operations
pub type CfpResult<T> = std::result::Result<T, CfpError>;

/// Errors raised while building or querying a CFP analysis
#[derive(Debug, Error)]
pub enum CfpError {
    /// The configured system root is not reachable from the tree root
    #[error("System root component '{name}' not found")]
    RootNotFound { name: String },

    /// A node uses a children logic the path generator cannot expand
    #[error("Unsupported children logic '{logic}' on component '{component}'")]
    UnsupportedChildrenLogic { component: String, logic: String },

    /// A threshold gate whose required count is outside `1..=children`
    #[error(
        "Degenerate threshold on component '{component}': {required} of {children} children required"
    )]
    DegenerateThreshold {
        component: String,
        required: usize,
        children: usize,
    },

    /// A reference to a component that is not part of the tree
    #[error("Unknown component {0}")]
    UnknownComponent(ComponentId),

    /// Two components share one global id
    #[error("Duplicate component id {0}")]
    DuplicateComponent(ComponentId),

    /// A component is its own ancestor
    #[error("Cycle detected through component '{component}'")]
    CyclicTree { component: String },

    /// The root produced no failure path at all
    #[error("No critical failure path found below '{root}'")]
    EmptyAnalysis { root: String },

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
