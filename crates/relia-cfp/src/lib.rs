//! # Relia CFP
//!
//! Critical failure path analysis for hierarchical reliability models.
//!
//! Given a component tree whose nodes combine their children through
//! `AllRequired`, `KOutOfN` or `ToleratedFault` logic, this crate computes the
//! minimal sets of basic-component failures that fail a chosen system root and
//! packs them into dense tables a simulation engine can query every step:
//!
//! - a 0/1 matrix, one row per minimal path and one column per basic component
//! - a weight vector supplied by a [`Weights`] strategy
//! - the failure-state vector, criticality and distance to critical failure of
//!   a set of currently failed components
//!
//! Path generation is plain enumeration followed by pairwise subset
//! elimination. The number of candidates grows with the binomial coefficients
//! of the threshold gates, so wide `KOutOfN` gates over deep redundant
//! subtrees are the expensive shape.
//!
//! ```
//! use relia_cfp::{CfpAnalysis, CfpConfig, ChildrenLogic, ComponentTree};
//!
//! let mut tree = ComponentTree::new();
//! let a = tree.add_basic("A");
//! let b = tree.add_basic("B");
//! let root = tree.add_compound("ROOT", ChildrenLogic::KOutOfN { k: 1 }, &[a, b]);
//! tree.set_root(root);
//!
//! let analysis = CfpAnalysis::from_config(&tree, &CfpConfig::new("ROOT")).unwrap();
//! assert_eq!(analysis.minimal_path_ids(), vec![vec![a, b]]);
//!
//! let state = analysis.failure_state_vector([a]).unwrap();
//! assert_eq!(analysis.criticality(&state), 1.0);
//! ```

pub mod analysis;
pub mod combinator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod matrix;
pub mod path;
pub mod reducer;
pub mod report;
pub mod tree;
pub mod weights;

pub use analysis::CfpAnalysis;
pub use config::{CfpConfig, DegenerateThresholdPolicy, UnknownComponentPolicy};
pub use error::{CfpError, CfpResult};
pub use evaluator::{FailureStateVector, StepScore};
pub use matrix::{BasicIndex, CfpMatrix};
pub use path::FailurePath;
pub use report::{format_cfp_report, CfpSummary};
pub use tree::{ChildrenLogic, Component, ComponentId, ComponentTree};
pub use weights::{TableWeights, UniformWeights, Weights};
