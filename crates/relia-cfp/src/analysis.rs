//! CFP analysis construction
//!
//! Locates the system root, generates and minimizes its failure paths and
//! builds the lookup tables. The resulting [`CfpAnalysis`] is immutable and
//! meant to be shared behind an `Arc` by every simulation replica.

use crate::config::{CfpConfig, UnknownComponentPolicy};
use crate::error::{CfpError, CfpResult};
use crate::generator::PathGenerator;
use crate::matrix::{BasicIndex, CfpMatrix, CfpTables};
use crate::path::FailurePath;
use crate::reducer::minimize;
use crate::tree::{ComponentId, ComponentTree};
use crate::weights::Weights;
use bitvec::prelude::*;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Minimal critical failure paths of one system root and their lookup tables
pub struct CfpAnalysis {
    pub(crate) root: ComponentId,
    pub(crate) root_name: String,
    pub(crate) config: CfpConfig,
    pub(crate) index: BasicIndex,
    pub(crate) paths: Vec<FailurePath>,
    pub(crate) tables: CfpTables,
    pub(crate) weights: Arc<dyn Weights>,
}

impl CfpAnalysis {
    /// Run the analysis over `tree` with an explicit weights strategy
    pub fn new(
        tree: &ComponentTree,
        config: &CfpConfig,
        weights: Arc<dyn Weights>,
    ) -> CfpResult<Self> {
        config.validate()?;
        let root_name = config.system_root_component_name.clone();
        let root = tree.find_by_name(&root_name)?;

        let index = BasicIndex::from_tree(tree, root)?;
        let candidates = PathGenerator::new(tree, &index, config.degenerate_threshold)
            .generate(root)?;
        let candidate_count = candidates.len();

        let paths = minimize(candidates);
        if paths.is_empty() {
            return Err(CfpError::EmptyAnalysis { root: root_name });
        }

        let tables = CfpTables::build(tree, &index, &paths, weights.as_ref())?;

        info!(
            "CFP analysis of '{}': {} basic components, {} candidates, {} minimal paths, longest {}",
            root_name,
            index.len(),
            candidate_count,
            paths.len(),
            tables.longest_cfp_len
        );

        Ok(Self {
            root,
            root_name,
            config: config.clone(),
            index,
            paths,
            tables,
            weights,
        })
    }

    /// Run the analysis with the weights described by the configuration
    pub fn from_config(tree: &ComponentTree, config: &CfpConfig) -> CfpResult<Self> {
        Self::new(tree, config, config.weights_strategy())
    }

    /// Build a fresh snapshot from a reloaded tree, keeping config and weights
    ///
    /// `self` is left untouched so evaluators still holding it keep working.
    pub fn rebuild(&self, tree: &ComponentTree) -> CfpResult<Arc<CfpAnalysis>> {
        Self::new(tree, &self.config, Arc::clone(&self.weights)).map(Arc::new)
    }

    pub fn root(&self) -> ComponentId {
        self.root
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn config(&self) -> &CfpConfig {
        &self.config
    }

    pub fn basic_index(&self) -> &BasicIndex {
        &self.index
    }

    pub fn n_basic_components(&self) -> usize {
        self.index.len()
    }

    /// Minimal paths, in matrix row order
    pub fn minimal_paths(&self) -> &[FailurePath] {
        &self.paths
    }

    /// Minimal paths as global ids
    pub fn minimal_path_ids(&self) -> Vec<Vec<ComponentId>> {
        self.paths
            .iter()
            .map(|p| p.indices().filter_map(|i| self.index.global_id(i)).collect())
            .collect()
    }

    pub fn matrix(&self) -> &CfpMatrix {
        &self.tables.matrix
    }

    pub fn weight_vector(&self) -> &[f64] {
        &self.tables.weight_vector
    }

    pub fn cfp_mask(&self) -> &BitSlice {
        &self.tables.cfp_mask
    }

    pub fn longest_cfp_len(&self) -> usize {
        self.tables.longest_cfp_len
    }

    pub fn paths_by_order(&self) -> IndexMap<usize, usize> {
        self.tables.matrix.paths_by_order()
    }

    /// Basics whose failure alone fails the system root
    pub fn single_point_failures(&self) -> Vec<ComponentId> {
        self.tables
            .matrix
            .single_point_failures()
            .into_iter()
            .filter_map(|i| self.index.global_id(i))
            .collect()
    }

    pub(crate) fn unknown_policy(&self) -> UnknownComponentPolicy {
        self.config.unknown_components
    }
}

impl fmt::Debug for CfpAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CfpAnalysis")
            .field("root", &self.root)
            .field("root_name", &self.root_name)
            .field("n_basic_components", &self.index.len())
            .field("n_minimal_paths", &self.paths.len())
            .field("longest_cfp_len", &self.tables.longest_cfp_len)
            .finish_non_exhaustive()
    }
}
