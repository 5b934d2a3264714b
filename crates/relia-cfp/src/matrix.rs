//! Dense basic-component indexing and the CFP matrix
//!
//! Global ids may be sparse, so every basic component reachable from the
//! analysis root gets a dense index `0..n` in discovery order. That index is
//! the column of the CFP matrix and the position in the weight vector.

use crate::error::CfpResult;
use crate::path::FailurePath;
use crate::tree::{ComponentId, ComponentTree};
use crate::weights::Weights;
use bitvec::prelude::*;
use indexmap::{IndexMap, IndexSet};

/// Bijection between basic-component global ids and dense indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicIndex {
    ids: IndexSet<ComponentId>,
}

impl BasicIndex {
    /// Index the basics reachable from `root`
    pub fn from_tree(tree: &ComponentTree, root: ComponentId) -> CfpResult<Self> {
        Ok(Self {
            ids: tree.basics_below(root)?.into_iter().collect(),
        })
    }

    pub fn dense_index(&self, id: ComponentId) -> Option<usize> {
        self.ids.get_index_of(&id)
    }

    pub fn global_id(&self, dense: usize) -> Option<ComponentId> {
        self.ids.get_index(dense).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(dense index, global id)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, ComponentId)> + '_ {
        self.ids.iter().copied().enumerate()
    }
}

/// 0/1 matrix with one row per minimal path and one column per basic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfpMatrix {
    rows: Vec<BitVec>,
    n_columns: usize,
}

impl CfpMatrix {
    pub fn from_paths(paths: &[FailurePath], n_columns: usize) -> Self {
        let rows = paths
            .iter()
            .map(|path| {
                let mut row = bitvec![0; n_columns];
                for index in path.indices() {
                    row.set(index, true);
                }
                row
            })
            .collect();
        Self { rows, n_columns }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Entry at `(row, column)`; out-of-range entries read as 0
    pub fn get(&self, row: usize, column: usize) -> u8 {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|bit| u8::from(*bit))
            .unwrap_or(0)
    }

    pub fn row(&self, row: usize) -> Option<&BitSlice> {
        self.rows.get(row).map(|r| r.as_bitslice())
    }

    pub fn row_sum(&self, row: usize) -> usize {
        self.rows.get(row).map(|r| r.count_ones()).unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &BitSlice> + '_ {
        self.rows.iter().map(|r| r.as_bitslice())
    }

    /// Dense 0/1 copy, row-major
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|bit| u8::from(*bit)).collect())
            .collect()
    }

    /// Number of minimal paths per order, ascending by order
    pub fn paths_by_order(&self) -> IndexMap<usize, usize> {
        let mut counts: IndexMap<usize, usize> = IndexMap::new();
        for row in &self.rows {
            *counts.entry(row.count_ones()).or_insert(0) += 1;
        }
        counts.sort_keys();
        counts
    }

    /// Columns that alone form a minimal path
    pub fn single_point_failures(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.count_ones() == 1)
            .filter_map(|r| r.first_one())
            .collect()
    }

    /// Largest row sum
    pub fn longest_path_len(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones()).max().unwrap_or(0)
    }
}

/// Read-only lookup tables built once per analysis
#[derive(Debug, Clone)]
pub struct CfpTables {
    pub matrix: CfpMatrix,
    /// Weight of each basic, by dense index
    pub weight_vector: Vec<f64>,
    /// Basics whose failures are marked in a failure-state vector
    pub cfp_mask: BitVec,
    /// Maximum order among the minimal paths
    pub longest_cfp_len: usize,
}

impl CfpTables {
    /// Build the matrix, weight vector and CFP mask for `paths`
    pub fn build(
        tree: &ComponentTree,
        index: &BasicIndex,
        paths: &[FailurePath],
        weights: &dyn Weights,
    ) -> CfpResult<Self> {
        let n = index.len();
        let matrix = CfpMatrix::from_paths(paths, n);

        let mut weight_vector = vec![0.0; n];
        let mut cfp_mask = bitvec![0; n];
        for (dense, id) in index.iter() {
            let component = tree.component(id)?;
            weight_vector[dense] = weights.calculate_component_failure_weight(component);
            cfp_mask.set(dense, weights.is_cfp_component(component));
        }

        let longest_cfp_len = matrix.longest_path_len();

        Ok(Self {
            matrix,
            weight_vector,
            cfp_mask,
            longest_cfp_len,
        })
    }
}
