//! Runtime evaluation of failure states
//!
//! Called once per simulated step per replica. Every operation here only
//! reads the analysis, so one `Arc<CfpAnalysis>` can serve any number of
//! threads.

use crate::analysis::CfpAnalysis;
use crate::config::UnknownComponentPolicy;
use crate::error::{CfpError, CfpResult};
use crate::tree::ComponentId;
use bitvec::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Currently failed CFP components, by dense index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureStateVector {
    bits: BitVec,
}

impl FailureStateVector {
    pub fn empty(width: usize) -> Self {
        Self {
            bits: bitvec![0; width],
        }
    }

    pub fn from_indices(width: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut state = Self::empty(width);
        for index in indices {
            state.bits.set(index, true);
        }
        state
    }

    /// Whether the basic at dense index `index` is marked failed
    pub fn is_marked(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    pub fn count_marked(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn marked(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bitslice(&self) -> &BitSlice {
        &self.bits
    }

    /// Dense 0/1 copy
    pub fn to_dense(&self) -> Vec<u8> {
        self.bits.iter().map(|bit| u8::from(*bit)).collect()
    }
}

/// Scores of one replica at one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepScore {
    pub criticality: f64,
    pub distance: f64,
}

impl CfpAnalysis {
    /// Mark the failed basics that count toward CFP accounting
    ///
    /// Ids that are not indexed basics of this analysis are skipped or
    /// rejected according to the configured `UnknownComponentPolicy`.
    pub fn failure_state_vector<I>(&self, failed: I) -> CfpResult<FailureStateVector>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        self.mark_failed(failed, true)
    }

    /// Mark every failed basic, CFP component or not
    ///
    /// Same handling of unknown ids as `failure_state_vector`.
    pub fn failed_basics<I>(&self, failed: I) -> CfpResult<FailureStateVector>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        self.mark_failed(failed, false)
    }

    fn mark_failed<I>(&self, failed: I, cfp_only: bool) -> CfpResult<FailureStateVector>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        let mut state = FailureStateVector::empty(self.index.len());
        for id in failed {
            match self.index.dense_index(id) {
                Some(dense) => {
                    if !cfp_only || self.tables.cfp_mask[dense] {
                        state.bits.set(dense, true);
                    }
                }
                None => match self.unknown_policy() {
                    UnknownComponentPolicy::Ignore => {
                        trace!("Ignoring failed component {} outside the analysis", id);
                    }
                    UnknownComponentPolicy::Reject => {
                        return Err(CfpError::UnknownComponent(id));
                    }
                },
            }
        }
        Ok(state)
    }

    /// Dot product of a failure state with the weight vector
    pub fn criticality(&self, state: &FailureStateVector) -> f64 {
        state
            .marked()
            .filter_map(|i| self.tables.weight_vector.get(i))
            .sum()
    }

    /// Raw distance from the weights strategy, zero once it reaches the longest path
    pub fn distance_to_critical_failure(&self, state: &FailureStateVector) -> f64 {
        let raw = self.weights.calculate_distance_to_critical_failure(state);
        if raw >= self.tables.longest_cfp_len as f64 {
            0.0
        } else {
            raw
        }
    }

    /// Rows of the matrix whose every member is failed
    ///
    /// Tested against all failed basics, not only the CFP-marked ones.
    pub fn completed_paths<I>(&self, failed: I) -> CfpResult<Vec<usize>>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        let failed = self.failed_basics(failed)?;
        Ok(self
            .paths
            .iter()
            .enumerate()
            .filter(|(_, path)| path.indices().all(|i| failed.is_marked(i)))
            .map(|(row, _)| row)
            .collect())
    }

    /// Whether some minimal path is completely failed
    pub fn is_critical_failure<I>(&self, failed: I) -> CfpResult<bool>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        let failed = self.failed_basics(failed)?;
        Ok(self
            .paths
            .iter()
            .any(|path| path.indices().all(|i| failed.is_marked(i))))
    }

    /// Criticality and distance for one failed set
    pub fn score<I>(&self, failed: I) -> CfpResult<StepScore>
    where
        I: IntoIterator<Item = ComponentId>,
    {
        let state = self.failure_state_vector(failed)?;
        Ok(StepScore {
            criticality: self.criticality(&state),
            distance: self.distance_to_critical_failure(&state),
        })
    }

    /// Score many replicas' failed sets in parallel
    pub fn score_batch(&self, failed_sets: &[Vec<ComponentId>]) -> CfpResult<Vec<StepScore>> {
        failed_sets
            .par_iter()
            .map(|failed| self.score(failed.iter().copied()))
            .collect()
    }
}
