//! Failure paths as bitsets over dense basic-component indices

use bitvec::prelude::*;

/// A set of basic components whose simultaneous failure fails a node
///
/// Bit `j` is set iff the basic component with dense index `j` belongs to
/// the path. All paths of one analysis share the same width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FailurePath {
    bits: BitVec,
}

impl FailurePath {
    /// Create an empty path over `width` basic components
    pub fn empty(width: usize) -> Self {
        Self {
            bits: bitvec![0; width],
        }
    }

    /// Create the single-member path of one basic component
    pub fn single(width: usize, index: usize) -> Self {
        let mut path = Self::empty(width);
        path.bits.set(index, true);
        path
    }

    /// Create a path from member indices
    pub fn from_indices(width: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut path = Self::empty(width);
        for index in indices {
            path.bits.set(index, true);
        }
        path
    }

    /// Merge another path's members into this one
    pub fn merge(&mut self, other: &FailurePath) {
        for index in other.bits.iter_ones() {
            self.bits.set(index, true);
        }
    }

    /// Whether every member of `self` is also in `other`
    pub fn is_subset_of(&self, other: &FailurePath) -> bool {
        self.bits
            .iter_ones()
            .all(|index| other.bits.get(index).map(|b| *b).unwrap_or(false))
    }

    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Number of member components
    pub fn order(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Member indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn as_bitslice(&self) -> &BitSlice {
        &self.bits
    }
}
