//! Minimality reduction of candidate failure paths

use crate::path::FailurePath;
use indexmap::IndexSet;
use tracing::debug;

/// Keep only the candidates not dominated by a strict subset
///
/// Identical candidates collapse to one. Output is ordered by path order,
/// ties keeping their first-seen order.
pub fn minimize(candidates: Vec<FailurePath>) -> Vec<FailurePath> {
    let candidate_count = candidates.len();
    let unique: IndexSet<FailurePath> = candidates.into_iter().collect();
    let unique_count = unique.len();

    let mut ordered: Vec<FailurePath> = unique.into_iter().collect();
    ordered.sort_by_key(|path| path.order());

    // After dedup and sorting, no later path can be a subset of an earlier one
    let mut minimal: Vec<FailurePath> = Vec::new();
    for path in ordered {
        if !minimal.iter().any(|kept| kept.is_subset_of(&path)) {
            minimal.push(path);
        }
    }

    debug!(
        "Reduced {} candidates ({} unique) to {} minimal paths",
        candidate_count,
        unique_count,
        minimal.len()
    );

    minimal
}

/// Whether no path in `paths` is a subset of another
pub fn is_minimal(paths: &[FailurePath]) -> bool {
    paths.iter().enumerate().all(|(i, a)| {
        paths
            .iter()
            .enumerate()
            .all(|(j, b)| i == j || !a.is_subset_of(b))
    })
}
