//! XooY gate combinator
//!
//! Expands a threshold gate over `y` children, of which `x` must keep working,
//! into candidate failure paths: every choice of `y - x + 1` children failing
//! together, crossed with every known failure path of each chosen child.

use crate::path::FailurePath;

/// Whether `required_working` of `children` is a threshold the combinator can expand
pub fn is_valid_threshold(required_working: usize, children: usize) -> bool {
    required_working > 0 && required_working <= children
}

/// Candidate failure paths of an `x`-out-of-`y` node
///
/// `child_paths[i]` holds the known failure paths of child `i`. A degenerate
/// threshold (`x == 0` or `x > y`) yields no candidates; callers decide
/// whether that is acceptable. A chosen child with no known paths
/// contributes no merges. Output is not minimized.
pub fn combine_x_oo_y(
    required_working: usize,
    child_paths: &[Vec<FailurePath>],
) -> Vec<FailurePath> {
    let y = child_paths.len();
    if !is_valid_threshold(required_working, y) {
        return Vec::new();
    }

    let failing = y - required_working + 1;
    let mut candidates = Vec::new();

    for chosen in Combinations::new(y, failing) {
        let lists: Vec<&[FailurePath]> = chosen
            .iter()
            .map(|&c| child_paths[c].as_slice())
            .collect();
        cartesian_merge(&lists, &mut candidates);
    }

    candidates
}

/// Append one merged path per tuple of the cartesian product of `lists`
fn cartesian_merge(lists: &[&[FailurePath]], out: &mut Vec<FailurePath>) {
    if lists.is_empty() || lists.iter().any(|l| l.is_empty()) {
        return;
    }

    let mut picks = vec![0usize; lists.len()];
    loop {
        let mut merged = lists[0][picks[0]].clone();
        for (list, &pick) in lists.iter().zip(&picks).skip(1) {
            merged.merge(&list[pick]);
        }
        out.push(merged);

        // Odometer increment, last position fastest
        let mut pos = lists.len();
        loop {
            if pos == 0 {
                return;
            }
            pos -= 1;
            picks[pos] += 1;
            if picks[pos] < lists[pos].len() {
                break;
            }
            picks[pos] = 0;
        }
    }
}

/// Lexicographic `r`-combinations of `0..n` without repetition
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            done: r > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let r = self.indices.len();
        // Rightmost index that can still move
        match (0..r).rev().find(|&i| self.indices[i] < self.n - r + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..r {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}
