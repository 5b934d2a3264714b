//! Recursive failure path generator
//!
//! Post-order walk from the analysis root. Leaves fail on their own,
//! `AllRequired` nodes fail whenever any child fails, and threshold nodes are
//! expanded by the XooY combinator. The result is not minimized.

use crate::combinator::{combine_x_oo_y, is_valid_threshold};
use crate::config::DegenerateThresholdPolicy;
use crate::error::{CfpError, CfpResult};
use crate::matrix::BasicIndex;
use crate::path::FailurePath;
use crate::tree::{ChildrenLogic, ComponentId, ComponentTree};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Generates candidate failure paths for nodes of one tree
pub struct PathGenerator<'a> {
    tree: &'a ComponentTree,
    index: &'a BasicIndex,
    policy: DegenerateThresholdPolicy,
    /// Ancestors of the node being expanded
    on_stack: HashSet<ComponentId>,
}

impl<'a> PathGenerator<'a> {
    pub fn new(
        tree: &'a ComponentTree,
        index: &'a BasicIndex,
        policy: DegenerateThresholdPolicy,
    ) -> Self {
        Self {
            tree,
            index,
            policy,
            on_stack: HashSet::new(),
        }
    }

    /// Candidate failure paths of `node`
    ///
    /// Every basic below `node` must be present in the index.
    pub fn generate(&mut self, node: ComponentId) -> CfpResult<Vec<FailurePath>> {
        let tree = self.tree;
        let component = tree.component(node)?;

        if component.is_basic() {
            let dense = self
                .index
                .dense_index(node)
                .ok_or(CfpError::UnknownComponent(node))?;
            return Ok(vec![FailurePath::single(self.index.len(), dense)]);
        }

        if !self.on_stack.insert(node) {
            return Err(CfpError::CyclicTree {
                component: component.name.clone(),
            });
        }

        let mut child_paths = Vec::with_capacity(component.children.len());
        for &child in &component.children {
            child_paths.push(self.generate(child)?);
        }
        self.on_stack.remove(&node);

        let n_children = component.children.len();
        let paths = match &component.children_logic {
            ChildrenLogic::AllRequired => child_paths.into_iter().flatten().collect(),
            logic @ (ChildrenLogic::KOutOfN { .. } | ChildrenLogic::ToleratedFault { .. }) => {
                let required = logic.required_working(n_children).unwrap_or(0);
                if !is_valid_threshold(required, n_children) {
                    match self.policy {
                        DegenerateThresholdPolicy::Reject => {
                            return Err(CfpError::DegenerateThreshold {
                                component: component.name.clone(),
                                required,
                                children: n_children,
                            });
                        }
                        DegenerateThresholdPolicy::Skip => {
                            warn!(
                                "Skipping '{}': {} of {} children required, no failure paths",
                                component.name, required, n_children
                            );
                            return Ok(Vec::new());
                        }
                    }
                }
                combine_x_oo_y(required, &child_paths)
            }
            ChildrenLogic::Other { kind } => {
                return Err(CfpError::UnsupportedChildrenLogic {
                    component: component.name.clone(),
                    logic: kind.clone(),
                });
            }
        };

        debug!(
            "Expanded '{}' ({}, {} children) into {} candidate paths",
            component.name,
            component.children_logic,
            n_children,
            paths.len()
        );

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(
        tree: &ComponentTree,
        root: ComponentId,
        policy: DegenerateThresholdPolicy,
    ) -> CfpResult<Vec<Vec<ComponentId>>> {
        let index = BasicIndex::from_tree(tree, root)?;
        let paths = PathGenerator::new(tree, &index, policy).generate(root)?;
        Ok(paths
            .iter()
            .map(|p| p.indices().filter_map(|i| index.global_id(i)).collect())
            .collect())
    }

    #[test]
    fn test_basic_root() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");

        let paths = generate(&tree, a, DegenerateThresholdPolicy::Reject).unwrap();
        assert_eq!(paths, vec![vec![a]]);
    }

    #[test]
    fn test_all_required_is_union_of_children() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let root = tree.add_compound("ROOT", ChildrenLogic::AllRequired, &[a, b]);

        let paths = generate(&tree, root, DegenerateThresholdPolicy::Reject).unwrap();
        assert_eq!(paths, vec![vec![a], vec![b]]);
    }

    #[test]
    fn test_nested_threshold() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let c = tree.add_basic("C");
        let right = tree.add_compound("RIGHT", ChildrenLogic::KOutOfN { k: 1 }, &[b, c]);
        let root = tree.add_compound("ROOT", ChildrenLogic::AllRequired, &[a, right]);

        let paths = generate(&tree, root, DegenerateThresholdPolicy::Reject).unwrap();
        assert_eq!(paths, vec![vec![a], vec![b, c]]);
    }

    #[test]
    fn test_unsupported_logic_is_fatal() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let spare = tree.add_compound(
            "SPARE",
            ChildrenLogic::Other {
                kind: "cold_standby".to_string(),
            },
            &[a],
        );
        let root = tree.add_compound("ROOT", ChildrenLogic::AllRequired, &[spare]);

        assert!(matches!(
            generate(&tree, root, DegenerateThresholdPolicy::Reject),
            Err(CfpError::UnsupportedChildrenLogic { component, logic })
                if component == "SPARE" && logic == "cold_standby"
        ));
    }

    #[test]
    fn test_degenerate_threshold_reject() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let root = tree.add_compound("ROOT", ChildrenLogic::KOutOfN { k: 3 }, &[a, b]);

        assert!(matches!(
            generate(&tree, root, DegenerateThresholdPolicy::Reject),
            Err(CfpError::DegenerateThreshold { required: 3, children: 2, .. })
        ));
    }

    #[test]
    fn test_degenerate_threshold_reject_saturated_tolerance() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let root = tree.add_compound(
            "ROOT",
            ChildrenLogic::ToleratedFault { fault_tolerance: 2 },
            &[a, b],
        );

        assert!(matches!(
            generate(&tree, root, DegenerateThresholdPolicy::Reject),
            Err(CfpError::DegenerateThreshold { required: 0, children: 2, .. })
        ));
    }

    #[test]
    fn test_degenerate_threshold_skip_excess_k() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let c = tree.add_basic("C");
        let bank = tree.add_compound("BANK", ChildrenLogic::KOutOfN { k: 3 }, &[a, b]);
        let root = tree.add_compound("ROOT", ChildrenLogic::KOutOfN { k: 2 }, &[bank, c]);

        // The skipped bank never fails, so only C can bring the root down
        let paths = generate(&tree, root, DegenerateThresholdPolicy::Skip).unwrap();
        assert_eq!(paths, vec![vec![c]]);
        assert!(tree.fails_with(bank, &HashSet::new()).unwrap());
    }

    #[test]
    fn test_degenerate_threshold_skip() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let c = tree.add_basic("C");
        let tolerant = tree.add_compound(
            "TOLERANT",
            ChildrenLogic::ToleratedFault { fault_tolerance: 2 },
            &[a, b],
        );
        let root = tree.add_compound("ROOT", ChildrenLogic::AllRequired, &[tolerant, c]);

        let paths = generate(&tree, root, DegenerateThresholdPolicy::Skip).unwrap();
        assert_eq!(paths, vec![vec![c]]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let loop_id = ComponentId(a.0 + 1);
        tree.add_compound("LOOP", ChildrenLogic::AllRequired, &[a, loop_id]);

        let index = BasicIndex::from_tree(&tree, loop_id).unwrap();
        let result = PathGenerator::new(&tree, &index, DegenerateThresholdPolicy::Reject)
            .generate(loop_id);

        assert!(matches!(result, Err(CfpError::CyclicTree { component }) if component == "LOOP"));
    }
}
