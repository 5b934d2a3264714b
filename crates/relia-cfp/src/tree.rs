//! Component tree adapter
//!
//! Read-only view over a reliability tree built by a model loader. Nodes are
//! stored flat and referenced by their stable global id; children lists keep
//! the loader's declaration order.

use crate::error::{CfpError, CfpResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Stable identifier of a component, unique across the whole tree
///
/// Ids may be sparse. They are never used to index matrix columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Create a new component ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rule by which a node's state follows its children's states
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChildrenLogic {
    /// Every child must work: the node fails as soon as any child fails
    #[default]
    AllRequired,
    /// At least `k` children must work: fails once `n - k + 1` children fail
    KOutOfN { k: usize },
    /// Up to `fault_tolerance` children may fail at the same time
    ToleratedFault { fault_tolerance: usize },
    /// A logic known to the model loader but not expandable into failure paths
    Other { kind: String },
}

impl ChildrenLogic {
    /// Number of children that must keep working for the node to work
    ///
    /// `None` for `AllRequired` (every child) and for logics without a
    /// threshold. Saturates at zero when the tolerance exceeds the child count.
    pub fn required_working(&self, n_children: usize) -> Option<usize> {
        match self {
            ChildrenLogic::KOutOfN { k } => Some(*k),
            ChildrenLogic::ToleratedFault { fault_tolerance } => {
                Some(n_children.saturating_sub(*fault_tolerance))
            }
            ChildrenLogic::AllRequired | ChildrenLogic::Other { .. } => None,
        }
    }
}

impl fmt::Display for ChildrenLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildrenLogic::AllRequired => write!(f, "AND"),
            ChildrenLogic::KOutOfN { k } => write!(f, "{}OO", k),
            ChildrenLogic::ToleratedFault { fault_tolerance } => {
                write!(f, "TF{}", fault_tolerance)
            }
            ChildrenLogic::Other { kind } => write!(f, "{}", kind),
        }
    }
}

/// A node in the reliability tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable global identifier
    pub global_id: ComponentId,
    /// Human-readable name, used to locate the analysis root
    pub name: String,
    /// Ordered child ids (empty for basic components)
    #[serde(default)]
    pub children: Vec<ComponentId>,
    /// Gate combining the children's states
    #[serde(default)]
    pub children_logic: ChildrenLogic,
}

impl Component {
    /// Create a basic (leaf) component
    pub fn basic(global_id: ComponentId, name: &str) -> Self {
        Self {
            global_id,
            name: name.to_string(),
            children: Vec::new(),
            children_logic: ChildrenLogic::AllRequired,
        }
    }

    /// Create a compound component over `children`
    pub fn compound(
        global_id: ComponentId,
        name: &str,
        children_logic: ChildrenLogic,
        children: &[ComponentId],
    ) -> Self {
        Self {
            global_id,
            name: name.to_string(),
            children: children.to_vec(),
            children_logic,
        }
    }

    /// Basic components are the leaves whose failures the simulation tracks
    pub fn is_basic(&self) -> bool {
        self.children.is_empty()
    }
}

/// Immutable reliability tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentTree {
    /// Declared root of the whole model
    pub root: Option<ComponentId>,
    /// All components in declaration order
    pub components: Vec<Component>,
    /// Lookup by global id
    #[serde(skip)]
    index: IndexMap<ComponentId, usize>,
    #[serde(skip)]
    next_id: u64,
}

impl ComponentTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from loader output, rejecting duplicate ids
    pub fn from_components(
        root: Option<ComponentId>,
        components: Vec<Component>,
    ) -> CfpResult<Self> {
        let mut tree = Self {
            root,
            components,
            index: IndexMap::new(),
            next_id: 0,
        };
        tree.rebuild_index()?;
        Ok(tree)
    }

    /// Rebuild the id lookup (call after deserialization)
    pub fn rebuild_index(&mut self) -> CfpResult<()> {
        self.index.clear();
        for (idx, component) in self.components.iter().enumerate() {
            if self.index.insert(component.global_id, idx).is_some() {
                return Err(CfpError::DuplicateComponent(component.global_id));
            }
        }
        self.next_id = self
            .components
            .iter()
            .map(|c| c.global_id.0 + 1)
            .max()
            .unwrap_or(0);
        Ok(())
    }

    /// Insert a component with an explicit id
    pub fn insert(&mut self, component: Component) -> CfpResult<ComponentId> {
        let id = component.global_id;
        if self.index.contains_key(&id) {
            return Err(CfpError::DuplicateComponent(id));
        }
        self.index.insert(id, self.components.len());
        self.components.push(component);
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(id)
    }

    fn allocate_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a basic component with the next free id
    pub fn add_basic(&mut self, name: &str) -> ComponentId {
        let id = self.allocate_id();
        self.index.insert(id, self.components.len());
        self.components.push(Component::basic(id, name));
        id
    }

    /// Add a compound component with the next free id
    pub fn add_compound(
        &mut self,
        name: &str,
        children_logic: ChildrenLogic,
        children: &[ComponentId],
    ) -> ComponentId {
        let id = self.allocate_id();
        self.index.insert(id, self.components.len());
        self.components
            .push(Component::compound(id, name, children_logic, children));
        id
    }

    /// Set the declared tree root
    pub fn set_root(&mut self, id: ComponentId) {
        self.root = Some(id);
    }

    /// Get a component by id
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.index.get(&id).and_then(|&idx| self.components.get(idx))
    }

    /// Get a component by id, failing on unknown ids
    pub fn component(&self, id: ComponentId) -> CfpResult<&Component> {
        self.get(id).ok_or(CfpError::UnknownComponent(id))
    }

    pub fn children(&self, id: ComponentId) -> CfpResult<&[ComponentId]> {
        Ok(&self.component(id)?.children)
    }

    pub fn is_basic(&self, id: ComponentId) -> CfpResult<bool> {
        Ok(self.component(id)?.is_basic())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components reachable from `start`, in depth-first pre-order
    ///
    /// Each component is listed once even if several parents share it.
    pub fn reachable(&self, start: ComponentId) -> CfpResult<Vec<ComponentId>> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let component = self.component(id)?;
            order.push(id);
            // Reverse so the first child is visited first
            stack.extend(component.children.iter().rev().copied());
        }

        Ok(order)
    }

    /// Basic components reachable from `start`, in discovery order
    pub fn basics_below(&self, start: ComponentId) -> CfpResult<Vec<ComponentId>> {
        let reachable = self.reachable(start)?;
        let mut basics = Vec::new();
        for id in reachable {
            if self.component(id)?.is_basic() {
                basics.push(id);
            }
        }
        Ok(basics)
    }

    /// Locate a component by name among those reachable from the declared root
    pub fn find_by_name(&self, name: &str) -> CfpResult<ComponentId> {
        let not_found = || CfpError::RootNotFound {
            name: name.to_string(),
        };
        let root = self.root.ok_or_else(not_found)?;
        for id in self.reachable(root)? {
            if self.component(id)?.name == name {
                return Ok(id);
            }
        }
        Err(not_found())
    }

    /// Evaluate whether `node` is failed when exactly `failed` basics are down
    ///
    /// Direct reading of the gate semantics, independent of the path
    /// generator. Failed ids that are not basics are ignored. Degenerate
    /// thresholds are read literally, so a `KOutOfN` with `k` above its
    /// child count is failed even with nothing down.
    pub fn fails_with(&self, node: ComponentId, failed: &HashSet<ComponentId>) -> CfpResult<bool> {
        let component = self.component(node)?;
        if component.is_basic() {
            return Ok(failed.contains(&node));
        }

        let n = component.children.len();
        let mut failed_children = 0;
        for &child in &component.children {
            if self.fails_with(child, failed)? {
                failed_children += 1;
            }
        }

        match &component.children_logic {
            ChildrenLogic::AllRequired => Ok(failed_children > 0),
            ChildrenLogic::KOutOfN { k } => Ok(n - failed_children < *k),
            ChildrenLogic::ToleratedFault { fault_tolerance } => {
                Ok(failed_children > *fault_tolerance)
            }
            ChildrenLogic::Other { kind } => Err(CfpError::UnsupportedChildrenLogic {
                component: component.name.clone(),
                logic: kind.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> (ComponentTree, [ComponentId; 4]) {
        let mut tree = ComponentTree::new();
        let a = tree.add_basic("A");
        let b = tree.add_basic("B");
        let pump = tree.add_compound("PUMP", ChildrenLogic::KOutOfN { k: 1 }, &[a, b]);
        let system = tree.add_compound("SYSTEM", ChildrenLogic::AllRequired, &[pump]);
        tree.set_root(system);
        (tree, [a, b, pump, system])
    }

    #[test]
    fn test_tree_creation() {
        let (tree, [a, _, pump, system]) = create_test_tree();

        assert_eq!(tree.len(), 4);
        assert!(tree.is_basic(a).unwrap());
        assert!(!tree.is_basic(pump).unwrap());
        assert_eq!(tree.children(system).unwrap(), &[pump]);
    }

    #[test]
    fn test_reachable_preorder() {
        let (tree, [a, b, pump, system]) = create_test_tree();

        assert_eq!(tree.reachable(system).unwrap(), vec![system, pump, a, b]);
        assert_eq!(tree.basics_below(system).unwrap(), vec![a, b]);
        assert_eq!(tree.basics_below(a).unwrap(), vec![a]);
    }

    #[test]
    fn test_find_by_name() {
        let (tree, [_, _, pump, _]) = create_test_tree();

        assert_eq!(tree.find_by_name("PUMP").unwrap(), pump);
        assert!(matches!(
            tree.find_by_name("VALVE"),
            Err(CfpError::RootNotFound { name }) if name == "VALVE"
        ));
    }

    #[test]
    fn test_find_by_name_ignores_unreachable() {
        let (mut tree, _) = create_test_tree();
        tree.add_basic("ORPHAN");

        assert!(tree.find_by_name("ORPHAN").is_err());
    }

    #[test]
    fn test_find_by_name_without_root() {
        let mut tree = ComponentTree::new();
        tree.add_basic("A");

        assert!(matches!(
            tree.find_by_name("A"),
            Err(CfpError::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let components = vec![
            Component::basic(ComponentId(7), "A"),
            Component::basic(ComponentId(7), "B"),
        ];

        assert!(matches!(
            ComponentTree::from_components(None, components),
            Err(CfpError::DuplicateComponent(ComponentId(7)))
        ));
    }

    #[test]
    fn test_sparse_ids_and_allocation() {
        let mut tree = ComponentTree::from_components(
            None,
            vec![Component::basic(ComponentId(40), "A")],
        )
        .unwrap();
        let next = tree.add_basic("B");

        assert_eq!(next, ComponentId(41));
        assert!(tree.insert(Component::basic(ComponentId(40), "C")).is_err());
    }

    #[test]
    fn test_fails_with() {
        let (tree, [a, b, _, system]) = create_test_tree();

        let only_a: HashSet<_> = [a].into_iter().collect();
        let both: HashSet<_> = [a, b].into_iter().collect();

        assert!(!tree.fails_with(system, &HashSet::new()).unwrap());
        assert!(!tree.fails_with(system, &only_a).unwrap());
        assert!(tree.fails_with(system, &both).unwrap());
    }

    #[test]
    fn test_fails_with_tolerated_fault() {
        let mut tree = ComponentTree::new();
        let basics: Vec<_> = ["A", "B", "C"].iter().map(|n| tree.add_basic(n)).collect();
        let top = tree.add_compound(
            "TOP",
            ChildrenLogic::ToleratedFault { fault_tolerance: 1 },
            &basics,
        );

        let one: HashSet<_> = [basics[0]].into_iter().collect();
        let two: HashSet<_> = [basics[0], basics[2]].into_iter().collect();

        assert!(!tree.fails_with(top, &one).unwrap());
        assert!(tree.fails_with(top, &two).unwrap());
    }

    #[test]
    fn test_required_working() {
        assert_eq!(ChildrenLogic::KOutOfN { k: 2 }.required_working(3), Some(2));
        assert_eq!(
            ChildrenLogic::ToleratedFault { fault_tolerance: 1 }.required_working(3),
            Some(2)
        );
        assert_eq!(
            ChildrenLogic::ToleratedFault { fault_tolerance: 5 }.required_working(3),
            Some(0)
        );
        assert_eq!(ChildrenLogic::AllRequired.required_working(3), None);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let (tree, [_, _, pump, _]) = create_test_tree();
        let json = serde_json::to_string(&tree).unwrap();

        let mut loaded: ComponentTree = serde_json::from_str(&json).unwrap();
        assert!(loaded.get(pump).is_none());
        loaded.rebuild_index().unwrap();
        assert_eq!(loaded.get(pump).unwrap().name, "PUMP");
        assert_eq!(
            loaded.get(pump).unwrap().children_logic,
            ChildrenLogic::KOutOfN { k: 1 }
        );
    }
}
