//! Selection model for outline views.
//!
//! This module provides [`SelectionModel`], which holds one of three
//! selection states and notifies observers when membership changes:
//!
//! - [`SelectionState::None`]: nothing can be selected; every mutation is a
//!   no-op.
//! - [`SelectionState::Single`]: at most one node is selected. Adding a node
//!   replaces whatever was selected before.
//! - [`SelectionState::Multi`]: any set of nodes, keyed by id.
//!
//! Nodes are stored by reference (`Arc<N>`), so [`SelectionModel::values`]
//! hands back the nodes themselves rather than bare ids.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outline::model::{SelectionModel, TreeNode};
//!
//! let selection = SelectionModel::multi();
//! selection.selection_changed.connect(|(selected, deselected)| {
//!     println!("Selection changed: +{} -{}", selected.len(), deselected.len());
//! });
//!
//! let a = Arc::new(TreeNode::new("a"));
//! let b = Arc::new(TreeNode::new("b"));
//! selection.add(a.clone());
//! selection.add(b.clone());
//! assert_eq!(selection.len(), 2);
//!
//! selection.toggle(a.clone());
//! assert!(!selection.contains(&a));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_outline_core::Signal;
use horizon_outline_core::logging::targets;

use super::node::OutlineNode;

/// Which kind of selection a [`SelectionModel`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No items can be selected (default).
    #[default]
    None,
    /// At most one item is selected.
    Single,
    /// Any number of items can be selected.
    Multi,
}

/// Multi-selection membership, keyed by node id.
///
/// Selection order is kept so [`SelectionState::values`] is stable.
pub struct MultiSelection<N: OutlineNode> {
    nodes: HashMap<N::Id, Arc<N>>,
    order: Vec<N::Id>,
}

impl<N: OutlineNode> Default for MultiSelection<N> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<N: OutlineNode> MultiSelection<N> {
    fn insert(&mut self, node: Arc<N>) -> bool {
        let id = node.id();
        let is_new = self.nodes.insert(id.clone(), node).is_none();
        if is_new {
            self.order.push(id);
        }
        is_new
    }

    fn remove(&mut self, id: &N::Id) -> bool {
        if self.nodes.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }

    fn take_all(&mut self) -> Vec<N::Id> {
        self.nodes.clear();
        std::mem::take(&mut self.order)
    }
}

/// The current selection.
pub enum SelectionState<N: OutlineNode> {
    /// Selection disabled.
    None,
    /// Zero or one selected node.
    Single(Option<Arc<N>>),
    /// Any set of selected nodes.
    Multi(MultiSelection<N>),
}

impl<N: OutlineNode> fmt::Debug for SelectionState<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Single(node) => f
                .debug_tuple("Single")
                .field(&node.as_ref().map(|n| n.id()))
                .finish(),
            Self::Multi(multi) => f.debug_tuple("Multi").field(&multi.order).finish(),
        }
    }
}

/// Ids that entered and left the selection during one mutation.
#[derive(Debug)]
struct SelectionDelta<Id> {
    selected: Vec<Id>,
    deselected: Vec<Id>,
}

impl<Id> SelectionDelta<Id> {
    fn empty() -> Self {
        Self {
            selected: Vec::new(),
            deselected: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

impl<N: OutlineNode> SelectionState<N> {
    /// Creates an empty state of the given mode.
    pub fn new(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::None => Self::None,
            SelectionMode::Single => Self::Single(None),
            SelectionMode::Multi => Self::Multi(MultiSelection::default()),
        }
    }

    /// Returns the mode of this state.
    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::None => SelectionMode::None,
            Self::Single(_) => SelectionMode::Single,
            Self::Multi(_) => SelectionMode::Multi,
        }
    }

    /// Returns false only for [`SelectionState::None`].
    pub fn allows_selection(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns whether a node with `id` is selected.
    pub fn contains_id(&self, id: &N::Id) -> bool {
        match self {
            Self::None => false,
            Self::Single(node) => node.as_ref().is_some_and(|n| &n.id() == id),
            Self::Multi(multi) => multi.nodes.contains_key(id),
        }
    }

    /// Returns the selected nodes, in selection order.
    pub fn values(&self) -> Vec<Arc<N>> {
        match self {
            Self::None => Vec::new(),
            Self::Single(node) => node.iter().cloned().collect(),
            Self::Multi(multi) => multi
                .order
                .iter()
                .filter_map(|id| multi.nodes.get(id).cloned())
                .collect(),
        }
    }

    /// Returns the number of selected nodes.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(node) => usize::from(node.is_some()),
            Self::Multi(multi) => multi.nodes.len(),
        }
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add(&mut self, node: Arc<N>) -> SelectionDelta<N::Id> {
        let mut delta = SelectionDelta::empty();
        match self {
            Self::None => {}
            Self::Single(current) => {
                let id = node.id();
                match current.replace(node) {
                    Some(previous) if previous.id() == id => {}
                    Some(previous) => {
                        delta.deselected.push(previous.id());
                        delta.selected.push(id);
                    }
                    None => delta.selected.push(id),
                }
            }
            Self::Multi(multi) => {
                let id = node.id();
                if multi.insert(node) {
                    delta.selected.push(id);
                }
            }
        }
        delta
    }

    fn remove(&mut self, id: &N::Id) -> SelectionDelta<N::Id> {
        let mut delta = SelectionDelta::empty();
        match self {
            Self::None => {}
            Self::Single(current) => {
                if current.as_ref().is_some_and(|n| &n.id() == id) {
                    *current = None;
                    delta.deselected.push(id.clone());
                }
            }
            Self::Multi(multi) => {
                if multi.remove(id) {
                    delta.deselected.push(id.clone());
                }
            }
        }
        delta
    }

    fn remove_all(&mut self) -> SelectionDelta<N::Id> {
        let mut delta = SelectionDelta::empty();
        match self {
            Self::None => {}
            Self::Single(current) => {
                if let Some(previous) = current.take() {
                    delta.deselected.push(previous.id());
                }
            }
            Self::Multi(multi) => delta.deselected = multi.take_all(),
        }
        delta
    }

    fn replace_with(&mut self, node: Arc<N>) -> SelectionDelta<N::Id> {
        match self {
            Self::None => SelectionDelta::empty(),
            Self::Single(_) => self.add(node),
            Self::Multi(multi) => {
                let id = node.id();
                let was_selected = multi.nodes.contains_key(&id);
                let mut deselected = multi.take_all();
                deselected.retain(|existing| existing != &id);
                multi.insert(node);

                SelectionDelta {
                    selected: if was_selected { Vec::new() } else { vec![id] },
                    deselected,
                }
            }
        }
    }
}

/// Observable selection over outline nodes.
///
/// All mutators take `&self`; the state sits behind a lock so a model can be
/// shared between a view and the application. [`selection_changed`] fires
/// once per mutation that changed membership, after the lock is released,
/// with `(newly_selected, newly_deselected)` ids.
///
/// [`selection_changed`]: Self::selection_changed
pub struct SelectionModel<N: OutlineNode> {
    state: RwLock<SelectionState<N>>,
    /// Signal emitted when selection membership changes.
    pub selection_changed: Signal<(Vec<N::Id>, Vec<N::Id>)>,
}

impl<N: OutlineNode> Default for SelectionModel<N> {
    fn default() -> Self {
        Self::none()
    }
}

impl<N: OutlineNode> fmt::Debug for SelectionModel<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel")
            .field("state", &*self.state.read())
            .finish()
    }
}

impl<N: OutlineNode> SelectionModel<N> {
    /// Creates an empty model of the given mode.
    pub fn new(mode: SelectionMode) -> Self {
        Self::from_state(SelectionState::new(mode))
    }

    /// Creates a model from an existing state.
    pub fn from_state(state: SelectionState<N>) -> Self {
        Self {
            state: RwLock::new(state),
            selection_changed: Signal::new(),
        }
    }

    /// A model with selection disabled.
    pub fn none() -> Self {
        Self::new(SelectionMode::None)
    }

    /// A single-selection model.
    pub fn single() -> Self {
        Self::new(SelectionMode::Single)
    }

    /// A multi-selection model.
    pub fn multi() -> Self {
        Self::new(SelectionMode::Multi)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.state.read().mode()
    }

    /// Returns false when selection is disabled.
    pub fn allows_selection(&self) -> bool {
        self.state.read().allows_selection()
    }

    /// Returns whether `node` is selected.
    pub fn contains(&self, node: &N) -> bool {
        self.contains_id(&node.id())
    }

    /// Returns whether a node with `id` is selected.
    pub fn contains_id(&self, id: &N::Id) -> bool {
        self.state.read().contains_id(id)
    }

    /// Returns the selected nodes.
    pub fn values(&self) -> Vec<Arc<N>> {
        self.state.read().values()
    }

    /// Returns the number of selected nodes.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Reads the state without cloning.
    pub fn with_state<R>(&self, f: impl FnOnce(&SelectionState<N>) -> R) -> R {
        f(&self.state.read())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `node`. In single mode this replaces the current selection.
    pub fn add(&self, node: Arc<N>) {
        self.apply(|state| state.add(node));
    }

    /// Removes `node` if selected.
    pub fn remove(&self, node: &N) {
        self.remove_id(&node.id());
    }

    /// Removes the node with `id` if selected.
    pub fn remove_id(&self, id: &N::Id) {
        self.apply(|state| state.remove(id));
    }

    /// Clears the selection.
    pub fn remove_all(&self) {
        self.apply(SelectionState::remove_all);
    }

    /// Selects `node` if unselected, deselects it otherwise.
    ///
    /// In single mode this is select-or-deselect of the one slot.
    pub fn toggle(&self, node: Arc<N>) {
        self.apply(|state| {
            let id = node.id();
            if state.contains_id(&id) {
                state.remove(&id)
            } else {
                state.add(node)
            }
        });
    }

    /// Makes `node` the only selected node, with a single notification.
    pub fn replace_with(&self, node: Arc<N>) {
        self.apply(|state| state.replace_with(node));
    }

    /// Swaps in a new state. Observers hear about the membership difference.
    pub fn set_state(&self, new_state: SelectionState<N>) {
        self.apply(|state| {
            let before: Vec<N::Id> = state.values().iter().map(|n| n.id()).collect();
            *state = new_state;
            let after: Vec<N::Id> = state.values().iter().map(|n| n.id()).collect();

            SelectionDelta {
                selected: after.iter().filter(|id| !before.contains(id)).cloned().collect(),
                deselected: before.iter().filter(|id| !after.contains(id)).cloned().collect(),
            }
        });
    }

    fn apply(&self, f: impl FnOnce(&mut SelectionState<N>) -> SelectionDelta<N::Id>) {
        let delta = {
            let mut state = self.state.write();
            f(&mut state)
        };

        if delta.is_empty() {
            return;
        }
        tracing::trace!(
            target: targets::SELECTION,
            selected = delta.selected.len(),
            deselected = delta.deselected.len(),
            "selection changed"
        );
        self.selection_changed.emit((delta.selected, delta.deselected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use parking_lot::Mutex;

    type Node = TreeNode<&'static str>;
    type Events = Arc<Mutex<Vec<(Vec<u64>, Vec<u64>)>>>;

    fn node(id: u64) -> Arc<Node> {
        Arc::new(TreeNode::new("n").with_id(id))
    }

    fn record(model: &SelectionModel<Node>) -> Events {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        model.selection_changed.connect(move |(selected, deselected)| {
            events_clone.lock().push((selected.clone(), deselected.clone()));
        });
        events
    }

    #[test]
    fn test_default_is_none() {
        let model = SelectionModel::<Node>::default();
        assert_eq!(model.mode(), SelectionMode::None);
        assert!(!model.allows_selection());
    }

    #[test]
    fn test_none_ignores_everything() {
        let model = SelectionModel::none();
        let events = record(&model);

        model.add(node(1));
        model.toggle(node(2));
        model.replace_with(node(3));
        model.remove_all();

        assert!(model.is_empty());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_single_add_replaces() {
        let model = SelectionModel::single();
        let events = record(&model);

        model.add(node(1));
        model.add(node(2));

        assert_eq!(model.len(), 1);
        assert!(model.contains_id(&2));
        assert!(!model.contains_id(&1));
        assert_eq!(*events.lock(), vec![(vec![1], vec![]), (vec![2], vec![1])]);
    }

    #[test]
    fn test_single_readd_updates_reference_silently() {
        let model = SelectionModel::single();
        let events = record(&model);

        let first = node(5);
        let second = node(5);
        model.add(first);
        model.add(second.clone());

        assert!(Arc::ptr_eq(&model.values()[0], &second));
        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn test_single_toggle() {
        let model = SelectionModel::single();

        model.toggle(node(1));
        assert!(model.contains_id(&1));
        model.toggle(node(1));
        assert!(model.is_empty());
        model.toggle(node(1));
        model.toggle(node(2));
        assert!(model.contains_id(&2));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_multi_toggle_and_order() {
        let model = SelectionModel::multi();

        model.add(node(3));
        model.add(node(1));
        model.add(node(2));
        model.toggle(node(1));

        let ids: Vec<u64> = model.values().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_multi_add_existing_is_silent() {
        let model = SelectionModel::multi();
        let events = record(&model);

        model.add(node(1));
        model.add(node(1));
        model.remove_id(&42);

        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn test_replace_with_emits_once() {
        let model = SelectionModel::multi();
        model.add(node(1));
        model.add(node(2));
        let events = record(&model);

        model.replace_with(node(2));

        assert_eq!(model.len(), 1);
        assert!(model.contains_id(&2));
        assert_eq!(*events.lock(), vec![(vec![], vec![1])]);
    }

    #[test]
    fn test_remove_all() {
        let model = SelectionModel::multi();
        model.add(node(1));
        model.add(node(2));
        let events = record(&model);

        model.remove_all();
        model.remove_all();

        assert!(model.is_empty());
        assert_eq!(*events.lock(), vec![(vec![], vec![1, 2])]);
    }

    #[test]
    fn test_set_state_reports_difference() {
        let model = SelectionModel::multi();
        model.add(node(1));
        let events = record(&model);

        let mut next = SelectionState::new(SelectionMode::Single);
        next.add(node(2));
        model.set_state(next);

        assert_eq!(model.mode(), SelectionMode::Single);
        assert_eq!(*events.lock(), vec![(vec![2], vec![1])]);
    }

    #[test]
    fn test_slot_can_query_model() {
        let model = Arc::new(SelectionModel::multi());
        let weak = Arc::downgrade(&model);
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = seen.clone();
        model.selection_changed.connect(move |_| {
            if let Some(model) = weak.upgrade() {
                *seen_clone.lock() = model.len();
            }
        });

        model.add(node(1));
        assert_eq!(*seen.lock(), 1);
    }
}
