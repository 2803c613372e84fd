//! The node contract consumed by the outline view.
//!
//! Any type can be shown in an [`OutlineView`](crate::widget::OutlineView) by
//! implementing [`OutlineNode`]. The view only ever asks four things of a
//! node: who it is, whether it might have children, whether it is loading them
//! right now, and what its best-known children are.
//!
//! Nodes whose loading flag or children change over time expose a
//! [`Signal`] through [`OutlineNode::changes`]; the view subscribes while the
//! node is visible. [`ChildrenState`] bundles that signal with the children
//! list and loading flag so a node implementation gets the publication rule
//! right for free.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use horizon_outline_core::logging::targets;
use horizon_outline_core::{Property, Signal};

/// Identity of a node, used as the key for expansion and selection
/// membership.
///
/// Blanket-implemented for every type with the required bounds.
pub trait NodeId: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> NodeId for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// The capability set every outline node must provide.
///
/// # Contract
///
/// - [`id`](Self::id) is unique across the forest and never changes.
/// - [`can_have_children`](Self::can_have_children) is a hint for showing an
///   expand affordance; it may be true before any children are known.
/// - [`children`](Self::children) returns immediately with the best-known
///   list. It may start an asynchronous fetch as a side effect, in which case
///   [`is_loading_children`](Self::is_loading_children) reports `true` until
///   the fetch completes, and the new children are published together with
///   the loading flag going back to `false`.
pub trait OutlineNode: Send + Sync + 'static {
    /// The identity type of this node.
    type Id: NodeId;

    /// Returns the stable identity of this node.
    fn id(&self) -> Self::Id;

    /// Returns whether this node should offer an expand affordance.
    fn can_have_children(&self) -> bool;

    /// Returns whether a fetch of this node's children is in flight.
    fn is_loading_children(&self) -> bool;

    /// Returns the currently known children, in display order.
    fn children(&self) -> Vec<Arc<Self>>;

    /// Signal emitted whenever the loading flag or the children change.
    ///
    /// Nodes that never change can keep the default.
    fn changes(&self) -> Option<&Signal<()>> {
        None
    }
}

struct Children<N> {
    nodes: Vec<Arc<N>>,
    loading: bool,
}

/// Children list plus loading flag, published together.
///
/// Both values live behind one lock and every mutation emits
/// [`changed`](Self::changed) after the lock is released, so an observer can
/// never see `loading == false` while the children from a completed fetch are
/// still missing.
pub struct ChildrenState<N> {
    state: Property<Children<N>>,
    changed: Signal<()>,
}

impl<N> fmt::Debug for ChildrenState<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.with(|state| {
            f.debug_struct("ChildrenState")
                .field("len", &state.nodes.len())
                .field("loading", &state.loading)
                .finish()
        })
    }
}

impl<N: Send + Sync + 'static> Default for ChildrenState<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Send + Sync + 'static> ChildrenState<N> {
    /// Creates an empty, not-loading state.
    pub fn new() -> Self {
        Self::with_children(Vec::new())
    }

    /// Creates a state with known children.
    pub fn with_children(nodes: Vec<Arc<N>>) -> Self {
        Self {
            state: Property::new(Children {
                nodes,
                loading: false,
            }),
            changed: Signal::new(),
        }
    }

    /// The change notification signal.
    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }

    /// Returns the best-known children.
    pub fn children(&self) -> Vec<Arc<N>> {
        self.state.with(|state| state.nodes.clone())
    }

    /// Returns the number of known children.
    pub fn len(&self) -> usize {
        self.state.with(|state| state.nodes.len())
    }

    /// Returns true if no children are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.with(|state| state.loading)
    }

    /// Reads children and loading flag under one lock.
    pub fn snapshot(&self) -> (Vec<Arc<N>>, bool) {
        self.state.with(|state| (state.nodes.clone(), state.loading))
    }

    /// Marks a fetch as started.
    ///
    /// Returns `false` (and emits nothing) if one is already in flight.
    pub fn begin_loading(&self) -> bool {
        let started = self.state.update(|state| !std::mem::replace(&mut state.loading, true));
        if started {
            tracing::trace!(target: targets::NODE, "children loading started");
            self.changed.emit(());
        }
        started
    }

    /// Publishes the result of a fetch: new children and `loading = false`.
    pub fn finish_loading(&self, nodes: Vec<Arc<N>>) {
        let count = nodes.len();
        self.state.update(|state| {
            state.nodes = nodes;
            state.loading = false;
        });
        tracing::trace!(target: targets::NODE, count, "children loading finished");
        self.changed.emit(());
    }

    /// Ends a failed fetch, keeping the last-known children.
    ///
    /// Returns `false` if no fetch was in flight.
    pub fn abandon_loading(&self) -> bool {
        let was_loading = self.state.update(|state| std::mem::replace(&mut state.loading, false));
        if was_loading {
            self.changed.emit(());
        }
        was_loading
    }

    /// Sets the loading flag directly. Returns whether it changed.
    pub fn set_loading(&self, loading: bool) -> bool {
        let changed = self
            .state
            .update(|state| std::mem::replace(&mut state.loading, loading) != loading);
        if changed {
            self.changed.emit(());
        }
        changed
    }

    /// Replaces the children without touching the loading flag.
    pub fn set_children(&self, nodes: Vec<Arc<N>>) {
        self.state.update(|state| state.nodes = nodes);
        self.changed.emit(());
    }

    /// Appends a child.
    pub fn push_child(&self, node: Arc<N>) {
        self.state.update(|state| state.nodes.push(node));
        self.changed.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(state: &Arc<ChildrenState<u32>>) -> Arc<Mutex<Vec<(usize, bool)>>> {
        // Records what an observer sees at each notification.
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let weak = Arc::downgrade(state);
        state.changed().connect(move |_| {
            if let Some(state) = weak.upgrade() {
                seen_clone.lock().push((state.len(), state.is_loading()));
            }
        });
        seen
    }

    #[test]
    fn test_loading_lifecycle_publishes_atomically() {
        let state = Arc::new(ChildrenState::<u32>::new());
        let seen = recorder(&state);

        assert!(state.begin_loading());
        assert!(!state.begin_loading());
        assert!(state.is_loading());

        state.finish_loading(vec![Arc::new(1), Arc::new(2)]);
        assert!(!state.is_loading());
        assert_eq!(state.len(), 2);

        // Never (0, false) after loading started.
        assert_eq!(*seen.lock(), vec![(0, true), (2, false)]);
    }

    #[test]
    fn test_abandon_keeps_last_known_children() {
        let state = ChildrenState::with_children(vec![Arc::new(7u32)]);
        assert!(!state.abandon_loading());

        state.begin_loading();
        assert!(state.abandon_loading());
        assert!(!state.is_loading());
        assert_eq!(state.children().len(), 1);
    }

    #[test]
    fn test_set_loading_reports_changes_only() {
        let state = Arc::new(ChildrenState::<u32>::new());
        let seen = recorder(&state);

        assert!(state.set_loading(true));
        assert!(!state.set_loading(true));
        assert!(state.set_loading(false));
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_push_and_set_children_notify() {
        let state = Arc::new(ChildrenState::<u32>::new());
        let seen = recorder(&state);

        state.push_child(Arc::new(1));
        state.set_children(vec![Arc::new(2), Arc::new(3), Arc::new(4)]);

        assert_eq!(*seen.lock(), vec![(1, false), (3, false)]);
        assert!(!state.is_empty());
    }
}
