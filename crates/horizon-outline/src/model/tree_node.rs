//! In-memory outline node.
//!
//! `TreeNode<T>` is a ready-made [`OutlineNode`] for data that is already in
//! memory, or that the application fills in by hand (for example from its own
//! background jobs via [`TreeNode::children_state`]).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use horizon_outline_core::Signal;

use super::node::{ChildrenState, OutlineNode};

/// Counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A node holding a value of type `T` and a mutable children list.
///
/// # Example
///
/// ```
/// use horizon_outline::model::{OutlineNode, TreeNode};
///
/// let root = TreeNode::new("Documents")
///     .with_child(TreeNode::new("report.txt"))
///     .with_child(TreeNode::new("Archive").expandable(true));
///
/// assert!(root.can_have_children());
/// assert_eq!(root.children().len(), 2);
/// assert!(root.children()[1].can_have_children());
/// ```
pub struct TreeNode<T> {
    id: u64,
    data: T,
    expandable: AtomicBool,
    children: ChildrenState<TreeNode<T>>,
}

impl<T: fmt::Debug> fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("data", &self.data)
            .field("children", &self.children)
            .finish()
    }
}

impl<T: Send + Sync + 'static> TreeNode<T> {
    /// Creates a childless node with a fresh id.
    pub fn new(data: T) -> Self {
        Self {
            id: next_node_id(),
            data,
            expandable: AtomicBool::new(false),
            children: ChildrenState::new(),
        }
    }

    /// Overrides the generated id.
    ///
    /// Ids must stay unique across every tree shown in one view.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Marks the node as able to have children even while it has none.
    pub fn expandable(self, expandable: bool) -> Self {
        self.expandable.store(expandable, Ordering::Relaxed);
        self
    }

    /// Appends a child.
    pub fn with_child(self, child: TreeNode<T>) -> Self {
        self.children.push_child(Arc::new(child));
        self
    }

    /// Appends several children.
    pub fn with_children(self, children: impl IntoIterator<Item = TreeNode<T>>) -> Self {
        let mut nodes = self.children.children();
        nodes.extend(children.into_iter().map(Arc::new));
        self.children.set_children(nodes);
        self
    }

    /// Wraps the node in an `Arc`, ready to be used as a root.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the node's value.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Access to the children list and loading flag.
    ///
    /// Mutations through the returned state notify any view showing this
    /// node.
    pub fn children_state(&self) -> &ChildrenState<TreeNode<T>> {
        &self.children
    }

    /// Replaces the children.
    pub fn set_children(&self, children: Vec<Arc<TreeNode<T>>>) {
        self.children.set_children(children);
    }

    /// Appends a child and returns it.
    pub fn push_child(&self, child: TreeNode<T>) -> Arc<TreeNode<T>> {
        let child = Arc::new(child);
        self.children.push_child(child.clone());
        child
    }

    /// Sets the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.children.set_loading(loading);
    }

    /// Changes whether the node offers an expand affordance while childless.
    pub fn set_expandable(&self, expandable: bool) {
        if self.expandable.swap(expandable, Ordering::Relaxed) != expandable {
            self.children.changed().emit(());
        }
    }
}

impl<T: Send + Sync + 'static> OutlineNode for TreeNode<T> {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }

    fn can_have_children(&self) -> bool {
        self.expandable.load(Ordering::Relaxed) || !self.children.is_empty()
    }

    fn is_loading_children(&self) -> bool {
        self.children.is_loading()
    }

    fn children(&self) -> Vec<Arc<Self>> {
        self.children.children()
    }

    fn changes(&self) -> Option<&Signal<()>> {
        Some(self.children.changed())
    }
}

static_assertions::assert_impl_all!(TreeNode<String>: Send, Sync);
