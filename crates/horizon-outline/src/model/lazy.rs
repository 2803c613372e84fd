//! Nodes whose children are fetched on demand.
//!
//! [`LazyNode`] wraps a [`LazyItem`] and turns its blocking
//! [`load_children`](LazyItem::load_children) into the non-blocking
//! [`OutlineNode::children`] contract:
//!
//! 1. The first `children()` call marks the node as loading and hands the
//!    fetch to the rayon thread pool. It returns the (empty) known list at
//!    once.
//! 2. When the fetch finishes, the result is posted to the render thread
//!    through a [`DispatchHandle`].
//! 3. On the render thread the new children and `loading = false` are
//!    published together, and the node's change signal fires.
//!
//! A failed fetch is logged and the node simply stops loading. There is no
//! cancellation; [`LazyNode::reload`] starts a fresh fetch.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_outline_core::logging::targets;
use horizon_outline_core::{DispatchHandle, Signal};

use super::node::{ChildrenState, NodeId, OutlineNode};
use crate::error::LoadError;

/// A value that can list its children, possibly slowly.
pub trait LazyItem: Send + Sync + 'static {
    /// Identity of the item, used as the node id.
    type Key: NodeId;

    /// Returns the item's stable key.
    fn key(&self) -> Self::Key;

    /// Whether the item may have children. Cheap; must not block.
    fn may_have_children(&self) -> bool;

    /// Lists the children. Runs on a worker thread and may block.
    fn load_children(&self) -> Result<Vec<Self>, LoadError>
    where
        Self: Sized;
}

/// An [`OutlineNode`] that fetches its children in the background.
pub struct LazyNode<T: LazyItem> {
    item: Arc<T>,
    requested: AtomicBool,
    children: Arc<ChildrenState<LazyNode<T>>>,
    dispatch: DispatchHandle,
}

impl<T: LazyItem + fmt::Debug> fmt::Debug for LazyNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyNode")
            .field("item", &self.item)
            .field("requested", &self.requested.load(Ordering::Relaxed))
            .field("children", &self.children)
            .finish()
    }
}

impl<T: LazyItem> LazyNode<T> {
    /// Creates a node whose fetch results are published via `dispatch`.
    pub fn new(item: T, dispatch: DispatchHandle) -> Self {
        Self {
            item: Arc::new(item),
            requested: AtomicBool::new(false),
            children: Arc::new(ChildrenState::new()),
            dispatch,
        }
    }

    /// Returns the wrapped item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Returns true once a fetch has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Starts a new fetch, keeping the current children until it completes.
    ///
    /// Does nothing while another fetch is in flight.
    pub fn reload(&self) {
        self.requested.store(true, Ordering::Release);
        self.spawn_fetch();
    }

    fn spawn_fetch(&self) {
        if !self.children.begin_loading() {
            return;
        }

        let item = self.item.clone();
        let children = self.children.clone();
        let dispatch = self.dispatch.clone();
        tracing::debug!(target: targets::NODE, key = ?item.key(), "fetching children");

        rayon::spawn(move || {
            let result = item.load_children();
            let publish = dispatch.clone();
            let key = item.key();

            let posted = dispatch.post(move || match result {
                Ok(items) => {
                    let nodes = items
                        .into_iter()
                        .map(|child| Arc::new(LazyNode::new(child, publish.clone())))
                        .collect();
                    children.finish_loading(nodes);
                }
                Err(err) => {
                    tracing::warn!(target: targets::NODE, ?key, error = %err, "failed to load children");
                    children.abandon_loading();
                }
            });

            if let Err(err) = posted {
                tracing::warn!(target: targets::NODE, error = %err, "dropping fetched children");
            }
        });
    }
}

impl<T: LazyItem> OutlineNode for LazyNode<T> {
    type Id = T::Key;

    fn id(&self) -> T::Key {
        self.item.key()
    }

    fn can_have_children(&self) -> bool {
        self.item.may_have_children()
    }

    fn is_loading_children(&self) -> bool {
        self.children.is_loading()
    }

    fn children(&self) -> Vec<Arc<Self>> {
        if self.item.may_have_children() && !self.requested.swap(true, Ordering::AcqRel) {
            self.spawn_fetch();
        }
        self.children.children()
    }

    fn changes(&self) -> Option<&Signal<()>> {
        Some(self.children.changed())
    }
}
