//! Expansion state for outline views.
//!
//! [`ExpansionStore`] is the set of node ids that are currently expanded. It
//! is the single source of truth for expansion: views never keep a private
//! copy, they subscribe to [`ExpansionStore::toggled`] and re-read membership
//! when it fires.
//!
//! A store is usually shared between a view and the application through an
//! `Arc`, so that expansion survives the view being rebuilt or can be
//! persisted (the id set is serializable through [`ExpansionStore::ids`] and
//! [`ExpansionStore::from_ids`]).
//!
//! # Example
//!
//! ```
//! use horizon_outline::model::ExpansionStore;
//!
//! let store = ExpansionStore::new();
//! store.toggled.connect(|(id, expanded)| {
//!     println!("{id:?} is now {}", if *expanded { "open" } else { "closed" });
//! });
//!
//! assert!(store.toggle(7u64));
//! assert!(store.contains(&7));
//! assert!(!store.toggle(7));
//! ```

use std::collections::HashSet;
use std::fmt;

use parking_lot::RwLock;

use horizon_outline_core::Signal;
use horizon_outline_core::logging::targets;

use super::node::NodeId;

/// Mutable set of expanded node ids with change notification.
pub struct ExpansionStore<Id: NodeId> {
    expanded: RwLock<HashSet<Id>>,
    /// Emitted once per membership change with `(id, is_now_expanded)`.
    pub toggled: Signal<(Id, bool)>,
}

impl<Id: NodeId> Default for ExpansionStore<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: NodeId> fmt::Debug for ExpansionStore<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionStore")
            .field("expanded", &*self.expanded.read())
            .finish()
    }
}

impl<Id: NodeId> ExpansionStore<Id> {
    /// Creates an empty store; everything starts collapsed.
    pub fn new() -> Self {
        Self {
            expanded: RwLock::new(HashSet::new()),
            toggled: Signal::new(),
        }
    }

    /// Creates a store with the given ids already expanded.
    ///
    /// No notifications are emitted for the initial contents.
    pub fn from_ids(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            expanded: RwLock::new(ids.into_iter().collect()),
            toggled: Signal::new(),
        }
    }

    /// Returns whether `id` is expanded.
    pub fn contains(&self, id: &Id) -> bool {
        self.expanded.read().contains(id)
    }

    /// Flips membership of `id` and returns the new state.
    pub fn toggle(&self, id: Id) -> bool {
        let now_expanded = {
            let mut expanded = self.expanded.write();
            if expanded.remove(&id) {
                false
            } else {
                expanded.insert(id.clone());
                true
            }
        };
        self.notify(id, now_expanded);
        now_expanded
    }

    /// Expands `id`. Returns `false` if it was already expanded.
    pub fn expand(&self, id: Id) -> bool {
        let inserted = self.expanded.write().insert(id.clone());
        if inserted {
            self.notify(id, true);
        }
        inserted
    }

    /// Collapses `id`. Returns `false` if it was not expanded.
    pub fn collapse(&self, id: &Id) -> bool {
        let removed = self.expanded.write().remove(id);
        if removed {
            self.notify(id.clone(), false);
        }
        removed
    }

    /// Sets the state of `id` explicitly. Returns whether anything changed.
    pub fn set_expanded(&self, id: Id, expanded: bool) -> bool {
        if expanded {
            self.expand(id)
        } else {
            self.collapse(&id)
        }
    }

    /// Collapses everything, emitting one notification per removed id.
    pub fn collapse_all(&self) {
        let removed: Vec<Id> = self.expanded.write().drain().collect();
        tracing::debug!(target: targets::EXPANSION, count = removed.len(), "collapse all");
        for id in removed {
            self.toggled.emit((id, false));
        }
    }

    /// Returns a snapshot of the expanded ids, in no particular order.
    pub fn ids(&self) -> Vec<Id> {
        self.expanded.read().iter().cloned().collect()
    }

    /// Returns the number of expanded ids.
    pub fn len(&self) -> usize {
        self.expanded.read().len()
    }

    /// Returns true if nothing is expanded.
    pub fn is_empty(&self) -> bool {
        self.expanded.read().is_empty()
    }

    fn notify(&self, id: Id, expanded: bool) {
        tracing::trace!(target: targets::EXPANSION, ?id, expanded, "expansion toggled");
        self.toggled.emit((id, expanded));
    }
}

static_assertions::assert_impl_all!(ExpansionStore<u64>: Send, Sync);
