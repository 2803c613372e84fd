//! OutlineView: the incremental renderer for lazily-loaded trees.
//!
//! This module provides [`OutlineView`], which turns a forest of
//! [`OutlineNode`]s plus an [`ExpansionStore`] and a [`SelectionModel`] into a
//! flat list of [`OutlineRow`]s, one per visible node, in depth-first
//! pre-order. Only expanded subtrees are walked, so an arbitrarily large (or
//! infinite) tree costs no more than what is on screen.
//!
//! The view never draws anything itself. A rendering backend reads the rows
//! (all of them, or a window via [`OutlineView::visible_rows`]) and repaints
//! the ranges described by the [`RowChange`]s returned from
//! [`OutlineView::update`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outline::model::{ExpansionStore, OutlineNode, SelectionModel, TreeNode};
//! use horizon_outline::widget::OutlineView;
//!
//! let root = TreeNode::new("Root")
//!     .with_child(TreeNode::new("Child 1"))
//!     .with_child(TreeNode::new("Child 2"))
//!     .into_arc();
//! let root_id = root.id();
//!
//! let expansion = Arc::new(ExpansionStore::new());
//! let mut view = OutlineView::new(vec![root], expansion.clone(), |node: &TreeNode<&'static str>| {
//!     node.data().to_string()
//! })
//! .with_selection(Arc::new(SelectionModel::single()));
//!
//! view.expanded.connect(|id| println!("Expanded {id}"));
//!
//! assert_eq!(view.row_count(), 1);
//! expansion.toggle(root_id);
//! assert_eq!(view.row_count(), 3);
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;

use horizon_outline_core::logging::{span_names, targets};
use horizon_outline_core::{ConnectionId, PerfSpan, Signal};

use crate::config::OutlineConfig;
use crate::model::{ExpansionStore, NodeId, OutlineNode, SelectionModel};

use super::debug::OutlineDebug;

/// Callback producing the embedder's content for a row.
pub type ContentFn<N, C> = Box<dyn Fn(&N) -> C + Send + Sync>;

/// Callback invoked on plain activation, before selection or expansion change.
pub type NodeClickFn<N> = Box<dyn Fn(&Arc<N>) + Send + Sync>;

/// Expand/collapse indicator state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// The node cannot have children; no indicator.
    None,
    /// The node can be expanded.
    Collapsed,
    /// The node is expanded.
    Expanded,
}

/// Modifier state accompanying a row click.
///
/// Decoding platform input into this is left to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    /// The multi-select modifier (Ctrl/Cmd on most platforms) is held.
    pub multi: bool,
}

impl ClickModifiers {
    /// A plain click.
    pub const NONE: Self = Self { multi: false };

    /// A click with the multi-select modifier held.
    pub const MULTI: Self = Self { multi: true };
}

/// A range of rows that changed since the last [`OutlineView::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// `removed` rows starting at `start` were replaced by `inserted` rows.
    Spliced {
        start: usize,
        removed: usize,
        inserted: usize,
    },
    /// Only the row's selection highlight changed.
    Restyled { index: usize },
}

/// One visible node.
pub struct OutlineRow<N: OutlineNode, C> {
    node: Arc<N>,
    id: N::Id,
    depth: usize,
    indent: f32,
    affordance: Affordance,
    loading: bool,
    selected: bool,
    is_last_child: bool,
    content: C,
}

impl<N: OutlineNode, C> OutlineRow<N, C> {
    /// The node shown by this row.
    pub fn node(&self) -> &Arc<N> {
        &self.node
    }

    /// The node's id.
    pub fn id(&self) -> &N::Id {
        &self.id
    }

    /// Nesting level; roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Leading offset of the row's content.
    pub fn indent(&self) -> f32 {
        self.indent
    }

    pub fn affordance(&self) -> Affordance {
        self.affordance
    }

    pub fn is_expanded(&self) -> bool {
        self.affordance == Affordance::Expanded
    }

    /// Whether the loading indicator is shown.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this node is the last among its siblings.
    pub fn is_last_child(&self) -> bool {
        self.is_last_child
    }

    /// The embedder's content for this node.
    pub fn content(&self) -> &C {
        &self.content
    }
}

impl<N: OutlineNode, C: fmt::Debug> fmt::Debug for OutlineRow<N, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineRow")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("affordance", &self.affordance)
            .field("loading", &self.loading)
            .field("selected", &self.selected)
            .field("content", &self.content)
            .finish()
    }
}

/// Work queued by signal slots, applied on the next sync.
enum Invalidation<Id> {
    Expansion(Id),
    Node(Id),
    Selection(Vec<Id>),
}

type InvalidationQueue<Id> = Arc<Mutex<VecDeque<Invalidation<Id>>>>;

/// A virtualized outline over a forest of [`OutlineNode`]s.
///
/// # Signals
///
/// - `expanded(Id)`: Emitted when a row is expanded through the view
/// - `collapsed(Id)`: Emitted when a row is collapsed through the view
///
/// # Gestures
///
/// - [`activate`](Self::activate): plain click. Selects the node, or toggles
///   its expansion when it is already selected (or selection is disabled).
/// - [`activate_modified`](Self::activate_modified): modifier click. Toggles
///   the node's selection membership.
pub struct OutlineView<N: OutlineNode, C> {
    roots: Vec<Arc<N>>,
    expansion: Arc<ExpansionStore<N::Id>>,
    selection: Arc<SelectionModel<N>>,
    content: ContentFn<N, C>,
    on_node_click: Option<NodeClickFn<N>>,
    config: OutlineConfig,

    /// Materialized visible rows.
    rows: Vec<OutlineRow<N, C>>,
    /// Changes not yet handed out by `update`.
    changes: Vec<RowChange>,
    needs_rebuild: bool,

    pending: InvalidationQueue<N::Id>,
    expansion_connection: ConnectionId,
    selection_connection: ConnectionId,
    /// Change subscriptions per node instance, shared by the rows showing it.
    node_connections: HashMap<NodeKey, NodeWatch>,

    // Signals
    /// Emitted when a node is expanded through the view.
    pub expanded: Signal<N::Id>,
    /// Emitted when a node is collapsed through the view.
    pub collapsed: Signal<N::Id>,
}

impl<N: OutlineNode, C> OutlineView<N, C> {
    /// Creates a view over `roots` with selection disabled.
    pub fn new<F>(roots: Vec<Arc<N>>, expansion: Arc<ExpansionStore<N::Id>>, content: F) -> Self
    where
        F: Fn(&N) -> C + Send + Sync + 'static,
    {
        let pending: InvalidationQueue<N::Id> = Arc::new(Mutex::new(VecDeque::new()));
        let selection = Arc::new(SelectionModel::none());
        let expansion_connection = connect_expansion(&expansion, &pending);
        let selection_connection = connect_selection(&selection, &pending);

        Self {
            roots,
            expansion,
            selection,
            content: Box::new(content),
            on_node_click: None,
            config: OutlineConfig::default(),
            rows: Vec::new(),
            changes: Vec::new(),
            needs_rebuild: true,
            pending,
            expansion_connection,
            selection_connection,
            node_connections: HashMap::new(),
            expanded: Signal::new(),
            collapsed: Signal::new(),
        }
    }

    // =========================================================================
    // Builder Pattern
    // =========================================================================

    /// Uses `selection` as the selection model.
    pub fn with_selection(mut self, selection: Arc<SelectionModel<N>>) -> Self {
        self.set_selection(selection);
        self
    }

    /// Sets the plain-activation callback.
    pub fn with_on_node_click<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Arc<N>) + Send + Sync + 'static,
    {
        self.on_node_click = Some(Box::new(callback));
        self
    }

    /// Sets the presentation config.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.set_config(config);
        self
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    pub fn roots(&self) -> &[Arc<N>] {
        &self.roots
    }

    /// Replaces the root list. The next sync re-walks the whole forest.
    pub fn set_roots(&mut self, roots: Vec<Arc<N>>) {
        self.roots = roots;
        self.needs_rebuild = true;
    }

    pub fn expansion(&self) -> &Arc<ExpansionStore<N::Id>> {
        &self.expansion
    }

    pub fn selection(&self) -> &Arc<SelectionModel<N>> {
        &self.selection
    }

    /// Replaces the selection model.
    pub fn set_selection(&mut self, selection: Arc<SelectionModel<N>>) {
        self.selection
            .selection_changed
            .disconnect(self.selection_connection);
        self.selection_connection = connect_selection(&selection, &self.pending);
        self.selection = selection;
        self.needs_rebuild = true;
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Replaces the presentation config.
    pub fn set_config(&mut self, config: OutlineConfig) {
        self.config = config;
        self.needs_rebuild = true;
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Applies pending invalidations and returns the row changes since the
    /// previous call.
    pub fn update(&mut self) -> Vec<RowChange> {
        self.sync();
        std::mem::take(&mut self.changes)
    }

    /// All visible rows, up to date.
    pub fn rows(&mut self) -> &[OutlineRow<N, C>] {
        self.sync();
        &self.rows
    }

    pub fn row_count(&mut self) -> usize {
        self.sync();
        self.rows.len()
    }

    /// The rows within `range`, clamped to the row count.
    pub fn visible_rows(&mut self, range: Range<usize>) -> &[OutlineRow<N, C>] {
        self.sync();
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        &self.rows[start..end]
    }

    pub fn row(&mut self, index: usize) -> Option<&OutlineRow<N, C>> {
        self.sync();
        self.rows.get(index)
    }

    /// Position of the row showing `id`, if it is visible.
    pub fn row_index(&mut self, id: &N::Id) -> Option<usize> {
        self.sync();
        self.find_row(id)
    }

    /// Returns whether `id` is visible and rendered open.
    ///
    /// A node that cannot have children never counts as expanded, even when
    /// its id is in the store. Hidden nodes report `false`; ask the store for
    /// raw membership.
    pub fn is_expanded(&mut self, id: &N::Id) -> bool {
        self.sync();
        self.find_row(id)
            .is_some_and(|index| self.rows[index].affordance == Affordance::Expanded)
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Plain activation of the visible node `id`.
    ///
    /// Calls the node-click callback, then either toggles expansion (node
    /// already selected, or selection disabled) or makes the node the sole
    /// selection. Returns `false` if `id` is not visible.
    pub fn activate(&mut self, id: &N::Id) -> bool {
        let Some(node) = self.visible_node(id) else {
            tracing::trace!(target: targets::VIEW, ?id, "activation of a node that is not visible");
            return false;
        };

        if let Some(callback) = &self.on_node_click {
            callback(&node);
        }

        if !self.selection.allows_selection() || self.selection.contains_id(id) {
            self.toggle_expanded(id);
        } else {
            self.selection.replace_with(node);
        }
        true
    }

    /// Modified activation: toggles selection membership of `id`.
    ///
    /// Expansion is never touched. Returns `false` if `id` is not visible.
    pub fn activate_modified(&mut self, id: &N::Id) -> bool {
        let Some(node) = self.visible_node(id) else {
            tracing::trace!(target: targets::VIEW, ?id, "activation of a node that is not visible");
            return false;
        };

        self.selection.toggle(node);
        true
    }

    /// Dispatches a click on row `row_index` to the matching gesture.
    pub fn handle_click(&mut self, row_index: usize, modifiers: ClickModifiers) -> bool {
        self.sync();
        let Some(id) = self.rows.get(row_index).map(|row| row.id.clone()) else {
            return false;
        };

        if modifiers.multi {
            self.activate_modified(&id)
        } else {
            self.activate(&id)
        }
    }

    /// Flips expansion of the visible node `id`, as an affordance click does.
    ///
    /// Nodes that cannot have children are ignored. Returns whether the
    /// store changed.
    pub fn toggle_expanded(&mut self, id: &N::Id) -> bool {
        let Some(node) = self.visible_node(id) else {
            return false;
        };
        if !node.can_have_children() {
            tracing::trace!(target: targets::VIEW, ?id, "ignoring toggle of a node without children");
            return false;
        }

        if self.expansion.toggle(id.clone()) {
            self.expanded.emit(id.clone());
        } else {
            self.collapsed.emit(id.clone());
        }
        true
    }

    /// Text rendering of the visible rows.
    pub fn debug_dump(&mut self) -> String
    where
        C: fmt::Display,
    {
        self.sync();
        OutlineDebug::new()
            .with_loading_label(self.config.loading_label.clone())
            .format(&self.rows)
    }

    // =========================================================================
    // Incremental Update
    // =========================================================================

    fn sync(&mut self) {
        if !self.needs_rebuild && self.pending.lock().is_empty() {
            return;
        }
        let _span = PerfSpan::new(span_names::VIEW_UPDATE);

        if self.needs_rebuild {
            self.rebuild();
        }

        loop {
            // Slots may enqueue more work while an entry is processed.
            let next = self.pending.lock().pop_front();
            let Some(invalidation) = next else {
                break;
            };

            match invalidation {
                Invalidation::Expansion(id) | Invalidation::Node(id) => self.refresh_subtree(&id),
                Invalidation::Selection(ids) => self.restyle(&ids),
            }
        }
    }

    #[tracing::instrument(skip_all, target = "horizon_outline::view", level = "debug")]
    fn rebuild(&mut self) {
        self.pending.lock().clear();
        self.needs_rebuild = false;

        let old = std::mem::take(&mut self.rows);
        for row in &old {
            self.unwatch(row);
        }

        let roots = self.roots.clone();
        let mut rows = Vec::new();
        self.walk(roots, 0, &mut rows);
        self.rows = rows;

        tracing::debug!(target: targets::VIEW, rows = self.rows.len(), "rebuilt outline");
        self.changes.push(RowChange::Spliced {
            start: 0,
            removed: old.len(),
            inserted: self.rows.len(),
        });
    }

    /// Re-reads the node at `id` and replaces its rendered subtree.
    fn refresh_subtree(&mut self, id: &N::Id) {
        let Some(index) = self.find_row(id) else {
            return;
        };

        let end = self.subtree_end(index);
        let removed: Vec<_> = self.rows.drain(index + 1..end).collect();
        for row in &removed {
            self.unwatch(row);
        }

        let node = self.rows[index].node.clone();
        let depth = self.rows[index].depth;
        let is_last_child = self.rows[index].is_last_child;
        let expanded = self.is_open(&node);
        let children = if expanded { node.children() } else { Vec::new() };

        let row = self.make_row(&node, depth, is_last_child, expanded);
        self.rows[index] = row;

        let mut inserted = Vec::new();
        self.walk(children, depth + 1, &mut inserted);
        let inserted_len = inserted.len();
        self.rows.splice(index + 1..index + 1, inserted);

        tracing::debug!(
            target: targets::VIEW,
            ?id,
            removed = removed.len(),
            inserted = inserted_len,
            "refreshed subtree"
        );
        self.changes.push(RowChange::Spliced {
            start: index,
            removed: removed.len() + 1,
            inserted: inserted_len + 1,
        });
    }

    fn restyle(&mut self, ids: &[N::Id]) {
        let ids: HashSet<&N::Id> = ids.iter().collect();
        for (index, row) in self.rows.iter_mut().enumerate() {
            if !ids.contains(&row.id) {
                continue;
            }
            let selected = self.selection.contains_id(&row.id);
            if row.selected != selected {
                row.selected = selected;
                self.changes.push(RowChange::Restyled { index });
            }
        }
    }

    /// Appends one row per visible node under `nodes`, depth-first.
    ///
    /// Uses an explicit stack, so the depth of the tree is bounded by memory
    /// rather than by the thread's stack.
    fn walk(&mut self, nodes: Vec<Arc<N>>, depth: usize, out: &mut Vec<OutlineRow<N, C>>) {
        let mut stack = vec![WalkFrame {
            nodes,
            next: 0,
            depth,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(node) = frame.nodes.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let is_last_child = frame.next == frame.nodes.len();
            let depth = frame.depth;

            let expanded = self.is_open(&node);
            // Read children before the row so a fetch started here shows up
            // as loading immediately.
            let children = if expanded { node.children() } else { Vec::new() };

            out.push(self.make_row(&node, depth, is_last_child, expanded));
            self.watch(&node);

            if !children.is_empty() {
                stack.push(WalkFrame {
                    nodes: children,
                    next: 0,
                    depth: depth + 1,
                });
            }
        }
    }

    fn make_row(
        &self,
        node: &Arc<N>,
        depth: usize,
        is_last_child: bool,
        expanded: bool,
    ) -> OutlineRow<N, C> {
        let id = node.id();
        let affordance = if expanded {
            Affordance::Expanded
        } else if node.can_have_children() {
            Affordance::Collapsed
        } else {
            Affordance::None
        };

        OutlineRow {
            node: node.clone(),
            depth,
            indent: self.config.indent_for(depth),
            affordance,
            loading: node.is_loading_children(),
            selected: self.selection.contains_id(&id),
            is_last_child,
            content: (self.content)(node),
            id,
        }
    }

    fn is_open(&self, node: &N) -> bool {
        node.can_have_children() && self.expansion.contains(&node.id())
    }

    fn find_row(&self, id: &N::Id) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    /// One past the last descendant row of `index`.
    fn subtree_end(&self, index: usize) -> usize {
        let depth = self.rows[index].depth;
        self.rows[index + 1..]
            .iter()
            .position(|row| row.depth <= depth)
            .map_or(self.rows.len(), |offset| index + 1 + offset)
    }

    fn visible_node(&mut self, id: &N::Id) -> Option<Arc<N>> {
        self.sync();
        self.find_row(id).map(|index| self.rows[index].node.clone())
    }

    /// Counts one more row showing `node`, subscribing on the first.
    fn watch(&mut self, node: &Arc<N>) {
        let Some(changes) = node.changes() else {
            return;
        };

        match self.node_connections.entry(node_key(node)) {
            Entry::Occupied(mut entry) => entry.get_mut().rows += 1,
            Entry::Vacant(entry) => {
                let pending = self.pending.clone();
                let id = node.id();
                let connection = changes.connect(move |_| {
                    pending.lock().push_back(Invalidation::Node(id.clone()));
                });
                entry.insert(NodeWatch { connection, rows: 1 });
            }
        }
    }

    /// Releases `row`'s hold on its node, disconnecting after the last one.
    fn unwatch(&mut self, row: &OutlineRow<N, C>) {
        let key = node_key(&row.node);
        let Some(watch) = self.node_connections.get_mut(&key) else {
            return;
        };
        watch.rows -= 1;
        if watch.rows > 0 {
            return;
        }

        if let Some(watch) = self.node_connections.remove(&key)
            && let Some(changes) = row.node.changes()
        {
            changes.disconnect(watch.connection);
        }
    }
}

impl<N: OutlineNode, C> fmt::Debug for OutlineView<N, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineView")
            .field("roots", &self.roots.len())
            .field("rows", &self.rows.len())
            .field("pending", &self.pending.lock().len())
            .field("needs_rebuild", &self.needs_rebuild)
            .finish()
    }
}

impl<N: OutlineNode, C> Drop for OutlineView<N, C> {
    fn drop(&mut self) {
        self.expansion.toggled.disconnect(self.expansion_connection);
        self.selection
            .selection_changed
            .disconnect(self.selection_connection);
        let rows = std::mem::take(&mut self.rows);
        for row in &rows {
            self.unwatch(row);
        }
    }
}

/// Address of a node instance. Rows keep the `Arc` alive, so the address
/// is stable for as long as it is watched.
type NodeKey = usize;

fn node_key<N>(node: &Arc<N>) -> NodeKey {
    Arc::as_ptr(node) as *const () as NodeKey
}

struct NodeWatch {
    connection: ConnectionId,
    /// Rows currently showing the node.
    rows: usize,
}

/// Pending siblings at one level of [`OutlineView::walk`].
struct WalkFrame<N> {
    nodes: Vec<Arc<N>>,
    next: usize,
    depth: usize,
}

fn connect_expansion<Id: NodeId>(
    store: &ExpansionStore<Id>,
    pending: &InvalidationQueue<Id>,
) -> ConnectionId {
    let pending = pending.clone();
    store.toggled.connect(move |(id, _)| {
        pending.lock().push_back(Invalidation::Expansion(id.clone()));
    })
}

fn connect_selection<N: OutlineNode>(
    selection: &SelectionModel<N>,
    pending: &InvalidationQueue<N::Id>,
) -> ConnectionId {
    let pending = pending.clone();
    selection
        .selection_changed
        .connect(move |(selected, deselected)| {
            let ids = selected.iter().chain(deselected).cloned().collect();
            pending.lock().push_back(Invalidation::Selection(ids));
        })
}
