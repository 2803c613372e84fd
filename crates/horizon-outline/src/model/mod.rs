//! Model layer for Horizon Outline.
//!
//! The outline component reads three independent pieces of state:
//!
//! - the node tree, through the [`OutlineNode`] contract (children may be
//!   unknown, loading, or loaded)
//! - the [`ExpansionStore`], the set of open node ids
//! - the [`SelectionModel`], zero, one or many selected nodes
//!
//! Each piece notifies through a [`Signal`](horizon_outline_core::Signal) when
//! it changes; the [`OutlineView`](crate::widget::OutlineView) is the only
//! component that reads all three together.
//!
//! # Node Implementations
//!
//! - `TreeNode`: in-memory node with a mutable children list
//! - `LazyNode`: wraps a [`LazyItem`] and fetches children in the background
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌────────────────┐
//! │ OutlineNode  │   │ ExpansionStore │   │ SelectionModel │
//! └──────┬───────┘   └───────┬────────┘   └───────┬────────┘
//!        │ changes           │ toggled            │ selection_changed
//!        └───────────────────┼────────────────────┘
//!                            v
//!                     ┌─────────────┐
//!                     │ OutlineView │
//!                     └─────────────┘
//! ```

pub mod expansion;
mod lazy;
mod node;
pub mod selection;
mod tree_node;

pub use expansion::ExpansionStore;
pub use lazy::{LazyItem, LazyNode};
pub use node::{ChildrenState, NodeId, OutlineNode};
pub use selection::{MultiSelection, SelectionMode, SelectionModel, SelectionState};
pub use tree_node::TreeNode;
