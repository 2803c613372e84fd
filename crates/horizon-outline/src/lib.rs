//! Horizon Outline - a lazily-evaluated, virtualized outline (tree) view.
//!
//! This is the main crate; it re-exports the runtime primitives from
//! `horizon-outline-core` and adds the outline component on top:
//!
//! - [`model`]: the node contract, expansion store and selection model
//! - [`widget`]: the incremental renderer producing one row per visible node
//! - [`OutlineConfig`]: presentation settings, loadable from TOML
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_outline::prelude::*;
//!
//! let root = TreeNode::new("Projects")
//!     .with_child(TreeNode::new("horizon"))
//!     .into_arc();
//! let root_id = root.id();
//!
//! let expansion = Arc::new(ExpansionStore::new());
//! let selection = Arc::new(SelectionModel::single());
//! let mut view = OutlineView::new(vec![root], expansion, |node: &TreeNode<&'static str>| {
//!     node.data().to_string()
//! })
//! .with_selection(selection.clone());
//!
//! // First click selects, second click expands.
//! view.activate(&root_id);
//! view.activate(&root_id);
//!
//! assert!(selection.contains_id(&root_id));
//! assert_eq!(view.row_count(), 2);
//! ```

pub use horizon_outline_core::*;

pub mod config;
pub mod error;
pub mod model;
pub mod prelude;
pub mod widget;

pub use config::OutlineConfig;
pub use error::{ConfigError, LoadError};
