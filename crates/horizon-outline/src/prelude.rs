//! Prelude module for Horizon Outline.
//!
//! ```
//! use horizon_outline::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Dispatch
// ============================================================================

pub use horizon_outline_core::{ConnectionId, ConnectionType, DispatchHandle, Dispatcher, Signal};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    ExpansionStore, LazyItem, LazyNode, OutlineNode, SelectionMode, SelectionModel, TreeNode,
};

// ============================================================================
// View
// ============================================================================

pub use crate::widget::{Affordance, ClickModifiers, OutlineRow, OutlineView, RowChange};

pub use crate::config::OutlineConfig;
pub use crate::error::{ConfigError, LoadError};
