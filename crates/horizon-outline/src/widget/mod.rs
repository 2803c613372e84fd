//! Outline rendering.
//!
//! [`OutlineView`] projects the model layer into rows and wires the two row
//! gestures to expansion and selection. [`OutlineDebug`] prints those rows as
//! text.

mod debug;
mod outline_view;

pub use debug::OutlineDebug;
pub use outline_view::{
    Affordance, ClickModifiers, ContentFn, NodeClickFn, OutlineRow, OutlineView, RowChange,
};
