//! Logging and debugging facilities for Horizon Outline.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Formatting options shared by the text dumps of visible rows
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Outline uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Horizon Outline for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Incremental row update span.
    pub const VIEW_UPDATE: &str = "horizon_outline::view_update";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_outline_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_outline_core::signal";
    /// Render-thread dispatcher target.
    pub const DISPATCH: &str = "horizon_outline_core::dispatch";
    /// Expansion store target.
    pub const EXPANSION: &str = "horizon_outline::expansion";
    /// Selection model target.
    pub const SELECTION: &str = "horizon_outline::selection";
    /// Node loading target.
    pub const NODE: &str = "horizon_outline::node";
    /// Outline view target.
    pub const VIEW: &str = "horizon_outline::view";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation, no branch glyphs.
    Compact,
}

impl TreeStyle {
    /// Returns the (continuation, branch, last-branch) glyphs for this style.
    pub fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Ascii => ("|   ", "+-- ", "`-- "),
            Self::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            Self::Compact => ("  ", "  ", "  "),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node ids.
    pub show_ids: bool,
    /// Whether to mark selected rows.
    pub show_selection: bool,
    /// Maximum depth to print (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_selection: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            style: TreeStyle::Compact,
            show_ids: false,
            show_selection: false,
            max_depth: None,
        }
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_outline::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns with consistent target naming.
#[macro_export]
macro_rules! outline_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! outline_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! outline_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_widths_line_up() {
        for style in [TreeStyle::Ascii, TreeStyle::Unicode] {
            let (vertical, branch, last) = style.glyphs();
            assert_eq!(vertical.chars().count(), branch.chars().count());
            assert_eq!(branch.chars().count(), last.chars().count());
        }
    }

    #[test]
    fn test_format_presets() {
        assert!(TreeFormatOptions::detailed().show_ids);
        let minimal = TreeFormatOptions::minimal();
        assert_eq!(minimal.style, TreeStyle::Compact);
        assert!(!minimal.show_selection);
    }

    #[test]
    fn test_perf_span() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let _span = PerfSpan::new("test_operation");
        outline_debug!("inside perf span");
    }
}
