//! Text rendering of outline rows, for logs and tests.
//!
//! ```text
//! ▾ Documents *
//! ├── ▸ Archive [Loading…]
//! └──   report.txt
//! ```

use std::fmt::{self, Write as _};

use horizon_outline_core::{TreeFormatOptions, TreeStyle};

use crate::model::OutlineNode;

use super::outline_view::{Affordance, OutlineRow};

/// Formats visible rows as an indented tree.
#[derive(Debug, Clone)]
pub struct OutlineDebug {
    options: TreeFormatOptions,
    loading_label: String,
}

impl Default for OutlineDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineDebug {
    /// Create a new formatter with default options.
    pub fn new() -> Self {
        Self::with_options(TreeFormatOptions::default())
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self {
            options,
            loading_label: "Loading\u{2026}".to_string(),
        }
    }

    /// Sets the text appended to loading rows.
    pub fn with_loading_label(mut self, label: impl Into<String>) -> Self {
        self.loading_label = label.into();
        self
    }

    /// Formats `rows`, one line each.
    pub fn format<N, C>(&self, rows: &[OutlineRow<N, C>]) -> String
    where
        N: OutlineNode,
        C: fmt::Display,
    {
        let mut output = String::new();
        // Whether the ancestor at each depth was the last of its siblings.
        let mut last_at_depth: Vec<bool> = Vec::new();

        for row in rows {
            let depth = row.depth();
            last_at_depth.truncate(depth);
            last_at_depth.push(row.is_last_child());

            if self.options.max_depth.is_some_and(|max| depth > max) {
                continue;
            }

            output.push_str(&self.build_prefix(&last_at_depth));
            output.push_str(self.affordance_marker(row.affordance()));
            let _ = write!(output, "{}", row.content());

            if row.is_loading() {
                let _ = write!(output, " [{}]", self.loading_label);
            }
            if self.options.show_selection && row.is_selected() {
                output.push_str(" *");
            }
            if self.options.show_ids {
                let _ = write!(output, " ({:?})", row.id());
            }
            output.push('\n');
        }

        output
    }

    /// Prefix for a row whose ancestry is described by `last_at_depth`.
    fn build_prefix(&self, last_at_depth: &[bool]) -> String {
        let Some((&is_last, ancestors)) = last_at_depth.split_last() else {
            return String::new();
        };
        if ancestors.is_empty() {
            return String::new();
        }

        let (vertical, branch, corner) = self.options.style.glyphs();
        let blank = " ".repeat(vertical.chars().count());

        let mut prefix = String::new();
        // Roots draw no connector, so skip depth 0.
        for &ancestor_last in &ancestors[1..] {
            prefix.push_str(if ancestor_last { &blank } else { vertical });
        }
        prefix.push_str(if is_last { corner } else { branch });
        prefix
    }

    fn affordance_marker(&self, affordance: Affordance) -> &'static str {
        match (self.options.style, affordance) {
            (_, Affordance::None) => "  ",
            (TreeStyle::Ascii, Affordance::Collapsed) => "+ ",
            (TreeStyle::Ascii, Affordance::Expanded) => "- ",
            (_, Affordance::Collapsed) => "\u{25b8} ",
            (_, Affordance::Expanded) => "\u{25be} ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpansionStore, SelectionModel, TreeNode};
    use crate::widget::OutlineView;
    use std::sync::Arc;

    type Node = TreeNode<&'static str>;

    fn sample_view() -> OutlineView<Node, &'static str> {
        let root = TreeNode::new("docs")
            .with_id(1)
            .with_child(
                TreeNode::new("archive")
                    .with_id(2)
                    .with_child(TreeNode::new("old.txt").with_id(4)),
            )
            .with_child(TreeNode::new("notes.txt").with_id(3))
            .into_arc();
        let expansion = Arc::new(ExpansionStore::from_ids([1, 2]));
        OutlineView::new(vec![root], expansion, |node: &Node| *node.data())
            .with_selection(Arc::new(SelectionModel::single()))
    }

    #[test]
    fn test_unicode_tree() {
        let mut view = sample_view();
        let text = OutlineDebug::new().format(view.rows());

        let expected = "\u{25be} docs\n\
                        \u{251c}\u{2500}\u{2500} \u{25be} archive\n\
                        \u{2502}   \u{2514}\u{2500}\u{2500}   old.txt\n\
                        \u{2514}\u{2500}\u{2500}   notes.txt\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_markers_for_loading_and_selection() {
        let mut view = sample_view();
        view.activate(&3);
        view.rows()[0].node().set_loading(true);

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::detailed()
        };
        let text = OutlineDebug::with_options(options)
            .with_loading_label("busy")
            .format(view.rows());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "- docs [busy] (1)");
        assert_eq!(lines[3], "`--   notes.txt * (3)");
    }

    #[test]
    fn test_max_depth() {
        let mut view = sample_view();
        let options = TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        };
        let text = OutlineDebug::with_options(options).format(view.rows());
        assert_eq!(text.lines().count(), 1);
    }
}
