//! Property-based invariant tests for the outline component.
//!
//! Verifies:
//! 1. Visible rows match a reference reachability walk for random forests
//!    and expansion sets.
//! 2. After any sequence of toggles, child insertions, loading flips and
//!    gestures, the incrementally maintained rows equal a fresh rebuild.
//! 3. Expansion store: a double toggle restores membership.
//! 4. Selection models agree with a reference model for each variant.

use std::collections::HashSet;
use std::sync::Arc;

use horizon_outline::model::{
    ExpansionStore, OutlineNode, SelectionMode, SelectionModel, TreeNode,
};
use horizon_outline::widget::{Affordance, OutlineRow, OutlineView};
use proptest::prelude::*;
use proptest::sample::Index;

type Node = TreeNode<usize>;
type RowSnapshot = (u64, usize, Affordance, bool, bool, bool);

// ── Strategy helpers ──────────────────────────────────────────────────

/// Parent choice per node: `None` for a root, otherwise an earlier node.
fn arb_shape() -> impl Strategy<Value = Vec<(bool, Index)>> {
    prop::collection::vec((any::<bool>(), any::<Index>()), 1..40)
}

#[derive(Debug, Clone)]
enum Op {
    Toggle(Index),
    AddChild(Index),
    SetLoading(Index, bool),
    Activate(Index),
    ActivateModified(Index),
    ToggleHidden(Index),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<Index>().prop_map(Op::Toggle),
        1 => any::<Index>().prop_map(Op::AddChild),
        1 => (any::<Index>(), any::<bool>()).prop_map(|(i, b)| Op::SetLoading(i, b)),
        2 => any::<Index>().prop_map(Op::Activate),
        2 => any::<Index>().prop_map(Op::ActivateModified),
        1 => any::<Index>().prop_map(Op::ToggleHidden),
    ]
}

fn arb_mode() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![
        Just(SelectionMode::None),
        Just(SelectionMode::Single),
        Just(SelectionMode::Multi),
    ]
}

// ── Fixtures ──────────────────────────────────────────────────────────

struct Forest {
    roots: Vec<Arc<Node>>,
    nodes: Vec<Arc<Node>>,
}

impl Forest {
    fn build(shape: &[(bool, Index)]) -> Self {
        let mut roots = Vec::new();
        let mut nodes: Vec<Arc<Node>> = Vec::new();

        for (i, (is_child, parent)) in shape.iter().enumerate() {
            let node = TreeNode::new(i).with_id(i as u64);
            let node = if *is_child && i > 0 {
                nodes[parent.index(i)].push_child(node)
            } else {
                let node = node.into_arc();
                roots.push(node.clone());
                node
            };
            nodes.push(node);
        }

        Self { roots, nodes }
    }

    fn add_child(&mut self, parent: usize) {
        let id = self.nodes.len();
        let child = self.nodes[parent].push_child(TreeNode::new(id).with_id(id as u64));
        self.nodes.push(child);
    }
}

fn make_view(
    roots: &[Arc<Node>],
    expansion: &Arc<ExpansionStore<u64>>,
    selection: &Arc<SelectionModel<Node>>,
) -> OutlineView<Node, usize> {
    OutlineView::new(roots.to_vec(), expansion.clone(), |node: &Node| *node.data())
        .with_selection(selection.clone())
}

fn snapshot(rows: &[OutlineRow<Node, usize>]) -> Vec<RowSnapshot> {
    rows.iter()
        .map(|row| {
            (
                *row.id(),
                row.depth(),
                row.affordance(),
                row.is_loading(),
                row.is_selected(),
                row.is_last_child(),
            )
        })
        .collect()
}

/// Reference walk: (id, depth) of every node reachable through expansion.
fn reachable(nodes: &[Arc<Node>], expanded: &ExpansionStore<u64>, depth: usize, out: &mut Vec<(u64, usize)>) {
    for node in nodes {
        out.push((node.id(), depth));
        if node.can_have_children() && expanded.contains(&node.id()) {
            reachable(&node.children(), expanded, depth + 1, out);
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn visible_rows_match_reachability(
        shape in arb_shape(),
        open in prop::collection::vec(any::<bool>(), 40),
    ) {
        let forest = Forest::build(&shape);
        let expansion = Arc::new(ExpansionStore::from_ids(
            (0..forest.nodes.len()).filter(|i| open[*i]).map(|i| i as u64),
        ));
        let selection = Arc::new(SelectionModel::none());
        let mut view = make_view(&forest.roots, &expansion, &selection);

        let mut expected = Vec::new();
        reachable(&forest.roots, &expansion, 0, &mut expected);
        let actual: Vec<(u64, usize)> = view.rows().iter().map(|r| (*r.id(), r.depth())).collect();
        prop_assert_eq!(actual, expected);

        for row in view.rows() {
            let node = row.node();
            prop_assert_eq!(row.affordance() == Affordance::None, !node.can_have_children());
        }
    }

    #[test]
    fn incremental_rows_equal_fresh_rebuild(
        shape in arb_shape(),
        mode in arb_mode(),
        ops in prop::collection::vec(arb_op(), 1..30),
    ) {
        let mut forest = Forest::build(&shape);
        let expansion = Arc::new(ExpansionStore::new());
        let selection = Arc::new(SelectionModel::new(mode));
        let mut view = make_view(&forest.roots, &expansion, &selection);
        view.update();

        for op in ops {
            let visible: Vec<u64> = view.rows().iter().map(|r| *r.id()).collect();
            let pick = |index: &Index| visible[index.index(visible.len())];

            match op {
                Op::Toggle(i) => {
                    view.toggle_expanded(&pick(&i));
                }
                Op::AddChild(i) => forest.add_child(pick(&i) as usize),
                Op::SetLoading(i, loading) => forest.nodes[pick(&i) as usize].set_loading(loading),
                Op::Activate(i) => {
                    view.activate(&pick(&i));
                }
                Op::ActivateModified(i) => {
                    view.activate_modified(&pick(&i));
                }
                Op::ToggleHidden(i) => {
                    // Store-level toggle of any node, visible or not.
                    let id = i.index(forest.nodes.len()) as u64;
                    expansion.toggle(id);
                }
            }

            let incremental = snapshot(view.rows());
            let mut fresh = make_view(&forest.roots, &expansion, &selection);
            prop_assert_eq!(incremental, snapshot(fresh.rows()));
        }
    }

    #[test]
    fn double_toggle_restores_membership(
        initial in prop::collection::hash_set(0u64..20, 0..10),
        id in 0u64..20,
    ) {
        let store = ExpansionStore::from_ids(initial.iter().copied());
        let before = store.contains(&id);
        store.toggle(id);
        prop_assert_eq!(store.contains(&id), !before);
        store.toggle(id);
        prop_assert_eq!(store.contains(&id), before);
        prop_assert_eq!(store.len(), initial.len());
    }

    #[test]
    fn selection_matches_reference(
        mode in arb_mode(),
        ops in prop::collection::vec((0u8..4, 0u64..8), 1..40),
    ) {
        let nodes: Vec<Arc<Node>> = (0..8)
            .map(|i| TreeNode::new(i).with_id(i as u64).into_arc())
            .collect();
        let model = SelectionModel::new(mode);
        let mut reference: Vec<u64> = Vec::new();

        for (kind, id) in ops {
            let node = nodes[id as usize].clone();
            match kind {
                0 => {
                    model.add(node);
                    match mode {
                        SelectionMode::None => {}
                        SelectionMode::Single => reference = vec![id],
                        SelectionMode::Multi => {
                            if !reference.contains(&id) {
                                reference.push(id);
                            }
                        }
                    }
                }
                1 => {
                    model.remove(&node);
                    reference.retain(|existing| *existing != id);
                }
                2 => {
                    model.toggle(node);
                    if reference.contains(&id) {
                        reference.retain(|existing| *existing != id);
                    } else if mode == SelectionMode::Single {
                        reference = vec![id];
                    } else if mode == SelectionMode::Multi {
                        reference.push(id);
                    }
                }
                _ => {
                    model.replace_with(node);
                    if mode != SelectionMode::None {
                        reference = vec![id];
                    }
                }
            }

            let actual: Vec<u64> = model.values().iter().map(|n| n.id()).collect();
            let actual_set: HashSet<u64> = actual.iter().copied().collect();
            let expected_set: HashSet<u64> = reference.iter().copied().collect();
            prop_assert_eq!(actual_set, expected_set);
            prop_assert_eq!(actual.len(), reference.len());

            match mode {
                SelectionMode::None => prop_assert!(model.is_empty()),
                SelectionMode::Single => prop_assert!(model.len() <= 1),
                SelectionMode::Multi => {}
            }
        }
    }
}
