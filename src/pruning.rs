//! Component D: reachability / pruning.
//!
//! From a target generator combo, compute the subgraph that could
//! contribute to a valid variant under the card+template budget, in both
//! the downward (consumption) and upward (production) directions
//! (`spec.md` §4.D). Mutates [`ComboGraph`]'s per-node `state`/`depth`/`down`
//! fields; callers must [`ComboGraph::reset`] between target combos.

use std::collections::BTreeSet;

use crate::domain::{CardId, ComboId, FeatureId, TemplateId};
use crate::graph::{ComboGraph, NodeRef, NodeState};
use crate::snapshot::Snapshot;

/// The subgraph relevant to one target combo: cards/templates reached by
/// the downward pass (these, and only these, count toward the budget), and
/// features/combos reached by either pass (these only affect the secondary
/// objective once they're byproducts).
#[derive(Debug, Clone, Default)]
pub struct PrunedSubgraph {
    pub cards: BTreeSet<CardId>,
    pub templates: BTreeSet<TemplateId>,
    pub features: BTreeSet<FeatureId>,
    pub combos: BTreeSet<ComboId>,
}

/// Compute the pruned subgraph for `target`, or `None` if the target combo
/// cannot be satisfied at all within `max_ingredients` (`spec.md` §4.D, §8
/// "A combo whose needed features are unsatisfiable produces no variants").
///
/// `graph` must have been [`ComboGraph::reset`] since the last call.
pub fn prune(
    graph: &mut ComboGraph,
    snapshot: &Snapshot,
    target: ComboId,
    max_ingredients: usize,
) -> Option<PrunedSubgraph> {
    let down = combo_nodes_down(graph, snapshot, target, 0, 0, max_ingredients)?;

    for &node in &down {
        mark_down(graph, node);
    }

    let mut nodes = down.clone();
    for &node in &down {
        match node {
            NodeRef::Feature(f) => nodes.extend(feature_nodes_up(graph, snapshot, f)),
            NodeRef::Combo(c) => nodes.extend(combo_nodes_up(graph, snapshot, c)),
            NodeRef::Card(_) | NodeRef::Template(_) => {}
        }
    }

    Some(partition(nodes))
}

fn mark_down(graph: &mut ComboGraph, node: NodeRef) {
    match node {
        NodeRef::Card(id) => {
            if let Some(n) = graph.card_mut(id) {
                n.header.down = true;
            }
        }
        NodeRef::Template(id) => {
            if let Some(n) = graph.template_mut(id) {
                n.header.down = true;
            }
        }
        NodeRef::Feature(id) => {
            if let Some(n) = graph.feature_mut(id) {
                n.header.down = true;
            }
        }
        NodeRef::Combo(id) => {
            if let Some(n) = graph.combo_mut(id) {
                n.header.down = true;
            }
        }
    }
}

fn partition(nodes: BTreeSet<NodeRef>) -> PrunedSubgraph {
    let mut out = PrunedSubgraph::default();
    for node in nodes {
        match node {
            NodeRef::Card(id) => {
                out.cards.insert(id);
            }
            NodeRef::Template(id) => {
                out.templates.insert(id);
            }
            NodeRef::Feature(id) => {
                out.features.insert(id);
            }
            NodeRef::Combo(id) => {
                out.combos.insert(id);
            }
        }
    }
    out
}

/// Downward traversal of one combo: `None` means this combo cannot
/// contribute to a variant (budget exceeded, or some needed feature is
/// unsatisfiable or on the current recursion stack).
fn combo_nodes_down(
    graph: &mut ComboGraph,
    snapshot: &Snapshot,
    combo_id: ComboId,
    base_ingredient_count: usize,
    depth: usize,
    max_ingredients: usize,
) -> Option<BTreeSet<NodeRef>> {
    graph.set_combo_state(combo_id, NodeState::Visiting);
    let combo = snapshot
        .combo(combo_id)
        .expect("combo id present in graph must exist in snapshot");

    let cards: BTreeSet<CardId> = combo
        .uses
        .iter()
        .copied()
        .filter(|&c| graph.card_state(c) == NodeState::NotVisited)
        .collect();
    let templates: BTreeSet<TemplateId> = combo
        .requires
        .iter()
        .copied()
        .filter(|&t| graph.template_state(t) == NodeState::NotVisited)
        .collect();

    let ingredient_count = cards.len() + templates.len() + base_ingredient_count;
    if ingredient_count > max_ingredients {
        return None;
    }

    let mut result: BTreeSet<NodeRef> = BTreeSet::new();
    result.insert(NodeRef::Combo(combo_id));

    if combo.needs.is_empty() {
        for &c in &cards {
            set_card_depth(graph, c, depth, NodeState::Visited);
        }
        for &t in &templates {
            set_template_depth(graph, t, depth, NodeState::Visited);
        }
        result.extend(cards.iter().copied().map(NodeRef::Card));
        result.extend(templates.iter().copied().map(NodeRef::Template));
        return Some(result);
    }

    let mut needed_features: BTreeSet<FeatureId> = BTreeSet::new();
    let mut nodes_from_features: BTreeSet<NodeRef> = BTreeSet::new();
    let needs = combo.needs.clone();
    for feature_id in needs {
        if graph.feature_state(feature_id) == NodeState::Visiting {
            // feature currently on the stack: treat as unreachable, drop this combo.
            return None;
        }
        let nodesf = feature_nodes_down(graph, snapshot, feature_id, ingredient_count, depth + 1, max_ingredients);
        if nodesf.is_empty() {
            return None;
        }
        needed_features.insert(feature_id);
        nodes_from_features.extend(nodesf);
    }

    for &c in &cards {
        set_card_depth(graph, c, depth, NodeState::Visited);
    }
    for &t in &templates {
        set_template_depth(graph, t, depth, NodeState::Visited);
    }
    for &f in &needed_features {
        set_feature_depth(graph, f, depth, NodeState::Visited);
    }

    result.extend(cards.iter().copied().map(NodeRef::Card));
    result.extend(templates.iter().copied().map(NodeRef::Template));
    result.extend(needed_features.iter().copied().map(NodeRef::Feature));
    result.extend(nodes_from_features);
    Some(result)
}

/// Downward traversal of one needed feature. An empty result means the
/// feature cannot be produced within budget from this point; the caller
/// treats that as "drop the combo entirely".
fn feature_nodes_down(
    graph: &mut ComboGraph,
    snapshot: &Snapshot,
    feature_id: FeatureId,
    base_ingredient_count: usize,
    depth: usize,
    max_ingredients: usize,
) -> BTreeSet<NodeRef> {
    graph.set_feature_state(feature_id, NodeState::Visiting);
    let granting_cards = graph
        .feature(feature_id)
        .map(|f| f.granting_cards.clone())
        .unwrap_or_default();
    let produced_by = graph
        .feature(feature_id)
        .map(|f| f.produced_by_combos.clone())
        .unwrap_or_default();

    let cards: BTreeSet<CardId> = granting_cards
        .into_iter()
        .filter(|&c| graph.card_state(c) == NodeState::NotVisited)
        .collect();

    let mut combos: BTreeSet<ComboId> = BTreeSet::new();
    let mut other: BTreeSet<NodeRef> = BTreeSet::new();
    for combo_id in produced_by {
        if graph.combo_state(combo_id) == NodeState::NotVisited {
            if let Some(new_other) =
                combo_nodes_down(graph, snapshot, combo_id, base_ingredient_count, depth + 1, max_ingredients)
            {
                combos.insert(combo_id);
                other.extend(new_other);
            }
        }
    }

    // Cards that grant this feature directly are never marked visited here:
    // they are not "consumed" by exploring this feature, only their depth
    // (for the eventual ordering in the composed variant) is recorded.
    for &c in &cards {
        if let Some(node) = graph.card_mut(c) {
            node.header.depth = depth;
        }
    }
    for &c in &combos {
        if let Some(node) = graph.combo_mut(c) {
            node.header.depth = depth;
        }
    }

    let mut result: BTreeSet<NodeRef> = cards.into_iter().map(NodeRef::Card).collect();
    result.extend(combos.into_iter().map(NodeRef::Combo));
    result.extend(other);
    result
}

fn combo_nodes_up(graph: &mut ComboGraph, snapshot: &Snapshot, combo_id: ComboId) -> BTreeSet<NodeRef> {
    graph.set_combo_state(combo_id, NodeState::Visiting);
    let produces = snapshot
        .combo(combo_id)
        .map(|c| c.produces.clone())
        .unwrap_or_default();

    let mut features: BTreeSet<FeatureId> = BTreeSet::new();
    let mut other: BTreeSet<NodeRef> = BTreeSet::new();
    for feature_id in produces {
        if graph.feature_state(feature_id) == NodeState::NotVisited {
            features.insert(feature_id);
            other.extend(feature_nodes_up(graph, snapshot, feature_id));
            graph.set_feature_state(feature_id, NodeState::Visited);
        }
    }

    let mut result: BTreeSet<NodeRef> = features.into_iter().map(NodeRef::Feature).collect();
    result.extend(other);
    result
}

fn feature_nodes_up(graph: &mut ComboGraph, snapshot: &Snapshot, feature_id: FeatureId) -> BTreeSet<NodeRef> {
    graph.set_feature_state(feature_id, NodeState::Visiting);
    let needed_by = graph
        .feature(feature_id)
        .map(|f| f.needed_by_combos.clone())
        .unwrap_or_default();

    let mut combos: BTreeSet<ComboId> = BTreeSet::new();
    let mut other: BTreeSet<NodeRef> = BTreeSet::new();
    for combo_id in needed_by {
        if graph.combo_state(combo_id) == NodeState::NotVisited {
            combos.insert(combo_id);
            other.extend(combo_nodes_up(graph, snapshot, combo_id));
            graph.set_combo_state(combo_id, NodeState::Visited);
        }
    }

    let mut result: BTreeSet<NodeRef> = combos.into_iter().map(NodeRef::Combo).collect();
    result.extend(other);
    result
}

fn set_card_depth(graph: &mut ComboGraph, id: CardId, depth: usize, state: NodeState) {
    if let Some(node) = graph.card_mut(id) {
        node.header.depth = depth;
    }
    graph.set_card_state(id, state);
}

fn set_template_depth(graph: &mut ComboGraph, id: TemplateId, depth: usize, state: NodeState) {
    if let Some(node) = graph.template_mut(id) {
        node.header.depth = depth;
    }
    graph.set_template_state(id, state);
}

fn set_feature_depth(graph: &mut ComboGraph, id: FeatureId, depth: usize, state: NodeState) {
    if let Some(node) = graph.feature_mut(id) {
        node.header.depth = depth;
    }
    graph.set_feature_state(id, state);
}
