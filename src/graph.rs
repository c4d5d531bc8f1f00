//! Component C: the mixed hypergraph built from a [`Snapshot`].
//!
//! Four node kinds, one tagged enum ([`NodeRef`]) used as their shared
//! identity for sets during pruning — a discriminant-dispatched `match`
//! instead of virtual dispatch, since the pruning pass (component D) is the
//! hot path (`spec.md` §9 "Mixed-kind graph node").

use std::collections::BTreeMap;

use crate::domain::{CardId, ComboId, FeatureId, TemplateId};
use crate::snapshot::Snapshot;

/// Visiting state used to break feature↔combo cycles during the downward
/// pruning pass (`spec.md` §4.D, §9 "Cycle safety in pruning"). Distinct
/// from `down`, which records whether a node survived pruning at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum NodeState {
    NotVisited,
    Visiting,
    Visited,
}

/// Mutable auxiliary state shared by every node kind, reset between roots
/// (`spec.md` §4.C "Node auxiliary state").
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeHeader {
    pub depth: usize,
    /// Set once a node survives the downward pruning pass.
    pub down: bool,
}

impl NodeHeader {
    fn reset(&mut self) {
        self.depth = 0;
        self.down = false;
    }
}

#[derive(Debug, Clone)]
pub struct CardNode {
    pub id: CardId,
    pub header: NodeHeader,
    state: NodeState,
}

#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub id: TemplateId,
    pub header: NodeHeader,
    state: NodeState,
}

#[derive(Debug, Clone)]
pub struct FeatureNode {
    pub id: FeatureId,
    pub header: NodeHeader,
    state: NodeState,
    /// Cards that grant this feature directly, without any combo firing.
    pub granting_cards: Vec<CardId>,
    pub produced_by_combos: Vec<ComboId>,
    pub needed_by_combos: Vec<ComboId>,
}

#[derive(Debug, Clone)]
pub struct ComboNode {
    pub id: ComboId,
    pub header: NodeHeader,
    state: NodeState,
}

/// Tagged reference to any one of the four node kinds, used as a `HashSet`/
/// `BTreeSet` element when the pruning pass needs a homogeneous collection
/// of "whatever survived".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRef {
    Card(CardId),
    Template(TemplateId),
    Feature(FeatureId),
    Combo(ComboId),
}

/// The combo graph: nodes plus the reverse adjacency (`produced_by_combos`/
/// `needed_by_combos`) computed once at construction.
pub struct ComboGraph {
    cards: BTreeMap<CardId, CardNode>,
    templates: BTreeMap<TemplateId, TemplateNode>,
    features: BTreeMap<FeatureId, FeatureNode>,
    combos: BTreeMap<ComboId, ComboNode>,
}

impl ComboGraph {
    /// Build the graph's nodes and reverse feature adjacency from a snapshot
    /// (`spec.md` §4.C). Pure function of the snapshot: two graphs built
    /// from the same snapshot are identical.
    pub fn build(snapshot: &Snapshot) -> Self {
        let cards = snapshot
            .cards()
            .map(|c| {
                (
                    c.id,
                    CardNode {
                        id: c.id,
                        header: NodeHeader::default(),
                        state: NodeState::NotVisited,
                    },
                )
            })
            .collect();

        let templates = snapshot
            .templates()
            .map(|t| {
                (
                    t.id,
                    TemplateNode {
                        id: t.id,
                        header: NodeHeader::default(),
                        state: NodeState::NotVisited,
                    },
                )
            })
            .collect();

        let mut features: BTreeMap<FeatureId, FeatureNode> = snapshot
            .features()
            .map(|f| {
                let granting_cards = snapshot
                    .cards()
                    .filter(|c| c.features.contains(&f.id))
                    .map(|c| c.id)
                    .collect();
                (
                    f.id,
                    FeatureNode {
                        id: f.id,
                        header: NodeHeader::default(),
                        state: NodeState::NotVisited,
                        granting_cards,
                        produced_by_combos: Vec::new(),
                        needed_by_combos: Vec::new(),
                    },
                )
            })
            .collect();

        let combos = snapshot
            .combos()
            .map(|c| {
                (
                    c.id,
                    ComboNode {
                        id: c.id,
                        header: NodeHeader::default(),
                        state: NodeState::NotVisited,
                    },
                )
            })
            .collect();

        for combo in snapshot.combos() {
            for &feature_id in &combo.produces {
                if let Some(feature_node) = features.get_mut(&feature_id) {
                    feature_node.produced_by_combos.push(combo.id);
                }
            }
            for &feature_id in &combo.needs {
                if let Some(feature_node) = features.get_mut(&feature_id) {
                    feature_node.needed_by_combos.push(combo.id);
                }
            }
        }

        Self {
            cards,
            templates,
            features,
            combos,
        }
    }

    /// Reset `state`/`depth`/`down` on every node, required between each
    /// target generator combo (`spec.md` §4.C "reset between roots").
    pub fn reset(&mut self) {
        for node in self.cards.values_mut() {
            node.header.reset();
            node.state = NodeState::NotVisited;
        }
        for node in self.templates.values_mut() {
            node.header.reset();
            node.state = NodeState::NotVisited;
        }
        for node in self.features.values_mut() {
            node.header.reset();
            node.state = NodeState::NotVisited;
        }
        for node in self.combos.values_mut() {
            node.header.reset();
            node.state = NodeState::NotVisited;
        }
    }

    pub fn card(&self, id: CardId) -> Option<&CardNode> {
        self.cards.get(&id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut CardNode> {
        self.cards.get_mut(&id)
    }

    pub fn template(&self, id: TemplateId) -> Option<&TemplateNode> {
        self.templates.get(&id)
    }

    pub fn template_mut(&mut self, id: TemplateId) -> Option<&mut TemplateNode> {
        self.templates.get_mut(&id)
    }

    pub fn feature(&self, id: FeatureId) -> Option<&FeatureNode> {
        self.features.get(&id)
    }

    pub fn feature_mut(&mut self, id: FeatureId) -> Option<&mut FeatureNode> {
        self.features.get_mut(&id)
    }

    pub fn combo(&self, id: ComboId) -> Option<&ComboNode> {
        self.combos.get(&id)
    }

    pub fn combo_mut(&mut self, id: ComboId) -> Option<&mut ComboNode> {
        self.combos.get_mut(&id)
    }

    pub fn card_state(&self, id: CardId) -> NodeState {
        self.cards.get(&id).map_or(NodeState::NotVisited, |n| n.state)
    }

    pub fn set_card_state(&mut self, id: CardId, state: NodeState) {
        if let Some(node) = self.cards.get_mut(&id) {
            node.state = state;
        }
    }

    pub fn template_state(&self, id: TemplateId) -> NodeState {
        self.templates
            .get(&id)
            .map_or(NodeState::NotVisited, |n| n.state)
    }

    pub fn set_template_state(&mut self, id: TemplateId, state: NodeState) {
        if let Some(node) = self.templates.get_mut(&id) {
            node.state = state;
        }
    }

    pub fn feature_state(&self, id: FeatureId) -> NodeState {
        self.features
            .get(&id)
            .map_or(NodeState::NotVisited, |n| n.state)
    }

    pub fn set_feature_state(&mut self, id: FeatureId, state: NodeState) {
        if let Some(node) = self.features.get_mut(&id) {
            node.state = state;
        }
    }

    pub fn combo_state(&self, id: ComboId) -> NodeState {
        self.combos
            .get(&id)
            .map_or(NodeState::NotVisited, |n| n.state)
    }

    pub fn set_combo_state(&mut self, id: ComboId, state: NodeState) {
        if let Some(node) = self.combos.get_mut(&id) {
            node.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, Combo, Feature};

    fn simple_snapshot() -> Snapshot {
        let mut card = Card::new(CardId(1), "Basalt Monolith", "C", true);
        card.features.push(FeatureId(1));
        let feature = Feature::new(FeatureId(1), "Infinite Colorless Mana", false);
        let combo = Combo::new(ComboId(1), true);
        Snapshot::new(vec![card], vec![], vec![feature], vec![combo], vec![])
    }

    #[test]
    fn feature_nodes_index_granting_cards() {
        let snapshot = simple_snapshot();
        let graph = ComboGraph::build(&snapshot);
        let feature = graph.feature(FeatureId(1)).unwrap();
        assert_eq!(feature.granting_cards, vec![CardId(1)]);
    }

    #[test]
    fn reset_clears_state_depth_and_down() {
        let snapshot = simple_snapshot();
        let mut graph = ComboGraph::build(&snapshot);
        graph.set_card_state(CardId(1), NodeState::Visited);
        graph.card_mut(CardId(1)).unwrap().header.depth = 3;
        graph.card_mut(CardId(1)).unwrap().header.down = true;

        graph.reset();

        assert_eq!(graph.card_state(CardId(1)), NodeState::NotVisited);
        assert_eq!(graph.card(CardId(1)).unwrap().header.depth, 0);
        assert!(!graph.card(CardId(1)).unwrap().header.down);
    }
}
