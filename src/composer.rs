//! Component F: turns a raw solver solution into a [`VariantDefinition`],
//! and merges definitions that land on the same fingerprint because more
//! than one generator combo derives them (`spec.md` §4.F, S4 in §8).

use std::collections::BTreeSet;

use crate::domain::{variant_fingerprint, CardId, ComboId, FeatureId, TemplateId};
use crate::graph::ComboGraph;
use crate::solver::RawSolution;

/// One computed variant, keyed by its fingerprint once accumulated.
/// Everything here is still "raw": legality, identity, and user-visible
/// `produces` (utility/removed filtering) are the reconciler's job
/// (component G), since those depend on snapshot-wide lookups this type
/// doesn't carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDefinition {
    pub cards: Vec<CardId>,
    pub templates: Vec<TemplateId>,
    pub feature_ids: BTreeSet<FeatureId>,
    pub included_ids: BTreeSet<ComboId>,
    pub of_ids: BTreeSet<ComboId>,
}

impl VariantDefinition {
    pub fn fingerprint(&self) -> String {
        variant_fingerprint(&self.cards, &self.templates)
    }

    /// Union two definitions that produced the same fingerprint from
    /// different target combos (`spec.md` §4.F, S4: "of_ids sets are
    /// unioned and included_ids/feature_ids merged").
    fn merge(&mut self, other: VariantDefinition) {
        self.feature_ids.extend(other.feature_ids);
        self.included_ids.extend(other.included_ids);
        self.of_ids.extend(other.of_ids);
    }
}

/// Build one [`VariantDefinition`] from a raw solution rooted at `target`.
///
/// Cards are ordered by pruned-pass depth ascending, then by id ascending
/// (`spec.md` §4.F, §9 "Deterministic outputs"); templates are persisted
/// sorted by id, order otherwise irrelevant.
pub fn compose(graph: &ComboGraph, target: ComboId, solution: RawSolution) -> VariantDefinition {
    let mut cards: Vec<CardId> = solution.cards.into_iter().collect();
    cards.sort_by_key(|&id| {
        let depth = graph.card(id).map(|n| n.header.depth).unwrap_or(0);
        (depth, id)
    });

    let templates: Vec<TemplateId> = solution.templates.into_iter().collect();

    VariantDefinition {
        cards,
        templates,
        feature_ids: solution.features,
        included_ids: solution.combos,
        of_ids: BTreeSet::from([target]),
    }
}

/// Accumulate composed definitions into a fingerprint-keyed map, merging on
/// collision (`spec.md` §4.F "The accumulator is a map fingerprint →
/// VariantDefinition").
pub fn accumulate(
    accumulator: &mut std::collections::BTreeMap<String, VariantDefinition>,
    definition: VariantDefinition,
) {
    let fingerprint = definition.fingerprint();
    accumulator
        .entry(fingerprint)
        .and_modify(|existing| existing.merge(definition.clone()))
        .or_insert(definition);
}
