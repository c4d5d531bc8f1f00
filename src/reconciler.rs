//! Component G: diffs computed [`VariantDefinition`]s against the persisted
//! catalog (`spec.md` §4.G). Grounded directly on `update_variant`,
//! `create_variant` and the commit loop in `generate_variants` from the
//! original `variants.py`.
//!
//! One deliberate departure from the source: `update_variant` there applies
//! the same taint/status logic to every existing variant regardless of the
//! `frozen` flag. `spec.md` §3 invariant ("a variant with status=FROZEN is
//! never modified") and §8 invariants 8-9 make frozen protection an explicit,
//! tested property, so this reconciler short-circuits before any
//! status/text mutation when `existing.frozen` is set (see `DESIGN.md`).

use std::collections::{BTreeMap, BTreeSet};

use crate::composer::VariantDefinition;
use crate::domain::{merge_identity, subtract_removed, Card, CardId, Combo, ComboId, FeatureId, Variant, VariantStatus};
use crate::snapshot::Snapshot;

/// Write-side port (`spec.md` §6 "Persistence port"): bulk upsert/delete plus
/// atomic commit. A real adapter applies `plan` inside one durable
/// transaction.
pub trait PersistencePort {
    fn commit(&mut self, plan: ReconcilePlan) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub upserts: Vec<Variant>,
    pub deletes: Vec<String>,
}

/// Reference [`PersistencePort`] adapter backed by a `Vec`; useful for tests
/// and standalone use (mirrors [`crate::job::InMemoryJobStore`]).
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistencePort {
    pub variants: BTreeMap<String, Variant>,
}

impl PersistencePort for InMemoryPersistencePort {
    fn commit(&mut self, plan: ReconcilePlan) -> Result<(), String> {
        for variant in plan.upserts {
            self.variants.insert(variant.unique_id.clone(), variant);
        }
        for unique_id in plan.deletes {
            self.variants.remove(&unique_id);
        }
        Ok(())
    }
}

/// Returned counters (`spec.md` §4.G "Counters returned: (added, restored, deleted)").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub added: usize,
    pub restored: usize,
    pub deleted: usize,
}

/// Pure diff: no I/O. The caller hands the resulting [`ReconcilePlan`] to a
/// [`PersistencePort`] to actually apply it.
pub fn reconcile(
    snapshot: &Snapshot,
    computed: &BTreeMap<String, VariantDefinition>,
) -> (ReconcilePlan, ReconcileCounts) {
    let mut upserts = Vec::with_capacity(computed.len());
    let mut added = 0usize;
    let mut restored = 0usize;

    for (fingerprint, definition) in computed {
        match snapshot.existing_variant(fingerprint) {
            None => {
                upserts.push(build_new_variant(snapshot, fingerprint, definition));
                added += 1;
            }
            Some(existing) => {
                if existing.status == VariantStatus::Restore {
                    restored += 1;
                }
                upserts.push(update_existing_variant(snapshot, existing, definition));
            }
        }
    }

    let deletes: Vec<String> = snapshot
        .existing_variants()
        .filter(|v| !computed.contains_key(&v.unique_id) && !v.frozen)
        .map(|v| v.unique_id.clone())
        .collect();
    let deleted = deletes.len();

    (ReconcilePlan { upserts, deletes }, ReconcileCounts { added, restored, deleted })
}

fn build_new_variant(snapshot: &Snapshot, fingerprint: &str, definition: &VariantDefinition) -> Variant {
    let card_set: BTreeSet<CardId> = definition.cards.iter().copied().collect();
    let status = if snapshot.is_tainted(&card_set) {
        VariantStatus::NotWorking
    } else {
        VariantStatus::New
    };
    let text = concatenate_text_fields(snapshot, &definition.included_ids);

    Variant {
        id: None,
        unique_id: fingerprint.to_string(),
        cards: definition.cards.clone(),
        templates: definition.templates.clone(),
        produces: derive_produces(snapshot, definition),
        of: definition.of_ids.clone(),
        includes: definition.included_ids.clone(),
        identity: identity_for_cards(snapshot, &definition.cards),
        legal: all_cards_legal(snapshot, &definition.cards),
        status,
        frozen: false,
        zone_locations: text.zone_locations,
        cards_state: text.cards_state,
        other_prerequisites: text.other_prerequisites,
        mana_needed: text.mana_needed,
        description: text.description,
    }
}

fn update_existing_variant(snapshot: &Snapshot, existing: &Variant, definition: &VariantDefinition) -> Variant {
    let mut updated = existing.clone();
    updated.cards = definition.cards.clone();
    updated.templates = definition.templates.clone();
    updated.of = definition.of_ids.clone();
    updated.includes = definition.included_ids.clone();
    updated.produces = derive_produces(snapshot, definition);
    updated.identity = identity_for_cards(snapshot, &definition.cards);
    updated.legal = all_cards_legal(snapshot, &definition.cards);

    if existing.frozen {
        return updated;
    }

    let card_set: BTreeSet<CardId> = definition.cards.iter().copied().collect();
    let tainted = snapshot.is_tainted(&card_set);
    // OK is sticky once confirmed; NOT_WORKING never self-heals. Only NEW
    // and RESTORE are re-evaluated against the current taint set.
    let ok = match existing.status {
        VariantStatus::Ok => true,
        VariantStatus::NotWorking => false,
        VariantStatus::New | VariantStatus::Restore => !tainted,
    };

    if existing.status == VariantStatus::Restore {
        let text = concatenate_text_fields(snapshot, &definition.included_ids);
        updated.zone_locations = text.zone_locations;
        updated.cards_state = text.cards_state;
        updated.other_prerequisites = text.other_prerequisites;
        updated.mana_needed = text.mana_needed;
        updated.description = text.description;
        updated.status = if ok { VariantStatus::New } else { VariantStatus::NotWorking };
    }

    if !ok {
        updated.status = VariantStatus::NotWorking;
    }

    updated
}

fn derive_produces(snapshot: &Snapshot, definition: &VariantDefinition) -> BTreeSet<FeatureId> {
    let mut removed: BTreeSet<FeatureId> = BTreeSet::new();
    for &combo_id in &definition.included_ids {
        if let Some(combo) = snapshot.combo(combo_id) {
            removed.extend(combo.removes.iter().copied());
        }
    }
    let after_removal = subtract_removed(&definition.feature_ids, &removed);
    subtract_removed(&after_removal, snapshot.utility_feature_ids())
}

fn identity_for_cards(snapshot: &Snapshot, cards: &[CardId]) -> String {
    merge_identity(cards_identities(snapshot, cards))
}

fn cards_identities<'a>(snapshot: &'a Snapshot, cards: &[CardId]) -> Vec<&'a str> {
    cards
        .iter()
        .filter_map(|&id| snapshot.card(id))
        .map(|c: &Card| c.identity.as_str())
        .collect()
}

fn all_cards_legal(snapshot: &Snapshot, cards: &[CardId]) -> bool {
    cards.iter().all(|&id| snapshot.card(id).map_or(false, |c| c.legal))
}

struct TextFields {
    zone_locations: String,
    cards_state: String,
    other_prerequisites: String,
    mana_needed: String,
    description: String,
}

/// One line per non-blank combo field, in ascending combo-id order;
/// `mana_needed` is joined by a single space instead (`spec.md` §4.G).
fn concatenate_text_fields(snapshot: &Snapshot, included: &BTreeSet<ComboId>) -> TextFields {
    let combos: Vec<&Combo> = included.iter().filter_map(|&id| snapshot.combo(id)).collect();
    TextFields {
        zone_locations: join_nonblank(combos.iter().map(|c| c.zone_locations.as_str()), "\n"),
        cards_state: join_nonblank(combos.iter().map(|c| c.cards_state.as_str()), "\n"),
        other_prerequisites: join_nonblank(combos.iter().map(|c| c.other_prerequisites.as_str()), "\n"),
        mana_needed: join_nonblank(combos.iter().map(|c| c.mana_needed.as_str()), " "),
        description: join_nonblank(combos.iter().map(|c| c.description.as_str()), "\n"),
    }
}

fn join_nonblank<'a>(items: impl Iterator<Item = &'a str>, sep: &str) -> String {
    items.filter(|s| !s.is_empty()).collect::<Vec<_>>().join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardId;

    fn card(id: i64, identity: &str, legal: bool) -> Card {
        Card::new(CardId(id), format!("Card {id}"), identity, legal)
    }

    fn definition(cards: Vec<i64>, included: Vec<i64>) -> VariantDefinition {
        VariantDefinition {
            cards: cards.into_iter().map(CardId).collect(),
            templates: vec![],
            feature_ids: BTreeSet::new(),
            included_ids: included.into_iter().map(ComboId).collect(),
            of_ids: [ComboId(1)].into(),
        }
    }

    /// S6 in `spec.md` §8: a newly-derivable superset of a NOT_WORKING set
    /// is itself created as NOT_WORKING; a disjoint one is plain NEW.
    #[test]
    fn new_variant_is_tainted_by_not_working_superset() {
        let cards = vec![card(1, "W", true), card(2, "U", true), card(3, "B", true)];
        let mut tainted_variant_fields = Variant {
            id: None,
            unique_id: "tainted".into(),
            cards: vec![CardId(1), CardId(2)],
            templates: vec![],
            produces: BTreeSet::new(),
            of: BTreeSet::new(),
            includes: BTreeSet::new(),
            identity: String::new(),
            legal: true,
            status: VariantStatus::NotWorking,
            frozen: false,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: String::new(),
        };
        tainted_variant_fields.status = VariantStatus::NotWorking;
        let snapshot = Snapshot::new(cards, vec![], vec![], vec![], vec![tainted_variant_fields]);

        let mut computed = BTreeMap::new();
        computed.insert("superset".to_string(), definition(vec![1, 2, 3], vec![1]));
        computed.insert("disjoint".to_string(), definition(vec![1, 3], vec![1]));

        let (plan, counts) = reconcile(&snapshot, &computed);
        assert_eq!(counts.added, 2);

        let superset = plan.upserts.iter().find(|v| v.unique_id == "superset").unwrap();
        assert_eq!(superset.status, VariantStatus::NotWorking);
        let disjoint = plan.upserts.iter().find(|v| v.unique_id == "disjoint").unwrap();
        assert_eq!(disjoint.status, VariantStatus::New);
    }

    /// S5 in `spec.md` §8: RESTORE concatenates included combos' text and
    /// resets status to NEW when no longer tainted.
    #[test]
    fn restore_rebuilds_text_fields_and_resets_status() {
        let cards = vec![card(1, "W", true), card(2, "U", true)];
        let mut combo_a = Combo::new(ComboId(1), true);
        combo_a.description = "A.".into();
        let mut combo_b = Combo::new(ComboId(2), false);
        combo_b.description = "B.".into();

        let existing = Variant {
            id: None,
            unique_id: "x".into(),
            cards: vec![CardId(1), CardId(2)],
            templates: vec![],
            produces: BTreeSet::new(),
            of: BTreeSet::new(),
            includes: BTreeSet::new(),
            identity: String::new(),
            legal: true,
            status: VariantStatus::Restore,
            frozen: false,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: "stale".into(),
        };

        let snapshot = Snapshot::new(cards, vec![], vec![], vec![combo_a, combo_b], vec![existing]);
        let mut computed = BTreeMap::new();
        computed.insert("x".to_string(), definition(vec![1, 2], vec![1, 2]));

        let (plan, counts) = reconcile(&snapshot, &computed);
        assert_eq!(counts.restored, 1);
        let updated = &plan.upserts[0];
        assert_eq!(updated.description, "A.\nB.");
        assert_eq!(updated.status, VariantStatus::New);
    }

    /// Frozen variants: graph links refresh, but status and text never change.
    #[test]
    fn frozen_variant_keeps_status_and_text_untouched() {
        let cards = vec![card(1, "W", true), card(2, "W", true), card(3, "W", true)];
        let mut not_working = Variant {
            id: None,
            unique_id: "broken".into(),
            cards: vec![CardId(1), CardId(2)],
            templates: vec![],
            produces: BTreeSet::new(),
            of: BTreeSet::new(),
            includes: BTreeSet::new(),
            identity: String::new(),
            legal: true,
            status: VariantStatus::NotWorking,
            frozen: false,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: String::new(),
        };
        not_working.status = VariantStatus::NotWorking;
        let frozen = Variant {
            id: None,
            unique_id: "frozen-one".into(),
            cards: vec![CardId(1), CardId(2), CardId(3)],
            templates: vec![],
            produces: BTreeSet::new(),
            of: BTreeSet::new(),
            includes: BTreeSet::new(),
            identity: String::new(),
            legal: true,
            status: VariantStatus::Ok,
            frozen: true,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: "kept by the user".into(),
        };

        let snapshot = Snapshot::new(cards, vec![], vec![], vec![], vec![not_working, frozen]);
        let mut computed = BTreeMap::new();
        computed.insert("frozen-one".to_string(), definition(vec![1, 2, 3], vec![1]));

        let (plan, _) = reconcile(&snapshot, &computed);
        let updated = &plan.upserts[0];
        assert_eq!(updated.status, VariantStatus::Ok);
        assert_eq!(updated.description, "kept by the user");
    }

    #[test]
    fn deletion_skips_frozen_variants() {
        let orphan = Variant {
            id: None,
            unique_id: "gone".into(),
            cards: vec![],
            templates: vec![],
            produces: BTreeSet::new(),
            of: BTreeSet::new(),
            includes: BTreeSet::new(),
            identity: "C".into(),
            legal: true,
            status: VariantStatus::Ok,
            frozen: false,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: String::new(),
        };
        let mut frozen_orphan = orphan.clone();
        frozen_orphan.unique_id = "kept".into();
        frozen_orphan.frozen = true;

        let snapshot = Snapshot::new(vec![], vec![], vec![], vec![], vec![orphan, frozen_orphan]);
        let (plan, counts) = reconcile(&snapshot, &BTreeMap::new());

        assert_eq!(plan.deletes, vec!["gone".to_string()]);
        assert_eq!(counts.deleted, 1);
    }
}
