//! Component B: a single consistent read of the catalog into in-memory
//! indices, plus the auxiliary sets the rest of the engine needs.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::{Card, CardId, Combo, ComboId, Feature, FeatureId, Template, TemplateId, Variant};

/// Read-only source of the catalog (`spec.md` §6 "Snapshot port").
///
/// A real adapter takes this read inside a repeatable-read transaction
/// against the backing store, so that the resulting [`Snapshot`] is
/// internally consistent for the whole duration of one generation run.
pub trait SnapshotPort {
    fn read(&self) -> Result<Snapshot, String>;
}

/// Reference [`SnapshotPort`] adapter over an already-built [`Snapshot`]:
/// useful for tests and for host applications with no backing store of
/// their own (mirrors [`crate::job::InMemoryJobStore`]).
#[derive(Debug, Clone)]
pub struct InMemorySnapshotPort(pub Snapshot);

impl SnapshotPort for InMemorySnapshotPort {
    fn read(&self) -> Result<Snapshot, String> {
        Ok(self.0.clone())
    }
}

/// One point-in-time, immutable view of the whole catalog.
///
/// Born at snapshot read, dies at job end (`spec.md` §3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct Snapshot {
    cards: BTreeMap<CardId, Card>,
    templates: BTreeMap<TemplateId, Template>,
    features: BTreeMap<FeatureId, Feature>,
    combos: BTreeMap<ComboId, Combo>,

    utility_feature_ids: BTreeSet<FeatureId>,
    banned_card_ids: BTreeSet<CardId>,
    generator_combo_ids: BTreeSet<ComboId>,

    /// Card-id sets belonging to currently NOT_WORKING variants; tainting
    /// input for the reconciler (`spec.md` §4.G, §8 invariant 8).
    not_working_fingerprints: Vec<BTreeSet<CardId>>,
    existing_variants_by_fingerprint: BTreeMap<String, Variant>,
}

impl Snapshot {
    /// Build a snapshot from already-loaded entities. The auxiliary sets
    /// (`utility_feature_ids`, `banned_card_ids`, `generator_combo_ids`,
    /// `not_working_fingerprints`) are derived here so every caller gets a
    /// consistent view, mirroring `variants.py`'s `Data.__init__`.
    pub fn new(
        cards: Vec<Card>,
        templates: Vec<Template>,
        features: Vec<Feature>,
        combos: Vec<Combo>,
        existing_variants: Vec<Variant>,
    ) -> Self {
        let banned_card_ids = cards
            .iter()
            .filter(|c| !c.legal)
            .map(|c| c.id)
            .collect();
        let utility_feature_ids = features
            .iter()
            .filter(|f| f.utility)
            .map(|f| f.id)
            .collect();
        let generator_combo_ids = combos
            .iter()
            .filter(|c| c.generator)
            .map(|c| c.id)
            .collect();

        let not_working_fingerprints = existing_variants
            .iter()
            .filter(|v| v.status == crate::domain::VariantStatus::NotWorking)
            .map(|v| v.cards.iter().copied().collect::<BTreeSet<_>>())
            .collect();

        let existing_variants_by_fingerprint = existing_variants
            .into_iter()
            .map(|v| (v.unique_id.clone(), v))
            .collect();

        Self {
            cards: cards.into_iter().map(|c| (c.id, c)).collect(),
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
            features: features.into_iter().map(|f| (f.id, f)).collect(),
            combos: combos.into_iter().map(|c| (c.id, c)).collect(),
            utility_feature_ids,
            banned_card_ids,
            generator_combo_ids,
            not_working_fingerprints,
            existing_variants_by_fingerprint,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(&id)
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn combo(&self, id: ComboId) -> Option<&Combo> {
        self.combos.get(&id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn combos(&self) -> impl Iterator<Item = &Combo> {
        self.combos.values()
    }

    pub fn generator_combo_ids(&self) -> impl Iterator<Item = ComboId> + '_ {
        self.generator_combo_ids.iter().copied()
    }

    pub fn is_utility_feature(&self, id: FeatureId) -> bool {
        self.utility_feature_ids.contains(&id)
    }

    pub fn is_banned_card(&self, id: CardId) -> bool {
        self.banned_card_ids.contains(&id)
    }

    pub fn utility_feature_ids(&self) -> &BTreeSet<FeatureId> {
        &self.utility_feature_ids
    }

    pub fn not_working_fingerprints(&self) -> &[BTreeSet<CardId>] {
        &self.not_working_fingerprints
    }

    /// True iff `cards` is a superset of some known NOT_WORKING variant's
    /// card set (`spec.md` §8 invariant 8, `includes_any` in the source).
    pub fn is_tainted(&self, cards: &BTreeSet<CardId>) -> bool {
        self.not_working_fingerprints
            .iter()
            .any(|tainted| cards.is_superset(tainted))
    }

    pub fn existing_variant(&self, fingerprint: &str) -> Option<&Variant> {
        self.existing_variants_by_fingerprint.get(fingerprint)
    }

    pub fn existing_fingerprints(&self) -> HashSet<&str> {
        self.existing_variants_by_fingerprint
            .keys()
            .map(String::as_str)
            .collect()
    }

    pub fn existing_variants(&self) -> impl Iterator<Item = &Variant> {
        self.existing_variants_by_fingerprint.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VariantStatus;

    fn card(id: i64, legal: bool) -> Card {
        Card::new(CardId(id), format!("Card {id}"), "C", legal)
    }

    #[test]
    fn banned_cards_are_derived_from_legality() {
        let snapshot = Snapshot::new(vec![card(1, true), card(2, false)], vec![], vec![], vec![], vec![]);
        assert!(!snapshot.is_banned_card(CardId(1)));
        assert!(snapshot.is_banned_card(CardId(2)));
    }

    #[test]
    fn tainting_checks_superset_not_equality() {
        let variant = Variant {
            id: None,
            unique_id: "deadbeef".into(),
            cards: vec![CardId(1), CardId(2)],
            templates: vec![],
            produces: Default::default(),
            of: Default::default(),
            includes: Default::default(),
            identity: "C".into(),
            legal: true,
            status: VariantStatus::NotWorking,
            frozen: false,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: String::new(),
        };
        let snapshot = Snapshot::new(vec![], vec![], vec![], vec![], vec![variant]);

        let exact: BTreeSet<CardId> = [CardId(1), CardId(2)].into();
        let superset: BTreeSet<CardId> = [CardId(1), CardId(2), CardId(3)].into();
        let disjoint: BTreeSet<CardId> = [CardId(1), CardId(3)].into();

        assert!(snapshot.is_tainted(&exact));
        assert!(snapshot.is_tainted(&superset));
        assert!(!snapshot.is_tainted(&disjoint));
    }
}
