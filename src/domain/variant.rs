use std::collections::BTreeSet;
use std::fmt;

use crate::domain::card::CardId;
use crate::domain::combo::ComboId;
use crate::domain::feature::FeatureId;
use crate::domain::template::TemplateId;

/// Opaque identifier for a persisted [`Variant`]. Distinct from its
/// [`unique_id`](Variant::unique_id) fingerprint: a storage layer may assign
/// its own surrogate key, but the fingerprint is what identity is defined by.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantId(pub i64);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a computed [`Variant`] (`spec.md` §3 "Lifecycle").
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum VariantStatus {
    New,
    Ok,
    Restore,
    NotWorking,
}

/// A persisted, minimal realisation of a generator combo: concrete cards and
/// templates, the features it produces, and the combos it was built from.
///
/// Identity is `unique_id`, the hex digest from
/// [`crate::domain::fingerprint::variant_fingerprint`] over `cards`/`templates`.
/// A variant with `frozen = true` is never modified or deleted by the engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub id: Option<VariantId>,
    pub unique_id: String,
    /// Ordered: depth ascending, then id ascending (`spec.md` §4.F).
    pub cards: Vec<CardId>,
    /// Persisted sorted by id; order otherwise irrelevant.
    pub templates: Vec<TemplateId>,
    pub produces: BTreeSet<FeatureId>,
    pub of: BTreeSet<ComboId>,
    pub includes: BTreeSet<ComboId>,
    pub identity: String,
    pub legal: bool,
    pub status: VariantStatus,
    pub frozen: bool,

    pub zone_locations: String,
    pub cards_state: String,
    pub other_prerequisites: String,
    pub mana_needed: String,
    pub description: String,
}

impl Variant {
    pub fn card_and_template_count(&self) -> usize {
        self.cards.len() + self.templates.len()
    }
}
