use std::fmt;

use crate::domain::card::CardId;
use crate::domain::feature::FeatureId;
use crate::domain::template::TemplateId;

/// Opaque identifier for a [`Combo`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComboId(pub i64);

impl fmt::Display for ComboId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hand-authored hyperedge: NEEDS some features and USES/REQUIRES some
/// cards/templates; PRODUCES some features and REMOVES some features.
///
/// `generator` marks combos eligible to be the root of a variant
/// (`spec.md` §3, §4.E "generator combo").
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub id: ComboId,
    pub uses: Vec<CardId>,
    pub requires: Vec<TemplateId>,
    pub needs: Vec<FeatureId>,
    pub produces: Vec<FeatureId>,
    pub removes: Vec<FeatureId>,
    pub generator: bool,

    /// Free-form text fields, concatenated verbatim into a variant's
    /// corresponding field when that variant is (re)built from its included
    /// combos. One line per non-blank combo field, in combo-include order.
    pub zone_locations: String,
    pub cards_state: String,
    pub other_prerequisites: String,
    pub mana_needed: String,
    pub description: String,
}

impl Combo {
    pub fn new(id: ComboId, generator: bool) -> Self {
        Self {
            id,
            uses: Vec::new(),
            requires: Vec::new(),
            needs: Vec::new(),
            produces: Vec::new(),
            removes: Vec::new(),
            generator,
            zone_locations: String::new(),
            cards_state: String::new(),
            other_prerequisites: String::new(),
            mana_needed: String::new(),
            description: String::new(),
        }
    }

    /// Total ingredient count this combo directly contributes toward the
    /// card+template budget, ignoring anything contributed transitively by
    /// needed features (`spec.md` §4.D, "zero needed features short-circuits").
    pub fn direct_ingredient_count(&self) -> usize {
        self.uses.len() + self.requires.len()
    }
}
