use std::fmt;

/// Opaque identifier for a [`Feature`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub i64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named effect producible by cards or combos (e.g. "infinite mana").
///
/// `utility` features participate fully in the graph but are excluded from a
/// variant's user-visible `produces` set (`spec.md` invariant 4).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    pub utility: bool,
}

impl Feature {
    pub fn new(id: FeatureId, name: impl Into<String>, utility: bool) -> Self {
        Self {
            id,
            name: name.into(),
            utility,
        }
    }
}
