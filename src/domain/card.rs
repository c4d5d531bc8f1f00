use std::fmt;

/// Opaque identifier for a [`Card`], stable for the lifetime of a generation run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub i64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concrete Magic: The Gathering card as seen by the engine.
///
/// Immutable for the duration of one generation run: the snapshot (component
/// B) owns the only copies, taken from a single consistent read.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Color-identity letters drawn from {W,U,B,R,G}, or "C" for colorless.
    /// Not necessarily canonicalized on construction; use [`crate::domain::identity::merge_identity`]
    /// when combining several.
    pub identity: String,
    pub legal: bool,
    /// Features this card grants directly, independent of any combo.
    pub features: Vec<crate::domain::feature::FeatureId>,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, identity: impl Into<String>, legal: bool) -> Self {
        Self {
            id,
            name: name.into(),
            identity: identity.into(),
            legal,
            features: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_id() {
        assert_eq!(CardId(42).to_string(), "42");
    }
}
