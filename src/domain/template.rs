use std::fmt;

/// Opaque identifier for a [`Template`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(pub i64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named abstract ingredient standing in for an open-ended set of cards
/// (e.g. "any blink effect"). For the engine it is an atom, interchangeable
/// with a [`crate::domain::card::Card`] for counting purposes against the
/// card+template budget.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    /// Free-form query string, shown to users only; never interpreted by the engine.
    pub query: String,
}

impl Template {
    pub fn new(id: TemplateId, name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            query: query.into(),
        }
    }
}
