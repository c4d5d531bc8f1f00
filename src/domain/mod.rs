//! Component A: value types for the hypergraph and identity/fingerprint helpers.

pub mod card;
pub mod combo;
pub mod feature;
pub mod fingerprint;
pub mod identity;
pub mod template;
pub mod variant;

use std::collections::BTreeSet;

pub use card::{Card, CardId};
pub use combo::{Combo, ComboId};
pub use feature::{Feature, FeatureId};
pub use fingerprint::{canonical_json, variant_fingerprint};
pub use identity::merge_identity;
pub use template::{Template, TemplateId};
pub use variant::{Variant, VariantId, VariantStatus};

/// Set difference `features - removed`, used when composing a variant's
/// user-visible `produces` set (`spec.md` §4.A `subtract_removed`).
pub fn subtract_removed(
    features: &BTreeSet<FeatureId>,
    removed: &BTreeSet<FeatureId>,
) -> BTreeSet<FeatureId> {
    features.difference(removed).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_removed_is_plain_set_difference() {
        let features: BTreeSet<FeatureId> = [FeatureId(1), FeatureId(2), FeatureId(3)].into();
        let removed: BTreeSet<FeatureId> = [FeatureId(2)].into();
        let result = subtract_removed(&features, &removed);
        assert_eq!(result, [FeatureId(1), FeatureId(3)].into());
    }
}
