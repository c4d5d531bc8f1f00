//! Deterministic variant identity (`spec.md` §4.A `variant_fingerprint`, §6).

use sha2::{Digest, Sha256};

use crate::domain::card::CardId;
use crate::domain::template::TemplateId;

/// Canonical JSON the fingerprint is hashed over: `{"c":[...],"t":[...]}`,
/// sorted ascending, no whitespace (`spec.md` §6 "canonical form"). Built via
/// `serde_json`'s compact formatter rather than by hand, so the no-whitespace
/// guarantee comes from the library, not from this function getting every
/// separator right. Exposed separately from [`variant_fingerprint`] so other
/// languages implementing this contract can be tested against the exact
/// bytes that get hashed.
pub fn canonical_json(card_ids: &[CardId], template_ids: &[TemplateId]) -> String {
    let mut cards: Vec<i64> = card_ids.iter().map(|c| c.0).collect();
    let mut templates: Vec<i64> = template_ids.iter().map(|t| t.0).collect();
    cards.sort_unstable();
    templates.sort_unstable();

    serde_json::to_string(&serde_json::json!({"c": cards, "t": templates}))
        .expect("a map of plain integers always serializes")
}

/// `unique_id = H(sorted(card_ids), sorted(template_ids))`: a lowercase hex
/// SHA-256 digest of [`canonical_json`]. Note this is *not* byte-identical to
/// the original Python's `hashlib.sha256(json.dumps({'c': sorted(cards), 't': sorted(templates)}))`,
/// since `json.dumps` inserts whitespace by default — it matches `spec.md`
/// §6's explicit no-whitespace canonical form instead, so existing
/// database `unique_id`s computed by the original would need recomputing,
/// not just re-reading, against this implementation.
pub fn variant_fingerprint(card_ids: &[CardId], template_ids: &[TemplateId]) -> String {
    let canonical = canonical_json(card_ids, template_ids);
    let digest = Sha256::digest(canonical.as_bytes());
    hex_lower(&digest)
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_sorts_and_has_no_whitespace() {
        let cards = vec![CardId(3), CardId(1), CardId(2)];
        let templates = vec![TemplateId(9), TemplateId(4)];
        assert_eq!(
            canonical_json(&cards, &templates),
            r#"{"c":[1,2,3],"t":[4,9]}"#
        );
    }

    #[test]
    fn empty_inputs_produce_empty_arrays() {
        assert_eq!(canonical_json(&[], &[]), r#"{"c":[],"t":[]}"#);
    }

    #[test]
    fn same_inputs_in_different_order_yield_identical_fingerprint() {
        let a = variant_fingerprint(&[CardId(1), CardId(2)], &[]);
        let b = variant_fingerprint(&[CardId(2), CardId(1)], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_lowercase_hex_sha256_of_canonical_json() {
        let cards = vec![CardId(1), CardId(2)];
        let expected = {
            let digest = Sha256::digest(br#"{"c":[1,2],"t":[]}"#);
            hex_lower(&digest)
        };
        assert_eq!(variant_fingerprint(&cards, &[]), expected);
        assert_eq!(expected.len(), 64);
        assert!(expected.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_template_sets_change_the_fingerprint() {
        let a = variant_fingerprint(&[CardId(1)], &[TemplateId(1)]);
        let b = variant_fingerprint(&[CardId(1)], &[TemplateId(2)]);
        assert_ne!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn any_permutation_of_the_same_ids_hashes_identically(
            mut cards in proptest::collection::vec(1i64..1000, 0..10),
            templates in proptest::collection::vec(1i64..1000, 0..10),
        ) {
            let card_ids: Vec<CardId> = cards.iter().copied().map(CardId).collect();
            let template_ids: Vec<TemplateId> = templates.iter().copied().map(TemplateId).collect();
            let original = variant_fingerprint(&card_ids, &template_ids);

            cards.reverse();
            let shuffled_ids: Vec<CardId> = cards.into_iter().map(CardId).collect();
            let shuffled = variant_fingerprint(&shuffled_ids, &template_ids);

            assert_eq!(original, shuffled);
        }
    }
}
