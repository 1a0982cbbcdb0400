use proptest::prelude::*;

use taxolabels::{EnglishStemmer, IdentityStemmer, QueryNormalizer, Stemmer, normalize_query};

struct Truncate3;

impl Stemmer for Truncate3 {
    fn stem(&self, token: &str) -> String {
        token.chars().take(3).collect()
    }
}

#[test]
fn custom_stemmer_is_applied_per_token() {
    assert_eq!(
        normalize_query("Wireless Headphones, Black", &Truncate3),
        "wir hea bla"
    );
}

#[test]
fn empty_tokens_from_edges_are_not_stemmed() {
    assert_eq!(normalize_query("  ipad  ", &Truncate3), " ipa ");
}

#[test]
fn default_normalizer_stems_english() {
    assert_eq!(normalize_query("batteries", &EnglishStemmer::new()), "batteri");
    assert_eq!(QueryNormalizer::default().normalize("Laptops!"), "laptop ");
}

proptest! {
    #[test]
    fn output_alphabet_is_lowercase_ascii_digits_and_single_spaces(text in any::<String>()) {
        let normalized = normalize_query(&text, &IdentityStemmer);
        prop_assert!(normalized
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == ' '));
        prop_assert!(!normalized.contains("  "));
    }

    #[test]
    fn identity_normalization_is_idempotent(text in "\\PC{0,40}") {
        let once = normalize_query(&text, &IdentityStemmer);
        let twice = normalize_query(&once, &IdentityStemmer);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn english_output_stays_in_alphabet(text in "[A-Za-z0-9 ,.!-]{0,40}") {
        let normalized = QueryNormalizer::default().normalize(&text);
        prop_assert!(normalized
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == ' '));
    }
}
