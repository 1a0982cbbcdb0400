//! Query text normalization: lowercase, strip to `[a-z0-9]`, tokenize, stem.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::StemmerKind;
use crate::data::QueryRecord;
use crate::types::Token;

/// Maps one token to its stem.
///
/// Implementations must be pure; the normalizer calls them from many threads.
pub trait Stemmer: Send + Sync {
    /// Stem of a non-empty token.
    fn stem(&self, token: &str) -> Token;
}

impl<F> Stemmer for F
where
    F: Fn(&str) -> Token + Send + Sync,
{
    fn stem(&self, token: &str) -> Token {
        self(token)
    }
}

/// Leaves tokens untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, token: &str) -> Token {
        token.to_string()
    }
}

/// English Snowball (Porter2) stemmer.
pub struct EnglishStemmer {
    inner: rust_stemmers::Stemmer,
}

impl EnglishStemmer {
    /// Create the English Snowball stemmer.
    pub fn new() -> Self {
        Self {
            inner: rust_stemmers::Stemmer::create(rust_stemmers::Algorithm::English),
        }
    }
}

impl Default for EnglishStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnglishStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnglishStemmer")
    }
}

impl Stemmer for EnglishStemmer {
    fn stem(&self, token: &str) -> Token {
        self.inner.stem(token).into_owned()
    }
}

/// Normalize a query with the given stemmer.
///
/// Non-`[a-z0-9]` characters (after lowercasing) become spaces, runs of spaces
/// collapse to one, and each space-separated token is stemmed. Leading or
/// trailing separators produce empty tokens, which are kept so the output
/// matches the reference label files byte for byte.
pub fn normalize_query(text: &str, stemmer: &dyn Stemmer) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut seen_space = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            cleaned.push(ch);
            seen_space = false;
        } else if !seen_space {
            cleaned.push(' ');
            seen_space = true;
        }
    }

    cleaned
        .split(' ')
        .map(|token| {
            if token.is_empty() {
                Token::new()
            } else {
                stemmer.stem(token)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared, thread-safe query normalizer.
#[derive(Clone)]
pub struct QueryNormalizer {
    stemmer: Arc<dyn Stemmer>,
}

impl QueryNormalizer {
    /// Normalizer using the given stemmer.
    pub fn new(stemmer: Arc<dyn Stemmer>) -> Self {
        Self { stemmer }
    }

    /// Build a normalizer for a configured stemmer choice.
    pub fn for_kind(kind: StemmerKind) -> Self {
        match kind {
            StemmerKind::English => Self::new(Arc::new(EnglishStemmer::new())),
            StemmerKind::Identity => Self::new(Arc::new(IdentityStemmer)),
        }
    }

    /// Normalize one query.
    pub fn normalize(&self, text: &str) -> String {
        normalize_query(text, self.stemmer.as_ref())
    }

    /// Normalize every record's text in parallel, preserving order.
    pub fn normalize_records(&self, records: Vec<QueryRecord>) -> Vec<QueryRecord> {
        records
            .into_par_iter()
            .map(|record| QueryRecord {
                text: self.normalize(&record.text),
                category: record.category,
            })
            .collect()
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::for_kind(StemmerKind::default())
    }
}

impl fmt::Debug for QueryNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryNormalizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TruncatingStemmer;

    impl Stemmer for TruncatingStemmer {
        fn stem(&self, token: &str) -> Token {
            token.chars().take(3).collect()
        }
    }

    #[test]
    fn lowercases_and_replaces_punctuation() {
        assert_eq!(
            normalize_query("Beats By Dr. Dre- Monster", &IdentityStemmer),
            "beats by dr dre monster"
        );
        assert_eq!(normalize_query("iPhone\t4S\n", &IdentityStemmer), "iphone 4s ");
    }

    #[test]
    fn keeps_empty_tokens_at_the_edges() {
        assert_eq!(normalize_query("", &IdentityStemmer), "");
        assert_eq!(normalize_query("!!!", &IdentityStemmer), " ");
        assert_eq!(normalize_query("  tv", &IdentityStemmer), " tv");
    }

    #[test]
    fn stemmer_runs_per_token_and_skips_empty_tokens() {
        assert_eq!(
            normalize_query("-laptops chargers", &TruncatingStemmer),
            " lap cha"
        );
    }

    #[test]
    fn closures_act_as_stemmers() {
        let upper = |token: &str| token.to_uppercase();
        assert_eq!(normalize_query("usb c", &upper), "USB C");
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(normalize_query("Café Señor", &IdentityStemmer), "caf se or");
    }

    #[test]
    fn english_stemmer_reduces_plurals() {
        let normalizer = QueryNormalizer::for_kind(StemmerKind::English);
        assert_eq!(normalizer.normalize("Laptops"), "laptop");
        assert_eq!(normalizer.normalize("running shoes"), "run shoe");
    }

    #[test]
    fn normalize_records_preserves_order_and_categories() {
        let normalizer = QueryNormalizer::for_kind(StemmerKind::Identity);
        let records = vec![
            QueryRecord::new("a", "Red Shoes"),
            QueryRecord::new("b", "XBOX-360"),
        ];
        let normalized = normalizer.normalize_records(records);
        assert_eq!(
            normalized,
            vec![
                QueryRecord::new("a", "red shoes"),
                QueryRecord::new("b", "xbox 360"),
            ]
        );
    }
}
