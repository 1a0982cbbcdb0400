use std::path::PathBuf;

use crate::constants::rollup::{DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_QUERIES};
use crate::constants::synonyms::{DEFAULT_NEIGHBORS, DEFAULT_SIMILARITY_THRESHOLD};
use crate::constants::taxonomy::{MUSIC_AND_MOVIES_CATEGORY_ID, ROOT_CATEGORY_ID};
use crate::errors::LabelError;
use crate::types::CategoryId;

/// What to do with a taxonomy entry whose path cannot yield a parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedEntryPolicy {
    /// Log the entry, record it in the build report, and keep going.
    #[default]
    Skip,
    /// Abort the build with [`LabelError::MalformedEntry`].
    Fail,
}

/// Controls how the parent map is built from taxonomy entries.
#[derive(Clone, Debug)]
pub struct TaxonomyConfig {
    /// Id of the designated root; never a key of the parent map.
    pub root_id: CategoryId,
    /// Policy applied to malformed entries.
    pub malformed: MalformedEntryPolicy,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            root_id: ROOT_CATEGORY_ID.to_string(),
            malformed: MalformedEntryPolicy::Skip,
        }
    }
}

impl TaxonomyConfig {
    /// Override the root category id.
    pub fn with_root_id(mut self, root_id: impl Into<CategoryId>) -> Self {
        self.root_id = root_id.into();
        self
    }

    /// Override the malformed-entry policy.
    pub fn with_malformed_policy(mut self, malformed: MalformedEntryPolicy) -> Self {
        self.malformed = malformed;
        self
    }
}

/// Controls the minimum-support rollup.
#[derive(Clone, Copy, Debug)]
pub struct RollupConfig {
    /// Minimum records a category needs to be kept as its own label.
    pub min_queries: usize,
    /// Safety cap on relabeling passes.
    pub max_iterations: usize,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            min_queries: DEFAULT_MIN_QUERIES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RollupConfig {
    /// Create a rollup config with an explicit minimum support.
    pub fn new(min_queries: usize) -> Self {
        Self {
            min_queries,
            ..Self::default()
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Reject values that cannot describe a valid run.
    pub fn validate(&self) -> Result<(), LabelError> {
        if self.min_queries == 0 {
            return Err(LabelError::Configuration(
                "min_queries must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(LabelError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Selects which stemming function the query normalizer applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StemmerKind {
    /// English Snowball stemmer.
    #[default]
    English,
    /// Tokens pass through unchanged.
    Identity,
}

/// Inputs and settings for the labeled-queries run.
#[derive(Clone, Debug)]
pub struct LabeledQueriesConfig {
    /// Category hierarchy XML file.
    pub categories_path: PathBuf,
    /// Query dataset CSV file with `category` and `query` columns.
    pub queries_path: PathBuf,
    /// Label file to write.
    pub output_path: PathBuf,
    /// Taxonomy build settings.
    pub taxonomy: TaxonomyConfig,
    /// Rollup settings.
    pub rollup: RollupConfig,
    /// Stemmer used during normalization.
    pub stemmer: StemmerKind,
}

impl LabeledQueriesConfig {
    /// Create a config with default taxonomy, rollup, and stemmer settings.
    pub fn new(
        categories_path: impl Into<PathBuf>,
        queries_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            categories_path: categories_path.into(),
            queries_path: queries_path.into(),
            output_path: output_path.into(),
            taxonomy: TaxonomyConfig::default(),
            rollup: RollupConfig::default(),
            stemmer: StemmerKind::default(),
        }
    }

    /// Override taxonomy settings.
    pub fn with_taxonomy(mut self, taxonomy: TaxonomyConfig) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    /// Override rollup settings.
    pub fn with_rollup(mut self, rollup: RollupConfig) -> Self {
        self.rollup = rollup;
        self
    }

    /// Override the stemmer.
    pub fn with_stemmer(mut self, stemmer: StemmerKind) -> Self {
        self.stemmer = stemmer;
        self
    }
}

/// Which attribute of a product's leaf category becomes its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelMode {
    /// Leaf category id; required by downstream consumers.
    #[default]
    Id,
    /// Leaf category name with spaces replaced by underscores; handy for debugging.
    Name,
}

/// Controls label extraction from product catalog documents.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// First id every accepted category path must start with.
    pub root_id: CategoryId,
    /// Second-level categories whose products are skipped.
    pub excluded_top_level: Vec<CategoryId>,
    /// Label attribute.
    pub label_mode: LabelMode,
    /// Minimum products per label; 0 keeps every label.
    pub min_products: usize,
    /// Whether product names go through the query normalizer.
    pub normalize_names: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root_id: ROOT_CATEGORY_ID.to_string(),
            excluded_top_level: vec![MUSIC_AND_MOVIES_CATEGORY_ID.to_string()],
            label_mode: LabelMode::Id,
            min_products: 0,
            normalize_names: false,
        }
    }
}

impl CatalogConfig {
    /// Override the label attribute.
    pub fn with_label_mode(mut self, label_mode: LabelMode) -> Self {
        self.label_mode = label_mode;
        self
    }

    /// Override the minimum products per label.
    pub fn with_min_products(mut self, min_products: usize) -> Self {
        self.min_products = min_products;
        self
    }

    /// Override the excluded second-level categories.
    pub fn with_excluded_top_level(mut self, excluded: Vec<CategoryId>) -> Self {
        self.excluded_top_level = excluded;
        self
    }

    /// Override the required path root.
    pub fn with_root_id(mut self, root_id: impl Into<CategoryId>) -> Self {
        self.root_id = root_id.into();
        self
    }

    /// Enable or disable name normalization.
    pub fn with_normalize_names(mut self, normalize_names: bool) -> Self {
        self.normalize_names = normalize_names;
        self
    }
}

/// Controls synonym candidate generation.
#[derive(Clone, Copy, Debug)]
pub struct SynonymConfig {
    /// Minimum cosine similarity for a neighbor to be kept.
    pub similarity_threshold: f32,
    /// Number of nearest neighbors inspected per word.
    pub neighbors: usize,
}

impl Default for SynonymConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollup_config_rejects_zero_support() {
        assert!(RollupConfig::new(0).validate().is_err());
        assert!(RollupConfig::new(1).with_max_iterations(0).validate().is_err());
        assert!(RollupConfig::new(5).validate().is_ok());
    }

    #[test]
    fn defaults_target_best_buy_taxonomy() {
        let taxonomy = TaxonomyConfig::default();
        assert_eq!(taxonomy.root_id, "cat00000");
        assert_eq!(taxonomy.malformed, MalformedEntryPolicy::Skip);

        let catalog = CatalogConfig::default();
        assert_eq!(catalog.excluded_top_level, vec!["abcat0600000".to_string()]);
        assert_eq!(catalog.label_mode, LabelMode::Id);
    }
}
