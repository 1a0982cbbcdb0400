#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line front ends shared by the binaries.
pub mod apps;
/// Product catalog label extraction.
pub mod catalog;
/// Run configuration types.
pub mod config;
/// Centralized constants used across taxonomy, rollup, and output.
pub mod constants;
/// Record and taxonomy entry types.
pub mod data;
/// Label-file formatting and writing.
pub mod emit;
/// Category support metrics.
pub mod metrics;
/// Query text normalization and stemming.
pub mod normalize;
/// End-to-end labeled-query preparation.
pub mod pipeline;
/// Minimum-support category rollup.
pub mod rollup;
/// Readers for taxonomy, query, and catalog inputs.
pub mod source;
/// Synonym candidates from word vectors.
pub mod synonyms;
/// Parent map construction.
pub mod taxonomy;
/// Input transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Small text helpers.
pub mod utils;

mod errors;

pub use catalog::{CatalogExtractor, CatalogReport};
pub use config::{
    CatalogConfig, LabelMode, LabeledQueriesConfig, MalformedEntryPolicy, RollupConfig,
    StemmerKind, SynonymConfig, TaxonomyConfig,
};
pub use data::{CatalogProduct, PathCategory, ProductLabel, QueryRecord, TaxonomyEntry};
pub use emit::{EmitStats, LabelEmitter, LabelWriter};
pub use errors::LabelError;
pub use normalize::{EnglishStemmer, IdentityStemmer, QueryNormalizer, Stemmer, normalize_query};
pub use pipeline::{PipelineReport, PreparedQueries, prepare_queries, run_labeled_queries};
pub use rollup::{RollupEngine, RollupOutcome, RollupStep};
pub use synonyms::{NearestNeighbors, WordVectors};
pub use taxonomy::{ParentMap, TaxonomyBuild};
pub use types::{CategoryId, CategoryName, LabelLine, QueryText, Token, Word};
