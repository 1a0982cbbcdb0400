use std::io;

use thiserror::Error;

use crate::types::CategoryId;

/// Error type for taxonomy, dataset, rollup, and output failures.
#[derive(Debug, Error)]
pub enum LabelError {
    /// A taxonomy entry rejected under the fail policy.
    #[error("taxonomy entry '{id}' is malformed: {reason}")]
    MalformedEntry {
        /// Entry id.
        id: CategoryId,
        /// What is wrong with it.
        reason: String,
    },
    /// A parent chain revisits an id.
    #[error("taxonomy contains a parent cycle through '{id}'")]
    TaxonomyCycle {
        /// First id seen twice.
        id: CategoryId,
    },
    /// Rollup still had deficient categories at the pass cap.
    #[error("rollup did not converge after {iterations} iterations")]
    RollupDiverged {
        /// Passes completed.
        iterations: usize,
    },
    /// Malformed XML document.
    #[error("xml input '{origin}' could not be read: {details}")]
    Xml {
        /// Document name.
        origin: String,
        /// Parser message and position.
        details: String,
    },
    /// Unreadable CSV dataset.
    #[error("query dataset '{origin}' could not be read: {source}")]
    Csv {
        /// Dataset name.
        origin: String,
        /// Underlying csv error.
        #[source]
        source: csv::Error,
    },
    /// A required CSV column is absent from the header.
    #[error("query dataset '{origin}' is missing required column '{column}'")]
    MissingColumn {
        /// Dataset name.
        origin: String,
        /// Missing column.
        column: String,
    },
    /// Invalid line in a word-vector file.
    #[error("word vectors line {line} is invalid: {details}")]
    Vectors {
        /// One-based line number.
        line: usize,
        /// What is wrong with it.
        details: String,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}
