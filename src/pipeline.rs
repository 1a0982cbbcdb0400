//! End-to-end labeled-query preparation: taxonomy → filter → normalize →
//! rollup → label file.

use std::path::Path;

use tracing::{info, warn};

use crate::config::{LabeledQueriesConfig, RollupConfig, TaxonomyConfig};
use crate::constants::log::{QUERIES, ROLLUP, TAXONOMY};
use crate::data::{QueryRecord, TaxonomyEntry};
use crate::emit::{EmitStats, LabelEmitter};
use crate::errors::LabelError;
use crate::metrics::category_support;
use crate::normalize::QueryNormalizer;
use crate::rollup::{RollupEngine, RollupStep};
use crate::source::{read_queries_file, read_taxonomy_file};
use crate::taxonomy::{ParentMap, TaxonomyBuild};
use crate::transport::fs::create_output;

/// Records ready for emission plus what happened on the way.
#[derive(Clone, Debug)]
pub struct PreparedQueries {
    /// Normalized, rolled-up records.
    pub records: Vec<QueryRecord>,
    /// Rows handed in before filtering.
    pub rows_loaded: usize,
    /// Rows dropped because their category is not a non-root taxonomy id.
    pub rows_out_of_taxonomy: usize,
    /// Rollup pass history.
    pub rollup_steps: Vec<RollupStep>,
}

/// Counts reported by [`run_labeled_queries`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Entries read from the category document.
    pub taxonomy_entries: usize,
    /// Non-root categories in the parent map.
    pub taxonomy_categories: usize,
    /// Malformed entries skipped.
    pub skipped_entries: usize,
    /// Query rows read.
    pub rows_loaded: usize,
    /// Query rows outside the taxonomy.
    pub rows_out_of_taxonomy: usize,
    /// Rollup passes performed.
    pub rollup_iterations: usize,
    /// Label lines written.
    pub lines_written: usize,
    /// Records dropped at emit time.
    pub lines_dropped: usize,
}

/// Build the parent map, logging the outcome.
pub fn build_taxonomy(
    entries: Vec<TaxonomyEntry>,
    config: &TaxonomyConfig,
) -> Result<TaxonomyBuild, LabelError> {
    let build = ParentMap::from_entries(entries, config)?;
    if !build.skipped.is_empty() {
        warn!(
            "{TAXONOMY} skipped {} malformed entries",
            build.skipped.len()
        );
    }
    info!(
        "{TAXONOMY} {} non-root categories under '{}', max depth {}",
        build.parents.len(),
        build.parents.root_id(),
        build.parents.max_depth()
    );
    Ok(build)
}

/// Filter, normalize, and roll up raw query rows in memory.
pub fn prepare_queries(
    rows: Vec<QueryRecord>,
    parents: &ParentMap,
    normalizer: &QueryNormalizer,
    rollup: RollupConfig,
) -> Result<PreparedQueries, LabelError> {
    rollup.validate()?;
    let rows_loaded = rows.len();
    let in_taxonomy: Vec<QueryRecord> = rows
        .into_iter()
        .filter(|row| parents.contains(&row.category))
        .collect();
    let rows_out_of_taxonomy = rows_loaded - in_taxonomy.len();
    info!(
        "{QUERIES} kept {} of {} rows with categories in the taxonomy",
        in_taxonomy.len(),
        rows_loaded
    );

    let normalized = normalizer.normalize_records(in_taxonomy);
    let outcome = RollupEngine::new(parents, rollup).run(normalized)?;

    if let Some(support) = category_support(&outcome.records, parents, rollup.min_queries) {
        info!(
            "{ROLLUP} {} passes: {} labels, support min {} max {} mean {:.1}, {} records at root",
            outcome.iterations(),
            support.categories,
            support.min,
            support.max,
            support.mean,
            support.stranded
        );
    }

    Ok(PreparedQueries {
        records: outcome.records,
        rows_loaded,
        rows_out_of_taxonomy,
        rollup_steps: outcome.steps,
    })
}

/// Run the whole labeled-query preparation and write the label file.
///
/// All inputs are loaded and processed before the output file is created, so a
/// taxonomy or dataset failure leaves no partial output behind.
pub fn run_labeled_queries(
    config: &LabeledQueriesConfig,
    normalizer: &QueryNormalizer,
) -> Result<PipelineReport, LabelError> {
    config.rollup.validate()?;
    let entries = read_taxonomy_file(&config.categories_path)?;
    let taxonomy_entries = entries.len();
    let build = build_taxonomy(entries, &config.taxonomy)?;
    let rows = read_queries_file(&config.queries_path)?;

    let prepared = prepare_queries(rows, &build.parents, normalizer, config.rollup)?;
    let stats = write_label_file(&prepared.records, &build.parents, &config.output_path)?;

    Ok(PipelineReport {
        taxonomy_entries,
        taxonomy_categories: build.parents.len(),
        skipped_entries: build.skipped.len(),
        rows_loaded: prepared.rows_loaded,
        rows_out_of_taxonomy: prepared.rows_out_of_taxonomy,
        rollup_iterations: prepared.rollup_steps.len(),
        lines_written: stats.written,
        lines_dropped: stats.dropped,
    })
}

/// Write records to `path`, dropping those outside the parent map.
pub fn write_label_file(
    records: &[QueryRecord],
    parents: &ParentMap,
    path: &Path,
) -> Result<EmitStats, LabelError> {
    let file = create_output(path)?;
    let stats = LabelEmitter::new(parents).write(records, file)?;
    info!(
        "{QUERIES} wrote {} labeled queries to {}",
        stats.written,
        path.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StemmerKind;

    #[test]
    fn prepare_filters_unknown_categories_before_rollup() {
        let parents = ParentMap::from_pairs([("A", "R"), ("B", "R")], "R").unwrap();
        let rows = vec![
            QueryRecord::new("A", "Red Shoes"),
            QueryRecord::new("A", "red  shoes!"),
            QueryRecord::new("R", "root row"),
            QueryRecord::new("Z", "unknown"),
            QueryRecord::new("B", "Blue"),
        ];
        let normalizer = QueryNormalizer::for_kind(StemmerKind::Identity);
        let prepared = prepare_queries(rows, &parents, &normalizer, RollupConfig::new(2)).unwrap();

        assert_eq!(prepared.rows_loaded, 5);
        assert_eq!(prepared.rows_out_of_taxonomy, 2);
        assert_eq!(prepared.rollup_steps.len(), 1);
        assert_eq!(
            prepared.records,
            vec![
                QueryRecord::new("A", "red shoes"),
                QueryRecord::new("A", "red shoes "),
                QueryRecord::new("R", "blue"),
            ]
        );
    }
}
