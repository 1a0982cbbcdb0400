//! Minimum-support rollup of query labels toward the taxonomy root.
//!
//! Each pass snapshots per-category counts, then moves every record of a
//! deficient category to that category's parent. Only categories present in
//! the [`ParentMap`] can be deficient: once a record reaches the root (or any id
//! outside the map) it stays there, and the label emitter drops it later.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::RollupConfig;
use crate::constants::log::ROLLUP;
use crate::data::QueryRecord;
use crate::errors::LabelError;
use crate::taxonomy::ParentMap;
use crate::types::CategoryId;

/// Summary of a single relabeling pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollupStep {
    /// Categories found below the support threshold in this pass.
    pub deficient_categories: usize,
    /// Records moved to a parent category in this pass.
    pub relabeled_records: usize,
}

/// Records after rollup plus the pass history.
#[derive(Clone, Debug)]
pub struct RollupOutcome {
    /// Relabeled records, in input order.
    pub records: Vec<QueryRecord>,
    /// One entry per pass that moved records.
    pub steps: Vec<RollupStep>,
}

impl RollupOutcome {
    /// Number of relabeling passes performed.
    pub fn iterations(&self) -> usize {
        self.steps.len()
    }
}

/// Count records per category with a parallel fold/reduce.
pub fn category_counts(records: &[QueryRecord]) -> HashMap<&str, usize> {
    records
        .par_iter()
        .fold(HashMap::new, |mut counts, record| {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
            counts
        })
        .reduce(HashMap::new, |mut left, right| {
            for (category, count) in right {
                *left.entry(category).or_insert(0) += count;
            }
            left
        })
}

/// Applies [`RollupConfig`] against a fixed [`ParentMap`].
pub struct RollupEngine<'a> {
    parents: &'a ParentMap,
    config: RollupConfig,
}

impl<'a> RollupEngine<'a> {
    /// Engine over a fixed parent map.
    pub fn new(parents: &'a ParentMap, config: RollupConfig) -> Self {
        Self { parents, config }
    }

    /// Relabel records until no category in the parent map is below
    /// `min_queries`. Never adds or removes records.
    pub fn run(&self, mut records: Vec<QueryRecord>) -> Result<RollupOutcome, LabelError> {
        self.config.validate()?;
        let mut steps = Vec::new();
        if self.config.min_queries <= 1 {
            return Ok(RollupOutcome { records, steps });
        }

        loop {
            let moves = self.deficient_moves(&records);
            if moves.is_empty() {
                break;
            }
            if steps.len() >= self.config.max_iterations {
                return Err(LabelError::RollupDiverged {
                    iterations: steps.len(),
                });
            }

            info!("{ROLLUP} pruning {} categories...", moves.len());
            let relabeled: usize = records
                .par_iter_mut()
                .map(|record| match moves.get(record.category.as_str()) {
                    Some(parent) => {
                        record.category.clone_from(parent);
                        1
                    }
                    None => 0,
                })
                .sum();
            debug!(
                "{ROLLUP} pass {} moved {} records",
                steps.len() + 1,
                relabeled
            );
            steps.push(RollupStep {
                deficient_categories: moves.len(),
                relabeled_records: relabeled,
            });
        }

        Ok(RollupOutcome { records, steps })
    }

    /// Snapshot counts and map each deficient category to its parent.
    fn deficient_moves(&self, records: &[QueryRecord]) -> HashMap<CategoryId, CategoryId> {
        category_counts(records)
            .into_iter()
            .filter(|(_, count)| *count < self.config.min_queries)
            .filter_map(|(category, _)| {
                self.parents
                    .parent(category)
                    .map(|parent| (category.to_string(), parent.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(category: &str, text: &str, n: usize) -> Vec<QueryRecord> {
        (0..n).map(|_| QueryRecord::new(category, text)).collect()
    }

    fn sorted_categories(records: &[QueryRecord]) -> Vec<String> {
        let mut categories: Vec<String> = records.iter().map(|r| r.category.clone()).collect();
        categories.sort();
        categories
    }

    #[test]
    fn min_queries_of_one_is_a_pass_through() {
        let parents = ParentMap::from_pairs([("a", "r"), ("b", "a")], "r").unwrap();
        let records = vec![QueryRecord::new("b", "x"), QueryRecord::new("a", "y")];
        let outcome = RollupEngine::new(&parents, RollupConfig::new(1))
            .run(records.clone())
            .unwrap();
        assert_eq!(outcome.records, records);
        assert_eq!(outcome.iterations(), 0);
    }

    #[test]
    fn deficient_categories_move_to_parent_until_supported() {
        let parents = ParentMap::from_pairs([("a", "r"), ("b", "a"), ("c", "b")], "r").unwrap();
        let mut records = repeat("c", "x", 1);
        records.extend(repeat("b", "y", 1));
        records.extend(repeat("a", "z", 1));

        let outcome = RollupEngine::new(&parents, RollupConfig::new(3))
            .run(records)
            .unwrap();

        // Pass 1 moves c->b, b->a, a->r; pass 2 moves b->a; pass 3 moves a->r.
        assert_eq!(sorted_categories(&outcome.records), vec!["r", "r", "r"]);
        assert_eq!(outcome.iterations(), 3);
        assert_eq!(outcome.steps[0].relabeled_records, 3);
    }

    #[test]
    fn lonely_category_under_root_is_stranded_at_root() {
        let parents = ParentMap::from_pairs([("A", "R"), ("B", "R"), ("C", "A")], "R").unwrap();
        let mut records = repeat("A", "x", 3);
        records.extend(repeat("B", "y", 1));
        records.extend(repeat("C", "z", 2));

        let outcome = RollupEngine::new(&parents, RollupConfig::new(2))
            .run(records)
            .unwrap();

        assert_eq!(outcome.iterations(), 1);
        assert_eq!(
            sorted_categories(&outcome.records),
            vec!["A", "A", "A", "C", "C", "R"]
        );
    }

    #[test]
    fn iteration_cap_reports_divergence() {
        let parents = ParentMap::from_pairs([("a", "r"), ("b", "a"), ("c", "b")], "r").unwrap();
        let err = RollupEngine::new(&parents, RollupConfig::new(5).with_max_iterations(1))
            .run(repeat("c", "x", 1))
            .unwrap_err();
        assert!(matches!(err, LabelError::RollupDiverged { iterations: 1 }));
    }

    #[test]
    fn category_counts_sum_to_record_count() {
        let mut records = repeat("a", "x", 4);
        records.extend(repeat("b", "x", 2));
        let counts = category_counts(&records);
        assert_eq!(counts.get("a"), Some(&4));
        assert_eq!(counts.get("b"), Some(&2));
        assert_eq!(counts.values().sum::<usize>(), 6);
    }
}
