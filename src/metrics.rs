use std::collections::HashMap;

use crate::data::QueryRecord;
use crate::rollup::category_counts;
use crate::taxonomy::ParentMap;
use crate::types::CategoryId;

/// Aggregate support metrics for the labels that will be emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySupport {
    /// Retained records.
    pub total: usize,
    /// Retained categories.
    pub categories: usize,
    /// Smallest per-category count.
    pub min: usize,
    /// Largest per-category count.
    pub max: usize,
    /// Mean per-category count.
    pub mean: f64,
    /// Retained categories still below the support threshold.
    pub below_threshold: usize,
    /// Records whose category is outside the parent map and will be dropped.
    pub stranded: usize,
    /// Per-category counts, largest first.
    pub per_category: Vec<CategoryShare>,
}

/// Per-category share of retained records.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    /// Category id.
    pub category: CategoryId,
    /// Records in the category.
    pub count: usize,
    /// Fraction of all retained records.
    pub share: f64,
}

/// Compute support metrics over records whose category is in `parents`.
///
/// Returns `None` when no record would be retained.
pub fn category_support(
    records: &[QueryRecord],
    parents: &ParentMap,
    threshold: usize,
) -> Option<CategorySupport> {
    let counts = category_counts(records);
    let (retained, outside): (HashMap<&str, usize>, HashMap<&str, usize>) = counts
        .into_iter()
        .partition(|(category, _)| parents.contains(category));
    if retained.is_empty() {
        return None;
    }

    let total: usize = retained.values().sum();
    let categories = retained.len();
    let min = retained.values().copied().min().unwrap_or(0);
    let max = retained.values().copied().max().unwrap_or(0);
    let mean = total as f64 / categories as f64;
    let below_threshold = retained.values().filter(|count| **count < threshold).count();
    let stranded = outside.values().sum();

    let mut per_category: Vec<CategoryShare> = retained
        .iter()
        .map(|(category, count)| CategoryShare {
            category: category.to_string(),
            count: *count,
            share: *count as f64 / total as f64,
        })
        .collect();
    per_category.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });

    Some(CategorySupport {
        total,
        categories,
        min,
        max,
        mean,
        below_threshold,
        stranded,
        per_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_support_ignores_records_outside_the_map() {
        let parents = ParentMap::from_pairs([("A", "R"), ("C", "A")], "R").unwrap();
        let mut records = vec![QueryRecord::new("A", "x"); 4];
        records.extend(vec![QueryRecord::new("C", "z"); 2]);
        records.push(QueryRecord::new("R", "y"));

        let support = category_support(&records, &parents, 3).expect("support");
        assert_eq!(support.total, 6);
        assert_eq!(support.categories, 2);
        assert_eq!(support.min, 2);
        assert_eq!(support.max, 4);
        assert!((support.mean - 3.0).abs() < 1e-9);
        assert_eq!(support.below_threshold, 1);
        assert_eq!(support.stranded, 1);
        assert_eq!(support.per_category[0].category, "A");
        assert!((support.per_category[0].share - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn category_support_is_none_without_retained_records() {
        let parents = ParentMap::from_pairs([("A", "R")], "R").unwrap();
        let records = vec![QueryRecord::new("R", "y")];
        assert!(category_support(&records, &parents, 1).is_none());
    }
}
