//! Parent map construction from root-to-self category paths.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::{MalformedEntryPolicy, TaxonomyConfig};
use crate::constants::log::TAXONOMY;
use crate::data::TaxonomyEntry;
use crate::errors::LabelError;
use crate::types::CategoryId;

/// Immutable child → parent mapping for every non-root category.
///
/// A lookup miss means the id is not a valid non-root category: either the
/// root itself or something outside the taxonomy.
#[derive(Clone, Debug)]
pub struct ParentMap {
    parents: HashMap<CategoryId, CategoryId>,
    root_id: CategoryId,
    max_depth: usize,
}

/// An entry rejected under [`MalformedEntryPolicy::Skip`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Id of the rejected entry.
    pub id: CategoryId,
    /// Why it was rejected.
    pub reason: String,
}

/// Result of building a parent map from taxonomy entries.
#[derive(Clone, Debug)]
pub struct TaxonomyBuild {
    /// The validated parent map.
    pub parents: ParentMap,
    /// Entries examined, including the root and skipped ones.
    pub entries_seen: usize,
    /// Entries rejected under the skip policy.
    pub skipped: Vec<SkippedEntry>,
}

impl ParentMap {
    /// Build a parent map from explicit `(child, parent)` pairs.
    ///
    /// Pairs naming the root as child are ignored. Fails on a parent cycle.
    pub fn from_pairs<I, C, P>(pairs: I, root_id: impl Into<CategoryId>) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<CategoryId>,
        P: Into<CategoryId>,
    {
        let root_id = root_id.into();
        let parents: HashMap<CategoryId, CategoryId> = pairs
            .into_iter()
            .map(|(child, parent)| (child.into(), parent.into()))
            .filter(|(child, _)| *child != root_id)
            .collect();
        Self::validated(parents, root_id)
    }

    /// Build a parent map from taxonomy entries, applying the malformed-entry policy.
    pub fn from_entries<I>(entries: I, config: &TaxonomyConfig) -> Result<TaxonomyBuild, LabelError>
    where
        I: IntoIterator<Item = TaxonomyEntry>,
    {
        let mut parents: HashMap<CategoryId, CategoryId> = HashMap::new();
        let mut skipped = Vec::new();
        let mut entries_seen = 0usize;

        for entry in entries {
            entries_seen += 1;
            let outcome = parent_of_entry(&entry, &config.root_id).and_then(|parent| {
                let Some(parent) = parent else {
                    return Ok(None);
                };
                match parents.get(&entry.id) {
                    Some(existing) if *existing != parent => Err(format!(
                        "conflicting parents '{existing}' and '{parent}'"
                    )),
                    Some(_) => Ok(None),
                    None => Ok(Some(parent)),
                }
            });

            match outcome {
                Ok(Some(parent)) => {
                    parents.insert(entry.id, parent);
                }
                Ok(None) => {}
                Err(reason) => match config.malformed {
                    MalformedEntryPolicy::Fail => {
                        return Err(LabelError::MalformedEntry {
                            id: entry.id,
                            reason,
                        });
                    }
                    MalformedEntryPolicy::Skip => {
                        warn!("{TAXONOMY} skipping entry '{}': {}", entry.id, reason);
                        skipped.push(SkippedEntry {
                            id: entry.id,
                            reason,
                        });
                    }
                },
            }
        }

        let parents = Self::validated(parents, config.root_id.clone())?;
        debug!(
            "{TAXONOMY} built parent map: {} categories, depth {}, {} skipped",
            parents.len(),
            parents.max_depth(),
            skipped.len()
        );
        Ok(TaxonomyBuild {
            parents,
            entries_seen,
            skipped,
        })
    }

    fn validated(
        parents: HashMap<CategoryId, CategoryId>,
        root_id: CategoryId,
    ) -> Result<Self, LabelError> {
        let max_depth = longest_chain(&parents)?;
        Ok(Self {
            parents,
            root_id,
            max_depth,
        })
    }

    /// Parent of `id`, or `None` when `id` is the root or outside the taxonomy.
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Whether `id` is a valid non-root category.
    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    /// Ancestors of `id`, nearest first, ending with the first id outside the map.
    pub fn ancestors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        std::iter::successors(self.parent(id), move |current| self.parent(current))
            .take(self.max_depth)
    }

    /// The designated root id.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Number of non-root categories.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the map holds no categories.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Longest number of parent steps from any key to an id outside the map.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// All non-root category ids, in arbitrary order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(String::as_str)
    }
}

/// Immediate parent of an entry, `Ok(None)` for the root, `Err(reason)` when malformed.
fn parent_of_entry(entry: &TaxonomyEntry, root_id: &str) -> Result<Option<CategoryId>, String> {
    if entry.id.is_empty() {
        return Err("entry has no id".to_string());
    }
    let Some(last) = entry.path.last() else {
        return Err("entry has an empty path".to_string());
    };
    if *last != entry.id {
        return Err(format!("path ends in '{last}' instead of the entry id"));
    }
    if entry.path.iter().any(String::is_empty) {
        return Err("path contains an empty ancestor id".to_string());
    }
    if entry.id == root_id {
        return Ok(None);
    }
    let Some(parent) = entry.path.len().checked_sub(2).map(|idx| &entry.path[idx]) else {
        return Err("path has no ancestor for a non-root entry".to_string());
    };
    if *parent == entry.id {
        return Err("entry lists itself as its parent".to_string());
    }
    Ok(Some(parent.clone()))
}

/// Longest parent chain, memoized; errors on the first id revisited within a chain.
fn longest_chain(parents: &HashMap<CategoryId, CategoryId>) -> Result<usize, LabelError> {
    let mut depths: HashMap<&str, usize> = HashMap::with_capacity(parents.len());
    let mut max_depth = 0usize;

    for start in parents.keys() {
        let mut chain: Vec<&str> = Vec::new();
        let mut on_chain: HashSet<&str> = HashSet::new();
        let mut cursor = start.as_str();
        let base = loop {
            if let Some(&known) = depths.get(cursor) {
                break known;
            }
            let Some(parent) = parents.get(cursor) else {
                break 0;
            };
            if !on_chain.insert(cursor) {
                return Err(LabelError::TaxonomyCycle {
                    id: cursor.to_string(),
                });
            }
            chain.push(cursor);
            cursor = parent.as_str();
        };
        for (offset, id) in chain.iter().rev().enumerate() {
            let depth = base + offset + 1;
            depths.insert(*id, depth);
            max_depth = max_depth.max(depth);
        }
    }

    Ok(max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &[&str]) -> TaxonomyEntry {
        TaxonomyEntry::new(path.last().copied().unwrap_or(""), path.iter().copied())
    }

    #[test]
    fn parent_is_second_to_last_path_id_and_root_is_excluded() {
        let entries = vec![
            entry(&["cat00000"]),
            entry(&["cat00000", "abcat0100000"]),
            entry(&["cat00000", "abcat0100000", "abcat0101000"]),
        ];
        let build = ParentMap::from_entries(entries, &TaxonomyConfig::default()).unwrap();
        let parents = build.parents;

        assert_eq!(build.entries_seen, 3);
        assert!(build.skipped.is_empty());
        assert_eq!(parents.len(), 2);
        assert!(!parents.contains("cat00000"));
        assert_eq!(parents.parent("abcat0100000"), Some("cat00000"));
        assert_eq!(parents.parent("abcat0101000"), Some("abcat0100000"));
        assert_eq!(parents.max_depth(), 2);
    }

    #[test]
    fn malformed_entries_are_skipped_and_reported() {
        let entries = vec![
            entry(&["cat00000", "a"]),
            TaxonomyEntry::new("b", Vec::<String>::new()),
            TaxonomyEntry::new("c", ["cat00000", "d"]),
            entry(&["c"]),
        ];
        let build = ParentMap::from_entries(entries, &TaxonomyConfig::default()).unwrap();

        assert_eq!(build.parents.len(), 1);
        let skipped: Vec<&str> = build.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["b", "c", "c"]);
    }

    #[test]
    fn empty_id_anywhere_on_the_path_is_malformed() {
        let entries = vec![entry(&["cat00000", "", "mid", "leaf"])];
        let build = ParentMap::from_entries(entries, &TaxonomyConfig::default()).unwrap();
        assert!(build.parents.is_empty());
        assert_eq!(build.skipped[0].id, "leaf");
    }

    #[test]
    fn malformed_entries_fail_under_fail_policy() {
        let config = TaxonomyConfig::default().with_malformed_policy(MalformedEntryPolicy::Fail);
        let entries = vec![TaxonomyEntry::new("x", ["cat00000", "y"])];
        let err = ParentMap::from_entries(entries, &config).unwrap_err();
        assert!(matches!(err, LabelError::MalformedEntry { ref id, .. } if id == "x"));
    }

    #[test]
    fn conflicting_duplicate_is_malformed_but_identical_duplicate_is_not() {
        let entries = vec![
            entry(&["cat00000", "a"]),
            entry(&["cat00000", "a"]),
            entry(&["cat00000", "b", "a"]),
        ];
        let build = ParentMap::from_entries(entries, &TaxonomyConfig::default()).unwrap();
        assert_eq!(build.parents.parent("a"), Some("cat00000"));
        assert_eq!(build.skipped.len(), 1);
    }

    #[test]
    fn cycles_are_rejected() {
        let err = ParentMap::from_pairs([("a", "b"), ("b", "c"), ("c", "a")], "r").unwrap_err();
        assert!(matches!(err, LabelError::TaxonomyCycle { .. }));
    }

    #[test]
    fn ancestors_walk_to_first_id_outside_the_map() {
        let parents =
            ParentMap::from_pairs([("a", "r"), ("b", "a"), ("c", "b"), ("r", "ignored")], "r")
                .unwrap();
        assert!(!parents.contains("r"));
        assert_eq!(parents.ancestors("c").collect::<Vec<_>>(), vec!["b", "a", "r"]);
        assert_eq!(parents.ancestors("r").count(), 0);
        assert_eq!(parents.ancestors("unknown").count(), 0);
        assert_eq!(parents.max_depth(), 3);
    }
}
