use serde::{Deserialize, Serialize};

pub use crate::types::{CategoryId, CategoryName, QueryText};

/// One entry of the category hierarchy, as read from the taxonomy source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxonomyEntry {
    /// The entry's own category id.
    pub id: CategoryId,
    /// Display name, when present.
    pub name: Option<CategoryName>,
    /// Ancestor ids ordered from the root down to (and including) `id`.
    pub path: Vec<CategoryId>,
}

impl TaxonomyEntry {
    /// Build an entry from its id and root-to-self path.
    pub fn new<I, S>(id: impl Into<CategoryId>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategoryId>,
    {
        Self {
            id: id.into(),
            name: None,
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

/// A search query labeled with the category of the product it led to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Category label; changes during rollup.
    pub category: CategoryId,
    /// Query text, raw on load and normalized afterwards.
    pub text: QueryText,
}

impl QueryRecord {
    /// Build a record from a category and text.
    pub fn new(category: impl Into<CategoryId>, text: impl Into<QueryText>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// One step of a product's category path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathCategory {
    /// Category id, when the step carries one.
    pub id: Option<CategoryId>,
    /// Category display name, when present.
    pub name: Option<CategoryName>,
}

/// The fields of a catalog product needed for labeling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Product name, when present.
    pub name: Option<String>,
    /// Root-to-leaf category path.
    pub category_path: Vec<PathCategory>,
}

/// A product name labeled with its leaf category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductLabel {
    /// Leaf category id or underscored leaf name.
    pub category: CategoryId,
    /// Single-line product name.
    pub name: String,
}
