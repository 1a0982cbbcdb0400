/// Constants describing the product category taxonomy.
pub mod taxonomy {
    /// Id of the taxonomy root ("Best Buy"), which has no parent.
    pub const ROOT_CATEGORY_ID: &str = "cat00000";
    /// Top-level category excluded from catalog labels (music and movies).
    pub const MUSIC_AND_MOVIES_CATEGORY_ID: &str = "abcat0600000";
}

/// Constants used by the XML readers.
pub mod xml {
    /// Element wrapping one taxonomy entry or one path step.
    pub const CATEGORY_ELEMENT: &str = "category";
    /// Element holding a category id.
    pub const ID_ELEMENT: &str = "id";
    /// Element holding a display name.
    pub const NAME_ELEMENT: &str = "name";
    /// Element holding a taxonomy entry's root-to-self path.
    pub const PATH_ELEMENT: &str = "path";
    /// Element wrapping one catalog product.
    pub const PRODUCT_ELEMENT: &str = "product";
    /// Element holding a product's root-to-leaf category path.
    pub const CATEGORY_PATH_ELEMENT: &str = "categoryPath";
    /// File extension of catalog documents.
    pub const XML_EXTENSION: &str = "xml";
}

/// Constants used by the query dataset reader.
pub mod queries {
    /// Column holding the clicked product's category id.
    pub const CATEGORY_COLUMN: &str = "category";
    /// Column holding the raw query text.
    pub const QUERY_COLUMN: &str = "query";
}

/// Constants used by the rollup engine.
pub mod rollup {
    /// Default minimum number of queries a category needs to stay a label.
    pub const DEFAULT_MIN_QUERIES: usize = 1;
    /// Hard cap on rollup passes; deeper than any realistic taxonomy.
    pub const DEFAULT_MAX_ITERATIONS: usize = 64;
}

/// Constants describing the label-file output format.
pub mod label_file {
    /// Prefix the classifier trainer uses to recognize labels.
    pub const LABEL_PREFIX: &str = "__label__";
    /// Separator between the label and the text.
    pub const LABEL_TEXT_SEPARATOR: char = ' ';
    /// Field delimiter that must never appear unescaped inside a line.
    pub const FIELD_DELIMITER: char = '|';
    /// Escape character placed before protected characters.
    pub const ESCAPE_CHAR: char = '\\';
    /// Quote character, escaped since lines are written unquoted.
    pub const QUOTE_CHAR: char = '"';
}

/// Constants used by synonym candidate generation.
pub mod synonyms {
    /// Default cosine similarity a neighbor needs to count as a synonym.
    pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;
    /// Default number of nearest neighbors inspected per word.
    pub const DEFAULT_NEIGHBORS: usize = 10;
    /// Separator between synonyms on an output line.
    pub const SYNONYM_SEPARATOR: &str = ",";
}

/// Log prefixes used across components.
pub mod log {
    /// Taxonomy reading and parent-map construction.
    pub const TAXONOMY: &str = "[taxolabels:taxonomy]";
    /// Query dataset loading and filtering.
    pub const QUERIES: &str = "[taxolabels:queries]";
    /// Rollup passes.
    pub const ROLLUP: &str = "[taxolabels:rollup]";
    /// Label-file writing.
    pub const EMIT: &str = "[taxolabels:emit]";
    /// Catalog label extraction.
    pub const CATALOG: &str = "[taxolabels:catalog]";
    /// Synonym candidate generation.
    pub const SYNONYMS: &str = "[taxolabels:synonyms]";
}
