//! Product-name label extraction from catalog documents.
//!
//! Files are processed independently on the rayon pool; each worker returns its
//! own label list and the lists are concatenated in file order. The
//! minimum-products filter is a separate counting pass over the collected labels.

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{CatalogConfig, LabelMode};
use crate::constants::log::CATALOG;
use crate::constants::xml::XML_EXTENSION;
use crate::data::{CatalogProduct, ProductLabel};
use crate::emit::label_line;
use crate::errors::LabelError;
use crate::normalize::QueryNormalizer;
use crate::source::read_catalog_file;
use crate::transport::fs::{create_output, files_with_extension};
use crate::utils::{label_token, single_line};

/// Counts reported by [`run_catalog_labels`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogReport {
    /// Catalog files read.
    pub files: usize,
    /// Products seen across all files.
    pub products: usize,
    /// Products that passed the acceptance checks.
    pub labels_extracted: usize,
    /// Lines written after the minimum-products filter.
    pub labels_written: usize,
    /// Categories meeting the minimum.
    pub categories_kept: usize,
    /// Categories below the minimum.
    pub categories_dropped: usize,
}

/// Turns catalog products into labeled product names.
#[derive(Clone, Debug)]
pub struct CatalogExtractor {
    config: CatalogConfig,
    normalizer: Option<QueryNormalizer>,
}

impl CatalogExtractor {
    /// Extractor for `config`, with the default normalizer when names are normalized.
    pub fn new(config: CatalogConfig) -> Self {
        let normalizer = config.normalize_names.then(QueryNormalizer::default);
        Self { config, normalizer }
    }

    /// Replace the normalizer used when `normalize_names` is set.
    pub fn with_normalizer(mut self, normalizer: QueryNormalizer) -> Self {
        if self.config.normalize_names {
            self.normalizer = Some(normalizer);
        }
        self
    }

    /// Label one product, or `None` when it fails any acceptance check.
    ///
    /// Accepted products have a name, a leaf category id, a path starting at the
    /// root, and a second-level category that is not excluded.
    pub fn label_product(&self, product: &CatalogProduct) -> Option<ProductLabel> {
        let name = product.name.as_deref()?;
        let path = &product.category_path;
        let top = path.first()?;
        if top.id.as_deref() != Some(self.config.root_id.as_str()) {
            return None;
        }
        let second = path.get(1)?;
        if second
            .id
            .as_deref()
            .is_some_and(|id| self.config.excluded_top_level.iter().any(|ex| ex == id))
        {
            return None;
        }
        let leaf = path.last()?;
        let leaf_id = leaf.id.as_deref()?;

        let category = match self.config.label_mode {
            LabelMode::Id => leaf_id.to_string(),
            LabelMode::Name => label_token(leaf.name.as_deref()?),
        };
        let name = single_line(name);
        let name = match &self.normalizer {
            Some(normalizer) => normalizer.normalize(&name),
            None => name,
        };
        Some(ProductLabel { category, name })
    }

    /// Extract labels from one catalog file.
    pub fn extract_file(&self, path: &Path) -> Result<(usize, Vec<ProductLabel>), LabelError> {
        let products = read_catalog_file(path)?;
        let labels: Vec<ProductLabel> = products
            .iter()
            .filter_map(|product| self.label_product(product))
            .collect();
        debug!(
            "{CATALOG} {}: {} products, {} labeled",
            path.display(),
            products.len(),
            labels.len()
        );
        Ok((products.len(), labels))
    }

    /// Extract labels from many files in parallel, concatenated in file order.
    pub fn extract_files(&self, files: &[PathBuf]) -> Result<(usize, Vec<ProductLabel>), LabelError> {
        let per_file = files
            .par_iter()
            .map(|path| self.extract_file(path))
            .collect::<Result<Vec<_>, _>>()?;

        let products = per_file.iter().map(|(count, _)| count).sum();
        let labels = per_file.into_iter().flat_map(|(_, labels)| labels).collect();
        Ok((products, labels))
    }
}

/// Keep labels whose category has at least `min_products` labels; 0 keeps all.
///
/// Returns the retained labels plus the number of categories kept and dropped.
pub fn retain_supported(
    labels: Vec<ProductLabel>,
    min_products: usize,
) -> (Vec<ProductLabel>, usize, usize) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in &labels {
        *counts.entry(label.category.clone()).or_insert(0) += 1;
    }
    let kept = counts
        .values()
        .filter(|count| **count >= min_products)
        .count();
    let dropped = counts.len() - kept;
    if min_products == 0 {
        return (labels, counts.len(), 0);
    }

    let retained = labels
        .into_iter()
        .filter(|label| counts.get(&label.category).copied().unwrap_or(0) >= min_products)
        .collect();
    (retained, kept, dropped)
}

/// Write catalog labels one per line, unescaped.
///
/// Names are already single-line, so they are written verbatim after the label.
pub fn write_catalog_labels<W: Write>(
    labels: &[ProductLabel],
    out: W,
) -> Result<usize, LabelError> {
    let mut out = BufWriter::new(out);
    for label in labels {
        writeln!(out, "{}", label_line(&label.category, &label.name))?;
    }
    out.flush()?;
    Ok(labels.len())
}

/// Extract, filter, and write labels for every `*.xml` file directly under `input_dir`.
pub fn run_catalog_labels(
    input_dir: &Path,
    output_path: &Path,
    config: &CatalogConfig,
) -> Result<CatalogReport, LabelError> {
    let files = files_with_extension(input_dir, XML_EXTENSION)?;
    info!(
        "{CATALOG} extracting labels from {} files in {}",
        files.len(),
        input_dir.display()
    );

    let extractor = CatalogExtractor::new(config.clone());
    let (products, labels) = extractor.extract_files(&files)?;
    let labels_extracted = labels.len();

    if config.min_products > 0 {
        info!(
            "{CATALOG} checking for categories with at least {} products...",
            config.min_products
        );
    }
    let (retained, categories_kept, categories_dropped) =
        retain_supported(labels, config.min_products);

    info!("{CATALOG} writing results to {}", output_path.display());
    let labels_written = write_catalog_labels(&retained, create_output(output_path)?)?;

    Ok(CatalogReport {
        files: files.len(),
        products,
        labels_extracted,
        labels_written,
        categories_kept,
        categories_dropped,
    })
}
