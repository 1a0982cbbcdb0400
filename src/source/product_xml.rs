use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::xml::{
    CATEGORY_ELEMENT, CATEGORY_PATH_ELEMENT, ID_ELEMENT, NAME_ELEMENT, PRODUCT_ELEMENT,
};
use crate::data::{CatalogProduct, PathCategory};
use crate::errors::LabelError;
use crate::source::{ElementEvent, stack_is, walk_elements};

/// Read the name and category path of every `<product>` in a catalog document.
pub fn read_catalog_products<R: BufRead>(
    input: R,
    origin: &str,
) -> Result<Vec<CatalogProduct>, LabelError> {
    const PATH_STEP: [&str; 3] = [PRODUCT_ELEMENT, CATEGORY_PATH_ELEMENT, CATEGORY_ELEMENT];
    const PATH_STEP_ID: [&str; 4] = [
        PRODUCT_ELEMENT,
        CATEGORY_PATH_ELEMENT,
        CATEGORY_ELEMENT,
        ID_ELEMENT,
    ];
    const PATH_STEP_NAME: [&str; 4] = [
        PRODUCT_ELEMENT,
        CATEGORY_PATH_ELEMENT,
        CATEGORY_ELEMENT,
        NAME_ELEMENT,
    ];

    let mut products = Vec::new();
    let mut current: Option<CatalogProduct> = None;

    walk_elements(input, origin, |event| {
        match event {
            ElementEvent::Open { stack } => {
                if stack_is(stack, &[PRODUCT_ELEMENT]) {
                    current = Some(CatalogProduct::default());
                } else if stack_is(stack, &PATH_STEP) {
                    if let Some(product) = current.as_mut() {
                        product.category_path.push(PathCategory::default());
                    }
                }
            }
            ElementEvent::Close { stack, text } => {
                if stack_is(stack, &[PRODUCT_ELEMENT]) {
                    products.extend(current.take());
                    return Ok(());
                }
                let Some(product) = current.as_mut() else {
                    return Ok(());
                };
                let value = text.map(str::to_string);
                if stack_is(stack, &[PRODUCT_ELEMENT, NAME_ELEMENT]) {
                    product.name = value;
                } else if stack_is(stack, &PATH_STEP_ID) {
                    if let Some(step) = product.category_path.last_mut() {
                        step.id = value;
                    }
                } else if stack_is(stack, &PATH_STEP_NAME) {
                    if let Some(step) = product.category_path.last_mut() {
                        step.name = value;
                    }
                }
            }
        }
        Ok(())
    })?;

    Ok(products)
}

/// Read catalog products from a file on disk.
pub fn read_catalog_file(path: &Path) -> Result<Vec<CatalogProduct>, LabelError> {
    let file = File::open(path)?;
    read_catalog_products(BufReader::new(file), &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<products>
  <product>
    <sku>1004622</sku>
    <name>Sharp - 46" Class AQUOS LCD TV</name>
    <categoryPath>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat0100000</id><name>TV &amp; Home Theater</name></category>
      <category><id>abcat0101001</id><name>All Flat-Panel TVs</name></category>
    </categoryPath>
  </product>
  <product>
    <name/>
    <categoryPath/>
  </product>
</products>"#;

    #[test]
    fn reads_names_and_category_paths() {
        let products = read_catalog_products(PRODUCTS.as_bytes(), "inline").unwrap();
        assert_eq!(products.len(), 2);

        let tv = &products[0];
        assert_eq!(tv.name.as_deref(), Some("Sharp - 46\" Class AQUOS LCD TV"));
        let ids: Vec<_> = tv
            .category_path
            .iter()
            .map(|step| step.id.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(ids, vec!["cat00000", "abcat0100000", "abcat0101001"]);
        assert_eq!(
            tv.category_path[1].name.as_deref(),
            Some("TV & Home Theater")
        );

        assert_eq!(products[1].name, None);
        assert!(products[1].category_path.is_empty());
    }
}
