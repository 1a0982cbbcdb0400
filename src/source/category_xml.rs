use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::constants::log::TAXONOMY;
use crate::constants::xml::{CATEGORY_ELEMENT, ID_ELEMENT, NAME_ELEMENT, PATH_ELEMENT};
use crate::data::TaxonomyEntry;
use crate::errors::LabelError;
use crate::source::{ElementEvent, stack_is, walk_elements};
use crate::types::CategoryId;

/// Read taxonomy entries from a category hierarchy document.
///
/// Expected layout:
///
/// ```xml
/// <categories>
///   <category>
///     <id>abcat0010000</id>
///     <name>Gift Center</name>
///     <path>
///       <category><id>cat00000</id><name>Best Buy</name></category>
///       <category><id>abcat0010000</id><name>Gift Center</name></category>
///     </path>
///   </category>
/// </categories>
/// ```
///
/// Only direct children of the document root are entries. Every path step
/// contributes one id; a step whose `<id>` is empty or missing contributes an
/// empty id, which the taxonomy builder rejects.
pub fn read_taxonomy_entries<R: BufRead>(
    input: R,
    origin: &str,
) -> Result<Vec<TaxonomyEntry>, LabelError> {
    const PATH_STEP: [&str; 3] = [CATEGORY_ELEMENT, PATH_ELEMENT, CATEGORY_ELEMENT];
    const PATH_STEP_ID: [&str; 4] = [CATEGORY_ELEMENT, PATH_ELEMENT, CATEGORY_ELEMENT, ID_ELEMENT];

    let mut entries = Vec::new();
    let mut current: Option<TaxonomyEntry> = None;

    walk_elements(input, origin, |event| {
        match event {
            ElementEvent::Open { stack } => {
                if stack_is(stack, &[CATEGORY_ELEMENT]) {
                    current = Some(TaxonomyEntry::default());
                } else if stack_is(stack, &PATH_STEP) {
                    if let Some(entry) = current.as_mut() {
                        entry.path.push(CategoryId::new());
                    }
                }
            }
            ElementEvent::Close { stack, text } => {
                if stack_is(stack, &[CATEGORY_ELEMENT]) {
                    entries.extend(current.take());
                    return Ok(());
                }
                let Some(entry) = current.as_mut() else {
                    return Ok(());
                };
                if stack_is(stack, &[CATEGORY_ELEMENT, ID_ELEMENT]) {
                    entry.id = text.unwrap_or_default().to_string();
                } else if stack_is(stack, &[CATEGORY_ELEMENT, NAME_ELEMENT]) {
                    entry.name = text.map(str::to_string);
                } else if stack_is(stack, &PATH_STEP_ID) {
                    if let Some(step) = entry.path.last_mut() {
                        *step = text.unwrap_or_default().to_string();
                    }
                }
            }
        }
        Ok(())
    })?;

    debug!("{TAXONOMY} read {} entries from {}", entries.len(), origin);
    Ok(entries)
}

/// Read taxonomy entries from a file on disk.
pub fn read_taxonomy_file(path: &Path) -> Result<Vec<TaxonomyEntry>, LabelError> {
    let file = File::open(path)?;
    read_taxonomy_entries(BufReader::new(file), &path.display().to_string())
}
