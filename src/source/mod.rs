//! Readers turning on-disk inputs into taxonomy entries, query records, and
//! catalog products.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::errors::LabelError;

/// Category hierarchy XML reader.
pub mod category_xml;
/// Product catalog XML reader.
pub mod product_xml;
/// Query dataset CSV reader.
pub mod queries_csv;

pub use category_xml::{read_taxonomy_entries, read_taxonomy_file};
pub use product_xml::{read_catalog_file, read_catalog_products};
pub use queries_csv::{read_queries, read_queries_file};

/// Element boundary seen while walking an XML document.
///
/// `stack` holds element names from the document root down to (and including)
/// the element being opened or closed.
pub(crate) enum ElementEvent<'a> {
    Open {
        stack: &'a [String],
    },
    Close {
        stack: &'a [String],
        /// Trimmed direct text content; `None` when empty.
        text: Option<&'a str>,
    },
}

/// Stream an XML document and report element opens and closes in order.
pub(crate) fn walk_elements<R, F>(input: R, origin: &str, mut visit: F) -> Result<(), LabelError>
where
    R: BufRead,
    F: FnMut(ElementEvent<'_>) -> Result<(), LabelError>,
{
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| xml_error(origin, reader.buffer_position(), err))?;
        match event {
            Event::Start(start) => {
                stack.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                text.clear();
                visit(ElementEvent::Open { stack: &stack })?;
            }
            Event::Empty(start) => {
                stack.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                text.clear();
                visit(ElementEvent::Open { stack: &stack })?;
                visit(ElementEvent::Close {
                    stack: &stack,
                    text: None,
                })?;
                stack.pop();
            }
            Event::Text(raw) => {
                let unescaped = raw
                    .unescape()
                    .map_err(|err| xml_error(origin, reader.buffer_position(), err))?;
                text.push_str(&unescaped);
            }
            Event::CData(raw) => {
                text.push_str(&String::from_utf8_lossy(&raw.into_inner()));
            }
            Event::End(_) => {
                let trimmed = text.trim();
                visit(ElementEvent::Close {
                    stack: &stack,
                    text: (!trimmed.is_empty()).then_some(trimmed),
                })?;
                text.clear();
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn xml_error(origin: &str, position: usize, err: quick_xml::Error) -> LabelError {
    LabelError::Xml {
        origin: origin.to_string(),
        details: format!("{err} (near byte {position})"),
    }
}

/// Whether `stack` ends with exactly `names` at depth `names.len() + 1` (below the document root).
pub(crate) fn stack_is(stack: &[String], names: &[&str]) -> bool {
    stack.len() == names.len() + 1
        && stack[1..]
            .iter()
            .zip(names)
            .all(|(actual, expected)| actual == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_reports_trimmed_text_and_entities() {
        let xml = "<root><item><id> a&amp;b </id><empty/></item></root>";
        let mut closes = Vec::new();
        walk_elements(xml.as_bytes(), "inline", |event| {
            if let ElementEvent::Close { stack, text } = event {
                closes.push((stack.join("/"), text.map(str::to_string)));
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(
            closes,
            vec![
                ("root/item/id".to_string(), Some("a&b".to_string())),
                ("root/item/empty".to_string(), None),
                ("root/item".to_string(), None),
                ("root".to_string(), None),
            ]
        );
    }

    #[test]
    fn mismatched_tags_are_xml_errors() {
        let err = walk_elements("<a><b></a>".as_bytes(), "broken", |_| Ok(())).unwrap_err();
        assert!(matches!(err, LabelError::Xml { ref origin, .. } if origin == "broken"));
    }

    #[test]
    fn stack_is_matches_below_document_root() {
        let stack: Vec<String> = ["categories", "category", "id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(stack_is(&stack, &["category", "id"]));
        assert!(!stack_is(&stack, &["category"]));
        assert!(!stack_is(&stack, &["path", "id"]));
    }
}
