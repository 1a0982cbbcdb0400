//! Label-file line formatting and writing.
//!
//! Each line is `__label__{category} {text}` written as a single unquoted field.
//! The field delimiter, the escape character, the quote character and line
//! terminators are backslash-escaped so no text content can split a record.

use std::borrow::Cow;
use std::io::{self, BufWriter, Write};

use tracing::debug;

use crate::constants::label_file::{
    ESCAPE_CHAR, FIELD_DELIMITER, LABEL_PREFIX, LABEL_TEXT_SEPARATOR, QUOTE_CHAR,
};
use crate::constants::log::EMIT;
use crate::data::QueryRecord;
use crate::taxonomy::ParentMap;
use crate::types::LabelLine;

/// Counts reported after writing a label file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Lines written.
    pub written: usize,
    /// Records whose category is not a parent-map key (root-collapsed or foreign).
    pub dropped: usize,
}

/// Escape a field so it can be written unquoted.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    let needs_escape = field
        .chars()
        .any(|ch| matches!(ch, FIELD_DELIMITER | ESCAPE_CHAR | QUOTE_CHAR | '\n' | '\r'));
    if !needs_escape {
        return Cow::Borrowed(field);
    }

    let mut escaped = String::with_capacity(field.len() + 8);
    for ch in field.chars() {
        match ch {
            '\n' => {
                escaped.push(ESCAPE_CHAR);
                escaped.push('n');
            }
            '\r' => {
                escaped.push(ESCAPE_CHAR);
                escaped.push('r');
            }
            FIELD_DELIMITER | ESCAPE_CHAR | QUOTE_CHAR => {
                escaped.push(ESCAPE_CHAR);
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Format one unescaped label line.
pub fn label_line(category: &str, text: &str) -> LabelLine {
    format!("{LABEL_PREFIX}{category}{LABEL_TEXT_SEPARATOR}{text}")
}

/// Writes escaped label lines to any sink.
pub struct LabelWriter<W: Write> {
    out: BufWriter<W>,
    written: usize,
}

impl<W: Write> LabelWriter<W> {
    /// Wrap `out` in a buffered writer.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            written: 0,
        }
    }

    /// Write one escaped `__label__{category} {text}` line.
    pub fn write_label(&mut self, category: &str, text: &str) -> io::Result<()> {
        let line = label_line(category, text);
        self.out.write_all(escape_field(&line).as_bytes())?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered output and return the line count.
    pub fn finish(mut self) -> io::Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Emits query records, dropping any whose category is not in the parent map.
pub struct LabelEmitter<'a> {
    parents: &'a ParentMap,
}

impl<'a> LabelEmitter<'a> {
    /// Emitter that keeps only categories present in `parents`.
    pub fn new(parents: &'a ParentMap) -> Self {
        Self { parents }
    }

    /// Label lines for the retained records, in input order.
    pub fn lines<'r>(&'r self, records: &'r [QueryRecord]) -> impl Iterator<Item = LabelLine> + 'r {
        records
            .iter()
            .filter(|record| self.parents.contains(&record.category))
            .map(|record| escape_field(&label_line(&record.category, &record.text)).into_owned())
    }

    /// Write the retained records to `out` and report written and dropped counts.
    pub fn write<W: Write>(&self, records: &[QueryRecord], out: W) -> io::Result<EmitStats> {
        let mut writer = LabelWriter::new(out);
        let mut dropped = 0usize;
        for record in records {
            if self.parents.contains(&record.category) {
                writer.write_label(&record.category, &record.text)?;
            } else {
                dropped += 1;
            }
        }
        let written = writer.finish()?;
        debug!("{EMIT} wrote {written} lines, dropped {dropped} records outside the taxonomy");
        Ok(EmitStats { written, dropped })
    }
}
