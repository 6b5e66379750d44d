//! Line-oriented text format for binding files
//!
//! One binding per line:
//!
//! ```text
//! <layer> <fader> <target-id> <name>
//! ```
//!
//! `name` is a short human-readable hint derived from the resolved display
//! name. It is ignored when parsing; the target id is authoritative.

use crate::domain::binding::{BindingEntry, BindingError, BindingStore, Fader, Layer};
use crate::domain::columns::ColumnList;
use crate::domain::target::{NameResolver, TargetId};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::{debug, trace};

/// Name field written for targets the resolver does not know
pub const UNRESOLVED_NAME: &str = "Unk";

/// Maximum number of characters kept in the name field
pub const NAME_FIELD_WIDTH: usize = 10;

/// Minimum number of whitespace-separated fields of a binding line
const MIN_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("line {line}: invalid {field} {value:?}: {source}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line {line}: {source}")]
    InvalidFader {
        line: usize,
        #[source]
        source: BindingError,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Result of parsing a binding file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub store: BindingStore,
    /// Target ids in first-seen file order
    pub columns: ColumnList,
}

/// Serializer and parser for binding files
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigCodec;

impl ConfigCodec {
    /// Render every binding of `store`, one newline-terminated line each
    pub fn serialize(store: &BindingStore, resolver: &dyn NameResolver) -> String {
        let text: String = store
            .entries()
            .map(|entry| {
                let name = truncated_name(resolver.resolve(&entry.target).as_deref());
                format!("{} {} {} {}\n", entry.layer, entry.fader, entry.target, name)
            })
            .collect();
        debug!(bindings = store.len(), bytes = text.len(), "Serialized bindings");
        text
    }

    /// Parse a binding file.
    ///
    /// Lines with fewer than three fields are skipped. A non-numeric layer or
    /// fader, or a fader outside 1..=7, fails the whole parse.
    pub fn parse(text: &str) -> Result<ParsedConfig> {
        let mut entries = Vec::new();
        let mut columns = ColumnList::new();

        for (number, line) in text.lines().enumerate() {
            let line_no = number + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_FIELDS {
                trace!(line = line_no, "Skipping short line");
                continue;
            }

            let layer = fields[0]
                .parse::<Layer>()
                .map_err(|source| CodecError::InvalidNumber {
                    line: line_no,
                    field: "layer",
                    value: fields[0].to_string(),
                    source,
                })?;
            let index = fields[1]
                .parse::<i64>()
                .map_err(|source| CodecError::InvalidNumber {
                    line: line_no,
                    field: "fader",
                    value: fields[1].to_string(),
                    source,
                })?;
            let fader = Fader::new(index).map_err(|source| CodecError::InvalidFader {
                line: line_no,
                source,
            })?;
            let target = TargetId::from(fields[2]);

            columns.add(target.clone());
            entries.push(BindingEntry::new(layer, fader, target));
        }

        let mut store = BindingStore::new();
        store.replace(entries);
        debug!(
            bindings = store.len(),
            columns = columns.len(),
            "Parsed bindings"
        );

        Ok(ParsedConfig { store, columns })
    }
}

/// Derive the name field from a resolved display name.
///
/// Leading `[...]` category prefixes are stripped, the result is cut to
/// [`NAME_FIELD_WIDTH`] characters and whitespace becomes underscores.
pub fn truncated_name(display: Option<&str>) -> String {
    let mut name = display.unwrap_or(UNRESOLVED_NAME);
    while let Some(rest) = name.strip_prefix('[') {
        match rest.find(']') {
            Some(end) => name = rest[end + 1..].trim_start(),
            None => break,
        }
    }

    name.chars()
        .take(NAME_FIELD_WIDTH)
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
