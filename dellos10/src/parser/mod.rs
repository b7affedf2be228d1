//! Raw output parsing.
//!
//! Turns the text a device prints into ordered field maps. The parser knows
//! nothing about interfaces or BGP; it only knows the three shapes OS10
//! output comes in:
//!
//! - column tables ([`table`]), aligned by header offsets
//! - key/value blocks ([`block`]), split on a header or separator line
//! - JSON documents ([`json`]), flattened along a record path
//!
//! Which shape applies to which command is decided by the platform's
//! command table, see [`crate::platform::os10`].

pub mod block;
pub mod json;
pub mod table;

pub use block::{BlockDelimiter, BlockLayout};
pub use json::JsonLayout;
pub use table::{ColumnSplit, TableLayout};

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::snapshot::Diagnostic;

/// One structured record: field name to raw string value, in output order.
pub type Record = IndexMap<String, String>;

/// Records decoded from one command, plus rows that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record, for outputs that describe a single entity.
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }
}

/// How the output of a command is laid out.
#[derive(Debug, Clone)]
pub enum Layout {
    Table(TableLayout),
    Blocks(BlockLayout),
    Json(JsonLayout),
    /// Free text consumed as-is (configuration, ping).
    Text,
}

/// Decode `text` according to `layout`.
///
/// `Layout::Text` yields a single record holding the whole output under
/// the `text` key.
pub fn parse(command: &str, text: &str, layout: &Layout) -> Result<Parsed, ParseError> {
    match layout {
        Layout::Table(table) => Ok(table.parse(command, text)),
        Layout::Blocks(blocks) => Ok(blocks.parse(text)),
        Layout::Json(json) => json.parse(command, text),
        Layout::Text => {
            let mut record = Record::new();
            record.insert("text".to_string(), text.to_string());
            Ok(Parsed {
                records: vec![record],
                diagnostics: Vec::new(),
            })
        }
    }
}

/// Shorten a raw fragment for error context.
pub(crate) fn fragment(text: &str) -> String {
    const LIMIT: usize = 160;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
