//! Query results paired with the reasons any device record was left out.
//!
//! Every getter returns a [`Snapshot`]. A record that the parser could not
//! align, or that the normalizer could not turn into a canonical entity,
//! is reported here instead of disappearing.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Why a raw record did not become an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Table row could not be aligned to the header columns.
    MisalignedRow,
    /// A field the entity cannot exist without was absent.
    MissingField,
    /// A field was present but could not be interpreted.
    InvalidValue,
    /// Detail record for an entity absent from the authoritative listing.
    UnknownEntity,
    /// Value outside the range the entity allows.
    OutOfRange,
}

impl DropReason {
    /// Stable code suitable for logs and metrics labels.
    pub fn code(self) -> &'static str {
        match self {
            Self::MisalignedRow => "misaligned_row",
            Self::MissingField => "missing_field",
            Self::InvalidValue => "invalid_value",
            Self::UnknownEntity => "unknown_entity",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single dropped record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub reason: DropReason,
    /// Command whose output held the record.
    pub command: String,
    /// Human readable detail, e.g. the field name.
    pub detail: String,
    /// The offending raw text.
    pub fragment: String,
}

impl Diagnostic {
    pub fn new(
        reason: DropReason,
        command: impl Into<String>,
        detail: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            reason,
            command: command.into(),
            detail: detail.into(),
            fragment: fragment.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({:?})",
            self.reason, self.command, self.detail, self.fragment
        )
    }
}

/// A freshly built value plus diagnostics for everything that was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Snapshot<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Snapshot with nothing dropped.
    pub fn clean(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Snapshot<U> {
        Snapshot {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
