//! Fact normalization.
//!
//! Normalizers turn parsed records into canonical entities. They are pure
//! functions over [`Parsed`] output, so every one of them can be exercised
//! against captured device text without a session.
//!
//! A record either becomes (part of) an entity or is dropped with a
//! [`DropReason`]; nothing disappears silently. Records that describe the
//! same entity are merged, and a disagreement between them is an
//! [`InconsistentRecord`](crate::error::NormalizeError::InconsistentRecord)
//! error rather than a guess.

pub mod bgp;
pub mod environment;
pub mod facts;
pub mod interfaces;
pub mod lldp;
pub mod routes;
pub mod system;
pub mod units;

use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::error::NormalizeError;
use crate::parser::{Parsed, Record};
use crate::snapshot::{Diagnostic, DropReason, Snapshot};

/// Collects diagnostics for one normalization run.
#[derive(Debug, Default)]
pub struct Drops {
    diagnostics: Vec<Diagnostic>,
}

impl Drops {
    /// Start from the rows the parser already skipped.
    pub fn from_parsed<'a>(parsed: impl IntoIterator<Item = &'a Parsed>) -> Self {
        let diagnostics = parsed
            .into_iter()
            .flat_map(|p| p.diagnostics.iter().cloned())
            .collect();
        Self { diagnostics }
    }

    /// Drop `record` for `reason`.
    pub fn record(
        &mut self,
        reason: DropReason,
        command: &str,
        detail: impl Into<String>,
        record: &Record,
    ) {
        self.push(Diagnostic::new(reason, command, detail, render(record)));
    }

    /// Drop a single field value for `reason`.
    pub fn value(
        &mut self,
        reason: DropReason,
        command: &str,
        detail: impl Into<String>,
        value: &str,
    ) {
        self.push(Diagnostic::new(reason, command, detail, value));
    }

    /// Take over the diagnostics of a nested snapshot and return its value.
    pub fn absorb<T>(&mut self, snapshot: Snapshot<T>) -> T {
        self.diagnostics.extend(snapshot.diagnostics);
        snapshot.value
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        debug!("dropped record: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn finish<T>(self, value: T) -> Snapshot<T> {
        Snapshot::new(value, self.diagnostics)
    }
}

/// A field value, treating OS10 placeholders (`-`, `N/A`) as absent.
pub(crate) fn field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !units::is_placeholder(v))
}

/// Every value of a field captured more than once.
pub(crate) fn values<'a>(record: &'a Record, key: &str) -> impl Iterator<Item = &'a str> {
    record
        .get(key)
        .into_iter()
        .flat_map(|v| v.lines())
        .map(str::trim)
        .filter(|v| !units::is_placeholder(v))
}

/// Merge a value for `field` of `entity` keyed by `key`, failing on conflict.
pub(crate) fn merge<T: PartialEq + ToString>(
    entity: &str,
    key: &str,
    field: &str,
    slot: &mut Option<T>,
    value: T,
) -> Result<(), NormalizeError> {
    match slot {
        Some(existing) if *existing != value => Err(NormalizeError::InconsistentRecord {
            entity: entity.to_string(),
            key: key.to_string(),
            field: field.to_string(),
            first: existing.to_string(),
            second: value.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

/// Fold `fields` into `into`, failing when a field already holds another value.
pub(crate) fn merge_fields<'r>(
    entity: &str,
    key: &str,
    into: &mut Record,
    fields: impl IntoIterator<Item = (&'r String, &'r String)>,
) -> Result<(), NormalizeError> {
    for (name, value) in fields {
        let mut slot = into.get(name).cloned();
        merge(entity, key, name, &mut slot, value.clone())?;
        if let Some(value) = slot {
            into.insert(name.clone(), value);
        }
    }
    Ok(())
}

/// Insert an entity under `key`. Repeating an identical entity is a no-op;
/// a different one is an `InconsistentRecord` on `field`.
pub(crate) fn insert_unique<V: PartialEq + fmt::Debug>(
    entity: &str,
    field: &str,
    map: &mut IndexMap<String, V>,
    key: String,
    value: V,
) -> Result<(), NormalizeError> {
    match map.get(&key) {
        Some(existing) if *existing != value => Err(NormalizeError::InconsistentRecord {
            entity: entity.to_string(),
            field: field.to_string(),
            first: format!("{:?}", existing),
            second: format!("{:?}", value),
            key,
        }),
        Some(_) => Ok(()),
        None => {
            map.insert(key, value);
            Ok(())
        }
    }
}

fn render(record: &Record) -> String {
    record
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_field_skips_placeholders() {
        let rec = record(&[("Description", "-"), ("Speed", " 10G ")]);
        assert_eq!(field(&rec, "Description"), None);
        assert_eq!(field(&rec, "Speed"), Some("10G"));
        assert_eq!(field(&rec, "Missing"), None);
    }

    #[test]
    fn test_values_splits_repeated_fields() {
        let rec = record(&[("ipv6", "2001:db8::1/64\n2001:db8:1::1/64")]);
        let all: Vec<_> = values(&rec, "ipv6").collect();
        assert_eq!(all, vec!["2001:db8::1/64", "2001:db8:1::1/64"]);
    }

    #[test]
    fn test_merge_conflict() {
        let mut slot = None;
        merge("bgp peer", "10.0.0.2", "remote_as", &mut slot, 65002).unwrap();
        merge("bgp peer", "10.0.0.2", "remote_as", &mut slot, 65002).unwrap();
        let err = merge("bgp peer", "10.0.0.2", "remote_as", &mut slot, 65003).unwrap_err();
        assert!(err.to_string().contains("65002"));
        assert!(err.to_string().contains("65003"));
    }

    #[test]
    fn test_merge_fields() {
        let mut into = record(&[("mtu", "9216")]);
        merge_fields("interface", "ethernet1/1/1", &mut into, &record(&[("mtu", "9216"), ("speed", "10G")]))
            .unwrap();
        assert_eq!(into.get("speed").map(String::as_str), Some("10G"));

        let err = merge_fields("interface", "ethernet1/1/1", &mut into, &record(&[("mtu", "1500")]))
            .unwrap_err();
        assert!(err.to_string().contains("mtu"));
    }

    #[test]
    fn test_insert_unique() {
        let mut map = IndexMap::new();
        insert_unique("psu", "status", &mut map, "psu1".to_string(), true).unwrap();
        insert_unique("psu", "status", &mut map, "psu1".to_string(), true).unwrap();
        let err = insert_unique("psu", "status", &mut map, "psu1".to_string(), false).unwrap_err();
        let NormalizeError::InconsistentRecord { key, first, second, .. } = err;
        assert_eq!(key, "psu1");
        assert_eq!((first.as_str(), second.as_str()), ("true", "false"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_drops_keep_parser_diagnostics() {
        let parsed = Parsed {
            records: Vec::new(),
            diagnostics: vec![Diagnostic::new(
                DropReason::MisalignedRow,
                "show interface status",
                "row ends early",
                "Eth 1/1/9",
            )],
        };
        let mut drops = Drops::from_parsed([&parsed]);
        drops.value(DropReason::InvalidValue, "show version", "uptime", "soon");
        let snapshot = drops.finish(());
        assert_eq!(snapshot.diagnostics.len(), 2);
        assert_eq!(snapshot.diagnostics[0].reason, DropReason::MisalignedRow);
    }
}
