//! JSON output parsing.
//!
//! Commands piped through `| display-json` return a JSON document. A
//! [`JsonLayout`] names the path to the record objects; each record is
//! flattened into dotted keys so the normalizer can treat it like any other
//! record:
//!
//! ```text
//! {"bgp-oper": {"vrf": [{"vrf-name": "default",
//!                        "peer-oper": [{"remote-address": "10.0.0.2", ...}]}]}}
//!
//! path "bgp-oper.vrf[].peer-oper[]"  ->  {"vrf.vrf-name": "default",
//!                                         "remote-address": "10.0.0.2", ...}
//! ```
//!
//! Scalars of the objects passed on the way down are inherited under the
//! name of the path segment that led to them. Bulk output may hold several
//! concatenated documents; records from all of them are returned in order.

use serde_json::{Deserializer, Map, Value};

use super::{Parsed, Record, fragment};
use crate::error::ParseError;

/// Path from the document root to the record objects.
#[derive(Debug, Clone)]
pub struct JsonLayout {
    /// Dot separated keys; a `[]` suffix iterates an array.
    pub record_path: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct Segment<'a> {
    key: &'a str,
    each: bool,
}

impl JsonLayout {
    pub const fn new(record_path: &'static str) -> Self {
        Self { record_path }
    }

    fn segments(&self) -> Vec<Segment<'static>> {
        self.record_path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_suffix("[]") {
                Some(key) => Segment { key, each: true },
                None => Segment {
                    key: s,
                    each: false,
                },
            })
            .collect()
    }

    /// Decode every document in `text`.
    ///
    /// A missing key along the path yields no records. A value of the wrong
    /// JSON type is a [`ParseError::MalformedOutput`] carrying the offending
    /// fragment.
    pub fn parse(&self, command: &str, text: &str) -> Result<Parsed, ParseError> {
        let malformed = |reason: String, value: &str| ParseError::MalformedOutput {
            command: command.to_string(),
            reason,
            fragment: fragment(value),
        };

        let mut parsed = Parsed::default();
        let segments = self.segments();
        for document in Deserializer::from_str(text).into_iter::<Value>() {
            let root = document.map_err(|e| malformed(format!("invalid JSON: {}", e), text))?;
            walk(&root, &segments, "", Record::new(), &mut parsed.records)
                .map_err(|(reason, value)| malformed(reason, &value.to_string()))?;
        }
        Ok(parsed)
    }
}

fn walk<'v>(
    value: &'v Value,
    segments: &[Segment<'_>],
    scope: &str,
    inherited: Record,
    out: &mut Vec<Record>,
) -> Result<(), (String, &'v Value)> {
    let Some((segment, rest)) = segments.split_first() else {
        let Value::Object(object) = value else {
            return Err(("expected a record object".to_string(), value));
        };
        let mut record = inherited;
        flatten_into(&mut record, "", object, None);
        out.push(record);
        return Ok(());
    };

    let Value::Object(object) = value else {
        return Err((format!("expected an object holding '{}'", segment.key), value));
    };

    let mut inherited = inherited;
    flatten_into(&mut inherited, scope, object, Some(segment.key));

    let Some(child) = object.get(segment.key) else {
        return Ok(());
    };

    if segment.each {
        let Value::Array(items) = child else {
            return Err((format!("expected '{}' to be an array", segment.key), child));
        };
        for item in items {
            walk(item, rest, segment.key, inherited.clone(), out)?;
        }
        Ok(())
    } else {
        walk(child, rest, segment.key, inherited, out)
    }
}

/// Flatten `object` into `record` under `scope`, skipping `skip`.
///
/// Arrays of objects are only flattened for the record itself; ancestors
/// keep their scalars and nested objects.
fn flatten_into(record: &mut Record, scope: &str, object: &Map<String, Value>, skip: Option<&str>) {
    let ancestor = skip.is_some();
    for (key, value) in object {
        if Some(key.as_str()) == skip {
            continue;
        }
        let name = join(scope, key);
        if ancestor && value.as_array().is_some_and(|a| a.iter().any(Value::is_object)) {
            continue;
        }
        flatten_value(record, &name, value);
    }
}

fn flatten_value(record: &mut Record, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            record.insert(name.to_string(), b.to_string());
        }
        Value::Number(n) => {
            record.insert(name.to_string(), n.to_string());
        }
        Value::String(s) => {
            record.insert(name.to_string(), s.clone());
        }
        Value::Object(object) => {
            for (key, inner) in object {
                flatten_value(record, &join(name, key), inner);
            }
        }
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => {
            let joined = items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(",");
            record.insert(name.to_string(), joined);
        }
        Value::Array(items) => {
            for (idx, inner) in items.iter().enumerate() {
                flatten_value(record, &join(name, &idx.to_string()), inner);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join(scope: &str, key: &str) -> String {
    if scope.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", scope, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BGP: &str = r#"{
      "bgp-oper": {
        "vrf": [
          {
            "vrf-name": "default",
            "summary-info": {"router-id": "10.0.0.1", "local-as": 65001},
            "peer-oper": [
              {"remote-address": "10.0.0.2", "remote-as": 65002, "bgp-state": "established",
               "af": [{"afi": "ipv4", "in-prefixes": 12}]},
              {"remote-address": "10.0.0.3", "remote-as": 65003, "bgp-state": "active",
               "description": null}
            ]
          }
        ]
      }
    }"#;

    #[test]
    fn test_records_inherit_ancestor_scalars() {
        let layout = JsonLayout::new("bgp-oper.vrf[].peer-oper[]");
        let parsed = layout.parse("show ip bgp neighbors | display-json", BGP).unwrap();
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first["vrf.vrf-name"], "default");
        assert_eq!(first["vrf.summary-info.router-id"], "10.0.0.1");
        assert_eq!(first["remote-as"], "65002");
        assert_eq!(first["af.0.afi"], "ipv4");
        assert_eq!(first["af.0.in-prefixes"], "12");

        let second = &parsed.records[1];
        assert_eq!(second["bgp-state"], "active");
        assert!(!second.contains_key("description"));
    }

    #[test]
    fn test_missing_key_yields_no_records() {
        let layout = JsonLayout::new("routes[]");
        let parsed = layout.parse("show ip route | display-json", "{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_malformed() {
        let layout = JsonLayout::new("routes[]");
        let err = layout
            .parse("show ip route | display-json", r#"{"routes": {"destination-prefix": "0.0.0.0/0"}}"#)
            .unwrap_err();
        let ParseError::MalformedOutput {
            command,
            reason,
            fragment,
        } = err;
        assert_eq!(command, "show ip route | display-json");
        assert!(reason.contains("array"));
        assert!(fragment.contains("destination-prefix"));
    }

    #[test]
    fn test_top_level_array_is_malformed() {
        let layout = JsonLayout::new("routes[]");
        let err = layout.parse("show ip route | display-json", "[]").unwrap_err();
        assert!(err.to_string().contains("expected an object"));
    }

    #[test]
    fn test_concatenated_documents() {
        let layout = JsonLayout::new("routes[]");
        let text = r#"{"routes": [{"destination-prefix": "10.0.0.0/8"}]}
{"routes": [{"destination-prefix": "10.1.0.0/16"}]}"#;
        let parsed = layout.parse("show ip route | display-json", text).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1]["destination-prefix"], "10.1.0.0/16");
        assert!(layout.parse("cmd", "  \n").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let layout = JsonLayout::new("routes[]");
        let err = layout.parse("cmd", r#"{"routes": [{"#).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_scalar_arrays_are_joined() {
        let layout = JsonLayout::new("entries[]");
        let parsed = layout
            .parse("cmd", r#"{"entries": [{"vlans": [1, 10, 20]}]}"#)
            .unwrap();
        assert_eq!(parsed.records[0]["vlans"], "1,10,20");
    }
}
