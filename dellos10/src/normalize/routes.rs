//! Routes from `show ip route | display-json`.
//!
//! Each route record may carry several next hops; every next hop becomes
//! its own [`Route`] under the shared destination.

use std::net::IpAddr;

use indexmap::IndexMap;

use super::{Drops, field, units};
use crate::model::{Route, RouteProtocol};
use crate::parser::{Parsed, Record};
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

const DEFAULT_VRF: &str = "default";

/// The `show ip route` argument for a lookup.
///
/// A destination always wins; otherwise the protocol's CLI filter is used
/// when the device has one.
pub fn route_filter(destination: Option<&str>, protocol: Option<RouteProtocol>) -> String {
    match (destination.map(str::trim).filter(|d| !d.is_empty()), protocol) {
        (Some(destination), _) => format!(" {}", destination),
        (None, Some(protocol)) => protocol
            .cli_filter()
            .map(|f| format!(" {}", f))
            .unwrap_or_default(),
        (None, None) => String::new(),
    }
}

/// Routes keyed by destination prefix, optionally limited to `protocol`.
pub fn routes(
    parsed: &Parsed,
    protocol: Option<RouteProtocol>,
) -> Snapshot<IndexMap<String, Vec<Route>>> {
    let command = CommandCategory::Routes.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let mut result: IndexMap<String, Vec<Route>> = IndexMap::new();

    for record in &parsed.records {
        let Some(destination) = field(record, "destination-prefix") else {
            drops.record(DropReason::MissingField, command, "destination-prefix", record);
            continue;
        };
        if let Err(reason) = check_prefix(destination) {
            drops.record(reason, command, "destination-prefix", record);
            continue;
        }

        let route_protocol = field(record, "source-protocol")
            .map(RouteProtocol::from_device)
            .unwrap_or(RouteProtocol::Unknown);
        if protocol.is_some_and(|wanted| wanted != route_protocol) {
            continue;
        }

        let (preference, metric) = match (number(record, "distance"), number(record, "metric")) {
            (Ok(preference), Ok(metric)) => (preference, metric),
            (Err(key), _) | (_, Err(key)) => {
                drops.record(DropReason::InvalidValue, command, key, record);
                continue;
            }
        };

        let age = match field(record, "uptime") {
            Some(raw) => {
                let age = units::duration_secs(raw);
                if age.is_none() {
                    drops.value(DropReason::InvalidValue, command, "uptime", raw);
                }
                age
            }
            None => None,
        };

        let base = Route {
            destination: destination.to_string(),
            next_hop: None,
            protocol: route_protocol,
            current_active: field(record, "is-active").is_some_and(|v| v == "true"),
            preference,
            metric,
            outgoing_interface: None,
            age,
            routing_table: field(record, "vrf-name").unwrap_or(DEFAULT_VRF).to_string(),
        };

        let hops = next_hops(record);
        let entry = result.entry(destination.to_string()).or_default();
        if hops.is_empty() {
            entry.push(base);
            continue;
        }
        for (address, interface) in hops {
            entry.push(Route {
                next_hop: address,
                outgoing_interface: interface.map(units::interface_name),
                ..base.clone()
            });
        }
    }

    drops.finish(result)
}

fn check_prefix(value: &str) -> Result<(), DropReason> {
    let (addr, len) = value.split_once('/').ok_or(DropReason::InvalidValue)?;
    let addr: IpAddr = addr.parse().map_err(|_| DropReason::InvalidValue)?;
    let len: u8 = len.parse().map_err(|_| DropReason::InvalidValue)?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if len > max {
        return Err(DropReason::OutOfRange);
    }
    Ok(())
}

/// An optional numeric field; absent is zero.
fn number(record: &Record, key: &'static str) -> Result<u32, &'static str> {
    match field(record, key) {
        Some(value) => value.parse().map_err(|_| key),
        None => Ok(0),
    }
}

/// `(address, interface)` for every next hop, whether the device printed
/// one object or a list.
fn next_hops(record: &Record) -> Vec<(Option<String>, Option<&str>)> {
    let hop = |prefix: &str| {
        let address = field(record, &format!("{}.address", prefix)).map(str::to_string);
        let interface = field(record, &format!("{}.nhop-intf", prefix));
        (address.is_some() || interface.is_some()).then_some((address, interface))
    };

    if let Some(single) = hop("next-hop") {
        return vec![single];
    }
    (0..)
        .map(|idx| hop(&format!("next-hop.{}", idx)))
        .take_while(Option::is_some)
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const ROUTES: &str = r#"{
      "vrf-name": "default",
      "routes": [
        {"destination-prefix": "0.0.0.0/0", "source-protocol": "static", "is-active": true,
         "distance": 1, "metric": 0,
         "next-hop": [{"address": "10.0.0.1", "nhop-intf": "Eth 1/1/1"},
                      {"address": "10.0.0.5", "nhop-intf": "Eth 1/1/2"}]},
        {"destination-prefix": "10.1.1.0/31", "source-protocol": "connected", "is-active": true,
         "next-hop": {"nhop-intf": "ethernet1/1/1"}},
        {"destination-prefix": "192.168.0.0/16", "source-protocol": "bgp", "is-active": false,
         "distance": 20, "metric": 100, "uptime": "01:02:03",
         "next-hop": [{"address": "10.0.0.9"}]},
        {"destination-prefix": "172.16.0.0/40", "source-protocol": "bgp"},
        {"source-protocol": "bgp"},
        {"destination-prefix": "2001:db8::/32", "source-protocol": "ospf", "metric": "high"}
      ]
    }"#;

    fn parsed() -> Parsed {
        let spec = CommandCategory::Routes.spec();
        parser::parse(spec.command, ROUTES, &spec.layout).unwrap()
    }

    #[test]
    fn test_route_filter() {
        assert_eq!(route_filter(Some("10.0.0.0/8"), Some(RouteProtocol::Bgp)), " 10.0.0.0/8");
        assert_eq!(route_filter(None, Some(RouteProtocol::Static)), " static");
        assert_eq!(route_filter(Some("  "), Some(RouteProtocol::Connected)), " connected");
        assert_eq!(route_filter(None, Some(RouteProtocol::Isis)), "");
        assert_eq!(route_filter(None, None), "");
    }

    #[test]
    fn test_routes_per_next_hop() {
        let snapshot = routes(&parsed(), None);
        assert_eq!(snapshot.len(), 3);

        let default = &snapshot["0.0.0.0/0"];
        assert_eq!(default.len(), 2);
        assert_eq!(default[0].next_hop.as_deref(), Some("10.0.0.1"));
        assert_eq!(default[1].outgoing_interface.as_deref(), Some("ethernet1/1/2"));
        assert_eq!(default[0].protocol, RouteProtocol::Static);
        assert_eq!(default[0].preference, 1);
        assert!(default[0].current_active);
        assert_eq!(default[0].routing_table, "default");

        let connected = &snapshot["10.1.1.0/31"];
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].next_hop, None);
        assert_eq!(connected[0].outgoing_interface.as_deref(), Some("ethernet1/1/1"));

        let bgp = &snapshot["192.168.0.0/16"][0];
        assert_eq!(bgp.age, Some(3_723));
        assert_eq!(bgp.metric, 100);
        assert!(!bgp.current_active);
    }

    #[test]
    fn test_bad_records_are_dropped() {
        let snapshot = routes(&parsed(), None);
        let reasons: Vec<_> = snapshot.diagnostics.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::OutOfRange,
                DropReason::MissingField,
                DropReason::InvalidValue
            ]
        );
    }

    #[test]
    fn test_protocol_filter() {
        let snapshot = routes(&parsed(), Some(RouteProtocol::Bgp));
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["192.168.0.0/16"]);
    }
}
