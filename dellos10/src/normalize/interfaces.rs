//! Interface entities from `show interface status` and `show interface`.
//!
//! The status table is authoritative for which interfaces exist. Detail
//! blocks enrich those entries; a detail block for a name the table does not
//! list is dropped as [`DropReason::UnknownEntity`].

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;

use super::{Drops, field, insert_unique, merge, merge_fields, units, values};
use crate::error::NormalizeError;
use crate::model::{Interface, InterfaceCounters, InterfaceIp};
use crate::parser::{Parsed, Record};
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

const ENTITY: &str = "interface";

/// Operational or administrative link state as printed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
    AdminDown,
    Unknown,
}

impl LinkState {
    pub fn from_device(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" | "lower-layer-down" | "not-present" => Self::Down,
            "admin down" | "admin-down" | "administratively down" | "disabled" => Self::AdminDown,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::AdminDown => "admin down",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

fn status_command() -> &'static str {
    CommandCategory::InterfaceStatus.spec().command
}

fn detail_command() -> &'static str {
    CommandCategory::InterfaceDetail.spec().command
}

/// Rows of the status table keyed by canonical name.
fn listing<'a>(
    status: &'a Parsed,
    drops: &mut Drops,
) -> Result<IndexMap<String, &'a Record>, NormalizeError> {
    let mut rows: IndexMap<String, &Record> = IndexMap::new();
    for record in &status.records {
        let Some(port) = field(record, "Port") else {
            drops.record(DropReason::MissingField, status_command(), "Port", record);
            continue;
        };
        let name = units::interface_name(port);
        if let Some(previous) = rows.get(&name) {
            let mut state = field(previous, "Status").map(LinkState::from_device);
            if let Some(current) = field(record, "Status").map(LinkState::from_device) {
                merge(ENTITY, &name, "status", &mut state, current)?;
            }
            continue;
        }
        rows.insert(name, record);
    }
    Ok(rows)
}

/// Detail blocks keyed by canonical name. Blocks for names missing from
/// `known` are dropped; repeated blocks for one name are merged.
fn details(
    detail: &Parsed,
    known: &IndexMap<String, &Record>,
    drops: &mut Drops,
) -> Result<IndexMap<String, Record>, NormalizeError> {
    let mut by_name: IndexMap<String, Record> = IndexMap::new();
    for record in &detail.records {
        let Some(raw) = field(record, "name") else {
            drops.record(DropReason::MissingField, detail_command(), "name", record);
            continue;
        };
        let name = units::interface_name(raw);
        if !known.contains_key(&name) {
            drops.record(
                DropReason::UnknownEntity,
                detail_command(),
                format!("{} is not in the interface status table", name),
                record,
            );
            continue;
        }
        match by_name.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
            Entry::Occupied(mut slot) => {
                let key = slot.key().clone();
                let fields = record.iter().filter(|(k, _)| k.as_str() != "name");
                merge_fields(ENTITY, &key, slot.get_mut(), fields)?;
            }
        }
    }
    Ok(by_name)
}

/// Canonical names of every interface, in device order.
///
/// `get_facts` and `get_interfaces` both derive their interface set from
/// this listing.
pub fn interface_names(status: &Parsed) -> Result<Snapshot<Vec<String>>, NormalizeError> {
    let mut drops = Drops::from_parsed([status]);
    let rows = listing(status, &mut drops)?;
    Ok(drops.finish(rows.into_keys().collect()))
}

/// Merge the status table and detail blocks into interfaces.
///
/// `clock` is the device's current time; without it `last_flapped` stays
/// unset.
pub fn interfaces(
    status: &Parsed,
    detail: &Parsed,
    clock: Option<DateTime<Utc>>,
) -> Result<Snapshot<IndexMap<String, Interface>>, NormalizeError> {
    let mut drops = Drops::from_parsed([status, detail]);
    let rows = listing(status, &mut drops)?;
    let details = details(detail, &rows, &mut drops)?;

    let mut interfaces = IndexMap::with_capacity(rows.len());
    for (name, row) in &rows {
        let detail = details.get(name);
        let interface = build(name, row, detail, clock, &mut drops)?;
        interfaces.insert(name.clone(), interface);
    }
    Ok(drops.finish(interfaces))
}

fn build(
    name: &str,
    row: &Record,
    detail: Option<&Record>,
    clock: Option<DateTime<Utc>>,
    drops: &mut Drops,
) -> Result<Interface, NormalizeError> {
    let table_state = field(row, "Status").map(LinkState::from_device);
    let admin = detail
        .and_then(|d| field(d, "admin_status"))
        .map(LinkState::from_device);

    let is_enabled = match (admin, table_state) {
        (Some(state), _) => state == LinkState::Up,
        (None, Some(LinkState::AdminDown)) => false,
        _ => true,
    };

    let mut oper = table_state.filter(|s| *s != LinkState::Unknown);
    if let Some(line_protocol) = detail.and_then(|d| field(d, "oper_status")) {
        let state = LinkState::from_device(line_protocol);
        // The table folds admin down into one column; line protocol never does.
        if oper == Some(LinkState::AdminDown) {
            oper = Some(LinkState::Down);
        }
        if state != LinkState::Unknown {
            merge(ENTITY, name, "oper_status", &mut oper, state)?;
        }
    }
    let is_up = oper == Some(LinkState::Up);

    if is_up && !is_enabled {
        return Err(NormalizeError::InconsistentRecord {
            entity: ENTITY.to_string(),
            key: name.to_string(),
            field: "is_up".to_string(),
            first: LinkState::Up.to_string(),
            second: admin.unwrap_or(LinkState::AdminDown).to_string(),
        });
    }

    let description = detail
        .and_then(|d| field(d, "description"))
        .or_else(|| field(row, "Description"))
        .unwrap_or_default()
        .to_string();

    let speed = detail
        .and_then(|d| field(d, "speed"))
        .or_else(|| field(row, "Speed"))
        .and_then(units::speed_bps)
        .unwrap_or(0);

    let mtu = detail
        .and_then(|d| field(d, "mtu"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mac_address = match detail.and_then(|d| field(d, "mac_address")) {
        Some(raw) => {
            let mac = units::mac(raw);
            if mac.is_none() {
                drops.value(
                    DropReason::InvalidValue,
                    detail_command(),
                    format!("{} mac_address", name),
                    raw,
                );
            }
            mac
        }
        None => None,
    };

    let last_flapped = match (detail.and_then(|d| field(d, "last_change")), clock) {
        (Some(raw), Some(now)) => {
            let at = units::duration_secs(raw).and_then(|secs| units::since(now, secs));
            if at.is_none() {
                drops.value(
                    DropReason::InvalidValue,
                    detail_command(),
                    format!("{} last_change", name),
                    raw,
                );
            }
            at
        }
        _ => None,
    };

    Ok(Interface {
        name: name.to_string(),
        description,
        is_enabled,
        is_up,
        speed,
        mtu,
        mac_address,
        last_flapped,
    })
}

/// Addresses per interface. Interfaces without any address are omitted.
pub fn interfaces_ip(detail: &Parsed) -> Snapshot<IndexMap<String, InterfaceIp>> {
    let mut drops = Drops::from_parsed([detail]);
    let mut result: IndexMap<String, InterfaceIp> = IndexMap::new();

    for record in &detail.records {
        let Some(raw) = field(record, "name") else {
            drops.record(DropReason::MissingField, detail_command(), "name", record);
            continue;
        };
        let name = units::interface_name(raw);
        let mut ip = InterfaceIp::default();

        for value in values(record, "ipv4") {
            match prefixed::<Ipv4Addr>(value, 32) {
                Ok((addr, len)) => {
                    ip.ipv4.insert(addr, len);
                }
                Err(reason) => drops.value(reason, detail_command(), format!("{} ipv4", name), value),
            }
        }
        for value in values(record, "ipv6").chain(values(record, "ipv6_link_local")) {
            match prefixed::<Ipv6Addr>(value, 128) {
                Ok((addr, len)) => {
                    ip.ipv6.insert(addr, len);
                }
                Err(reason) => drops.value(reason, detail_command(), format!("{} ipv6", name), value),
            }
        }

        if !ip.is_empty() {
            let entry = result.entry(name).or_default();
            entry.ipv4.extend(ip.ipv4);
            entry.ipv6.extend(ip.ipv6);
        }
    }
    drops.finish(result)
}

/// Split `address/length`, checking the length against `max`.
fn prefixed<A: FromStr>(value: &str, max: u8) -> Result<(A, u8), DropReason> {
    let (addr, len) = value.split_once('/').ok_or(DropReason::MissingField)?;
    let addr = addr.parse::<A>().map_err(|_| DropReason::InvalidValue)?;
    let len: u16 = len.trim().parse().map_err(|_| DropReason::InvalidValue)?;
    if len > u16::from(max) {
        return Err(DropReason::OutOfRange);
    }
    Ok((addr, len as u8))
}

/// Traffic counters per interface.
///
/// Counters an interface does not report are zero. A counter that is present
/// but unreadable drops that interface's counters.
pub fn interfaces_counters(
    detail: &Parsed,
) -> Result<Snapshot<IndexMap<String, InterfaceCounters>>, NormalizeError> {
    let mut drops = Drops::from_parsed([detail]);
    let mut result = IndexMap::new();

    for record in &detail.records {
        let Some(raw) = field(record, "name") else {
            drops.record(DropReason::MissingField, detail_command(), "name", record);
            continue;
        };
        let name = units::interface_name(raw);
        match counters(record) {
            Ok(counters) => insert_unique(ENTITY, "counters", &mut result, name, counters)?,
            Err(key) => drops.record(
                DropReason::InvalidValue,
                detail_command(),
                format!("{} {}", name, key),
                record,
            ),
        }
    }
    Ok(drops.finish(result))
}

fn counters(record: &Record) -> Result<InterfaceCounters, String> {
    let get = |key: &str| -> Result<u64, String> {
        match field(record, key) {
            Some(value) => units::count(value).ok_or_else(|| key.to_string()),
            None => Ok(0),
        }
    };
    let sum = |keys: &[&str]| -> Result<u64, String> {
        keys.iter().map(|k| get(k)).sum()
    };

    Ok(InterfaceCounters {
        rx_octets: get("input.octets")?,
        tx_octets: get("output.octets")?,
        rx_unicast_packets: get("input.unicasts")?,
        tx_unicast_packets: get("output.unicasts")?,
        rx_multicast_packets: get("input.multicasts")?,
        tx_multicast_packets: get("output.multicasts")?,
        rx_broadcast_packets: get("input.broadcasts")?,
        tx_broadcast_packets: get("output.broadcasts")?,
        rx_errors: sum(&["input.runts", "input.giants", "input.crc", "input.overrun"])?,
        tx_errors: get("output.collisions")?,
        rx_discards: get("input.discarded")?,
        tx_discards: get("output.discarded")?,
    })
}
