//! BGP neighbors from `show ip bgp neighbors | display-json` and BGP
//! configuration from `show running-configuration bgp`.
//!
//! Bulk output can describe one peer across several documents. Records are
//! merged per (VRF, peer address) before any entity is built, and a field
//! reported twice with different values fails the whole call.

use indexmap::IndexMap;

use super::{Drops, field, merge, units};
use crate::config::{ConfigNode, ConfigTree};
use crate::error::NormalizeError;
use crate::model::{
    AddressFamilyCounts, BgpConfig, BgpNeighbor, BgpNeighborDetail, BgpPeerConfig, BgpPeerGroup,
    BgpState, BgpVrf,
};
use crate::parser::{Parsed, Record};
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

const ENTITY: &str = "bgp peer";
const DEFAULT_VRF: &str = "default";
/// Group holding neighbors that inherit no template.
pub const UNGROUPED: &str = "_";

/// One peer with all of its records merged.
#[derive(Debug, Default)]
struct Peer {
    vrf: String,
    address: String,
    fields: IndexMap<String, String>,
    families: IndexMap<String, IndexMap<String, String>>,
}

impl Peer {
    fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn number<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, String> {
        match self.get(key) {
            Some(value) => value.parse().map(Some).map_err(|_| key.to_string()),
            None => Ok(None),
        }
    }

    fn key(&self) -> String {
        format!("{}/{}", self.vrf, self.address)
    }
}

fn merge_field(
    key: &str,
    slot: &mut IndexMap<String, String>,
    name: &str,
    value: &str,
) -> Result<(), NormalizeError> {
    let mut existing = slot.get(name).cloned();
    merge(ENTITY, key, name, &mut existing, value.to_string())?;
    if let Some(value) = existing {
        slot.insert(name.to_string(), value);
    }
    Ok(())
}

/// Group records by (VRF, peer address) and merge them.
fn aggregate(
    parsed: &Parsed,
    command: &str,
    drops: &mut Drops,
) -> Result<Vec<Peer>, NormalizeError> {
    let mut peers: IndexMap<(String, String), Peer> = IndexMap::new();

    for record in &parsed.records {
        let Some(address) = field(record, "remote-address") else {
            drops.record(DropReason::MissingField, command, "remote-address", record);
            continue;
        };
        let vrf = field(record, "vrf.vrf-name").unwrap_or(DEFAULT_VRF);
        let peer = peers
            .entry((vrf.to_string(), address.to_string()))
            .or_insert_with(|| Peer {
                vrf: vrf.to_string(),
                address: address.to_string(),
                ..Peer::default()
            });
        let key = peer.key();

        let mut family_fields: IndexMap<&str, IndexMap<&str, &str>> = IndexMap::new();
        for (name, value) in record {
            if let Some(rest) = name.strip_prefix("af.") {
                if let Some((index, af_field)) = rest.split_once('.') {
                    family_fields
                        .entry(index)
                        .or_default()
                        .insert(af_field, value.as_str());
                }
                continue;
            }
            if name.starts_with("vrf.") || name.starts_with("bgp-oper.") {
                continue;
            }
            merge_field(&key, &mut peer.fields, name, value)?;
        }
        for summary in ["router-id", "local-as"] {
            if let Some(value) = field(record, &format!("vrf.summary-info.{}", summary)) {
                let name = format!("summary.{}", summary);
                merge_field(&key, &mut peer.fields, &name, value)?;
            }
        }

        for (_, af) in family_fields {
            let Some(afi) = af.get("afi").map(|a| a.trim().to_ascii_lowercase()) else {
                drops.record(DropReason::MissingField, command, format!("{} af.afi", key), record);
                continue;
            };
            let family_key = format!("{} {}", key, afi);
            let slot = peer.families.entry(afi).or_default();
            for (name, value) in af {
                if name != "afi" {
                    merge_field(&family_key, slot, name, value)?;
                }
            }
        }
    }

    Ok(peers.into_values().collect())
}

fn family_counts(fields: &IndexMap<String, String>) -> Result<AddressFamilyCounts, String> {
    let get = |key: &str| -> Result<u64, String> {
        match fields.get(key) {
            Some(value) => units::count(value).ok_or_else(|| format!("af {}", key)),
            None => Ok(0),
        }
    };
    Ok(AddressFamilyCounts {
        received_prefixes: get("rcvd-prefixes")?,
        accepted_prefixes: get("accepted-prefixes")?,
        sent_prefixes: get("sent-prefixes")?,
    })
}

fn summary(peer: &Peer) -> Result<(BgpNeighbor, String), String> {
    let remote_as = peer
        .number::<u32>("remote-as")?
        .ok_or_else(|| "remote-as".to_string())?;
    let local_as = match peer.number::<u32>("local-as")? {
        Some(asn) => asn,
        None => peer.number::<u32>("summary.local-as")?.unwrap_or(0),
    };
    let state = peer
        .get("bgp-state")
        .map(BgpState::from_device)
        .unwrap_or(BgpState::Unknown);
    let uptime = match peer.get("up-time") {
        Some(raw) => units::duration_secs(raw).ok_or_else(|| "up-time".to_string())?,
        None => 0,
    };

    let mut address_family = IndexMap::new();
    for (afi, fields) in &peer.families {
        address_family.insert(afi.clone(), family_counts(fields)?);
    }

    let neighbor = BgpNeighbor {
        remote_address: peer.address.clone(),
        local_as,
        remote_as,
        remote_id: peer.get("remote-router-id").unwrap_or_default().to_string(),
        description: peer.get("description").unwrap_or_default().to_string(),
        is_enabled: peer.get("admin-down-state") != Some("true"),
        is_up: state.is_up(),
        state,
        uptime,
        address_family,
    };
    let router_id = peer.get("summary.router-id").unwrap_or_default().to_string();
    Ok((neighbor, router_id))
}

/// Peers per VRF.
pub fn bgp_neighbors(parsed: &Parsed) -> Result<Snapshot<IndexMap<String, BgpVrf>>, NormalizeError> {
    let command = CommandCategory::BgpNeighbors.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let peers = aggregate(parsed, command, &mut drops)?;

    let mut vrfs: IndexMap<String, BgpVrf> = IndexMap::new();
    for peer in peers {
        let (neighbor, router_id) = match summary(&peer) {
            Ok(built) => built,
            Err(key) => {
                drop_peer(&mut drops, command, &peer, &key);
                continue;
            }
        };
        let vrf = vrfs.entry(peer.vrf.clone()).or_insert_with(|| BgpVrf {
            router_id: String::new(),
            peers: IndexMap::new(),
        });
        if vrf.router_id.is_empty() {
            vrf.router_id = router_id;
        }
        vrf.peers.insert(peer.address.clone(), neighbor);
    }
    Ok(drops.finish(vrfs))
}

fn detail(peer: &Peer) -> Result<BgpNeighborDetail, String> {
    let (neighbor, router_id) = summary(peer)?;
    let count = |key: &str| -> Result<u64, String> { Ok(peer.number::<u64>(key)?.unwrap_or(0)) };
    let timer = |key: &str| -> Result<u32, String> { Ok(peer.number::<u32>(key)?.unwrap_or(0)) };
    let port = |key: &str| -> Result<u16, String> { Ok(peer.number::<u16>(key)?.unwrap_or(0)) };

    let totals = neighbor
        .address_family
        .values()
        .try_fold(AddressFamilyCounts::default(), |acc, af| {
            Some(AddressFamilyCounts {
                received_prefixes: acc.received_prefixes.checked_add(af.received_prefixes)?,
                accepted_prefixes: acc.accepted_prefixes.checked_add(af.accepted_prefixes)?,
                sent_prefixes: acc.sent_prefixes.checked_add(af.sent_prefixes)?,
            })
        })
        .ok_or_else(|| "af prefix totals".to_string())?;

    Ok(BgpNeighborDetail {
        up: neighbor.is_up,
        local_as: neighbor.local_as,
        remote_as: neighbor.remote_as,
        router_id,
        local_address: peer.get("local-address").unwrap_or_default().to_string(),
        local_port: port("local-port")?,
        remote_address: peer.address.clone(),
        remote_port: port("remote-port")?,
        routing_table: peer.vrf.clone(),
        connection_state: neighbor.state,
        input_messages: count("rcvd-msgs")?,
        output_messages: count("sent-msgs")?,
        input_updates: count("rcvd-updates")?,
        output_updates: count("sent-updates")?,
        holdtime: timer("negotiated-hold-time")?,
        configured_holdtime: timer("config-hold-time")?,
        keepalive: timer("negotiated-keepalive")?,
        configured_keepalive: timer("config-keepalive")?,
        active_prefix_count: totals.accepted_prefixes,
        received_prefix_count: totals.received_prefixes,
        accepted_prefix_count: totals.accepted_prefixes,
        advertised_prefix_count: totals.sent_prefixes,
    })
}

/// Detailed peers per VRF, grouped by remote AS.
pub fn bgp_neighbors_detail(
    parsed: &Parsed,
) -> Result<Snapshot<IndexMap<String, IndexMap<u32, Vec<BgpNeighborDetail>>>>, NormalizeError> {
    let command = CommandCategory::BgpNeighbors.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let peers = aggregate(parsed, command, &mut drops)?;

    let mut vrfs: IndexMap<String, IndexMap<u32, Vec<BgpNeighborDetail>>> = IndexMap::new();
    for peer in peers {
        match detail(&peer) {
            Ok(detail) => vrfs
                .entry(peer.vrf.clone())
                .or_default()
                .entry(detail.remote_as)
                .or_default()
                .push(detail),
            Err(key) => drop_peer(&mut drops, command, &peer, &key),
        }
    }
    Ok(drops.finish(vrfs))
}

fn drop_peer(drops: &mut Drops, command: &str, peer: &Peer, key: &str) {
    let reason = if peer.get(key).is_some() || key.starts_with("af ") {
        DropReason::InvalidValue
    } else {
        DropReason::MissingField
    };
    let record: Record = peer.fields.clone();
    drops.record(reason, command, format!("{} {}", peer.key(), key), &record);
}

/// Peer groups and neighbors from the BGP running configuration.
///
/// Only the default VRF is read. `group` and `neighbor` narrow the result
/// when non-empty.
pub fn bgp_config(text: &str, group: &str, neighbor: &str) -> Snapshot<BgpConfig> {
    let command = CommandCategory::BgpConfig.spec().command;
    let mut drops = Drops::default();
    let tree = ConfigTree::parse(text);
    let mut config = BgpConfig::new();

    let Some(router) = tree.sections_starting_with("router bgp ").next() else {
        return drops.finish(config);
    };
    let router_as = router
        .line
        .strip_prefix("router bgp ")
        .and_then(|asn| asn.trim().parse::<u32>().ok())
        .unwrap_or(0);

    let asn = |node: &ConfigNode, keyword: &str, fallback: u32, drops: &mut Drops| -> u32 {
        match node.value_of(keyword) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                drops.value(
                    DropReason::InvalidValue,
                    command,
                    format!("{} {}", node.line, keyword),
                    value,
                );
                fallback
            }),
            None => fallback,
        }
    };

    for template in router.children.iter().filter(|c| c.line.starts_with("template ")) {
        let name = template.line["template ".len()..].trim().to_string();
        let multihop_ttl = template
            .value_of("ebgp-multihop")
            .and_then(|ttl| ttl.parse().ok())
            .unwrap_or(0);
        let peer_group = BgpPeerGroup {
            description: template.value_of("description").unwrap_or_default().to_string(),
            local_as: asn(template, "local-as", router_as, &mut drops),
            remote_as: asn(template, "remote-as", 0, &mut drops),
            multihop_ttl,
            remove_private_as: template.has("remove-private-as"),
            neighbors: IndexMap::new(),
        };
        config.insert(name, peer_group);
    }

    for node in router.children.iter().filter(|c| c.line.starts_with("neighbor ")) {
        let address = node.line["neighbor ".len()..].trim().to_string();
        let template = node.value_of("inherit template").unwrap_or(UNGROUPED);
        let group_entry = config.entry(template.to_string()).or_insert_with(|| BgpPeerGroup {
            local_as: router_as,
            ..BgpPeerGroup::default()
        });
        let (group_local, group_remote) = (group_entry.local_as, group_entry.remote_as);

        let peer = BgpPeerConfig {
            description: node.value_of("description").unwrap_or_default().to_string(),
            local_as: asn(node, "local-as", group_local, &mut drops),
            remote_as: asn(node, "remote-as", group_remote, &mut drops),
            local_address: node.value_of("update-source").unwrap_or_default().to_string(),
            route_reflector_client: has_nested(node, "route-reflector-client"),
            is_shutdown: node.has("shutdown"),
        };
        if let Some(group) = config.get_mut(template) {
            group.neighbors.insert(address, peer);
        }
    }

    if !group.is_empty() {
        config.retain(|name, _| name == group);
    }
    if !neighbor.is_empty() {
        for peer_group in config.values_mut() {
            peer_group.neighbors.retain(|address, _| address == neighbor);
        }
        config.retain(|_, g| !g.neighbors.is_empty());
    }
    drops.finish(config)
}

fn has_nested(node: &ConfigNode, line: &str) -> bool {
    node.has(line) || node.children.iter().any(|c| has_nested(c, line))
}
