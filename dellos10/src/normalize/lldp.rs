//! LLDP neighbors from `show lldp neighbors` and its detail views.

use indexmap::IndexMap;

use super::{Drops, field, units};
use crate::model::{LldpCapability, LldpNeighbor, LldpNeighborDetail};
use crate::parser::Parsed;
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

/// Neighbors per local interface.
pub fn lldp_neighbors(parsed: &Parsed) -> Snapshot<IndexMap<String, Vec<LldpNeighbor>>> {
    let command = CommandCategory::LldpNeighbors.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let mut result: IndexMap<String, Vec<LldpNeighbor>> = IndexMap::new();

    for record in &parsed.records {
        let Some(local) = field(record, "Loc PortID") else {
            drops.record(DropReason::MissingField, command, "Loc PortID", record);
            continue;
        };
        let Some(port) = field(record, "Rem Port Id") else {
            drops.record(DropReason::MissingField, command, "Rem Port Id", record);
            continue;
        };
        let chassis = field(record, "Rem Chassis Id").unwrap_or_default();
        result
            .entry(units::interface_name(local))
            .or_default()
            .push(LldpNeighbor {
                hostname: field(record, "Rem Host Name").unwrap_or_default().to_string(),
                port: port.to_string(),
                remote_chassis_id: units::mac(chassis).unwrap_or_else(|| chassis.to_string()),
            });
    }
    drops.finish(result)
}

/// Detailed neighbors per local interface.
///
/// With `interface` set, only neighbors seen on that interface are kept.
pub fn lldp_neighbors_detail(
    parsed: &Parsed,
    interface: Option<&str>,
) -> Snapshot<IndexMap<String, Vec<LldpNeighborDetail>>> {
    let category = match interface {
        Some(_) => CommandCategory::LldpInterfaceDetail,
        None => CommandCategory::LldpNeighborsDetail,
    };
    let command = category.spec().command;
    let wanted = interface.map(units::interface_name);
    let mut drops = Drops::from_parsed([parsed]);
    let mut result: IndexMap<String, Vec<LldpNeighborDetail>> = IndexMap::new();

    for record in &parsed.records {
        let Some(local) = field(record, "Local Port ID").map(units::interface_name) else {
            drops.record(DropReason::MissingField, command, "Local Port ID", record);
            continue;
        };
        if wanted.as_ref().is_some_and(|w| *w != local) {
            continue;
        }
        let Some(remote_port) = field(record, "Remote Port ID") else {
            drops.record(DropReason::MissingField, command, "Remote Port ID", record);
            continue;
        };

        let chassis = field(record, "Remote Chassis ID").unwrap_or_default();
        let capabilities = |key: &str| {
            field(record, key)
                .map(LldpCapability::parse_list)
                .unwrap_or_default()
        };

        result.entry(local).or_default().push(LldpNeighborDetail {
            parent_interface: String::new(),
            remote_port: remote_port.to_string(),
            remote_port_description: field(record, "Remote Port Description")
                .unwrap_or_default()
                .to_string(),
            remote_chassis_id: units::mac(chassis).unwrap_or_else(|| chassis.to_string()),
            remote_system_name: field(record, "Remote System Name")
                .unwrap_or_default()
                .to_string(),
            remote_system_description: field(record, "Remote System Desc")
                .unwrap_or_default()
                .to_string(),
            remote_system_capab: capabilities("Existing System Capabilities"),
            remote_system_enable_capab: capabilities("Enabled System Capabilities"),
        });
    }
    drops.finish(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const NEIGHBORS: &str = "\
Loc PortID          Rem Host Name        Rem Port Id                    Rem Chassis Id
--------------------------------------------------------------------------------------
ethernet1/1/1       spine1               ethernet1/1/5                  14:18:77:09:ae:00
ethernet1/1/1       spine2               ethernet1/1/6                  14:18:77:09:af:00
mgmt1/1/1           oob-switch           Gi1/0/12                       00:1b:2b:aa:bb:cc
ethernet1/1/9
";

    const DETAIL: &str = "\
Remote Chassis ID Subtype: Mac address (4)
Remote Chassis ID: 1418.7709.ae00
Remote Port Subtype: Interface name (5)
Remote Port ID: ethernet1/1/5
Remote Port Description: to-leaf1
Local Port ID: ethernet1/1/1
Locally assigned remote Neighbor Index: 1
Remote TTL: 120
Remote System Name: spine1
Remote System Desc: Dell EMC Networking OS10 Enterprise
Existing System Capabilities: Router Bridge Repeater
Enabled System Capabilities: Router Bridge
---------------------------------------------------------------------------
Remote Chassis ID: oob-chassis
Remote Port ID: Gi1/0/12
Local Port ID: mgmt1/1/1
Remote System Name: oob-switch
---------------------------------------------------------------------------
Remote Chassis ID: 14:18:77:09:af:00
Local Port ID: ethernet1/1/2
---------------------------------------------------------------------------
";

    fn parse(category: CommandCategory, text: &str) -> Parsed {
        let spec = category.spec();
        parser::parse(spec.command, text, &spec.layout).unwrap()
    }

    #[test]
    fn test_neighbors_table() {
        let snapshot = lldp_neighbors(&parse(CommandCategory::LldpNeighbors, NEIGHBORS));
        assert_eq!(snapshot["ethernet1/1/1"].len(), 2);
        assert_eq!(snapshot["ethernet1/1/1"][1].hostname, "spine2");
        assert_eq!(snapshot["mgmt1/1/1"][0].port, "Gi1/0/12");
        assert_eq!(snapshot["ethernet1/1/1"][0].remote_chassis_id, "14:18:77:09:ae:00");
        assert_eq!(snapshot["mgmt1/1/1"][0].remote_chassis_id, "00:1b:2b:aa:bb:cc");
        assert_eq!(snapshot.diagnostics.len(), 1);
        assert_eq!(snapshot.diagnostics[0].reason, DropReason::MisalignedRow);
    }

    #[test]
    fn test_neighbors_detail() {
        let snapshot = lldp_neighbors_detail(&parse(CommandCategory::LldpNeighborsDetail, DETAIL), None);
        let spine = &snapshot["ethernet1/1/1"][0];
        assert_eq!(spine.remote_chassis_id, "14:18:77:09:ae:00");
        assert_eq!(spine.remote_port, "ethernet1/1/5");
        assert_eq!(spine.remote_port_description, "to-leaf1");
        assert_eq!(spine.remote_system_name, "spine1");
        assert_eq!(
            spine.remote_system_capab,
            vec![
                LldpCapability::Router,
                LldpCapability::Bridge,
                LldpCapability::Repeater
            ]
        );
        assert_eq!(spine.remote_system_enable_capab.len(), 2);

        assert_eq!(snapshot["mgmt1/1/1"][0].remote_chassis_id, "oob-chassis");
        assert!(!snapshot.contains_key("ethernet1/1/2"));
        assert_eq!(snapshot.diagnostics[0].reason, DropReason::MissingField);
    }

    #[test]
    fn test_interface_filter() {
        let parsed = parse(CommandCategory::LldpInterfaceDetail, DETAIL);
        let snapshot = lldp_neighbors_detail(&parsed, Some("Mgmt 1/1/1"));
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["mgmt1/1/1"]);
        assert!(snapshot.is_complete());
    }
}
