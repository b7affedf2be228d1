//! SNMP settings, ping results, image status and the MAC address table.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Drops, field, units};
use crate::model::{
    ImageOperation, ImageStatus, ImageTaskStatus, MacEntry, PingOutcome, PingProbe, PingStats,
    SnmpCommunity, SnmpInformation,
};
use crate::parser::{Parsed, Record};
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

/// Placeholder for SNMP values the configuration does not set.
pub const NOT_SET: &str = "N/A";

static PING_COUNTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d+)\s+packets transmitted\S+\s+(\d+)\s+received\S+\s+\S+\s+packet loss, time\s+(\S+)",
    )
    .expect("Invalid regex pattern")
});

static PING_RTT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rtt\s+min/avg/max/mdev\s+=\s+(\S+)/(\S+)/(\S+)/(\S+)\s\w+")
        .expect("Invalid regex pattern")
});

/// SNMP settings from `show running-configuration snmp`.
///
/// ```text
/// snmp-server community public ro acl-snmp
/// snmp-server contact "NOC team"
/// snmp-server location DC1 row 4
/// ```
pub fn snmp_information(text: &str) -> Snapshot<SnmpInformation> {
    let command = CommandCategory::SnmpConfig.spec().command;
    let mut drops = Drops::default();
    let mut info = SnmpInformation {
        chassis_id: NOT_SET.to_string(),
        contact: NOT_SET.to_string(),
        location: NOT_SET.to_string(),
        community: Default::default(),
    };

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.first() != Some(&"snmp-server") {
            continue;
        }
        let rest = || unquote(&fields[2.min(fields.len())..].join(" "));
        match fields.get(1).copied() {
            Some("community") => {
                let Some(name) = fields.get(2) else {
                    drops.value(DropReason::MissingField, command, "community name", line);
                    continue;
                };
                info.community.insert(
                    name.to_string(),
                    SnmpCommunity {
                        mode: fields
                            .get(3)
                            .map(|m| m.to_lowercase())
                            .unwrap_or_else(|| NOT_SET.to_string()),
                        acl: fields.get(4).unwrap_or(&NOT_SET).to_string(),
                    },
                );
            }
            Some("contact") => info.contact = rest(),
            Some("location") => info.location = rest(),
            Some("chassis-id") => info.chassis_id = rest(),
            _ => {}
        }
    }

    drops.finish(info)
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

/// Interpret the output of a `ping` command.
///
/// Device errors and runs with no reply at all are [`PingOutcome::Error`];
/// the device prints no per-probe times, so each reply is reported with an
/// rtt of zero.
pub fn ping_outcome(command: &str, destination: &str, text: &str) -> PingOutcome {
    if text.contains("% Error") {
        return PingOutcome::Error(format!("command :: {} :: {}", command, text.trim()));
    }

    let Some(counts) = PING_COUNTS.captures(text) else {
        return PingOutcome::Error(format!("unrecognized ping output: {}", text.trim()));
    };
    let sent: u32 = counts[1].parse().unwrap_or(0);
    let received: u32 = counts[2].parse().unwrap_or(0);
    if received == 0 {
        return PingOutcome::Error(format!(
            "{} packets transmitted, 0 received from {}",
            sent, destination
        ));
    }

    let mut stats = PingStats {
        probes_sent: sent,
        packet_loss: sent.saturating_sub(received),
        rtt_min: 0.0,
        rtt_max: 0.0,
        rtt_avg: 0.0,
        rtt_stddev: 0.0,
        results: Vec::new(),
    };
    if let Some(rtt) = PING_RTT.captures(text) {
        let ms = |idx: usize| rtt[idx].parse::<f64>().unwrap_or(0.0);
        stats.rtt_min = ms(1);
        stats.rtt_avg = ms(2);
        stats.rtt_max = ms(3);
        stats.rtt_stddev = ms(4);
    }
    stats.results = (0..received)
        .map(|_| PingProbe {
            ip_address: destination.to_string(),
            rtt: 0.0,
        })
        .collect();

    PingOutcome::Success(stats)
}

/// Image task state from `show image status | display-json`.
pub fn image_status(parsed: &Parsed) -> Snapshot<ImageStatus> {
    let command = CommandCategory::ImageStatus.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let Some(record) = parsed.first() else {
        return drops.finish(ImageStatus::default());
    };

    let task = |prefix: &str| ImageTaskStatus {
        task_state: text(record, &format!("{}.task-state", prefix)),
        task_status: text(record, &format!("{}.task-state-detail", prefix)),
        progress_percent: None,
    };

    let mut file_transfer_status = task("file-transfer-status");
    if let Some(progress) = field(record, "file-transfer-status.file-progress") {
        match progress.trim_end_matches('%').parse::<u16>() {
            Ok(percent) if percent <= 100 => file_transfer_status.progress_percent = Some(percent as u8),
            Ok(_) => drops.value(DropReason::OutOfRange, command, "file-progress", progress),
            Err(_) => drops.value(DropReason::InvalidValue, command, "file-progress", progress),
        }
    }

    drops.finish(ImageStatus {
        file_transfer_status,
        image_install_status: task("software-install-status"),
    })
}

fn text(record: &Record, key: &str) -> String {
    field(record, key).unwrap_or_default().to_string()
}

/// `Started` once either task reports it is in progress.
pub fn image_operation(status: &ImageStatus) -> ImageOperation {
    let running = |task: &ImageTaskStatus| task.task_state.to_lowercase().contains("in progress");
    if running(&status.file_transfer_status) || running(&status.image_install_status) {
        ImageOperation::Started
    } else {
        ImageOperation::NotStarted
    }
}

/// Entries of `show mac address-table`.
pub fn mac_address_table(parsed: &Parsed) -> Snapshot<Vec<MacEntry>> {
    let command = CommandCategory::MacAddressTable.spec().command;
    let mut drops = Drops::from_parsed([parsed]);
    let mut entries = Vec::new();

    for record in &parsed.records {
        let Some(raw_mac) = field(record, "Mac Address") else {
            drops.record(DropReason::MissingField, command, "Mac Address", record);
            continue;
        };
        let Some(mac) = units::mac(raw_mac) else {
            drops.record(DropReason::InvalidValue, command, "Mac Address", record);
            continue;
        };
        let Some(raw_vlan) = field(record, "VlanId") else {
            drops.record(DropReason::MissingField, command, "VlanId", record);
            continue;
        };
        let digits = raw_vlan
            .get(..4)
            .filter(|p| p.eq_ignore_ascii_case("vlan"))
            .map_or(raw_vlan, |_| &raw_vlan[4..]);
        let vlan = match digits.trim().parse::<u16>() {
            Ok(vlan) if (1..=4094).contains(&vlan) => vlan,
            Ok(_) => {
                drops.record(DropReason::OutOfRange, command, "VlanId", record);
                continue;
            }
            Err(_) => {
                drops.record(DropReason::InvalidValue, command, "VlanId", record);
                continue;
            }
        };

        entries.push(MacEntry {
            mac,
            interface: field(record, "Interface")
                .map(units::interface_name)
                .unwrap_or_default(),
            vlan,
            is_static: field(record, "Type").is_some_and(|t| t.eq_ignore_ascii_case("static")),
            active: true,
        });
    }

    drops.finish(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn parse(category: CommandCategory, text: &str) -> Parsed {
        let spec = category.spec();
        parser::parse(spec.command, text, &spec.layout).unwrap()
    }

    #[test]
    fn test_snmp_information() {
        let text = "\
snmp-server community public ro acl-snmp
snmp-server community private RW
snmp-server community open
snmp-server community
snmp-server contact \"NOC team\"
snmp-server location DC1 row 4
";
        let snapshot = snmp_information(text);
        assert_eq!(snapshot.contact, "NOC team");
        assert_eq!(snapshot.location, "DC1 row 4");
        assert_eq!(snapshot.chassis_id, NOT_SET);

        let public = &snapshot.community["public"];
        assert_eq!(public.mode, "ro");
        assert_eq!(public.acl, "acl-snmp");
        assert_eq!(snapshot.community["private"].mode, "rw");
        assert_eq!(snapshot.community["private"].acl, NOT_SET);
        assert_eq!(snapshot.community["open"].mode, NOT_SET);
        assert_eq!(snapshot.diagnostics.len(), 1);
    }

    #[test]
    fn test_ping_success() {
        let text = "\
PING 10.0.0.1 (10.0.0.1) 100(128) bytes of data.
108 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.512 ms
108 bytes from 10.0.0.1: icmp_seq=2 ttl=64 time=0.498 ms

--- 10.0.0.1 ping statistics ---
3 packets transmitted, 2 received, 33% packet loss, time 2003ms
rtt min/avg/max/mdev = 0.498/0.505/0.512/0.007 ms
";
        let PingOutcome::Success(stats) = ping_outcome("ping -c 3 10.0.0.1", "10.0.0.1", text)
        else {
            panic!("expected success");
        };
        assert_eq!(stats.probes_sent, 3);
        assert_eq!(stats.packet_loss, 1);
        assert_eq!(stats.rtt_min, 0.498);
        assert_eq!(stats.rtt_max, 0.512);
        assert_eq!(stats.rtt_stddev, 0.007);
        assert_eq!(stats.results.len(), 2);
        assert_eq!(stats.results[0].ip_address, "10.0.0.1");
    }

    #[test]
    fn test_ping_errors() {
        let lost = "5 packets transmitted, 0 received, 100% packet loss, time 4079ms\n";
        assert!(!ping_outcome("ping 10.9.9.9", "10.9.9.9", lost).is_success());

        let rejected = "% Error: Network is unreachable\n";
        assert_eq!(
            ping_outcome("ping 10.9.9.9", "10.9.9.9", rejected),
            PingOutcome::Error(
                "command :: ping 10.9.9.9 :: % Error: Network is unreachable".to_string()
            )
        );
    }

    #[test]
    fn test_image_status() {
        let text = r#"{"system-sw-state": {"software-upgrade-status": {
            "file-transfer-status": {"task-state": "In progress", "file-progress": 42,
                                     "task-state-detail": "Downloading"},
            "software-install-status": {"task-state": "idle", "task-state-detail": "Completed: No error"}
        }}}"#;
        let snapshot = image_status(&parse(CommandCategory::ImageStatus, text));
        assert_eq!(snapshot.file_transfer_status.task_state, "In progress");
        assert_eq!(snapshot.file_transfer_status.progress_percent, Some(42));
        assert_eq!(snapshot.image_install_status.task_status, "Completed: No error");
        assert_eq!(snapshot.image_install_status.progress_percent, None);
        assert_eq!(image_operation(&snapshot), ImageOperation::Started);
        assert_eq!(image_operation(&ImageStatus::default()), ImageOperation::NotStarted);
    }

    #[test]
    fn test_mac_address_table() {
        let text = "\
VlanId        Mac Address             Type          Interface
1             00:0c:29:aa:bb:cc       dynamic       ethernet1/1/1
vlan100       0011.2233.4455          static        port-channel10
5000          00:0c:29:aa:bb:dd       dynamic       ethernet1/1/2
1             not-a-mac               dynamic       ethernet1/1/3
";
        let snapshot = mac_address_table(&parse(CommandCategory::MacAddressTable, text));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].vlan, 1);
        assert!(!snapshot[0].is_static);
        assert_eq!(snapshot[1].mac, "00:11:22:33:44:55");
        assert_eq!(snapshot[1].vlan, 100);
        assert_eq!(snapshot[1].interface, "port-channel10");
        assert!(snapshot[1].is_static && snapshot[1].active);

        let reasons: Vec<_> = snapshot.diagnostics.iter().map(|d| d.reason).collect();
        assert_eq!(reasons, vec![DropReason::OutOfRange, DropReason::InvalidValue]);
    }
}
