//! Device facts from `show version`, `show inventory` and the running
//! configuration.

use super::{Drops, field, units};
use crate::config::ConfigTree;
use crate::model::Facts;
use crate::parser::Parsed;
use crate::platform::{CommandCategory, PlatformDefinition};
use crate::snapshot::{DropReason, Snapshot};

const UNKNOWN: &str = "N/A";

/// Assemble [`Facts`].
///
/// `interface_list` must come from
/// [`interface_names`](super::interfaces::interface_names) so that it names
/// the same set `get_interfaces` returns.
pub fn facts(
    platform: &PlatformDefinition,
    version: &Parsed,
    inventory: &Parsed,
    running: &ConfigTree,
    interface_list: Snapshot<Vec<String>>,
) -> Snapshot<Facts> {
    let version_cmd = CommandCategory::Version.spec().command;
    let inventory_cmd = CommandCategory::Inventory.spec().command;

    let mut drops = Drops::from_parsed([version, inventory]);
    let interface_list = drops.absorb(interface_list);

    let mut required = |parsed: &Parsed, command: &str, keys: &[&str]| -> String {
        let found = parsed
            .first()
            .and_then(|record| keys.iter().find_map(|key| field(record, key)));
        match found {
            Some(value) => value.to_string(),
            None => {
                drops.value(DropReason::MissingField, command, keys.join(" | "), "");
                UNKNOWN.to_string()
            }
        }
    };

    let os_version = required(version, version_cmd, &["OS Version"]);
    let model = required(version, version_cmd, &["System Type"]);
    let serial_number = required(
        inventory,
        inventory_cmd,
        &["Service Tag", "Product Serial Number"],
    );
    let raw_uptime = version.first().and_then(|r| field(r, "Up Time"));

    let uptime = match raw_uptime.map(|raw| (raw, units::duration_secs(raw))) {
        Some((_, Some(seconds))) => seconds,
        Some((raw, None)) => {
            drops.value(DropReason::InvalidValue, version_cmd, "Up Time", raw);
            0
        }
        None => {
            drops.value(DropReason::MissingField, version_cmd, "Up Time", "");
            0
        }
    };

    let hostname = running
        .value_of("hostname")
        .unwrap_or(platform.default_hostname.as_str())
        .to_string();
    let fqdn = match running.value_of("ip domain-name") {
        Some(domain) => format!("{}.{}", hostname, domain),
        None => hostname.clone(),
    };

    drops.finish(Facts {
        vendor: platform.vendor.clone(),
        model,
        os_version,
        hostname,
        fqdn,
        uptime,
        serial_number,
        interface_list,
    })
}
