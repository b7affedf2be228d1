//! Dell EMC Networking OS10 platform definition and command table.
//!
//! Every piece of device state the driver reads comes from one of a closed
//! set of [`CommandCategory`] values. Each category maps to a static
//! [`CommandSpec`]: the CLI command to run, the layout its output is
//! printed in, and the markers OS10 prints when the feature is simply not
//! configured.
//!
//! # Output examples
//!
//! ```text
//! OS10# show interface status
//! ---------------------------------------------------------------------------------
//! Port            Description     Status   Speed    Duplex   Mode Vlan Tagged-Vlans
//! ---------------------------------------------------------------------------------
//! Eth 1/1/1       to-spine1       up       10G      full     A    1    -
//!
//! OS10# show ip bgp neighbors
//! % Error: BGP is not active
//! ```

use once_cell::sync::Lazy;

use super::PlatformDefinition;
use crate::parser::{BlockDelimiter, BlockLayout, ColumnSplit, JsonLayout, Layout, TableLayout};

/// Printed when no BGP instance is configured.
pub const BGP_NOT_ACTIVE: &str = "BGP is not active";
/// Printed when LLDP is globally disabled.
pub const LLDP_NOT_ACTIVE: &str = "LLDP not active";
/// Printed when LLDP runs but has no neighbors.
pub const NO_LLDP_NEIGHBORS: &str = "No LLDP neighbors found";
/// Image commands reject unknown URL schemes with this banner.
pub const ILLEGAL_PARAMETER: &str = "% Error: Illegal parameter.";
/// Prompt printed by `image upgrade` when the running config is unsaved.
pub const CONFIG_MODIFIED_PROMPT: &str = "System configuration has been modified";
/// Prompt printed by `image upgrade` before rebooting.
pub const PROCEED_TO_REBOOT_PROMPT: &str = "Proceed with upgrade and reboot";
/// URL schemes accepted by `image install` and `image upgrade`.
pub const IMAGE_URL_SCHEMES: &[&str] = &["ftp", "http", "image", "scp", "sftp", "tftp", "usb"];

/// Create the OS10 platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new("dellos10")
        .with_vendor("Dell")
        .with_failure_pattern("% Error")
        .with_failure_pattern("Invalid input detected")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_default_hostname("OS10")
        .with_save_command("write memory")
}

/// Kinds of device output the driver knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Version,
    Inventory,
    InterfaceStatus,
    InterfaceDetail,
    Clock,
    RunningConfig,
    StartupConfig,
    CandidateConfig,
    BgpConfig,
    SnmpConfig,
    BgpNeighbors,
    BgpNeighbor,
    Routes,
    LldpNeighbors,
    LldpNeighborsDetail,
    LldpInterfaceDetail,
    Thermal,
    PowerSupplies,
    Fans,
    Processes,
    MacAddressTable,
    ImageStatus,
    ImageInstall,
    ImageUpgrade,
    Ping,
}

/// How to obtain and read one category of output.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub category: CommandCategory,
    /// Command template; `{}` is replaced by the argument.
    pub command: &'static str,
    pub layout: Layout,
    /// Output containing any of these means "not configured": no records.
    pub absent_markers: &'static [&'static str],
}

impl CommandSpec {
    fn new(category: CommandCategory, command: &'static str, layout: Layout) -> Self {
        Self {
            category,
            command,
            layout,
            absent_markers: &[],
        }
    }

    fn absent_when(mut self, markers: &'static [&'static str]) -> Self {
        self.absent_markers = markers;
        self
    }

    /// The command line for this category.
    pub fn render(&self, argument: &str) -> String {
        self.command.replace("{}", argument)
    }

    /// Whether `output` says the feature is not configured.
    pub fn is_absent(&self, output: &str) -> bool {
        self.absent_markers.iter().any(|marker| output.contains(marker))
    }
}

impl CommandCategory {
    /// Every category, in declaration order.
    pub const ALL: [CommandCategory; 25] = [
        Self::Version,
        Self::Inventory,
        Self::InterfaceStatus,
        Self::InterfaceDetail,
        Self::Clock,
        Self::RunningConfig,
        Self::StartupConfig,
        Self::CandidateConfig,
        Self::BgpConfig,
        Self::SnmpConfig,
        Self::BgpNeighbors,
        Self::BgpNeighbor,
        Self::Routes,
        Self::LldpNeighbors,
        Self::LldpNeighborsDetail,
        Self::LldpInterfaceDetail,
        Self::Thermal,
        Self::PowerSupplies,
        Self::Fans,
        Self::Processes,
        Self::MacAddressTable,
        Self::ImageStatus,
        Self::ImageInstall,
        Self::ImageUpgrade,
        Self::Ping,
    ];

    /// The static spec for this category.
    pub fn spec(self) -> &'static CommandSpec {
        static SPECS: Lazy<Vec<CommandSpec>> =
            Lazy::new(|| CommandCategory::ALL.iter().map(|c| c.build()).collect());
        &SPECS[self as usize]
    }

    fn build(self) -> CommandSpec {
        use CommandCategory::*;

        let lldp: &'static [&'static str] = &[LLDP_NOT_ACTIVE, NO_LLDP_NEIGHBORS];
        match self {
            Version => CommandSpec::new(self, "show version", whole_key_values()),
            Inventory => CommandSpec::new(self, "show inventory", whole_key_values()),
            InterfaceStatus => CommandSpec::new(
                self,
                "show interface status",
                Layout::Table(TableLayout::new(ColumnSplit::Whitespace)),
            ),
            InterfaceDetail => CommandSpec::new(self, "show interface", interface_detail()),
            Clock => CommandSpec::new(self, "show clock", Layout::Text),
            RunningConfig => CommandSpec::new(self, "show running-configuration", Layout::Text),
            StartupConfig => CommandSpec::new(self, "show startup-configuration", Layout::Text),
            CandidateConfig => {
                CommandSpec::new(self, "show candidate-configuration", Layout::Text)
            }
            BgpConfig => CommandSpec::new(self, "show running-configuration bgp", Layout::Text),
            SnmpConfig => CommandSpec::new(self, "show running-configuration snmp", Layout::Text),
            BgpNeighbors => CommandSpec::new(
                self,
                "show ip bgp neighbors | display-json",
                Layout::Json(JsonLayout::new("bgp-oper.vrf[].peer-oper[]")),
            )
            .absent_when(&[BGP_NOT_ACTIVE]),
            BgpNeighbor => CommandSpec::new(
                self,
                "show ip bgp neighbors {} | display-json",
                Layout::Json(JsonLayout::new("bgp-oper.vrf[].peer-oper[]")),
            )
            .absent_when(&[BGP_NOT_ACTIVE]),
            Routes => CommandSpec::new(
                self,
                "show ip route{} | display-json",
                Layout::Json(JsonLayout::new("routes[]")),
            ),
            LldpNeighbors => CommandSpec::new(
                self,
                "show lldp neighbors",
                Layout::Table(TableLayout::new(ColumnSplit::Wide)),
            )
            .absent_when(lldp),
            LldpNeighborsDetail => {
                CommandSpec::new(self, "show lldp neighbors detail", lldp_detail())
                    .absent_when(lldp)
            }
            LldpInterfaceDetail => CommandSpec::new(
                self,
                "show lldp neighbors interface {} detail",
                lldp_detail(),
            )
            .absent_when(lldp),
            Thermal => CommandSpec::new(
                self,
                "show environment",
                Layout::Table(TableLayout::new(ColumnSplit::Whitespace).in_section("Thermal sensors")),
            ),
            PowerSupplies => CommandSpec::new(
                self,
                "show system",
                Layout::Table(
                    TableLayout::new(ColumnSplit::Whitespace)
                        .in_section("-- Power Supplies --")
                        .min_columns(2),
                ),
            ),
            Fans => CommandSpec::new(
                self,
                "show system",
                Layout::Table(
                    TableLayout::new(ColumnSplit::Whitespace)
                        .in_section("-- Fan Status --")
                        .min_columns(2),
                ),
            ),
            Processes => CommandSpec::new(
                self,
                "show processes node-id 1",
                Layout::Blocks(
                    BlockLayout::new(BlockDelimiter::Whole)
                        .field(r"^%Cpu\(s\):.*?(?P<cpu_idle>[\d.]+)\s+id")
                        .field(
                            r"^KiB Mem\s*:\s*(?P<mem_total>\d+)\s+total,\s*(?P<mem_free>\d+)\s+free,\s*(?P<mem_used>\d+)\s+used",
                        ),
                ),
            ),
            MacAddressTable => CommandSpec::new(
                self,
                "show mac address-table",
                Layout::Table(TableLayout::new(ColumnSplit::Wide)),
            ),
            ImageStatus => CommandSpec::new(
                self,
                "show image status | display-json",
                Layout::Json(JsonLayout::new("system-sw-state.software-upgrade-status")),
            ),
            ImageInstall => CommandSpec::new(self, "image install {}", Layout::Text),
            ImageUpgrade => CommandSpec::new(self, "image upgrade {}", Layout::Text),
            Ping => CommandSpec::new(self, "ping{}", Layout::Text),
        }
    }
}

fn whole_key_values() -> Layout {
    Layout::Blocks(BlockLayout::new(BlockDelimiter::Whole).with_key_values())
}

fn interface_detail() -> Layout {
    Layout::Blocks(
        BlockLayout::headed_by(
            r"^(?P<name>.+?) is (?P<admin_status>.+?), line protocol is (?P<oper_status>\S+)$",
        )
        .field(r"^Description:\s*(?P<description>.*)$")
        .field(r"^Hardware is .+, address is (?P<mac_address>\S+)")
        .field(r"^Internet address is (?P<ipv4>\d\S*)")
        .field(r"^Global IPv6 address: (?P<ipv6>[0-9a-fA-F:]\S*)")
        .field(r"^Link local IPv6 address: (?P<ipv6_link_local>[0-9a-fA-F:]\S*)")
        .field(r"^MTU (?P<mtu>\d+) bytes")
        .field(r"^LineSpeed (?P<speed>[^,\s]+)")
        .field(r"^Time since last interface status change: (?P<last_change>.+)$")
        .field(r"^(?P<packets>\d+) packets, (?P<octets>\d+) octets")
        .field(r"^(?P<multicasts>\d+) Multicasts, (?P<broadcasts>\d+) Broadcasts, (?P<unicasts>\d+) Unicasts")
        .field(r"^(?P<runts>\d+) runts, (?P<giants>\d+) giants")
        .field(r"^(?P<crc>\d+) CRC, (?P<overrun>\d+) overrun, (?P<discarded>\d+) discarded")
        .field(r"^(?P<throttles>\d+) throttles, (?P<discarded>\d+) discarded, (?P<collisions>\d+) Collisions")
        .scope("Input statistics", "input.")
        .scope("Output statistics", "output.")
        .scope("Rate Info", "rate."),
    )
}

fn lldp_detail() -> Layout {
    Layout::Blocks(BlockLayout::separated_by(r"^-{10,}$").with_key_values())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os10_platform() {
        let platform = platform();
        assert_eq!(platform.name, "dellos10");
        assert_eq!(platform.vendor, "Dell");
        assert!(platform.failed_when_contains.contains(&"% Error".to_string()));
        assert_eq!(platform.default_hostname, "OS10");
    }

    #[test]
    fn test_table_order_matches_declaration() {
        for (idx, category) in CommandCategory::ALL.iter().enumerate() {
            assert_eq!(*category as usize, idx);
            assert_eq!(category.spec().category, *category);
        }
    }

    #[test]
    fn test_render_and_absent_markers() {
        let spec = CommandCategory::LldpInterfaceDetail.spec();
        assert_eq!(
            spec.render("ethernet1/1/1"),
            "show lldp neighbors interface ethernet1/1/1 detail"
        );
        assert!(spec.is_absent("% Error: LLDP not active"));

        let routes = CommandCategory::Routes.spec();
        assert_eq!(routes.render(" bgp"), "show ip route bgp | display-json");
        assert_eq!(routes.render(""), "show ip route | display-json");
        assert!(!routes.is_absent("BGP is not active"));
    }

    #[test]
    fn test_system_tables_share_command() {
        assert_eq!(
            CommandCategory::PowerSupplies.spec().command,
            CommandCategory::Fans.spec().command
        );
    }

    #[test]
    fn test_interface_detail_layout_parses_counters() {
        let text = "\
Ethernet 1/1/1 is up, line protocol is up
LineSpeed 10G, Auto-Negotiation on
Input statistics:
     12 Multicasts, 3 Broadcasts, 1000 Unicasts
     0 runts, 0 giants, 0 throttles
     1 CRC, 0 overrun, 4 discarded
Output statistics:
     0 throttles, 2 discarded, 0 Collisions,  wred drops
";
        let spec = CommandCategory::InterfaceDetail.spec();
        let parsed = crate::parser::parse(spec.command, text, &spec.layout).unwrap();
        let record = &parsed.records[0];
        assert_eq!(record["speed"], "10G");
        assert_eq!(record["input.unicasts"], "1000");
        assert_eq!(record["input.crc"], "1");
        assert_eq!(record["input.discarded"], "4");
        assert_eq!(record["output.discarded"], "2");
    }
}
