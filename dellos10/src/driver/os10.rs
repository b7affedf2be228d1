//! Driver for Dell EMC Networking OS10.

use std::net::IpAddr;
use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep, next_prompt};
use super::{BgpNeighborDetails, ConfigSession, ImageManager, NetworkDriver};
use crate::config::{self, CandidateState, ConfigDiff, ConfigTransaction, ConfigTree};
use crate::error::{ConfigError, DriverError, Error, Result, TransportError};
use crate::model::{
    BgpConfig, BgpVrf, ConfigRetrieve, DeviceConfig, Environment, Facts, ImageOperation,
    ImageStatus, Interface, InterfaceCounters, InterfaceIp, LldpNeighbor, LldpNeighborDetail,
    MacEntry, PingOptions, PingOutcome, Route, RouteProtocol, SnmpInformation,
};
use crate::normalize::{self, environment::EnvironmentOutput, units};
use crate::parser::{self, Parsed};
use crate::platform::os10::{
    CONFIG_MODIFIED_PROMPT, ILLEGAL_PARAMETER, IMAGE_URL_SCHEMES, PROCEED_TO_REBOOT_PROMPT,
};
use crate::platform::{CommandCategory, CommandSpec, PlatformDefinition};
use crate::session::{DeviceSession, RawOutput};
use crate::snapshot::Snapshot;

/// Label used for transport errors raised by `apply`.
const APPLY: &str = "apply candidate";

/// OS10 driver over a [`DeviceSession`].
///
/// Getters share the session through `&self`; the configuration candidate
/// is owned by the driver and only changes through `&mut self`.
///
/// # Example
///
/// ```rust,ignore
/// use dellos10::{ConfigSession, DriverBuilder, NetworkDriver};
///
/// let mut driver = DriverBuilder::new(session).build()?;
/// let facts = driver.get_facts().await?;
/// println!("{} runs {}", facts.hostname, facts.os_version);
///
/// driver.load_merge_candidate("interface ethernet1/1/1\n description uplink\n").await?;
/// println!("{}", driver.compare_config().await?);
/// driver.commit_config().await?;
/// ```
#[derive(Debug)]
pub struct Os10Driver<S> {
    session: S,
    platform: PlatformDefinition,
    save_on_commit: bool,
    transaction: ConfigTransaction,
}

impl<S: DeviceSession> Os10Driver<S> {
    /// Create a driver. Prefer [`DriverBuilder`](super::DriverBuilder).
    pub fn new(session: S, platform: PlatformDefinition, save_on_commit: bool) -> Self {
        Self {
            session,
            platform,
            save_on_commit,
            transaction: ConfigTransaction::new(),
        }
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn save_on_commit(&self) -> bool {
        self.save_on_commit
    }

    /// Revision of the most recently loaded candidate.
    pub fn candidate_revision(&self) -> u64 {
        self.transaction.revision()
    }

    /// Run one command and time it.
    async fn execute(&self, command: &str) -> Result<RawOutput> {
        let start = Instant::now();
        let body = self
            .session
            .execute(command)
            .await
            .map_err(|e| Error::transport(command, e))?;
        let output = RawOutput::new(
            command,
            body,
            start.elapsed(),
            &self.platform.failed_when_contains,
        );
        debug!(
            "executed '{}' in {:?} ({} bytes)",
            command,
            output.elapsed,
            output.body.len()
        );
        Ok(output)
    }

    /// Run a command, failing when the device rejected it.
    async fn execute_checked(&self, command: &str) -> Result<String> {
        let output = self.execute(command).await?;
        match output.failure_message {
            Some(message) => Err(rejected(command, message)),
            None => Ok(output.text()),
        }
    }

    /// Output of `spec`, or `None` when the feature is not configured.
    ///
    /// Absent markers are checked before failure patterns: OS10 prints
    /// `% Error: LLDP not active` for a disabled feature.
    async fn read(&self, spec: &CommandSpec, command: &str) -> Result<Option<String>> {
        let output = self.execute(command).await?;
        let text = output.text();
        if spec.is_absent(&text) {
            debug!("'{}': feature not configured", command);
            return Ok(None);
        }
        if let Some(message) = output.failure_message {
            return Err(rejected(command, message));
        }
        Ok(Some(text))
    }

    /// Run `category` and parse its output.
    async fn fetch(&self, category: CommandCategory, argument: &str) -> Result<Parsed> {
        let spec = category.spec();
        let command = spec.render(argument);
        match self.read(spec, &command).await? {
            Some(text) => Ok(parser::parse(&command, &text, &spec.layout)?),
            None => Ok(Parsed::default()),
        }
    }

    /// Run `category` and return its text untouched.
    async fn fetch_text(&self, category: CommandCategory) -> Result<String> {
        let spec = category.spec();
        let command = spec.render("");
        Ok(self.read(spec, &command).await?.unwrap_or_default())
    }

    async fn diff_against_running(&self, candidate: &str) -> Result<ConfigDiff> {
        let running = self.fetch_text(CommandCategory::RunningConfig).await?;
        Ok(config::diff::compare(
            &ConfigTree::parse(candidate),
            &ConfigTree::parse(&running),
        ))
    }

    /// Send `command`, then answer each prompt in `events` at most once.
    pub async fn send_interactive(
        &self,
        command: &str,
        events: &[InteractiveEvent],
    ) -> Result<InteractiveResult> {
        let start = Instant::now();
        let first = self.execute(command).await?;
        let mut output = first.text();
        let mut steps = vec![InteractiveStep::new(command, output.clone(), first.elapsed)];
        let mut answered = vec![false; events.len()];

        while let Some(idx) = next_prompt(events, &answered, &output) {
            answered[idx] = true;
            let event = &events[idx];
            debug!("answering prompt /{}/ with '{}'", event.prompt, event.answer);
            let reply = self.execute(&event.answer).await?;
            output = reply.text();
            steps.push(InteractiveStep::new(
                event.answer.as_str(),
                output.clone(),
                reply.elapsed,
            ));
        }

        Ok(InteractiveResult::new(steps, start.elapsed()))
    }

    /// Report whether an image operation got going.
    async fn image_operation(&self, command: &str) -> Result<ImageOperation> {
        let status = self.get_image_status().await?;
        let operation = normalize::system::image_operation(&status);
        debug!("'{}': {:?}", command, operation);
        Ok(operation)
    }
}

fn rejected(command: &str, message: String) -> Error {
    Error::transport(command, TransportError::CommandRejected { output: message })
}

fn invalid_argument(message: String) -> Error {
    DriverError::InvalidArgument { message }.into()
}

/// A single CLI token supplied by the caller.
fn cli_token<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid_argument(format!(
            "{} must be a single non-empty word, got {:?}",
            name, value
        )));
    }
    Ok(value)
}

/// Check an image URL against the schemes OS10 accepts.
pub fn validate_image_url(url: &str) -> Result<&str> {
    let url = cli_token("image URL", url)?;
    let accepted = url
        .split_once("://")
        .filter(|(_, path)| !path.is_empty())
        .is_some_and(|(scheme, _)| IMAGE_URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()));
    if !accepted {
        return Err(invalid_argument(format!(
            "image URL '{}' must use one of: {}",
            url,
            IMAGE_URL_SCHEMES.join(", ")
        )));
    }
    Ok(url)
}

impl<S: DeviceSession> NetworkDriver for Os10Driver<S> {
    async fn get_facts(&self) -> Result<Snapshot<Facts>> {
        let version = self.fetch(CommandCategory::Version, "").await?;
        let inventory = self.fetch(CommandCategory::Inventory, "").await?;
        let status = self.fetch(CommandCategory::InterfaceStatus, "").await?;
        let running = self.fetch_text(CommandCategory::RunningConfig).await?;

        let names = normalize::interfaces::interface_names(&status)?;
        Ok(normalize::facts::facts(
            &self.platform,
            &version,
            &inventory,
            &ConfigTree::parse(&running),
            names,
        ))
    }

    async fn get_environment(&self) -> Result<Snapshot<Environment>> {
        let thermal = self.fetch(CommandCategory::Thermal, "").await?;

        // Power supplies and fans are two tables of one `show system` output.
        let psu_spec = CommandCategory::PowerSupplies.spec();
        let fan_spec = CommandCategory::Fans.spec();
        let system = self
            .read(psu_spec, psu_spec.command)
            .await?
            .unwrap_or_default();
        let power_supplies = parser::parse(psu_spec.command, &system, &psu_spec.layout)?;
        let fans = parser::parse(fan_spec.command, &system, &fan_spec.layout)?;

        let processes = self.fetch(CommandCategory::Processes, "").await?;

        Ok(normalize::environment::environment(EnvironmentOutput {
            thermal: &thermal,
            power_supplies: &power_supplies,
            fans: &fans,
            processes: &processes,
        })?)
    }

    async fn get_config(&self, retrieve: ConfigRetrieve) -> Result<DeviceConfig> {
        let mut config = DeviceConfig::default();
        if retrieve.includes(ConfigRetrieve::Running) {
            config.running = self.fetch_text(CommandCategory::RunningConfig).await?;
        }
        if retrieve.includes(ConfigRetrieve::Startup) {
            config.startup = self.fetch_text(CommandCategory::StartupConfig).await?;
        }
        if retrieve.includes(ConfigRetrieve::Candidate) {
            config.candidate = self.fetch_text(CommandCategory::CandidateConfig).await?;
        }
        Ok(config)
    }

    async fn get_interfaces(&self) -> Result<Snapshot<IndexMap<String, Interface>>> {
        let status = self.fetch(CommandCategory::InterfaceStatus, "").await?;
        let detail = self.fetch(CommandCategory::InterfaceDetail, "").await?;
        let clock_text = self.fetch_text(CommandCategory::Clock).await?;
        let clock = units::device_clock(&clock_text);
        if clock.is_none() {
            warn!("unrecognized device clock {:?}; last_flapped left unset", clock_text.trim());
        }
        Ok(normalize::interfaces::interfaces(&status, &detail, clock)?)
    }

    async fn get_interfaces_ip(&self) -> Result<Snapshot<IndexMap<String, InterfaceIp>>> {
        let detail = self.fetch(CommandCategory::InterfaceDetail, "").await?;
        Ok(normalize::interfaces::interfaces_ip(&detail))
    }

    async fn get_interfaces_counters(&self) -> Result<Snapshot<IndexMap<String, InterfaceCounters>>> {
        let detail = self.fetch(CommandCategory::InterfaceDetail, "").await?;
        Ok(normalize::interfaces::interfaces_counters(&detail)?)
    }

    async fn get_route_to(
        &self,
        destination: Option<&str>,
        protocol: Option<RouteProtocol>,
    ) -> Result<Snapshot<IndexMap<String, Vec<Route>>>> {
        let destination = match destination.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => Some(cli_token("destination", d)?),
            None => None,
        };
        let filter = normalize::routes::route_filter(destination, protocol);
        let parsed = self.fetch(CommandCategory::Routes, &filter).await?;
        Ok(normalize::routes::routes(&parsed, protocol))
    }

    async fn get_bgp_config(&self, group: &str, neighbor: &str) -> Result<Snapshot<BgpConfig>> {
        let text = self.fetch_text(CommandCategory::BgpConfig).await?;
        Ok(normalize::bgp::bgp_config(&text, group.trim(), neighbor.trim()))
    }

    async fn get_bgp_neighbors(&self) -> Result<Snapshot<IndexMap<String, BgpVrf>>> {
        let parsed = self.fetch(CommandCategory::BgpNeighbors, "").await?;
        Ok(normalize::bgp::bgp_neighbors(&parsed)?)
    }

    async fn get_bgp_neighbors_detail(
        &self,
        neighbor: Option<&str>,
    ) -> Result<Snapshot<BgpNeighborDetails>> {
        let parsed = match neighbor.map(str::trim).filter(|n| !n.is_empty()) {
            Some(address) => {
                let address: IpAddr = address.parse().map_err(|_| {
                    invalid_argument(format!("'{}' is not a neighbor address", address))
                })?;
                self.fetch(CommandCategory::BgpNeighbor, &address.to_string())
                    .await?
            }
            None => self.fetch(CommandCategory::BgpNeighbors, "").await?,
        };
        Ok(normalize::bgp::bgp_neighbors_detail(&parsed)?)
    }

    async fn get_lldp_neighbors(&self) -> Result<Snapshot<IndexMap<String, Vec<LldpNeighbor>>>> {
        let parsed = self.fetch(CommandCategory::LldpNeighbors, "").await?;
        Ok(normalize::lldp::lldp_neighbors(&parsed))
    }

    async fn get_lldp_neighbors_detail(
        &self,
    ) -> Result<Snapshot<IndexMap<String, Vec<LldpNeighborDetail>>>> {
        let parsed = self.fetch(CommandCategory::LldpNeighborsDetail, "").await?;
        Ok(normalize::lldp::lldp_neighbors_detail(&parsed, None))
    }

    async fn get_lldp_neighbors_interface_detail(
        &self,
        interface: &str,
    ) -> Result<Snapshot<IndexMap<String, Vec<LldpNeighborDetail>>>> {
        let name = units::interface_name(interface);
        let name = cli_token("interface", &name)?;
        let parsed = self.fetch(CommandCategory::LldpInterfaceDetail, name).await?;
        Ok(normalize::lldp::lldp_neighbors_detail(&parsed, Some(name)))
    }

    async fn get_snmp_information(&self) -> Result<Snapshot<SnmpInformation>> {
        let text = self.fetch_text(CommandCategory::SnmpConfig).await?;
        Ok(normalize::system::snmp_information(&text))
    }

    async fn get_mac_address_table(&self) -> Result<Snapshot<Vec<MacEntry>>> {
        let parsed = self.fetch(CommandCategory::MacAddressTable, "").await?;
        Ok(normalize::system::mac_address_table(&parsed))
    }

    async fn ping(&self, destination: &str, options: &PingOptions) -> Result<PingOutcome> {
        let destination = cli_token("destination", destination)?;
        if let Some(vrf) = options.vrf.as_deref().filter(|v| !v.is_empty()) {
            cli_token("vrf", vrf)?;
        }
        if let Some(source) = options.source.as_deref().filter(|s| !s.is_empty()) {
            cli_token("source", source)?;
        }
        let command = CommandCategory::Ping
            .spec()
            .render(&options.render(destination));
        let output = self.execute(&command).await?;
        Ok(normalize::system::ping_outcome(
            &command,
            destination,
            &output.text(),
        ))
    }

    async fn cli(&self, commands: &[&str]) -> Result<IndexMap<String, String>> {
        let mut outputs = IndexMap::with_capacity(commands.len());
        for command in commands {
            let text = self.execute_checked(command).await?;
            outputs.insert(command.to_string(), text);
        }
        Ok(outputs)
    }
}

impl<S: DeviceSession> ConfigSession for Os10Driver<S> {
    async fn load_merge_candidate(&mut self, config: &str) -> Result<u64> {
        Ok(self.transaction.load(config)?)
    }

    async fn load_replace_candidate(&mut self, _config: &str) -> Result<()> {
        Err(ConfigError::UnsupportedOperation {
            operation: "load_replace_candidate".to_string(),
        }
        .into())
    }

    async fn compare_config(&mut self) -> Result<ConfigDiff> {
        let candidate = self.transaction.staged("compare")?;
        self.diff_against_running(&candidate.text).await
    }

    async fn commit_config(&mut self) -> Result<()> {
        let candidate = self.transaction.staged("commit")?;
        let diff = self.diff_against_running(&candidate.text).await?;
        debug!(
            "committing candidate revision {} ({} changed lines)",
            candidate.revision,
            diff.len()
        );
        trace!("candidate diff:\n{}", diff);

        let ack = self
            .session
            .apply(&candidate.text)
            .await
            .map_err(|e| Error::transport(APPLY, e))?;
        if !ack.acknowledged {
            let detail = ack
                .partial_detail
                .unwrap_or_else(|| "device did not acknowledge the candidate".to_string());
            warn!(
                "commit of revision {} rejected: {}",
                candidate.revision, detail
            );
            return Err(ConfigError::CommitFailed {
                revision: candidate.revision,
                detail,
            }
            .into());
        }
        self.transaction.mark_committed(candidate.revision)?;

        if self.save_on_commit {
            let save = self.platform.save_command.clone();
            self.execute_checked(&save).await?;
        }
        Ok(())
    }

    async fn discard_config(&mut self) -> Result<()> {
        self.transaction.discard()?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        Err(ConfigError::UnsupportedOperation {
            operation: "rollback".to_string(),
        }
        .into())
    }

    fn candidate_state(&self) -> CandidateState {
        self.transaction.state()
    }
}

impl<S: DeviceSession> ImageManager for Os10Driver<S> {
    async fn install_switch_image(&mut self, image_url: &str) -> Result<ImageOperation> {
        let url = validate_image_url(image_url)?;
        let command = CommandCategory::ImageInstall.spec().render(url);
        let output = self.execute(&command).await?;
        if output.contains(ILLEGAL_PARAMETER) {
            return Err(invalid_argument(format!(
                "device rejected image URL '{}'",
                url
            )));
        }
        if let Some(message) = output.failure_message {
            return Err(rejected(&command, message));
        }
        self.image_operation(&command).await
    }

    async fn upgrade_switch_image(
        &mut self,
        image_url: &str,
        save_config: bool,
    ) -> Result<ImageOperation> {
        let url = validate_image_url(image_url)?;
        let command = CommandCategory::ImageUpgrade.spec().render(url);
        let events = [
            InteractiveEvent::literal(CONFIG_MODIFIED_PROMPT, if save_config { "yes" } else { "no" }),
            InteractiveEvent::literal(PROCEED_TO_REBOOT_PROMPT, "yes"),
        ];
        let result = self.send_interactive(&command, &events).await?;

        if result
            .first_output()
            .is_some_and(|out| out.contains(ILLEGAL_PARAMETER))
        {
            return Err(invalid_argument(format!(
                "device rejected image URL '{}'",
                url
            )));
        }
        for step in &result.steps {
            if let Some(pattern) = self.platform.detect_failure(&step.output) {
                debug!("'{}' matched failure pattern '{}'", step.input, pattern);
                return Err(rejected(&step.input, step.output.trim().to_string()));
            }
        }
        self.image_operation(&command).await
    }

    async fn get_image_status(&self) -> Result<Snapshot<ImageStatus>> {
        let parsed = self.fetch(CommandCategory::ImageStatus, "").await?;
        Ok(normalize::system::image_status(&parsed))
    }
}
