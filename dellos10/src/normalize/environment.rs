//! Environment readings from `show environment`, `show system` and
//! `show processes`.

use indexmap::IndexMap;

use super::{Drops, field, insert_unique};
use crate::error::NormalizeError;
use crate::model::{CpuUsage, Environment, FanStatus, MemoryUsage, PowerSupply, Temperature};
use crate::parser::{Parsed, Record};
use crate::platform::CommandCategory;
use crate::snapshot::{DropReason, Snapshot};

/// Readings at or above this are flagged `is_alert`.
pub const TEMPERATURE_ALERT: f64 = 75.0;
/// Readings at or above this are flagged `is_critical`.
pub const TEMPERATURE_CRITICAL: f64 = 90.0;

/// Inputs for [`environment`], one parse per command category.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentOutput<'a> {
    pub thermal: &'a Parsed,
    pub power_supplies: &'a Parsed,
    pub fans: &'a Parsed,
    pub processes: &'a Parsed,
}

fn is_up(record: &Record, key: &str) -> bool {
    field(record, key).is_some_and(|s| s.eq_ignore_ascii_case("up"))
}

/// Readings keyed by sensor, supply and fan. A key reported twice with
/// different readings is an `InconsistentRecord`.
pub fn environment(output: EnvironmentOutput<'_>) -> Result<Snapshot<Environment>, NormalizeError> {
    let mut drops = Drops::from_parsed([
        output.thermal,
        output.power_supplies,
        output.fans,
        output.processes,
    ]);

    let temperature = temperatures(output.thermal, &mut drops)?;
    let power = power_supplies(output.power_supplies, &mut drops)?;
    let fans = fans(output.fans, &mut drops)?;
    let (cpu, memory) = processes(output.processes, &mut drops);

    Ok(drops.finish(Environment {
        fans,
        power,
        temperature,
        cpu,
        memory,
    }))
}

fn temperatures(
    parsed: &Parsed,
    drops: &mut Drops,
) -> Result<IndexMap<String, Temperature>, NormalizeError> {
    let command = CommandCategory::Thermal.spec().command;
    let mut sensors = IndexMap::new();
    for record in &parsed.records {
        let Some(name) = field(record, "Sensor-name") else {
            drops.record(DropReason::MissingField, command, "Sensor-name", record);
            continue;
        };
        let Some(reading) = field(record, "Temperature").and_then(|t| t.parse::<f64>().ok()) else {
            drops.record(DropReason::InvalidValue, command, "Temperature", record);
            continue;
        };
        let sensor = Temperature {
            temperature: reading,
            is_alert: reading >= TEMPERATURE_ALERT,
            is_critical: reading >= TEMPERATURE_CRITICAL,
        };
        insert_unique("sensor", "temperature", &mut sensors, name.to_string(), sensor)?;
    }
    Ok(sensors)
}

fn power_supplies(
    parsed: &Parsed,
    drops: &mut Drops,
) -> Result<IndexMap<String, PowerSupply>, NormalizeError> {
    let command = CommandCategory::PowerSupplies.spec().command;
    let mut supplies = IndexMap::new();
    for record in &parsed.records {
        let Some(id) = field(record, "PSU-ID") else {
            drops.record(DropReason::MissingField, command, "PSU-ID", record);
            continue;
        };
        let supply = PowerSupply {
            status: is_up(record, "Status"),
            capacity: -1.0,
            output: -1.0,
        };
        insert_unique("power supply", "status", &mut supplies, format!("psu{}", id), supply)?;
    }
    Ok(supplies)
}

/// Fans keyed `fan-tray<N>-fan<M>`. Rows continuing a tray leave the
/// tray column empty.
fn fans(parsed: &Parsed, drops: &mut Drops) -> Result<IndexMap<String, FanStatus>, NormalizeError> {
    let command = CommandCategory::Fans.spec().command;
    let mut fans = IndexMap::new();
    let mut tray: Option<&str> = None;
    for record in &parsed.records {
        if let Some(current) = field(record, "FanTray") {
            tray = Some(current);
        }
        let Some(tray) = tray else {
            drops.record(DropReason::MissingField, command, "FanTray", record);
            continue;
        };
        let (name, status) = match field(record, "Fan") {
            Some(fan) => (
                format!("fan-tray{}-fan{}", tray, fan),
                is_up(record, "Status_2"),
            ),
            None => (format!("fan-tray{}", tray), is_up(record, "Status")),
        };
        insert_unique("fan", "status", &mut fans, name, FanStatus { status })?;
    }
    Ok(fans)
}

fn processes(parsed: &Parsed, drops: &mut Drops) -> (IndexMap<String, CpuUsage>, MemoryUsage) {
    let command = CommandCategory::Processes.spec().command;
    let mut cpu = IndexMap::new();
    let mut memory = MemoryUsage {
        available_ram: 0,
        used_ram: 0,
    };
    let Some(record) = parsed.first() else {
        drops.value(DropReason::MissingField, command, "cpu and memory", "");
        return (cpu, memory);
    };

    match field(record, "cpu_idle").map(|idle| idle.parse::<f64>()) {
        Some(Ok(idle)) => {
            cpu.insert(
                "0".to_string(),
                CpuUsage {
                    usage: (100.0 - idle).clamp(0.0, 100.0),
                },
            );
        }
        Some(Err(_)) => drops.record(DropReason::InvalidValue, command, "cpu_idle", record),
        None => drops.record(DropReason::MissingField, command, "cpu_idle", record),
    }

    let bytes = |key: &str| {
        field(record, key).map(|v| v.parse::<u64>().ok().and_then(|kib| kib.checked_mul(1024)))
    };
    match (bytes("mem_total"), bytes("mem_used")) {
        (Some(Some(total)), Some(Some(used))) => {
            memory.available_ram = total;
            memory.used_ram = used;
        }
        (Some(_), Some(_)) => {
            drops.record(DropReason::InvalidValue, command, "mem_total/mem_used", record)
        }
        _ => drops.record(DropReason::MissingField, command, "mem_total/mem_used", record),
    }

    (cpu, memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const ENVIRONMENT: &str = "\
Unit    State          Temperature
-------------------------------------
1       up             43

Thermal sensors
Unit   Sensor-Id       Sensor-name                                         Temperature
------------------------------------------------------------------------------------------
1      1               CPU On-Board temp sensor                            32
1      2               Switch board temp sensor                            91
1      3               NPU temp sensor                                     n/a
";

    const SYSTEM: &str = "\
Node Id              : 1
MAC                  : 14:18:77:09:ae:00

-- Power Supplies --
PSU-ID  Status      Type    AirFlow   Fan  Speed(rpm)  Status
----------------------------------------------------------------
1       up          AC      NORMAL    1    13312       up
2       fail

-- Fan Status --
FanTray  Status      AirFlow   Fan  Speed(rpm)  Status
----------------------------------------------------------------
1        up          NORMAL    1    13195       up
                               2    13151       down
2        up          NORMAL    1    13239       up
";

    const PROCESSES: &str = "\
top - 10:52:41 up 1 day,  2:03,  1 user,  load average: 0.30, 0.24, 0.20
Tasks: 244 total,   1 running, 243 sleeping,   0 stopped,   0 zombie
%Cpu(s):  3.2 us,  1.0 sy,  0.0 ni, 95.5 id,  0.3 wa,  0.0 hi,  0.0 si,  0.0 st
KiB Mem : 16337112 total, 13063364 free,  1676016 used,  1597732 buff/cache
KiB Swap:        0 total,        0 free,        0 used. 14332304 avail Mem
";

    fn parse(category: CommandCategory, text: &str) -> Parsed {
        let spec = category.spec();
        parser::parse(spec.command, text, &spec.layout).unwrap()
    }

    #[test]
    fn test_environment() {
        let thermal = parse(CommandCategory::Thermal, ENVIRONMENT);
        let psus = parse(CommandCategory::PowerSupplies, SYSTEM);
        let fans = parse(CommandCategory::Fans, SYSTEM);
        let processes = parse(CommandCategory::Processes, PROCESSES);
        let env = environment(EnvironmentOutput {
            thermal: &thermal,
            power_supplies: &psus,
            fans: &fans,
            processes: &processes,
        })
        .unwrap();

        assert_eq!(env.temperature.len(), 2);
        let cpu_sensor = &env.temperature["CPU On-Board temp sensor"];
        assert_eq!(cpu_sensor.temperature, 32.0);
        assert!(!cpu_sensor.is_alert);
        let hot = &env.temperature["Switch board temp sensor"];
        assert!(hot.is_alert && hot.is_critical);

        assert!(env.power["psu1"].status);
        assert!(!env.power["psu2"].status);

        assert_eq!(env.fans.len(), 3);
        assert!(env.fans["fan-tray1-fan1"].status);
        assert!(!env.fans["fan-tray1-fan2"].status);
        assert!(env.fans["fan-tray2-fan1"].status);

        assert!((env.cpu["0"].usage - 4.5).abs() < 1e-9);
        assert_eq!(env.memory.available_ram, 16_337_112 * 1024);
        assert_eq!(env.memory.used_ram, 1_676_016 * 1024);

        assert_eq!(env.diagnostics.len(), 1);
        assert_eq!(env.diagnostics[0].reason, DropReason::InvalidValue);
    }

    #[test]
    fn test_missing_process_output() {
        let empty = Parsed::default();
        let env = environment(EnvironmentOutput {
            thermal: &empty,
            power_supplies: &empty,
            fans: &empty,
            processes: &empty,
        })
        .unwrap();
        assert!(env.cpu.is_empty());
        assert_eq!(env.memory.used_ram, 0);
        assert_eq!(env.diagnostics.len(), 1);
    }

    #[test]
    fn test_repeated_keys() {
        let processes = parse(CommandCategory::Processes, PROCESSES);
        let empty = Parsed::default();

        let repeated = "\
-- Power Supplies --
PSU-ID  Status      Type
--------------------------
1       up          AC
1       up          AC
";
        let psus = parse(CommandCategory::PowerSupplies, repeated);
        let env = environment(EnvironmentOutput {
            thermal: &empty,
            power_supplies: &psus,
            fans: &empty,
            processes: &processes,
        })
        .unwrap();
        assert_eq!(env.power.len(), 1);

        let conflicting = "\
-- Fan Status --
FanTray  Status      AirFlow   Fan  Speed(rpm)  Status
----------------------------------------------------------------
1        up          NORMAL    1    13195       up
1        up          NORMAL    1    13151       down
";
        let fans = parse(CommandCategory::Fans, conflicting);
        let err = environment(EnvironmentOutput {
            thermal: &empty,
            power_supplies: &empty,
            fans: &fans,
            processes: &processes,
        })
        .unwrap_err();
        let NormalizeError::InconsistentRecord { entity, key, .. } = err;
        assert_eq!(entity, "fan");
        assert_eq!(key, "fan-tray1-fan1");
    }

    #[test]
    fn test_oversized_memory_is_invalid() {
        let text = "KiB Mem : 18446744073709551615 total, 1 free, 1 used, 1 buff/cache\n";
        let processes = parse(CommandCategory::Processes, text);
        let empty = Parsed::default();
        let env = environment(EnvironmentOutput {
            thermal: &empty,
            power_supplies: &empty,
            fans: &empty,
            processes: &processes,
        })
        .unwrap();
        assert_eq!(env.memory.available_ram, 0);
        assert!(
            env.diagnostics
                .iter()
                .any(|d| d.reason == DropReason::InvalidValue && d.detail == "mem_total/mem_used")
        );
    }
}
