//! Unit and name canonicalization.
//!
//! OS10 is not consistent about how it prints the same quantity: a port
//! speed is `10G` in one view and `10000` in another, an uptime may read
//! `3d4h5m` or `1 day 00:54:13`. Everything here turns one such spelling
//! into the canonical unit, or returns `None` when the text is not a value
//! at all.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static COMPACT_UPTIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)w)?(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .expect("Invalid regex pattern")
});

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2})(?::(\d{2}))?$").expect("Invalid regex pattern"));

/// Canonical interface name prefixes, keyed by every spelling OS10 uses.
const INTERFACE_PREFIXES: &[(&str, &str)] = &[
    ("ethernet", "ethernet"),
    ("eth", "ethernet"),
    ("port-channel", "port-channel"),
    ("po", "port-channel"),
    ("vlan", "vlan"),
    ("vl", "vlan"),
    ("loopback", "loopback"),
    ("lo", "loopback"),
    ("management", "mgmt"),
    ("mgmt", "mgmt"),
    ("ma", "mgmt"),
    ("virtual-network", "virtual-network"),
    ("tunnel", "tunnel"),
];

/// Values OS10 prints where a field has no value.
pub fn is_placeholder(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "-" | "--" | "n/a" | "na" | "none" | "not available"
    )
}

/// Port speed in bits per second.
///
/// Unsuffixed numbers are megabits, as in `show interface status`.
pub fn speed_bps(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;

    let unit = unit.trim().to_ascii_lowercase();
    let multiplier = match unit.chars().next() {
        None | Some('m') => 1e6,
        Some('k') => 1e3,
        Some('g') => 1e9,
        Some('t') => 1e12,
        _ => return None,
    };
    let rest = &unit[unit.len().min(1)..];
    if !matches!(rest, "" | "b" | "bps" | "bit" | "bit/s" | "bits/sec") {
        return None;
    }
    Some((number * multiplier).round() as u64)
}

/// Duration in seconds.
///
/// Accepts bare seconds, compact `3d4h5m` / `5w2d` forms, `HH:MM[:SS]`, and
/// worded forms such as `2 weeks 3 days 01:02:03`.
pub fn duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }

    if let Some(caps) = COMPACT_UPTIME.captures(value) {
        const UNITS: [u64; 5] = [604_800, 86_400, 3_600, 60, 1];
        let mut total: u64 = 0;
        let mut any = false;
        for (idx, unit) in UNITS.iter().enumerate() {
            if let Some(m) = caps.get(idx + 1) {
                let part = m.as_str().parse::<u64>().ok()?.checked_mul(*unit)?;
                total = part.checked_add(total)?;
                any = true;
            }
        }
        return any.then_some(total);
    }

    let mut total: u64 = 0;
    let mut tokens = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .peekable();
    let mut any = false;
    while let Some(token) = tokens.next() {
        if let Some(caps) = CLOCK_TIME.captures(token) {
            let part = |i: usize| {
                caps.get(i)
                    .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
            };
            let clock = part(1)?
                .checked_mul(3_600)?
                .checked_add(part(2)? * 60)?
                .checked_add(part(3)?)?;
            total = total.checked_add(clock)?;
            any = true;
            continue;
        }
        let count: u64 = token.parse().ok()?;
        let unit = tokens.next()?.to_ascii_lowercase();
        let seconds = match unit.trim_end_matches('s') {
            "week" => 604_800,
            "day" => 86_400,
            "hour" => 3_600,
            "minute" | "min" => 60,
            "second" | "sec" => 1,
            _ => return None,
        };
        total = total.checked_add(count.checked_mul(seconds)?)?;
        any = true;
    }
    any.then_some(total)
}

/// MAC address as lower-case colon-separated hex.
pub fn mac(value: &str) -> Option<String> {
    let hex: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '.' | '-'))
        .collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_lowercase();
    let octets: Vec<&str> = (0..12).step_by(2).map(|i| &hex[i..i + 2]).collect();
    Some(octets.join(":"))
}

/// Interface name in OS10 configuration form (`ethernet1/1/1`).
///
/// Unknown prefixes are lower-cased and kept.
pub fn interface_name(value: &str) -> String {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
        .unwrap_or(value.len());
    let (prefix, rest) = value.split_at(split);
    let prefix = prefix.to_ascii_lowercase();
    let rest: String = rest.chars().filter(|c| !c.is_whitespace()).collect();

    let canonical = INTERFACE_PREFIXES
        .iter()
        .find(|(spelling, _)| *spelling == prefix)
        .map_or(prefix.as_str(), |(_, canonical)| canonical);
    format!("{}{}", canonical, rest)
}

/// Parse the device clock as printed by `show clock`.
pub fn device_clock(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The instant `elapsed` seconds before `now`.
pub fn since(now: DateTime<Utc>, elapsed: u64) -> Option<DateTime<Utc>> {
    let elapsed = TimeDelta::try_seconds(i64::try_from(elapsed).ok()?)?;
    now.checked_sub_signed(elapsed)
}

/// Non-negative counter, tolerating thousands separators.
pub fn count(value: &str) -> Option<u64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_speed() {
        assert_eq!(speed_bps("10G"), Some(10_000_000_000));
        assert_eq!(speed_bps("1000M"), Some(1_000_000_000));
        assert_eq!(speed_bps("25000"), Some(25_000_000_000));
        assert_eq!(speed_bps("2.5G"), Some(2_500_000_000));
        assert_eq!(speed_bps("100 Mbps"), Some(100_000_000));
        assert_eq!(speed_bps("auto"), None);
        assert_eq!(speed_bps(""), None);
        assert_eq!(speed_bps("10Gx"), None);
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration_secs("86400"), Some(86_400));
        assert_eq!(duration_secs("3d4h5m"), Some(3 * 86_400 + 4 * 3_600 + 5 * 60));
        assert_eq!(duration_secs("1d02h03m"), Some(86_400 + 2 * 3_600 + 3 * 60));
        assert_eq!(duration_secs("5w2d"), Some(5 * 604_800 + 2 * 86_400));
        assert_eq!(duration_secs("01:16:56"), Some(3_600 + 16 * 60 + 56));
        assert_eq!(duration_secs("1 day 00:54:13"), Some(86_400 + 54 * 60 + 13));
        assert_eq!(
            duration_secs("2 weeks 3 days 01:02:03"),
            Some(2 * 604_800 + 3 * 86_400 + 3_723)
        );
        assert_eq!(
            duration_secs("1 weeks 0 day 20:52:29"),
            Some(604_800 + 20 * 3_600 + 52 * 60 + 29)
        );
        assert_eq!(duration_secs("never"), None);
        assert_eq!(duration_secs("99999999999999w"), None);
        assert_eq!(duration_secs("99999999999999 weeks 00:00:01"), None);
        assert_eq!(duration_secs("18446744073709551615 days"), None);
        assert_eq!(duration_secs("18446744073709551615"), Some(u64::MAX));
        assert_eq!(duration_secs(""), None);
    }

    #[test]
    fn test_mac() {
        assert_eq!(mac("a493.4cc1.67a7").as_deref(), Some("a4:93:4c:c1:67:a7"));
        assert_eq!(mac("A4-93-4C-C1-67-A7").as_deref(), Some("a4:93:4c:c1:67:a7"));
        assert_eq!(mac("14:18:77:09:ae:01").as_deref(), Some("14:18:77:09:ae:01"));
        assert_eq!(mac("not-a-mac"), None);
        assert_eq!(mac("14:18:77:09:ae"), None);
    }

    #[test]
    fn test_interface_name() {
        assert_eq!(interface_name("Eth 1/1/1"), "ethernet1/1/1");
        assert_eq!(interface_name("Ethernet 1/1/1:2"), "ethernet1/1/1:2");
        assert_eq!(interface_name("ethernet1/1/1"), "ethernet1/1/1");
        assert_eq!(interface_name("Vlan 100"), "vlan100");
        assert_eq!(interface_name("Port-channel 10"), "port-channel10");
        assert_eq!(interface_name("Po 10"), "port-channel10");
        assert_eq!(interface_name("Loopback 0"), "loopback0");
        assert_eq!(interface_name("Mgmt 1/1/1"), "mgmt1/1/1");
        assert_eq!(interface_name("Management 1/1/1"), "mgmt1/1/1");
        assert_eq!(interface_name("Null 0"), "null0");
    }

    #[test]
    fn test_device_clock() {
        let expected = Utc.with_ymd_and_hms(2017, 2, 7, 22, 13, 25).unwrap();
        let parsed = device_clock("2017-02-07T22:13:25.31+00:00").unwrap();
        assert_eq!(parsed.timestamp(), expected.timestamp());

        let shifted = device_clock("2017-02-07T23:13:25+01:00").unwrap();
        assert_eq!(shifted, expected);
        assert_eq!(device_clock("2017-02-07 22:13:25").unwrap(), expected);
        assert_eq!(device_clock("yesterday"), None);
    }

    #[test]
    fn test_since() {
        let now = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let then = since(now, 86_400).unwrap();
        assert_eq!(then, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_count() {
        assert_eq!(count("1,234"), Some(1234));
        assert_eq!(count(" 7 "), Some(7));
        assert_eq!(count("-1"), None);
    }

    #[test]
    fn test_placeholder() {
        assert!(is_placeholder("-"));
        assert!(is_placeholder(" N/A "));
        assert!(!is_placeholder("0"));
    }
}
