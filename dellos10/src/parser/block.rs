//! Key/value block parsing.
//!
//! Detail views such as `show interface` or `show lldp neighbors detail`
//! print one block of lines per entity. Blocks are split either on a header
//! line that names the entity or on a separator line, and fields are pulled
//! out of each line with named-capture regexes.

use regex::Regex;

use super::{Parsed, Record};

/// How blocks are told apart.
#[derive(Debug, Clone)]
pub enum BlockDelimiter {
    /// A matching line starts a new block. Its named captures become fields.
    /// Lines before the first header are ignored.
    Header(Regex),
    /// A matching line closes the current block.
    Separator(Regex),
    /// The whole output is a single block.
    Whole,
}

/// Shape of a block-structured output.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    pub delimiter: BlockDelimiter,
    /// Per-line patterns. Every named capture of every matching pattern is kept.
    pub fields: Vec<Regex>,
    /// Lines starting with the marker switch the key prefix for the indented
    /// lines that follow, e.g. `Input statistics:` -> `input.`. The next
    /// unindented line ends the scope.
    pub scopes: Vec<(&'static str, &'static str)>,
    /// Fall back to `Key: value` for lines no pattern matched.
    pub key_values: bool,
}

impl BlockLayout {
    pub fn new(delimiter: BlockDelimiter) -> Self {
        Self {
            delimiter,
            fields: Vec::new(),
            scopes: Vec::new(),
            key_values: false,
        }
    }

    /// Blocks split on lines matching `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex.
    pub fn headed_by(pattern: &str) -> Self {
        Self::new(BlockDelimiter::Header(
            Regex::new(pattern).expect("Invalid regex pattern"),
        ))
    }

    /// Blocks closed by lines matching `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex.
    pub fn separated_by(pattern: &str) -> Self {
        Self::new(BlockDelimiter::Separator(
            Regex::new(pattern).expect("Invalid regex pattern"),
        ))
    }

    /// Add a field pattern.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex.
    pub fn field(mut self, pattern: &str) -> Self {
        self.fields
            .push(Regex::new(pattern).expect("Invalid regex pattern"));
        self
    }

    pub fn scope(mut self, marker: &'static str, prefix: &'static str) -> Self {
        self.scopes.push((marker, prefix));
        self
    }

    pub fn with_key_values(mut self) -> Self {
        self.key_values = true;
        self
    }

    /// Decode all blocks. A missing header simply produces no records.
    pub fn parse(&self, text: &str) -> Parsed {
        let mut parsed = Parsed::default();
        let mut current: Option<Record> = match self.delimiter {
            BlockDelimiter::Header(_) => None,
            _ => Some(Record::new()),
        };
        let mut prefix = "";

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match &self.delimiter {
                BlockDelimiter::Header(header) => {
                    if let Some(caps) = header.captures(line) {
                        flush(&mut parsed, current.take());
                        let mut record = Record::new();
                        for name in header.capture_names().flatten() {
                            if let Some(m) = caps.name(name) {
                                insert(&mut record, name, m.as_str());
                            }
                        }
                        current = Some(record);
                        prefix = "";
                        continue;
                    }
                }
                BlockDelimiter::Separator(separator) => {
                    if separator.is_match(line) {
                        flush(&mut parsed, current.replace(Record::new()));
                        prefix = "";
                        continue;
                    }
                }
                BlockDelimiter::Whole => {}
            }

            let Some(record) = current.as_mut() else {
                continue;
            };

            if !raw.starts_with(char::is_whitespace) {
                prefix = "";
            }

            if let Some((_, scoped)) = self
                .scopes
                .iter()
                .find(|(marker, _)| line.starts_with(*marker))
            {
                prefix = *scoped;
                continue;
            }

            let mut matched = false;
            for pattern in &self.fields {
                if let Some(caps) = pattern.captures(line) {
                    matched = true;
                    for name in pattern.capture_names().flatten() {
                        if let Some(m) = caps.name(name) {
                            insert(record, &format!("{}{}", prefix, name), m.as_str());
                        }
                    }
                }
            }

            if !matched && self.key_values {
                if let Some((key, value)) = line.split_once(':') {
                    let key = key.trim();
                    if !key.is_empty() {
                        insert(record, &format!("{}{}", prefix, key), value.trim());
                    }
                }
            }
        }

        flush(&mut parsed, current);
        parsed
    }
}

fn flush(parsed: &mut Parsed, record: Option<Record>) {
    if let Some(record) = record.filter(|r| !r.is_empty()) {
        parsed.records.push(record);
    }
}

/// Repeated fields keep every value, newline separated.
fn insert(record: &mut Record, key: &str, value: &str) {
    let value = value.trim();
    match record.get_mut(key) {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => {
            record.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = "\
Ethernet 1/1/1 is up, line protocol is up
Description: to-spine1
Hardware is Eth, address is 14:18:77:09:ae:01
Internet address is 10.1.1.1/31
Global IPv6 address: 2001:db8::1/64
Global IPv6 address: 2001:db8:1::1/64
MTU 9216 bytes, IP MTU 9184 bytes
Input statistics:
     1014 packets, 127806 octets
Output statistics:
     1116 packets, 147960 octets
Time since last interface status change: 00:10:00
Ethernet 1/1/2 is down, line protocol is down
MTU 1532 bytes, IP MTU 1500 bytes
";

    fn interface_layout() -> BlockLayout {
        BlockLayout::headed_by(r"^(?P<name>\S+(?: \d\S*)?) is (?P<admin>[\w ]+?), line protocol is (?P<oper>\S+)$")
            .field(r"^Description: (?P<description>.*)$")
            .field(r"^MTU (?P<mtu>\d+) bytes")
            .field(r"^Internet address is (?P<ipv4>\S+)")
            .field(r"^Global IPv6 address: (?P<ipv6>\S+)")
            .field(r"^(?P<packets>\d+) packets, (?P<octets>\d+) octets")
            .field(r"^Time since last interface status change: (?P<last_change>.+)$")
            .scope("Input statistics", "input.")
            .scope("Output statistics", "output.")
    }

    #[test]
    fn test_header_splits_blocks() {
        let parsed = interface_layout().parse(DETAIL);
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first["name"], "Ethernet 1/1/1");
        assert_eq!(first["admin"], "up");
        assert_eq!(first["description"], "to-spine1");
        assert_eq!(first["mtu"], "9216");
        assert_eq!(first["ipv6"], "2001:db8::1/64\n2001:db8:1::1/64");
        assert_eq!(first["input.octets"], "127806");
        assert_eq!(first["output.packets"], "1116");
        assert_eq!(first["last_change"], "00:10:00");

        let second = &parsed.records[1];
        assert_eq!(second["oper"], "down");
        assert!(!second.contains_key("input.octets"));
    }

    #[test]
    fn test_separator_blocks_with_key_values() {
        let text = "\
Remote Chassis ID: 14:18:77:09:ae:00
Remote Port ID: ethernet1/1/5
Local Port ID: ethernet1/1/1
---------------------------------------------------------------------------
Remote Chassis ID: 90:b1:1c:f4:a6:8f
Local Port ID: ethernet1/1/2
---------------------------------------------------------------------------
";
        let layout = BlockLayout::separated_by(r"^-{10,}$").with_key_values();
        let parsed = layout.parse(text);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0]["Remote Port ID"], "ethernet1/1/5");
        assert_eq!(parsed.records[1]["Local Port ID"], "ethernet1/1/2");
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        let parsed = interface_layout().parse("% No such interface\n");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_whole_output_is_one_block() {
        let layout = BlockLayout::new(BlockDelimiter::Whole).with_key_values();
        let parsed = layout.parse("OS Version: 10.5.1.0\nSystem Type: S4148F-ON\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0]["System Type"], "S4148F-ON");
    }
}
