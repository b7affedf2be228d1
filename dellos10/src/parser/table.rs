//! Column table parsing.
//!
//! OS10 prints most listings as fixed-width tables:
//!
//! ```text
//! Port            Description     Status   Speed    Duplex   Mode Vlan Tagged-Vlans
//! ---------------------------------------------------------------------------------
//! Eth 1/1/1       to-spine1       up       10G      full     A    1    -
//! ```
//!
//! The header line fixes where each column starts. Rows are sliced at those
//! offsets, so values containing single spaces (`Eth 1/1/1`) survive. A row
//! that does not line up with the header is skipped and reported.

use log::debug;

use super::{Parsed, Record, fragment};
use crate::snapshot::{Diagnostic, DropReason};

/// How header names are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSplit {
    /// Every run of whitespace starts a new column.
    Whitespace,
    /// Two or more spaces start a new column; single spaces belong to the name
    /// (`Loc PortID   Rem Host Name`).
    Wide,
}

/// Shape of one table in a command's output.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Title line that precedes the table, for outputs holding several tables.
    pub section: Option<&'static str>,
    pub split: ColumnSplit,
    /// Columns a row must reach to be accepted. `None` means all of them.
    pub min_columns: Option<usize>,
    /// End the table at the first blank line after a data row.
    pub stop_at_blank: bool,
}

impl TableLayout {
    pub const fn new(split: ColumnSplit) -> Self {
        Self {
            section: None,
            split,
            min_columns: None,
            stop_at_blank: false,
        }
    }

    pub const fn in_section(mut self, title: &'static str) -> Self {
        self.section = Some(title);
        self.stop_at_blank = true;
        self
    }

    pub const fn min_columns(mut self, count: usize) -> Self {
        self.min_columns = Some(count);
        self
    }

    pub const fn stop_at_blank(mut self) -> Self {
        self.stop_at_blank = true;
        self
    }

    /// Decode the table. Never fails: unaligned rows become diagnostics and a
    /// missing table yields no records.
    pub fn parse(&self, command: &str, text: &str) -> Parsed {
        let mut parsed = Parsed::default();
        let mut lines = text.lines();

        if let Some(title) = self.section {
            if !lines.by_ref().any(|line| line.trim() == title) {
                debug!("table section '{}' not present in '{}'", title, command);
                return parsed;
            }
        }

        let Some(header) = lines
            .by_ref()
            .find(|line| !line.trim().is_empty() && !is_rule(line))
        else {
            return parsed;
        };
        let columns = self.columns(header);
        if columns.is_empty() {
            return parsed;
        }
        let required = self
            .min_columns
            .unwrap_or(columns.len())
            .clamp(1, columns.len());

        for line in lines {
            if line.trim().is_empty() {
                if self.stop_at_blank && !parsed.records.is_empty() {
                    break;
                }
                continue;
            }
            if is_rule(line) {
                continue;
            }

            match align_row(line, &columns, required) {
                Ok(record) => parsed.records.push(record),
                Err(detail) => {
                    debug!("skipping row in '{}': {}", command, detail);
                    parsed.diagnostics.push(Diagnostic::new(
                        DropReason::MisalignedRow,
                        command,
                        detail,
                        fragment(line),
                    ));
                }
            }
        }

        parsed
    }

    /// Column names and their start offsets (in chars).
    fn columns(&self, header: &str) -> Vec<(String, usize)> {
        let chars: Vec<char> = header.chars().collect();
        let mut columns: Vec<(String, usize)> = Vec::new();
        let mut idx = 0;

        while idx < chars.len() {
            if chars[idx].is_whitespace() {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < chars.len() {
                let at_gap = match self.split {
                    ColumnSplit::Whitespace => chars[idx].is_whitespace(),
                    ColumnSplit::Wide => {
                        chars[idx].is_whitespace()
                            && chars.get(idx + 1).is_none_or(|c| c.is_whitespace())
                    }
                };
                if at_gap {
                    break;
                }
                idx += 1;
            }
            let name: String = chars[start..idx].iter().collect();
            columns.push((unique_name(&columns, name.trim()), start));
        }

        columns
    }
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-' || c == '=' || c == '+')
}

/// Disambiguate repeated header names (`Status`, `Status_2`).
fn unique_name(existing: &[(String, usize)], name: &str) -> String {
    if !existing.iter().any(|(n, _)| n == name) {
        return name.to_string();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", name, suffix);
        if !existing.iter().any(|(n, _)| *n == candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn align_row(line: &str, columns: &[(String, usize)], required: usize) -> Result<Record, String> {
    let chars: Vec<char> = line.trim_end().chars().collect();

    let reached = columns
        .iter()
        .take_while(|(_, start)| *start < chars.len())
        .count();
    if reached < required {
        return Err(format!(
            "row has {} of {} columns",
            reached,
            columns.len()
        ));
    }

    for (name, start) in columns.iter().skip(1) {
        let start = *start;
        if start < chars.len() && !chars[start].is_whitespace() && !chars[start - 1].is_whitespace()
        {
            return Err(format!("value straddles the start of column '{}'", name));
        }
    }

    let mut record = Record::new();
    for (idx, (name, start)) in columns.iter().enumerate() {
        let end = columns
            .get(idx + 1)
            .map(|(_, next)| *next)
            .unwrap_or(chars.len());
        let value: String = if *start < chars.len() {
            chars[*start..end.min(chars.len())].iter().collect()
        } else {
            String::new()
        };
        record.insert(name.clone(), value.trim().to_string());
    }
    Ok(record)
}
