//! Merge-semantics diff between a candidate and the running configuration.
//!
//! The candidate is a merge fragment, not a full configuration, so only
//! lines it mentions can change. Lines are matched by content within their
//! section; reordering is never a change.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tree::{ConfigNode, ConfigTree};
use crate::normalize::units;

/// Keywords that hold a single value per section: a new value replaces the
/// old one instead of adding a second line.
const SINGLE_VALUED: &[&str] = &[
    "hostname",
    "ip domain-name",
    "description",
    "mtu",
    "speed",
    "ip address",
    "switchport mode",
    "switchport access vlan",
    "router-id",
    "remote-as",
    "local-as",
    "ebgp-multihop",
    "inherit template",
    "snmp-server contact",
    "snmp-server location",
    "snmp-server chassis-id",
];

/// What happened to one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed { previous: String },
}

/// One changed line and the section it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: ChangeKind,
    /// Parent section lines, outermost first.
    pub path: Vec<String>,
    pub line: String,
}

/// Ordered, section-grouped changes the candidate would make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub changes: Vec<DiffLine>,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn additions(&self) -> impl Iterator<Item = &DiffLine> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Added))
    }

    pub fn removals(&self) -> impl Iterator<Item = &DiffLine> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Removed))
    }

    pub fn modifications(&self) -> impl Iterator<Item = &DiffLine> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Changed { .. }))
    }
}

impl fmt::Display for ConfigDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown: &[String] = &[];
        for change in &self.changes {
            let common = shown
                .iter()
                .zip(&change.path)
                .take_while(|(a, b)| a == b)
                .count();
            for (depth, section) in change.path.iter().enumerate().skip(common) {
                writeln!(f, "  {}{}", " ".repeat(depth), section)?;
            }
            shown = &change.path;

            let indent = " ".repeat(change.path.len());
            match &change.kind {
                ChangeKind::Added => writeln!(f, "+ {}{}", indent, change.line)?,
                ChangeKind::Removed => writeln!(f, "- {}{}", indent, change.line)?,
                ChangeKind::Changed { previous } => {
                    writeln!(f, "- {}{}", indent, previous)?;
                    writeln!(f, "+ {}{}", indent, change.line)?;
                }
            }
        }
        Ok(())
    }
}

/// Compute what merging `candidate` into `running` would change.
pub fn compare(candidate: &ConfigTree, running: &ConfigTree) -> ConfigDiff {
    let mut diff = ConfigDiff::default();
    let mut path = Vec::new();
    diff_level(&candidate.nodes, &running.nodes, &mut path, &mut diff.changes);
    diff
}

fn diff_level(
    candidate: &[ConfigNode],
    running: &[ConfigNode],
    path: &mut Vec<String>,
    out: &mut Vec<DiffLine>,
) {
    for node in candidate {
        if let Some(existing) = running.iter().find(|r| same_line(&r.line, &node.line)) {
            descend(node, existing, path, out);
            continue;
        }

        if let Some(target) = node.line.strip_prefix("no ") {
            let removed = running.iter().find(|r| same_line(&r.line, target)).or_else(|| {
                single_valued_key(target)
                    .filter(|key| *key == target)
                    .and_then(|key| running.iter().find(|r| single_valued_key(&r.line) == Some(key)))
            });
            if let Some(existing) = removed {
                out.push(DiffLine {
                    kind: ChangeKind::Removed,
                    path: path.clone(),
                    line: existing.line.clone(),
                });
            }
            continue;
        }

        let negated = format!("no {}", node.line);
        let previous = running.iter().find(|r| r.line == negated).or_else(|| {
            single_valued_key(&node.line)
                .and_then(|key| running.iter().find(|r| single_valued_key(&r.line) == Some(key)))
        });

        match previous {
            Some(existing) => {
                out.push(DiffLine {
                    kind: ChangeKind::Changed {
                        previous: existing.line.clone(),
                    },
                    path: path.clone(),
                    line: node.line.clone(),
                });
                descend(node, existing, path, out);
            }
            None => {
                out.push(DiffLine {
                    kind: ChangeKind::Added,
                    path: path.clone(),
                    line: node.line.clone(),
                });
                add_all(node, path, out);
            }
        }
    }
}

/// Diff the children of `node` against those of the running section.
///
/// Changes below a matched header are reported under the running spelling.
fn descend(
    node: &ConfigNode,
    running: &ConfigNode,
    path: &mut Vec<String>,
    out: &mut Vec<DiffLine>,
) {
    if node.children.is_empty() {
        return;
    }
    let header = if same_line(&running.line, &node.line) {
        &running.line
    } else {
        &node.line
    };
    path.push(header.clone());
    diff_level(&node.children, &running.children, path, out);
    path.pop();
}

/// Every line below a section the running configuration lacks is new.
fn add_all(node: &ConfigNode, path: &mut Vec<String>, out: &mut Vec<DiffLine>) {
    path.push(node.line.clone());
    for child in &node.children {
        out.push(DiffLine {
            kind: ChangeKind::Added,
            path: path.clone(),
            line: child.line.clone(),
        });
        add_all(child, path, out);
    }
    path.pop();
}

/// Lines are equal, or are `interface` headers naming the same interface.
fn same_line(running: &str, candidate: &str) -> bool {
    if running == candidate {
        return true;
    }
    match (
        running.strip_prefix("interface "),
        candidate.strip_prefix("interface "),
    ) {
        (Some(a), Some(b)) => units::interface_name(a) == units::interface_name(b),
        _ => false,
    }
}

fn single_valued_key(line: &str) -> Option<&'static str> {
    if line.ends_with(" secondary") {
        return None;
    }
    SINGLE_VALUED.iter().copied().find(|key| {
        line == *key
            || line
                .strip_prefix(*key)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = "\
hostname leaf1
!
interface ethernet1/1/1
 description to-spine1
 mtu 9216
 no shutdown
!
interface ethernet1/1/2
 shutdown
!
interface vlan100
 description users
 ip address 10.100.0.1/24
";

    fn diff(candidate: &str) -> ConfigDiff {
        compare(&ConfigTree::parse(candidate), &ConfigTree::parse(RUNNING))
    }

    #[test]
    fn test_identical_candidate_is_empty() {
        assert!(diff(RUNNING).is_empty());
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let candidate = "\
interface ethernet1/1/1
 no shutdown
 mtu 9216
 description to-spine1
hostname leaf1
";
        assert!(diff(candidate).is_empty());
    }

    #[test]
    fn test_single_addition() {
        let d = diff("interface ethernet1/1/1\n switchport access vlan 100\n");
        assert_eq!(d.len(), 1);
        assert_eq!(d.additions().count(), 1);
        assert_eq!(d.changes[0].path, vec!["interface ethernet1/1/1".to_string()]);
        assert_eq!(d.changes[0].line, "switchport access vlan 100");
    }

    #[test]
    fn test_new_section_adds_every_line() {
        let d = diff("interface vlan200\n description voice\n no shutdown\n");
        assert_eq!(d.additions().count(), 3);
        assert_eq!(d.changes[1].path, vec!["interface vlan200".to_string()]);
    }

    #[test]
    fn test_single_valued_change() {
        let d = diff("hostname leaf9\ninterface vlan100\n ip address 10.100.0.2/24\n");
        assert_eq!(d.modifications().count(), 2);
        assert_eq!(
            d.changes[0].kind,
            ChangeKind::Changed {
                previous: "hostname leaf1".to_string()
            }
        );
    }

    #[test]
    fn test_negation_handling() {
        let d = diff(
            "interface ethernet1/1/1\n shutdown\n no description\ninterface ethernet1/1/2\n no shutdown\n",
        );
        assert_eq!(d.len(), 3);
        assert_eq!(
            d.changes[0].kind,
            ChangeKind::Changed {
                previous: "no shutdown".to_string()
            }
        );
        assert_eq!(d.changes[1].kind, ChangeKind::Removed);
        assert_eq!(d.changes[1].line, "description to-spine1");
        assert_eq!(d.changes[2].kind, ChangeKind::Removed);
        assert_eq!(d.changes[2].line, "shutdown");
    }

    #[test]
    fn test_interface_aliases_match_running_section() {
        assert!(diff("interface eth1/1/1\n no shutdown\n").is_empty());
        assert!(diff("interface ethernet 1/1/1\n mtu 9216\n").is_empty());
        assert!(diff("interface Vlan 100\n description users\n").is_empty());

        let d = diff("interface eth1/1/2\n no shutdown\n");
        assert_eq!(d.len(), 1);
        assert_eq!(d.changes[0].path, vec!["interface ethernet1/1/2".to_string()]);
        assert_eq!(d.changes[0].kind, ChangeKind::Removed);
    }

    #[test]
    fn test_negating_absent_line_is_noop() {
        assert!(diff("interface vlan100\n no shutdown\n").is_empty());
    }

    #[test]
    fn test_display_groups_by_section() {
        let d = diff("interface ethernet1/1/1\n mtu 1500\n switchport access vlan 10\n");
        let text = d.to_string();
        assert_eq!(
            text,
            "  interface ethernet1/1/1\n-  mtu 9216\n+  mtu 1500\n+  switchport access vlan 10\n"
        );
    }
}
