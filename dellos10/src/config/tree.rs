//! Indentation-structured configuration text.
//!
//! OS10 prints its configuration as nested sections, one space of indent
//! per level, with `!` lines between sections:
//!
//! ```text
//! interface ethernet1/1/1
//!  description to-spine1
//!  no shutdown
//! !
//! router bgp 65001
//!  neighbor 10.0.0.2
//!   remote-as 65002
//! ```

use std::iter::Peekable;

use serde::{Deserialize, Serialize};

/// One configuration line and the lines nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub line: String,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Find a direct child by exact line.
    pub fn child(&self, line: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.line == line)
    }

    /// Value following `keyword` on the first child line that starts with it.
    pub fn value_of(&self, keyword: &str) -> Option<&str> {
        value_after(&self.children, keyword)
    }

    /// Whether a child line equals `line`.
    pub fn has(&self, line: &str) -> bool {
        self.child(line).is_some()
    }

    /// Flatten back to indented text.
    fn write_lines(&self, depth: usize, out: &mut Vec<String>) {
        out.push(format!("{}{}", " ".repeat(depth), self.line));
        for child in &self.children {
            child.write_lines(depth + 1, out);
        }
    }
}

/// A parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTree {
    pub nodes: Vec<ConfigNode>,
}

impl ConfigTree {
    /// Parse configuration text. Comments (`!`), blank lines and the
    /// navigation keywords `exit`/`end` are dropped.
    pub fn parse(text: &str) -> Self {
        let mut lines = text
            .lines()
            .filter_map(|raw| {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('!') || line == "exit" || line == "end" {
                    return None;
                }
                let indent = raw.len() - raw.trim_start().len();
                Some((indent, line))
            })
            .peekable();

        Self {
            nodes: build(&mut lines, None),
        }
    }

    /// Top-level node with exactly this line.
    pub fn section(&self, line: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.line == line)
    }

    /// Top-level nodes whose line starts with `prefix`.
    pub fn sections_starting_with<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.line.starts_with(prefix))
    }

    /// Value following `keyword` on the first top-level line that starts with it.
    pub fn value_of(&self, keyword: &str) -> Option<&str> {
        value_after(&self.nodes, keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render back to indented text.
    pub fn to_text(&self) -> String {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.write_lines(0, &mut out);
        }
        out.join("\n")
    }
}

fn build<'a, I>(lines: &mut Peekable<I>, parent_indent: Option<usize>) -> Vec<ConfigNode>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut nodes = Vec::new();
    while let Some(&(indent, _)) = lines.peek() {
        if parent_indent.is_some_and(|parent| indent <= parent) {
            break;
        }
        let Some((indent, line)) = lines.next() else {
            break;
        };
        let children = build(lines, Some(indent));
        nodes.push(ConfigNode {
            line: line.to_string(),
            children,
        });
    }
    nodes
}

fn value_after<'a>(nodes: &'a [ConfigNode], keyword: &str) -> Option<&'a str> {
    nodes.iter().find_map(|n| {
        n.line
            .strip_prefix(keyword)
            .filter(|rest| rest.starts_with(' '))
            .map(str::trim)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING: &str = "\
! Version 10.5.1.0
! Last configuration change at Jun  20 18:48:13 2019
!
hostname leaf1
ip domain-name example.net
!
interface ethernet1/1/1
 description to-spine1
 no shutdown
!
router bgp 65001
 router-id 10.0.0.1
 !
 neighbor 10.0.0.2
  remote-as 65002
  no shutdown
";

    #[test]
    fn test_nested_sections() {
        let tree = ConfigTree::parse(RUNNING);
        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(tree.value_of("hostname"), Some("leaf1"));
        assert_eq!(tree.value_of("ip domain-name"), Some("example.net"));

        let bgp = tree.section("router bgp 65001").unwrap();
        assert_eq!(bgp.value_of("router-id"), Some("10.0.0.1"));
        let neighbor = bgp.child("neighbor 10.0.0.2").unwrap();
        assert_eq!(neighbor.value_of("remote-as"), Some("65002"));
        assert!(neighbor.has("no shutdown"));
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let tree = ConfigTree::parse("hostnamefoo bar\nhostname leaf2\n");
        assert_eq!(tree.value_of("hostname"), Some("leaf2"));
    }

    #[test]
    fn test_navigation_keywords_dropped() {
        let tree = ConfigTree::parse("interface vlan100\n description users\n exit\nend\n");
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].children.len(), 1);
        assert_eq!(tree.to_text(), "interface vlan100\n description users");
    }

    #[test]
    fn test_sections_by_prefix() {
        let tree = ConfigTree::parse(RUNNING);
        let interfaces: Vec<_> = tree.sections_starting_with("interface ").collect();
        assert_eq!(interfaces.len(), 1);
    }
}
