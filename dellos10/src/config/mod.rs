//! Configuration transactions.
//!
//! OS10 has no multi-step commit primitive, so the driver keeps the staged
//! candidate itself and only ever sends it to the device as one block.
//!
//! ```text
//!            load_merge_candidate
//!   Empty ─────────────────────────► Loaded ──commit (ack)──► Committed
//!     ▲                              │  ▲                         │
//!     │                              │  └── commit (nack) ────────┤
//!     │                       discard│                            │
//!     │                              ▼                            │
//!     └──────────── load ◄──── Discarded ◄──────── load ──────────┘
//! ```
//!
//! [`ConfigTransaction`] is the pure state machine: it never talks to the
//! device. The driver performs the I/O and reports outcomes back through
//! revision-checked transitions.

pub mod diff;
pub mod tree;

pub use diff::{ChangeKind, ConfigDiff, DiffLine};
pub use tree::{ConfigNode, ConfigTree};

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lifecycle state of the staged candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateState {
    #[default]
    Empty,
    Loaded,
    Committed,
    Discarded,
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateState::Empty => write!(f, "empty"),
            CandidateState::Loaded => write!(f, "loaded"),
            CandidateState::Committed => write!(f, "committed"),
            CandidateState::Discarded => write!(f, "discarded"),
        }
    }
}

/// A copy of the staged candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub revision: u64,
    pub text: String,
}

/// Per-session candidate state machine.
#[derive(Debug, Default)]
pub struct ConfigTransaction {
    state: CandidateState,
    revision: u64,
    candidate: Option<String>,
}

impl ConfigTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CandidateState {
        self.state
    }

    /// Revision of the most recently loaded candidate (0 before any load).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Stage `text` verbatim. Allowed from every state except `Loaded`.
    pub fn load(&mut self, text: impl Into<String>) -> Result<u64, ConfigError> {
        if self.state() == CandidateState::Loaded {
            return Err(ConfigError::CandidateAlreadyLoaded {
                revision: self.revision,
            });
        }
        self.revision += 1;
        self.candidate = Some(text.into());
        self.state = CandidateState::Loaded;
        debug!("candidate revision {} loaded", self.revision);
        Ok(self.revision)
    }

    /// Copy of the staged candidate, for an operation that requires one.
    pub fn staged(&self, operation: &str) -> Result<Candidate, ConfigError> {
        match (&self.candidate, self.state()) {
            (Some(text), CandidateState::Loaded) => Ok(Candidate {
                revision: self.revision,
                text: text.clone(),
            }),
            (_, state) => Err(self.invalid(operation, state)),
        }
    }

    /// Record a device acknowledgement for `revision` and clear the text.
    pub fn mark_committed(&mut self, revision: u64) -> Result<(), ConfigError> {
        self.expect_revision("commit", revision)?;
        self.candidate = None;
        self.state = CandidateState::Committed;
        debug!("candidate revision {} committed", revision);
        Ok(())
    }

    /// Drop the staged candidate without touching the device.
    pub fn discard(&mut self) -> Result<u64, ConfigError> {
        let revision = self.staged("discard")?.revision;
        self.candidate = None;
        self.state = CandidateState::Discarded;
        debug!("candidate revision {} discarded", revision);
        Ok(revision)
    }

    fn expect_revision(&self, operation: &str, revision: u64) -> Result<(), ConfigError> {
        let staged = self.staged(operation)?;
        if staged.revision != revision {
            return Err(ConfigError::InvalidStateTransition {
                operation: operation.to_string(),
                state: format!(
                    "{} at revision {} (expected {})",
                    CandidateState::Loaded,
                    staged.revision,
                    revision
                ),
            });
        }
        Ok(())
    }

    fn invalid(&self, operation: &str, state: CandidateState) -> ConfigError {
        ConfigError::InvalidStateTransition {
            operation: operation.to_string(),
            state: state.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let tx = ConfigTransaction::new();
        assert_eq!(tx.state(), CandidateState::Empty);
        assert_eq!(tx.revision(), 0);
        assert!(matches!(
            tx.staged("compare"),
            Err(ConfigError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_load_twice_rejected() {
        let mut tx = ConfigTransaction::new();
        assert_eq!(tx.load("hostname a").unwrap(), 1);
        let err = tx.load("hostname b").unwrap_err();
        assert!(matches!(err, ConfigError::CandidateAlreadyLoaded { revision: 1 }));
        assert_eq!(tx.staged("compare").unwrap().text, "hostname a");
    }

    #[test]
    fn test_commit_clears_candidate() {
        let mut tx = ConfigTransaction::new();
        let rev = tx.load("hostname a").unwrap();
        tx.mark_committed(rev).unwrap();
        assert_eq!(tx.state(), CandidateState::Committed);
        assert!(tx.staged("compare").is_err());
        assert!(tx.mark_committed(rev).is_err());
    }

    #[test]
    fn test_stale_revision_rejected() {
        let mut tx = ConfigTransaction::new();
        let first = tx.load("hostname a").unwrap();
        tx.discard().unwrap();
        let second = tx.load("hostname b").unwrap();
        assert!(second > first);

        let err = tx.mark_committed(first).unwrap_err();
        assert!(err.to_string().contains("expected 1"));
        assert_eq!(tx.state(), CandidateState::Loaded);
    }

    #[test]
    fn test_discard_from_empty_rejected() {
        let mut tx = ConfigTransaction::new();
        let err = tx.discard().unwrap_err();
        assert_eq!(err.to_string(), "Cannot discard while candidate is empty");
    }

    #[test]
    fn test_terminal_states_accept_new_load() {
        let mut tx = ConfigTransaction::new();
        tx.load("a").unwrap();
        tx.discard().unwrap();
        assert_eq!(tx.state(), CandidateState::Discarded);
        tx.load("b").unwrap();
        let rev = tx.revision();
        tx.mark_committed(rev).unwrap();
        assert_eq!(tx.load("c").unwrap(), 3);
    }
}
