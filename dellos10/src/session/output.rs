//! Raw command output as returned by the session.

use std::time::Duration;

use bytes::Bytes;

/// Output of one executed command, before any parsing.
#[derive(Debug, Clone)]
pub struct RawOutput {
    /// The command that was executed.
    pub command: String,

    /// The payload exactly as the session returned it.
    pub body: Bytes,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the output matched a failure pattern.
    pub failure_message: Option<String>,
}

impl RawOutput {
    /// Wrap a session payload, checking it against the platform's failure patterns.
    pub fn new(
        command: impl Into<String>,
        body: Bytes,
        elapsed: Duration,
        failed_when_contains: &[String],
    ) -> Self {
        let mut output = Self {
            command: command.into(),
            body,
            elapsed,
            failure_message: None,
        };
        output.failure_message = failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern))
            .map(|_| output.text().trim().to_string());
        output
    }

    /// Check if the output indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// The payload as text. Invalid UTF-8 is replaced, never rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Check if the output contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        !pattern.is_empty()
            && self
                .body
                .windows(pattern.len())
                .any(|window| window == pattern.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

impl std::fmt::Display for RawOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}
