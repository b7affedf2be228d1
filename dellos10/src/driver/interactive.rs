//! Prompt handling for commands that ask questions.
//!
//! `image upgrade` stops to ask whether to save the configuration and
//! whether to reboot. Each [`InteractiveEvent`] pairs a prompt pattern with
//! the answer to send when the last output matches it.

use std::time::Duration;

use regex::Regex;

/// One prompt and its answer.
///
/// # Example
///
/// ```rust
/// use dellos10::driver::InteractiveEvent;
///
/// let event = InteractiveEvent::new(r"Proceed with upgrade and reboot", "yes");
/// assert!(event.matches("Proceed with upgrade and reboot? [yes/no]:"));
/// ```
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    /// Pattern that identifies the prompt.
    pub prompt: Regex,

    /// Text sent when the prompt is seen.
    pub answer: String,
}

impl InteractiveEvent {
    /// Create a new interactive event.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regex. Use `try_new` for fallible creation.
    pub fn new(prompt: &str, answer: impl Into<String>) -> Self {
        Self {
            prompt: Regex::new(prompt).expect("Invalid regex pattern"),
            answer: answer.into(),
        }
    }

    /// Create a new interactive event, returning an error if the pattern is invalid.
    pub fn try_new(prompt: &str, answer: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            prompt: Regex::new(prompt)?,
            answer: answer.into(),
        })
    }

    /// Event for a prompt given as literal text.
    pub fn literal(prompt: &str, answer: impl Into<String>) -> Self {
        Self::new(&regex::escape(prompt), answer)
    }

    pub fn matches(&self, output: &str) -> bool {
        self.prompt.is_match(output)
    }
}

/// Result of an interactive command sequence.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    /// The command followed by every answer, in order.
    pub steps: Vec<InteractiveStep>,

    /// Total time for the entire sequence.
    pub elapsed: Duration,
}

impl InteractiveResult {
    pub fn new(steps: Vec<InteractiveStep>, elapsed: Duration) -> Self {
        Self { steps, elapsed }
    }

    /// Output of the command itself, before any answer.
    pub fn first_output(&self) -> Option<&str> {
        self.steps.first().map(|s| s.output.as_str())
    }

    /// Get the final output (from the last step).
    pub fn final_output(&self) -> Option<&str> {
        self.steps.last().map(|s| s.output.as_str())
    }

    /// Get all outputs concatenated.
    pub fn full_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.output.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One input and what the device printed in response.
#[derive(Debug, Clone)]
pub struct InteractiveStep {
    pub input: String,
    pub output: String,
    pub elapsed: Duration,
}

impl InteractiveStep {
    pub fn new(input: impl Into<String>, output: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            elapsed,
        }
    }
}

/// Index of the first unanswered event whose prompt appears in `output`.
pub(crate) fn next_prompt(events: &[InteractiveEvent], answered: &[bool], output: &str) -> Option<usize> {
    events
        .iter()
        .enumerate()
        .find(|(idx, event)| !answered[*idx] && event.matches(output))
        .map(|(idx, _)| idx)
}
