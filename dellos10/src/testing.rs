//! In-memory session for driver tests.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use crate::error::TransportError;
use crate::session::{ApplyAck, DeviceSession};

/// Route `log` output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
enum Reply {
    Output(String),
    Disconnect,
}

/// Answers commands from a script and records everything it was asked.
#[derive(Debug)]
pub struct ScriptedSession {
    replies: HashMap<String, Reply>,
    ack: Mutex<Option<ApplyAck>>,
    executed: Mutex<Vec<String>>,
    applied: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            ack: Mutex::new(Some(ApplyAck::accepted())),
            executed: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Answer `command` with `output`.
    pub fn reply(mut self, command: &str, output: &str) -> Self {
        self.replies
            .insert(command.to_string(), Reply::Output(output.to_string()));
        self
    }

    /// Fail `command` as if the connection dropped.
    pub fn disconnect_on(mut self, command: &str) -> Self {
        self.replies.insert(command.to_string(), Reply::Disconnect);
        self
    }

    /// Acknowledgement returned by `apply`; `None` drops the connection.
    pub fn ack(self, ack: Option<ApplyAck>) -> Self {
        *self.ack.lock().unwrap() = ack;
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

impl DeviceSession for ScriptedSession {
    async fn execute(&self, command: &str) -> Result<Bytes, TransportError> {
        self.executed.lock().unwrap().push(command.to_string());
        match self.replies.get(command) {
            Some(Reply::Output(text)) => Ok(Bytes::from(text.clone())),
            Some(Reply::Disconnect) => Err(TransportError::Disconnected),
            None => Err(TransportError::Session {
                message: format!("unscripted command '{}'", command),
            }),
        }
    }

    async fn apply(&self, config: &str) -> Result<ApplyAck, TransportError> {
        self.applied.lock().unwrap().push(config.to_string());
        self.ack
            .lock()
            .unwrap()
            .clone()
            .ok_or(TransportError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_scripted_replies_and_records() {
        let session = ScriptedSession::new()
            .reply("show version", "OS Version: 10.4.3.1")
            .disconnect_on("show clock");

        let body = block_on(session.execute("show version")).unwrap();
        assert_eq!(&body[..], b"OS Version: 10.4.3.1");
        assert!(matches!(
            block_on(session.execute("show clock")),
            Err(TransportError::Disconnected)
        ));
        assert!(matches!(
            block_on(session.execute("reload")),
            Err(TransportError::Session { .. })
        ));
        assert_eq!(session.executed(), vec!["show version", "show clock", "reload"]);
    }

    #[test]
    fn test_apply_without_ack_disconnects() {
        let session = ScriptedSession::new().ack(None);
        assert!(block_on(session.apply("hostname leaf1")).is_err());
        assert_eq!(session.applied(), vec!["hostname leaf1"]);
    }
}
