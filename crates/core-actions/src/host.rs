//! Collaborators supplied by the host application: where status messages go
//! and how `:w` / `:q` reach the outside world.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Receives user-facing status messages.
pub trait StatusSink {
    fn post(&mut self, message: StatusMessage);
}

/// In-memory sink keeping every message.
#[derive(Debug, Default, Clone)]
pub struct StatusLog {
    pub messages: Vec<StatusMessage>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&StatusMessage> {
        self.messages.last()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.text.as_str()).collect()
    }
}

impl StatusSink for StatusLog {
    fn post(&mut self, message: StatusMessage) {
        self.messages.push(message);
    }
}

impl<T: StatusSink> StatusSink for Rc<RefCell<T>> {
    fn post(&mut self, message: StatusMessage) {
        self.borrow_mut().post(message);
    }
}

/// Side effects of ex commands.
pub trait ExHost {
    /// Persist the buffer text.
    fn save(&mut self, text: &str) -> anyhow::Result<()>;
    /// The session asked to close.
    fn quit(&mut self);
}

/// Host keeping saves in memory; can be told to fail saves.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    pub saved: Vec<String>,
    pub quit_requested: bool,
    pub fail_saves: bool,
}

impl ExHost for MemoryHost {
    fn save(&mut self, text: &str) -> anyhow::Result<()> {
        if self.fail_saves {
            anyhow::bail!("storage unavailable");
        }
        self.saved.push(text.to_string());
        Ok(())
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}

impl<T: ExHost> ExHost for Rc<RefCell<T>> {
    fn save(&mut self, text: &str) -> anyhow::Result<()> {
        self.borrow_mut().save(text)
    }

    fn quit(&mut self) {
        self.borrow_mut().quit();
    }
}

/// Status sink wrapper remembering the latest message for the session.
pub struct Notifier {
    sink: Box<dyn StatusSink>,
    last: Option<StatusMessage>,
}

impl Notifier {
    pub fn new(sink: Box<dyn StatusSink>) -> Self {
        Self { sink, last: None }
    }

    pub fn post(&mut self, message: StatusMessage) {
        tracing::debug!(target: "actions.dispatch", kind = ?message.kind, text = %message.text, "status");
        self.last = Some(message.clone());
        self.sink.post(message);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.post(StatusMessage::info(text));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.post(StatusMessage::error(text));
    }

    pub fn last(&self) -> Option<&StatusMessage> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_log_sees_notifier_posts() {
        let log = Rc::new(RefCell::new(StatusLog::new()));
        let mut notifier = Notifier::new(Box::new(log.clone()));
        notifier.info("3 fewer lines");
        notifier.error("Mark not set");
        assert_eq!(log.borrow().texts(), vec!["3 fewer lines", "Mark not set"]);
        assert_eq!(notifier.last().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn memory_host_can_fail() {
        let mut host = MemoryHost {
            fail_saves: true,
            ..MemoryHost::default()
        };
        assert!(host.save("x").is_err());
        host.fail_saves = false;
        host.save("x").unwrap();
        assert_eq!(host.saved, vec!["x".to_string()]);
    }
}
