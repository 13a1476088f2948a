#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{KeyResult, MemoryHost, Session, StatusLog};
use core_text::{Buffer, Position};
use std::cell::RefCell;
use std::rc::Rc;

/// Session over `text` with the cursor at the origin.
pub fn session(text: &str) -> Session {
    Session::new(Buffer::from_str("note", text).unwrap())
}

/// Session whose status messages and ex side effects are observable.
pub struct Harness {
    pub session: Session,
    pub log: Rc<RefCell<StatusLog>>,
    pub host: Rc<RefCell<MemoryHost>>,
}

impl Harness {
    pub fn new(text: &str) -> Self {
        let log = Rc::new(RefCell::new(StatusLog::new()));
        let host = Rc::new(RefCell::new(MemoryHost::default()));
        let session = session(text)
            .with_status_sink(log.clone())
            .with_host(host.clone());
        Self { session, log, host }
    }

    pub fn keys(&mut self, notation: &str) -> Vec<KeyResult> {
        self.session.feed(notation).unwrap()
    }

    pub fn messages(&self) -> Vec<String> {
        self.log
            .borrow()
            .messages
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.log.borrow().last().map(|m| m.text.clone())
    }

    pub fn text(&self) -> String {
        self.session.text()
    }

    pub fn cursor(&self) -> Position {
        self.session.cursor()
    }

    pub fn unnamed(&self) -> String {
        self.session.state().registers.unnamed().content.clone()
    }
}

/// Feed keys to a fresh session and return the resulting text.
pub fn apply(text: &str, keys: &str) -> String {
    let mut s = session(text);
    s.feed(keys).unwrap();
    s.text()
}

/// `n` numbered lines: "line 1\n" ... "line n\n".
pub fn numbered_lines(n: usize) -> String {
    (1..=n).map(|i| format!("line {i}\n")).collect()
}
