//! Bridge between the system register (`"+` / `"*`) and the host clipboard.

use anyhow::Result;

/// Host clipboard access. Only the system register goes through this trait;
/// every other register lives in memory for the lifetime of the session.
pub trait Clipboard {
    fn get_text(&mut self) -> Result<Option<String>>;
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Process-local clipboard used when the host provides none (and in tests).
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Result<Option<String>> {
        Ok(self.text.clone())
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }
}
