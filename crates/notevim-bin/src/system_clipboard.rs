//! Desktop clipboard for the `"+` / `"*` registers.

use anyhow::Result;
use core_state::Clipboard;

pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Result<Option<String>> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner.set_text(text.to_owned())?;
        Ok(())
    }
}
