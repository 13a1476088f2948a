//! Register store: unnamed, numbered (`0`-`9`), named (`a`-`z`, uppercase
//! appends), the system clipboard register and the black hole.
//!
//! Linewise content is always stored with every line newline-terminated;
//! put logic never checks whether it ends in a newline.

use crate::clipboard::{Clipboard, MemoryClipboard};
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegisterKind {
    #[default]
    Characterwise,
    Linewise,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Register {
    pub content: String,
    pub kind: RegisterKind,
}

impl Register {
    pub fn characterwise(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: RegisterKind::Characterwise,
        }
    }

    /// Linewise register; a missing final newline is added.
    pub fn linewise(content: impl Into<String>) -> Self {
        let mut content = content.into();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Self {
            content,
            kind: RegisterKind::Linewise,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_linewise(&self) -> bool {
        self.kind == RegisterKind::Linewise
    }

    /// Number of lines a linewise register spans (0 for characterwise).
    pub fn line_count(&self) -> usize {
        match self.kind {
            RegisterKind::Linewise => self.content.matches('\n').count(),
            RegisterKind::Characterwise => 0,
        }
    }

    fn append(&mut self, other: Register) {
        match (self.kind, other.kind) {
            (RegisterKind::Characterwise, RegisterKind::Characterwise) => {
                self.content.push_str(&other.content)
            }
            (RegisterKind::Linewise, RegisterKind::Characterwise) => {
                self.content.push_str(&other.content);
                self.content.push('\n');
            }
            (RegisterKind::Characterwise, RegisterKind::Linewise) => {
                self.content.push('\n');
                self.content.push_str(&other.content);
                self.kind = RegisterKind::Linewise;
            }
            (RegisterKind::Linewise, RegisterKind::Linewise) => {
                self.content.push_str(&other.content)
            }
        }
    }
}

/// Register selector as typed after `"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterName {
    Unnamed,
    /// `slot` is always lowercase; `append` is set for the uppercase spelling.
    Named { slot: char, append: bool },
    Numbered(u8),
    /// `+` or `*`.
    Clipboard,
    /// `_`: writes are discarded, reads are empty.
    BlackHole,
}

impl RegisterName {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Unnamed),
            'a'..='z' => Some(Self::Named {
                slot: c,
                append: false,
            }),
            'A'..='Z' => Some(Self::Named {
                slot: c.to_ascii_lowercase(),
                append: true,
            }),
            '0'..='9' => Some(Self::Numbered(c as u8 - b'0')),
            '+' | '*' => Some(Self::Clipboard),
            '_' => Some(Self::BlackHole),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match *self {
            Self::Unnamed => '"',
            Self::Named { slot, append } => {
                if append {
                    slot.to_ascii_uppercase()
                } else {
                    slot
                }
            }
            Self::Numbered(n) => char::from(b'0' + n),
            Self::Clipboard => '+',
            Self::BlackHole => '_',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("Nothing in register {0}")]
    Empty(char),
}

pub struct Registers {
    unnamed: Register,
    numbered: [Register; 10],
    named: [Register; 26],
    clipboard: Box<dyn Clipboard>,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registers")
            .field("unnamed", &self.unnamed)
            .field("numbered", &self.numbered)
            .field("named", &self.named)
            .finish_non_exhaustive()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self::with_clipboard(Box::new(MemoryClipboard::new()))
    }

    pub fn with_clipboard(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            unnamed: Register::default(),
            numbered: std::array::from_fn(|_| Register::default()),
            named: std::array::from_fn(|_| Register::default()),
            clipboard,
        }
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn unnamed(&self) -> &Register {
        &self.unnamed
    }

    /// Numbered registers `0`-`9`.
    pub fn numbered(&self) -> &[Register] {
        &self.numbered
    }

    pub fn named(&self, slot: char) -> Option<&Register> {
        let slot = slot.to_ascii_lowercase();
        slot.is_ascii_lowercase()
            .then(|| &self.named[(slot as u8 - b'a') as usize])
    }

    /// Non-empty in-memory registers in display order (`"`, `0`-`9`, `a`-`z`).
    pub fn snapshot(&self) -> Vec<(char, Register)> {
        let mut out = Vec::new();
        if !self.unnamed.is_empty() {
            out.push(('"', self.unnamed.clone()));
        }
        for (idx, reg) in self.numbered.iter().enumerate() {
            if !reg.is_empty() {
                out.push((char::from(b'0' + idx as u8), reg.clone()));
            }
        }
        for (idx, reg) in self.named.iter().enumerate() {
            if !reg.is_empty() {
                out.push((char::from(b'a' + idx as u8), reg.clone()));
            }
        }
        out
    }

    /// Write `reg` into an explicit target. Returns the register now held by
    /// that target (after append), which the unnamed register then mirrors.
    fn write_target(&mut self, target: RegisterName, reg: Register) -> Register {
        match target {
            RegisterName::Unnamed | RegisterName::BlackHole => reg,
            RegisterName::Named { slot, append } => {
                let entry = &mut self.named[(slot as u8 - b'a') as usize];
                if append && !entry.is_empty() {
                    entry.append(reg);
                } else {
                    *entry = reg;
                }
                entry.clone()
            }
            RegisterName::Numbered(n) => {
                self.numbered[usize::from(n)] = reg.clone();
                reg
            }
            RegisterName::Clipboard => {
                if let Err(err) = self.clipboard.set_text(&reg.content) {
                    warn!(target: "state.registers", error = %err, "clipboard_write_failed");
                }
                reg
            }
        }
    }

    /// Yank: target (if any), unnamed, and register `0` when no register was named.
    pub fn record_yank(&mut self, target: Option<RegisterName>, reg: Register) {
        if target == Some(RegisterName::BlackHole) {
            return;
        }
        match target {
            None | Some(RegisterName::Unnamed) => {
                self.numbered[0] = reg.clone();
                self.unnamed = reg;
            }
            Some(t) => self.unnamed = self.write_target(t, reg),
        }
        trace!(target: "state.registers", kind = ?self.unnamed.kind, len = self.unnamed.content.len(), "record_yank");
    }

    /// Delete/change: target (if any) and unnamed; linewise or multi-line
    /// payloads shift `1`..`8` into `2`..`9` and land in `1`.
    pub fn record_delete(&mut self, target: Option<RegisterName>, reg: Register) {
        if target == Some(RegisterName::BlackHole) {
            return;
        }
        let shifts = reg.is_linewise() || reg.content.contains('\n');
        if shifts {
            self.numbered[1..].rotate_right(1);
            self.numbered[1] = reg.clone();
        }
        self.unnamed = match target {
            None | Some(RegisterName::Unnamed) => reg,
            Some(t) => self.write_target(t, reg),
        };
        trace!(target: "state.registers", kind = ?self.unnamed.kind, len = self.unnamed.content.len(), shifted = shifts, "record_delete");
    }

    /// Read a register for put. Empty registers are an error the caller reports.
    pub fn read(&mut self, name: RegisterName) -> Result<Register, RegisterError> {
        let reg = match name {
            RegisterName::Unnamed => self.unnamed.clone(),
            RegisterName::Named { slot, .. } => self.named[(slot as u8 - b'a') as usize].clone(),
            RegisterName::Numbered(n) => self.numbered[usize::from(n)].clone(),
            RegisterName::BlackHole => Register::default(),
            RegisterName::Clipboard => match self.clipboard.get_text() {
                Ok(Some(text)) if text.ends_with('\n') => Register::linewise(text),
                Ok(Some(text)) => Register::characterwise(text),
                Ok(None) => Register::default(),
                Err(err) => {
                    warn!(target: "state.registers", error = %err, "clipboard_read_failed");
                    Register::default()
                }
            },
        };
        if reg.is_empty() {
            return Err(RegisterError::Empty(name.as_char()));
        }
        Ok(reg)
    }
}
