//! Key events consumed by the modal session.
//!
//! A `KeyEvent` is one logical key plus modifier flags. Hosts translate their
//! native key events into this form; tests and the driver binary build them from
//! Vim key notation (`"3dd<Esc>:wq<CR>"`) via [`parse_keys`].

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

/// Normalized logical keys. Printable input (including `:` and space) always
/// arrives as `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Plain printable key without modifiers.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Printable character when no Ctrl/Alt chord is involved.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.has_chord_modifier() => Some(c),
            _ => None,
        }
    }

    /// True when Ctrl or Alt is held (Shift alone is folded into the character).
    pub fn has_chord_modifier(&self) -> bool {
        self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyNotationError {
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
}

/// Parse Vim key notation into events.
///
/// Plain characters map to themselves. Bracketed names (`<Esc>`, `<CR>`,
/// `<BS>`, `<C-r>`, `<lt>` ...) are case-insensitive. A `<` that does not open
/// a key name (`<<`, `<a>`, an unclosed `<`) is taken literally; an unknown
/// multi-letter name is an error so typos in key scripts surface.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, KeyNotationError> {
    let mut out = Vec::new();
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(close) = rest[1..].find('>')
            && let Some(key) = parse_named(&rest[1..1 + close])?
        {
            out.push(key);
            rest = &rest[close + 2..];
            continue;
        }
        out.push(KeyEvent::char(c));
        rest = &rest[c.len_utf8()..];
    }
    Ok(out)
}

/// `Ok(None)` means the bracket text is not a key name and should be read literally.
fn parse_named(name: &str) -> Result<Option<KeyEvent>, KeyNotationError> {
    if name.is_empty() || name.contains('<') {
        return Ok(None);
    }
    let mut mods = KeyModifiers::empty();
    let mut base = name;
    while base.len() > 2 && base.as_bytes()[1] == b'-' {
        let flag = match base.as_bytes()[0].to_ascii_uppercase() {
            b'C' => KeyModifiers::CTRL,
            b'A' | b'M' => KeyModifiers::ALT,
            b'S' => KeyModifiers::SHIFT,
            _ => break,
        };
        mods |= flag;
        base = &base[2..];
    }
    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if mods.is_empty() {
            return Ok(None);
        }
        return Ok(Some(KeyEvent::new(KeyCode::Char(c), mods)));
    }
    let code = match base.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        _ => return Err(KeyNotationError::UnknownKey(name.to_string())),
    };
    Ok(Some(KeyEvent::new(code, mods)))
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            KeyCode::Char(c) => {
                if !self.has_chord_modifier() {
                    return match c {
                        '<' => f.write_str("<lt>"),
                        ' ' => f.write_str("<Space>"),
                        _ => write!(f, "{c}"),
                    };
                }
                c.to_string()
            }
            KeyCode::Enter => "CR".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Backspace => "BS".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
        };
        f.write_str("<")?;
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            f.write_str("S-")?;
        }
        write!(f, "{name}>")
    }
}

/// Render a key sequence in Vim notation (used for pending-key display).
pub fn format_keys<'a>(keys: impl IntoIterator<Item = &'a KeyEvent>) -> String {
    keys.into_iter().map(|k| k.to_string()).collect()
}
