//! Text buffer interface and the rope-backed implementation used by the session.
//!
//! The modal layer never owns the host's storage type directly; it talks to a
//! [`TextBuffer`]. Positions are zero-based `(line, byte)` pairs where `byte`
//! is an offset into the line content (newline excluded) that always sits on a
//! grapheme boundary once normalized by the motion helpers.

use anyhow::Result;
use ropey::Rope;

pub mod motion;
pub mod object;

/// A position inside a buffer expressed as (line index, byte offset within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.byte = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.byte > max_len {
            self.byte = max_len;
        }
    }
}

/// Storage contract the modal layer edits through.
///
/// Line numbering follows the editor view of the text: a trailing newline
/// terminates the last line instead of opening an empty one, and an empty
/// buffer still has one (empty) line. All byte offsets are absolute UTF-8
/// offsets on character boundaries.
pub trait TextBuffer {
    fn line_count(&self) -> usize;

    /// Line text including its trailing newline when present.
    fn line(&self, idx: usize) -> Option<String>;

    fn len_bytes(&self) -> usize;

    /// Absolute offset of the first byte of `line`. `line == line_count()`
    /// yields the end of the text.
    fn line_to_byte(&self, line: usize) -> usize;

    /// Line containing the absolute offset, clamped to the last line.
    fn byte_to_line(&self, byte: usize) -> usize;

    fn slice_bytes(&self, start: usize, end: usize) -> String;

    fn insert_str(&mut self, at: usize, text: &str);

    /// Remove `[start, end)` and return the removed text.
    fn delete_bytes(&mut self, start: usize, end: usize) -> String;

    /// Line text without the trailing newline.
    fn line_content(&self, idx: usize) -> String {
        let mut s = self.line(idx).unwrap_or_default();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Byte length of a line excluding the newline.
    fn line_byte_len(&self, idx: usize) -> usize {
        self.line_content(idx).len()
    }

    fn absolute(&self, pos: Position) -> usize {
        self.line_to_byte(pos.line) + pos.byte
    }

    /// Inverse of [`TextBuffer::absolute`]; offsets on a newline map to the end of that line.
    fn position_of(&self, byte: usize) -> Position {
        let line = self.byte_to_line(byte);
        let within = byte.saturating_sub(self.line_to_byte(line));
        Position::new(line, within.min(self.line_byte_len(line)))
    }

    fn text(&self) -> String {
        self.slice_bytes(0, self.len_bytes())
    }

    fn ends_with_newline(&self) -> bool {
        let len = self.len_bytes();
        len > 0 && self.slice_bytes(len - 1, len) == "\n"
    }

    /// Start of the not-yet-existing line after a final newline. Text typed
    /// here becomes a new unterminated last line.
    fn is_open_tail(&self, pos: Position) -> bool {
        pos.byte == 0 && pos.line == self.line_count() && self.ends_with_newline()
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    fn char_index(&self, byte: usize) -> usize {
        self.rope.byte_to_char(byte.min(self.rope.len_bytes()))
    }
}

impl TextBuffer for Buffer {
    fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        let len = self.rope.len_chars();
        if len > 0 && self.rope.char(len - 1) == '\n' {
            lines - 1
        } else {
            lines
        }
    }

    fn line(&self, idx: usize) -> Option<String> {
        if idx < self.line_count() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn line_to_byte(&self, line: usize) -> usize {
        self.rope.line_to_byte(line.min(self.rope.len_lines()))
    }

    fn byte_to_line(&self, byte: usize) -> usize {
        let line = self.rope.byte_to_line(byte.min(self.rope.len_bytes()));
        line.min(self.line_count().saturating_sub(1))
    }

    /// Return the UTF-8 slice in the absolute byte range `[start,end)` (clamped).
    fn slice_bytes(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        let s = self.char_index(start);
        let e = self.char_index(end);
        self.rope.slice(s..e).to_string()
    }

    fn insert_str(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = self.char_index(at);
        self.rope.insert(idx, text);
    }

    fn delete_bytes(&mut self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        let s = self.char_index(start);
        let e = self.char_index(end);
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        removed
    }
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Grapheme cluster starting at `byte`, if any.
    pub fn at(line: &str, byte: usize) -> Option<&str> {
        if byte >= line.len() {
            return None;
        }
        Some(&line[byte..next_boundary(line, byte)])
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_width(g);
        }
        col
    }

    /// Width in terminal cells of this grapheme cluster (tabs count as one cell).
    pub fn cluster_width(g: &str) -> usize {
        if g == "\t" {
            return 1;
        }
        g.width().max(usize::from(!g.is_empty()))
    }

    /// Keyword classification: alphanumeric or underscore start.
    pub fn is_word(g: &str) -> bool {
        g.chars()
            .next()
            .map(|c| c == '_' || c.is_alphanumeric())
            .unwrap_or(false)
    }

    pub fn is_blank(g: &str) -> bool {
        g.chars().next().is_some_and(char::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::grapheme;
    use super::*;
    use unicode_segmentation::UnicodeSegmentation;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "hello\n");
        assert_eq!(b.line(1).unwrap(), "world");
    }

    #[test]
    fn trailing_newline_terminates_last_line() {
        let b = Buffer::from_str("t", "a\nb\n").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(1).unwrap(), "b\n");
        assert!(b.line(2).is_none());
        assert_eq!(b.line_to_byte(2), b.len_bytes());
        assert!(b.ends_with_newline());
    }

    #[test]
    fn open_tail_only_after_final_newline() {
        let b = Buffer::from_str("t", "a\n").unwrap();
        assert!(b.is_open_tail(Position::new(1, 0)));
        assert!(!b.is_open_tail(Position::new(0, 0)));
        assert!(!b.is_open_tail(Position::new(1, 1)));
        let b = Buffer::from_str("t", "a").unwrap();
        assert!(!b.is_open_tail(Position::new(1, 0)));
        let b = Buffer::from_str("t", "").unwrap();
        assert!(!b.is_open_tail(Position::new(1, 0)));
    }

    #[test]
    fn empty_buffer_has_one_line() {
        let b = Buffer::from_str("t", "").unwrap();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_byte_len(0), 0);
        assert_eq!(b.position_of(0), Position::origin());
    }

    #[test]
    fn position_absolute_round_trip() {
        let b = Buffer::from_str("t", "héllo\nwörld\n").unwrap();
        let pos = Position::new(1, 3);
        let abs = b.absolute(pos);
        assert_eq!(abs, "héllo\n".len() + 3);
        assert_eq!(b.position_of(abs), pos);
        // the terminating newline maps to the end of its line
        assert_eq!(b.position_of(b.len_bytes()), Position::new(1, "wörld".len()));
    }

    #[test]
    fn insert_and_delete_bytes() {
        let mut b = Buffer::from_str("t", "abcd").unwrap();
        b.insert_str(2, "X\n");
        assert_eq!(b.text(), "abX\ncd");
        assert_eq!(b.line_count(), 2);
        let removed = b.delete_bytes(1, 4);
        assert_eq!(removed, "bX\n");
        assert_eq!(b.text(), "acd");
    }

    #[test]
    fn grapheme_basic_emoji() {
        let s = "a😀b";
        let bytes_emoji = grapheme::next_boundary(s, 0);
        let after = grapheme::next_boundary(s, bytes_emoji);
        assert_eq!(grapheme::prev_boundary(s, after), bytes_emoji);
        assert_eq!(grapheme::at(s, bytes_emoji), Some("😀"));
        assert!(grapheme::visual_col(s, after) >= 2);
    }

    #[test]
    fn grapheme_combining_mark() {
        let s = "e\u{301}";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(nb, s.len());
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
    }

    #[test]
    fn visual_col_is_monotonic() {
        let s = "a😀e\u{301}漢字Z";
        let mut b = 0;
        let mut last_col = 0;
        while b < s.len() {
            let next = grapheme::next_boundary(s, b);
            let col = grapheme::visual_col(s, next);
            assert!(col >= last_col, "visual column must be non-decreasing");
            last_col = col;
            b = next;
        }
        assert!(last_col >= s.graphemes(true).count());
    }

    #[test]
    fn classification() {
        assert!(grapheme::is_word("_"));
        assert!(grapheme::is_word("é"));
        assert!(!grapheme::is_word("."));
        assert!(grapheme::is_blank("\t"));
        assert!(!grapheme::is_blank(""));
    }
}
