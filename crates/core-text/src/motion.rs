//! Cursor motion helpers.
//!
//! These operate purely on a [`TextBuffer`] + [`Position`] pair and are free of
//! editor state (counts, registers, modes). Every helper performs a single step;
//! callers repeat them for counts. Positions at `byte == line_byte_len` denote
//! the end-of-line cell, which word motions treat as a blank.

use crate::{Position, TextBuffer, grapheme};
use unicode_segmentation::UnicodeSegmentation;

/// `word` vs `WORD` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordStyle {
    /// Keyword runs and punctuation runs are separate words.
    Little,
    /// Any run of non-blank characters.
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Blank,
    Punct,
    Word,
}

pub fn classify(g: &str, style: WordStyle) -> CharClass {
    if g.is_empty() || grapheme::is_blank(g) {
        CharClass::Blank
    } else if style == WordStyle::Big || grapheme::is_word(g) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Direction and landing rule of a `f`/`F`/`t`/`T` search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindKind {
    Forward,
    Backward,
    TillForward,
    TillBackward,
}

impl FindKind {
    pub fn reversed(self) -> Self {
        match self {
            FindKind::Forward => FindKind::Backward,
            FindKind::Backward => FindKind::Forward,
            FindKind::TillForward => FindKind::TillBackward,
            FindKind::TillBackward => FindKind::TillForward,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, FindKind::Forward | FindKind::TillForward)
    }
}

/// Normalize a position for Normal-mode semantics: clamp the line, and if the
/// byte is at or past end-of-line on a non-empty line, rest on the last grapheme.
pub fn normalize_normal_mode_position<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let count = buf.line_count();
    if pos.line >= count {
        pos.line = count.saturating_sub(1);
    }
    let content = buf.line_content(pos.line);
    if content.is_empty() {
        pos.byte = 0;
    } else if pos.byte >= content.len() {
        pos.byte = grapheme::prev_boundary(&content, content.len());
    }
}

/// Clamp to the line content without the Normal-mode last-character rule
/// (Insert mode may rest after the last grapheme).
pub fn clamp_position<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    pos.clamp_to(buf.line_count(), |l| buf.line_byte_len(l));
}

/// Move left one grapheme boundary.
pub fn left<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    if pos.byte == 0 {
        return;
    }
    let content = buf.line_content(pos.line);
    pos.byte = grapheme::prev_boundary(&content, pos.byte.min(content.len()));
}

/// Move right one grapheme boundary (may land on the end-of-line cell).
pub fn right<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let content = buf.line_content(pos.line);
    let next = grapheme::next_boundary(&content, pos.byte);
    if next > pos.byte {
        pos.byte = next;
    }
}

/// Move to start of line.
pub fn line_start<B: TextBuffer + ?Sized>(_buf: &B, pos: &mut Position) {
    pos.byte = 0;
}

/// Move to end of line (after last grapheme).
pub fn line_end<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    pos.byte = buf.line_byte_len(pos.line);
}

/// Byte offset of the first non-blank grapheme (line length when blank-only).
pub fn first_non_blank_byte(content: &str) -> usize {
    content
        .grapheme_indices(true)
        .find(|(_, g)| !grapheme::is_blank(g))
        .map(|(idx, _)| idx)
        .unwrap_or(content.len())
}

pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let content = buf.line_content(pos.line);
    pos.byte = first_non_blank_byte(&content);
}

/// Jump to a zero-based line (clamped) and rest on its first non-blank.
pub fn goto_line<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position, line: usize) {
    pos.line = line.min(buf.line_count().saturating_sub(1));
    first_non_blank(buf, pos);
}

/// Move up one line preserving a target visual column (sticky). Returns the updated sticky column.
/// Caller should maintain the returned sticky column across successive vertical motions. If `sticky_col`
/// is `None`, it will be computed from the current position's visual column.
pub fn up<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    sticky_col: Option<usize>,
) -> Option<usize> {
    if pos.line == 0 {
        return sticky_col;
    }
    let col = sticky_col.unwrap_or_else(|| current_visual_col(buf, pos));
    pos.line -= 1;
    pos.byte = byte_for_visual_col(buf, pos.line, col);
    Some(col)
}

/// Move down one line preserving sticky visual column.
pub fn down<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    sticky_col: Option<usize>,
) -> Option<usize> {
    if pos.line + 1 >= buf.line_count() {
        return sticky_col;
    }
    let col = sticky_col.unwrap_or_else(|| current_visual_col(buf, pos));
    pos.line += 1;
    pos.byte = byte_for_visual_col(buf, pos.line, col);
    Some(col)
}

fn current_visual_col<B: TextBuffer + ?Sized>(buf: &B, pos: &Position) -> usize {
    grapheme::visual_col(&buf.line_content(pos.line), pos.byte)
}

/// Convert a target visual column into a byte offset on a given line, clamping to line end.
fn byte_for_visual_col<B: TextBuffer + ?Sized>(buf: &B, line: usize, target_col: usize) -> usize {
    let content = buf.line_content(line);
    let mut col = 0;
    let mut byte = 0;
    for (b, g) in content.grapheme_indices(true) {
        let w = grapheme::cluster_width(g);
        if col + w > target_col {
            return b;
        }
        col += w;
        byte = b + g.len();
    }
    byte
}

/// Grapheme cursor that walks across lines, caching the current line content.
/// The end-of-line position is a cell of its own so line breaks separate words.
struct CellWalker<'a, B: TextBuffer + ?Sized> {
    buf: &'a B,
    pos: Position,
    line: String,
}

impl<'a, B: TextBuffer + ?Sized> CellWalker<'a, B> {
    fn new(buf: &'a B, pos: Position) -> Self {
        let line = buf.line_content(pos.line);
        let byte = pos.byte.min(line.len());
        Self {
            buf,
            pos: Position::new(pos.line, byte),
            line,
        }
    }

    fn class(&self, style: WordStyle) -> CharClass {
        match grapheme::at(&self.line, self.pos.byte) {
            Some(g) => classify(g, style),
            None => CharClass::Blank,
        }
    }

    fn line_is_empty(&self) -> bool {
        self.line.is_empty()
    }

    fn advance(&mut self) -> bool {
        if self.pos.byte < self.line.len() {
            self.pos.byte = grapheme::next_boundary(&self.line, self.pos.byte);
            return true;
        }
        if self.pos.line + 1 < self.buf.line_count() {
            self.pos = Position::new(self.pos.line + 1, 0);
            self.line = self.buf.line_content(self.pos.line);
            return true;
        }
        false
    }

    fn retreat(&mut self) -> bool {
        if self.pos.byte > 0 {
            self.pos.byte = grapheme::prev_boundary(&self.line, self.pos.byte);
            return true;
        }
        if self.pos.line > 0 {
            self.pos.line -= 1;
            self.line = self.buf.line_content(self.pos.line);
            self.pos.byte = self.line.len();
            return true;
        }
        false
    }

    /// Class of the next grapheme on the same line (end-of-line excluded).
    fn peek_next_in_line(&self, style: WordStyle) -> Option<CharClass> {
        let next = grapheme::next_boundary(&self.line, self.pos.byte);
        grapheme::at(&self.line, next).map(|g| classify(g, style))
    }

    fn peek_prev_in_line(&self, style: WordStyle) -> Option<CharClass> {
        if self.pos.byte == 0 {
            return None;
        }
        let prev = grapheme::prev_boundary(&self.line, self.pos.byte);
        grapheme::at(&self.line, prev).map(|g| classify(g, style))
    }
}

/// Move forward to the start of the next word. An empty line counts as a word;
/// from the last word of the buffer the cursor lands on the final end-of-line cell.
pub fn word_forward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position, style: WordStyle) {
    let mut w = CellWalker::new(buf, *pos);
    let start = *pos;
    let class = w.class(style);
    if class != CharClass::Blank {
        loop {
            if !w.advance() {
                *pos = w.pos;
                return;
            }
            if w.class(style) != class {
                break;
            }
        }
    }
    loop {
        if w.class(style) != CharClass::Blank {
            break;
        }
        if w.line_is_empty() && w.pos != start {
            break;
        }
        if !w.advance() {
            break;
        }
    }
    *pos = w.pos;
}

/// Move backward to the start of the previous word (empty lines stop the motion).
pub fn word_backward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position, style: WordStyle) {
    let mut w = CellWalker::new(buf, *pos);
    if !w.retreat() {
        return;
    }
    while w.class(style) == CharClass::Blank {
        if w.line_is_empty() || !w.retreat() {
            *pos = w.pos;
            return;
        }
    }
    let class = w.class(style);
    while w.peek_prev_in_line(style) == Some(class) {
        w.retreat();
    }
    *pos = w.pos;
}

/// Move to the last grapheme of the current or next word. Leaves the position
/// untouched when no further word exists.
pub fn word_end<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position, style: WordStyle) {
    let mut w = CellWalker::new(buf, *pos);
    if !w.advance() {
        return;
    }
    while w.class(style) == CharClass::Blank {
        if !w.advance() {
            return;
        }
    }
    let class = w.class(style);
    while w.peek_next_in_line(style) == Some(class) {
        w.advance();
    }
    *pos = w.pos;
}

/// Search the current line for the `count`-th occurrence of `target`.
/// Returns false (position untouched) when there are not enough occurrences.
pub fn find_char<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: &mut Position,
    target: char,
    kind: FindKind,
    count: usize,
) -> bool {
    let content = buf.line_content(pos.line);
    let count = count.max(1);
    let matches = |g: &str| g.starts_with(target) && g.chars().count() == 1;
    let found = if kind.is_forward() {
        content
            .grapheme_indices(true)
            .filter(|(idx, g)| *idx > pos.byte && matches(g))
            .nth(count - 1)
            .map(|(idx, _)| idx)
    } else {
        content
            .grapheme_indices(true)
            .rev()
            .filter(|(idx, g)| *idx < pos.byte && matches(g))
            .nth(count - 1)
            .map(|(idx, _)| idx)
    };
    let Some(idx) = found else {
        return false;
    };
    pos.byte = match kind {
        FindKind::Forward | FindKind::Backward => idx,
        FindKind::TillForward => grapheme::prev_boundary(&content, idx).max(pos.byte),
        FindKind::TillBackward => grapheme::next_boundary(&content, idx).min(pos.byte),
    };
    true
}

fn is_empty_line<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> bool {
    buf.line_byte_len(line) == 0
}

/// `}`: next empty line after the current paragraph, or the end of the last line.
pub fn paragraph_forward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let last = buf.line_count().saturating_sub(1);
    let mut line = pos.line;
    while line < last && is_empty_line(buf, line) {
        line += 1;
    }
    while line < last && !is_empty_line(buf, line) {
        line += 1;
    }
    *pos = if is_empty_line(buf, line) {
        Position::new(line, 0)
    } else {
        Position::new(line, buf.line_byte_len(line))
    };
}

/// `{`: previous empty line before the current paragraph, or the first line.
pub fn paragraph_backward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let mut line = pos.line;
    while line > 0 && is_empty_line(buf, line) {
        line -= 1;
    }
    while line > 0 && !is_empty_line(buf, line) {
        line -= 1;
    }
    *pos = Position::new(line, 0);
}

/// Absolute offsets where sentences start. A sentence ends at `.`, `!` or `?`
/// (optionally followed by closing `)`, `]`, `"` or `'`) when whitespace or the
/// end of text follows. Empty lines are sentence boundaries and starts themselves.
pub fn sentence_starts(text: &str) -> Vec<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut starts = Vec::new();
    let mut seeking = true;
    let mut i = 0;
    while i < chars.len() {
        let (idx, c) = chars[i];
        if c == '\n' && (i == 0 || chars[i - 1].1 == '\n') {
            starts.push(idx);
            seeking = true;
            i += 1;
            continue;
        }
        if seeking {
            if !c.is_whitespace() {
                starts.push(idx);
                seeking = false;
            }
            i += 1;
            continue;
        }
        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j].1, ')' | ']' | '"' | '\'') {
                j += 1;
            }
            if j >= chars.len() || chars[j].1.is_whitespace() {
                seeking = true;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    starts
}

/// `)`: start of the next sentence, or the end of the buffer.
pub fn sentence_forward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let current = buf.absolute(*pos);
    match sentence_starts(&buf.text()).into_iter().find(|s| *s > current) {
        Some(next) => *pos = buf.position_of(next),
        None => {
            let last = buf.line_count().saturating_sub(1);
            *pos = Position::new(last, buf.line_byte_len(last));
        }
    }
}

/// `(`: start of the current sentence, or of the previous one when already there.
pub fn sentence_backward<B: TextBuffer + ?Sized>(buf: &B, pos: &mut Position) {
    let current = buf.absolute(*pos);
    let prev = sentence_starts(&buf.text())
        .into_iter()
        .rev()
        .find(|s| *s < current)
        .unwrap_or(0);
    *pos = buf.position_of(prev);
}
