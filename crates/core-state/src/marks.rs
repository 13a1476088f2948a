//! Position marks (`a`-`z`, `A`-`Z`, and the special `'`, `<`, `>` marks).
//!
//! Marks follow line insertions and deletions. A mark whose line is removed
//! stays in the store flagged invalid; jumping to it reports an error instead
//! of landing somewhere unrelated.

use core_text::Position;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
    pub valid: bool,
}

impl Mark {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkError {
    #[error("Mark not set")]
    NotSet,
    #[error("Mark has invalid line number")]
    Invalid,
}

#[derive(Debug, Default, Clone)]
pub struct MarkStore {
    marks: BTreeMap<char, Mark>,
}

/// Jump mark; `` ` `` is accepted as an alias when reading.
pub const JUMP_MARK: char = '\'';
pub const VISUAL_START_MARK: char = '<';
pub const VISUAL_END_MARK: char = '>';

impl MarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: char) -> char {
        if name == '`' { JUMP_MARK } else { name }
    }

    /// Characters accepted by `m{c}`.
    pub fn is_user_mark(name: char) -> bool {
        name.is_ascii_alphabetic()
    }

    /// Characters accepted by `` `{c} `` and `'{c}`.
    pub fn is_readable(name: char) -> bool {
        Self::is_user_mark(name) || matches!(name, '\'' | '`' | '<' | '>')
    }

    /// Store `pos` under `name`; returns false for names that are not marks.
    pub fn set(&mut self, name: char, pos: Position) -> bool {
        if !Self::is_readable(name) {
            return false;
        }
        let key = Self::key(name);
        self.marks.insert(
            key,
            Mark {
                line: pos.line,
                column: pos.byte,
                valid: true,
            },
        );
        trace!(target: "state.marks", mark = %key, line = pos.line, column = pos.byte, "mark_set");
        true
    }

    pub fn get(&self, name: char) -> Option<&Mark> {
        self.marks.get(&Self::key(name))
    }

    /// Resolve a mark for a jump in a buffer of `line_count` lines.
    pub fn resolve(&self, name: char, line_count: usize) -> Result<Position, MarkError> {
        let mark = self.get(name).ok_or(MarkError::NotSet)?;
        if !mark.valid || mark.line >= line_count {
            return Err(MarkError::Invalid);
        }
        Ok(mark.position())
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Mark)> {
        self.marks.iter().map(|(c, m)| (*c, m))
    }

    /// Keep marks in step with one buffer edit.
    ///
    /// `anchor` is where the edit starts; `anchor.byte == 0` means the edit
    /// begins at a line start. Whole lines removed by the edit invalidate the
    /// marks on them; marks below shift by the net line delta.
    pub fn adjust_for_edit(&mut self, anchor: Position, removed: &str, inserted: &str) {
        let first_line = |text: &str| {
            if anchor.byte == 0 && text.ends_with('\n') {
                anchor.line
            } else {
                anchor.line + 1
            }
        };
        let removed_lines = removed.matches('\n').count();
        if removed_lines > 0 {
            self.lines_deleted(first_line(removed), removed_lines);
        }
        let inserted_lines = inserted.matches('\n').count();
        if inserted_lines > 0 {
            self.lines_inserted(first_line(inserted), inserted_lines);
        }
    }

    /// `count` lines starting at `first` were removed.
    pub fn lines_deleted(&mut self, first: usize, count: usize) {
        let end = first + count;
        for (name, mark) in self.marks.iter_mut() {
            if !mark.valid {
                continue;
            }
            if (first..end).contains(&mark.line) {
                mark.valid = false;
                trace!(target: "state.marks", mark = %name, line = mark.line, "mark_invalidated");
            } else if mark.line >= end {
                mark.line -= count;
            }
        }
    }

    /// `count` lines were inserted so that the old line `first` now sits at `first + count`.
    pub fn lines_inserted(&mut self, first: usize, count: usize) {
        for mark in self.marks.values_mut() {
            if mark.valid && mark.line >= first {
                mark.line += count;
            }
        }
    }
}
