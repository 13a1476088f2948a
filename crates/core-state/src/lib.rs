//! Editor state: buffer, mode, registers, marks, selection and the undo engine.
//!
//! Every buffer mutation made by the modal layer goes through
//! [`EditorState::apply_edit`], which records the change in the open undo unit
//! and keeps marks in step with inserted and deleted lines. Undo and redo
//! replay the recorded edits through the same path, so marks follow them too.
//!
//! Modification state is derived, not flagged: the state remembers the
//! sequence id of the newest undo unit at the last save and compares it with
//! the current one.

use core_text::{Buffer, Position, TextBuffer};
use std::fmt;
use tracing::{debug, trace};

pub mod clipboard;
pub mod marks;
pub mod registers;
pub mod undo;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use marks::{JUMP_MARK, Mark, MarkError, MarkStore, VISUAL_END_MARK, VISUAL_START_MARK};
pub use registers::{Register, RegisterError, RegisterKind, RegisterName, Registers};
pub use undo::{Edit, UNDO_HISTORY_MAX, UndoEngine, UndoUnit};

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Command/navigation mode.
    #[default]
    Normal,
    /// Typed text is inserted before the cursor.
    Insert,
    /// Character-wise selection anchored where Visual was entered.
    Visual,
    /// Whole-line selection.
    VisualLine,
    /// Typed text overwrites the character under the cursor.
    Replace,
}

impl Mode {
    /// Display name used by the mode indicator.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "Normal",
            Mode::Insert => "Insert",
            Mode::Visual => "Visual",
            Mode::VisualLine => "VisualLine",
            Mode::Replace => "Replace",
        }
    }

    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine)
    }

    /// Insert or Replace: keys are text, not commands.
    pub fn is_typing(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }

    pub fn selection_kind(&self) -> Option<SelectionKind> {
        match self {
            Mode::Visual => Some(SelectionKind::Characterwise),
            Mode::VisualLine => Some(SelectionKind::Linewise),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Characterwise,
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: Position,
    pub end: Position,
    pub kind: SelectionKind,
}

impl SelectionSpan {
    /// Construct a new span normalizing ordering so that start <= end.
    pub fn new(a: Position, b: Position, kind: SelectionKind) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, kind }
    }

    /// Absolute `[start, end)` byte range covered by the selection.
    ///
    /// Characterwise selections include the grapheme under the end position;
    /// linewise selections cover whole lines including the final newline (or,
    /// on a last line without one, the newline before the first line when
    /// there is one).
    pub fn byte_range<B: TextBuffer + ?Sized>(&self, buffer: &B) -> (usize, usize) {
        match self.kind {
            SelectionKind::Characterwise => {
                let a = buffer.absolute(self.start);
                let line = buffer.line_content(self.end.line);
                let byte = self.end.byte.min(line.len());
                let next = core_text::grapheme::next_boundary(&line, byte);
                let b = buffer.line_to_byte(self.end.line) + next;
                (a, b.max(a))
            }
            SelectionKind::Linewise => {
                (buffer.line_to_byte(self.start.line), buffer.line_to_byte(self.end.line + 1))
            }
        }
    }

    pub fn line_count(&self) -> usize {
        self.end.line - self.start.line + 1
    }
}

/// Persistent selection model: the anchor set when Visual mode was entered and
/// the span last derived from anchor and cursor.
#[derive(Debug, Default, Clone)]
pub struct SelectionModel {
    pub active: Option<SelectionSpan>,
    pub anchor: Option<Position>,
}

impl SelectionModel {
    pub fn clear(&mut self) {
        self.active = None;
        self.anchor = None;
    }

    pub fn start(&mut self, anchor: Position, kind: SelectionKind) {
        self.anchor = Some(anchor);
        self.active = Some(SelectionSpan::new(anchor, anchor, kind));
    }

    /// Recompute the span for a new cursor position.
    pub fn update(&mut self, cursor: Position, kind: SelectionKind) {
        if let Some(anchor) = self.anchor {
            self.active = Some(SelectionSpan::new(anchor, cursor, kind));
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Result of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoSummary {
    pub redo: bool,
    pub units: usize,
    pub lines: usize,
    pub cursor: Position,
}

impl fmt::Display for UndoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.redo { "Redo" } else { "Undo" };
        let changes = if self.units == 1 { "change" } else { "changes" };
        let lines = if self.lines == 1 { "line" } else { "lines" };
        write!(
            f,
            "{verb} {} {changes}; {} {lines} changed",
            self.units, self.lines
        )
    }
}

/// Top-level state of one editing session.
pub struct EditorState<B: TextBuffer = Buffer> {
    pub buffer: B,
    pub mode: Mode,
    pub registers: Registers,
    pub marks: MarkStore,
    pub selection: SelectionModel,
    undo: UndoEngine,
    saved_seq: u64,
}

impl<B: TextBuffer> EditorState<B> {
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            mode: Mode::Normal,
            registers: Registers::new(),
            marks: MarkStore::new(),
            selection: SelectionModel::default(),
            undo: UndoEngine::new(),
            saved_seq: 0,
        }
    }

    pub fn with_undo_history(mut self, history: usize) -> Self {
        self.undo.set_history_max(history);
        self
    }

    pub fn selection(&self) -> Option<SelectionSpan> {
        self.selection.active
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- undo units ---

    /// Open an undo unit for a command starting at `cursor` (no-op when one is open).
    pub fn begin_change(&mut self, cursor: Position) {
        self.undo.begin(cursor);
    }

    pub fn change_open(&self) -> bool {
        self.undo.is_open()
    }

    /// Override the line count reported for the open unit.
    pub fn set_change_lines(&mut self, lines: usize) {
        self.undo.set_lines(lines);
    }

    /// Close the open unit; returns true when it held edits.
    pub fn commit_change(&mut self, cursor_after: Position) -> bool {
        self.undo.commit(cursor_after)
    }

    /// Replace `[start, end)` with `text`, recording the edit in the open
    /// unit (opened at `start` if none is). Returns the removed text.
    pub fn apply_edit(&mut self, start: usize, end: usize, text: &str) -> String {
        if !self.undo.is_open() {
            let at = self.buffer.position_of(start);
            self.undo.begin(at);
        }
        let edit = Edit {
            at: start,
            removed: self.buffer.slice_bytes(start, end),
            inserted: text.to_string(),
        };
        if edit.removed.is_empty() && edit.inserted.is_empty() {
            return String::new();
        }
        self.raw_edit(&edit);
        let removed = edit.removed.clone();
        self.undo.record(edit);
        removed
    }

    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        self.apply_edit(start, end, "")
    }

    pub fn insert_text(&mut self, at: usize, text: &str) {
        self.apply_edit(at, at, text);
    }

    /// Position used to classify an edit at absolute `at` for mark tracking:
    /// `byte == 0` exactly when `at` begins a line (including the position
    /// just past a final newline, which begins the line after the last one).
    fn edit_anchor(&self, at: usize) -> Position {
        let len = self.buffer.len_bytes();
        if at >= len && self.buffer.ends_with_newline() {
            return Position::new(self.buffer.line_count(), 0);
        }
        let line = self.buffer.byte_to_line(at);
        Position::new(line, at - self.buffer.line_to_byte(line).min(at))
    }

    /// Apply an edit to the buffer and marks without recording it.
    fn raw_edit(&mut self, edit: &Edit) {
        let anchor = self.edit_anchor(edit.at);
        if !edit.removed.is_empty() {
            self.buffer
                .delete_bytes(edit.at, edit.at + edit.removed.len());
        }
        self.buffer.insert_str(edit.at, &edit.inserted);
        self.marks
            .adjust_for_edit(anchor, &edit.removed, &edit.inserted);
        trace!(target: "state.undo", at = edit.at, removed = edit.removed.len(), inserted = edit.inserted.len(), "edit_applied");
    }

    /// Undo up to `count` units. `None` when there is nothing to undo.
    pub fn undo(&mut self, cursor: Position, count: usize) -> Option<UndoSummary> {
        self.undo.commit(cursor);
        let mut summary = UndoSummary {
            redo: false,
            units: 0,
            lines: 0,
            cursor,
        };
        for _ in 0..count.max(1) {
            let Some(unit) = self.undo.pop_undo() else {
                break;
            };
            for edit in unit.edits.iter().rev() {
                self.raw_edit(&edit.inverse());
            }
            summary.units += 1;
            summary.lines += unit.line_count();
            summary.cursor = unit.cursor_before;
            self.undo.push_redo(unit);
        }
        debug!(target: "state.undo", units = summary.units, lines = summary.lines, "undo");
        (summary.units > 0).then_some(summary)
    }

    /// Redo up to `count` units. `None` when there is nothing to redo.
    pub fn redo(&mut self, cursor: Position, count: usize) -> Option<UndoSummary> {
        let mut summary = UndoSummary {
            redo: true,
            units: 0,
            lines: 0,
            cursor,
        };
        for _ in 0..count.max(1) {
            let Some(unit) = self.undo.pop_redo() else {
                break;
            };
            for edit in &unit.edits {
                self.raw_edit(edit);
            }
            summary.units += 1;
            summary.lines += unit.line_count();
            summary.cursor = unit.cursor_after;
            self.undo.push_undo_raw(unit);
        }
        debug!(target: "state.undo", units = summary.units, lines = summary.lines, "redo");
        (summary.units > 0).then_some(summary)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// True when the buffer differs from the last saved state.
    pub fn is_modified(&self) -> bool {
        self.undo.current_seq() != self.saved_seq || self.undo.has_pending_edits()
    }

    /// Record the current state as saved.
    pub fn mark_saved(&mut self) {
        self.saved_seq = self.undo.current_seq();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(text: &str) -> EditorState {
        EditorState::new(Buffer::from_str("t", text).unwrap())
    }

    #[test]
    fn mode_names() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert_eq!(Mode::VisualLine.name(), "VisualLine");
        assert!(Mode::Replace.is_typing());
        assert!(!Mode::Visual.is_typing());
        assert_eq!(
            Mode::Visual.selection_kind(),
            Some(SelectionKind::Characterwise)
        );
    }

    #[test]
    fn selection_ranges() {
        let buf = Buffer::from_str("t", "abc\ndef\nghi").unwrap();
        let span = SelectionSpan::new(
            Position::new(1, 1),
            Position::new(0, 1),
            SelectionKind::Characterwise,
        );
        assert_eq!(span.start, Position::new(0, 1));
        let (a, b) = span.byte_range(&buf);
        assert_eq!(buf.slice_bytes(a, b), "bc\nde");
        let lines = SelectionSpan::new(
            Position::new(0, 2),
            Position::new(1, 0),
            SelectionKind::Linewise,
        );
        let (a, b) = lines.byte_range(&buf);
        assert_eq!(buf.slice_bytes(a, b), "abc\ndef\n");
        assert_eq!(lines.line_count(), 2);
    }

    #[test]
    fn selection_model_tracks_anchor() {
        let mut model = SelectionModel::default();
        model.start(Position::new(2, 0), SelectionKind::Characterwise);
        model.update(Position::new(1, 3), SelectionKind::Characterwise);
        let span = model.active.unwrap();
        assert_eq!(span.start, Position::new(1, 3));
        assert_eq!(model.anchor, Some(Position::new(2, 0)));
        model.clear();
        assert!(!model.is_active());
    }

    #[test]
    fn edits_undo_and_redo() {
        let mut st = state("hello world\n");
        st.begin_change(Position::origin());
        let removed = st.delete_range(0, 6);
        assert_eq!(removed, "hello ");
        assert!(st.commit_change(Position::origin()));
        assert_eq!(st.buffer.text(), "world\n");
        assert!(st.is_modified());

        let summary = st.undo(Position::origin(), 1).unwrap();
        assert_eq!(st.buffer.text(), "hello world\n");
        assert_eq!(summary.to_string(), "Undo 1 change; 1 line changed");
        assert!(!st.is_modified());
        assert!(st.undo(Position::origin(), 1).is_none());

        let summary = st.redo(Position::origin(), 3).unwrap();
        assert_eq!(summary.units, 1);
        assert_eq!(st.buffer.text(), "world\n");
        assert!(st.redo(Position::origin(), 1).is_none());
    }

    #[test]
    fn saved_state_tracks_history_position() {
        let mut st = state("a\n");
        st.insert_text(0, "x");
        st.commit_change(Position::origin());
        st.mark_saved();
        assert!(!st.is_modified());
        st.undo(Position::origin(), 1);
        assert!(st.is_modified());
        st.redo(Position::origin(), 1);
        assert!(!st.is_modified());
    }

    #[test]
    fn open_unit_counts_as_modified() {
        let mut st = state("abc");
        st.begin_change(Position::origin());
        assert!(!st.is_modified());
        st.insert_text(0, "x");
        assert!(st.is_modified());
    }

    #[test]
    fn marks_follow_edits_and_undo() {
        let mut st = state("1\n2\n3\n4\n5\n");
        st.marks.set('a', Position::new(4, 0));
        // delete line 2 (index 1)
        let start = st.buffer.line_to_byte(1);
        let end = st.buffer.line_to_byte(2);
        st.delete_range(start, end);
        st.commit_change(Position::new(1, 0));
        assert_eq!(st.marks.get('a').unwrap().line, 3);
        st.undo(Position::new(1, 0), 1);
        assert_eq!(st.marks.get('a').unwrap().line, 4);
        // delete the marked line itself
        let start = st.buffer.line_to_byte(4);
        st.delete_range(start, st.buffer.len_bytes());
        st.commit_change(Position::new(3, 0));
        assert_eq!(st.marks.resolve('a', st.buffer.line_count()), Err(MarkError::Invalid));
    }

    #[test]
    fn put_after_final_newline_shifts_nothing_above() {
        let mut st = state("a\n\n");
        st.marks.set('a', Position::new(1, 0));
        let end = st.buffer.len_bytes();
        st.insert_text(end, "new\n");
        st.commit_change(Position::new(2, 0));
        assert_eq!(st.marks.get('a').unwrap().line, 1);
        assert_eq!(st.buffer.line_count(), 3);
    }

    #[test]
    fn undo_restores_cursor_before_and_redo_after() {
        let mut st = state("abc\n");
        st.begin_change(Position::new(0, 2));
        st.delete_range(2, 3);
        st.commit_change(Position::new(0, 1));
        let undo = st.undo(Position::new(0, 1), 1).unwrap();
        assert_eq!(undo.cursor, Position::new(0, 2));
        let redo = st.redo(undo.cursor, 1).unwrap();
        assert_eq!(redo.cursor, Position::new(0, 1));
        assert_eq!(redo.to_string(), "Redo 1 change; 1 line changed");
    }
}
