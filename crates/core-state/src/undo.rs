use core_text::Position;
use tracing::trace;

/// Default number of units retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

/// One primitive buffer change: at absolute offset `at`, `removed` was
/// replaced by `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub at: usize,
    pub removed: String,
    pub inserted: String,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            at,
            removed: String::new(),
            inserted: text.into(),
        }
    }

    pub fn delete(at: usize, removed: impl Into<String>) -> Self {
        Self {
            at,
            removed: removed.into(),
            inserted: String::new(),
        }
    }

    /// The edit that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            at: self.at,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }

    fn is_pure_insert(&self) -> bool {
        self.removed.is_empty()
    }

    fn line_span(&self) -> usize {
        self.removed
            .matches('\n')
            .count()
            .max(self.inserted.matches('\n').count())
    }
}

/// Edits of one logical command.
#[derive(Debug, Clone)]
pub struct UndoUnit {
    pub seq: u64,
    pub edits: Vec<Edit>,
    pub cursor_before: Position,
    pub cursor_after: Position,
    /// Lines affected; `None` until committed unless set by the operator.
    pub lines: Option<usize>,
}

impl UndoUnit {
    pub fn line_count(&self) -> usize {
        self.lines.unwrap_or_else(|| {
            self.edits.iter().map(Edit::line_span).sum::<usize>().max(1)
        })
    }

    /// Human readable size, e.g. "3 lines".
    pub fn description(&self) -> String {
        match self.line_count() {
            1 => "1 line".to_string(),
            n => format!("{n} lines"),
        }
    }
}

/// Undo and redo stacks of [`UndoUnit`]s plus the unit currently being built.
///
/// Units are opened lazily by the first mutation of a command and closed when
/// the command completes (for Insert/Replace: on leaving the mode). Consecutive
/// typed characters merge into a single edit so long insert sessions stay small.
#[derive(Debug)]
pub struct UndoEngine {
    undo_stack: Vec<UndoUnit>,
    redo_stack: Vec<UndoUnit>,
    open: Option<UndoUnit>,
    next_seq: u64,
    /// Sequence id of the newest unit dropped by the history cap.
    trimmed_seq: u64,
    history_max: usize,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::with_history(UNDO_HISTORY_MAX)
    }

    pub fn with_history(history_max: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open: None,
            next_seq: 1,
            trimmed_seq: 0,
            history_max: history_max.max(1),
        }
    }

    pub fn set_history_max(&mut self, history_max: usize) {
        self.history_max = history_max.max(1);
        self.trim();
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// True when the open unit already holds edits.
    pub fn has_pending_edits(&self) -> bool {
        self.open.as_ref().is_some_and(|u| !u.edits.is_empty())
    }

    /// Sequence id of the newest applied unit (0 for the initial state).
    pub fn current_seq(&self) -> u64 {
        self.undo_stack
            .last()
            .map(|u| u.seq)
            .unwrap_or(self.trimmed_seq)
    }

    /// Open a unit unless one is already open.
    pub fn begin(&mut self, cursor: Position) {
        if self.open.is_some() {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.open = Some(UndoUnit {
            seq,
            edits: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
            lines: None,
        });
        trace!(target: "state.undo", seq, "unit_open");
    }

    /// Append an edit to the open unit. Returns false when no unit is open.
    pub fn record(&mut self, edit: Edit) -> bool {
        let Some(unit) = self.open.as_mut() else {
            return false;
        };
        if let Some(last) = unit.edits.last_mut()
            && last.is_pure_insert()
        {
            let last_end = last.at + last.inserted.len();
            if edit.is_pure_insert() && edit.at == last_end {
                last.inserted.push_str(&edit.inserted);
                return true;
            }
            // backspace over text typed in this run
            if edit.inserted.is_empty()
                && edit.at >= last.at
                && edit.at + edit.removed.len() == last_end
            {
                last.inserted.truncate(edit.at - last.at);
                if last.inserted.is_empty() {
                    unit.edits.pop();
                }
                return true;
            }
        }
        unit.edits.push(edit);
        true
    }

    pub fn set_lines(&mut self, lines: usize) {
        if let Some(unit) = self.open.as_mut() {
            unit.lines = Some(lines);
        }
    }

    /// Close the open unit. Empty units are discarded; a real unit clears redo.
    pub fn commit(&mut self, cursor_after: Position) -> bool {
        let Some(mut unit) = self.open.take() else {
            return false;
        };
        if unit.edits.is_empty() {
            trace!(target: "state.undo", seq = unit.seq, "unit_discarded_empty");
            return false;
        }
        unit.cursor_after = cursor_after;
        let lines = unit.line_count();
        unit.lines = Some(lines);
        trace!(target: "state.undo", seq = unit.seq, edits = unit.edits.len(), lines, "unit_commit");
        self.undo_stack.push(unit);
        self.trim();
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
        true
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.history_max {
            let excess = self.undo_stack.len() - self.history_max;
            for dropped in self.undo_stack.drain(..excess) {
                self.trimmed_seq = dropped.seq;
            }
            trace!(target: "state.undo", excess, "undo_stack_trimmed");
        }
    }

    pub fn pop_undo(&mut self) -> Option<UndoUnit> {
        let unit = self.undo_stack.pop();
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), found = unit.is_some(), "undo_pop");
        unit
    }

    pub fn push_redo(&mut self, unit: UndoUnit) {
        self.redo_stack.push(unit);
    }

    pub fn pop_redo(&mut self) -> Option<UndoUnit> {
        let unit = self.redo_stack.pop();
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), found = unit.is_some(), "redo_pop");
        unit
    }

    /// Push a unit back after redo without touching the redo stack.
    pub fn push_undo_raw(&mut self, unit: UndoUnit) {
        self.undo_stack.push(unit);
    }
}
