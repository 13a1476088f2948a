//! Mode transitions: Insert/Replace entries and exits, Visual toggles.

use super::{Context, DispatchResult};
use crate::error::ActionError;
use crate::{InsertEntry, ModeChange};
use core_state::{Mode, SelectionKind, VISUAL_END_MARK, VISUAL_START_MARK};
use core_text::motion;
use core_text::{Position, TextBuffer, grapheme};
use tracing::debug;

pub(super) fn handle_mode_change<B: TextBuffer>(
    change: ModeChange,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let from = cx.state.mode;
    let result = match change {
        ModeChange::EnterInsert(entry) => enter_insert(entry, cx),
        ModeChange::EnterReplace => {
            cx.state.begin_change(*cx.cursor);
            cx.replace_backup.clear();
            cx.state.mode = Mode::Replace;
            DispatchResult::clean()
        }
        ModeChange::LeaveInsert => {
            leave_insert(cx);
            DispatchResult::clean()
        }
        ModeChange::EnterVisual(kind) => {
            enter_visual(kind, cx);
            DispatchResult::clean()
        }
        ModeChange::LeaveVisual => {
            leave_visual(cx);
            DispatchResult::clean()
        }
        ModeChange::SwapVisualAnchor => {
            if let Some(anchor) = cx.state.selection.anchor {
                cx.state.selection.anchor = Some(*cx.cursor);
                *cx.cursor = anchor;
            }
            DispatchResult::clean()
        }
    };
    debug!(target: "actions.dispatch", from = from.name(), to = cx.state.mode.name(), "mode_change");
    Ok(result)
}

fn enter_insert<B: TextBuffer>(entry: InsertEntry, cx: &mut Context<'_, B>) -> DispatchResult {
    cx.state.begin_change(*cx.cursor);
    let line = cx.cursor.line;
    let mut mutated = false;
    match entry {
        InsertEntry::BeforeCursor => {}
        InsertEntry::AfterCursor => {
            let content = cx.state.buffer.line_content(line);
            cx.cursor.byte = grapheme::next_boundary(&content, cx.cursor.byte.min(content.len()));
        }
        InsertEntry::FirstNonBlank => motion::first_non_blank(&cx.state.buffer, cx.cursor),
        InsertEntry::LineEnd => motion::line_end(&cx.state.buffer, cx.cursor),
        InsertEntry::OpenBelow => {
            let at = cx.state.buffer.line_to_byte(line) + cx.state.buffer.line_byte_len(line);
            cx.state.insert_text(at, "\n");
            *cx.cursor = Position::new(line + 1, 0);
            mutated = true;
        }
        InsertEntry::OpenAbove => {
            let at = cx.state.buffer.line_to_byte(line);
            cx.state.insert_text(at, "\n");
            *cx.cursor = Position::new(line, 0);
            mutated = true;
        }
    }
    cx.replace_backup.clear();
    cx.state.mode = Mode::Insert;
    if mutated {
        DispatchResult::mutated()
    } else {
        DispatchResult::clean()
    }
}

/// Enter Insert after an operator already opened the undo unit (`c`).
pub(super) fn continue_in_insert<B: TextBuffer>(cx: &mut Context<'_, B>) {
    cx.replace_backup.clear();
    cx.state.mode = Mode::Insert;
}

fn leave_insert<B: TextBuffer>(cx: &mut Context<'_, B>) {
    if !cx.state.mode.is_typing() {
        return;
    }
    if cx.state.buffer.is_open_tail(*cx.cursor) {
        // the opened line stays even though nothing was typed on it
        let end = cx.state.buffer.len_bytes();
        cx.state.insert_text(end, "\n");
    }
    cx.state.commit_change(*cx.cursor);
    cx.replace_backup.clear();
    cx.state.mode = Mode::Normal;
    motion::left(&cx.state.buffer, cx.cursor);
}

fn enter_visual<B: TextBuffer>(kind: SelectionKind, cx: &mut Context<'_, B>) {
    let target = match kind {
        SelectionKind::Characterwise => Mode::Visual,
        SelectionKind::Linewise => Mode::VisualLine,
    };
    if cx.state.mode == target {
        leave_visual(cx);
        return;
    }
    if cx.state.mode.is_visual() {
        cx.state.mode = target;
        cx.state.selection.update(*cx.cursor, kind);
        return;
    }
    cx.state.mode = target;
    cx.state.selection.start(*cx.cursor, kind);
}

/// Return to Normal recording the selection bounds in `<` and `>`.
pub(super) fn leave_visual<B: TextBuffer>(cx: &mut Context<'_, B>) {
    if let Some(span) = cx.state.selection() {
        cx.state.marks.set(VISUAL_START_MARK, span.start);
        cx.state.marks.set(VISUAL_END_MARK, span.end);
    }
    cx.state.clear_selection();
    if cx.state.mode.is_visual() {
        cx.state.mode = Mode::Normal;
    }
}
