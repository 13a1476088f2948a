//! Cursor movement and Visual-mode object selection.

use super::{Context, DispatchResult};
use crate::Motion;
use crate::error::ActionError;
use crate::span_resolver::{MotionEnv, RangeKind, resolve_motion, resolve_text_object};
use core_state::{JUMP_MARK, Mode, SelectionKind};
use core_text::object::TextObject;
use core_text::{Position, TextBuffer};
use tracing::trace;

pub(super) fn handle_motion<B: TextBuffer>(
    motion: Motion,
    count: Option<u32>,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let env = MotionEnv {
        marks: &cx.state.marks,
        last_find: *cx.last_find,
        sticky_col: *cx.sticky_col,
    };
    let target = resolve_motion(&cx.state.buffer, &env, *cx.cursor, motion, count)?;
    if target.jump {
        cx.state.marks.set(JUMP_MARK, *cx.cursor);
    }
    if let Some(find) = target.find {
        *cx.last_find = Some(find);
    }
    *cx.sticky_col = target.sticky_col;
    *cx.cursor = target.pos;
    Ok(DispatchResult::clean())
}

/// `iw`, `ap` ... in a Visual mode: select the object around the cursor.
/// Linewise objects switch to VisualLine.
pub(super) fn select_text_object<B: TextBuffer>(
    object: TextObject,
    count: u32,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let buf = &cx.state.buffer;
    let range = resolve_text_object(buf, *cx.cursor, object, count)?;
    let (anchor, last, kind) = if range.kind == RangeKind::Linewise {
        (
            Position::new(range.start.line, 0),
            Position::new(range.end.line, 0),
            SelectionKind::Linewise,
        )
    } else {
        (range.start, last_grapheme_before(buf, range.start, range.end), SelectionKind::Characterwise)
    };
    cx.state.mode = match kind {
        SelectionKind::Linewise => Mode::VisualLine,
        SelectionKind::Characterwise => Mode::Visual,
    };
    cx.state.selection.start(anchor, kind);
    *cx.cursor = last;
    trace!(target: "actions.dispatch", ?object, line = last.line, byte = last.byte, "visual_object_selected");
    Ok(DispatchResult::clean())
}

/// Position of the last grapheme inside the exclusive range `[start, end)`.
fn last_grapheme_before<B: TextBuffer>(buf: &B, start: Position, end: Position) -> Position {
    if end <= start {
        return start;
    }
    if end.byte > 0 {
        let content = buf.line_content(end.line);
        let byte = core_text::grapheme::prev_boundary(&content, end.byte.min(content.len()));
        return Position::new(end.line, byte);
    }
    let prev = end.line.saturating_sub(1);
    Position::new(prev, buf.line_byte_len(prev))
}
