//! Text mutation: Insert/Replace typing, `J` and `r{c}`.
//!
//! Typing edits land in the undo unit opened when Insert or Replace was
//! entered. Join and replace-char are units of their own.

use super::{Context, DispatchResult, mode};
use crate::EditKind;
use crate::error::ActionError;
use core_state::Mode;
use core_text::{Position, TextBuffer, grapheme};
use tracing::trace;

pub(super) fn handle_edit<B: TextBuffer>(
    kind: EditKind,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    trace!(target: "actions.dispatch", ?kind, mode = cx.state.mode.name(), "edit");
    if !cx.state.mode.is_typing() {
        return Ok(DispatchResult::clean());
    }
    let replacing = cx.state.mode == Mode::Replace;
    let mutated = match kind {
        EditKind::InsertChar(c) => {
            type_char(c, replacing, cx);
            true
        }
        EditKind::InsertTab => {
            if cx.options.expandtab {
                for _ in 0..cx.options.shiftwidth {
                    type_char(' ', replacing, cx);
                }
            } else {
                type_char('\t', replacing, cx);
            }
            true
        }
        EditKind::InsertNewline => {
            let at = cx.state.buffer.absolute(*cx.cursor);
            cx.state.insert_text(at, "\n");
            *cx.cursor = Position::new(cx.cursor.line + 1, 0);
            if replacing {
                cx.replace_backup.push(None);
            }
            true
        }
        EditKind::Backspace if replacing => replace_backspace(cx),
        EditKind::Backspace => backspace(cx),
        EditKind::DeleteForward => delete_forward(cx),
    };
    Ok(if mutated {
        DispatchResult::mutated()
    } else {
        DispatchResult::clean()
    })
}

fn type_char<B: TextBuffer>(c: char, replacing: bool, cx: &mut Context<'_, B>) {
    let at = cx.state.buffer.absolute(*cx.cursor);
    let mut buf = [0u8; 4];
    let text = c.encode_utf8(&mut buf);
    if replacing {
        let content = cx.state.buffer.line_content(cx.cursor.line);
        match grapheme::at(&content, cx.cursor.byte) {
            Some(g) => {
                let removed = cx.state.apply_edit(at, at + g.len(), text);
                cx.replace_backup.push(Some(removed));
            }
            None => {
                cx.state.insert_text(at, text);
                cx.replace_backup.push(None);
            }
        }
    } else {
        cx.state.insert_text(at, text);
    }
    cx.cursor.byte += c.len_utf8();
}

/// Delete the grapheme before the cursor; at column 0 join with the line above.
fn backspace<B: TextBuffer>(cx: &mut Context<'_, B>) -> bool {
    let buf = &cx.state.buffer;
    let cursor = *cx.cursor;
    if cursor.byte > 0 {
        let content = buf.line_content(cursor.line);
        let prev = grapheme::prev_boundary(&content, cursor.byte.min(content.len()));
        let base = buf.line_to_byte(cursor.line);
        cx.state.delete_range(base + prev, base + cursor.byte);
        cx.cursor.byte = prev;
        return true;
    }
    if cursor.line == 0 {
        return false;
    }
    let above = cursor.line - 1;
    let joined = Position::new(above, buf.line_byte_len(above));
    let at = buf.line_to_byte(cursor.line) - 1;
    cx.state.delete_range(at, at + 1);
    *cx.cursor = joined;
    true
}

/// Backspace in Replace: step back and restore what was overwritten.
fn replace_backspace<B: TextBuffer>(cx: &mut Context<'_, B>) -> bool {
    let Some(entry) = cx.replace_backup.pop() else {
        // before the first replaced character only the cursor moves
        if cx.cursor.byte > 0 {
            let content = cx.state.buffer.line_content(cx.cursor.line);
            cx.cursor.byte = grapheme::prev_boundary(&content, cx.cursor.byte.min(content.len()));
        }
        return false;
    };
    let buf = &cx.state.buffer;
    let cursor = *cx.cursor;
    let (start, new_cursor) = if cursor.byte > 0 {
        let content = buf.line_content(cursor.line);
        let prev = grapheme::prev_boundary(&content, cursor.byte.min(content.len()));
        (buf.line_to_byte(cursor.line) + prev, Position::new(cursor.line, prev))
    } else if cursor.line > 0 {
        let above = cursor.line - 1;
        (
            buf.line_to_byte(cursor.line) - 1,
            Position::new(above, buf.line_byte_len(above)),
        )
    } else {
        return false;
    };
    let end = buf.absolute(cursor);
    let original = entry.unwrap_or_default();
    cx.state.apply_edit(start, end, &original);
    *cx.cursor = new_cursor;
    true
}

fn delete_forward<B: TextBuffer>(cx: &mut Context<'_, B>) -> bool {
    let buf = &cx.state.buffer;
    let cursor = *cx.cursor;
    let content = buf.line_content(cursor.line);
    let at = buf.absolute(cursor);
    if cursor.byte < content.len() {
        let next = grapheme::next_boundary(&content, cursor.byte);
        cx.state.delete_range(at, at + (next - cursor.byte));
        return true;
    }
    if cursor.line + 1 < buf.line_count() {
        cx.state.delete_range(at, at + 1);
        return true;
    }
    false
}

/// `r{c}`: replace `count` graphemes under and after the cursor with `ch`.
/// Fails silently when the line is too short.
pub(super) fn replace_char<B: TextBuffer>(
    ch: char,
    count: u32,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let count = count.max(1) as usize;
    let content = cx.state.buffer.line_content(cx.cursor.line);
    let mut end = cx.cursor.byte;
    for _ in 0..count {
        if end >= content.len() {
            return Ok(DispatchResult::clean());
        }
        end = grapheme::next_boundary(&content, end);
    }
    let base = cx.state.buffer.line_to_byte(cx.cursor.line);
    let replacement = ch.to_string().repeat(count);
    cx.state.begin_change(*cx.cursor);
    cx.state
        .apply_edit(base + cx.cursor.byte, base + end, &replacement);
    cx.cursor.byte += replacement.len() - ch.len_utf8();
    cx.state.commit_change(*cx.cursor);
    Ok(DispatchResult::mutated())
}

/// `J`: join `count` lines (at least two) starting at the cursor line, or
/// the selected lines in Visual modes.
pub(super) fn join_lines<B: TextBuffer>(
    count: u32,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let (first, lines) = match cx.state.selection() {
        Some(span) if cx.state.mode.is_visual() => {
            mode::leave_visual(cx);
            (span.start.line, span.line_count().max(2))
        }
        _ => (cx.cursor.line, (count as usize).max(2)),
    };
    let last_line = cx.state.buffer.line_count() - 1;
    if first >= last_line {
        return Ok(DispatchResult::clean());
    }
    let joins = (lines - 1).min(last_line - first);
    cx.state.begin_change(*cx.cursor);
    let mut join_at = 0;
    for _ in 0..joins {
        let buf = &cx.state.buffer;
        let current = buf.line_content(first);
        let next = buf.line_content(first + 1);
        let stripped = next.trim_start_matches([' ', '\t']);
        let newline_at = buf.line_to_byte(first) + current.len();
        let end = newline_at + 1 + (next.len() - stripped.len());
        let space = !current.is_empty()
            && !current.ends_with([' ', '\t'])
            && !stripped.is_empty()
            && !stripped.starts_with(')');
        let sep = if space { " " } else { "" };
        cx.state.apply_edit(newline_at, end, sep);
        join_at = if space || current.is_empty() {
            current.len()
        } else {
            current.len().saturating_sub(1)
        };
    }
    cx.state.set_change_lines(joins + 1);
    *cx.cursor = Position::new(first, join_at);
    cx.state.commit_change(*cx.cursor);
    Ok(DispatchResult::mutated())
}
