//! Operator engine: delete, yank, change, indent and outdent over a resolved
//! range, plus put.
//!
//! Ranges are resolved completely before anything is touched, so a failing
//! motion leaves buffer and registers as they were. Each mutating command is
//! one undo unit; change leaves its unit open for the insert session that
//! follows.

use super::{Context, DispatchResult, mode};
use crate::error::ActionError;
use crate::span_resolver::{
    MotionEnv, MotionRange, RangeKind, resolve_operator_range, resolve_text_object,
};
use crate::{OperatorKind, OperatorTarget};
use core_state::{Register, RegisterName, SelectionKind};
use core_text::motion::{self, first_non_blank_byte};
use core_text::{Position, TextBuffer, grapheme};
use tracing::debug;

/// Where the range came from; decides where a yank leaves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Motion,
    Visual,
}

/// A resolved operator range in absolute bytes.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    first_line: usize,
    last_line: usize,
    start_pos: Position,
    linewise: bool,
}

impl Span {
    fn from_range<B: TextBuffer>(buf: &B, range: MotionRange) -> Self {
        let (start, end) = range.byte_range(buf);
        let (first_line, last_line) = range.lines();
        Self {
            start,
            end,
            first_line,
            last_line,
            start_pos: range.start,
            linewise: range.is_linewise(),
        }
    }

    fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    /// Register payload for this span.
    fn payload<B: TextBuffer>(&self, buf: &B) -> Register {
        if self.linewise {
            let mut text = String::new();
            for line in self.first_line..=self.last_line {
                text.push_str(&buf.line_content(line));
                text.push('\n');
            }
            Register::linewise(text)
        } else {
            Register::characterwise(buf.slice_bytes(self.start, self.end))
        }
    }
}

fn env<'a, B: TextBuffer>(cx: &'a Context<'_, B>) -> MotionEnv<'a> {
    MotionEnv {
        marks: &cx.state.marks,
        last_find: *cx.last_find,
        sticky_col: *cx.sticky_col,
    }
}

/// `d{motion}`, `c{text-object}` ...
pub(super) fn apply_to_target<B: TextBuffer>(
    op: OperatorKind,
    target: OperatorTarget,
    count: Option<u32>,
    register: Option<RegisterName>,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let range = match target {
        OperatorTarget::Motion(m) => {
            let (range, target) =
                resolve_operator_range(&cx.state.buffer, &env(cx), *cx.cursor, m, count, op)?;
            if let Some(find) = target.find {
                *cx.last_find = Some(find);
            }
            range
        }
        OperatorTarget::TextObject(object) => {
            resolve_text_object(&cx.state.buffer, *cx.cursor, object, count.unwrap_or(1))?
        }
    };
    let span = Span::from_range(&cx.state.buffer, range);
    apply(op, span, 1, register, Origin::Motion, cx)
}

/// Doubled operator: `count` whole lines from the cursor line (clamped to the buffer).
pub(super) fn apply_linewise<B: TextBuffer>(
    op: OperatorKind,
    count: u32,
    register: Option<RegisterName>,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let first = cx.cursor.line;
    let last = (first + count.max(1) as usize - 1).min(cx.state.buffer.line_count() - 1);
    let range = MotionRange::new(
        Position::new(first, 0),
        Position::new(last, 0),
        RangeKind::Linewise,
    );
    let span = Span::from_range(&cx.state.buffer, range);
    apply(op, span, 1, register, Origin::Motion, cx)
}

/// Operator over the Visual selection; returns to Normal (Insert for change).
pub(super) fn apply_visual<B: TextBuffer>(
    op: OperatorKind,
    count: u32,
    register: Option<RegisterName>,
    force_linewise: bool,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let Some(selection) = cx.state.selection() else {
        return Ok(DispatchResult::clean());
    };
    let buf = &cx.state.buffer;
    let span = if force_linewise || selection.kind == SelectionKind::Linewise {
        let range = MotionRange::new(
            Position::new(selection.start.line, 0),
            Position::new(selection.end.line, 0),
            RangeKind::Linewise,
        );
        Span {
            start_pos: selection.start,
            ..Span::from_range(buf, range)
        }
    } else {
        let (start, mut end) = selection.byte_range(buf);
        // a selection ending on the end-of-line cell takes the newline with it
        let end_line = selection.end.line;
        if selection.end.byte >= buf.line_byte_len(end_line) && end_line + 1 < buf.line_count() {
            end = buf.line_to_byte(end_line + 1);
        }
        Span {
            start,
            end,
            first_line: selection.start.line,
            last_line: selection.end.line,
            start_pos: selection.start,
            linewise: false,
        }
    };
    mode::leave_visual(cx);
    let times = match op {
        OperatorKind::Indent | OperatorKind::Outdent => count.max(1),
        _ => 1,
    };
    apply(op, span, times, register, Origin::Visual, cx)
}

fn apply<B: TextBuffer>(
    op: OperatorKind,
    span: Span,
    times: u32,
    register: Option<RegisterName>,
    origin: Origin,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    debug!(
        target: "actions.operator",
        op = ?op,
        start = span.start,
        end = span.end,
        linewise = span.linewise,
        register = register.map(|r| r.as_char()).map(String::from).unwrap_or_default(),
        "apply_operator"
    );
    match op {
        OperatorKind::Delete => Ok(delete(span, register, cx)),
        OperatorKind::Yank => Ok(yank(span, register, origin, cx)),
        OperatorKind::Change => Ok(change(span, register, cx)),
        OperatorKind::Indent | OperatorKind::Outdent => Ok(shift(op, span, times, cx)),
    }
}

fn delete<B: TextBuffer>(
    span: Span,
    register: Option<RegisterName>,
    cx: &mut Context<'_, B>,
) -> DispatchResult {
    if span.start >= span.end {
        return DispatchResult::clean();
    }
    let payload = span.payload(&cx.state.buffer);
    cx.state.begin_change(*cx.cursor);
    cx.state.delete_range(span.start, span.end);
    if span.linewise {
        cx.state.set_change_lines(span.line_count());
    }
    cx.state.registers.record_delete(register, payload);

    let buf = &cx.state.buffer;
    *cx.cursor = if span.linewise {
        let line = span.first_line.min(buf.line_count() - 1);
        Position::new(line, first_non_blank_byte(&buf.line_content(line)))
    } else {
        buf.position_of(span.start)
    };
    motion::normalize_normal_mode_position(buf, cx.cursor);
    cx.state.commit_change(*cx.cursor);

    if span.linewise {
        if cx.state.buffer.len_bytes() == 0 {
            cx.status.info("--No lines in buffer--");
        } else {
            report_lines(cx, span.line_count(), "fewer lines", "line less");
        }
    }
    DispatchResult::mutated()
}

fn yank<B: TextBuffer>(
    span: Span,
    register: Option<RegisterName>,
    origin: Origin,
    cx: &mut Context<'_, B>,
) -> DispatchResult {
    if span.start >= span.end {
        return DispatchResult::clean();
    }
    let payload = span.payload(&cx.state.buffer);
    cx.state.registers.record_yank(register, payload);
    match (origin, span.linewise) {
        (Origin::Visual, _) => *cx.cursor = span.start_pos,
        (Origin::Motion, false) => *cx.cursor = span.start_pos,
        (Origin::Motion, true) => {}
    }
    if span.linewise {
        report_lines(cx, span.line_count(), "lines yanked", "line yanked");
    }
    DispatchResult::clean()
}

fn change<B: TextBuffer>(
    span: Span,
    register: Option<RegisterName>,
    cx: &mut Context<'_, B>,
) -> DispatchResult {
    let payload = span.payload(&cx.state.buffer);
    cx.state.begin_change(*cx.cursor);
    let mutated = if span.linewise {
        // keep one (empty) line to type into
        let buf = &cx.state.buffer;
        let start = buf.line_to_byte(span.first_line);
        let end = buf.line_to_byte(span.last_line) + buf.line_byte_len(span.last_line);
        cx.state.delete_range(start, end);
        cx.state.set_change_lines(span.line_count());
        *cx.cursor = Position::new(span.first_line, 0);
        start < end
    } else {
        cx.state.delete_range(span.start, span.end);
        *cx.cursor = cx.state.buffer.position_of(span.start);
        span.start < span.end
    };
    if !payload.is_empty() {
        cx.state.registers.record_delete(register, payload);
    }
    mode::continue_in_insert(cx);
    if mutated {
        DispatchResult::mutated()
    } else {
        DispatchResult::clean()
    }
}

/// Indentation width of `content` in columns.
fn indent_width(content: &str, tabstop: usize) -> (usize, usize) {
    let mut width = 0;
    let mut bytes = 0;
    for c in content.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tabstop - width % tabstop,
            _ => break,
        }
        bytes += c.len_utf8();
    }
    (width, bytes)
}

fn build_indent(width: usize, expandtab: bool, tabstop: usize) -> String {
    if expandtab {
        " ".repeat(width)
    } else {
        let mut s = "\t".repeat(width / tabstop);
        s.push_str(&" ".repeat(width % tabstop));
        s
    }
}

fn shift<B: TextBuffer>(
    op: OperatorKind,
    span: Span,
    times: u32,
    cx: &mut Context<'_, B>,
) -> DispatchResult {
    let sw = cx.options.shiftwidth.max(1);
    let ts = cx.options.tabstop.max(1);
    let amount = sw * times as usize;
    cx.state.begin_change(*cx.cursor);
    for line in span.first_line..=span.last_line {
        let content = cx.state.buffer.line_content(line);
        if content.is_empty() {
            continue;
        }
        let (width, bytes) = indent_width(&content, ts);
        let new_width = match op {
            OperatorKind::Indent => width + amount,
            _ => width.saturating_sub(amount),
        };
        let indent = build_indent(new_width, cx.options.expandtab, ts);
        if &content[..bytes] != indent.as_str() {
            let at = cx.state.buffer.line_to_byte(line);
            cx.state.apply_edit(at, at + bytes, &indent);
        }
    }
    cx.state.set_change_lines(span.line_count());
    let line = span.first_line;
    *cx.cursor = Position::new(line, first_non_blank_byte(&cx.state.buffer.line_content(line)));
    let mutated = cx.state.commit_change(*cx.cursor);

    let lines = span.line_count();
    if lines > cx.options.report {
        let sign = if op == OperatorKind::Indent { '>' } else { '<' };
        let noun = if lines == 1 { "line" } else { "lines" };
        let time = if times == 1 { "time" } else { "times" };
        cx.status.info(format!("{lines} {noun} {sign}ed {times} {time}"));
    }
    if mutated {
        DispatchResult::mutated()
    } else {
        DispatchResult::clean()
    }
}

/// Post "N fewer lines" style feedback when `lines` exceeds the report threshold.
fn report_lines<B: TextBuffer>(cx: &mut Context<'_, B>, lines: usize, plural: &str, singular: &str) {
    if lines <= cx.options.report {
        return;
    }
    if lines == 1 {
        cx.status.info(format!("1 {singular}"));
    } else {
        cx.status.info(format!("{lines} {plural}"));
    }
}

/// `p` / `P`: insert register content `count` times after/before the cursor.
pub(super) fn put<B: TextBuffer>(
    before: bool,
    count: u32,
    register: Option<RegisterName>,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    let reg = cx.state.registers.read(register.unwrap_or(RegisterName::Unnamed))?;
    let n = count.max(1) as usize;
    let text = reg.content.repeat(n);
    cx.state.begin_change(*cx.cursor);
    let line = cx.cursor.line;
    if reg.is_linewise() {
        let buf = &cx.state.buffer;
        let target_line = if before { line } else { line + 1 };
        if !before && target_line >= buf.line_count() && !buf.ends_with_newline() {
            let at = buf.len_bytes();
            let body = text.strip_suffix('\n').unwrap_or(&text);
            let inserted = format!("\n{body}");
            cx.state.insert_text(at, &inserted);
        } else {
            let at = buf.line_to_byte(target_line);
            cx.state.insert_text(at, &text);
        }
        let lines = reg.line_count() * n;
        cx.state.set_change_lines(lines);
        let content = cx.state.buffer.line_content(target_line);
        *cx.cursor = Position::new(target_line, first_non_blank_byte(&content));
        cx.state.commit_change(*cx.cursor);
        report_lines(cx, lines, "more lines", "more line");
    } else {
        let buf = &cx.state.buffer;
        let content = buf.line_content(line);
        let byte = cx.cursor.byte.min(content.len());
        let offset = if before {
            byte
        } else {
            grapheme::next_boundary(&content, byte)
        };
        let at = buf.line_to_byte(line) + offset;
        cx.state.insert_text(at, &text);
        let buf = &cx.state.buffer;
        *cx.cursor = if text.contains('\n') {
            buf.position_of(at)
        } else {
            let mut end = buf.position_of(at + text.len());
            motion::left(buf, &mut end);
            end
        };
        cx.state.commit_change(*cx.cursor);
    }
    Ok(DispatchResult::mutated())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_is_rebuilt() {
        assert_eq!(indent_width("\t  x", 8), (10, 3));
        assert_eq!(build_indent(10, false, 8), "\t  ");
        assert_eq!(build_indent(4, true, 8), "    ");
    }
}
