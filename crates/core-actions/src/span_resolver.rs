//! Motion span resolver.
//!
//! Given a cursor, a [`Motion`] and a count, compute either the new cursor
//! (`resolve_motion`) or the text an operator acts on
//! (`resolve_operator_range`). The resolver never mutates editor state; it
//! replays `core_text::motion` primitives on a copy of the cursor.
//!
//! Every motion is classified as exclusive, inclusive or linewise:
//! * `e`, `$`, `f`, `t` are inclusive (the end grapheme is part of the range),
//! * `j`, `k`, `+`, `-`, `G`, `gg` and `'x` are linewise,
//! * everything else is exclusive.

use crate::{Motion, OperatorKind};
use crate::error::MotionError;
use core_state::MarkStore;
use core_text::motion::{self, CharClass, FindKind, classify};
use core_text::object::{self, TextObject};
use core_text::{Position, TextBuffer, grapheme};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Exclusive,
    Inclusive,
    Linewise,
}

/// Ordered range (`start <= end`) an operator applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRange {
    pub start: Position,
    pub end: Position,
    pub kind: RangeKind,
}

impl MotionRange {
    pub fn new(a: Position, b: Position, kind: RangeKind) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, kind }
    }

    pub fn is_linewise(&self) -> bool {
        self.kind == RangeKind::Linewise
    }

    /// First and last line touched.
    pub fn lines(&self) -> (usize, usize) {
        (self.start.line, self.end.line)
    }

    /// Absolute `[start, end)` byte range.
    ///
    /// Linewise ranges include the newline of the last line. When the last
    /// line of the buffer has no newline the preceding newline is taken
    /// instead so no empty line is left behind.
    pub fn byte_range<B: TextBuffer + ?Sized>(&self, buf: &B) -> (usize, usize) {
        match self.kind {
            RangeKind::Exclusive => (buf.absolute(self.start), buf.absolute(self.end)),
            RangeKind::Inclusive => {
                let content = buf.line_content(self.end.line);
                let next = grapheme::next_boundary(&content, self.end.byte.min(content.len()));
                (
                    buf.absolute(self.start),
                    buf.line_to_byte(self.end.line) + next,
                )
            }
            RangeKind::Linewise => linewise_bytes(buf, self.start.line, self.end.line),
        }
    }
}

/// Byte range of whole lines `first..=last` (see [`MotionRange::byte_range`]).
pub fn linewise_bytes<B: TextBuffer + ?Sized>(buf: &B, first: usize, last: usize) -> (usize, usize) {
    let last = last.min(buf.line_count().saturating_sub(1));
    let start = buf.line_to_byte(first);
    let end = buf.line_to_byte(last + 1);
    let reaches_unterminated_end = last + 1 >= buf.line_count() && !buf.ends_with_newline();
    if reaches_unterminated_end && first > 0 {
        (start - 1, buf.len_bytes())
    } else {
        (start, end)
    }
}

/// Session state a motion may read.
#[derive(Debug, Clone, Copy)]
pub struct MotionEnv<'a> {
    pub marks: &'a MarkStore,
    pub last_find: Option<(char, FindKind)>,
    pub sticky_col: Option<usize>,
}

/// Where a motion lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTarget {
    pub pos: Position,
    pub kind: RangeKind,
    /// Sticky column after the motion (`None` resets it).
    pub sticky_col: Option<usize>,
    /// The motion is a jump and sets the `'` mark.
    pub jump: bool,
    /// New last character search, for `f`/`F`/`t`/`T`.
    pub find: Option<(char, FindKind)>,
}

impl MotionTarget {
    fn at(pos: Position, kind: RangeKind) -> Self {
        Self {
            pos,
            kind,
            sticky_col: None,
            jump: false,
            find: None,
        }
    }
}

fn repeat<B: TextBuffer + ?Sized>(
    buf: &B,
    mut pos: Position,
    n: usize,
    step: impl Fn(&B, &mut Position),
) -> Position {
    for _ in 0..n {
        let before = pos;
        step(buf, &mut pos);
        if pos == before {
            break;
        }
    }
    pos
}

fn line_first_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> Position {
    let mut pos = Position::new(line.min(buf.line_count().saturating_sub(1)), 0);
    motion::first_non_blank(buf, &mut pos);
    pos
}

/// Resolve `motion` from `cursor`. `count` is `None` when no count was typed.
pub fn resolve_motion<B: TextBuffer + ?Sized>(
    buf: &B,
    env: &MotionEnv<'_>,
    cursor: Position,
    motion: Motion,
    count: Option<u32>,
) -> Result<MotionTarget, MotionError> {
    let n = count.unwrap_or(1).max(1) as usize;
    let last_line = buf.line_count().saturating_sub(1);
    let target = match motion {
        Motion::Left => MotionTarget::at(repeat(buf, cursor, n, motion::left), RangeKind::Exclusive),
        Motion::Right => {
            MotionTarget::at(repeat(buf, cursor, n, motion::right), RangeKind::Exclusive)
        }
        Motion::Up | Motion::Down => {
            let mut pos = cursor;
            let mut sticky = env.sticky_col;
            for _ in 0..n {
                sticky = if motion == Motion::Up {
                    motion::up(buf, &mut pos, sticky)
                } else {
                    motion::down(buf, &mut pos, sticky)
                };
            }
            MotionTarget {
                sticky_col: sticky,
                ..MotionTarget::at(pos, RangeKind::Linewise)
            }
        }
        Motion::WordForward(style) => MotionTarget::at(
            repeat(buf, cursor, n, |b, p| motion::word_forward(b, p, style)),
            RangeKind::Exclusive,
        ),
        Motion::WordBackward(style) => MotionTarget::at(
            repeat(buf, cursor, n, |b, p| motion::word_backward(b, p, style)),
            RangeKind::Exclusive,
        ),
        Motion::WordEnd(style) => MotionTarget::at(
            repeat(buf, cursor, n, |b, p| motion::word_end(b, p, style)),
            RangeKind::Inclusive,
        ),
        Motion::LineStart => {
            MotionTarget::at(Position::new(cursor.line, 0), RangeKind::Exclusive)
        }
        Motion::FirstNonBlank => {
            MotionTarget::at(line_first_non_blank(buf, cursor.line), RangeKind::Exclusive)
        }
        Motion::LineEnd => {
            let line = (cursor.line + n - 1).min(last_line);
            MotionTarget {
                sticky_col: Some(usize::MAX),
                ..MotionTarget::at(
                    Position::new(line, buf.line_byte_len(line)),
                    RangeKind::Inclusive,
                )
            }
        }
        Motion::FirstLine | Motion::LastLine => {
            let line = match (count, motion) {
                (Some(c), _) => (c.max(1) as usize - 1).min(last_line),
                (None, Motion::FirstLine) => 0,
                (None, _) => last_line,
            };
            MotionTarget {
                jump: true,
                ..MotionTarget::at(line_first_non_blank(buf, line), RangeKind::Linewise)
            }
        }
        Motion::NextLineStart => MotionTarget::at(
            line_first_non_blank(buf, (cursor.line + n).min(last_line)),
            RangeKind::Linewise,
        ),
        Motion::PrevLineStart => MotionTarget::at(
            line_first_non_blank(buf, cursor.line.saturating_sub(n)),
            RangeKind::Linewise,
        ),
        Motion::Find { ch, kind } => MotionTarget {
            find: Some((ch, kind)),
            ..find(buf, cursor, ch, kind, n)?
        },
        Motion::RepeatFind { reverse } => {
            let (ch, kind) = env.last_find.ok_or(MotionError::NoPreviousFind)?;
            let kind = if reverse { kind.reversed() } else { kind };
            let mut target = find(buf, cursor, ch, kind, n)?;
            // a till search already resting before its match must not stick
            if target.pos == cursor && matches!(kind, FindKind::TillForward | FindKind::TillBackward) {
                target = find(buf, cursor, ch, kind, n + 1)?;
            }
            target
        }
        Motion::ParagraphForward => MotionTarget::at(
            repeat(buf, cursor, n, motion::paragraph_forward),
            RangeKind::Exclusive,
        ),
        Motion::ParagraphBackward => MotionTarget::at(
            repeat(buf, cursor, n, motion::paragraph_backward),
            RangeKind::Exclusive,
        ),
        Motion::SentenceForward => MotionTarget::at(
            repeat(buf, cursor, n, motion::sentence_forward),
            RangeKind::Exclusive,
        ),
        Motion::SentenceBackward => MotionTarget::at(
            repeat(buf, cursor, n, motion::sentence_backward),
            RangeKind::Exclusive,
        ),
        Motion::Mark { name, linewise } => {
            let pos = env.marks.resolve(name, buf.line_count())?;
            let target = if linewise {
                MotionTarget::at(line_first_non_blank(buf, pos.line), RangeKind::Linewise)
            } else {
                let mut pos = pos;
                motion::clamp_position(buf, &mut pos);
                MotionTarget::at(pos, RangeKind::Exclusive)
            };
            MotionTarget {
                jump: true,
                ..target
            }
        }
    };
    trace!(target: "actions.motion", ?motion, n, line = target.pos.line, byte = target.pos.byte, "motion_resolved");
    Ok(target)
}

fn find<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    ch: char,
    kind: FindKind,
    n: usize,
) -> Result<MotionTarget, MotionError> {
    let mut pos = cursor;
    if !motion::find_char(buf, &mut pos, ch, kind, n) {
        return Err(MotionError::CharNotFound(ch));
    }
    let range = if kind.is_forward() {
        RangeKind::Inclusive
    } else {
        RangeKind::Exclusive
    };
    Ok(MotionTarget::at(pos, range))
}

/// Resolve the range an operator covers for `motion` from `cursor`.
///
/// Besides the plain motion range this applies the operator rules:
/// * `w`/`W` whose last step crosses into a later line stops at the end of
///   the line the step started on,
/// * `cw`/`cW` on a non-blank behaves like `ce` and never eats the trailing
///   blanks,
/// * an exclusive range ending in column 0 of a later line ends at the end of
///   the previous line instead, and becomes linewise when it started at or
///   before the first non-blank of its line.
pub fn resolve_operator_range<B: TextBuffer + ?Sized>(
    buf: &B,
    env: &MotionEnv<'_>,
    cursor: Position,
    motion: Motion,
    count: Option<u32>,
    op: OperatorKind,
) -> Result<(MotionRange, MotionTarget), MotionError> {
    let n = count.unwrap_or(1).max(1) as usize;
    if let Motion::WordForward(style) = motion {
        if op == OperatorKind::Change && !cursor_on_blank(buf, cursor, style) {
            let end = change_word_end(buf, cursor, style, n);
            let target = MotionTarget::at(end, RangeKind::Inclusive);
            return Ok((MotionRange::new(cursor, end, RangeKind::Inclusive), target));
        }
        let mut pos = cursor;
        let mut step_start = cursor;
        for _ in 0..n {
            step_start = pos;
            motion::word_forward(buf, &mut pos, style);
            if pos == step_start {
                break;
            }
        }
        let end = if pos.line > step_start.line {
            Position::new(step_start.line, buf.line_byte_len(step_start.line))
        } else {
            pos
        };
        let target = MotionTarget::at(pos, RangeKind::Exclusive);
        let range = exclusive_adjust(buf, MotionRange::new(cursor, end, RangeKind::Exclusive));
        return Ok((range, target));
    }

    let target = resolve_motion(buf, env, cursor, motion, count)?;
    let range = MotionRange::new(cursor, target.pos, target.kind);
    let range = if range.kind == RangeKind::Exclusive {
        exclusive_adjust(buf, range)
    } else {
        range
    };
    Ok((range, target))
}

fn cursor_on_blank<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    style: motion::WordStyle,
) -> bool {
    let content = buf.line_content(cursor.line);
    grapheme::at(&content, cursor.byte).is_none_or(|g| classify(g, style) == CharClass::Blank)
}

/// Last grapheme of the current word, then `n - 1` further word ends.
fn change_word_end<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    style: motion::WordStyle,
    n: usize,
) -> Position {
    let content = buf.line_content(cursor.line);
    let class = grapheme::at(&content, cursor.byte).map(|g| classify(g, style));
    let mut byte = cursor.byte;
    loop {
        let next = grapheme::next_boundary(&content, byte);
        match grapheme::at(&content, next) {
            Some(g) if Some(classify(g, style)) == class => byte = next,
            _ => break,
        }
    }
    let mut pos = Position::new(cursor.line, byte);
    for _ in 1..n {
        motion::word_end(buf, &mut pos, style);
    }
    pos
}

fn exclusive_adjust<B: TextBuffer + ?Sized>(buf: &B, range: MotionRange) -> MotionRange {
    if range.end.byte != 0 || range.end.line <= range.start.line {
        return range;
    }
    let prev = range.end.line - 1;
    let start_content = buf.line_content(range.start.line);
    if range.start.byte <= motion::first_non_blank_byte(&start_content) {
        return MotionRange {
            start: Position::new(range.start.line, 0),
            end: Position::new(prev, buf.line_byte_len(prev)),
            kind: RangeKind::Linewise,
        };
    }
    MotionRange {
        end: Position::new(prev, buf.line_byte_len(prev)),
        ..range
    }
}

/// Resolve a text object at `cursor` into an operator range.
pub fn resolve_text_object<B: TextBuffer + ?Sized>(
    buf: &B,
    cursor: Position,
    object: TextObject,
    count: u32,
) -> Result<MotionRange, MotionError> {
    let span = object::select(buf, cursor, object, count.max(1) as usize)
        .ok_or(MotionError::NoTextObject)?;
    let kind = if span.linewise {
        RangeKind::Linewise
    } else {
        RangeKind::Exclusive
    };
    Ok(MotionRange::new(span.start, span.end, kind))
}
