//! Text object selection (`iw`, `aw`, `is`, `ap`, `i"` ...).
//!
//! Objects resolve to a span around the cursor rather than a movement. Word and
//! quote objects stay within the cursor line; sentences and paragraphs may span
//! lines, paragraphs are always linewise.

use crate::motion::{CharClass, WordStyle, classify, sentence_starts};
use crate::{Position, TextBuffer, grapheme};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextObjectKind {
    Word(WordStyle),
    Sentence,
    Paragraph,
    /// Quoted string delimited by the given quote character.
    Quote(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextObject {
    pub kind: TextObjectKind,
    /// `a` objects include surrounding white space (or the delimiters for quotes).
    pub around: bool,
}

/// Resolved object: `[start, end)` with `end` exclusive; linewise spans cover
/// whole lines `start.line..=end.line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    pub start: Position,
    pub end: Position,
    pub linewise: bool,
}

/// Select `count` repetitions of `object` at `pos`. `None` when the object
/// does not exist at the cursor (e.g. no quotes on the line).
pub fn select<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    object: TextObject,
    count: usize,
) -> Option<ObjectSpan> {
    let count = count.max(1);
    match object.kind {
        TextObjectKind::Word(style) => word(buf, pos, style, object.around, count),
        TextObjectKind::Sentence => sentence(buf, pos, object.around, count),
        TextObjectKind::Paragraph => paragraph(buf, pos, object.around, count),
        TextObjectKind::Quote(q) => quote(buf, pos, q, object.around),
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    end: usize,
    class: CharClass,
}

fn runs(content: &str, style: WordStyle) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for (idx, g) in content.grapheme_indices(true) {
        let class = classify(g, style);
        match out.last_mut() {
            Some(run) if run.class == class => run.end = idx + g.len(),
            _ => out.push(Run {
                start: idx,
                end: idx + g.len(),
                class,
            }),
        }
    }
    out
}

fn word<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    style: WordStyle,
    around: bool,
    count: usize,
) -> Option<ObjectSpan> {
    let content = buf.line_content(pos.line);
    let runs = runs(&content, style);
    if runs.is_empty() {
        return Some(ObjectSpan {
            start: Position::new(pos.line, 0),
            end: Position::new(pos.line, 0),
            linewise: false,
        });
    }
    let k = runs
        .iter()
        .position(|r| pos.byte < r.end)
        .unwrap_or(runs.len() - 1);
    let last = runs.len() - 1;
    let (start, end) = if !around {
        (runs[k].start, runs[(k + count - 1).min(last)].end)
    } else if runs[k].class == CharClass::Blank {
        // leading white space plus the following word(s)
        (runs[k].start, runs[(k + 2 * count - 1).min(last)].end)
    } else {
        let mut j = k;
        let mut end = runs[k].end;
        let mut trailing = false;
        for _ in 0..count {
            if j > last {
                break;
            }
            end = runs[j].end;
            j += 1;
            trailing = j <= last && runs[j].class == CharClass::Blank;
            if trailing {
                end = runs[j].end;
                j += 1;
            }
        }
        let start = if !trailing && k > 0 && runs[k - 1].class == CharClass::Blank {
            runs[k - 1].start
        } else {
            runs[k].start
        };
        (start, end)
    };
    Some(ObjectSpan {
        start: Position::new(pos.line, start),
        end: Position::new(pos.line, end),
        linewise: false,
    })
}

fn sentence<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    around: bool,
    count: usize,
) -> Option<ObjectSpan> {
    let text = buf.text();
    let starts = sentence_starts(&text);
    let cursor = buf.absolute(pos);
    let idx = starts.iter().rposition(|s| *s <= cursor)?;
    let start = starts[idx];
    let mut end = starts.get(idx + count).copied().unwrap_or(text.len());
    if !around {
        end = start + text[start..end].trim_end().len();
    }
    Some(ObjectSpan {
        start: buf.position_of(start),
        end: buf.position_of(end),
        linewise: false,
    })
}

fn paragraph<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    around: bool,
    count: usize,
) -> Option<ObjectSpan> {
    let last = buf.line_count().saturating_sub(1);
    let blank = |l: usize| buf.line_byte_len(l) == 0;
    // extent of the run of lines sharing `line`'s blankness
    let run_end = |line: usize| {
        let kind = blank(line);
        let mut l = line;
        while l < last && blank(l + 1) == kind {
            l += 1;
        }
        l
    };
    let mut first = pos.line;
    let kind = blank(first);
    while first > 0 && blank(first - 1) == kind {
        first -= 1;
    }
    let mut end = run_end(first);
    let units = if around { count * 2 } else { count };
    let mut took_trailing_blank = kind;
    for _ in 1..units {
        if end >= last {
            break;
        }
        end = run_end(end + 1);
        took_trailing_blank = blank(end);
    }
    if around && !kind && !took_trailing_blank {
        // no blank lines after the paragraph: take the ones before it instead
        while first > 0 && blank(first - 1) {
            first -= 1;
        }
    }
    Some(ObjectSpan {
        start: Position::new(first, 0),
        end: Position::new(end, buf.line_byte_len(end)),
        linewise: true,
    })
}

fn quote<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    q: char,
    around: bool,
) -> Option<ObjectSpan> {
    let content = buf.line_content(pos.line);
    let mut quotes = Vec::new();
    let mut escaped = false;
    for (idx, c) in content.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == q {
            quotes.push(idx);
        }
    }
    // first pair closing at or after the cursor (a pair after the cursor is used too)
    let (open, close) = quotes
        .chunks_exact(2)
        .map(|p| (p[0], p[1]))
        .find(|(_, close)| pos.byte <= *close)?;
    let q_len = q.len_utf8();
    let (mut start, mut end) = if around {
        (open, close + q_len)
    } else {
        (open + q_len, close)
    };
    if around {
        let trailing = content[end..]
            .grapheme_indices(true)
            .take_while(|(_, g)| grapheme::is_blank(g))
            .map(|(_, g)| g.len())
            .sum::<usize>();
        if trailing > 0 {
            end += trailing;
        } else {
            let leading = content[..start]
                .graphemes(true)
                .rev()
                .take_while(|g| grapheme::is_blank(g))
                .map(str::len)
                .sum::<usize>();
            start -= leading;
        }
    }
    Some(ObjectSpan {
        start: Position::new(pos.line, start),
        end: Position::new(pos.line, end),
        linewise: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buffer;
    use pretty_assertions::assert_eq;

    fn span_text(buf: &Buffer, span: ObjectSpan) -> String {
        buf.slice_bytes(buf.absolute(span.start), buf.absolute(span.end))
    }

    fn obj(kind: TextObjectKind, around: bool) -> TextObject {
        TextObject { kind, around }
    }

    #[test]
    fn inner_and_around_word() {
        let buf = Buffer::from_str("t", "one two  three").unwrap();
        let at_two = Position::new(0, 5);
        let iw = select(&buf, at_two, obj(TextObjectKind::Word(WordStyle::Little), false), 1).unwrap();
        assert_eq!(span_text(&buf, iw), "two");
        let aw = select(&buf, at_two, obj(TextObjectKind::Word(WordStyle::Little), true), 1).unwrap();
        assert_eq!(span_text(&buf, aw), "two  ");
        let at_three = Position::new(0, 10);
        let aw_last = select(&buf, at_three, obj(TextObjectKind::Word(WordStyle::Little), true), 1).unwrap();
        assert_eq!(span_text(&buf, aw_last), "  three");
        let iw3 = select(&buf, Position::origin(), obj(TextObjectKind::Word(WordStyle::Little), false), 3).unwrap();
        assert_eq!(span_text(&buf, iw3), "one two");
    }

    #[test]
    fn big_word_spans_punctuation() {
        let buf = Buffer::from_str("t", "a foo.bar b").unwrap();
        let iw = select(&buf, Position::new(0, 3), obj(TextObjectKind::Word(WordStyle::Little), false), 1).unwrap();
        assert_eq!(span_text(&buf, iw), "foo");
        let big = select(&buf, Position::new(0, 3), obj(TextObjectKind::Word(WordStyle::Big), false), 1).unwrap();
        assert_eq!(span_text(&buf, big), "foo.bar");
    }

    #[test]
    fn sentence_objects() {
        let buf = Buffer::from_str("t", "First one. Second one. Third.").unwrap();
        let at = Position::new(0, 13);
        let is = select(&buf, at, obj(TextObjectKind::Sentence, false), 1).unwrap();
        assert_eq!(span_text(&buf, is), "Second one.");
        let as_ = select(&buf, at, obj(TextObjectKind::Sentence, true), 1).unwrap();
        assert_eq!(span_text(&buf, as_), "Second one. ");
    }

    #[test]
    fn paragraph_objects_are_linewise() {
        let buf = Buffer::from_str("t", "a\nb\n\nc\n").unwrap();
        let ip = select(&buf, Position::new(1, 0), obj(TextObjectKind::Paragraph, false), 1).unwrap();
        assert_eq!((ip.start.line, ip.end.line, ip.linewise), (0, 1, true));
        let ap = select(&buf, Position::new(1, 0), obj(TextObjectKind::Paragraph, true), 1).unwrap();
        assert_eq!((ap.start.line, ap.end.line), (0, 2));
        let ap_last = select(&buf, Position::new(3, 0), obj(TextObjectKind::Paragraph, true), 1).unwrap();
        assert_eq!((ap_last.start.line, ap_last.end.line), (2, 3));
    }

    #[test]
    fn quote_objects() {
        let buf = Buffer::from_str("t", r#"say "hi \"there\"" now"#).unwrap();
        let iq = select(&buf, Position::new(0, 6), obj(TextObjectKind::Quote('"'), false), 1).unwrap();
        assert_eq!(span_text(&buf, iq), r#"hi \"there\""#);
        let aq = select(&buf, Position::new(0, 6), obj(TextObjectKind::Quote('"'), true), 1).unwrap();
        assert_eq!(span_text(&buf, aq), r#""hi \"there\"" "#);
        // cursor before the pair uses the first pair on the line
        let before = select(&buf, Position::origin(), obj(TextObjectKind::Quote('"'), false), 1).unwrap();
        assert_eq!(before, iq);
        assert!(select(&buf, Position::origin(), obj(TextObjectKind::Quote('\''), false), 1).is_none());
    }
}
