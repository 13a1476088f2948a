//! KeyTranslator: stateful key -> Action translation.
//!
//! Normal and Visual keys follow the grammar
//! `[count0] ["x] [count1] operator? [count2] motion|text-object`.
//! The translator accumulates the pending command one key at a time and
//! answers with a [`ParseOutcome`]:
//! * `NeedMore` while the keys form a valid prefix,
//! * `Execute(action)` once a command is complete,
//! * `Invalid` when a key does not extend the prefix (state is dropped),
//! * `Cancelled` on Escape,
//! * `PassThrough` for Ctrl/Alt chords and keys outside the grammar.
//!
//! Insert/Replace keys and command-line keys translate one-to-one.
//!
//! Counts: `count0` (before the register), `count1` (before the operator)
//! and `count2` (after it) multiply; each is clamped to [`MAX_COUNT`]. A `0` that would start a count is the
//! `LineStart` motion.

use crate::{
    Action, EditKind, InsertEntry, MAX_COUNT, ModeChange, Motion, OperatorKind, OperatorTarget,
    ParsedCommand,
};
use core_events::{KeyCode, KeyEvent, format_keys};
use core_state::{MarkStore, Mode, RegisterName, SelectionKind};
use core_text::motion::{FindKind, WordStyle};
use core_text::object::{TextObject, TextObjectKind};
use smallvec::SmallVec;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    NeedMore,
    Execute(Action),
    Invalid,
    Cancelled,
    PassThrough,
}

/// Commands that consume the next typed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharCommand {
    Find(FindKind),
    Replace,
    SetMark,
    MarkJump { linewise: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Start,
    /// After `"`.
    Register,
    Char(CharCommand),
    TextObject {
        around: bool,
    },
    /// After `g`.
    G,
    /// After `Z`.
    Z,
}

#[derive(Debug)]
pub struct KeyTranslator {
    /// Count typed before `"x`.
    count0: Option<u32>,
    count1: Option<u32>,
    register: Option<RegisterName>,
    operator: Option<OperatorKind>,
    count2: Option<u32>,
    pending: Pending,
    keys: SmallVec<[KeyEvent; 8]>,
    register_after_count: bool,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self {
            count0: None,
            count1: None,
            register: None,
            operator: None,
            count2: None,
            pending: Pending::Start,
            keys: SmallVec::new(),
            register_after_count: true,
        }
    }

    /// Whether `3"add` is accepted in addition to `"a3dd`.
    pub fn with_register_after_count(mut self, allowed: bool) -> Self {
        self.register_after_count = allowed;
        self
    }

    /// Drop the pending command.
    pub fn reset(&mut self) {
        self.count0 = None;
        self.count1 = None;
        self.register = None;
        self.operator = None;
        self.count2 = None;
        self.pending = Pending::Start;
        self.keys.clear();
    }

    /// Keys of the pending command in Vim notation (empty when idle).
    pub fn pending_keys(&self) -> String {
        format_keys(&self.keys)
    }

    pub fn is_pending(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Translate one key. `pending_command` is the command line (starting
    /// with `:`) while it is open, else empty.
    pub fn translate(&mut self, mode: Mode, pending_command: &str, key: &KeyEvent) -> ParseOutcome {
        trace!(target: "actions.translate", mode = mode.name(), key = %key, pending = %self.pending_keys(), "translate_key_attempt");
        let outcome = if pending_command.starts_with(':') {
            command_line_key(key)
        } else if mode.is_typing() {
            typing_key(key)
        } else {
            self.command_key(mode, key)
        };
        match &outcome {
            ParseOutcome::NeedMore => self.keys.push(*key),
            ParseOutcome::Invalid => {
                trace!(target: "actions.translate", key = %key, pending = %self.pending_keys(), "invalid_sequence");
                self.reset();
            }
            _ => self.reset(),
        }
        outcome
    }

    fn effective_count(&self) -> Option<u32> {
        if self.count0.is_none() && self.count1.is_none() && self.count2.is_none() {
            return None;
        }
        let product = [self.count0, self.count1, self.count2]
            .into_iter()
            .fold(1u32, |acc, c| acc.saturating_mul(c.unwrap_or(1)));
        Some(product.min(MAX_COUNT))
    }

    fn count_or_one(&self) -> u32 {
        self.effective_count().unwrap_or(1).max(1)
    }

    fn command_key(&mut self, mode: Mode, key: &KeyEvent) -> ParseOutcome {
        if key.code == KeyCode::Esc {
            return if mode.is_visual() {
                ParseOutcome::Execute(Action::ModeChange(ModeChange::LeaveVisual))
            } else {
                ParseOutcome::Cancelled
            };
        }
        if key.has_chord_modifier() {
            if key.code == KeyCode::Char('r') && self.pending == Pending::Start && self.operator.is_none() && mode == Mode::Normal {
                return ParseOutcome::Execute(Action::Redo {
                    count: self.count_or_one(),
                });
            }
            return ParseOutcome::PassThrough;
        }
        match self.pending {
            Pending::Register => return self.register_key(key),
            Pending::Char(cmd) => return self.char_command_key(cmd, key),
            Pending::TextObject { around } => return self.text_object_key(mode, around, key),
            Pending::G => {
                return match key.code {
                    KeyCode::Char('g') => self.motion(Motion::FirstLine),
                    _ => ParseOutcome::Invalid,
                };
            }
            Pending::Z => {
                return match key.code {
                    KeyCode::Char('Z') => {
                        ParseOutcome::Execute(Action::Ex(ParsedCommand::WriteIfModifiedQuit))
                    }
                    KeyCode::Char('Q') => {
                        ParseOutcome::Execute(Action::Ex(ParsedCommand::Quit { force: true }))
                    }
                    _ => ParseOutcome::Invalid,
                };
            }
            Pending::Start => {}
        }

        if let KeyCode::Char(c) = key.code
            && c.is_ascii_digit()
            && (c != '0' || self.current_count().is_some())
        {
            let slot = if self.operator.is_some() {
                &mut self.count2
            } else {
                &mut self.count1
            };
            let digit = u32::from(c as u8 - b'0');
            *slot = Some(
                slot.unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(digit)
                    .min(MAX_COUNT),
            );
            return ParseOutcome::NeedMore;
        }

        if let Some(motion) = self.motion_for(key) {
            return self.motion(motion);
        }
        let KeyCode::Char(c) = key.code else {
            return match key.code {
                KeyCode::Delete if self.operator.is_none() && mode == Mode::Normal => {
                    self.shorthand(OperatorKind::Delete, Motion::Right)
                }
                KeyCode::Delete if mode.is_visual() => self.visual_operator(OperatorKind::Delete, false),
                KeyCode::Tab | KeyCode::PageUp | KeyCode::PageDown if self.keys.is_empty() => {
                    ParseOutcome::PassThrough
                }
                _ => ParseOutcome::Invalid,
            };
        };

        // pending keys that only make sense before the operator
        match c {
            '"' if self.operator.is_none() => {
                if self.register.is_some() || (self.count1.is_some() && !self.register_after_count) {
                    return ParseOutcome::Invalid;
                }
                self.pending = Pending::Register;
                return ParseOutcome::NeedMore;
            }
            'f' | 'F' | 't' | 'T' => {
                let kind = match c {
                    'f' => FindKind::Forward,
                    'F' => FindKind::Backward,
                    't' => FindKind::TillForward,
                    _ => FindKind::TillBackward,
                };
                self.pending = Pending::Char(CharCommand::Find(kind));
                return ParseOutcome::NeedMore;
            }
            '`' | '\'' => {
                self.pending = Pending::Char(CharCommand::MarkJump {
                    linewise: c == '\'',
                });
                return ParseOutcome::NeedMore;
            }
            'g' => {
                self.pending = Pending::G;
                return ParseOutcome::NeedMore;
            }
            _ => {}
        }

        if let Some(op) = self.operator {
            if c == op.as_char() {
                return ParseOutcome::Execute(Action::LinewiseOperator {
                    op,
                    count: self.count_or_one(),
                    register: self.register,
                });
            }
            if c == 'i' || c == 'a' {
                self.pending = Pending::TextObject { around: c == 'a' };
                return ParseOutcome::NeedMore;
            }
            return ParseOutcome::Invalid;
        }

        if mode.is_visual() {
            self.visual_key(mode, c)
        } else {
            self.normal_key(c)
        }
    }

    fn current_count(&self) -> Option<u32> {
        if self.operator.is_some() {
            self.count2
        } else {
            self.count1
        }
    }

    fn normal_key(&mut self, c: char) -> ParseOutcome {
        if let Some(op) = OperatorKind::from_char(c) {
            self.operator = Some(op);
            return ParseOutcome::NeedMore;
        }
        let count = self.count_or_one();
        let register = self.register;
        let action = match c {
            'x' => return self.shorthand(OperatorKind::Delete, Motion::Right),
            'X' => return self.shorthand(OperatorKind::Delete, Motion::Left),
            'D' => return self.shorthand(OperatorKind::Delete, Motion::LineEnd),
            'C' => return self.shorthand(OperatorKind::Change, Motion::LineEnd),
            's' => return self.shorthand(OperatorKind::Change, Motion::Right),
            'S' => Action::LinewiseOperator {
                op: OperatorKind::Change,
                count,
                register,
            },
            'Y' => Action::LinewiseOperator {
                op: OperatorKind::Yank,
                count,
                register,
            },
            'p' | 'P' => Action::Put {
                before: c == 'P',
                count,
                register,
            },
            'u' => Action::Undo { count },
            'J' => Action::JoinLines { count },
            'i' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::BeforeCursor)),
            'a' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::AfterCursor)),
            'I' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::FirstNonBlank)),
            'A' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::LineEnd)),
            'o' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::OpenBelow)),
            'O' => Action::ModeChange(ModeChange::EnterInsert(InsertEntry::OpenAbove)),
            'R' => Action::ModeChange(ModeChange::EnterReplace),
            'v' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Characterwise)),
            'V' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Linewise)),
            ':' => Action::CommandStart,
            'r' => {
                self.pending = Pending::Char(CharCommand::Replace);
                return ParseOutcome::NeedMore;
            }
            'm' => {
                self.pending = Pending::Char(CharCommand::SetMark);
                return ParseOutcome::NeedMore;
            }
            'Z' => {
                self.pending = Pending::Z;
                return ParseOutcome::NeedMore;
            }
            _ => return ParseOutcome::Invalid,
        };
        ParseOutcome::Execute(action)
    }

    fn visual_key(&mut self, mode: Mode, c: char) -> ParseOutcome {
        if let Some(op) = OperatorKind::from_char(c) {
            return self.visual_operator(op, false);
        }
        let action = match c {
            'x' => return self.visual_operator(OperatorKind::Delete, false),
            's' => return self.visual_operator(OperatorKind::Change, false),
            'D' | 'X' => return self.visual_operator(OperatorKind::Delete, true),
            'Y' => return self.visual_operator(OperatorKind::Yank, true),
            'C' | 'S' | 'R' => return self.visual_operator(OperatorKind::Change, true),
            'i' | 'a' => {
                self.pending = Pending::TextObject { around: c == 'a' };
                return ParseOutcome::NeedMore;
            }
            'o' => Action::ModeChange(ModeChange::SwapVisualAnchor),
            'v' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Characterwise)),
            'V' => Action::ModeChange(ModeChange::EnterVisual(SelectionKind::Linewise)),
            'J' => Action::JoinLines {
                count: self.count_or_one(),
            },
            ':' => Action::CommandStart,
            _ => {
                trace!(target: "actions.translate", mode = mode.name(), key = %c, "visual_key_unmapped");
                return ParseOutcome::Invalid;
            }
        };
        ParseOutcome::Execute(action)
    }

    fn visual_operator(&mut self, op: OperatorKind, linewise: bool) -> ParseOutcome {
        ParseOutcome::Execute(Action::VisualOperator {
            op,
            count: self.count_or_one(),
            register: self.register,
            linewise,
        })
    }

    fn shorthand(&mut self, op: OperatorKind, motion: Motion) -> ParseOutcome {
        ParseOutcome::Execute(Action::ApplyOperator {
            op,
            target: OperatorTarget::Motion(motion),
            count: self.effective_count(),
            register: self.register,
        })
    }

    fn motion(&mut self, motion: Motion) -> ParseOutcome {
        let count = self.effective_count();
        let action = match self.operator {
            Some(op) => Action::ApplyOperator {
                op,
                target: OperatorTarget::Motion(motion),
                count,
                register: self.register,
            },
            None => Action::Motion { motion, count },
        };
        ParseOutcome::Execute(action)
    }

    fn motion_for(&self, key: &KeyEvent) -> Option<Motion> {
        let motion = match key.code {
            KeyCode::Left | KeyCode::Backspace => Motion::Left,
            KeyCode::Right => Motion::Right,
            KeyCode::Up => Motion::Up,
            KeyCode::Down => Motion::Down,
            KeyCode::Home => Motion::LineStart,
            KeyCode::End => Motion::LineEnd,
            KeyCode::Enter => Motion::NextLineStart,
            KeyCode::Char(c) => match c {
                'h' => Motion::Left,
                'l' | ' ' => Motion::Right,
                'j' => Motion::Down,
                'k' => Motion::Up,
                'w' => Motion::WordForward(WordStyle::Little),
                'W' => Motion::WordForward(WordStyle::Big),
                'b' => Motion::WordBackward(WordStyle::Little),
                'B' => Motion::WordBackward(WordStyle::Big),
                'e' => Motion::WordEnd(WordStyle::Little),
                'E' => Motion::WordEnd(WordStyle::Big),
                '0' => Motion::LineStart,
                '^' => Motion::FirstNonBlank,
                '$' => Motion::LineEnd,
                'G' => Motion::LastLine,
                '+' => Motion::NextLineStart,
                '-' => Motion::PrevLineStart,
                ';' => Motion::RepeatFind { reverse: false },
                ',' => Motion::RepeatFind { reverse: true },
                '}' => Motion::ParagraphForward,
                '{' => Motion::ParagraphBackward,
                ')' => Motion::SentenceForward,
                '(' => Motion::SentenceBackward,
                _ => return None,
            },
            _ => return None,
        };
        Some(motion)
    }

    fn register_key(&mut self, key: &KeyEvent) -> ParseOutcome {
        let Some(name) = key.printable().and_then(RegisterName::from_char) else {
            return ParseOutcome::Invalid;
        };
        self.register = Some(name);
        self.count0 = self.count1.take();
        self.pending = Pending::Start;
        ParseOutcome::NeedMore
    }

    fn char_command_key(&mut self, cmd: CharCommand, key: &KeyEvent) -> ParseOutcome {
        let Some(ch) = key.printable() else {
            return ParseOutcome::Invalid;
        };
        match cmd {
            CharCommand::Find(kind) => self.motion(Motion::Find { ch, kind }),
            CharCommand::MarkJump { linewise } => {
                if !MarkStore::is_readable(ch) {
                    return ParseOutcome::Invalid;
                }
                self.motion(Motion::Mark { name: ch, linewise })
            }
            CharCommand::SetMark => {
                if !MarkStore::is_user_mark(ch) && !matches!(ch, '\'' | '`' | '<' | '>') {
                    return ParseOutcome::Invalid;
                }
                ParseOutcome::Execute(Action::SetMark(ch))
            }
            CharCommand::Replace => ParseOutcome::Execute(Action::ReplaceChar {
                ch,
                count: self.count_or_one(),
            }),
        }
    }

    fn text_object_key(&mut self, mode: Mode, around: bool, key: &KeyEvent) -> ParseOutcome {
        let Some(c) = key.printable() else {
            return ParseOutcome::Invalid;
        };
        let kind = match c {
            'w' => TextObjectKind::Word(WordStyle::Little),
            'W' => TextObjectKind::Word(WordStyle::Big),
            's' => TextObjectKind::Sentence,
            'p' => TextObjectKind::Paragraph,
            '"' | '\'' | '`' => TextObjectKind::Quote(c),
            _ => return ParseOutcome::Invalid,
        };
        let object = TextObject { kind, around };
        if mode.is_visual() && self.operator.is_none() {
            return ParseOutcome::Execute(Action::VisualTextObject {
                object,
                count: self.count_or_one(),
            });
        }
        match self.operator {
            Some(op) => ParseOutcome::Execute(Action::ApplyOperator {
                op,
                target: OperatorTarget::TextObject(object),
                count: self.effective_count(),
                register: self.register,
            }),
            None => ParseOutcome::Invalid,
        }
    }
}

fn command_line_key(key: &KeyEvent) -> ParseOutcome {
    let action = match key.code {
        KeyCode::Enter => Action::CommandExecute,
        KeyCode::Esc => Action::CommandCancel,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Tab if !key.has_chord_modifier() => Action::CommandChar('\t'),
        KeyCode::Char(c) if !key.has_chord_modifier() => Action::CommandChar(c),
        _ => return ParseOutcome::PassThrough,
    };
    ParseOutcome::Execute(action)
}

fn typing_key(key: &KeyEvent) -> ParseOutcome {
    if key.has_chord_modifier() {
        return ParseOutcome::PassThrough;
    }
    let action = match key.code {
        KeyCode::Char(c) => Action::Edit(EditKind::InsertChar(c)),
        KeyCode::Enter => Action::Edit(EditKind::InsertNewline),
        KeyCode::Tab => Action::Edit(EditKind::InsertTab),
        KeyCode::Backspace => Action::Edit(EditKind::Backspace),
        KeyCode::Delete => Action::Edit(EditKind::DeleteForward),
        KeyCode::Esc => Action::ModeChange(ModeChange::LeaveInsert),
        KeyCode::Left => Action::Motion {
            motion: Motion::Left,
            count: None,
        },
        KeyCode::Right => Action::Motion {
            motion: Motion::Right,
            count: None,
        },
        KeyCode::Up => Action::Motion {
            motion: Motion::Up,
            count: None,
        },
        KeyCode::Down => Action::Motion {
            motion: Motion::Down,
            count: None,
        },
        KeyCode::Home => Action::Motion {
            motion: Motion::LineStart,
            count: None,
        },
        KeyCode::End => Action::Motion {
            motion: Motion::LineEnd,
            count: None,
        },
        KeyCode::PageUp | KeyCode::PageDown => return ParseOutcome::PassThrough,
    };
    ParseOutcome::Execute(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyModifiers, parse_keys};
    use pretty_assertions::assert_eq;

    fn feed(tr: &mut KeyTranslator, mode: Mode, keys: &str) -> Vec<ParseOutcome> {
        parse_keys(keys)
            .unwrap()
            .iter()
            .map(|k| tr.translate(mode, "", k))
            .collect()
    }

    fn last(tr: &mut KeyTranslator, keys: &str) -> ParseOutcome {
        feed(tr, Mode::Normal, keys).pop().unwrap()
    }

    fn named(c: char) -> Option<RegisterName> {
        RegisterName::from_char(c)
    }

    #[test]
    fn operator_simple_dw() {
        let mut tr = KeyTranslator::new();
        let out = feed(&mut tr, Mode::Normal, "dw");
        assert_eq!(out[0], ParseOutcome::NeedMore);
        assert_eq!(
            out[1],
            ParseOutcome::Execute(Action::ApplyOperator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(Motion::WordForward(WordStyle::Little)),
                count: None,
                register: None,
            })
        );
        assert!(!tr.is_pending());
    }

    #[test]
    fn counts_multiply_and_clamp() {
        let mut tr = KeyTranslator::new();
        match last(&mut tr, "2d3w") {
            ParseOutcome::Execute(Action::ApplyOperator { count, .. }) => assert_eq!(count, Some(6)),
            other => panic!("expected ApplyOperator got {other:?}"),
        }
        match last(&mut tr, "9999999d9999999w") {
            ParseOutcome::Execute(Action::ApplyOperator { count, .. }) => {
                assert_eq!(count, Some(MAX_COUNT))
            }
            other => panic!("expected ApplyOperator got {other:?}"),
        }
    }

    #[test]
    fn zero_rule_line_start() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "0"),
            ParseOutcome::Execute(Action::Motion {
                motion: Motion::LineStart,
                count: None
            })
        );
        match last(&mut tr, "10l") {
            ParseOutcome::Execute(Action::Motion { count, .. }) => assert_eq!(count, Some(10)),
            other => panic!("expected Motion got {other:?}"),
        }
        match last(&mut tr, "d0") {
            ParseOutcome::Execute(Action::ApplyOperator { target, .. }) => {
                assert_eq!(target, OperatorTarget::Motion(Motion::LineStart))
            }
            other => panic!("expected ApplyOperator got {other:?}"),
        }
    }

    #[test]
    fn doubled_operator_is_linewise() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "3dd"),
            ParseOutcome::Execute(Action::LinewiseOperator {
                op: OperatorKind::Delete,
                count: 3,
                register: None
            })
        );
        assert_eq!(
            last(&mut tr, ">>"),
            ParseOutcome::Execute(Action::LinewiseOperator {
                op: OperatorKind::Indent,
                count: 1,
                register: None
            })
        );
    }

    #[test]
    fn register_before_and_after_count() {
        let mut tr = KeyTranslator::new();
        let expected = ParseOutcome::Execute(Action::LinewiseOperator {
            op: OperatorKind::Delete,
            count: 3,
            register: named('a'),
        });
        assert_eq!(last(&mut tr, "\"a3dd"), expected);
        assert_eq!(last(&mut tr, "3\"add"), expected);

        let mut strict = KeyTranslator::new().with_register_after_count(false);
        assert_eq!(last(&mut strict, "\"a3dd"), expected);
        let out = feed(&mut strict, Mode::Normal, "3\"");
        assert_eq!(out[1], ParseOutcome::Invalid);
        assert!(!strict.is_pending());
    }

    #[test]
    fn counts_around_register_multiply() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "3\"a2dd"),
            ParseOutcome::Execute(Action::LinewiseOperator {
                op: OperatorKind::Delete,
                count: 6,
                register: named('a'),
            })
        );
        match last(&mut tr, "2\"b3d2w") {
            ParseOutcome::Execute(Action::ApplyOperator { count, register, .. }) => {
                assert_eq!(count, Some(12));
                assert_eq!(register, named('b'));
            }
            other => panic!("expected ApplyOperator got {other:?}"),
        }
    }

    #[test]
    fn invalid_register_and_unknown_keys_reset() {
        let mut tr = KeyTranslator::new();
        let out = feed(&mut tr, Mode::Normal, "\"%");
        assert_eq!(out[1], ParseOutcome::Invalid);
        let out = feed(&mut tr, Mode::Normal, "dQ");
        assert_eq!(out[1], ParseOutcome::Invalid);
        assert_eq!(last(&mut tr, "Q"), ParseOutcome::Invalid);
        assert_eq!(tr.pending_keys(), "");
    }

    #[test]
    fn escape_cancels_pending() {
        let mut tr = KeyTranslator::new();
        feed(&mut tr, Mode::Normal, "2\"ad");
        assert_eq!(tr.pending_keys(), "2\"ad");
        assert_eq!(last(&mut tr, "<Esc>"), ParseOutcome::Cancelled);
        assert!(!tr.is_pending());
    }

    #[test]
    fn text_objects_after_operator() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "ci\""),
            ParseOutcome::Execute(Action::ApplyOperator {
                op: OperatorKind::Change,
                target: OperatorTarget::TextObject(TextObject {
                    kind: TextObjectKind::Quote('"'),
                    around: false
                }),
                count: None,
                register: None,
            })
        );
        // `i` without an operator enters Insert
        assert_eq!(
            last(&mut tr, "i"),
            ParseOutcome::Execute(Action::ModeChange(ModeChange::EnterInsert(
                InsertEntry::BeforeCursor
            )))
        );
    }

    #[test]
    fn char_commands() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "2fx"),
            ParseOutcome::Execute(Action::Motion {
                motion: Motion::Find {
                    ch: 'x',
                    kind: FindKind::Forward
                },
                count: Some(2)
            })
        );
        assert_eq!(
            last(&mut tr, "3rz"),
            ParseOutcome::Execute(Action::ReplaceChar { ch: 'z', count: 3 })
        );
        assert_eq!(last(&mut tr, "ma"), ParseOutcome::Execute(Action::SetMark('a')));
        assert_eq!(
            last(&mut tr, "d'a"),
            ParseOutcome::Execute(Action::ApplyOperator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(Motion::Mark {
                    name: 'a',
                    linewise: true
                }),
                count: None,
                register: None,
            })
        );
        assert_eq!(last(&mut tr, "m1"), ParseOutcome::Invalid);
    }

    #[test]
    fn shorthands_and_prefixes() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "3x"),
            ParseOutcome::Execute(Action::ApplyOperator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(Motion::Right),
                count: Some(3),
                register: None,
            })
        );
        assert_eq!(
            last(&mut tr, "Y"),
            ParseOutcome::Execute(Action::LinewiseOperator {
                op: OperatorKind::Yank,
                count: 1,
                register: None
            })
        );
        assert_eq!(
            last(&mut tr, "gg"),
            ParseOutcome::Execute(Action::Motion {
                motion: Motion::FirstLine,
                count: None
            })
        );
        assert_eq!(
            last(&mut tr, "ZZ"),
            ParseOutcome::Execute(Action::Ex(ParsedCommand::WriteIfModifiedQuit))
        );
        assert_eq!(
            last(&mut tr, "ZQ"),
            ParseOutcome::Execute(Action::Ex(ParsedCommand::Quit { force: true }))
        );
    }

    #[test]
    fn chords_pass_through_except_redo() {
        let mut tr = KeyTranslator::new();
        assert_eq!(
            last(&mut tr, "2<C-r>"),
            ParseOutcome::Execute(Action::Redo { count: 2 })
        );
        assert_eq!(last(&mut tr, "<C-d>"), ParseOutcome::PassThrough);
        assert_eq!(last(&mut tr, "<PageDown>"), ParseOutcome::PassThrough);
        let alt = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(tr.translate(Mode::Insert, "", &alt), ParseOutcome::PassThrough);
    }

    #[test]
    fn visual_mode_keys() {
        let mut tr = KeyTranslator::new();
        let out = feed(&mut tr, Mode::Visual, "\"bd");
        assert_eq!(
            out[2],
            ParseOutcome::Execute(Action::VisualOperator {
                op: OperatorKind::Delete,
                count: 1,
                register: named('b'),
                linewise: false,
            })
        );
        let out = feed(&mut tr, Mode::Visual, "iw");
        assert!(matches!(
            out[1],
            ParseOutcome::Execute(Action::VisualTextObject { .. })
        ));
        let out = feed(&mut tr, Mode::VisualLine, "<Esc>");
        assert_eq!(
            out[0],
            ParseOutcome::Execute(Action::ModeChange(ModeChange::LeaveVisual))
        );
    }

    #[test]
    fn insert_and_command_line_keys() {
        let mut tr = KeyTranslator::new();
        let out = feed(&mut tr, Mode::Insert, "a<CR><BS><Esc>");
        assert_eq!(out[0], ParseOutcome::Execute(Action::Edit(EditKind::InsertChar('a'))));
        assert_eq!(out[1], ParseOutcome::Execute(Action::Edit(EditKind::InsertNewline)));
        assert_eq!(out[2], ParseOutcome::Execute(Action::Edit(EditKind::Backspace)));
        assert_eq!(
            out[3],
            ParseOutcome::Execute(Action::ModeChange(ModeChange::LeaveInsert))
        );
        let q = KeyEvent::char('q');
        assert_eq!(
            tr.translate(Mode::Normal, ":", &q),
            ParseOutcome::Execute(Action::CommandChar('q'))
        );
        let enter = KeyEvent::plain(KeyCode::Enter);
        assert_eq!(
            tr.translate(Mode::Normal, ":q", &enter),
            ParseOutcome::Execute(Action::CommandExecute)
        );
    }
}
