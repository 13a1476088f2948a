//! Modal editing layer: key translation, motion resolution, operators, mode
//! transitions and the command line, driven through a [`Session`].
//!
//! Keys flow `KeyEvent -> KeyTranslator -> Action -> dispatcher`. The
//! translator owns the pending command (counts, register, operator); the
//! dispatcher owns no state of its own and mutates the session fields handed
//! to it through [`dispatcher::Context`].

use core_state::{RegisterName, SelectionKind};
use core_text::motion::{FindKind, WordStyle};
use core_text::object::TextObject;

pub mod dispatcher;
pub mod error;
pub mod host;
pub mod key_translator;
pub mod session;
pub mod span_resolver;

pub use dispatcher::{CommandParser, DispatchResult, ExOutcome, GotoTarget, ParsedCommand};
pub use error::{ActionError, ExError, MotionError};
pub use host::{ExHost, MemoryHost, StatusKind, StatusLog, StatusMessage, StatusSink};
pub use key_translator::{KeyTranslator, ParseOutcome};
pub use session::{KeyResult, MarkEntry, RegisterEntry, Session, StatusSnapshot};
pub use span_resolver::{MotionRange, RangeKind};

/// Counts are clamped so `count1 * count2` never overflows.
pub const MAX_COUNT: u32 = 999_999;

/// Cursor motions. Counts travel separately so `G` can tell `G` from `1G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordForward(WordStyle),
    WordBackward(WordStyle),
    WordEnd(WordStyle),
    LineStart,
    LineEnd,
    FirstNonBlank,
    /// `gg`
    FirstLine,
    /// `G`
    LastLine,
    /// `+` / Enter
    NextLineStart,
    /// `-`
    PrevLineStart,
    Find { ch: char, kind: FindKind },
    /// `;` (same direction) and `,` (reversed).
    RepeatFind { reverse: bool },
    ParagraphForward,
    ParagraphBackward,
    SentenceForward,
    SentenceBackward,
    /// `` `x `` (exact) or `'x` (linewise, first non-blank).
    Mark { name: char, linewise: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Delete,
    Yank,
    Change,
    Indent,
    Outdent,
}

impl OperatorKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Delete),
            'y' => Some(Self::Yank),
            'c' => Some(Self::Change),
            '>' => Some(Self::Indent),
            '<' => Some(Self::Outdent),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Yank => 'y',
            Self::Change => 'c',
            Self::Indent => '>',
            Self::Outdent => '<',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorTarget {
    Motion(Motion),
    TextObject(TextObject),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    BeforeCursor,
    /// `a`
    AfterCursor,
    /// `I`
    FirstNonBlank,
    /// `A`
    LineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    EnterInsert(InsertEntry),
    EnterReplace,
    /// Leave Insert or Replace.
    LeaveInsert,
    /// `v` / `V`: enter, switch kind, or toggle off.
    EnterVisual(SelectionKind),
    LeaveVisual,
    /// `o` in Visual modes.
    SwapVisualAnchor,
}

/// Keys typed in Insert or Replace mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    InsertNewline,
    InsertTab,
    Backspace,
    DeleteForward,
}

/// A fully parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Motion {
        motion: Motion,
        count: Option<u32>,
    },
    ApplyOperator {
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<u32>,
        register: Option<RegisterName>,
    },
    /// Doubled operator (`dd`, `yy`, `>>` ...): `count` whole lines.
    LinewiseOperator {
        op: OperatorKind,
        count: u32,
        register: Option<RegisterName>,
    },
    /// Operator applied to the Visual selection. `linewise` forces whole lines
    /// (`D`, `X`, `Y`, `C`, `S`, `R` in Visual modes).
    VisualOperator {
        op: OperatorKind,
        count: u32,
        register: Option<RegisterName>,
        linewise: bool,
    },
    /// `iw`, `ap` ... typed in a Visual mode: select the object.
    VisualTextObject {
        object: TextObject,
        count: u32,
    },
    ModeChange(ModeChange),
    Put {
        before: bool,
        count: u32,
        register: Option<RegisterName>,
    },
    Undo {
        count: u32,
    },
    Redo {
        count: u32,
    },
    SetMark(char),
    ReplaceChar {
        ch: char,
        count: u32,
    },
    JoinLines {
        count: u32,
    },
    Edit(EditKind),
    CommandStart,
    CommandChar(char),
    CommandBackspace,
    CommandCancel,
    CommandExecute,
    /// Ex command issued by a Normal-mode shorthand (`ZZ`, `ZQ`).
    Ex(ParsedCommand),
}
