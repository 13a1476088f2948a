//! Dispatcher applying `Action` to mutable session state.
//!
//! The dispatcher keeps no state of its own. Everything an action may touch is
//! borrowed through [`Context`], built by the session for each action:
//! * `motion`   - cursor movement and Visual text-object selection
//! * `mode`     - mode transitions (Insert/Replace entries, Visual toggles)
//! * `operator` - delete / yank / change / indent, put
//! * `edit`     - Insert/Replace typing, join, replace-char
//! * `undo`     - undo / redo dispatch
//! * `command`  - command line editing and ex execution
//!
//! After every action the cursor is settled for the resulting mode: Normal
//! and Visual rest on a grapheme, Insert/Replace (and Visual after `$`) may
//! sit after the last one.

use crate::error::ActionError;
use crate::host::{ExHost, Notifier};
use crate::Action;
use core_config::EditorOptions;
use core_state::{EditorState, Mode};
use core_text::motion::FindKind;
use core_text::{Position, TextBuffer};
use tracing::trace;

mod command;
mod command_parser;
mod edit;
mod mode;
mod motion;
mod operator;
mod undo;

pub use command::ExOutcome;
pub use command_parser::{CommandParser, GotoTarget, ParsedCommand};

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// The buffer text changed.
    pub mutated: bool,
    /// The session should close.
    pub quit: bool,
    /// Outcome of an executed ex command.
    pub ex: Option<ExOutcome>,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn mutated() -> Self {
        Self {
            mutated: true,
            ..Self::default()
        }
    }

    pub fn ex(outcome: ExOutcome) -> Self {
        Self {
            mutated: false,
            quit: outcome.quits(),
            ex: Some(outcome),
        }
    }
}

/// Mutable view of a session handed to the handlers.
pub struct Context<'a, B: TextBuffer> {
    pub state: &'a mut EditorState<B>,
    pub cursor: &'a mut Position,
    pub sticky_col: &'a mut Option<usize>,
    pub last_find: &'a mut Option<(char, FindKind)>,
    /// Open command line including the leading `:` (empty when closed).
    pub command_line: &'a mut String,
    /// Characters overwritten in the current Replace session (`None` for
    /// characters appended past the end of a line).
    pub replace_backup: &'a mut Vec<Option<String>>,
    pub options: &'a EditorOptions,
    pub status: &'a mut Notifier,
    pub host: &'a mut dyn ExHost,
    pub pending_confirmation: &'a mut Option<ParsedCommand>,
}

/// Apply an action. Errors leave buffer and registers untouched.
pub fn dispatch<B: TextBuffer>(
    action: Action,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    trace!(target: "actions.dispatch", ?action, mode = cx.state.mode.name(), "dispatch");
    if !matches!(action, Action::Motion { .. }) {
        *cx.sticky_col = None;
    }
    let result = match action {
        Action::Motion { motion: m, count } => motion::handle_motion(m, count, cx),
        Action::ApplyOperator {
            op,
            target,
            count,
            register,
        } => operator::apply_to_target(op, target, count, register, cx),
        Action::LinewiseOperator {
            op,
            count,
            register,
        } => operator::apply_linewise(op, count, register, cx),
        Action::VisualOperator {
            op,
            count,
            register,
            linewise,
        } => operator::apply_visual(op, count, register, linewise, cx),
        Action::VisualTextObject { object, count } => {
            motion::select_text_object(object, count, cx)
        }
        Action::ModeChange(mc) => mode::handle_mode_change(mc, cx),
        Action::Put {
            before,
            count,
            register,
        } => operator::put(before, count, register, cx),
        Action::Undo { count } => undo::handle_undo(count, cx),
        Action::Redo { count } => undo::handle_redo(count, cx),
        Action::SetMark(name) => {
            cx.state.marks.set(name, *cx.cursor);
            Ok(DispatchResult::clean())
        }
        Action::ReplaceChar { ch, count } => edit::replace_char(ch, count, cx),
        Action::JoinLines { count } => edit::join_lines(count, cx),
        Action::Edit(kind) => edit::handle_edit(kind, cx),
        Action::CommandStart
        | Action::CommandChar(_)
        | Action::CommandBackspace
        | Action::CommandCancel
        | Action::CommandExecute => command::handle_command_action(action, cx),
        Action::Ex(cmd) => command::execute(cmd, cx),
    };
    settle_cursor(cx);
    result
}

/// Keep the cursor valid for the current mode and the selection in step with it.
fn settle_cursor<B: TextBuffer>(cx: &mut Context<'_, B>) {
    // `$` in charwise Visual selects through the end of line
    let past_end = cx.state.mode == Mode::Visual && *cx.sticky_col == Some(usize::MAX);
    // a newline typed at the end of an unterminated buffer opens an empty line
    let open_tail = cx.state.mode.is_typing() && cx.state.buffer.is_open_tail(*cx.cursor);
    if cx.state.mode.is_typing() || past_end {
        if !open_tail {
            core_text::motion::clamp_position(&cx.state.buffer, cx.cursor);
        }
    } else {
        core_text::motion::normalize_normal_mode_position(&cx.state.buffer, cx.cursor);
    }
    if let Some(kind) = cx.state.mode.selection_kind() {
        cx.state.selection.update(*cx.cursor, kind);
    }
}
