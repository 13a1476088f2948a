//! Command line editing and ex execution (`:w`, `:q`, `:wq`, `:x`, `:N`).
//!
//! The command line is a plain string starting with `:` while open. Enter
//! parses it with [`CommandParser`] and executes the result; every outcome
//! posts a status message. Unknown commands and save failures are errors and
//! leave buffer and modification state untouched.

use super::command_parser::{CommandParser, GotoTarget, ParsedCommand};
use super::{Context, DispatchResult, mode};
use crate::Action;
use crate::error::{ActionError, ExError};
use core_state::JUMP_MARK;
use core_text::{Position, TextBuffer, motion};
use tracing::{info, warn};

/// What an executed ex command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExOutcome {
    Written,
    Quit,
    WrittenAndQuit,
    /// Cursor moved to the zero-based `line`.
    Jumped { line: usize },
    /// The command would discard changes; re-issue it forced or confirm.
    ConfirmationRequired { command: ParsedCommand },
    Nothing,
}

impl ExOutcome {
    pub fn quits(&self) -> bool {
        matches!(self, Self::Quit | Self::WrittenAndQuit)
    }
}

pub(super) fn handle_command_action<B: TextBuffer>(
    action: Action,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    match action {
        Action::CommandStart => {
            if cx.state.mode.is_visual() {
                mode::leave_visual(cx);
            }
            cx.command_line.clear();
            cx.command_line.push(':');
            Ok(DispatchResult::clean())
        }
        Action::CommandChar(ch) => {
            cx.command_line.push(ch);
            Ok(DispatchResult::clean())
        }
        Action::CommandBackspace => {
            // backspacing over the `:` closes the line
            cx.command_line.pop();
            Ok(DispatchResult::clean())
        }
        Action::CommandCancel => {
            cx.command_line.clear();
            Ok(DispatchResult::clean())
        }
        Action::CommandExecute => {
            let raw = std::mem::take(cx.command_line);
            execute(CommandParser::parse(&raw), cx)
        }
        _ => Ok(DispatchResult::clean()),
    }
}

/// Execute a parsed ex command.
pub(super) fn execute<B: TextBuffer>(
    command: ParsedCommand,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    info!(target: "actions.ex", command = ?command, "ex_execute");
    let outcome = match command {
        ParsedCommand::Write => {
            save(cx)?;
            cx.status.info("Note has been saved");
            ExOutcome::Written
        }
        ParsedCommand::Quit { force } => {
            if !force && cx.state.is_modified() {
                return Ok(confirmation_required(ParsedCommand::Quit { force }, cx));
            }
            quit(cx)
        }
        ParsedCommand::WriteQuit => {
            save(cx)?;
            write_and_quit(cx)
        }
        ParsedCommand::WriteIfModifiedQuit => {
            if cx.state.is_modified() {
                save(cx)?;
                write_and_quit(cx)
            } else {
                quit(cx)
            }
        }
        ParsedCommand::Goto(target) => goto(target, cx),
        ParsedCommand::Nop => ExOutcome::Nothing,
        ParsedCommand::Unknown(text) => {
            return Err(ExError::NotAnEditorCommand(text).into());
        }
    };
    *cx.pending_confirmation = None;
    Ok(DispatchResult::ex(outcome))
}

fn confirmation_required<B: TextBuffer>(
    command: ParsedCommand,
    cx: &mut Context<'_, B>,
) -> DispatchResult {
    cx.status
        .error("No write since last change (add ! to override)");
    *cx.pending_confirmation = Some(command.clone());
    DispatchResult::ex(ExOutcome::ConfirmationRequired { command })
}

fn save<B: TextBuffer>(cx: &mut Context<'_, B>) -> Result<(), ExError> {
    let text = cx.state.buffer.text();
    if let Err(err) = cx.host.save(&text) {
        warn!(target: "actions.ex", error = %err, "save_failed");
        return Err(ExError::SaveFailed(err.to_string()));
    }
    cx.state.mark_saved();
    Ok(())
}

fn quit<B: TextBuffer>(cx: &mut Context<'_, B>) -> ExOutcome {
    cx.host.quit();
    cx.status.info("Quit");
    ExOutcome::Quit
}

fn write_and_quit<B: TextBuffer>(cx: &mut Context<'_, B>) -> ExOutcome {
    cx.host.quit();
    cx.status.info("Quit with note having been saved");
    ExOutcome::WrittenAndQuit
}

fn goto<B: TextBuffer>(target: GotoTarget, cx: &mut Context<'_, B>) -> ExOutcome {
    let last = cx.state.buffer.line_count() - 1;
    let line = match target {
        GotoTarget::Number(n) => n.max(1).saturating_sub(1).min(last),
        GotoTarget::Last => last,
        GotoTarget::Relative(delta) => {
            let wanted = (cx.cursor.line as i64).saturating_add(delta);
            wanted.clamp(0, last as i64) as usize
        }
    };
    cx.state.marks.set(JUMP_MARK, *cx.cursor);
    let mut pos = Position::new(line, 0);
    motion::first_non_blank(&cx.state.buffer, &mut pos);
    *cx.cursor = pos;
    ExOutcome::Jumped { line }
}
