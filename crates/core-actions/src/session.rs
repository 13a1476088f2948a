//! Session: one buffer under modal editing.
//!
//! The session owns the editor state, the key translator, the cursor and the
//! collaborators (status sink, ex host, clipboard). Hosts feed it key events
//! one at a time with [`Session::handle_key`] (or a whole script with
//! [`Session::feed`]) and read back cursor, mode and status.

use crate::dispatcher::{self, Context, DispatchResult, ExOutcome, ParsedCommand};
use crate::error::{ActionError, ExError};
use crate::host::{ExHost, MemoryHost, Notifier, StatusLog, StatusMessage, StatusSink};
use crate::key_translator::{KeyTranslator, ParseOutcome};
use crate::Action;
use core_config::EditorOptions;
use core_events::{KeyEvent, KeyNotationError, parse_keys};
use core_state::{Clipboard, EditorState, Mode, RegisterKind, SelectionSpan};
use core_text::motion::FindKind;
use core_text::{Buffer, Position, TextBuffer};
use tracing::{debug, trace};

/// What handling one key did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// The buffer text changed.
    Mutated,
    /// Consumed without touching the text (motion, pending key, error ...).
    Handled,
    /// Not part of the command language; the host may act on it.
    PassThrough,
    /// Enter executed a command line (or `ZZ`/`ZQ` an ex command).
    Ex(Result<ExOutcome, ExError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterEntry {
    pub name: char,
    pub kind: RegisterKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEntry {
    pub name: char,
    /// Zero-based.
    pub line: usize,
    pub column: usize,
    /// Text of the marked line (empty for invalid marks).
    pub text: String,
    pub valid: bool,
}

/// Data the host's mode indicator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub mode: &'static str,
    pub pending: String,
    pub command_line: String,
    pub registers: Vec<RegisterEntry>,
    pub marks: Vec<MarkEntry>,
}

pub struct Session<B: TextBuffer = Buffer> {
    state: EditorState<B>,
    translator: KeyTranslator,
    cursor: Position,
    sticky_col: Option<usize>,
    last_find: Option<(char, FindKind)>,
    command_line: String,
    replace_backup: Vec<Option<String>>,
    options: EditorOptions,
    status: Notifier,
    host: Box<dyn ExHost>,
    pending_confirmation: Option<ParsedCommand>,
    quit_requested: bool,
}

impl<B: TextBuffer> Session<B> {
    pub fn new(buffer: B) -> Self {
        let options = EditorOptions::default();
        Self {
            state: EditorState::new(buffer).with_undo_history(options.undo_history),
            translator: KeyTranslator::new()
                .with_register_after_count(options.register_after_count),
            cursor: Position::origin(),
            sticky_col: None,
            last_find: None,
            command_line: String::new(),
            replace_backup: Vec::new(),
            options,
            status: Notifier::new(Box::new(StatusLog::new())),
            host: Box::new(MemoryHost::default()),
            pending_confirmation: None,
            quit_requested: false,
        }
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.state = self.state.with_undo_history(options.undo_history);
        self.translator = KeyTranslator::new().with_register_after_count(options.register_after_count);
        self.options = options;
        self
    }

    pub fn with_status_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.status = Notifier::new(Box::new(sink));
        self
    }

    pub fn with_host(mut self, host: impl ExHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.state.registers.set_clipboard(Box::new(clipboard));
        self
    }

    /// Handle one key event.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyResult {
        let outcome = self
            .translator
            .translate(self.state.mode, &self.command_line, key);
        trace!(target: "actions.dispatch", key = %key, ?outcome, "key_outcome");
        match outcome {
            ParseOutcome::NeedMore | ParseOutcome::Invalid | ParseOutcome::Cancelled => {
                KeyResult::Handled
            }
            ParseOutcome::PassThrough => KeyResult::PassThrough,
            ParseOutcome::Execute(action) => self.run(action),
        }
    }

    /// Handle every key of a Vim-notation script (`"3dd:wq<CR>"`).
    pub fn feed(&mut self, notation: &str) -> Result<Vec<KeyResult>, KeyNotationError> {
        let keys = parse_keys(notation)?;
        Ok(keys.iter().map(|k| self.handle_key(k)).collect())
    }

    /// Execute an ex command line directly (leading `:` optional).
    pub fn execute_ex(&mut self, line: &str) -> Result<ExOutcome, ExError> {
        let command = dispatcher::CommandParser::parse(line);
        self.run_ex(command)
    }

    /// Execute the command that last answered `ConfirmationRequired`, forced.
    /// `None` when nothing awaits confirmation.
    pub fn confirm(&mut self) -> Option<Result<ExOutcome, ExError>> {
        let command = self.pending_confirmation.take()?;
        Some(self.run_ex(command.forced()))
    }

    fn run_ex(&mut self, command: ParsedCommand) -> Result<ExOutcome, ExError> {
        match self.run(Action::Ex(command)) {
            KeyResult::Ex(result) => result,
            _ => Ok(ExOutcome::Nothing),
        }
    }

    fn run(&mut self, action: Action) -> KeyResult {
        let is_ex = matches!(action, Action::CommandExecute | Action::Ex(_));
        let mut cx = Context {
            state: &mut self.state,
            cursor: &mut self.cursor,
            sticky_col: &mut self.sticky_col,
            last_find: &mut self.last_find,
            command_line: &mut self.command_line,
            replace_backup: &mut self.replace_backup,
            options: &self.options,
            status: &mut self.status,
            host: &mut *self.host,
            pending_confirmation: &mut self.pending_confirmation,
        };
        match dispatcher::dispatch(action, &mut cx) {
            Ok(DispatchResult { mutated, quit, ex }) => {
                if quit {
                    debug!(target: "actions.dispatch", "quit_requested");
                    self.quit_requested = true;
                }
                match ex {
                    Some(outcome) => KeyResult::Ex(Ok(outcome)),
                    None if mutated => KeyResult::Mutated,
                    None => KeyResult::Handled,
                }
            }
            Err(err) => {
                self.status.error(err.to_string());
                match err {
                    ActionError::Ex(ex) if is_ex => KeyResult::Ex(Err(ex)),
                    _ => KeyResult::Handled,
                }
            }
        }
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor (clamped to the buffer for the current mode).
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
        self.sticky_col = None;
        if self.state.mode.is_typing() {
            core_text::motion::clamp_position(&self.state.buffer, &mut self.cursor);
        } else {
            core_text::motion::normalize_normal_mode_position(&self.state.buffer, &mut self.cursor);
        }
        if let Some(kind) = self.state.mode.selection_kind() {
            self.state.selection.update(self.cursor, kind);
        }
    }

    pub fn selection(&self) -> Option<SelectionSpan> {
        self.state.selection()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn text(&self) -> String {
        self.state.buffer.text()
    }

    pub fn state(&self) -> &EditorState<B> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState<B> {
        &mut self.state
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn last_message(&self) -> Option<&StatusMessage> {
        self.status.last()
    }

    pub fn is_modified(&self) -> bool {
        self.state.is_modified()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Keys of the pending command in Vim notation.
    pub fn pending_keys(&self) -> String {
        self.translator.pending_keys()
    }

    /// Open command line including `:`; empty when closed.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        let buf = &self.state.buffer;
        let registers = self
            .state
            .registers
            .snapshot()
            .into_iter()
            .map(|(name, reg)| RegisterEntry {
                name,
                kind: reg.kind,
                content: reg.content,
            })
            .collect();
        let marks = self
            .state
            .marks
            .iter()
            .map(|(name, mark)| {
                let valid = mark.valid && mark.line < buf.line_count();
                MarkEntry {
                    name,
                    line: mark.line,
                    column: mark.column,
                    text: if valid {
                        buf.line_content(mark.line)
                    } else {
                        String::new()
                    },
                    valid,
                }
            })
            .collect();
        StatusSnapshot {
            mode: self.state.mode.name(),
            pending: self.pending_keys(),
            command_line: self.command_line.clone(),
            registers,
            marks,
        }
    }
}
