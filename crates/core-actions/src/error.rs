//! Error types surfaced to the status line.

use core_state::{MarkError, RegisterError};
use thiserror::Error;

/// A motion (or text object) that cannot be resolved from the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error(transparent)]
    Mark(#[from] MarkError),
    #[error("Character not found: {0}")]
    CharNotFound(char),
    #[error("No previous character search")]
    NoPreviousFind,
    #[error("No text object at cursor")]
    NoTextObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExError {
    #[error("Not an editor command: {0}")]
    NotAnEditorCommand(String),
    #[error("Save failed: {0}")]
    SaveFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Motion(#[from] MotionError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Ex(#[from] ExError),
}
