//! Undo / Redo dispatch.
//!
//! Both post one aggregate message for the whole count and restore the cursor
//! recorded with the last unit they replayed.

use super::{Context, DispatchResult};
use crate::error::ActionError;
use core_text::TextBuffer;
use tracing::trace;

pub(super) fn handle_undo<B: TextBuffer>(
    count: u32,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    match cx.state.undo(*cx.cursor, count.max(1) as usize) {
        Some(summary) => {
            trace!(target: "actions.dispatch", op = "undo", units = summary.units, "undo");
            *cx.cursor = summary.cursor;
            cx.status.info(summary.to_string());
            Ok(DispatchResult::mutated())
        }
        None => {
            cx.status.info("Already at oldest change");
            Ok(DispatchResult::clean())
        }
    }
}

pub(super) fn handle_redo<B: TextBuffer>(
    count: u32,
    cx: &mut Context<'_, B>,
) -> Result<DispatchResult, ActionError> {
    match cx.state.redo(*cx.cursor, count.max(1) as usize) {
        Some(summary) => {
            trace!(target: "actions.dispatch", op = "redo", units = summary.units, "redo");
            *cx.cursor = summary.cursor;
            cx.status.info(summary.to_string());
            Ok(DispatchResult::mutated())
        }
        None => {
            cx.status.info("Already at newest change");
            Ok(DispatchResult::clean())
        }
    }
}
