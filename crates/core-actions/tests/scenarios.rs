mod common;

use common::*;
use core_actions::{ExOutcome, KeyResult, ParsedCommand};
use core_state::{Mode, RegisterKind};
use core_text::Position;
use pretty_assertions::assert_eq;

#[test]
fn delete_word_fills_unnamed_register() {
    let mut h = Harness::new("hello world\n");
    h.keys("dw");
    assert_eq!(h.text(), "world\n");
    assert_eq!(h.unnamed(), "hello ");
    assert_eq!(
        h.session.state().registers.unnamed().kind,
        RegisterKind::Characterwise
    );
    assert_eq!(h.cursor(), Position::new(0, 0));
}

#[test]
fn counted_line_delete_reports_fewer_lines() {
    let mut h = Harness::new(&numbered_lines(5));
    h.keys("3dd");
    assert_eq!(h.text(), "line 4\nline 5\n");
    assert_eq!(h.last_message().as_deref(), Some("3 fewer lines"));
    assert_eq!(h.unnamed(), "line 1\nline 2\nline 3\n");
    assert!(h.session.state().registers.unnamed().is_linewise());
    assert_eq!(h.cursor(), Position::new(0, 0));
}

#[test]
fn quit_with_changes_asks_for_confirmation() {
    let mut h = Harness::new("abc\n");
    h.keys("x");
    let results = h.keys(":q<CR>");
    assert_eq!(
        results.last(),
        Some(&KeyResult::Ex(Ok(ExOutcome::ConfirmationRequired {
            command: ParsedCommand::Quit { force: false }
        })))
    );
    assert_eq!(
        h.last_message().as_deref(),
        Some("No write since last change (add ! to override)")
    );
    assert!(!h.session.quit_requested());
    assert!(!h.host.borrow().quit_requested);
    assert_eq!(h.text(), "bc\n");

    assert_eq!(h.session.confirm(), Some(Ok(ExOutcome::Quit)));
    assert!(h.session.quit_requested());
    assert!(h.host.borrow().quit_requested);
    assert!(h.host.borrow().saved.is_empty());
}

#[test]
fn mark_jump_and_invalidation() {
    let mut h = Harness::new(&numbered_lines(10));
    h.keys("5Gma");
    assert_eq!(h.cursor(), Position::new(4, 0));
    h.keys("gg`a");
    assert_eq!(h.cursor(), Position::new(4, 0));
    assert_eq!(h.session.mode(), Mode::Normal);

    h.keys("dd");
    assert_eq!(h.session.text().lines().nth(4), Some("line 6"));
    h.keys("gg`a");
    assert_eq!(
        h.last_message().as_deref(),
        Some("Mark has invalid line number")
    );
    assert_eq!(h.cursor(), Position::new(0, 0));

    h.keys("'a");
    assert_eq!(
        h.last_message().as_deref(),
        Some("Mark has invalid line number")
    );
}
