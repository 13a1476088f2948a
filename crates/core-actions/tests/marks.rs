mod common;

use common::*;
use core_text::Position;
use pretty_assertions::assert_eq;

#[test]
fn linewise_mark_jump_goes_to_first_non_blank() {
    let mut h = Harness::new("a\n  indented text\nc\n");
    h.keys("jwwmagg'a");
    assert_eq!(h.cursor(), Position::new(1, 2));
    h.keys("gg`a");
    assert_eq!(h.cursor(), Position::new(1, 11));
}

#[test]
fn unset_mark_is_an_error() {
    let mut h = Harness::new("abc\n");
    h.keys("`z");
    assert_eq!(h.last_message().as_deref(), Some("Mark not set"));
    assert_eq!(h.cursor(), Position::origin());
}

#[test]
fn marks_follow_inserted_lines() {
    let mut h = Harness::new("a\nb\nc\n");
    h.keys("jmaggOnew<Esc>");
    assert_eq!(h.text(), "new\na\nb\nc\n");
    h.keys("`a");
    assert_eq!(h.cursor(), Position::new(2, 0));
}

#[test]
fn marks_follow_deleted_lines_above() {
    let mut h = Harness::new(&numbered_lines(6));
    h.keys("5Gmagg2dd`a");
    assert_eq!(h.cursor(), Position::new(2, 0));
    assert_eq!(h.text().lines().nth(2), Some("line 5"));
}

#[test]
fn jump_mark_toggles_between_positions() {
    let mut h = Harness::new(&numbered_lines(5));
    h.keys("G");
    assert_eq!(h.cursor().line, 4);
    h.keys("''");
    assert_eq!(h.cursor().line, 0);
    h.keys("''");
    assert_eq!(h.cursor().line, 4);
    h.keys("``");
    assert_eq!(h.cursor().line, 0);
}

#[test]
fn plain_motions_do_not_set_jump_mark() {
    let mut h = Harness::new(&numbered_lines(5));
    h.keys("jj''");
    assert_eq!(h.last_message().as_deref(), Some("Mark not set"));
    assert_eq!(h.cursor().line, 2);
}

#[test]
fn operator_to_mark() {
    let mut h = Harness::new(&numbered_lines(5));
    h.keys("3Gmaggd'a");
    assert_eq!(h.text(), "line 4\nline 5\n");
    assert_eq!(h.last_message().as_deref(), Some("3 fewer lines"));

    let mut h = Harness::new("abcdef\n");
    h.keys("4lmb0d`b");
    assert_eq!(h.text(), "ef\n");
    assert_eq!(h.unnamed(), "abcd");
}

#[test]
fn visual_marks_record_last_selection() {
    let mut h = Harness::new("one\ntwo\nthree\n");
    h.keys("lvjl<Esc>gg`<");
    assert_eq!(h.cursor(), Position::new(0, 1));
    h.keys("`>");
    assert_eq!(h.cursor(), Position::new(1, 2));
}

#[test]
fn mark_listing_reports_line_text() {
    let mut h = Harness::new(&numbered_lines(3));
    h.keys("jmbjdd");
    let marks = h.session.status_snapshot().marks;
    let b = marks.iter().find(|m| m.name == 'b').unwrap();
    assert!(b.valid);
    assert_eq!((b.line, b.text.as_str()), (1, "line 2"));

    h.keys("dd");
    let marks = h.session.status_snapshot().marks;
    let b = marks.iter().find(|m| m.name == 'b').unwrap();
    assert!(!b.valid);
    assert_eq!(b.text, "");
}
