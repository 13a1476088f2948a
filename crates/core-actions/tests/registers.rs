mod common;

use common::*;
use core_state::{MemoryClipboard, RegisterKind};
use pretty_assertions::assert_eq;

#[test]
fn named_register_yank_and_put() {
    let mut h = Harness::new("foo bar\n");
    h.keys("\"ayw");
    assert_eq!(h.session.state().registers.named('a').unwrap().content, "foo ");
    assert_eq!(h.unnamed(), "foo ");
    h.keys("$\"ap");
    assert_eq!(h.text(), "foo barfoo \n");
}

#[test]
fn uppercase_name_appends() {
    let mut h = Harness::new("foo bar\n");
    h.keys("\"ayww\"Ayw");
    let reg = h.session.state().registers.named('a').unwrap();
    assert_eq!(reg.content, "foo bar");
    assert_eq!(reg.kind, RegisterKind::Characterwise);
    // the unnamed register mirrors the whole appended register
    assert_eq!(h.unnamed(), "foo bar");
}

#[test]
fn register_before_or_after_count() {
    let a = apply(&numbered_lines(4), "\"a2dd\"ap");
    let b = apply(&numbered_lines(4), "2\"add\"ap");
    assert_eq!(a, "line 3\nline 1\nline 2\nline 4\n");
    assert_eq!(a, b);
}

#[test]
fn counts_on_both_sides_of_register_multiply() {
    let mut h = Harness::new(&numbered_lines(40));
    h.keys("3\"a2dd");
    assert_eq!(h.text().lines().next(), Some("line 7"));
    assert_eq!(h.text().lines().count(), 34);
    let a = h.session.state().registers.named('a').unwrap();
    assert_eq!(a.content, numbered_lines(6));
    assert_eq!(h.last_message().as_deref(), Some("6 fewer lines"));
}

#[test]
fn line_deletes_shift_numbered_registers() {
    let mut h = Harness::new("a\nb\nc\n");
    h.keys("dddd");
    let numbered = h.session.state().registers.numbered();
    assert_eq!(numbered[1].content, "b\n");
    assert_eq!(numbered[2].content, "a\n");
    h.keys("\"2p");
    assert_eq!(h.text(), "c\na\n");
}

#[test]
fn small_deletes_leave_numbered_registers_alone() {
    let mut h = Harness::new("abc\n");
    h.keys("x");
    assert_eq!(h.unnamed(), "a");
    assert!(h.session.state().registers.numbered()[1].is_empty());
}

#[test]
fn yank_register_survives_deletes() {
    let mut h = Harness::new("a\nb\n");
    h.keys("yyjdd");
    assert_eq!(h.unnamed(), "b\n");
    h.keys("\"0p");
    assert_eq!(h.text(), "a\na\n");
}

#[test]
fn black_hole_keeps_unnamed() {
    let mut h = Harness::new("a\nb\nc\n");
    h.keys("yyj\"_dd");
    assert_eq!(h.text(), "a\nc\n");
    assert_eq!(h.unnamed(), "a\n");
    assert!(h.session.state().registers.numbered()[1].is_empty());
}

#[test]
fn clipboard_register_reads_and_writes() {
    let mut s = session("x\n").with_clipboard(MemoryClipboard::with_text("clip"));
    s.feed("\"+p").unwrap();
    assert_eq!(s.text(), "xclip\n");

    let mut s = session("x\n").with_clipboard(MemoryClipboard::new());
    s.feed("\"+yy\"+P").unwrap();
    assert_eq!(s.text(), "x\nx\n");
}

#[test]
fn put_from_empty_register_is_reported() {
    let mut h = Harness::new("abc\n");
    h.keys("p");
    assert_eq!(h.text(), "abc\n");
    assert_eq!(h.last_message().as_deref(), Some("Nothing in register \""));
    h.keys("\"qP");
    assert_eq!(h.text(), "abc\n");
    assert_eq!(h.last_message().as_deref(), Some("Nothing in register q"));
    assert!(!h.session.is_modified());
}

#[test]
fn counted_put_repeats_content() {
    assert_eq!(apply("x\n", "yl3p"), "xxxx\n");
    assert_eq!(apply("a\nb\n", "yy2p"), "a\na\na\nb\n");
}

#[test]
fn linewise_put_after_unterminated_last_line() {
    let mut h = Harness::new("a\nb");
    h.keys("yyjp");
    assert_eq!(h.text(), "a\nb\na");
    assert_eq!(h.cursor().line, 2);
}

#[test]
fn change_fills_registers() {
    let mut h = Harness::new("foo bar\n");
    h.keys("cwbaz<Esc>");
    assert_eq!(h.text(), "baz bar\n");
    assert_eq!(h.unnamed(), "foo");
}
