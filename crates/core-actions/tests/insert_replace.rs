mod common;

use common::*;
use core_actions::KeyResult;
use core_events::KeyEvent;
use core_state::Mode;
use core_text::Position;
use pretty_assertions::assert_eq;

#[test]
fn insert_before_cursor_and_leave() {
    let mut h = Harness::new("world\n");
    h.keys("ihello ");
    assert_eq!(h.session.mode(), Mode::Insert);
    assert_eq!(h.cursor(), Position::new(0, 6));
    h.keys("<Esc>");
    assert_eq!(h.text(), "hello world\n");
    assert_eq!(h.session.mode(), Mode::Normal);
    assert_eq!(h.cursor(), Position::new(0, 5));
}

#[test]
fn insert_entry_points() {
    assert_eq!(apply("world\n", "A!<Esc>"), "world!\n");
    assert_eq!(apply("world\n", "ax<Esc>"), "wxorld\n");
    assert_eq!(apply("  world\n", "$I-<Esc>"), "  -world\n");
    assert_eq!(apply("world\n", "oabc<Esc>"), "world\nabc\n");
    assert_eq!(apply("world\n", "Oabc<Esc>"), "abc\nworld\n");
    assert_eq!(apply("é\n", "aX<Esc>"), "éX\n");
}

#[test]
fn open_below_unterminated_last_line() {
    let mut h = Harness::new("a");
    h.keys("ob<Esc>");
    assert_eq!(h.text(), "a\nb");
    assert_eq!(h.cursor(), Position::new(1, 0));
}

#[test]
fn backspace_and_enter() {
    let mut h = Harness::new("a\nb\n");
    h.keys("ji<BS>");
    assert_eq!(h.text(), "ab\n");
    assert_eq!(h.cursor(), Position::new(0, 1));
    h.keys("<CR><Esc>");
    assert_eq!(h.text(), "a\nb\n");
    assert_eq!(h.cursor(), Position::new(1, 0));

    // backspace at the very start does nothing
    assert_eq!(apply("ab\n", "i<BS><BS>x<Esc>"), "xab\n");
    assert_eq!(apply("abc\n", "i<Del><Esc>"), "bc\n");
}

#[test]
fn tab_follows_expandtab() {
    assert_eq!(apply("x\n", "i<Tab><Esc>"), "    x\n");
}

#[test]
fn arrow_keys_move_inside_insert() {
    assert_eq!(apply("abc\n", "i<Right>X<Esc>"), "aXbc\n");
}

#[test]
fn insert_session_is_one_undo_unit() {
    let mut h = Harness::new("world\n");
    h.keys("ihello <Esc>u");
    assert_eq!(h.text(), "world\n");
    assert_eq!(
        h.last_message().as_deref(),
        Some("Undo 1 change; 1 line changed")
    );
    h.keys("<C-r>");
    assert_eq!(h.text(), "hello world\n");
    assert_eq!(
        h.last_message().as_deref(),
        Some("Redo 1 change; 1 line changed")
    );
}

#[test]
fn chords_pass_through_while_typing() {
    let mut h = Harness::new("abc\n");
    h.keys("i");
    assert_eq!(
        h.session.handle_key(&KeyEvent::ctrl('w')),
        KeyResult::PassThrough
    );
    assert_eq!(h.text(), "abc\n");
    assert_eq!(h.session.mode(), Mode::Insert);
}

#[test]
fn replace_overwrites_then_appends() {
    let mut h = Harness::new("abc\n");
    h.keys("RXY");
    assert_eq!(h.session.mode(), Mode::Replace);
    h.keys("<Esc>");
    assert_eq!(h.text(), "XYc\n");
    assert_eq!(h.cursor(), Position::new(0, 1));

    assert_eq!(apply("ab\n", "$RXYZ<Esc>"), "aXYZ\n");
}

#[test]
fn replace_backspace_restores_original() {
    assert_eq!(apply("abc\n", "RXY<BS><BS><Esc>"), "abc\n");
    assert_eq!(apply("ab\n", "$RXYZ<BS><BS><Esc>"), "aX\n");

    // before the first replaced character only the cursor moves
    let mut h = Harness::new("abc\n");
    h.keys("lR<BS>");
    assert_eq!(h.text(), "abc\n");
    assert_eq!(h.cursor(), Position::new(0, 0));
    h.keys("Z<Esc>");
    assert_eq!(h.text(), "Zbc\n");
}

#[test]
fn replace_session_undoes_as_one() {
    let mut h = Harness::new("abc\n");
    h.keys("RXYZW<Esc>u");
    assert_eq!(h.text(), "abc\n");
}

#[test]
fn escape_in_normal_is_a_no_op() {
    let mut h = Harness::new("abc\n");
    h.keys("l");
    let results = h.keys("<Esc>");
    assert_eq!(results, vec![KeyResult::Handled]);
    assert_eq!(h.session.mode(), Mode::Normal);
    assert_eq!(h.cursor(), Position::new(0, 1));
    assert_eq!(h.text(), "abc\n");
    assert!(h.messages().is_empty());
    assert!(!h.session.is_modified());

    // also cancels a pending command
    h.keys("d<Esc>w");
    assert_eq!(h.text(), "abc\n");
    assert_eq!(h.session.pending_keys(), "");
}

#[test]
fn new_line_after_unterminated_end() {
    assert_eq!(apply("abc", "A<CR>x<Esc>"), "abc\nx");
    assert_eq!(apply("abc", "oxyz<Esc>"), "abc\nxyz");
    assert_eq!(apply("", "ox<Esc>"), "\nx");
    assert_eq!(apply("", "A<CR>x<Esc>"), "\nx");
    assert_eq!(apply("ab", "$RX<CR>y<Esc>"), "aX\ny");
    // terminated buffers keep their newline
    assert_eq!(apply("abc\n", "A<CR>x<Esc>"), "abc\nx\n");
    assert_eq!(apply("abc\n", "oxyz<Esc>"), "abc\nxyz\n");
}

#[test]
fn opened_line_survives_escape() {
    let mut h = Harness::new("abc");
    h.keys("o");
    assert_eq!(h.cursor(), Position::new(1, 0));
    h.keys("<Esc>");
    assert_eq!(h.text(), "abc\n\n");
    assert_eq!(h.cursor(), Position::new(1, 0));
    h.keys("u");
    assert_eq!(h.text(), "abc");
}

#[test]
fn backspace_closes_an_opened_line() {
    let mut h = Harness::new("abc");
    h.keys("A<CR><BS>");
    assert_eq!(h.text(), "abc");
    assert_eq!(h.cursor(), Position::new(0, 3));
    h.keys("d<Esc>");
    assert_eq!(h.text(), "abcd");
}
