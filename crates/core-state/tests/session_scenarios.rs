//! End-to-end session scenarios driven through the public action
//! surface only.

use std::sync::Arc;

use core_state::{Dictionary, Direction, EditorSession, SessionError};

fn session_with(text: &str) -> EditorSession {
    let mut session = EditorSession::new(Arc::new(Dictionary::builtin()));
    session.load_bytes(text.as_bytes());
    session
}

fn text(session: &EditorSession) -> String {
    String::from_utf8(session.save_bytes()).unwrap()
}

#[test]
fn copy_then_paste_at_end_appends_the_block() {
    let mut session = session_with("hello world");
    let copied = session.copy(0, 4).unwrap();
    assert_eq!(copied, 5);
    // load_bytes leaves the cursor after the final byte.
    let pasted = session.paste().unwrap();
    assert_eq!(pasted, 5);
    assert_eq!(text(&session), "hello worldhello");
}

#[test]
fn cut_removes_the_range_and_fills_the_clipboard() {
    let mut session = session_with("hello world");
    let cut = session.cut(5, 10).unwrap();
    assert_eq!(cut, 6);
    assert_eq!(text(&session), "hello");
    session.paste().unwrap();
    assert_eq!(text(&session), "hello world");
}

#[test]
fn find_and_replace_counts_non_overlapping_matches() {
    let mut session = session_with("cat cats catalog");
    let count = session.find_and_replace("cat", "dog").unwrap();
    assert_eq!(count, 3);
    assert_eq!(text(&session), "dog dogs dogalog");
}

#[test]
fn find_and_replace_rejects_empty_pattern() {
    let mut session = session_with("abc");
    assert_eq!(
        session.find_and_replace("", "x"),
        Err(SessionError::EmptyPattern)
    );
    assert_eq!(text(&session), "abc");
}

#[test]
fn undo_on_empty_history_is_rejected_without_mutation() {
    let mut session = session_with("untouched");
    assert_eq!(session.undo(), Err(SessionError::NothingToUndo));
    assert_eq!(session.redo(), Err(SessionError::NothingToRedo));
    assert_eq!(text(&session), "untouched");
}

#[test]
fn save_load_round_trips_arbitrary_bytes() {
    let content: Vec<u8> = (1..=255).cycle().take(1000).collect();
    let mut session = session_with("");
    session.load_bytes(&content);
    assert_eq!(session.save_bytes(), content);
}

#[test]
fn char_count_tracks_surviving_inserts() {
    let mut session = session_with("");
    for &byte in b"abcdef" {
        session.insert_char(byte);
    }
    session.move_cursor(Direction::Left);
    session.move_cursor(Direction::Left);
    session.delete_char().unwrap(); // removes 'e'
    session.delete_char().unwrap(); // removes 'f'
    assert_eq!(session.char_count(), 4);
    assert_eq!(session.word_count(), 1);
    assert_eq!(text(&session), "abcd");
}

#[test]
fn search_is_case_insensitive_through_the_session() {
    let session = session_with("Rust rust RUST");
    assert_eq!(session.search("rust").unwrap(), vec![0, 5, 10]);
}

#[test]
fn suggestions_and_membership_delegate_to_the_dictionary() {
    let mut dictionary = Dictionary::new();
    for word in ["cat", "car", "cap"] {
        dictionary.insert(word);
    }
    let session = EditorSession::new(Arc::new(dictionary));
    assert!(session.dictionary_contains("CAR"));
    assert!(!session.dictionary_contains("cab"));
    assert_eq!(session.suggestions("ca", 10), vec!["cap", "car", "cat"]);
    assert_eq!(session.suggestions("ca", 2), vec!["cap", "car"]);
}

#[test]
fn sessions_share_one_dictionary_but_not_state() {
    let dictionary = Arc::new(Dictionary::builtin());
    let mut first = EditorSession::new(Arc::clone(&dictionary));
    let mut second = EditorSession::new(Arc::clone(&dictionary));
    first.insert_char(b'a');
    second.insert_char(b'z');
    assert_eq!(text(&first), "a");
    assert_eq!(text(&second), "z");
    assert!(first.dictionary_contains("the"));
    assert!(second.dictionary_contains("the"));
}

#[test]
fn vertical_motion_lands_on_column_zero() {
    let mut session = session_with("first\nsecond\nthird");
    assert!(session.move_cursor(Direction::Up));
    assert_eq!(session.cursor_position(), (1, 0));
    assert!(session.move_cursor(Direction::Down));
    assert_eq!(session.cursor_position(), (2, 0));
}
