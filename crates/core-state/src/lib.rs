//! Editing session state: buffer, history engine, clipboard, and the
//! shared dictionary, composed behind one synchronous action surface.
//!
//! Every content-mutating action captures its history record at the
//! moment of mutation and invalidates the redo future; read-only
//! queries (search, counts, spell check, suggestions) materialize a
//! snapshot and never touch history. A session exclusively owns its
//! buffer, stacks, and clipboard; only the dictionary is shared, and
//! only because it is read-only after population (multiple tabs are
//! independent sessions holding clones of the same `Arc`).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

pub mod clipboard;
pub mod undo;

pub use core_buffer::{Buffer, BufferError, Direction};
pub use core_dict::Dictionary;
pub use undo::{DEFAULT_HISTORY_CAPACITY, EditRecord, HistoryStack, UndoEngine};

use clipboard::ClipboardSlot;

/// Locally recoverable session failures. Nothing here is fatal and no
/// variant leaves the session in a partially mutated state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("clipboard is empty")]
    ClipboardEmpty,
    #[error("pattern must not be empty")]
    EmptyPattern,
}

/// A word in the buffer with no dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellIssue {
    /// Byte offset of the word's first character.
    pub offset: usize,
    pub word: String,
}

pub struct EditorSession {
    buffer: Buffer,
    history: UndoEngine,
    clipboard: ClipboardSlot,
    dictionary: Arc<Dictionary>,
}

impl EditorSession {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self::with_history_capacity(dictionary, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(dictionary: Arc<Dictionary>, capacity: usize) -> Self {
        Self {
            buffer: Buffer::new(),
            history: UndoEngine::new(capacity),
            clipboard: ClipboardSlot::new(),
            dictionary,
        }
    }

    // ------------------------------------------------------------------
    // Single-character edits and motion
    // ------------------------------------------------------------------

    /// Insert one byte at the cursor. Always succeeds; undoable.
    pub fn insert_char(&mut self, byte: u8) {
        let offset = self.buffer.cursor_offset();
        self.history.record(EditRecord::Insert { offset, byte });
        self.buffer.insert_at_cursor(byte);
        trace!(target: "state.session", offset, "insert_char");
    }

    /// Delete the byte after the cursor. Rejected at the trailing
    /// boundary with no state change; undoable otherwise.
    pub fn delete_char(&mut self) -> Result<u8, SessionError> {
        let offset = self.buffer.cursor_offset();
        let byte = self.buffer.delete_after_cursor()?;
        self.history.record(EditRecord::Remove { offset, byte });
        trace!(target: "state.session", offset, "delete_char");
        Ok(byte)
    }

    /// Step the cursor; clamped no-op at the boundaries (returns false).
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        self.buffer.move_cursor(direction)
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        self.buffer.cursor_position()
    }

    pub fn cursor_offset(&self) -> usize {
        self.buffer.cursor_offset()
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    pub fn char_count(&self) -> usize {
        self.buffer.char_count()
    }

    pub fn word_count(&self) -> usize {
        self.buffer.word_count()
    }

    /// All starting offsets of `word`, case-insensitive.
    pub fn search(&self, word: &str) -> Result<Vec<usize>, SessionError> {
        if word.is_empty() {
            return Err(SessionError::EmptyPattern);
        }
        Ok(self.buffer.search_all(word.as_bytes()))
    }

    /// Words in the buffer that the dictionary does not know.
    pub fn spell_check(&self) -> Vec<SpellIssue> {
        let text = self.buffer.save_bytes();
        let mut issues = Vec::new();
        let mut start = None;
        for (i, &byte) in text.iter().chain(std::iter::once(&b' ')).enumerate() {
            if byte.is_ascii_alphanumeric() {
                start.get_or_insert(i);
            } else if let Some(word_start) = start.take() {
                let word = String::from_utf8_lossy(&text[word_start..i]).into_owned();
                if !self.dictionary.contains(&word) {
                    issues.push(SpellIssue {
                        offset: word_start,
                        word,
                    });
                }
            }
        }
        issues
    }

    /// Dictionary membership for a single word.
    pub fn dictionary_contains(&self, word: &str) -> bool {
        self.dictionary.contains(word)
    }

    /// Up to `max` completions of `prefix`, ascending.
    pub fn suggestions(&self, prefix: &str, max: usize) -> Vec<String> {
        self.dictionary.suggest_vec(prefix, max)
    }

    // ------------------------------------------------------------------
    // Bulk edits (one history record each)
    // ------------------------------------------------------------------

    /// Replace every occurrence of `find` with `replace`,
    /// case-insensitive. One undoable unit covering the whole rewrite.
    pub fn find_and_replace(&mut self, find: &str, replace: &str) -> Result<usize, SessionError> {
        if find.is_empty() {
            return Err(SessionError::EmptyPattern);
        }
        let before = self.buffer.save_bytes();
        let count = self.buffer.find_and_replace(find.as_bytes(), replace.as_bytes());
        if count > 0 {
            let after = self.buffer.save_bytes();
            self.history.record(EditRecord::Block {
                offset: 0,
                removed: before,
                inserted: after,
            });
            debug!(target: "state.session", count, "find_and_replace");
        }
        Ok(count)
    }

    /// Copy the inclusive range `[start, end]` into the clipboard,
    /// replacing its previous block. Returns the copied length.
    pub fn copy(&mut self, start: usize, end: usize) -> Result<usize, SessionError> {
        let block = self.buffer.extract_range(start, end)?;
        let len = block.len();
        self.clipboard.store(block);
        trace!(target: "state.session", start, end, len, "copy");
        Ok(len)
    }

    /// Copy then delete the same range, recorded as one undoable block.
    pub fn cut(&mut self, start: usize, end: usize) -> Result<usize, SessionError> {
        let block = self.buffer.extract_range(start, end)?;
        let len = block.len();
        self.clipboard.store(block);
        self.buffer.seek(start);
        self.history.begin_compound(start);
        for _ in 0..len {
            match self.buffer.delete_after_cursor() {
                Ok(byte) => self.history.note_removed(byte),
                // Range was validated above; an early boundary here
                // would mean the chain invariant is broken.
                Err(_) => break,
            }
        }
        self.history.commit_compound();
        trace!(target: "state.session", start, end, len, "cut");
        Ok(len)
    }

    /// Insert the clipboard block at the cursor as one undoable unit.
    /// Rejected when the clipboard is empty.
    pub fn paste(&mut self) -> Result<usize, SessionError> {
        let Some(block) = self.clipboard.contents() else {
            return Err(SessionError::ClipboardEmpty);
        };
        if block.is_empty() {
            return Err(SessionError::ClipboardEmpty);
        }
        let block = block.to_vec();
        self.history.begin_compound(self.buffer.cursor_offset());
        for &byte in &block {
            self.buffer.insert_at_cursor(byte);
            self.history.note_inserted(byte);
        }
        self.history.commit_compound();
        trace!(target: "state.session", len = block.len(), "paste");
        Ok(block.len())
    }

    /// Insert `text` plus a terminating newline at the cursor as one
    /// undoable unit.
    pub fn insert_line(&mut self, text: &str) {
        self.history.begin_compound(self.buffer.cursor_offset());
        for &byte in text.as_bytes() {
            self.buffer.insert_at_cursor(byte);
            self.history.note_inserted(byte);
        }
        self.buffer.insert_at_cursor(b'\n');
        self.history.note_inserted(b'\n');
        self.history.commit_compound();
    }

    /// Delete from the cursor to the end of the current line, inclusive
    /// of its newline, as one undoable unit. Returns the removed length.
    pub fn delete_line(&mut self) -> usize {
        self.history.begin_compound(self.buffer.cursor_offset());
        let mut removed = 0;
        while let Some(byte) = self.buffer.byte_after_cursor() {
            match self.buffer.delete_after_cursor() {
                Ok(deleted) => {
                    self.history.note_removed(deleted);
                    removed += 1;
                }
                Err(_) => break,
            }
            if byte == b'\n' {
                break;
            }
        }
        self.history.commit_compound();
        removed
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self.history.undo(&mut self.buffer) {
            Ok(())
        } else {
            Err(SessionError::NothingToUndo)
        }
    }

    pub fn redo(&mut self) -> Result<(), SessionError> {
        if self.history.redo(&mut self.buffer) {
            Ok(())
        } else {
            Err(SessionError::NothingToRedo)
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Byte-stream load/save
    // ------------------------------------------------------------------

    /// Replace the whole content from a byte stream. Bytes pass through
    /// uninterpreted. Recorded history addresses content that no longer
    /// exists, so both stacks are cleared.
    pub fn load_bytes(&mut self, content: &[u8]) {
        self.buffer.load_bytes(content);
        self.history.clear();
        debug!(target: "state.session", len = content.len(), "content_loaded");
    }

    /// Current content as raw bytes in document order, no framing.
    pub fn save_bytes(&self) -> Vec<u8> {
        self.buffer.save_bytes()
    }
}
