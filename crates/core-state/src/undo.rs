//! Linear undo/redo history over invertible edit records.
//!
//! Every record is self-sufficient: it carries the exact offset it
//! acted on, so inverse application never re-derives intent by
//! comparing buffer content around the cursor. Bulk mutations (paste,
//! cut, line edits, find-and-replace) are bracketed by
//! `begin_compound`/`commit_compound` and always land as exactly one
//! `Block` record; per-byte records never leak into the stacks for a
//! bulk action.

use core_buffer::Buffer;
use tracing::trace;

/// Default bound on each history stack.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One invertible edit. `Insert`/`Remove` cover single-byte edits;
/// `Block` covers a compound edit as a unit (bytes removed at `offset`
/// followed by bytes inserted there).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRecord {
    Insert { offset: usize, byte: u8 },
    Remove { offset: usize, byte: u8 },
    Block {
        offset: usize,
        removed: Vec<u8>,
        inserted: Vec<u8>,
    },
}

impl EditRecord {
    /// Re-apply the original edit (redo path).
    fn apply(&self, buffer: &mut Buffer) {
        match self {
            EditRecord::Insert { offset, byte } => {
                buffer.insert_bytes_at(*offset, &[*byte]);
            }
            EditRecord::Remove { offset, .. } => {
                buffer.remove_bytes_at(*offset, 1);
            }
            EditRecord::Block {
                offset,
                removed,
                inserted,
            } => {
                buffer.remove_bytes_at(*offset, removed.len());
                buffer.insert_bytes_at(*offset, inserted);
            }
        }
    }

    /// Apply the inverse edit (undo path), restoring the cursor to its
    /// pre-edit position.
    fn revert(&self, buffer: &mut Buffer) {
        match self {
            EditRecord::Insert { offset, .. } => {
                buffer.remove_bytes_at(*offset, 1);
            }
            EditRecord::Remove { offset, byte } => {
                buffer.insert_bytes_at(*offset, &[*byte]);
                buffer.seek(*offset);
            }
            EditRecord::Block {
                offset,
                removed,
                inserted,
            } => {
                buffer.remove_bytes_at(*offset, inserted.len());
                buffer.insert_bytes_at(*offset, removed);
                if removed.is_empty() {
                    buffer.seek(*offset);
                }
            }
        }
    }
}

/// Bounded, per-session LIFO of edit records.
///
/// Overflow drops the oldest entry. Rejecting new pushes was considered
/// and declined: stale inverses sitting above a rejected record would
/// mis-apply against the newer buffer state, while dropping from the
/// bottom keeps every retained record consistent with it.
#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<EditRecord>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, record: EditRecord) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.remove(0);
            trace!(target: "state.undo", capacity = self.capacity, "history_stack_trimmed");
        }
        self.entries.push(record);
    }

    pub fn pop(&mut self) -> Option<EditRecord> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// In-flight compound edit accumulated between `begin_compound` and
/// `commit_compound`.
#[derive(Debug)]
struct BlockBuilder {
    offset: usize,
    removed: Vec<u8>,
    inserted: Vec<u8>,
}

pub struct UndoEngine {
    undo: HistoryStack,
    redo: HistoryStack,
    compound: Option<BlockBuilder>,
}

impl UndoEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: HistoryStack::new(capacity),
            redo: HistoryStack::new(capacity),
            compound: None,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Record a completed edit: push to the undo stack and invalidate
    /// the redo future.
    pub fn record(&mut self, record: EditRecord) {
        debug_assert!(self.compound.is_none(), "record during open compound");
        self.undo.push(record);
        self.redo.clear();
        trace!(
            target: "state.undo",
            undo_depth = self.undo.len(),
            "record_pushed_redo_cleared"
        );
    }

    /// Open a compound edit anchored at `offset`. Bytes reported through
    /// `note_removed`/`note_inserted` are folded into one `Block`.
    pub fn begin_compound(&mut self, offset: usize) {
        debug_assert!(self.compound.is_none(), "nested compound edit");
        self.compound = Some(BlockBuilder {
            offset,
            removed: Vec::new(),
            inserted: Vec::new(),
        });
    }

    pub fn note_removed(&mut self, byte: u8) {
        if let Some(block) = &mut self.compound {
            block.removed.push(byte);
        }
    }

    pub fn note_inserted(&mut self, byte: u8) {
        if let Some(block) = &mut self.compound {
            block.inserted.push(byte);
        }
    }

    /// Close the open compound. An empty compound commits nothing.
    pub fn commit_compound(&mut self) {
        if let Some(block) = self.compound.take() {
            if block.removed.is_empty() && block.inserted.is_empty() {
                return;
            }
            trace!(
                target: "state.undo",
                offset = block.offset,
                removed = block.removed.len(),
                inserted = block.inserted.len(),
                "compound_committed"
            );
            self.record(EditRecord::Block {
                offset: block.offset,
                removed: block.removed,
                inserted: block.inserted,
            });
        }
    }

    /// Pop the most recent record, apply its inverse to the buffer, and
    /// move it to the redo stack. False when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut Buffer) -> bool {
        let Some(record) = self.undo.pop() else {
            return false;
        };
        trace!(target: "state.undo", undo_depth = self.undo.len(), "undo_pop");
        record.revert(buffer);
        self.redo.push(record);
        true
    }

    /// Pop the most recent undone record, re-apply the original edit,
    /// and move it back to the undo stack (without clearing redo).
    pub fn redo(&mut self, buffer: &mut Buffer) -> bool {
        let Some(record) = self.redo.pop() else {
            return false;
        };
        trace!(target: "state.undo", redo_depth = self.redo.len(), "redo_pop");
        record.apply(buffer);
        self.undo.push(record);
        true
    }

    /// Forget all history, e.g. after the buffer content is wholesale
    /// replaced and recorded offsets no longer address anything real.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.compound = None;
        trace!(target: "state.undo", "history_cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_undo_restores_content_and_cursor() {
        let mut buffer = Buffer::from_bytes(b"ab");
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        let offset = buffer.cursor_offset();
        engine.record(EditRecord::Insert { offset, byte: b'c' });
        buffer.insert_at_cursor(b'c');
        assert!(engine.undo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"ab");
        assert_eq!(buffer.cursor_offset(), offset);
    }

    #[test]
    fn undo_then_redo_round_trips_single_edits() {
        let mut buffer = Buffer::from_bytes(b"xy");
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        buffer.seek(1);
        let byte = buffer.delete_after_cursor().unwrap();
        engine.record(EditRecord::Remove { offset: 1, byte });
        assert_eq!(buffer.save_bytes(), b"x");

        assert!(engine.undo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"xy");
        assert_eq!(buffer.cursor_offset(), 1);

        assert!(engine.redo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"x");
        assert_eq!(buffer.cursor_offset(), 1);
    }

    #[test]
    fn new_edit_invalidates_redo_future() {
        let mut buffer = Buffer::new();
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        engine.record(EditRecord::Insert { offset: 0, byte: b'a' });
        buffer.insert_at_cursor(b'a');
        engine.undo(&mut buffer);
        assert!(engine.can_redo());
        engine.record(EditRecord::Insert { offset: 0, byte: b'b' });
        buffer.insert_at_cursor(b'b');
        assert!(!engine.can_redo());
    }

    #[test]
    fn compound_commits_exactly_one_record() {
        let mut buffer = Buffer::new();
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        engine.begin_compound(0);
        for &byte in b"paste" {
            buffer.insert_at_cursor(byte);
            engine.note_inserted(byte);
        }
        engine.commit_compound();
        assert_eq!(engine.undo_depth(), 1);
        assert!(engine.undo(&mut buffer));
        assert!(buffer.is_empty());
        assert!(!engine.can_undo());
    }

    #[test]
    fn empty_compound_commits_nothing() {
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        engine.begin_compound(3);
        engine.commit_compound();
        assert_eq!(engine.undo_depth(), 0);
    }

    #[test]
    fn block_undo_and_redo_are_symmetric() {
        let mut buffer = Buffer::from_bytes(b"hello world");
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        // Cut "world": remove 5 bytes at offset 6.
        engine.begin_compound(6);
        buffer.seek(6);
        for _ in 0..5 {
            let byte = buffer.delete_after_cursor().unwrap();
            engine.note_removed(byte);
        }
        engine.commit_compound();
        assert_eq!(buffer.save_bytes(), b"hello ");

        assert!(engine.undo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"hello world");
        assert!(engine.redo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"hello ");
    }

    #[test]
    fn overflow_drops_the_oldest_entry_and_stays_consistent() {
        let mut buffer = Buffer::new();
        let mut engine = UndoEngine::new(3);
        for (i, &byte) in b"abcd".iter().enumerate() {
            engine.record(EditRecord::Insert { offset: i, byte });
            buffer.insert_at_cursor(byte);
        }
        assert_eq!(engine.undo_depth(), 3);
        // The three retained records unwind the three newest inserts.
        assert!(engine.undo(&mut buffer));
        assert!(engine.undo(&mut buffer));
        assert!(engine.undo(&mut buffer));
        assert!(!engine.undo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"a");
    }

    #[test]
    fn undo_on_empty_stack_reports_and_mutates_nothing() {
        let mut buffer = Buffer::from_bytes(b"text");
        let mut engine = UndoEngine::new(DEFAULT_HISTORY_CAPACITY);
        assert!(!engine.undo(&mut buffer));
        assert!(!engine.redo(&mut buffer));
        assert_eq!(buffer.save_bytes(), b"text");
    }
}
