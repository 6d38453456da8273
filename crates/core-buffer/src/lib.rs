//! Arena-backed byte sequence with a movable insertion point.
//!
//! The buffer is a doubly linked chain of single-byte cells stored in an
//! arena (`Vec<Cell>`) and addressed by `CellId` indices instead of
//! pointers. Two reserved cells act as head and tail sentinels so that
//! insertion and removal never special-case the sequence ends. Freed
//! cells go on a free list and are reused by later insertions.
//!
//! The cursor identifies the cell immediately before the insertion
//! point (the head sentinel when the insertion point is at the very
//! start). Alongside the cursor cell the buffer caches the cursor's
//! absolute offset and its display row/column; all three are kept
//! consistent by every mutation and motion.
//!
//! Content is raw bytes in document order. The buffer does not
//! interpret encodings; `\n` is the only byte with structural meaning
//! (line boundaries for vertical motion and row/column bookkeeping).

use thiserror::Error;
use tracing::trace;

/// Index of a cell in the buffer arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellId(u32);

impl CellId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Head sentinel: the cell before the first byte.
const HEAD: CellId = CellId(0);
/// Tail sentinel: the cell after the last byte.
const TAIL: CellId = CellId(1);

#[derive(Debug, Clone, Copy)]
struct Cell {
    byte: u8,
    prev: CellId,
    next: CellId,
}

/// Cursor motion directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Locally recoverable buffer-level failures. None of these mutate the
/// buffer; callers receive the condition as a value, never a panic.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BufferError {
    /// The cursor is already at the trailing boundary.
    #[error("nothing to delete at the cursor position")]
    AtEnd,
    /// Range endpoints do not address existing content.
    #[error("invalid range {start}..={end} for buffer of length {len}")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

pub struct Buffer {
    cells: Vec<Cell>,
    free: Vec<CellId>,
    cursor: CellId,
    len: usize,
    cursor_offset: usize,
    cursor_row: usize,
    cursor_col: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        let cells = vec![
            // Sentinel outer links point at the sentinel itself; motion
            // clamping guarantees they are never followed.
            Cell {
                byte: 0,
                prev: HEAD,
                next: TAIL,
            },
            Cell {
                byte: 0,
                prev: HEAD,
                next: TAIL,
            },
        ];
        Self {
            cells,
            free: Vec::new(),
            cursor: HEAD,
            len: 0,
            cursor_offset: 0,
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    pub fn from_bytes(content: &[u8]) -> Self {
        let mut buf = Self::new();
        buf.load_bytes(content);
        buf
    }

    /// Number of live (non-sentinel) bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Count of bytes before the insertion point.
    pub fn cursor_offset(&self) -> usize {
        self.cursor_offset
    }

    /// Display (row, column) of the insertion point.
    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    fn next_of(&self, id: CellId) -> CellId {
        self.cells[id.index()].next
    }

    fn prev_of(&self, id: CellId) -> CellId {
        self.cells[id.index()].prev
    }

    fn byte_of(&self, id: CellId) -> u8 {
        self.cells[id.index()].byte
    }

    fn alloc(&mut self, byte: u8, prev: CellId, next: CellId) -> CellId {
        if let Some(id) = self.free.pop() {
            self.cells[id.index()] = Cell { byte, prev, next };
            id
        } else {
            let id = CellId::new(self.cells.len());
            self.cells.push(Cell { byte, prev, next });
            id
        }
    }

    /// Link a new cell holding `byte` immediately after `at`.
    fn link_after(&mut self, at: CellId, byte: u8) -> CellId {
        let after = self.next_of(at);
        let id = self.alloc(byte, at, after);
        self.cells[at.index()].next = id;
        self.cells[after.index()].prev = id;
        id
    }

    /// Unlink a live cell, returning its byte. The cell index is
    /// recycled via the free list.
    fn unlink(&mut self, id: CellId) -> u8 {
        debug_assert!(id != HEAD && id != TAIL);
        let Cell { byte, prev, next } = self.cells[id.index()];
        self.cells[prev.index()].next = next;
        self.cells[next.index()].prev = prev;
        self.free.push(id);
        byte
    }

    /// Insert one byte at the insertion point; the cursor advances past
    /// it. O(1).
    pub fn insert_at_cursor(&mut self, byte: u8) {
        let id = self.link_after(self.cursor, byte);
        self.cursor = id;
        self.len += 1;
        self.cursor_offset += 1;
        if byte == b'\n' {
            self.cursor_row += 1;
            self.cursor_col = 0;
        } else {
            self.cursor_col += 1;
        }
    }

    /// Remove the byte immediately after the insertion point. The cursor
    /// (and therefore row/column) does not move. O(1).
    pub fn delete_after_cursor(&mut self) -> Result<u8, BufferError> {
        let target = self.next_of(self.cursor);
        if target == TAIL {
            return Err(BufferError::AtEnd);
        }
        let byte = self.unlink(target);
        self.len -= 1;
        Ok(byte)
    }

    /// Byte immediately after the insertion point, if any.
    pub fn byte_after_cursor(&self) -> Option<u8> {
        let next = self.next_of(self.cursor);
        if next == TAIL {
            None
        } else {
            Some(self.byte_of(next))
        }
    }

    /// Move the cursor one step. Returns false (and changes nothing)
    /// when the motion is clamped at a boundary.
    ///
    /// Vertical motion places the cursor at column 0 of the target line;
    /// the previous column is not preserved.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Left => {
                if self.cursor == HEAD {
                    return false;
                }
                let crossed = self.byte_of(self.cursor);
                self.cursor = self.prev_of(self.cursor);
                self.cursor_offset -= 1;
                if crossed == b'\n' {
                    self.cursor_row -= 1;
                    self.cursor_col = self.column_at_cursor();
                } else {
                    self.cursor_col = self.cursor_col.saturating_sub(1);
                }
                true
            }
            Direction::Right => {
                let next = self.next_of(self.cursor);
                if next == TAIL {
                    return false;
                }
                self.cursor = next;
                self.cursor_offset += 1;
                if self.byte_of(next) == b'\n' {
                    self.cursor_row += 1;
                    self.cursor_col = 0;
                } else {
                    self.cursor_col += 1;
                }
                true
            }
            Direction::Up => {
                if self.cursor_row == 0 {
                    return false;
                }
                let mut at = self.cursor;
                let mut offset = self.cursor_offset;
                // Step back over the rest of the current line and the
                // newline that begins it.
                loop {
                    let byte = self.byte_of(at);
                    at = self.prev_of(at);
                    offset -= 1;
                    if byte == b'\n' {
                        break;
                    }
                }
                // Continue to the start of the previous line.
                while at != HEAD && self.byte_of(at) != b'\n' {
                    at = self.prev_of(at);
                    offset -= 1;
                }
                self.cursor = at;
                self.cursor_offset = offset;
                self.cursor_row -= 1;
                self.cursor_col = 0;
                true
            }
            Direction::Down => {
                let mut at = self.next_of(self.cursor);
                let mut offset = self.cursor_offset;
                while at != TAIL {
                    offset += 1;
                    if self.byte_of(at) == b'\n' {
                        // A trailing newline does not open a new line to
                        // move onto.
                        if self.next_of(at) == TAIL {
                            return false;
                        }
                        self.cursor = at;
                        self.cursor_offset = offset;
                        self.cursor_row += 1;
                        self.cursor_col = 0;
                        return true;
                    }
                    at = self.next_of(at);
                }
                false
            }
        }
    }

    /// Column of the insertion point derived from the chain: bytes
    /// between the preceding newline (or the leading boundary) and the
    /// cursor cell, inclusive.
    fn column_at_cursor(&self) -> usize {
        let mut at = self.cursor;
        let mut col = 0;
        while at != HEAD && self.byte_of(at) != b'\n' {
            col += 1;
            at = self.prev_of(at);
        }
        col
    }

    /// Reposition the cursor to the given absolute offset, walking from
    /// the leading boundary and recomputing row/column on the way. O(n).
    ///
    /// `offset` must not exceed `len`.
    pub fn seek(&mut self, offset: usize) {
        debug_assert!(offset <= self.len);
        self.cursor = HEAD;
        self.cursor_offset = 0;
        self.cursor_row = 0;
        self.cursor_col = 0;
        for _ in 0..offset {
            let next = self.next_of(self.cursor);
            if next == TAIL {
                break;
            }
            self.cursor = next;
            self.cursor_offset += 1;
            if self.byte_of(next) == b'\n' {
                self.cursor_row += 1;
                self.cursor_col = 0;
            } else {
                self.cursor_col += 1;
            }
        }
    }

    /// Insert a block at an absolute offset. The cursor ends just after
    /// the inserted bytes. Used by history replay.
    pub fn insert_bytes_at(&mut self, offset: usize, bytes: &[u8]) {
        self.seek(offset);
        for &byte in bytes {
            self.insert_at_cursor(byte);
        }
    }

    /// Remove up to `count` bytes starting at an absolute offset,
    /// returning them in document order. The cursor ends at `offset`.
    /// Used by history replay.
    pub fn remove_bytes_at(&mut self, offset: usize, count: usize) -> Vec<u8> {
        self.seek(offset);
        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            match self.delete_after_cursor() {
                Ok(byte) => removed.push(byte),
                Err(_) => break,
            }
        }
        removed
    }

    /// Materialize the inclusive range `[start, end]` as a contiguous
    /// snapshot, walking from the leading boundary.
    pub fn extract_range(&self, start: usize, end: usize) -> Result<Vec<u8>, BufferError> {
        if end >= self.len || start > end {
            return Err(BufferError::InvalidRange {
                start,
                end,
                len: self.len,
            });
        }
        let mut at = self.next_of(HEAD);
        for _ in 0..start {
            at = self.next_of(at);
        }
        let mut out = Vec::with_capacity(end - start + 1);
        for _ in start..=end {
            out.push(self.byte_of(at));
            at = self.next_of(at);
        }
        Ok(out)
    }

    /// Full contents in document order, no framing.
    pub fn save_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        let mut at = self.next_of(HEAD);
        while at != TAIL {
            out.push(self.byte_of(at));
            at = self.next_of(at);
        }
        out
    }

    /// Replace the entire contents. Bytes pass through uninterpreted;
    /// the cursor ends after the final byte.
    pub fn load_bytes(&mut self, content: &[u8]) {
        self.reset();
        for &byte in content {
            self.insert_at_cursor(byte);
        }
        trace!(target: "buffer", len = self.len, "content_replaced");
    }

    fn reset(&mut self) {
        self.cells.truncate(2);
        self.cells[HEAD.index()] = Cell {
            byte: 0,
            prev: HEAD,
            next: TAIL,
        };
        self.cells[TAIL.index()] = Cell {
            byte: 0,
            prev: HEAD,
            next: TAIL,
        };
        self.free.clear();
        self.cursor = HEAD;
        self.len = 0;
        self.cursor_offset = 0;
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// All starting offsets of `needle`, ASCII case-insensitive, over a
    /// materialized snapshot. O(n * m). An empty needle matches nothing.
    pub fn search_all(&self, needle: &[u8]) -> Vec<usize> {
        if needle.is_empty() || needle.len() > self.len {
            return Vec::new();
        }
        let text = self.save_bytes();
        text.windows(needle.len())
            .enumerate()
            .filter(|(_, window)| window.eq_ignore_ascii_case(needle))
            .map(|(offset, _)| offset)
            .collect()
    }

    /// Replace every non-overlapping, ASCII case-insensitive occurrence
    /// of `find` with `replace`, scanning left to right against the
    /// original snapshot (never against output under construction). The
    /// buffer is rebuilt from the substituted snapshot; the cursor ends
    /// after the final byte. Returns the replacement count; an empty or
    /// absent pattern leaves the buffer untouched.
    pub fn find_and_replace(&mut self, find: &[u8], replace: &[u8]) -> usize {
        if find.is_empty() || find.len() > self.len {
            return 0;
        }
        let text = self.save_bytes();
        let mut out = Vec::with_capacity(text.len());
        let mut count = 0;
        let mut i = 0;
        while i < text.len() {
            if i + find.len() <= text.len() && text[i..i + find.len()].eq_ignore_ascii_case(find) {
                out.extend_from_slice(replace);
                i += find.len();
                count += 1;
            } else {
                out.push(text[i]);
                i += 1;
            }
        }
        if count == 0 {
            return 0;
        }
        self.load_bytes(&out);
        trace!(target: "buffer", count, "find_and_replace_rebuilt");
        count
    }

    /// Count of maximal ASCII alphanumeric runs. O(n).
    pub fn word_count(&self) -> usize {
        let mut words = 0;
        let mut in_word = false;
        let mut at = self.next_of(HEAD);
        while at != TAIL {
            if self.byte_of(at).is_ascii_alphanumeric() {
                if !in_word {
                    words += 1;
                    in_word = true;
                }
            } else {
                in_word = false;
            }
            at = self.next_of(at);
        }
        words
    }

    /// Total live bytes. O(1) thanks to the maintained length.
    pub fn char_count(&self) -> usize {
        self.len
    }
}
