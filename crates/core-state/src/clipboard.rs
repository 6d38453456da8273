//! Single-slot clipboard.
//!
//! Copy and cut overwrite the slot wholesale (the previous block is
//! released); paste reads it non-destructively.

#[derive(Debug, Default)]
pub struct ClipboardSlot {
    block: Option<Vec<u8>>,
}

impl ClipboardSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents with a new block.
    pub fn store(&mut self, block: Vec<u8>) {
        self.block = Some(block);
    }

    /// Current block, if one has been stored.
    pub fn contents(&self) -> Option<&[u8]> {
        self.block.as_deref()
    }

    pub fn len(&self) -> usize {
        self.block.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let clip = ClipboardSlot::new();
        assert!(clip.is_empty());
        assert_eq!(clip.contents(), None);
    }

    #[test]
    fn store_replaces_previous_block() {
        let mut clip = ClipboardSlot::new();
        clip.store(b"first".to_vec());
        clip.store(b"second".to_vec());
        assert_eq!(clip.contents(), Some(b"second".as_slice()));
        assert_eq!(clip.len(), 6);
    }

    #[test]
    fn paste_reads_are_non_destructive() {
        let mut clip = ClipboardSlot::new();
        clip.store(b"block".to_vec());
        assert_eq!(clip.contents(), Some(b"block".as_slice()));
        assert_eq!(clip.contents(), Some(b"block".as_slice()));
    }
}
