//! Prefix-tree dictionary for spell checking and autocomplete.
//!
//! Keys are the 26 lowercase ASCII letters. Insertion case-folds and
//! filters input to alphabetic characters; membership and prefix
//! enumeration case-fold but reject input containing anything else.
//! The tree is read-mostly: sessions share it behind an `Arc` and only
//! the initial population path mutates it.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const ALPHABET: usize = 26;

/// Default cap on prefix enumeration results.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

/// Fallback word set used when no word list is available, so spell
/// checking stays functional out of the box.
const BUILTIN_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say",
    "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so",
    "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like",
    "time", "no", "just", "him", "know", "take", "people", "into", "year", "your", "good", "some",
    "could", "them", "see", "other", "than", "then", "now", "look", "only", "come", "its", "over",
    "think", "also", "back", "after", "use", "two", "how", "our", "work", "first", "well", "way",
    "even", "new", "want", "because", "any", "these", "give", "day", "most", "us",
];

struct TrieNode {
    children: [Option<Box<TrieNode>>; ALPHABET],
    end_of_word: bool,
    /// Write-only for now; reserved for frequency-ranked suggestions.
    frequency: u32,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            children: std::array::from_fn(|_| None),
            end_of_word: false,
            frequency: 0,
        }
    }
}

pub struct Dictionary {
    root: TrieNode,
    words: usize,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            words: 0,
        }
    }

    /// Dictionary populated with the built-in common-word set.
    pub fn builtin() -> Self {
        let mut dict = Self::new();
        for word in BUILTIN_WORDS {
            dict.insert(word);
        }
        dict
    }

    /// Load a newline/space-delimited word list from disk.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading word list {}", path.display()))?;
        let mut dict = Self::new();
        for word in content.split_whitespace() {
            dict.insert(word);
        }
        info!(target: "dict", words = dict.len(), path = %path.display(), "dictionary_loaded");
        Ok(dict)
    }

    /// Load from `path` when given and readable, otherwise fall back to
    /// the built-in set. A missing word list is never surfaced to the
    /// editing session as an error.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        match path {
            Some(p) => match Self::load_from_path(p) {
                Ok(dict) => dict,
                Err(error) => {
                    warn!(target: "dict", %error, "word_list_unavailable_using_builtin");
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Insert a word, case-folding and dropping non-alphabetic
    /// characters. Input that filters to nothing is rejected with no
    /// mutation. Returns true when the (filtered) word is newly stored.
    pub fn insert(&mut self, word: &str) -> bool {
        let mut node = &mut self.root;
        let mut consumed = 0;
        for ch in word.chars() {
            if !ch.is_ascii_alphabetic() {
                continue;
            }
            let slot = index_of(ch);
            node = node.children[slot]
                .get_or_insert_with(|| Box::new(TrieNode::new()))
                .as_mut();
            consumed += 1;
        }
        if consumed == 0 {
            return false;
        }
        node.frequency += 1;
        if node.end_of_word {
            false
        } else {
            node.end_of_word = true;
            self.words += 1;
            true
        }
    }

    /// True iff the case-folded word was previously inserted. Input
    /// containing non-alphabetic characters never matches.
    pub fn contains(&self, word: &str) -> bool {
        match self.walk(word) {
            Some(node) => node.end_of_word,
            None => false,
        }
    }

    /// Lazily enumerate complete words starting with `prefix`, in
    /// ascending character order at every branch, capped at `max`
    /// results. Re-running the call reproduces the same sequence for
    /// the same tree state. An empty or non-alphabetic prefix yields
    /// nothing.
    pub fn suggest<'a>(&'a self, prefix: &str, max: usize) -> Suggestions<'a> {
        if prefix.is_empty() || max == 0 {
            return Suggestions::empty();
        }
        let Some(node) = self.walk(prefix) else {
            return Suggestions::empty();
        };
        let folded: String = prefix.chars().map(|c| c.to_ascii_lowercase()).collect();
        Suggestions {
            stack: vec![(node, folded)],
            remaining: max,
        }
    }

    /// Collecting convenience over [`Dictionary::suggest`].
    pub fn suggest_vec(&self, prefix: &str, max: usize) -> Vec<String> {
        self.suggest(prefix, max).collect()
    }

    /// Walk to the node spelling `word`, case-folded. `None` when the
    /// path is absent or the input contains a non-alphabetic character.
    fn walk(&self, word: &str) -> Option<&TrieNode> {
        if word.is_empty() {
            return None;
        }
        let mut node = &self.root;
        for ch in word.chars() {
            if !ch.is_ascii_alphabetic() {
                return None;
            }
            node = node.children[index_of(ch)].as_deref()?;
        }
        Some(node)
    }
}

fn index_of(ch: char) -> usize {
    (ch.to_ascii_lowercase() as u8 - b'a') as usize
}

/// Lazy depth-first enumeration of complete words under a prefix node.
///
/// Driven by an explicit work stack rather than recursion; children are
/// pushed in descending order so the smallest letter is expanded first.
pub struct Suggestions<'a> {
    stack: Vec<(&'a TrieNode, String)>,
    remaining: usize,
}

impl Suggestions<'_> {
    fn empty() -> Self {
        Suggestions {
            stack: Vec::new(),
            remaining: 0,
        }
    }
}

impl Iterator for Suggestions<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        while let Some((node, word)) = self.stack.pop() {
            for slot in (0..ALPHABET).rev() {
                if let Some(child) = &node.children[slot] {
                    let mut next = word.clone();
                    next.push((b'a' + slot as u8) as char);
                    self.stack.push((child, next));
                }
            }
            if node.end_of_word {
                self.remaining -= 1;
                return Some(word);
            }
        }
        None
    }
}

// Deep tries would otherwise tear down through one recursive drop call
// per level; drain the tree with an explicit work list instead.
impl Drop for Dictionary {
    fn drop(&mut self) {
        let mut work: Vec<Box<TrieNode>> = Vec::new();
        for slot in self.root.children.iter_mut() {
            if let Some(child) = slot.take() {
                work.push(child);
            }
        }
        while let Some(mut node) = work.pop() {
            for slot in node.children.iter_mut() {
                if let Some(child) = slot.take() {
                    work.push(child);
                }
            }
        }
    }
}
