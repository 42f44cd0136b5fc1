use std::cmp::Ordering;
use std::collections::BTreeSet;

use itertools::{Itertools, Position};
use log::warn;
use smallvec::SmallVec;

use super::builder::IntoWord;

/// Arena index of the root sentinel. Its child is the head of the top-level list.
pub const ROOT: usize = 0;

/// A node of the construction-time prefix tree.
///
/// Nodes live in the [`Trie`] arena and refer to each other by index. A node
/// stores only its first child; the remaining children hang off that child's
/// `next` chain in ascending letter order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrieNode {
    pub(crate) letter: char,
    pub(crate) child: Option<usize>,
    pub(crate) next: Option<usize>,
    pub(crate) is_end_of_word: bool,
    pub(crate) max_child_depth: usize,
    pub(crate) child_count: usize,
    pub(crate) is_first_child: bool,
    pub(crate) is_pruned: bool,
    pub(crate) index: Option<u32>,
}

impl TrieNode {
    fn new(letter: char) -> Self {
        TrieNode {
            letter,
            child: None,
            next: None,
            is_end_of_word: false,
            max_child_depth: 0,
            child_count: 0,
            is_first_child: false,
            is_pruned: false,
            index: None,
        }
    }

    /// The letter on the edge leading into this node.
    pub fn letter(&self) -> char {
        self.letter
    }

    /// Arena index of the first child, if any.
    pub fn child(&self) -> Option<usize> {
        self.child
    }

    /// Arena index of the next sibling, if any.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    /// True if the path to this node spells a complete word.
    pub fn is_end_of_word(&self) -> bool {
        self.is_end_of_word
    }

    /// Length of the longest suffix below this node.
    pub fn max_child_depth(&self) -> usize {
        self.max_child_depth
    }

    /// Number of nodes in this node's child list.
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// True if this node heads its sibling list.
    pub fn is_first_child(&self) -> bool {
        self.is_first_child
    }

    /// True once reduction has found a surviving equivalent for this node.
    pub fn is_pruned(&self) -> bool {
        self.is_pruned
    }

    /// Position in the encoded array, once assigned.
    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

/// A letter-sorted prefix tree, the first stage of DAWG compilation.
///
/// # Examples
///
/// ```
/// use dawgplay::dawg::trie::Trie;
///
/// let mut trie = Trie::new();
/// trie.add_word("CAR");
/// trie.add_word("CART");
/// assert!(trie.contains("CAR"));
/// assert!(!trie.contains("CA"));
/// assert_eq!(trie.node_count(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct Trie {
    pub(crate) nodes: Vec<TrieNode>,
    pub(crate) alphabet: BTreeSet<char>,
    last_word: SmallVec<[char; 32]>,
    word_count: usize,
    out_of_order: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Trie {
            nodes: vec![TrieNode::new('\0')],
            alphabet: BTreeSet::new(),
            last_word: SmallVec::new(),
            word_count: 0,
            out_of_order: 0,
        }
    }

    /// Adds a word, creating nodes along its path as needed.
    ///
    /// Words are expected in ascending order. A word that sorts before the
    /// previous one is still inserted correctly, but a warning is logged
    /// since the reducer packs sorted input best. Empty words are ignored.
    pub fn add_word(&mut self, word: impl IntoWord) {
        let word = word.collect_word();
        if word.is_empty() {
            return;
        }
        if word < self.last_word {
            self.out_of_order += 1;
            warn!(
                "word {:?} is out of order after {:?}",
                word.iter().collect::<String>(),
                self.last_word.iter().collect::<String>()
            );
        }

        let mut parent = ROOT;
        let mut remaining = word.len();
        for (position, letter) in word.iter().copied().with_position() {
            remaining -= 1;
            let id = self.child_with_letter(parent, letter);
            let node = &mut self.nodes[id];
            node.max_child_depth = node.max_child_depth.max(remaining);
            if matches!(position, Position::Last | Position::Only) {
                node.is_end_of_word = true;
            }
            parent = id;
        }

        self.alphabet.extend(word.iter().copied());
        self.word_count += 1;
        self.last_word = word;
    }

    /// Finds the child of `parent` labelled `letter`, inserting it in sorted position if missing.
    fn child_with_letter(&mut self, parent: usize, letter: char) -> usize {
        let mut prev = None;
        let mut cursor = self.nodes[parent].child;
        while let Some(id) = cursor {
            match self.nodes[id].letter.cmp(&letter) {
                Ordering::Less => {
                    prev = Some(id);
                    cursor = self.nodes[id].next;
                }
                Ordering::Equal => return id,
                Ordering::Greater => break,
            }
        }

        let id = self.nodes.len();
        let mut node = TrieNode::new(letter);
        node.next = cursor;
        self.nodes.push(node);
        self.nodes[parent].child_count += 1;
        match prev {
            Some(prev) => self.nodes[prev].next = Some(id),
            None => {
                if let Some(old_head) = cursor {
                    self.nodes[old_head].is_first_child = false;
                }
                self.nodes[id].is_first_child = true;
                self.nodes[parent].child = Some(id);
            }
        }
        id
    }

    /// True if `word` was added to the trie.
    pub fn contains(&self, word: &str) -> bool {
        contains(&self.nodes, word)
    }

    /// Returns the node stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an index of this trie.
    pub fn node(&self, id: usize) -> &TrieNode {
        &self.nodes[id]
    }

    /// Arena index of the first top-level node, or `None` for an empty trie.
    pub fn root(&self) -> Option<usize> {
        self.nodes[ROOT].child
    }

    /// Number of letter nodes, excluding the root sentinel.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Number of words added, counting repeats.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of words that arrived out of ascending order.
    pub fn out_of_order_count(&self) -> usize {
        self.out_of_order
    }

    /// Distinct letters used by the words, in ascending order.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Iterates over the arena indices of a sibling chain starting at `head`.
    pub fn siblings(&self, head: Option<usize>) -> Siblings<'_> {
        Siblings {
            nodes: &self.nodes,
            cursor: head,
        }
    }
}

/// Iterator over a chain of sibling nodes.
pub struct Siblings<'t> {
    nodes: &'t [TrieNode],
    cursor: Option<usize>,
}

impl Iterator for Siblings<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let id = self.cursor?;
        self.cursor = self.nodes[id].next;
        Some(id)
    }
}

/// Follows child chains from the root sentinel along `word`.
pub(crate) fn contains(nodes: &[TrieNode], word: &str) -> bool {
    let mut node = ROOT;
    for letter in word.chars() {
        let mut cursor = nodes[node].child;
        loop {
            match cursor {
                Some(id) if nodes[id].letter == letter => {
                    node = id;
                    break;
                }
                Some(id) => cursor = nodes[id].next,
                None => return false,
            }
        }
    }
    node != ROOT && nodes[node].is_end_of_word
}
