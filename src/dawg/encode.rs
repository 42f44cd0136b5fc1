//! The packed dictionary format.
//!
//! The dictionary is a flat array of little-endian `u32` words. Word 0 holds
//! the node count `N`, followed by `N` records of [`RECORD_WORDS`] words each:
//!
//! | word | bits  | meaning                                   |
//! |------|-------|-------------------------------------------|
//! | 0    | 0-15  | letter index into the lexicon alphabet    |
//! | 0    | 16    | end of word                               |
//! | 0    | 17    | end of sibling list                       |
//! | 1    | 0-31  | index of the first child, 0 for none      |
//!
//! Siblings are stored in consecutive records, so the next sibling of record
//! `i` is record `i + 1` unless the end-of-list bit is set. Records `0..k` are
//! the top-level list. Index 0 can never be a child target, which frees it to
//! mean "no children".
//!
//! The alphabet is not part of the array; it travels next to it as a UTF-8
//! string (see [`EncodedDawg::save`]).

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::builder::CompileError;
use super::reduce::Dawg;
use super::trie::ROOT;

/// Number of `u32` words in one node record.
pub const RECORD_WORDS: usize = 2;
/// Width of the letter index field.
pub const LETTER_BITS: u32 = 16;
/// Mask selecting the letter index from the first record word.
pub const LETTER_MASK: u32 = (1 << LETTER_BITS) - 1;
/// End-of-word flag in the first record word.
pub const END_OF_WORD_FLAG: u32 = 1 << 16;
/// End-of-list flag in the first record word.
pub const END_OF_LIST_FLAG: u32 = 1 << 17;
/// Largest alphabet the letter field can address.
pub const MAX_ALPHABET: usize = 1 << LETTER_BITS;
/// Largest node count the header and child fields can address.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Extension of the alphabet file written next to a dictionary.
pub const ALPHABET_EXTENSION: &str = "alphabet";

/// One decoded node record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    /// Index of the node's letter in the lexicon alphabet.
    pub letter_index: u16,
    /// The path to this node spells a word.
    pub is_end_of_word: bool,
    /// This node is the last of its sibling list.
    pub is_end_of_list: bool,
    /// Index of the first child record, 0 for none.
    pub child: u32,
}

impl NodeRecord {
    /// Packs the record into its words.
    pub fn pack(&self) -> [u32; RECORD_WORDS] {
        let mut head = u32::from(self.letter_index) & LETTER_MASK;
        if self.is_end_of_word {
            head |= END_OF_WORD_FLAG;
        }
        if self.is_end_of_list {
            head |= END_OF_LIST_FLAG;
        }
        [head, self.child]
    }

    /// Unpacks a record from `words`, which must hold [`RECORD_WORDS`] entries.
    ///
    /// # Panics
    ///
    /// Panics if `words` is shorter than a record.
    pub fn unpack(words: &[u32]) -> Self {
        let head = words[0];
        NodeRecord {
            letter_index: (head & LETTER_MASK) as u16,
            is_end_of_word: head & END_OF_WORD_FLAG != 0,
            is_end_of_list: head & END_OF_LIST_FLAG != 0,
            child: words[1],
        }
    }

    /// Index of the first child, or `None` for a leaf.
    pub fn child_index(&self) -> Option<usize> {
        (self.child != 0).then_some(self.child as usize)
    }
}

/// An encoded dictionary: the packed word array plus its alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedDawg {
    alphabet: Vec<char>,
    words: Vec<u32>,
}

impl EncodedDawg {
    /// Wraps an existing word array. No validation happens until it is decoded.
    pub fn from_parts(alphabet: Vec<char>, words: Vec<u32>) -> Self {
        EncodedDawg { alphabet, words }
    }

    /// Number of node records, as stored in the header.
    pub fn node_count(&self) -> usize {
        self.words.first().map_or(0, |&count| count as usize)
    }

    /// The alphabet letter indices refer to.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// The raw word array, header included.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Iterates over the node records.
    pub fn records(&self) -> impl Iterator<Item = NodeRecord> + '_ {
        self.words
            .get(1..)
            .unwrap_or_default()
            .chunks_exact(RECORD_WORDS)
            .map(NodeRecord::unpack)
    }

    /// Serializes the word array as little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    /// Writes the dictionary to `path` and its alphabet to `path.alphabet`.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        fs::write(alphabet_path(path), self.alphabet.iter().collect::<String>())
    }
}

/// Path of the alphabet file belonging to the dictionary at `path`.
pub fn alphabet_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ALPHABET_EXTENSION);
    PathBuf::from(name)
}

/// Fails if an alphabet of `size` letters does not fit the letter field.
pub fn check_alphabet(size: usize) -> Result<(), CompileError> {
    if size > MAX_ALPHABET {
        return Err(CompileError::AlphabetTooLarge {
            size,
            max: MAX_ALPHABET,
        });
    }
    Ok(())
}

impl Dawg {
    /// Assigns record indices breadth-first, giving every sibling list a
    /// contiguous block. Returns the number of indexed nodes.
    ///
    /// # Errors
    ///
    /// `TooManyNodes` if the index space is exhausted, `DetachedNode` if a
    /// child link targets a node whose list head did not survive.
    pub fn assign_indices(&mut self) -> Result<usize, CompileError> {
        let heads = self.list_heads();
        for node in &mut self.nodes {
            node.index = None;
        }
        self.order.clear();

        let Some(top) = self.nodes[ROOT].child else {
            return Ok(0);
        };
        self.index_list(top)?;
        let mut queue = VecDeque::from([top]);
        while let Some(head) = queue.pop_front() {
            let mut cursor = Some(head);
            while let Some(id) = cursor {
                if let Some(child) = self.nodes[id].child {
                    let child_head = heads[child].ok_or(CompileError::DetachedNode { node: child })?;
                    if self.nodes[child_head].index.is_none() {
                        self.index_list(child_head)?;
                        queue.push_back(child_head);
                    }
                }
                cursor = self.nodes[id].next;
            }
        }
        Ok(self.order.len())
    }

    /// Maps every surviving node to the head of its sibling list.
    fn list_heads(&self) -> Vec<Option<usize>> {
        let mut heads = vec![None; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate().skip(1) {
            if node.is_pruned || !node.is_first_child {
                continue;
            }
            let mut cursor = Some(id);
            while let Some(member) = cursor {
                heads[member] = Some(id);
                cursor = self.nodes[member].next;
            }
        }
        heads
    }

    fn index_list(&mut self, head: usize) -> Result<(), CompileError> {
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            if self.order.len() >= MAX_NODES {
                return Err(CompileError::TooManyNodes { max: MAX_NODES });
            }
            self.nodes[id].index = Some(self.order.len() as u32);
            self.order.push(id);
            cursor = self.nodes[id].next;
        }
        Ok(())
    }

    /// Encodes the automaton into the packed format.
    ///
    /// # Errors
    ///
    /// `AlphabetTooLarge` if the letters do not fit the letter field, plus
    /// anything [`assign_indices`](Dawg::assign_indices) reports.
    pub fn encode(&mut self) -> Result<EncodedDawg, CompileError> {
        check_alphabet(self.alphabet.len())?;
        let count = self.assign_indices()?;

        let mut words = Vec::with_capacity(1 + count * RECORD_WORDS);
        words.push(count as u32);
        for &id in &self.order {
            let node = &self.nodes[id];
            // The alphabet is collected from the same words, so every letter is present.
            let letter_index = self
                .alphabet
                .binary_search(&node.letter)
                .unwrap_or_default();
            let child = match node.child {
                Some(child) => self.nodes[child]
                    .index
                    .ok_or(CompileError::DetachedNode { node: child })?,
                None => 0,
            };
            let record = NodeRecord {
                letter_index: letter_index as u16,
                is_end_of_word: node.is_end_of_word,
                is_end_of_list: node.next.is_none(),
                child,
            };
            words.extend(record.pack());
        }
        Ok(EncodedDawg {
            alphabet: self.alphabet.clone(),
            words,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::builder::{build_trie, compile_words};

    #[test]
    fn record_packing() {
        let record = NodeRecord {
            letter_index: 25,
            is_end_of_word: true,
            is_end_of_list: false,
            child: 70_000,
        };
        assert_eq!(record.pack(), [25 | END_OF_WORD_FLAG, 70_000]);
        assert_eq!(NodeRecord::unpack(&record.pack()), record);
        assert_eq!(record.child_index(), Some(70_000));

        let leaf = NodeRecord {
            letter_index: u16::MAX,
            is_end_of_word: false,
            is_end_of_list: true,
            child: 0,
        };
        assert_eq!(leaf.pack(), [0xFFFF | END_OF_LIST_FLAG, 0]);
        assert_eq!(leaf.child_index(), None);
    }

    #[test]
    fn encodes_minimal_example() {
        let encoded = compile_words(["BARE", "BARS", "CARE", "CARS"]).unwrap();
        assert_eq!(encoded.alphabet(), ['A', 'B', 'C', 'E', 'R', 'S']);
        let records: Vec<NodeRecord> = encoded.records().collect();
        let letters: String = records
            .iter()
            .map(|r| encoded.alphabet()[r.letter_index as usize])
            .collect();
        // Top-level list first, then lists in breadth-first order.
        assert_eq!(letters, "BCARES");
        assert_eq!(records[0].child, 2);
        assert_eq!(records[1].child, 2);
        assert!(!records[0].is_end_of_list && records[1].is_end_of_list);
        assert_eq!(records[2].child, 3);
        assert_eq!(records[3].child, 4);
        assert!(records[4].is_end_of_word && !records[4].is_end_of_list);
        assert!(records[5].is_end_of_word && records[5].is_end_of_list);
        assert_eq!(encoded.words()[0], 6);
        assert_eq!(encoded.words().len(), 1 + 6 * RECORD_WORDS);
    }

    #[test]
    fn siblings_are_contiguous() {
        let words = [
            "ACE", "ACES", "ACT", "BAD", "BADE", "BED", "BEDS", "CAB", "CABS", "CAD", "DAB",
            "DEB", "DEBS",
        ];
        let encoded = compile_words(words).unwrap();
        let records: Vec<NodeRecord> = encoded.records().collect();
        for (i, record) in records.iter().enumerate() {
            if record.is_end_of_list {
                continue;
            }
            let next = records.get(i + 1).expect("list runs past the last record");
            assert!(
                next.letter_index > record.letter_index,
                "record {i} is not followed by a later sibling"
            );
        }
        // Every child index starts a list: the record before it ends another list.
        for record in &records {
            if let Some(child) = record.child_index() {
                assert!(child < records.len());
            }
        }
    }

    #[test]
    fn bytes_are_little_endian() {
        let encoded = compile_words(["AB"]).unwrap();
        let bytes = encoded.to_bytes();
        assert_eq!(bytes.len(), encoded.words().len() * 4);
        assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
    }

    #[test]
    fn assign_indices_is_repeatable() {
        let mut dawg = build_trie(["BARE", "BARS", "CARE", "CARS"]).reduce().unwrap();
        assert_eq!(dawg.assign_indices().unwrap(), 6);
        let first = dawg.encode().unwrap();
        assert_eq!(dawg.assign_indices().unwrap(), 6);
        assert_eq!(dawg.encode().unwrap(), first);
    }

    #[test]
    fn empty_word_list_encodes_header_only() {
        let encoded = compile_words(Vec::<String>::new()).unwrap();
        assert_eq!(encoded.words(), [0]);
        assert_eq!(encoded.records().count(), 0);
    }

    #[test]
    fn alphabet_path_appends_extension() {
        assert_eq!(
            alphabet_path(Path::new("dict/english.dict")),
            PathBuf::from("dict/english.dict.alphabet")
        );
    }
}
