//! The runtime word graph decoded from a packed dictionary.

use std::fs;
use std::io;
use std::path::Path;

use hashbrown::HashMap;
use log::debug;
use smallvec::SmallVec;
use thiserror::Error;

use super::encode::{alphabet_path, EncodedDawg, NodeRecord, RECORD_WORDS};

/// Errors that can occur when loading a packed dictionary.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The word array is empty.
    #[error("dictionary has no header word")]
    MissingHeader,
    /// The byte length is not a multiple of four.
    #[error("dictionary is {0} bytes, not a whole number of 32-bit words")]
    MisalignedBytes(usize),
    /// The header count disagrees with the number of words present.
    #[error("header promises {expected} words, found {actual}")]
    LengthMismatch {
        /// Words implied by the header.
        expected: usize,
        /// Words actually present.
        actual: usize,
    },
    /// A record names a letter outside the alphabet.
    #[error("node {node} uses letter index {index}, alphabet has {size} letters")]
    LetterOutOfRange {
        /// Offending record.
        node: usize,
        /// Letter index stored in the record.
        index: usize,
        /// Alphabet size.
        size: usize,
    },
    /// A record points past the last node.
    #[error("node {node} has child index {child}, only {count} nodes exist")]
    ChildOutOfRange {
        /// Offending record.
        node: usize,
        /// Child index stored in the record.
        child: usize,
        /// Number of records.
        count: usize,
    },
    /// A sibling run reaches the end of the array without an end-of-list bit.
    #[error("sibling list starting at node {start} is not terminated")]
    UnterminatedList {
        /// First record of the run.
        start: usize,
    },
    /// Following child links from a node leads back to it.
    #[error("child links from node {node} form a cycle")]
    Cycle {
        /// A node on the cycle.
        node: usize,
    },
    /// Reading the dictionary or its alphabet failed.
    #[error("reading dictionary: {0}")]
    Io(#[from] io::Error),
}

/// A node of the bidirectional word graph.
///
/// Edges are stored as `(letter, node id)` pairs. `post` edges lead towards the
/// end of a word, `pre` edges towards its start. A node shared by several
/// suffixes has one `pre` edge per parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetterNode {
    letter: char,
    is_end_of_word: bool,
    starts_word: bool,
    post: SmallVec<[(char, usize); 4]>,
    pre: SmallVec<[(char, usize); 2]>,
}

impl LetterNode {
    /// The letter this node stands for.
    #[inline]
    pub fn letter(&self) -> char {
        self.letter
    }

    /// True if a word may end on this node.
    #[inline]
    pub fn is_end_of_word(&self) -> bool {
        self.is_end_of_word
    }

    /// True if a word may start on this node.
    #[inline]
    pub fn starts_word(&self) -> bool {
        self.starts_word
    }

    /// Forward edges, in ascending letter order.
    #[inline]
    pub fn post(&self) -> &[(char, usize)] {
        &self.post
    }

    /// Backward edges.
    #[inline]
    pub fn pre(&self) -> &[(char, usize)] {
        &self.pre
    }

    /// Returns the node that `letter`'s forward edge leads to.
    #[inline]
    pub fn child(&self, letter: char) -> Option<usize> {
        self.post
            .iter()
            .find_map(|&(ch, id)| (ch == letter).then_some(id))
    }

    /// Returns the node that `letter`'s backward edge leads to.
    ///
    /// Several parents may carry the same letter; this yields each of them.
    pub fn parents(&self, letter: char) -> impl Iterator<Item = usize> + '_ {
        self.pre
            .iter()
            .filter_map(move |&(ch, id)| (ch == letter).then_some(id))
    }
}

/// A loaded dictionary.
///
/// The lexicon never changes after loading, so one instance can serve any
/// number of concurrent searches by shared reference.
///
/// # Examples
///
/// ```
/// use dawgplay::dawg::builder::build_lexicon;
///
/// let lexicon = build_lexicon(["ACT", "CAT", "TACT"]).unwrap();
/// assert!(lexicon.has_word("CAT"));
/// assert!(lexicon.has_sequence("AC"));
/// assert!(!lexicon.has_sequence("TT"));
/// assert_eq!(lexicon.find_anagrams("TCA"), ["ACT", "CAT"]);
/// assert_eq!(lexicon.find_anagrams("T A"), ["ACT", "CAT"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    alphabet: Vec<char>,
    nodes: Vec<LetterNode>,
    roots: Vec<(char, usize)>,
    sequence_roots: HashMap<char, Vec<usize>>,
}

impl Lexicon {
    /// Decodes a word array whose letter indices refer to `alphabet`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the array is truncated, inconsistent with
    /// its header, or refers to letters or nodes that do not exist.
    pub fn decode(alphabet: &[char], words: &[u32]) -> Result<Self, DecodeError> {
        let (&count, body) = words.split_first().ok_or(DecodeError::MissingHeader)?;
        let count = count as usize;
        let expected = count
            .checked_mul(RECORD_WORDS)
            .and_then(|n| n.checked_add(1))
            .unwrap_or(usize::MAX);
        if words.len() != expected {
            return Err(DecodeError::LengthMismatch {
                expected,
                actual: words.len(),
            });
        }

        let records: Vec<NodeRecord> = body
            .chunks_exact(RECORD_WORDS)
            .map(NodeRecord::unpack)
            .collect();
        for (node, record) in records.iter().enumerate() {
            let index = usize::from(record.letter_index);
            if index >= alphabet.len() {
                return Err(DecodeError::LetterOutOfRange {
                    node,
                    index,
                    size: alphabet.len(),
                });
            }
            if record.child as usize >= count {
                return Err(DecodeError::ChildOutOfRange {
                    node,
                    child: record.child as usize,
                    count,
                });
            }
        }

        let mut nodes: Vec<LetterNode> = records
            .iter()
            .map(|record| LetterNode {
                letter: alphabet[usize::from(record.letter_index)],
                is_end_of_word: record.is_end_of_word,
                starts_word: false,
                post: SmallVec::new(),
                pre: SmallVec::new(),
            })
            .collect();

        // Every list is decoded once and then copied to each node pointing at it.
        let mut lists: HashMap<usize, SmallVec<[(char, usize); 4]>> = HashMap::new();
        for (id, record) in records.iter().enumerate() {
            if let Some(child) = record.child_index() {
                if !lists.contains_key(&child) {
                    let list = sibling_run(&records, &nodes, child)?;
                    lists.insert(child, list);
                }
                nodes[id].post = lists[&child].clone();
            }
        }

        check_acyclic(&nodes)?;

        let roots = if count == 0 {
            SmallVec::new()
        } else {
            sibling_run(&records, &nodes, 0)?
        };
        for &(_, id) in &roots {
            nodes[id].starts_word = true;
        }

        // Linking pass: mirror every forward edge as a backward edge.
        for parent in 0..nodes.len() {
            let letter = nodes[parent].letter;
            for i in 0..nodes[parent].post.len() {
                let (_, child) = nodes[parent].post[i];
                nodes[child].pre.push((letter, parent));
            }
        }

        let mut sequence_roots: HashMap<char, Vec<usize>> = HashMap::new();
        for (id, node) in nodes.iter().enumerate() {
            sequence_roots.entry(node.letter).or_default().push(id);
        }

        debug!(
            "decoded {} nodes, {} top-level letters, {} alphabet letters",
            nodes.len(),
            roots.len(),
            alphabet.len()
        );
        Ok(Lexicon {
            alphabet: alphabet.to_vec(),
            nodes,
            roots: roots.into_vec(),
            sequence_roots,
        })
    }

    /// Decodes little-endian bytes, as written by [`EncodedDawg::save`].
    pub fn from_bytes(alphabet: &str, bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() % 4 != 0 {
            return Err(DecodeError::MisalignedBytes(bytes.len()));
        }
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let alphabet: Vec<char> = alphabet.trim_end_matches(['\n', '\r']).chars().collect();
        Self::decode(&alphabet, &words)
    }

    /// Loads a freshly encoded dictionary.
    pub fn from_encoded(encoded: &EncodedDawg) -> Result<Self, DecodeError> {
        Self::decode(encoded.alphabet(), encoded.words())
    }

    /// Loads the dictionary at `path` together with its alphabet file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dawgplay::dawg::lexicon::Lexicon;
    ///
    /// let lexicon = Lexicon::open("english.dict").unwrap();
    /// assert!(lexicon.has_word("QUIZ"));
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let alphabet = fs::read_to_string(alphabet_path(path))?;
        Self::from_bytes(&alphabet, &bytes)
    }

    /// True if `word` is in the dictionary.
    pub fn has_word(&self, word: &str) -> bool {
        let mut letters = word.chars();
        let Some(first) = letters.next() else {
            return false;
        };
        self.root(first)
            .and_then(|start| self.follow(start, letters))
            .is_some_and(|id| self.nodes[id].is_end_of_word)
    }

    /// True if `letters` is a contiguous run of some word: a prefix, a suffix,
    /// an infix or a whole word. The empty string is not a sequence.
    pub fn has_sequence(&self, letters: &str) -> bool {
        let mut chars = letters.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        self.sequence_roots(first)
            .iter()
            .any(|&start| self.follow(start, chars.clone()).is_some())
    }

    /// Every node standing for `letter`, or an empty slice for unknown letters.
    pub fn sequence_roots(&self, letter: char) -> &[usize] {
        self.sequence_roots
            .get(&letter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The top-level node for `letter`, where words starting with it begin.
    pub fn root(&self, letter: char) -> Option<usize> {
        self.roots
            .iter()
            .find_map(|&(ch, id)| (ch == letter).then_some(id))
    }

    /// The top-level letters and their nodes, in ascending order.
    pub fn roots(&self) -> &[(char, usize)] {
        &self.roots
    }

    /// Follows forward edges from `start` along `letters`.
    pub fn follow(&self, start: usize, letters: impl IntoIterator<Item = char>) -> Option<usize> {
        letters
            .into_iter()
            .try_fold(start, |id, letter| self.nodes[id].child(letter))
    }

    /// Every word that can be formed from `letters`, where each space is a
    /// blank standing for any letter. Words need not use every letter.
    /// The result is sorted and free of duplicates.
    pub fn find_anagrams(&self, letters: &str) -> Vec<String> {
        let mut counts: HashMap<char, usize> = HashMap::new();
        let mut blanks = 0;
        for letter in letters.chars() {
            if letter == ' ' {
                blanks += 1;
            } else {
                *counts.entry(letter).or_default() += 1;
            }
        }
        let mut found = Vec::new();
        let mut word = String::new();
        self.anagrams_from(&self.roots, &mut counts, blanks, &mut word, &mut found);
        found
    }

    fn anagrams_from(
        &self,
        edges: &[(char, usize)],
        counts: &mut HashMap<char, usize>,
        blanks: usize,
        word: &mut String,
        found: &mut Vec<String>,
    ) {
        for &(letter, id) in edges {
            let exact = counts.get(&letter).copied().unwrap_or(0);
            let blanks_left = if exact > 0 {
                counts.insert(letter, exact - 1);
                blanks
            } else if blanks > 0 {
                blanks - 1
            } else {
                continue;
            };

            word.push(letter);
            let node = &self.nodes[id];
            if node.is_end_of_word {
                found.push(word.clone());
            }
            self.anagrams_from(&node.post, counts, blanks_left, word, found);
            word.pop();

            if exact > 0 {
                counts.insert(letter, exact);
            }
        }
    }

    /// Every word in the dictionary, in ascending order.
    pub fn words(&self) -> Vec<String> {
        let mut found = Vec::new();
        let mut stack: Vec<(usize, String)> = self
            .roots
            .iter()
            .rev()
            .map(|&(letter, id)| (id, letter.to_string()))
            .collect();
        while let Some((id, word)) = stack.pop() {
            let node = &self.nodes[id];
            for &(letter, child) in node.post.iter().rev() {
                let mut longer = word.clone();
                longer.push(letter);
                stack.push((child, longer));
            }
            if node.is_end_of_word {
                found.push(word);
            }
        }
        found
    }

    /// Returns the node stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this lexicon.
    #[inline]
    pub fn node(&self, id: usize) -> &LetterNode {
        &self.nodes[id]
    }

    /// Number of graph nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the lexicon holds no words.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The letters the dictionary is written in.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }
}

/// Fails on the first child link that leads back to a node still being visited.
fn check_acyclic(nodes: &[LetterNode]) -> Result<(), DecodeError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let mut marks = vec![Mark::New; nodes.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for start in 0..nodes.len() {
        if marks[start] != Mark::New {
            continue;
        }
        marks[start] = Mark::Open;
        stack.push((start, 0));
        while let Some(&(id, edge)) = stack.last() {
            let Some(&(_, child)) = nodes[id].post.get(edge) else {
                marks[id] = Mark::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            match marks[child] {
                Mark::Open => return Err(DecodeError::Cycle { node: child }),
                Mark::New => {
                    marks[child] = Mark::Open;
                    stack.push((child, 0));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}

/// Collects the sibling run starting at record `start`.
fn sibling_run(
    records: &[NodeRecord],
    nodes: &[LetterNode],
    start: usize,
) -> Result<SmallVec<[(char, usize); 4]>, DecodeError> {
    let mut list = SmallVec::new();
    for (id, record) in records.iter().enumerate().skip(start) {
        list.push((nodes[id].letter, id));
        if record.is_end_of_list {
            return Ok(list);
        }
    }
    Err(DecodeError::UnterminatedList { start })
}
