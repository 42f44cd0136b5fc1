use smallvec::SmallVec;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use thiserror::Error;

use super::encode::{check_alphabet, EncodedDawg};
use super::lexicon::{DecodeError, Lexicon};
use super::trie::Trie;

/// Trait for types that can be used as a word when building a trie.
///
/// Implemented for common string and sequence types so that [`Trie::add_word`]
/// and [`compile_words`] accept them directly without manual conversion.
pub trait IntoWord {
    /// Collects this word into a character buffer.
    fn collect_word(self) -> SmallVec<[char; 32]>;
}

impl IntoWord for &str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord for &&str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord for String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord for &String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord for &[char] {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.iter().copied().collect()
    }
}

impl IntoWord for Vec<char> {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.into_iter().collect()
    }
}

impl<const N: usize> IntoWord for [char; N] {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.into_iter().collect()
    }
}

/// Errors that can occur when compiling a word list into an encoded DAWG.
///
/// Every variant is fatal for the compile. The reduction variants
/// (`MergeTarget*`, `DetachedNode`) mean the reducer broke one of its own
/// invariants and never occur on well-formed input.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The lexicon uses more distinct letters than the record's letter field can address.
    #[error("alphabet has {size} letters, the encoding addresses at most {max}")]
    AlphabetTooLarge {
        /// Number of distinct letters in the word list.
        size: usize,
        /// Largest alphabet the encoding supports.
        max: usize,
    },
    /// More surviving nodes than the child index field can address.
    #[error("more than {max} nodes survived reduction")]
    TooManyNodes {
        /// Largest node count the encoding supports.
        max: usize,
    },
    /// A pruned child had no surviving equivalent in its depth bucket.
    #[error("no surviving equivalent for pruned node {node}")]
    MergeTargetMissing {
        /// Trie arena index of the pruned node.
        node: usize,
    },
    /// A redirect resolved to a node that is itself pruned.
    #[error("redirect for node {node} resolved to pruned node {target}")]
    MergeTargetPruned {
        /// Trie arena index of the pruned node being redirected.
        node: usize,
        /// The pruned target it resolved to.
        target: usize,
    },
    /// A surviving node is reachable only through a pruned list head.
    #[error("node {node} has no surviving sibling list head")]
    DetachedNode {
        /// Trie arena index of the detached node.
        node: usize,
    },
    /// The freshly encoded dictionary failed to load.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Reading the word list failed.
    #[error("reading word list: {0}")]
    Io(#[from] std::io::Error),
}

/// Normalization applied to lines of a word list file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordListOptions {
    /// Words shorter than this (in letters) are skipped.
    pub min_length: usize,
    /// Words longer than this (in letters) are skipped.
    pub max_length: Option<usize>,
    /// Upper-case every word before adding it.
    pub uppercase: bool,
}

impl Default for WordListOptions {
    fn default() -> Self {
        WordListOptions {
            min_length: 2,
            max_length: None,
            uppercase: true,
        }
    }
}

impl WordListOptions {
    /// Applies the options to one line, returning the word to add if it is kept.
    pub fn normalize(&self, line: &str) -> Option<String> {
        let word = line.trim();
        if word.is_empty() || is_comment(word) {
            return None;
        }
        let length = word.chars().count();
        if length < self.min_length || self.max_length.is_some_and(|max| length > max) {
            return None;
        }
        Some(if self.uppercase {
            word.to_uppercase()
        } else {
            word.to_string()
        })
    }
}

/// Builds a trie from an iterator of words.
///
/// Words should arrive in ascending order; out-of-order words are still
/// inserted correctly but logged as a warning.
pub fn build_trie<W: IntoWord>(words: impl IntoIterator<Item = W>) -> Trie {
    let mut trie = Trie::new();
    for word in words {
        trie.add_word(word);
    }
    trie
}

/// Compiles words into the packed dictionary format.
///
/// This runs the full pipeline: trie construction, DAWG reduction, index
/// assignment and encoding.
///
/// # Examples
///
/// ```
/// use dawgplay::dawg::builder::compile_words;
///
/// let encoded = compile_words(["BARE", "BARS", "CARE", "CARS"]).unwrap();
/// assert_eq!(encoded.node_count(), 6);
/// ```
pub fn compile_words<W: IntoWord>(
    words: impl IntoIterator<Item = W>,
) -> Result<EncodedDawg, CompileError> {
    compile_trie(build_trie(words))
}

/// Reduces and encodes an already built trie.
pub fn compile_trie(trie: Trie) -> Result<EncodedDawg, CompileError> {
    check_alphabet(trie.alphabet().len())?;
    let words = trie.word_count();
    let trie_nodes = trie.node_count();
    let mut dawg = trie.reduce()?;
    let encoded = dawg.encode()?;
    info!(
        "compiled {} words: {} trie nodes reduced to {} ({} letters)",
        words,
        trie_nodes,
        encoded.node_count(),
        encoded.alphabet().len()
    );
    Ok(encoded)
}

/// Compiles words straight into a loaded [`Lexicon`].
pub fn build_lexicon<W: IntoWord>(
    words: impl IntoIterator<Item = W>,
) -> Result<Lexicon, CompileError> {
    let encoded = compile_words(words)?;
    Ok(Lexicon::from_encoded(&encoded)?)
}

/// Compiles a word list file (one word per line) into the packed format.
///
/// Lines starting with '#' are comments. Blank lines and words rejected by
/// `options` are skipped.
///
/// # Examples
///
/// ```no_run
/// use dawgplay::dawg::builder::{compile_file, WordListOptions};
///
/// let encoded = compile_file("words.txt", &WordListOptions::default()).unwrap();
/// encoded.save("words.dict").unwrap();
/// ```
pub fn compile_file(
    path: impl AsRef<Path>,
    options: &WordListOptions,
) -> Result<EncodedDawg, CompileError> {
    let mut trie = Trie::new();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    // read_line into one reused buffer rather than lines(), which allocates per line.
    let mut buf = String::with_capacity(80);
    loop {
        let bytes_read = reader.read_line(&mut buf);
        match bytes_read {
            Ok(0) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        if let Some(word) = options.normalize(&buf) {
            trie.add_word(word);
        }
        buf.clear();
    }
    compile_trie(trie)
}

/// Returns true if this line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}
