//! # dawgplay
//!
//! Compiles word lists into compact, bit-packed
//! [DAWGs](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Directed Acyclic Word Graphs) and uses them to find the highest scoring
//! word placement on a tile board.
//!
//! ## Compiling a dictionary
//!
//! A word list is first built into a letter-sorted trie, then reduced by
//! sharing identical subtrees, and finally packed into an array of `u32`
//! words where sibling nodes occupy consecutive records:
//!
//! ```
//! use dawgplay::dawg::builder::compile_words;
//! use dawgplay::dawg::lexicon::Lexicon;
//!
//! let encoded = compile_words(["BARE", "BARS", "CARE", "CARS"]).unwrap();
//! // The "ARE"/"ARS" tail is stored once.
//! assert_eq!(encoded.node_count(), 6);
//!
//! let lexicon = Lexicon::from_encoded(&encoded).unwrap();
//! assert!(lexicon.has_word("CARS"));
//! assert!(!lexicon.has_word("CAR"));
//! assert!(lexicon.has_sequence("AR"));
//! ```
//!
//! [`EncodedDawg::save`](dawg::EncodedDawg::save) writes the array and its
//! alphabet to disk and [`Lexicon::open`](dawg::Lexicon::open) loads them back.
//!
//! ## Finding a move
//!
//! The decoded [`Lexicon`](dawg::Lexicon) can be walked both forwards and
//! backwards, which the move search uses to grow words in both directions
//! from the tiles already on the board:
//!
//! ```
//! use dawgplay::dawg::build_lexicon;
//! use dawgplay::search::{find_best_move, Axis, Edition, SearchConfig};
//!
//! let lexicon = build_lexicon(["CAT", "CATS", "SCAT"]).unwrap();
//! let edition = Edition::english();
//! let mut board = edition.new_board().unwrap();
//! board.place_word(6, 7, Axis::Across, "CAT", &edition).unwrap();
//!
//! let rack = edition.rack("SS").unwrap();
//! let outcome = find_best_move(&lexicon, &edition, &board, &rack, &SearchConfig::new()).unwrap();
//! let best = outcome.best.unwrap();
//! // CATS or SCAT, both worth 3 + 1 + 1 + 1.
//! assert_eq!(best.score, 6);
//! assert_eq!(best.placements.len(), 1);
//! ```
//!
//! The lexicon is immutable once loaded and can be shared by reference
//! between threads running independent searches.

#![warn(missing_docs)]

/// Trie construction, DAWG reduction, encoding and the decoded word graph.
pub mod dawg;
/// Board move search.
pub mod search;
