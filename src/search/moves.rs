use std::fmt;

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::board::{Axis, Tile};

/// A tile newly put on the board by a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
    /// Column of the square.
    pub col: usize,
    /// Row of the square.
    pub row: usize,
    /// The tile, with a blank's letter assigned.
    pub tile: Tile,
}

impl Placement {
    /// Places `tile` at `(col, row)`.
    pub fn new(col: usize, row: usize, tile: Tile) -> Self {
        Placement { col, row, tile }
    }
}

/// A word formed by a move, with its score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WordScore {
    /// The word as spelled on the board.
    pub word: String,
    /// Its points, multipliers included.
    pub score: u32,
}

/// A scored play: new tiles in board order, every word they form, and the total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Move {
    /// Direction of the main word.
    pub axis: Axis,
    /// New tiles, ordered along `axis`.
    pub placements: Vec<Placement>,
    /// The main word first, then cross words.
    pub words: Vec<WordScore>,
    /// Total points, bonus included.
    pub score: u32,
}

impl Move {
    /// The main word, if the move forms one.
    pub fn main_word(&self) -> Option<&str> {
        self.words.first().map(|w| w.word.as_str())
    }

    /// Tiles taken from the rack, in rack notation (a space per blank).
    pub fn rack_letters(&self) -> String {
        self.placements.iter().map(|p| p.tile.rack_letter()).collect()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (col, row) = self
            .placements
            .first()
            .map_or((0, 0), |p| (p.col, p.row));
        write!(
            f,
            "{} {} at ({}, {}) for {}",
            self.main_word().unwrap_or("-"),
            self.axis,
            col,
            row,
            self.score
        )?;
        if self.words.len() > 1 {
            let words = self
                .words
                .iter()
                .map(|w| format!("{} {}", w.word, w.score))
                .join(", ");
            write!(f, " [{words}]")?;
        }
        Ok(())
    }
}

/// Result of a search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// The highest scoring move, `None` if no legal move exists.
    pub best: Option<Move>,
    /// Every strict improvement in the order it was found, if requested.
    /// The last entry equals `best`.
    pub improvements: Vec<Move>,
}

/// Keeps the best candidate seen so far. A candidate replaces it only with a
/// strictly higher score.
#[derive(Debug, Default)]
pub(crate) struct BestMove {
    best: Option<Move>,
    improvements: Vec<Move>,
    record: bool,
}

impl BestMove {
    pub(crate) fn new(record: bool) -> Self {
        BestMove {
            best: None,
            improvements: Vec::new(),
            record,
        }
    }

    /// Score of the current best.
    pub(crate) fn score(&self) -> Option<u32> {
        self.best.as_ref().map(|m| m.score)
    }

    /// Offers a candidate; returns true if it became the new best.
    pub(crate) fn offer(&mut self, candidate: Move) -> bool {
        if self.score().is_some_and(|best| candidate.score <= best) {
            return false;
        }
        debug!("improved: {candidate}");
        if self.record {
            self.improvements.push(candidate.clone());
        }
        self.best = Some(candidate);
        true
    }

    pub(crate) fn into_outcome(self) -> SearchOutcome {
        SearchOutcome {
            best: self.best,
            improvements: self.improvements,
        }
    }
}
