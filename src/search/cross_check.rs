//! Per-square letter restrictions imposed by perpendicular words.

use itertools::Itertools;

use super::board::{Axis, Board, Tile};
use crate::dawg::Lexicon;

/// Letters the search may try: the whole alphabet if the rack holds a blank,
/// otherwise the rack's distinct letters. Sorted.
pub fn available_letters(rack: &[Tile], alphabet: &[char]) -> Vec<char> {
    if rack.iter().any(|tile| tile.is_blank) {
        alphabet.iter().copied().sorted().dedup().collect()
    } else {
        rack.iter().map(|tile| tile.letter).sorted().dedup().collect()
    }
}

/// For every empty square and axis, the letters that may be placed there
/// when playing along that axis.
#[derive(Clone, Debug)]
pub struct CrossChecks {
    cols: usize,
    letters: Vec<[Vec<char>; 2]>,
}

impl CrossChecks {
    /// Computes the table for `board`, restricted to `available` letters.
    ///
    /// A letter is allowed on an empty square if the perpendicular run of
    /// tiles it joins, read with the letter in place, is a word. A square
    /// with no perpendicular neighbour allows every available letter.
    /// Occupied squares allow nothing.
    pub fn build(board: &Board, lexicon: &Lexicon, available: &[char]) -> Self {
        let mut letters = Vec::with_capacity(board.cols() * board.rows());
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                let entry = if board.is_free(col, row) {
                    Axis::ALL.map(|axis| allowed_at(board, lexicon, available, col, row, axis))
                } else {
                    [Vec::new(), Vec::new()]
                };
                letters.push(entry);
            }
        }
        CrossChecks {
            cols: board.cols(),
            letters,
        }
    }

    /// Allowed letters at `(col, row)` for a play along `axis`, sorted.
    /// Empty for occupied or off-board squares.
    pub fn get(&self, col: usize, row: usize, axis: Axis) -> &[char] {
        if col >= self.cols {
            return &[];
        }
        self.letters
            .get(row * self.cols + col)
            .map_or(&[][..], |entry| entry[axis.index()].as_slice())
    }

    /// True if `letter` may be placed at `(col, row)` for a play along `axis`.
    #[inline]
    pub fn allows(&self, col: usize, row: usize, axis: Axis, letter: char) -> bool {
        self.get(col, row, axis).binary_search(&letter).is_ok()
    }
}

/// The tiles on one side of `(col, row)` along `axis`, read in board order.
fn run_of_tiles(board: &Board, col: usize, row: usize, axis: Axis, before: bool) -> String {
    let step = |c, r| {
        if before {
            board.prev_along(c, r, axis)
        } else {
            board.next_along(c, r, axis)
        }
    };
    let mut letters = Vec::new();
    let mut square = step(col, row);
    while let Some(tile) = square.and_then(|(c, r)| board.tile(c, r)) {
        letters.push(tile.letter);
        square = square.and_then(|(c, r)| step(c, r));
    }
    if before {
        letters.reverse();
    }
    letters.into_iter().collect()
}

fn allowed_at(
    board: &Board,
    lexicon: &Lexicon,
    available: &[char],
    col: usize,
    row: usize,
    axis: Axis,
) -> Vec<char> {
    let cross = axis.perpendicular();
    let before = run_of_tiles(board, col, row, cross, true);
    let after = run_of_tiles(board, col, row, cross, false);
    if before.is_empty() && after.is_empty() {
        return available.to_vec();
    }
    if (!before.is_empty() && !lexicon.has_sequence(&before))
        || (!after.is_empty() && !lexicon.has_sequence(&after))
    {
        return Vec::new();
    }
    let mut word = String::with_capacity(before.len() + after.len() + 4);
    available
        .iter()
        .copied()
        .filter(|&letter| {
            word.clear();
            word.push_str(&before);
            word.push(letter);
            word.push_str(&after);
            lexicon.has_word(&word)
        })
        .collect()
}
