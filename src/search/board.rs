//! Board geometry, premium squares and play scoring.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::edition::Edition;
use super::moves::{Move, Placement, WordScore};

/// Errors raised while building or filling a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The layout has no rows or no columns.
    #[error("board layout is empty")]
    EmptyLayout,
    /// A layout row differs in length from the first row.
    #[error("layout row {row} has {found} squares, expected {expected}")]
    RaggedLayout {
        /// Offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A layout character names no known square kind.
    #[error("unknown square {symbol:?} at column {col}, row {row}")]
    UnknownSquare {
        /// The character found.
        symbol: char,
        /// Column of the character.
        col: usize,
        /// Row of the character.
        row: usize,
    },
    /// Coordinates outside the board.
    #[error("square ({col}, {row}) is off the board")]
    OutOfBounds {
        /// Requested column.
        col: usize,
        /// Requested row.
        row: usize,
    },
    /// A tile was placed on an occupied square.
    #[error("square ({col}, {row}) already holds a tile")]
    Occupied {
        /// Requested column.
        col: usize,
        /// Requested row.
        row: usize,
    },
    /// A letter has no value in the edition.
    #[error("letter {0:?} is not part of the edition")]
    UnknownLetter(char),
}

/// Direction a word runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Left to right.
    Across,
    /// Top to bottom.
    Down,
}

impl Axis {
    /// Both axes, `Across` first.
    pub const ALL: [Axis; 2] = [Axis::Across, Axis::Down];

    /// 0 for `Across`, 1 for `Down`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Across => 0,
            Axis::Down => 1,
        }
    }

    /// The other axis.
    #[inline]
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Across => Axis::Down,
            Axis::Down => Axis::Across,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Across => "across",
            Axis::Down => "down",
        })
    }
}

/// A letter tile. A blank carries the letter it stands for once played, and
/// a space while it is still on the rack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// The letter shown, or `' '` for an unassigned blank.
    pub letter: char,
    /// True for blank tiles.
    pub is_blank: bool,
    /// Points the tile is worth.
    pub score: u32,
}

impl Tile {
    /// A regular letter tile.
    pub fn new(letter: char, score: u32) -> Self {
        Tile {
            letter,
            is_blank: false,
            score,
        }
    }

    /// An unassigned blank.
    pub fn blank() -> Self {
        Tile {
            letter: ' ',
            is_blank: true,
            score: 0,
        }
    }

    /// This blank, standing for `letter`.
    pub fn assigned(self, letter: char) -> Self {
        Tile { letter, ..self }
    }

    /// The rack notation: the letter, or a space for a blank.
    pub fn rack_letter(&self) -> char {
        if self.is_blank {
            ' '
        } else {
            self.letter
        }
    }
}

/// One board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Square {
    /// Multiplier for a tile newly placed here.
    pub letter_multiplier: u32,
    /// Multiplier for every word a new tile here takes part in.
    pub word_multiplier: u32,
    /// The tile on the square, if any.
    pub tile: Option<Tile>,
}

impl Square {
    const PLAIN: Square = Square {
        letter_multiplier: 1,
        word_multiplier: 1,
        tile: None,
    };

    fn from_symbol(symbol: char) -> Option<Square> {
        let (letter_multiplier, word_multiplier) = match symbol {
            '.' => (1, 1),
            'd' => (2, 1),
            't' => (3, 1),
            'q' => (4, 1),
            'D' | 'M' => (1, 2),
            'T' => (1, 3),
            'Q' => (1, 4),
            _ => return None,
        };
        Some(Square {
            letter_multiplier,
            word_multiplier,
            tile: None,
        })
    }

    fn symbol(&self) -> char {
        match (self.letter_multiplier, self.word_multiplier) {
            (2, _) => 'd',
            (3, _) => 't',
            (4, _) => 'q',
            (_, 2) => 'D',
            (_, 3) => 'T',
            (_, 4) => 'Q',
            _ => '.',
        }
    }
}

/// A rectangular board.
///
/// # Examples
///
/// ```
/// use dawgplay::search::board::{Axis, Board};
/// use dawgplay::search::edition::Edition;
///
/// let edition = Edition::english();
/// let mut board = edition.new_board().unwrap();
/// board.place_word(7, 7, Axis::Across, "CAt", &edition).unwrap();
/// assert_eq!(board.tile(9, 7).map(|t| t.is_blank), Some(true));
/// assert!(!board.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    squares: Vec<Square>,
}

impl Board {
    /// A board without premium squares.
    pub fn new(cols: usize, rows: usize) -> Self {
        Board {
            cols,
            rows,
            squares: vec![Square::PLAIN; cols * rows],
        }
    }

    /// Builds a board from layout rows, one character per square.
    ///
    /// `.` is a plain square, `d`/`t`/`q` multiply the letter and
    /// `D`/`T`/`Q` the word by two, three or four. `M` marks a double-word
    /// centre square.
    ///
    /// # Errors
    ///
    /// Fails on an empty or ragged layout, or an unknown character.
    pub fn from_layout<S: AsRef<str>>(layout: &[S]) -> Result<Self, BoardError> {
        let cols = layout
            .first()
            .map(|row| row.as_ref().chars().count())
            .unwrap_or(0);
        if cols == 0 {
            return Err(BoardError::EmptyLayout);
        }
        let mut squares = Vec::with_capacity(cols * layout.len());
        for (row, line) in layout.iter().enumerate() {
            let found = line.as_ref().chars().count();
            if found != cols {
                return Err(BoardError::RaggedLayout {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.as_ref().chars().enumerate() {
                let square = Square::from_symbol(symbol).ok_or(BoardError::UnknownSquare {
                    symbol,
                    col,
                    row,
                })?;
                squares.push(square);
            }
        }
        Ok(Board {
            cols,
            rows: layout.len(),
            squares,
        })
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The centre square, which the first play must cover.
    pub fn centre(&self) -> (usize, usize) {
        (self.cols / 2, self.rows / 2)
    }

    /// The square at `(col, row)`, or `None` off the board.
    #[inline]
    pub fn at(&self, col: usize, row: usize) -> Option<&Square> {
        if col < self.cols && row < self.rows {
            self.squares.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// The tile at `(col, row)`, if the square exists and is occupied.
    #[inline]
    pub fn tile(&self, col: usize, row: usize) -> Option<&Tile> {
        self.at(col, row).and_then(|square| square.tile.as_ref())
    }

    /// True if `(col, row)` is on the board and holds no tile.
    #[inline]
    pub fn is_free(&self, col: usize, row: usize) -> bool {
        self.at(col, row).is_some_and(|square| square.tile.is_none())
    }

    /// True if no tile has been placed.
    pub fn is_empty(&self) -> bool {
        self.squares.iter().all(|square| square.tile.is_none())
    }

    /// The square before `(col, row)` along `axis`.
    #[inline]
    pub fn prev_along(&self, col: usize, row: usize, axis: Axis) -> Option<(usize, usize)> {
        match axis {
            Axis::Across => col.checked_sub(1).map(|col| (col, row)),
            Axis::Down => row.checked_sub(1).map(|row| (col, row)),
        }
    }

    /// The square after `(col, row)` along `axis`.
    #[inline]
    pub fn next_along(&self, col: usize, row: usize, axis: Axis) -> Option<(usize, usize)> {
        let (col, row) = match axis {
            Axis::Across => (col + 1, row),
            Axis::Down => (col, row + 1),
        };
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    /// The up to four squares sharing an edge with `(col, row)`.
    pub fn neighbours(&self, col: usize, row: usize) -> impl Iterator<Item = (usize, usize)> {
        [
            self.prev_along(col, row, Axis::Across),
            self.next_along(col, row, Axis::Across),
            self.prev_along(col, row, Axis::Down),
            self.next_along(col, row, Axis::Down),
        ]
        .into_iter()
        .flatten()
    }

    /// Puts a tile on an empty square.
    pub fn place(&mut self, col: usize, row: usize, tile: Tile) -> Result<(), BoardError> {
        if col >= self.cols || row >= self.rows {
            return Err(BoardError::OutOfBounds { col, row });
        }
        let square = &mut self.squares[row * self.cols + col];
        if square.tile.is_some() {
            return Err(BoardError::Occupied { col, row });
        }
        square.tile = Some(tile);
        Ok(())
    }

    /// Writes `word` onto the board starting at `(col, row)`.
    ///
    /// Upper-case letters become regular tiles scored by `edition`, lower-case
    /// letters blanks standing for their upper-case form. Squares already
    /// holding the same letter are passed over.
    pub fn place_word(
        &mut self,
        col: usize,
        row: usize,
        axis: Axis,
        word: &str,
        edition: &Edition,
    ) -> Result<(), BoardError> {
        let mut square = Some((col, row));
        for letter in word.chars() {
            let (c, r) = square.ok_or(BoardError::OutOfBounds { col, row })?;
            let tile = edition.board_tile(letter)?;
            match self.tile(c, r) {
                Some(existing) if existing.letter == tile.letter => {}
                _ => self.place(c, r, tile)?,
            }
            square = self.next_along(c, r, axis);
        }
        Ok(())
    }

    /// Fills the board from rows of tile notation: `.` or a space for an
    /// empty square, upper case for a tile, lower case for a blank.
    pub fn load_tiles<S: AsRef<str>>(
        &mut self,
        rows: &[S],
        edition: &Edition,
    ) -> Result<(), BoardError> {
        for (row, line) in rows.iter().enumerate() {
            for (col, symbol) in line.as_ref().chars().enumerate() {
                if symbol != '.' && symbol != ' ' {
                    self.place(col, row, edition.board_tile(symbol)?)?;
                }
            }
        }
        Ok(())
    }

    /// The tile at `(col, row)`, looking at `placements` before the board.
    fn tile_with(&self, placements: &[Placement], col: usize, row: usize) -> Option<(Tile, bool)> {
        placements
            .iter()
            .find(|p| p.col == col && p.row == row)
            .map(|p| (p.tile, true))
            .or_else(|| self.tile(col, row).map(|&tile| (tile, false)))
    }

    /// Scores the word through `(col, row)` along `axis`, including
    /// `placements`. Returns `None` if that word is a single letter.
    fn score_word(
        &self,
        placements: &[Placement],
        col: usize,
        row: usize,
        axis: Axis,
    ) -> Option<WordScore> {
        let (mut col, mut row) = (col, row);
        while let Some((c, r)) = self.prev_along(col, row, axis) {
            if self.tile_with(placements, c, r).is_none() {
                break;
            }
            (col, row) = (c, r);
        }

        let mut word = String::new();
        let mut sum = 0;
        let mut multiplier: u32 = 1;
        let mut square = Some((col, row));
        while let Some((c, r)) = square {
            let Some((tile, is_new)) = self.tile_with(placements, c, r) else {
                break;
            };
            word.push(tile.letter);
            if is_new {
                let premium = self.at(c, r).copied().unwrap_or(Square::PLAIN);
                sum = tile
                    .score
                    .saturating_mul(premium.letter_multiplier)
                    .saturating_add(sum);
                multiplier = multiplier.saturating_mul(premium.word_multiplier);
            } else {
                sum = sum.saturating_add(tile.score);
            }
            square = self.next_along(c, r, axis);
        }
        (word.chars().count() >= 2).then(|| WordScore {
            word,
            score: sum.saturating_mul(multiplier),
        })
    }

    /// Scores new tiles played along `axis`.
    ///
    /// The main word is the one through the first placement along `axis`.
    /// Each new tile that also forms a perpendicular word scores that word
    /// too, and the edition's bonus for the number of tiles is added. The
    /// placements must all lie on one line of empty squares; they are not
    /// checked against the dictionary.
    pub fn score_play(&self, axis: Axis, placements: &[Placement], edition: &Edition) -> Move {
        let mut placements = placements.to_vec();
        placements.sort_unstable_by_key(|p| match axis {
            Axis::Across => (p.col, p.row),
            Axis::Down => (p.row, p.col),
        });

        let mut words = Vec::new();
        if let Some(first) = placements.first() {
            words.extend(self.score_word(&placements, first.col, first.row, axis));
        }
        for p in &placements {
            words.extend(self.score_word(&placements, p.col, p.row, axis.perpendicular()));
        }
        let score = words
            .iter()
            .fold(edition.calculate_bonus(placements.len()), |total, w| {
                total.saturating_add(w.score)
            });
        Move {
            axis,
            placements,
            words,
            score,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.squares.chunks(self.cols.max(1)) {
            for square in row {
                let symbol = match square.tile {
                    Some(tile) if tile.is_blank => tile.letter.to_lowercase().next().unwrap_or(' '),
                    Some(tile) => tile.letter,
                    None => square.symbol(),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    fn board() -> (Board, Edition) {
        let edition = Edition::english();
        (edition.new_board().unwrap(), edition)
    }

    #[test]
    fn english_layout() {
        let (board, _) = board();
        assert_eq!((board.cols(), board.rows()), (15, 15));
        assert_eq!(board.centre(), (7, 7));
        assert_eq!(board.at(7, 7).unwrap().word_multiplier, 2);
        assert_eq!(board.at(0, 0).unwrap().word_multiplier, 3);
        assert_eq!(board.at(3, 0).unwrap().letter_multiplier, 2);
        assert_eq!(board.at(5, 1).unwrap().letter_multiplier, 3);
        assert_eq!(board.at(1, 1).unwrap().word_multiplier, 2);
        assert!(board.at(15, 0).is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn layout_errors() {
        assert_eq!(
            Board::from_layout::<&str>(&[]),
            Err(BoardError::EmptyLayout)
        );
        assert_eq!(
            Board::from_layout(&["...", ".."]),
            Err(BoardError::RaggedLayout {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            Board::from_layout(&["..x"]),
            Err(BoardError::UnknownSquare {
                symbol: 'x',
                col: 2,
                row: 0
            })
        );
    }

    #[test]
    fn stepping_along_axes() {
        let board = Board::new(3, 2);
        assert_eq!(board.prev_along(0, 1, Axis::Across), None);
        assert_eq!(board.prev_along(1, 1, Axis::Across), Some((0, 1)));
        assert_eq!(board.next_along(2, 0, Axis::Across), None);
        assert_eq!(board.next_along(2, 0, Axis::Down), Some((2, 1)));
        assert_eq!(board.next_along(2, 1, Axis::Down), None);
        assert_eq!(board.neighbours(0, 0).count(), 2);
        assert_eq!(board.neighbours(1, 1).count(), 3);
    }

    #[test]
    fn place_and_occupied() {
        let (mut board, edition) = board();
        board.place_word(7, 7, Axis::Down, "CAT", &edition).unwrap();
        assert_eq!(board.tile(7, 9).unwrap().letter, 'T');
        assert_eq!(
            board.place(7, 8, Tile::new('X', 8)),
            Err(BoardError::Occupied { col: 7, row: 8 })
        );
        assert_eq!(
            board.place(20, 8, Tile::new('X', 8)),
            Err(BoardError::OutOfBounds { col: 20, row: 8 })
        );
        // Re-writing over matching letters only adds the new ones.
        board.place_word(7, 7, Axis::Down, "CATS", &edition).unwrap();
        assert_eq!(board.tile(7, 10).unwrap().letter, 'S');
        assert_eq!(
            board.place_word(6, 7, Axis::Across, "OX", &edition),
            Err(BoardError::Occupied { col: 7, row: 7 })
        );
        assert_eq!(
            board.place_word(13, 0, Axis::Across, "CATS", &edition),
            Err(BoardError::OutOfBounds { col: 13, row: 0 })
        );
    }

    #[test]
    fn score_opening_word() {
        let (board, edition) = board();
        let placements: Vec<Placement> = "CAT"
            .chars()
            .enumerate()
            .map(|(i, letter)| Placement::new(6 + i, 7, edition.tile(letter)))
            .collect();
        let play = board.score_play(Axis::Across, &placements, &edition);
        assert_eq!(play.score, 10);
        assert_eq!(play.words.len(), 1);
        assert_eq!(play.words[0].word, "CAT");
    }

    #[test]
    fn score_with_existing_tiles_and_cross_words() {
        let (mut board, edition) = board();
        // CAT across the centre, then SH down from the end of it, hooking CATS.
        board.place_word(6, 7, Axis::Across, "CAT", &edition).unwrap();
        let placements = [
            Placement::new(9, 7, edition.tile('S')),
            Placement::new(9, 8, edition.tile('H')),
        ];
        let play = board.score_play(Axis::Down, &placements, &edition);
        let words: Vec<(&str, u32)> = play.words.iter().map(|w| (w.word.as_str(), w.score)).collect();
        // SH down: S (1) + H (4); CATS across: 3 + 1 + 1 + 1.
        assert_eq!(words, [("SH", 5), ("CATS", 6)]);
        assert_eq!(play.score, 11);
    }

    #[test]
    fn premium_squares_apply_to_new_tiles_only() {
        let edition = Edition::english();
        let mut board = edition.new_board().unwrap();
        // Q on the double-letter square (3, 0), then extend it from the right.
        board.place(3, 0, edition.tile('Q')).unwrap();
        let placements = [Placement::new(4, 0, edition.tile('I'))];
        let play = board.score_play(Axis::Across, &placements, &edition);
        assert_eq!(play.words[0].word, "QI");
        assert_eq!(play.score, 11);

        let placements = [
            Placement::new(0, 0, edition.tile('A')),
            Placement::new(1, 0, Tile::blank().assigned('X')),
            Placement::new(2, 0, edition.tile('E')),
        ];
        let play = board.score_play(Axis::Across, &placements, &edition);
        // AXEQ: (1 + 0 + 1 + 10) on a triple word.
        assert_eq!(play.words[0].word, "AXEQ");
        assert_eq!(play.score, 36);
    }

    #[test]
    fn single_letter_words_are_not_scored() {
        let board = Board::new(5, 5);
        let edition = Edition::english();
        let play = board.score_play(Axis::Across, &[Placement::new(2, 2, edition.tile('A'))], &edition);
        assert!(play.words.is_empty());
        assert_eq!(play.score, 0);
    }

    #[test]
    fn display_shows_tiles_and_premiums() {
        let edition = Edition::english();
        let mut board = Board::from_layout(&["d.M", "..T"]).unwrap();
        board.place_word(0, 1, Axis::Across, "Ab", &edition).unwrap();
        assert_eq!(board.to_string(), "d.D\nAbT\n");
    }

    #[test]
    fn load_tiles() {
        let edition = Edition::english();
        let mut board = Board::new(4, 2);
        board.load_tiles(&["C.T.", " a  "], &edition).unwrap();
        assert_eq!(board.tile(0, 0).unwrap().score, 3);
        assert!(board.tile(1, 1).unwrap().is_blank);
        assert_eq!(board.tile(1, 1).unwrap().letter, 'A');
        assert!(board.is_free(1, 0));
        assert_eq!(
            board.load_tiles(&["%"], &edition),
            Err(BoardError::UnknownLetter('%'))
        );
    }

    #[test]
    fn huge_scores_saturate() {
        let edition = Edition {
            bonuses: BTreeMap::from([(2, u32::MAX)]),
            ..Edition::english()
        };
        let board = Board::from_layout(&["Tt."]).unwrap();
        let placements = [
            Placement::new(0, 0, Tile::new('A', u32::MAX / 2)),
            Placement::new(1, 0, Tile::new('B', u32::MAX / 2)),
        ];
        let play = board.score_play(Axis::Across, &placements, &edition);
        assert_eq!(play.words[0].score, u32::MAX);
        assert_eq!(play.score, u32::MAX);
    }
}
