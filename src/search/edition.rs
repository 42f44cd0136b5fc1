//! Letter values, tile distribution and board layout of a game edition.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use hashbrown::HashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, BoardError, Tile};

/// Errors raised while loading an edition.
#[derive(Debug, Error)]
pub enum EditionError {
    /// The JSON could not be parsed.
    #[error("invalid edition: {0}")]
    Json(#[from] serde_json::Error),
    /// The file could not be read.
    #[error("reading edition: {0}")]
    Io(#[from] std::io::Error),
    /// The layout does not describe a valid board.
    #[error("invalid edition layout: {0}")]
    Board(#[from] BoardError),
    /// The bag lists a letter twice.
    #[error("letter {0:?} appears twice in the bag")]
    DuplicateLetter(char),
    /// A rack names a letter outside the edition.
    #[error("letter {0:?} is not part of the edition")]
    UnknownLetter(char),
}

/// Score and frequency of one letter. The blank is written as `" "`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSpec {
    /// The letter.
    pub letter: char,
    /// Points per tile.
    pub score: u32,
    /// Tiles in a full bag.
    pub count: u32,
}

fn default_rack_count() -> usize {
    7
}

/// A game edition.
///
/// # Examples
///
/// ```
/// use dawgplay::search::edition::Edition;
///
/// let json = r#"{
///     "name": "tiny",
///     "layout": ["d.D", ".M.", "D.d"],
///     "bag": [
///         {"letter": "A", "score": 1, "count": 4},
///         {"letter": "B", "score": 3, "count": 2},
///         {"letter": " ", "score": 0, "count": 1}
///     ],
///     "bonuses": {"3": 20},
///     "rack_count": 3
/// }"#;
/// let edition = Edition::from_json(json).unwrap();
/// assert_eq!(edition.alphabet(), ['A', 'B']);
/// assert_eq!(edition.letter_value('B'), Some(3));
/// assert_eq!(edition.calculate_bonus(3), 20);
/// assert_eq!(edition.new_board().unwrap().centre(), (1, 1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    /// Display name.
    pub name: String,
    /// Board layout rows, see [`Board::from_layout`].
    pub layout: Vec<String>,
    /// Every letter with its score and count.
    pub bag: Vec<LetterSpec>,
    /// Extra points by number of tiles played in one move.
    #[serde(default)]
    pub bonuses: BTreeMap<usize, u32>,
    /// Tiles on a full rack.
    #[serde(default = "default_rack_count")]
    pub rack_count: usize,
}

impl Edition {
    /// Parses and validates an edition from JSON.
    pub fn from_json(json: &str) -> Result<Self, EditionError> {
        let edition: Edition = serde_json::from_str(json)?;
        edition.validate()?;
        Ok(edition)
    }

    /// Loads an edition from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EditionError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Serializes the edition as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EditionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), EditionError> {
        Board::from_layout(&self.layout)?;
        let mut seen = HashSet::new();
        for spec in &self.bag {
            if !seen.insert(spec.letter) {
                return Err(EditionError::DuplicateLetter(spec.letter));
            }
        }
        Ok(())
    }

    /// Playable letters, blank excluded, in ascending order.
    pub fn alphabet(&self) -> Vec<char> {
        self.bag
            .iter()
            .map(|spec| spec.letter)
            .filter(|&letter| letter != ' ')
            .sorted()
            .dedup()
            .collect()
    }

    /// Points for one tile of `letter`, or `None` if the edition lacks it.
    pub fn letter_value(&self, letter: char) -> Option<u32> {
        self.bag
            .iter()
            .find(|spec| spec.letter == letter)
            .map(|spec| spec.score)
    }

    /// Extra points for playing `tiles_played` tiles in one move.
    pub fn calculate_bonus(&self, tiles_played: usize) -> u32 {
        self.bonuses.get(&tiles_played).copied().unwrap_or(0)
    }

    /// An empty board with this edition's layout.
    pub fn new_board(&self) -> Result<Board, BoardError> {
        Board::from_layout(&self.layout)
    }

    /// A rack tile in rack notation: a space is a blank, anything else a
    /// letter scored by this edition (0 if unknown).
    pub fn tile(&self, letter: char) -> Tile {
        if letter == ' ' {
            Tile::blank()
        } else {
            Tile::new(letter, self.letter_value(letter).unwrap_or(0))
        }
    }

    /// A tile in board notation: upper case is a regular tile, lower case a
    /// blank standing for the upper-case letter.
    pub fn board_tile(&self, symbol: char) -> Result<Tile, BoardError> {
        if symbol.is_lowercase() {
            let letter = symbol.to_uppercase().next().unwrap_or(symbol);
            if self.letter_value(letter).is_none() {
                return Err(BoardError::UnknownLetter(symbol));
            }
            return Ok(Tile::blank().assigned(letter));
        }
        let score = self
            .letter_value(symbol)
            .filter(|_| symbol != ' ')
            .ok_or(BoardError::UnknownLetter(symbol))?;
        Ok(Tile::new(symbol, score))
    }

    /// Builds a rack from rack notation, where a space is a blank.
    pub fn rack(&self, letters: &str) -> Result<Vec<Tile>, EditionError> {
        letters
            .chars()
            .map(|letter| {
                if letter != ' ' && self.letter_value(letter).is_none() {
                    return Err(EditionError::UnknownLetter(letter));
                }
                Ok(self.tile(letter))
            })
            .collect()
    }

    /// The built-in English edition: 15x15 board, 100 tiles, 50 points for
    /// playing a full rack.
    pub fn english() -> Self {
        const LAYOUT: [&str; 15] = [
            "T..d...T...d..T",
            ".D...t...t...D.",
            "..D...d.d...D..",
            "d..D...d...D..d",
            "....D.....D....",
            ".t...t...t...t.",
            "..d...d.d...d..",
            "T..d...M...d..T",
            "..d...d.d...d..",
            ".t...t...t...t.",
            "....D.....D....",
            "d..D...d...D..d",
            "..D...d.d...D..",
            ".D...t...t...D.",
            "T..d...T...d..T",
        ];
        const BAG: [(char, u32, u32); 27] = [
            ('A', 1, 9),
            ('B', 3, 2),
            ('C', 3, 2),
            ('D', 2, 4),
            ('E', 1, 12),
            ('F', 4, 2),
            ('G', 2, 3),
            ('H', 4, 2),
            ('I', 1, 9),
            ('J', 8, 1),
            ('K', 5, 1),
            ('L', 1, 4),
            ('M', 3, 2),
            ('N', 1, 6),
            ('O', 1, 8),
            ('P', 3, 2),
            ('Q', 10, 1),
            ('R', 1, 6),
            ('S', 1, 4),
            ('T', 1, 6),
            ('U', 1, 4),
            ('V', 4, 2),
            ('W', 4, 2),
            ('X', 8, 1),
            ('Y', 4, 2),
            ('Z', 10, 1),
            (' ', 0, 2),
        ];
        Edition {
            name: "English".to_string(),
            layout: LAYOUT.iter().map(|row| row.to_string()).collect(),
            bag: BAG
                .iter()
                .map(|&(letter, score, count)| LetterSpec {
                    letter,
                    score,
                    count,
                })
                .collect(),
            bonuses: BTreeMap::from([(7, 50)]),
            rack_count: 7,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn english_bag() {
        let edition = Edition::english();
        let tiles: u32 = edition.bag.iter().map(|spec| spec.count).sum();
        assert_eq!(tiles, 100);
        assert_eq!(edition.alphabet().len(), 26);
        assert_eq!(edition.letter_value('Q'), Some(10));
        assert_eq!(edition.letter_value(' '), Some(0));
        assert_eq!(edition.letter_value('?'), None);
        assert_eq!(edition.calculate_bonus(7), 50);
        assert_eq!(edition.calculate_bonus(6), 0);
    }

    #[test]
    fn json_round_trip() {
        let edition = Edition::english();
        let json = edition.to_json().unwrap();
        assert_eq!(Edition::from_json(&json).unwrap(), edition);
    }

    #[test]
    fn defaults_and_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "mini", "layout": ["..", ".."], "bag": [{{"letter": "A", "score": 1, "count": 2}}]}}"#
        )
        .unwrap();
        let edition = Edition::from_file(file.path()).unwrap();
        assert_eq!(edition.rack_count, 7);
        assert!(edition.bonuses.is_empty());
        assert_eq!(edition.calculate_bonus(7), 0);
    }

    #[test]
    fn invalid_editions() {
        let ragged = r#"{"name": "x", "layout": ["..", "."], "bag": []}"#;
        assert!(matches!(
            Edition::from_json(ragged),
            Err(EditionError::Board(BoardError::RaggedLayout { .. }))
        ));
        let duplicate = r#"{"name": "x", "layout": ["."], "bag": [
            {"letter": "A", "score": 1, "count": 1},
            {"letter": "A", "score": 2, "count": 1}]}"#;
        assert!(matches!(
            Edition::from_json(duplicate),
            Err(EditionError::DuplicateLetter('A'))
        ));
        assert!(matches!(
            Edition::from_json("{"),
            Err(EditionError::Json(_))
        ));
    }

    #[test]
    fn tiles_and_racks() {
        let edition = Edition::english();
        assert_eq!(edition.tile('K'), Tile::new('K', 5));
        assert_eq!(edition.tile(' '), Tile::blank());
        assert_eq!(edition.board_tile('k').unwrap(), Tile::blank().assigned('K'));
        assert_eq!(edition.board_tile(' '), Err(BoardError::UnknownLetter(' ')));
        let rack = edition.rack("QI ").unwrap();
        assert_eq!(rack.len(), 3);
        assert!(rack[2].is_blank);
        assert!(matches!(
            edition.rack("Q1"),
            Err(EditionError::UnknownLetter('1'))
        ));
    }
}
