/// Anchor squares.
pub mod anchor;
/// Board geometry, tiles and scoring.
pub mod board;
/// Search options.
pub mod config;
/// Cross-check table.
pub mod cross_check;
/// Game editions: letter values, bag and layout.
pub mod edition;
/// Back/forward move generation.
pub mod finder;
/// Moves and search results.
pub mod moves;
/// Anagram search for the first move.
pub mod opening;

use log::debug;
use thiserror::Error;

use crate::dawg::Lexicon;

pub use board::{Axis, Board, BoardError, Square, Tile};
pub use config::SearchConfig;
pub use edition::{Edition, EditionError, LetterSpec};
pub use finder::{MoveSearch, SearchContext};
pub use moves::{Move, Placement, SearchOutcome, WordScore};

/// Errors that can end a search.
///
/// Not finding a move is not an error; it is reported as
/// [`SearchOutcome::best`] being `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The dictionary holds no words.
    #[error("no dictionary loaded")]
    EmptyLexicon,
    /// The edition defines no letters.
    #[error("edition has no letters")]
    EmptyAlphabet,
    /// The rack cannot spell a word the anagram search produced.
    #[error("rack {rack:?} cannot spell {word:?}")]
    RackMismatch {
        /// The word.
        word: String,
        /// The rack, blanks as spaces.
        rack: String,
    },
    /// The time limit passed or the cancel flag was raised.
    #[error("search cancelled")]
    Cancelled,
}

/// Finds the highest scoring play of `rack` on `board`.
///
/// An empty board gets an opening move across the centre square; otherwise
/// every play connected to the existing tiles is considered. Only a strictly
/// higher score replaces the best move found so far, so among equal scores
/// the first one found wins.
///
/// # Errors
///
/// `EmptyLexicon` or `EmptyAlphabet` if the inputs are not loaded, and
/// `Cancelled` if the configured limit is hit; a cancelled search returns no
/// partial result.
///
/// # Examples
///
/// ```
/// use dawgplay::dawg::build_lexicon;
/// use dawgplay::search::{find_best_move, Axis, Edition, SearchConfig};
///
/// let lexicon = build_lexicon(["ACT", "CAT"]).unwrap();
/// let edition = Edition::english();
/// let board = edition.new_board().unwrap();
/// let rack = edition.rack("TAC").unwrap();
/// let config = SearchConfig::new().with_opening_axis(Axis::Across);
///
/// let best = find_best_move(&lexicon, &edition, &board, &rack, &config)
///     .unwrap()
///     .best
///     .unwrap();
/// assert_eq!(best.score, 10);
/// ```
pub fn find_best_move(
    lexicon: &Lexicon,
    edition: &Edition,
    board: &Board,
    rack: &[Tile],
    config: &SearchConfig,
) -> Result<SearchOutcome, SearchError> {
    if lexicon.is_empty() {
        return Err(SearchError::EmptyLexicon);
    }
    let alphabet = edition.alphabet();
    if alphabet.is_empty() {
        return Err(SearchError::EmptyAlphabet);
    }

    let ctx = SearchContext::new(lexicon, edition, board);
    let outcome = if board.is_empty() {
        opening::search_opening(ctx, rack, config)?
    } else {
        MoveSearch::new(ctx, rack, &alphabet, config).run()?
    };
    match &outcome.best {
        Some(best) => debug!("best move: {best}"),
        None => debug!("no move for rack of {}", rack.len()),
    }
    Ok(outcome)
}
