//! First move on an empty board.
//!
//! Every word the rack can spell is tried at every position along one axis
//! that covers the centre square, once for each way of spelling it with the
//! rack's exact tiles and blanks. Both axes score the same on a symmetric
//! layout, so only one is searched.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::board::{Axis, Tile};
use super::config::SearchConfig;
use super::finder::SearchContext;
use super::moves::{BestMove, Placement, SearchOutcome};
use super::SearchError;

/// The axis for an opening move: the configured one, otherwise a coin flip
/// (seeded if the configuration has a seed).
pub fn opening_axis(config: &SearchConfig) -> Axis {
    if let Some(axis) = config.opening_axis() {
        return axis;
    }
    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if rng.gen_bool(0.5) {
        Axis::Across
    } else {
        Axis::Down
    }
}

/// Every way the rack can spell `word`. At each letter a matching tile is
/// tried before a blank, so the first assignment uses the most exact tiles
/// on the earliest letters.
///
/// # Errors
///
/// `RackMismatch` if the rack cannot spell the word.
pub fn tile_assignments(word: &str, rack: &[Tile]) -> Result<Vec<Vec<Tile>>, SearchError> {
    let letters: Vec<char> = word.chars().collect();
    let mut found = Vec::new();
    assign_from(
        &letters,
        &mut rack.to_vec(),
        &mut Vec::with_capacity(letters.len()),
        &mut found,
    );
    if found.is_empty() {
        return Err(SearchError::RackMismatch {
            word: word.to_string(),
            rack: rack.iter().map(Tile::rack_letter).collect(),
        });
    }
    Ok(found)
}

fn assign_from(letters: &[char], pool: &mut Vec<Tile>, tiles: &mut Vec<Tile>, found: &mut Vec<Vec<Tile>>) {
    let Some((&letter, rest)) = letters.split_first() else {
        found.push(tiles.clone());
        return;
    };
    let exact = pool.iter().position(|t| !t.is_blank && t.letter == letter);
    let blank = pool.iter().position(|t| t.is_blank);
    for index in [exact, blank].into_iter().flatten() {
        let tile = pool.remove(index);
        tiles.push(if tile.is_blank { tile.assigned(letter) } else { tile });
        assign_from(rest, pool, tiles, found);
        tiles.pop();
        pool.insert(index, tile);
    }
}

/// Finds the best opening move for `rack`.
pub fn search_opening(
    ctx: SearchContext<'_>,
    rack: &[Tile],
    config: &SearchConfig,
) -> Result<SearchOutcome, SearchError> {
    let stop = config.stop_check();
    let board = ctx.board;
    let axis = opening_axis(config);
    let letters: String = rack.iter().map(Tile::rack_letter).collect();
    let words = ctx.lexicon.find_anagrams(&letters);
    debug!("opening {axis}: {} candidate words for {letters:?}", words.len());

    let (centre_col, centre_row) = board.centre();
    let (centre, line) = match axis {
        Axis::Across => (centre_col, board.cols()),
        Axis::Down => (centre_row, board.rows()),
    };
    let mut best = BestMove::new(config.records_improvements());
    for word in words {
        stop.check()?;
        let length = word.chars().count();
        if length < 2 || length > line {
            continue;
        }
        let assignments = tile_assignments(&word, rack)?;
        for start in centre.saturating_sub(length - 1)..=centre.min(line - length) {
            for tiles in &assignments {
                let placements: Vec<Placement> = tiles
                    .iter()
                    .enumerate()
                    .map(|(i, &tile)| match axis {
                        Axis::Across => Placement::new(start + i, centre_row, tile),
                        Axis::Down => Placement::new(centre_col, start + i, tile),
                    })
                    .collect();
                best.offer(board.score_play(axis, &placements, ctx.edition));
            }
        }
    }
    Ok(best.into_outcome())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::build_lexicon;
    use crate::search::edition::Edition;

    #[test]
    fn assignments_try_exact_tiles_first() {
        let edition = Edition::english();
        let rack = edition.rack(" TAC").unwrap();
        let assignments = tile_assignments("TACT", &rack).unwrap();
        // The blank can only stand for one of the two Ts.
        assert_eq!(assignments.len(), 2);
        for tiles in &assignments {
            let letters: String = tiles.iter().map(|t| t.letter).collect();
            assert_eq!(letters, "TACT");
        }
        let blanks: Vec<Vec<bool>> = assignments
            .iter()
            .map(|tiles| tiles.iter().map(|t| t.is_blank).collect())
            .collect();
        assert_eq!(blanks[0], [false, false, false, true]);
        assert_eq!(blanks[1], [true, false, false, false]);
        assert_eq!(assignments[0][3].score, 0);
    }

    #[test]
    fn rack_mismatch() {
        let edition = Edition::english();
        let rack = edition.rack("CA").unwrap();
        assert_eq!(
            tile_assignments("CAT", &rack),
            Err(SearchError::RackMismatch {
                word: "CAT".to_string(),
                rack: "CA".to_string()
            })
        );
    }

    #[test]
    fn seeded_axis_is_stable() {
        let config = SearchConfig::new().with_seed(42);
        let axis = opening_axis(&config);
        for _ in 0..10 {
            assert_eq!(opening_axis(&config), axis);
        }
        let fixed = SearchConfig::new().with_opening_axis(Axis::Down).with_seed(42);
        assert_eq!(opening_axis(&fixed), Axis::Down);
    }

    #[test]
    fn opening_covers_centre() {
        let edition = Edition::english();
        let board = edition.new_board().unwrap();
        let lexicon = build_lexicon(["ACT", "CAT"]).unwrap();
        let rack = edition.rack("CAT").unwrap();
        for axis in Axis::ALL {
            let config = SearchConfig::new().with_opening_axis(axis);
            let ctx = SearchContext::new(&lexicon, &edition, &board);
            let best = search_opening(ctx, &rack, &config).unwrap().best.unwrap();
            assert_eq!(best.axis, axis);
            assert_eq!(best.score, 10);
            assert_eq!(best.placements.len(), 3);
            assert!(best
                .placements
                .iter()
                .any(|p| (p.col, p.row) == board.centre()));
        }
    }

    #[test]
    fn opening_prefers_premium_positions() {
        let edition = Edition::english();
        // Double letter right of a double word centre.
        let board = crate::search::board::Board::from_layout(&["..Md."]).unwrap();
        let lexicon = build_lexicon(["ZA"]).unwrap();
        let rack = edition.rack("AZ").unwrap();
        let config = SearchConfig::new()
            .with_opening_axis(Axis::Across)
            .record_improvements(true);
        let ctx = SearchContext::new(&lexicon, &edition, &board);
        let outcome = search_opening(ctx, &rack, &config).unwrap();
        let best = outcome.best.unwrap();
        // ZA at (1, 0): (10 + 1) * 2. ZA at (2, 0): (10 + 1 * 2) * 2.
        assert_eq!(best.placements[0].col, 2);
        assert_eq!(best.score, 24);
        assert_eq!(outcome.improvements.len(), 2);
    }

    #[test]
    fn blank_goes_where_it_costs_least() {
        let edition = Edition::english();
        let board = crate::search::board::Board::from_layout(&["..Md."]).unwrap();
        let lexicon = build_lexicon(["ZZ"]).unwrap();
        let rack = edition.rack("Z ").unwrap();
        let config = SearchConfig::new().with_opening_axis(Axis::Across);
        let ctx = SearchContext::new(&lexicon, &edition, &board);
        let best = search_opening(ctx, &rack, &config).unwrap().best.unwrap();
        // Blank on the centre, the real Z on the double letter: (0 + 10 * 2) * 2.
        assert_eq!(best.score, 40);
        assert_eq!(best.placements[0].col, 2);
        assert!(best.placements[0].tile.is_blank);
        assert!(!best.placements[1].tile.is_blank);
    }
}
