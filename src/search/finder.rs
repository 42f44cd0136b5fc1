//! Move generation from anchors.
//!
//! For every anchor square and axis the search starts at each graph node
//! carrying the anchor's letter and walks backwards through `pre` edges
//! towards a possible word start, placing rack tiles on empty squares. From
//! every node that may start a word it turns around and walks forwards from
//! the anchor through `post` edges, reporting each complete word. Tiles are
//! only placed where the cross-check table allows them, so every reported
//! move also forms valid perpendicular words.
//!
//! Plays that touch existing tiles only through a perpendicular word (a tile
//! placed beside an anchor) are found by seeding the same walk from the empty
//! squares next to each anchor.

use log::debug;

use super::anchor::find_anchors;
use super::board::{Axis, Board, Tile};
use super::config::{SearchConfig, StopCheck};
use super::cross_check::{available_letters, CrossChecks};
use super::edition::Edition;
use super::moves::{BestMove, Placement, SearchOutcome};
use super::SearchError;
use crate::dawg::Lexicon;

/// The read-only inputs of a search.
#[derive(Clone, Copy, Debug)]
pub struct SearchContext<'a> {
    /// Dictionary graph.
    pub lexicon: &'a Lexicon,
    /// Letter values and bonuses.
    pub edition: &'a Edition,
    /// Board snapshot.
    pub board: &'a Board,
}

impl<'a> SearchContext<'a> {
    /// Bundles the inputs of a search.
    pub fn new(lexicon: &'a Lexicon, edition: &'a Edition, board: &'a Board) -> Self {
        SearchContext {
            lexicon,
            edition,
            board,
        }
    }
}

/// Where the forward walk starts once the backward walk found a word start.
#[derive(Clone, Copy, Debug)]
struct Seed {
    col: usize,
    row: usize,
    node: usize,
}

/// State of one search over a non-empty board: the cross-check table, the
/// remaining rack and the tiles placed so far.
pub struct MoveSearch<'a> {
    ctx: SearchContext<'a>,
    cross_checks: CrossChecks,
    rack: Vec<Tile>,
    placed: Vec<Placement>,
    best: BestMove,
    stop: StopCheck,
}

impl<'a> MoveSearch<'a> {
    /// Prepares a search; `alphabet` is what a blank may stand for.
    pub fn new(ctx: SearchContext<'a>, rack: &[Tile], alphabet: &[char], config: &SearchConfig) -> Self {
        let available = available_letters(rack, alphabet);
        let cross_checks = CrossChecks::build(ctx.board, ctx.lexicon, &available);
        MoveSearch {
            ctx,
            cross_checks,
            rack: rack.to_vec(),
            placed: Vec::with_capacity(rack.len()),
            best: BestMove::new(config.records_improvements()),
            stop: config.stop_check(),
        }
    }

    /// Runs the search to completion.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the time limit passed or the cancel flag was raised.
    pub fn run(mut self) -> Result<SearchOutcome, SearchError> {
        let board = self.ctx.board;
        let lexicon = self.ctx.lexicon;
        let anchors = find_anchors(board);
        debug!("searching {} anchors with rack of {}", anchors.len(), self.rack.len());

        for (col, row) in anchors {
            let Some(tile) = board.tile(col, row) else {
                continue;
            };
            for axis in Axis::ALL {
                for &node in lexicon.sequence_roots(tile.letter) {
                    self.back(col, row, axis, node, 1, Seed { col, row, node })?;
                }
                self.hook_seeds(col, row, axis)?;
            }
        }
        Ok(self.best.into_outcome())
    }

    /// Starts walks from the empty squares beside an anchor, across `axis`.
    fn hook_seeds(&mut self, col: usize, row: usize, axis: Axis) -> Result<(), SearchError> {
        let board = self.ctx.board;
        let lexicon = self.ctx.lexicon;
        let cross = axis.perpendicular();
        let hooks = [board.prev_along(col, row, cross), board.next_along(col, row, cross)];
        for (hc, hr) in hooks.into_iter().flatten() {
            if !board.is_free(hc, hr) {
                continue;
            }
            let letters = self.cross_checks.get(hc, hr, axis).to_vec();
            for letter in letters {
                for &node in lexicon.sequence_roots(letter) {
                    let seed = Seed {
                        col: hc,
                        row: hr,
                        node,
                    };
                    self.with_tile(hc, hr, letter, |s| s.back(hc, hr, axis, node, 1, seed))?;
                }
            }
        }
        Ok(())
    }

    /// True if `square` is off the board or neither holds nor has been given a tile.
    fn is_open(&self, square: Option<(usize, usize)>) -> bool {
        square.map_or(true, |(col, row)| {
            self.ctx.board.is_free(col, row)
                && !self.placed.iter().any(|p| p.col == col && p.row == row)
        })
    }

    /// Extends towards the start of the word; `node` is the letter at `(col, row)`.
    fn back(
        &mut self,
        col: usize,
        row: usize,
        axis: Axis,
        node: usize,
        length: usize,
        seed: Seed,
    ) -> Result<(), SearchError> {
        self.stop.check()?;
        let board = self.ctx.board;
        let lexicon = self.ctx.lexicon;
        let prev = board.prev_along(col, row, axis);

        if lexicon.node(node).starts_word() && self.is_open(prev) {
            self.forward(seed.col, seed.row, axis, seed.node, length)?;
        }

        let Some((pc, pr)) = prev else {
            return Ok(());
        };
        match board.tile(pc, pr) {
            Some(tile) => {
                for parent in lexicon.node(node).parents(tile.letter) {
                    self.back(pc, pr, axis, parent, length + 1, seed)?;
                }
            }
            None => {
                for &(letter, parent) in lexicon.node(node).pre() {
                    if self.cross_checks.allows(pc, pr, axis, letter) {
                        self.with_tile(pc, pr, letter, |s| {
                            s.back(pc, pr, axis, parent, length + 1, seed)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Extends towards the end of the word, reporting every complete one.
    fn forward(
        &mut self,
        col: usize,
        row: usize,
        axis: Axis,
        node: usize,
        length: usize,
    ) -> Result<(), SearchError> {
        self.stop.check()?;
        let board = self.ctx.board;
        let lexicon = self.ctx.lexicon;
        let next = board.next_along(col, row, axis);

        if lexicon.node(node).is_end_of_word()
            && length >= 2
            && !self.placed.is_empty()
            && self.is_open(next)
        {
            self.report(axis);
        }

        let Some((nc, nr)) = next else {
            return Ok(());
        };
        match board.tile(nc, nr) {
            Some(tile) => {
                if let Some(child) = lexicon.node(node).child(tile.letter) {
                    self.forward(nc, nr, axis, child, length + 1)?;
                }
            }
            None => {
                for &(letter, child) in lexicon.node(node).post() {
                    if self.cross_checks.allows(nc, nr, axis, letter) {
                        self.with_tile(nc, nr, letter, |s| {
                            s.forward(nc, nr, axis, child, length + 1)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs `f` with `letter` placed at `(col, row)`, once with a matching
    /// rack tile and once with a blank, as far as the rack has them.
    fn with_tile<F>(&mut self, col: usize, row: usize, letter: char, mut f: F) -> Result<(), SearchError>
    where
        F: FnMut(&mut Self) -> Result<(), SearchError>,
    {
        let exact = self
            .rack
            .iter()
            .position(|t| !t.is_blank && t.letter == letter);
        let blank = self.rack.iter().position(|t| t.is_blank);
        for index in [exact, blank].into_iter().flatten() {
            let tile = self.rack.remove(index);
            let played = if tile.is_blank {
                tile.assigned(letter)
            } else {
                tile
            };
            self.placed.push(Placement::new(col, row, played));
            let result = f(self);
            self.placed.pop();
            self.rack.insert(index, tile);
            result?;
        }
        Ok(())
    }

    fn report(&mut self, axis: Axis) {
        let candidate = self
            .ctx
            .board
            .score_play(axis, &self.placed, self.ctx.edition);
        self.best.offer(candidate);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::build_lexicon;

    fn search(words: &[&str], board: &Board, rack: &str) -> SearchOutcome {
        let edition = Edition::english();
        let lexicon = build_lexicon(words).unwrap();
        let rack = edition.rack(rack).unwrap();
        let ctx = SearchContext::new(&lexicon, &edition, board);
        MoveSearch::new(ctx, &rack, &edition.alphabet(), &SearchConfig::new())
            .run()
            .unwrap()
    }

    #[test]
    fn extends_existing_word() {
        let edition = Edition::english();
        let mut board = edition.new_board().unwrap();
        board.place_word(6, 7, Axis::Across, "CAT", &edition).unwrap();
        let outcome = search(&["AT", "CAT", "CATS", "TA"], &board, "S");
        let best = outcome.best.unwrap();
        assert_eq!(best.main_word(), Some("CATS"));
        assert_eq!(best.placements, [Placement::new(9, 7, edition.tile('S'))]);
        assert_eq!(best.score, 6);
    }

    #[test]
    fn finds_parallel_play() {
        let edition = Edition::english();
        let mut board = Board::new(5, 5);
        board.place(2, 2, edition.tile('A')).unwrap();
        let outcome = search(&["AT", "TA"], &board, "TA");
        let best = outcome.best.unwrap();
        // Two letters next to the A: the main word and one cross word, 2 + 2.
        assert_eq!(best.score, 4);
        assert_eq!(best.words.len(), 2);
        assert!(best.placements.iter().all(|p| board.is_free(p.col, p.row)));
    }

    #[test]
    fn builds_through_tiles_in_the_middle() {
        let edition = Edition::english();
        let mut board = Board::new(7, 1);
        board.place(3, 0, edition.tile('R')).unwrap();
        let outcome = search(&["ARE", "CARE", "CARES", "RE"], &board, "CAES");
        let best = outcome.best.unwrap();
        assert_eq!(best.main_word(), Some("CARES"));
        // C3 A1 R1 E1 S1
        assert_eq!(best.score, 7);
        assert_eq!(best.placements.len(), 4);
    }

    #[test]
    fn blank_scores_nothing_but_completes_the_word() {
        let edition = Edition::english();
        let mut board = Board::new(5, 1);
        board.place(0, 0, edition.tile('Q')).unwrap();
        let outcome = search(&["QI"], &board, " ");
        let best = outcome.best.unwrap();
        assert_eq!(best.score, 10);
        assert!(best.placements[0].tile.is_blank);
        assert_eq!(best.placements[0].tile.letter, 'I');
    }

    #[test]
    fn exact_tile_preferred_on_ties_and_both_tried() {
        let edition = Edition::english();
        // Double letter square at (1, 0), so the exact Z is worth far more than a blank.
        let mut board = Board::from_layout(&[".d.."]).unwrap();
        board.place(0, 0, edition.tile('A')).unwrap();
        let outcome = search(&["AZ"], &board, " Z");
        let best = outcome.best.unwrap();
        assert_eq!(best.score, 21);
        assert!(!best.placements[0].tile.is_blank);
    }

    #[test]
    fn no_move_is_not_an_error() {
        let edition = Edition::english();
        let mut board = Board::new(5, 5);
        board.place(2, 2, edition.tile('Q')).unwrap();
        let outcome = search(&["AT"], &board, "XYZ");
        assert_eq!(outcome.best, None);
    }

    #[test]
    fn rack_is_restored_between_candidates() {
        let edition = Edition::english();
        let mut board = Board::new(6, 1);
        board.place(0, 0, edition.tile('B')).unwrap();
        let outcome = search(&["BA", "BAA", "BAAA"], &board, "AA");
        let best = outcome.best.unwrap();
        assert_eq!(best.main_word(), Some("BAA"));
        assert_eq!(best.placements.len(), 2);
    }
}
