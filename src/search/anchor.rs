use super::board::Board;

/// Squares a new word can grow from: occupied squares with at least one
/// empty neighbour, in row-major order. An empty board has the centre as its
/// only anchor.
pub fn find_anchors(board: &Board) -> Vec<(usize, usize)> {
    if board.is_empty() {
        return vec![board.centre()];
    }
    let mut anchors = Vec::new();
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            if board.tile(col, row).is_some()
                && board.neighbours(col, row).any(|(c, r)| board.is_free(c, r))
            {
                anchors.push((col, row));
            }
        }
    }
    anchors
}
