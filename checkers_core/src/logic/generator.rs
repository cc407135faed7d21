use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece};
use crate::logic::rules::{
    adjacent_moves, jump_targets, legal_destinations, single_jumps, step_targets,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Pieces of `color` that may be picked up this turn.
    ///
    /// If any piece of that color can capture, only the capturing pieces are
    /// returned. Otherwise every piece with an adjacent move is.
    pub fn pieces_with_moves(&self, board: &Board, color: Color) -> Vec<Piece> {
        let jumpers: Vec<Piece> = board
            .pieces(color)
            .filter(|p| !single_jumps(board, p).is_empty())
            .collect();
        if !jumpers.is_empty() {
            return jumpers;
        }

        board
            .pieces(color)
            .filter(|p| !adjacent_moves(board, p).is_empty())
            .collect()
    }

    /// Every (piece, destination) pair available to `color`, in scan order.
    pub fn generate_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut list = MoveList::new();
        self.generate_into(board, color, &mut list);
        list.into_iter().collect()
    }

    /// Appends the moves of [`Self::generate_moves`] to `moves` without
    /// allocating.
    pub fn generate_into(&self, board: &Board, color: Color, moves: &mut MoveList) {
        let start = moves.len();
        for piece in board.pieces(color) {
            for to in jump_targets(board, piece) {
                moves.push(Move::new(piece.coord(), to));
            }
        }
        if moves.len() > start {
            return;
        }

        for piece in board.pieces(color) {
            for to in step_targets(board, piece) {
                moves.push(Move::new(piece.coord(), to));
            }
        }
    }

    /// Jumps open to the piece on `from` in the middle of a capture sequence.
    pub fn continuation_moves(&self, board: &Board, from: BoardCoordinate) -> Vec<Move> {
        let mut list = MoveList::new();
        self.continuation_into(board, from, &mut list);
        list.into_iter().collect()
    }

    pub fn continuation_into(&self, board: &Board, from: BoardCoordinate, moves: &mut MoveList) {
        if let Some(piece) = board.get_piece(from) {
            for to in jump_targets(board, piece) {
                moves.push(Move::new(from, to));
            }
        }
    }

    /// Checks if `color` has at least one legal move.
    /// Returns as soon as a movable piece is found.
    pub fn has_legal_moves(&self, board: &Board, color: Color) -> bool {
        board
            .pieces(color)
            .any(|p| !legal_destinations(board, &p).is_empty())
    }
}
