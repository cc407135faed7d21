use crate::logic::board::{Board, BoardCoordinate, Piece};
use crate::logic::lookup::{directions_for, DiagonalTables};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveError {
    #[error("no piece on the source square")]
    NoPieceAtSource,
    #[error("piece does not match the board")]
    PieceMismatch,
    #[error("it is not this side's turn")]
    NotYourTurn,
    #[error("destination is not a legal move for this piece")]
    IllegalDestination,
    #[error("another piece has a capture available")]
    CaptureRequired,
    #[error("the jumping piece must continue its capture sequence")]
    MustContinueJump,
    #[error("piece cannot be selected")]
    InvalidSelection,
    #[error("the game is already over")]
    GameOver,
    #[error("the game has no winner yet")]
    GameNotOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// One square diagonally.
    Adjacent,
    /// Two squares diagonally over an opposing piece.
    Jump,
}

/// What [`Board::execute_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The moved piece at its new square.
    pub piece: Piece,
    pub kind: MoveKind,
    pub captured: Option<Piece>,
    pub promoted: bool,
}

/// Classifies the displacement from `piece` to `destination` without looking
/// at occupancy. `None` means the shape is not a checkers move for this piece.
pub fn classify_move(piece: &Piece, destination: BoardCoordinate) -> Option<MoveKind> {
    #[allow(clippy::cast_possible_wrap)]
    let (dr, dc) = (
        destination.row() as isize - piece.row() as isize,
        destination.col() as isize - piece.col() as isize,
    );
    let distance = dc.abs();
    if !(1..=2).contains(&distance) {
        return None;
    }

    let direction_ok = if piece.is_king() {
        dr.abs() == distance
    } else {
        dr == piece.color().forward() * distance
    };
    if !direction_ok {
        return None;
    }

    if distance == 1 {
        Some(MoveKind::Adjacent)
    } else {
        Some(MoveKind::Jump)
    }
}

/// Full legality of a single step: the piece is on the board, the
/// destination is empty, and a jump passes over an opposing piece.
pub fn is_legal_move(board: &Board, piece: &Piece, destination: BoardCoordinate) -> bool {
    if board.get_piece(piece.coord()) != Some(*piece) || board.get_piece(destination).is_some() {
        return false;
    }

    match classify_move(piece, destination) {
        Some(MoveKind::Adjacent) => true,
        Some(MoveKind::Jump) => {
            let middle = BoardCoordinate::new(
                (piece.row() + destination.row()) / 2,
                (piece.col() + destination.col()) / 2,
            );
            middle
                .and_then(|sq| board.get_piece(sq))
                .is_some_and(|jumped| jumped.color() != piece.color())
        }
        None => false,
    }
}

/// Landing squares of the captures open to `piece`, yielded lazily.
pub fn jump_targets(board: &Board, piece: Piece) -> impl Iterator<Item = BoardCoordinate> + '_ {
    let tables = DiagonalTables::get();
    directions_for(&piece)
        .filter_map(move |dir| tables.jump(piece.coord(), dir))
        .map(|(_, landing)| landing)
        .filter(move |&landing| is_legal_move(board, &piece, landing))
}

pub fn step_targets(board: &Board, piece: Piece) -> impl Iterator<Item = BoardCoordinate> + '_ {
    let tables = DiagonalTables::get();
    directions_for(&piece)
        .filter_map(move |dir| tables.step(piece.coord(), dir))
        .filter(move |&to| is_legal_move(board, &piece, to))
}

/// Captures available to `piece` right now: up to two for a man, four for a king.
pub fn single_jumps(board: &Board, piece: &Piece) -> Vec<BoardCoordinate> {
    jump_targets(board, *piece).collect()
}

pub fn adjacent_moves(board: &Board, piece: &Piece) -> Vec<BoardCoordinate> {
    step_targets(board, *piece).collect()
}

/// Where `piece` may go this turn. Captures are mandatory: when any jump is
/// available only jumps are returned.
pub fn legal_destinations(board: &Board, piece: &Piece) -> Vec<BoardCoordinate> {
    let jumps = single_jumps(board, piece);
    if jumps.is_empty() {
        adjacent_moves(board, piece)
    } else {
        jumps
    }
}
