use crate::logic::rules::{classify_move, legal_destinations, MoveError, MoveKind, MoveOutcome};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 8;
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Rows filled by each side in the starting position.
const STARTING_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    Red,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Black => Self::Red,
            Self::Red => Self::Black,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Black => 0,
            Self::Red => 1,
        }
    }

    /// Row delta of a non-king move. Black starts at the top and moves down.
    pub const fn forward(self) -> isize {
        match self {
            Self::Black => 1,
            Self::Red => -1,
        }
    }

    /// Row on which a man of this color is crowned.
    pub const fn promotion_row(self) -> usize {
        match self {
            Self::Black => BOARD_SIZE - 1,
            Self::Red => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "Black"),
            Self::Red => write!(f, "Red"),
        }
    }
}

/// A square on the 8x8 board. Always in bounds once constructed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BoardCoordinate {
    row: usize,
    col: usize,
}

impl BoardCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn row(self) -> usize {
        self.row
    }

    pub const fn col(self) -> usize {
        self.col
    }

    pub const fn is_in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Squares pieces stand on. The top-left corner is light.
    pub const fn is_dark_square(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    #[must_use]
    pub const fn from_index(sq: usize) -> Option<Self> {
        Self::new(sq / BOARD_SIZE, sq % BOARD_SIZE)
    }

    /// The square `(dr, dc)` away, or `None` when that falls off the board.
    #[must_use]
    pub fn try_offset(self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Self::new(row, col)
    }
}

impl fmt::Display for BoardCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A checker standing on the board.
///
/// `row`/`col` mirror the grid cell holding the piece; the board keeps them
/// in sync on every relocation. Color never changes and `is_king` only ever
/// goes from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    row: usize,
    col: usize,
    color: Color,
    is_king: bool,
}

impl Piece {
    pub(crate) const fn new(coord: BoardCoordinate, color: Color, is_king: bool) -> Self {
        Self {
            row: coord.row,
            col: coord.col,
            color,
            is_king,
        }
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub const fn col(&self) -> usize {
        self.col
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn is_king(&self) -> bool {
        self.is_king
    }

    pub const fn coord(&self) -> BoardCoordinate {
        BoardCoordinate {
            row: self.row,
            col: self.col,
        }
    }

    fn relocate(&mut self, to: BoardCoordinate) {
        self.row = to.row;
        self.col = to.col;
    }

    /// Crowns the piece if it stands on its promotion row.
    /// Returns `true` only on the move that actually crowns it.
    fn try_promote(&mut self) -> bool {
        if !self.is_king && self.row == self.color.promotion_row() {
            self.is_king = true;
            return true;
        }
        false
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_king { "King" } else { "Piece" };
        write!(f, "{} {} at {}", self.color, kind, self.coord())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("empty position string")]
    Empty,
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {0} does not describe exactly 8 squares")]
    RowLength(usize),
    #[error("unknown piece character '{0}'")]
    InvalidPiece(char),
    #[error("unknown side to move '{0}'")]
    InvalidTurn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    // Index: row * 8 + col
    #[serde(with = "BigArray")]
    grid: [Option<Piece>; SQUARE_COUNT],

    // Index: color.index()
    regular_left: [u8; 2],
    kings_left: [u8; 2],
    pieces_left: [u8; 2],

    current_turn: Color,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position, Black to move.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.place_starting_pieces();
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            grid: [None; SQUARE_COUNT],
            regular_left: [0; 2],
            kings_left: [0; 2],
            pieces_left: [0; 2],
            current_turn: Color::Black,
        }
    }

    /// Resets to the opening layout: Black on the dark squares of rows 0-2,
    /// Red on rows 5-7.
    pub fn place_starting_pieces(&mut self) {
        self.clear();
        for row in 0..BOARD_SIZE {
            let color = if row < STARTING_ROWS {
                Color::Black
            } else if row >= BOARD_SIZE - STARTING_ROWS {
                Color::Red
            } else {
                continue;
            };
            for col in 0..BOARD_SIZE {
                if let Some(coord) = BoardCoordinate::new(row, col) {
                    if coord.is_dark_square() {
                        self.add_piece(coord, color, false);
                    }
                }
            }
        }
        self.current_turn = Color::Black;
    }

    pub fn clear(&mut self) {
        self.grid = [None; SQUARE_COUNT];
        self.regular_left = [0; 2];
        self.kings_left = [0; 2];
        self.pieces_left = [0; 2];
    }

    /// Puts a piece on `coord`, replacing whatever stood there.
    pub fn add_piece(&mut self, coord: BoardCoordinate, color: Color, is_king: bool) -> Piece {
        self.remove_piece(coord);
        let piece = Piece::new(coord, color, is_king);
        self.grid[coord.index()] = Some(piece);
        if is_king {
            self.kings_left[color.index()] += 1;
        } else {
            self.regular_left[color.index()] += 1;
        }
        self.recount();
        piece
    }

    pub fn remove_piece(&mut self, coord: BoardCoordinate) -> Option<Piece> {
        let piece = self.grid[coord.index()].take()?;
        let side = piece.color.index();
        if piece.is_king {
            self.kings_left[side] -= 1;
        } else {
            self.regular_left[side] -= 1;
        }
        self.recount();
        Some(piece)
    }

    fn recount(&mut self) {
        for side in 0..2 {
            self.pieces_left[side] = self.regular_left[side] + self.kings_left[side];
        }
    }

    #[must_use]
    pub const fn get_piece(&self, coord: BoardCoordinate) -> Option<Piece> {
        self.grid[coord.index()]
    }

    /// Every piece of `color`, scanned row by row from the top.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.grid
            .iter()
            .flatten()
            .copied()
            .filter(move |p| p.color == color)
    }

    pub const fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn set_current_turn(&mut self, turn: Color) {
        self.current_turn = turn;
    }

    pub const fn regular_left(&self, color: Color) -> u8 {
        self.regular_left[color.index()]
    }

    pub const fn kings_left(&self, color: Color) -> u8 {
        self.kings_left[color.index()]
    }

    pub const fn pieces_left(&self, color: Color) -> u8 {
        self.pieces_left[color.index()]
    }

    /// Ends the current side's turn. Does not check that the turn is really over.
    pub fn switch_player(&mut self) {
        self.current_turn = self.current_turn.opposite();
    }

    pub const fn is_game_over(&self) -> bool {
        self.pieces_left(Color::Black) == 0 || self.pieces_left(Color::Red) == 0
    }

    /// The side that still has pieces. Only defined once the game is over.
    pub const fn winner(&self) -> Result<Color, MoveError> {
        if self.pieces_left(Color::Red) == 0 {
            Ok(Color::Black)
        } else if self.pieces_left(Color::Black) == 0 {
            Ok(Color::Red)
        } else {
            Err(MoveError::GameNotOver)
        }
    }

    /// Moves `piece` to `destination` if that is one of its legal destinations.
    ///
    /// A jump removes the jumped piece. Reaching the far row crowns a man.
    /// On error nothing is mutated. Continuing a multi-jump and ending the
    /// turn are left to the caller.
    pub fn execute_move(
        &mut self,
        piece: &Piece,
        destination: BoardCoordinate,
    ) -> Result<MoveOutcome, MoveError> {
        let from = piece.coord();
        match self.get_piece(from) {
            None => return Err(MoveError::NoPieceAtSource),
            Some(on_board) if on_board != *piece => return Err(MoveError::PieceMismatch),
            Some(_) => {}
        }

        if !legal_destinations(self, piece).contains(&destination) {
            return Err(MoveError::IllegalDestination);
        }
        let kind = classify_move(piece, destination).ok_or(MoveError::IllegalDestination)?;

        let mut captured = None;
        if kind == MoveKind::Jump {
            let middle = BoardCoordinate {
                row: (from.row + destination.row) / 2,
                col: (from.col + destination.col) / 2,
            };
            if let Some(jumped) = self.grid[middle.index()].take() {
                let side = jumped.color.index();
                if jumped.is_king {
                    self.kings_left[side] -= 1;
                } else {
                    self.regular_left[side] -= 1;
                }
                self.pieces_left[side] -= 1;
                captured = Some(jumped);
            }
        }

        let mut moved = *piece;
        self.grid[from.index()] = None;
        moved.relocate(destination);
        let promoted = moved.try_promote();
        self.grid[destination.index()] = Some(moved);

        if promoted {
            let side = moved.color.index();
            self.regular_left[side] -= 1;
            self.kings_left[side] += 1;
        }
        self.recount();

        Ok(MoveOutcome {
            piece: moved,
            kind,
            captured,
            promoted,
        })
    }

    pub fn to_fen_string(&self) -> String {
        let mut fen = String::new();
        for row in 0..BOARD_SIZE {
            let mut empty_count = 0;
            for col in 0..BOARD_SIZE {
                match self.grid[row * BOARD_SIZE + col] {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece_char(&piece));
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row + 1 < BOARD_SIZE {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.current_turn {
            Color::Black => 'b',
            Color::Red => 'r',
        });
        fen
    }

    /// Parses the notation written by [`Board::to_fen_string`]. A missing
    /// side-to-move field means Black.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().ok_or(FenError::Empty)?;
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(FenError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, text) in rows.iter().enumerate() {
            let mut col = 0;
            for ch in text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let (color, is_king) = match ch {
                    'b' => (Color::Black, false),
                    'B' => (Color::Black, true),
                    'r' => (Color::Red, false),
                    'R' => (Color::Red, true),
                    other => return Err(FenError::InvalidPiece(other)),
                };
                let coord = BoardCoordinate::new(row, col).ok_or(FenError::RowLength(row))?;
                board.add_piece(coord, color, is_king);
                col += 1;
            }
            if col != BOARD_SIZE {
                return Err(FenError::RowLength(row));
            }
        }

        board.current_turn = match parts.next() {
            None | Some("b") => Color::Black,
            Some("r") => Color::Red,
            Some(other) => return Err(FenError::InvalidTurn(other.to_string())),
        };
        Ok(board)
    }
}

const fn piece_char(piece: &Piece) -> char {
    match (piece.color, piece.is_king) {
        (Color::Black, false) => 'b',
        (Color::Black, true) => 'B',
        (Color::Red, false) => 'r',
        (Color::Red, true) => 'R',
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = self.grid[row * BOARD_SIZE + col].map_or('.', |p| piece_char(&p));
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
