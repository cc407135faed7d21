use crate::engine::Move;
use crate::logic::board::{Board, BoardCoordinate, Color, Piece};
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{legal_destinations, single_jumps, MoveError, MoveKind, MoveOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(Color), // Winner
}

/// Where the side to move is within its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    AwaitingSelection,
    PieceSelected(BoardCoordinate),
    /// The piece on this square has just captured and can capture again.
    /// Only jumps with this piece are accepted until it runs out of captures.
    MidJumpSequence(BoardCoordinate),
}

/// A game in progress: the board plus the interaction state a front end
/// drives it through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub status: GameStatus,
    pub last_move: Option<(BoardCoordinate, BoardCoordinate)>,
    turn_state: TurnState,
    valid_moves: Vec<BoardCoordinate>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// Starts from an arbitrary position. The side to move is the board's.
    #[must_use]
    pub fn from_board(board: Board) -> Self {
        let mut game = Self {
            board,
            status: GameStatus::Playing,
            last_move: None,
            turn_state: TurnState::AwaitingSelection,
            valid_moves: Vec::new(),
        };
        game.update_status();
        game
    }

    pub const fn turn(&self) -> Color {
        self.board.current_turn()
    }

    pub const fn turn_state(&self) -> TurnState {
        self.turn_state
    }

    /// The piece still capturing, if the turn is in a multi-jump.
    pub const fn jumping_piece(&self) -> Option<BoardCoordinate> {
        match self.turn_state {
            TurnState::MidJumpSequence(coord) => Some(coord),
            _ => None,
        }
    }

    pub fn selected_piece(&self) -> Option<Piece> {
        match self.turn_state {
            TurnState::PieceSelected(coord) | TurnState::MidJumpSequence(coord) => {
                self.board.get_piece(coord)
            }
            TurnState::AwaitingSelection => None,
        }
    }

    /// Destinations of the selected piece, for highlighting.
    pub fn valid_moves(&self) -> &[BoardCoordinate] {
        &self.valid_moves
    }

    pub fn reset_valid_moves(&mut self) {
        self.valid_moves.clear();
    }

    /// Selects the piece on `coord` for the side to move.
    ///
    /// Fails with [`MoveError::InvalidSelection`] on an empty square, an
    /// opponent's piece, or a piece that cannot move this turn (including one
    /// passed over because another piece must capture). During a multi-jump
    /// only the jumping piece can be selected.
    pub fn select_piece(&mut self, coord: BoardCoordinate) -> Result<(), MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }
        if let Some(jumping) = self.jumping_piece() {
            if coord != jumping {
                return Err(MoveError::MustContinueJump);
            }
            if let Some(piece) = self.board.get_piece(coord) {
                self.valid_moves = single_jumps(&self.board, &piece);
            }
            return Ok(());
        }

        let piece = self
            .board
            .get_piece(coord)
            .ok_or(MoveError::InvalidSelection)?;
        if piece.color() != self.turn() {
            return Err(MoveError::InvalidSelection);
        }
        let movable = MoveGenerator::new().pieces_with_moves(&self.board, self.turn());
        if !movable.contains(&piece) {
            return Err(MoveError::InvalidSelection);
        }

        self.turn_state = TurnState::PieceSelected(coord);
        self.valid_moves = legal_destinations(&self.board, &piece);
        Ok(())
    }

    /// Every move the side to move may play right now, honouring mandatory
    /// capture and an unfinished multi-jump.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        let generator = MoveGenerator::new();
        match self.jumping_piece() {
            Some(coord) => generator.continuation_moves(&self.board, coord),
            None => generator.generate_moves(&self.board, self.turn()),
        }
    }

    /// Plays one step for the side to move.
    ///
    /// After a capture, if the same piece can capture again the turn stays
    /// open in [`TurnState::MidJumpSequence`]. Otherwise the turn passes and
    /// the game status is updated.
    pub fn make_move(
        &mut self,
        from: BoardCoordinate,
        to: BoardCoordinate,
    ) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }

        let piece = self
            .board
            .get_piece(from)
            .ok_or(MoveError::NoPieceAtSource)?;
        if piece.color() != self.turn() {
            return Err(MoveError::NotYourTurn);
        }

        match self.jumping_piece() {
            Some(jumping) if jumping != from => return Err(MoveError::MustContinueJump),
            Some(_) => {}
            None => {
                let movable = MoveGenerator::new().pieces_with_moves(&self.board, self.turn());
                if !movable.contains(&piece) {
                    let must_capture = movable
                        .first()
                        .is_some_and(|p| !single_jumps(&self.board, p).is_empty());
                    return Err(if must_capture {
                        MoveError::CaptureRequired
                    } else {
                        MoveError::IllegalDestination
                    });
                }
            }
        }

        let outcome = self.board.execute_move(&piece, to).inspect_err(|e| {
            log::warn!("rejected move {from} -> {to} for {piece}: {e}");
        })?;
        self.last_move = Some((from, to));

        if outcome.kind == MoveKind::Jump {
            let further = single_jumps(&self.board, &outcome.piece);
            if !further.is_empty() {
                log::debug!("{} continues capturing", outcome.piece);
                self.turn_state = TurnState::MidJumpSequence(outcome.piece.coord());
                self.valid_moves = further;
                return Ok(outcome);
            }
        }

        self.switch_player();
        Ok(outcome)
    }

    /// Hands the turn to the other side and clears the selection.
    pub fn switch_player(&mut self) {
        self.board.switch_player();
        self.turn_state = TurnState::AwaitingSelection;
        self.reset_valid_moves();
        self.update_status();
    }

    fn update_status(&mut self) {
        if let Ok(winner) = self.board.winner() {
            self.status = GameStatus::Won(winner);
        } else if !MoveGenerator::new().has_legal_moves(&self.board, self.turn()) {
            // A side that cannot move loses, even with pieces left.
            self.status = GameStatus::Won(self.turn().opposite());
        }

        if let GameStatus::Won(winner) = self.status {
            log::info!("game over: {winner} wins");
        }
    }

    pub const fn is_game_over(&self) -> bool {
        matches!(self.status, GameStatus::Won(_))
    }

    pub const fn winner(&self) -> Result<Color, MoveError> {
        match self.status {
            GameStatus::Won(color) => Ok(color),
            GameStatus::Playing => Err(MoveError::GameNotOver),
        }
    }
}
