use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{Board, Color};
use std::sync::Arc;

/// Material count: men and kings, weighted by the config.
/// Positive favours Black.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    // Saturates: config fields are public and may hold any i32.
    fn material(&self, board: &Board, color: Color) -> i32 {
        let men = self
            .config
            .val_man
            .saturating_mul(i32::from(board.regular_left(color)));
        let kings = self
            .config
            .val_king
            .saturating_mul(i32::from(board.kings_left(color)));
        men.saturating_add(kings)
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        self.material(board, Color::Black)
            .saturating_sub(self.material(board, Color::Red))
    }
}
