use crate::engine::config::EngineConfig;
use crate::engine::eval::SimpleEvaluator;
use crate::engine::move_list::MoveList;
use crate::engine::{Evaluator, Move, SearchLimit, SearchStats, Searcher};
use crate::logic::board::{Board, BoardCoordinate, Color, Piece};
use crate::logic::game::GameState;
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{single_jumps, MoveError, MoveKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const INFINITY: i32 = i32::MAX;

/// A position in the search tree. `chain` is set when the side to move is
/// in the middle of a multi-jump and may only continue with that piece.
struct Node {
    board: Board,
    chain: Option<BoardCoordinate>,
}

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    generator: MoveGenerator,
    nodes_searched: u32,
    start_time: Instant,
    time_limit: Option<Duration>,
    stop: Arc<AtomicBool>,
    aborted: bool,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            config,
            generator: MoveGenerator::new(),
            nodes_searched: 0,
            start_time: Instant::now(),
            time_limit: None,
            stop: Arc::new(AtomicBool::new(false)),
            aborted: false,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.evaluator = SimpleEvaluator::new(config.clone());
        self.config = config;
    }

    /// Flag another thread can raise to cut the running search short.
    /// It is cleared again when that search returns.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Copy of `board` with the move played. The turn passes unless the
    /// moved piece has just captured and can capture again.
    pub fn result(
        board: &Board,
        piece: &Piece,
        destination: BoardCoordinate,
    ) -> Result<Board, MoveError> {
        Self::apply(board, piece, destination).map(|(next, _)| next)
    }

    fn apply(
        board: &Board,
        piece: &Piece,
        destination: BoardCoordinate,
    ) -> Result<(Board, Option<BoardCoordinate>), MoveError> {
        let mut next = board.clone();
        let outcome = next.execute_move(piece, destination)?;
        if outcome.kind == MoveKind::Jump && !single_jumps(&next, &outcome.piece).is_empty() {
            return Ok((next, Some(outcome.piece.coord())));
        }
        next.switch_player();
        Ok((next, None))
    }

    /// Best (piece, destination) for the side to move, searched to the
    /// configured depth. `None` when the game is over or no move exists.
    pub fn minimax(&mut self, board: &Board) -> Option<(Piece, BoardCoordinate)> {
        if board.is_game_over() {
            self.stop.store(false, Ordering::Relaxed);
            return None;
        }
        self.reset(None);
        let root = Node {
            board: board.clone(),
            chain: None,
        };
        let best = self.search_root(&root, self.config.max_depth)?;
        let piece = board.get_piece(best.from)?;
        Some((piece, best.to))
    }

    fn reset(&mut self, time_limit: Option<Duration>) {
        self.nodes_searched = 0;
        self.aborted = false;
        self.start_time = Instant::now();
        self.time_limit = time_limit;
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        self.time_limit
            .is_some_and(|limit| self.start_time.elapsed() >= limit)
    }

    fn expand(&self, node: &Node) -> MoveList {
        let mut moves = MoveList::new();
        match node.chain {
            Some(from) => self.generator.continuation_into(&node.board, from, &mut moves),
            None => self
                .generator
                .generate_into(&node.board, node.board.current_turn(), &mut moves),
        }
        moves
    }

    fn child(node: &Node, mv: &Move) -> Option<Node> {
        let piece = node.board.get_piece(mv.from)?;
        match Self::apply(&node.board, &piece, mv.to) {
            Ok((board, chain)) => Some(Node { board, chain }),
            Err(e) => {
                log::warn!("search skipped {mv}: {e}");
                None
            }
        }
    }

    /// Root loop. Every root move is searched with the window narrowed by
    /// the moves before it; only a strictly better score replaces the best.
    fn search_root(&mut self, root: &Node, depth: u8) -> Option<Move> {
        let moves = self.expand(root);
        let maximizing = root.board.current_turn() == Color::Black;
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best: Option<Move> = None;

        for mv in &moves {
            if self.should_stop() {
                self.aborted = true;
                break;
            }
            let Some(child) = Self::child(root, mv) else {
                continue;
            };
            let Some(score) = self.value(&child, alpha, beta, depth) else {
                self.aborted = true;
                break;
            };

            let better = match best {
                None => true,
                Some(b) if maximizing => score > b.score,
                Some(b) => score < b.score,
            };
            if better {
                best = Some(Move { score, ..*mv });
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        self.stop.store(false, Ordering::Relaxed);
        if best.is_none() && self.aborted {
            // Cut off before any root move finished: any legal move beats none.
            return moves.first().copied();
        }
        best
    }

    /// Dispatches on the side to move, which stays the same across the
    /// steps of a multi-jump.
    fn value(&mut self, node: &Node, alpha: i32, beta: i32, depth: u8) -> Option<i32> {
        match node.board.current_turn() {
            Color::Black => self.max_value(node, alpha, beta, depth),
            Color::Red => self.min_value(node, alpha, beta, depth),
        }
    }

    /// `None` means the search was stopped and the score is unusable.
    fn max_value(&mut self, node: &Node, mut alpha: i32, beta: i32, depth: u8) -> Option<i32> {
        self.nodes_searched += 1;
        if node.board.is_game_over() || depth == 0 {
            return Some(self.evaluator.evaluate(&node.board));
        }

        let moves = self.expand(node);
        if moves.is_empty() {
            return Some(self.config.loss_score.saturating_neg());
        }

        let mut best = -INFINITY;
        for mv in &moves {
            if self.should_stop() {
                return None;
            }
            let Some(child) = Self::child(node, mv) else {
                continue;
            };
            let score = self.value(&child, alpha, beta, depth - 1)?;
            best = best.max(score);
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        Some(best)
    }

    fn min_value(&mut self, node: &Node, alpha: i32, mut beta: i32, depth: u8) -> Option<i32> {
        self.nodes_searched += 1;
        if node.board.is_game_over() || depth == 0 {
            return Some(self.evaluator.evaluate(&node.board));
        }

        let moves = self.expand(node);
        if moves.is_empty() {
            return Some(self.config.loss_score);
        }

        let mut best = INFINITY;
        for mv in &moves {
            if self.should_stop() {
                return None;
            }
            let Some(child) = Self::child(node, mv) else {
                continue;
            };
            let score = self.value(&child, alpha, beta, depth - 1)?;
            best = best.min(score);
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        Some(best)
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(
        &mut self,
        game_state: &GameState,
        limit: SearchLimit,
    ) -> Option<(Move, SearchStats)> {
        if game_state.is_game_over() {
            self.stop.store(false, Ordering::Relaxed);
            return None;
        }

        let (depth, time_limit) = match limit {
            SearchLimit::Depth(d) => (d, None),
            SearchLimit::Time(ms) => (self.config.max_depth, Some(Duration::from_millis(ms))),
        };
        self.reset(time_limit);

        let root = Node {
            board: game_state.board.clone(),
            chain: game_state.jumping_piece(),
        };
        let best = self.search_root(&root, depth)?;

        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: u64::try_from(self.start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
            aborted: self.aborted,
        };
        log::debug!(
            "{} plays {best} (score {}, depth {}, {} nodes, {} ms{})",
            game_state.turn(),
            best.score,
            stats.depth,
            stats.nodes,
            stats.time_ms,
            if stats.aborted { ", aborted" } else { "" }
        );
        Some((best, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::eval_constants::LOSS_SCORE;

    fn c(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    fn engine() -> AlphaBetaEngine {
        AlphaBetaEngine::new(Arc::new(EngineConfig::default()))
    }

    /// Plain minimax with no pruning, same ply convention.
    fn reference(engine: &AlphaBetaEngine, node: &Node, depth: u8) -> i32 {
        if node.board.is_game_over() || depth == 0 {
            return engine.evaluator.evaluate(&node.board);
        }
        let moves = engine.expand(node);
        let black = node.board.current_turn() == Color::Black;
        if moves.is_empty() {
            return if black { -LOSS_SCORE } else { LOSS_SCORE };
        }
        let scores = moves
            .iter()
            .filter_map(|mv| AlphaBetaEngine::child(node, mv))
            .map(|child| reference(engine, &child, depth - 1));
        if black {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    #[test]
    fn test_result_leaves_input_untouched() {
        let board = Board::new();
        let piece = board.get_piece(c(2, 1)).unwrap();
        let next = AlphaBetaEngine::result(&board, &piece, c(3, 2)).unwrap();

        assert_eq!(board, Board::new());
        assert!(next.get_piece(c(3, 2)).is_some());
        assert_eq!(next.current_turn(), Color::Red);

        assert_eq!(
            AlphaBetaEngine::result(&board, &piece, c(4, 3)),
            Err(MoveError::IllegalDestination)
        );
    }

    #[test]
    fn test_result_keeps_turn_mid_jump() {
        let board = Board::from_fen("8/8/1b6/2r5/8/4r3/8/8 b").unwrap();
        let piece = board.get_piece(c(2, 1)).unwrap();
        let next = AlphaBetaEngine::result(&board, &piece, c(4, 3)).unwrap();
        assert_eq!(next.current_turn(), Color::Black);
    }

    #[test]
    fn test_pruning_matches_full_minimax() {
        let positions = [
            "1b1b1b1b/b1b1b1b1/1b3b1b/4b3/3r4/r3r1r1/1r1r1r1r/r1r1r1r1 b",
            "8/b1b5/3b4/2r5/8/R3r3/8/8 r",
            "8/8/3B4/8/1r1r4/8/5b2/8 b",
        ];
        for fen in positions {
            let board = Board::from_fen(fen).unwrap();
            let game = GameState::from_board(board.clone());
            let mut engine = engine();
            let (best, _) = engine.search(&game, SearchLimit::Depth(3)).unwrap();

            let root = Node { board, chain: None };
            let black = root.board.current_turn() == Color::Black;
            let child_scores: Vec<i32> = engine
                .expand(&root)
                .iter()
                .map(|mv| reference(&engine, &AlphaBetaEngine::child(&root, mv).unwrap(), 3))
                .collect();
            let expected = if black {
                child_scores.iter().max()
            } else {
                child_scores.iter().min()
            };
            assert_eq!(Some(&best.score), expected, "position {fen}");

            let chosen = AlphaBetaEngine::child(&root, &best).unwrap();
            assert_eq!(reference(&engine, &chosen, 3), best.score, "position {fen}");
        }
    }

    #[test]
    fn test_search_is_deterministic() {
        let game = GameState::new();
        let (first, _) = engine().search(&game, SearchLimit::Depth(4)).unwrap();
        let (second, _) = engine().search(&game.clone(), SearchLimit::Depth(4)).unwrap();
        assert!(first.same_squares(&second));
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn test_avoids_hanging_piece() {
        // Stepping to (4,3) lets the red man at (5,2) capture.
        let board = Board::from_fen("8/8/8/4b3/8/2r5/8/6r1 b").unwrap();
        let game = GameState::from_board(board);
        let (best, stats) = engine().search(&game, SearchLimit::Depth(1)).unwrap();
        assert_eq!(best.from, c(3, 4));
        assert_eq!(best.to, c(4, 5));
        assert_eq!(best.score, -1);
        assert!(!stats.aborted);
        assert!(stats.nodes > 0);
    }

    #[test]
    fn test_prefers_stalemating_opponent() {
        // Any move except freeing (6,1) leaves Red without a move.
        let board = Board::from_fen("8/8/1b6/8/8/2b5/1b6/r7 b").unwrap();
        let game = GameState::from_board(board);
        let (best, _) = engine().search(&game, SearchLimit::Depth(1)).unwrap();
        assert_eq!(best.score, LOSS_SCORE);
        assert_ne!(best.from, c(6, 1));
    }

    #[test]
    fn test_continues_jump_chain() {
        let board = Board::from_fen("8/8/1b6/2r5/8/4r3/8/b7 b").unwrap();
        let mut game = GameState::from_board(board);
        game.make_move(c(2, 1), c(4, 3)).unwrap();

        let (best, _) = engine().search(&game, SearchLimit::Depth(2)).unwrap();
        assert!(best.same_squares(&Move::new(c(4, 3), c(6, 5))));
    }

    #[test]
    fn test_minimax_entry_point() {
        let mut engine = engine();
        let board = Board::new();
        let (piece, to) = engine.minimax(&board).unwrap();
        assert_eq!(piece.color(), Color::Black);
        assert!(AlphaBetaEngine::result(&board, &piece, to).is_ok());

        let game = GameState::from_board(board);
        let (best, stats) = engine.search(&game, SearchLimit::Depth(5)).unwrap();
        assert!(best.same_squares(&Move::new(piece.coord(), to)));
        assert_eq!(stats.depth, 5);

        let over = Board::from_fen("8/8/8/2b5/8/8/8/8 r").unwrap();
        assert!(engine.minimax(&over).is_none());
        assert!(engine
            .search(&GameState::from_board(over), SearchLimit::Depth(3))
            .is_none());
    }

    #[test]
    fn test_stop_flag_aborts() {
        let mut engine = engine();
        engine.stop_handle().store(true, Ordering::Relaxed);

        let game = GameState::new();
        let (best, stats) = engine.search(&game, SearchLimit::Depth(8)).unwrap();
        assert!(stats.aborted);
        assert!(game.legal_moves().iter().any(|m| m.same_squares(&best)));
        assert!(!engine.stop_handle().load(Ordering::Relaxed));

        let (_, stats) = engine.search(&game, SearchLimit::Depth(2)).unwrap();
        assert!(!stats.aborted);
    }

    #[test]
    fn test_finished_game_clears_stop_flag() {
        let mut engine = engine();
        let over = Board::from_fen("8/8/8/2b5/8/8/8/8 r").unwrap();

        engine.stop_handle().store(true, Ordering::Relaxed);
        assert!(engine
            .search(&GameState::from_board(over.clone()), SearchLimit::Depth(2))
            .is_none());
        assert!(!engine.stop_handle().load(Ordering::Relaxed));

        engine.stop_handle().store(true, Ordering::Relaxed);
        assert!(engine.minimax(&over).is_none());
        assert!(!engine.stop_handle().load(Ordering::Relaxed));

        let (_, stats) = engine
            .search(&GameState::new(), SearchLimit::Depth(2))
            .unwrap();
        assert!(!stats.aborted);
    }

    #[test]
    fn test_large_loss_score_propagates() {
        // Whatever Red plays, Black's one free man walks into a blocked
        // square and Black is left without a move two plies later.
        let board = Board::from_fen("8/r1r5/8/8/8/4b3/1b6/b1b1b1b1 r").unwrap();
        let config = EngineConfig {
            loss_score: 2_000_000,
            ..EngineConfig::default()
        };
        let mut engine = AlphaBetaEngine::new(Arc::new(config));
        let game = GameState::from_board(board);
        let (best, _) = engine.search(&game, SearchLimit::Depth(3)).unwrap();
        assert_eq!(best.score, -2_000_000);
    }

    #[test]
    fn test_time_limit_aborts() {
        let mut engine = engine();
        let (best, stats) = engine
            .search(&GameState::new(), SearchLimit::Time(0))
            .unwrap();
        assert!(stats.aborted);
        assert_eq!(best.from.row(), 2);
    }
}
