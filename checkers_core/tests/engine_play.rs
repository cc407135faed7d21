use checkers_core::engine::config::EngineConfig;
use checkers_core::engine::search::AlphaBetaEngine;
use checkers_core::engine::{SearchLimit, Searcher};
use checkers_core::logic::board::{Board, BoardCoordinate};
use checkers_core::logic::game::GameState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

fn c(row: usize, col: usize) -> BoardCoordinate {
    BoardCoordinate::new(row, col).expect("square on the board")
}

fn game_from_fen(fen: &str) -> GameState {
    GameState::from_board(Board::from_fen(fen).expect("Invalid FEN"))
}

#[test]
fn test_engine_self_play_stays_legal() {
    let config = EngineConfig {
        max_depth: 2,
        ..EngineConfig::default()
    };
    let mut engine = AlphaBetaEngine::new(Arc::new(config));

    for seed in 0..4 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new();

        for ply in 0..200 {
            if game.is_game_over() {
                break;
            }
            let legal = game.legal_moves();
            let mv = if ply < 6 {
                *legal.choose(&mut rng).expect("side to move has a move")
            } else {
                let (mv, stats) = engine
                    .search(&game, SearchLimit::Depth(2))
                    .expect("engine found a move");
                assert!(!stats.aborted);
                assert!(legal.iter().any(|m| m.same_squares(&mv)), "seed {seed}: {mv}");
                mv
            };
            game.make_move(mv.from, mv.to).expect("legal move");
        }
    }
}

#[test]
fn test_time_limited_search_returns_a_move() {
    let game = GameState::new();
    let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()));
    let (mv, stats) = engine
        .search(&game, SearchLimit::Time(50))
        .expect("engine found a move");
    assert!(game.legal_moves().iter().any(|m| m.same_squares(&mv)));
    assert!(stats.nodes > 0 || stats.aborted);
}

#[test]
fn test_config_from_json_changes_the_engine() {
    let config = EngineConfig::load_from_json(r#"{ "val_king": 2.0, "max_depth": 1 }"#)
        .expect("valid config");
    assert_eq!(config.val_king, 6);

    let game = game_from_fen("8/8/8/8/8/r7/1b6/8 b");
    let mut engine = AlphaBetaEngine::new(Arc::new(EngineConfig::default()));
    let (mv, _) = engine
        .search(&game, SearchLimit::Depth(1))
        .expect("engine found a move");
    assert_eq!(mv.from, c(6, 1));
    assert_eq!(mv.score, 3 - 1);

    // Crowning is now worth twice as much.
    engine.update_config(Arc::new(config));
    let (mv, _) = engine
        .search(&game, SearchLimit::Depth(1))
        .expect("engine found a move");
    assert_eq!(mv.from, c(6, 1));
    assert_eq!(mv.score, 6 - 1);
}
