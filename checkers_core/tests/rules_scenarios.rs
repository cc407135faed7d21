use checkers_core::logic::board::{Board, BoardCoordinate, Color};
use checkers_core::logic::game::{GameState, GameStatus};
use checkers_core::logic::generator::MoveGenerator;
use checkers_core::logic::rules::{legal_destinations, single_jumps, MoveKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn c(row: usize, col: usize) -> BoardCoordinate {
    BoardCoordinate::new(row, col).expect("square on the board")
}

#[test]
fn test_capture_is_mandatory_for_the_jumping_piece() {
    let mut board = Board::empty();
    let black = board.add_piece(c(2, 3), Color::Black, false);
    board.add_piece(c(3, 4), Color::Red, false);

    assert!(single_jumps(&board, &black).contains(&c(4, 5)));
    assert_eq!(legal_destinations(&board, &black), vec![c(4, 5)]);
}

#[test]
fn test_opening_position() {
    let board = Board::new();
    assert!(!board.is_game_over());

    let movable = MoveGenerator::new().pieces_with_moves(&board, Color::Black);
    assert_eq!(movable.len(), 4);
    assert!(movable.iter().all(|p| p.row() == 2));
}

#[test]
fn test_reaching_the_far_row_crowns() {
    let mut board = Board::empty();
    let piece = board.add_piece(c(6, 1), Color::Black, false);
    let kings_before = board.kings_left(Color::Black);
    let regular_before = board.regular_left(Color::Black);

    let outcome = board.execute_move(&piece, c(7, 0)).expect("legal step");
    assert!(outcome.promoted);
    assert!(board.get_piece(c(7, 0)).expect("moved piece").is_king());
    assert_eq!(board.kings_left(Color::Black), kings_before + 1);
    assert_eq!(board.regular_left(Color::Black), regular_before - 1);

    let mut board = Board::empty();
    let piece = board.add_piece(c(1, 4), Color::Red, false);
    board.execute_move(&piece, c(0, 5)).expect("legal step");
    assert_eq!(board.kings_left(Color::Red), 1);
}

#[test]
fn test_capturing_every_red_piece_ends_the_game() {
    let mut board = Board::empty();
    let black = board.add_piece(c(2, 1), Color::Black, false);
    board.add_piece(c(3, 2), Color::Red, false);
    board.add_piece(c(5, 4), Color::Red, false);

    let first = board.execute_move(&black, c(4, 3)).expect("first jump");
    assert_eq!(board.pieces_left(Color::Red), 1);
    assert!(!board.is_game_over());

    board.execute_move(&first.piece, c(6, 5)).expect("second jump");
    assert_eq!(board.pieces_left(Color::Red), 0);
    assert!(board.is_game_over());
    assert_eq!(board.winner(), Ok(Color::Black));
}

#[test]
fn test_clone_is_independent() {
    let board = Board::new();
    let mut copy = board.clone();
    let piece = copy.get_piece(c(2, 1)).expect("opening piece");
    copy.execute_move(&piece, c(3, 2)).expect("legal step");

    assert_eq!(board, Board::new());
    assert_ne!(copy, board);
}

fn assert_counters(board: &Board) {
    for color in [Color::Black, Color::Red] {
        assert_eq!(
            board.pieces_left(color),
            board.regular_left(color) + board.kings_left(color)
        );
        assert_eq!(
            usize::from(board.pieces_left(color)),
            board.pieces(color).count()
        );
    }
}

/// Random legal games, checking the board invariants after every ply.
#[test]
fn test_random_playouts_keep_invariants() {
    let generator = MoveGenerator::new();

    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new();

        for _ in 0..400 {
            if game.is_game_over() {
                break;
            }
            let moves = game.legal_moves();
            assert!(!moves.is_empty(), "seed {seed}: playing side has no move");

            let side = game.turn();
            let must_capture = game.jumping_piece().is_some()
                || generator
                    .pieces_with_moves(&game.board, side)
                    .iter()
                    .any(|p| !single_jumps(&game.board, p).is_empty());
            let mv = *moves.choose(&mut rng).expect("non-empty");
            let before = game.board.clone();
            let was_king = before.get_piece(mv.from).expect("mover").is_king();

            let outcome = game.make_move(mv.from, mv.to).expect("generated move is legal");
            let after = &game.board;
            assert_counters(after);

            if must_capture {
                assert_eq!(outcome.kind, MoveKind::Jump, "seed {seed}: capture skipped");
            }
            if was_king {
                assert!(outcome.piece.is_king());
            }
            assert!(after.kings_left(side) >= before.kings_left(side));

            let enemy = side.opposite();
            match outcome.captured {
                Some(_) => {
                    assert_eq!(after.pieces_left(enemy) + 1, before.pieces_left(enemy));
                }
                None => assert_eq!(after.pieces_left(enemy), before.pieces_left(enemy)),
            }
            assert_eq!(after.pieces_left(side), before.pieces_left(side));

            if outcome.promoted {
                assert_eq!(after.kings_left(side), before.kings_left(side) + 1);
                assert_eq!(after.regular_left(side) + 1, before.regular_left(side));
            }
        }

        if let GameStatus::Won(winner) = game.status {
            let loser = winner.opposite();
            assert!(
                game.board.pieces_left(loser) == 0
                    || !generator.has_legal_moves(&game.board, loser),
                "seed {seed}: {winner} declared winner early"
            );
        }
    }
}
