use anyhow::{bail, Context, Result};
use checkers_core::engine::config::EngineConfig;
use checkers_core::engine::search::AlphaBetaEngine;
use checkers_core::engine::{Move, SearchLimit, Searcher};
use checkers_core::logic::board::{Board, BoardCoordinate};
use checkers_core::logic::game::GameState;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Checkers engine self-play", long_about = None)]
struct Args {
    /// Plies searched below each root move (overrides the config file)
    #[arg(short, long)]
    depth: Option<u8>,

    /// Think for this many milliseconds per move instead of a fixed depth
    #[arg(long)]
    time_ms: Option<u64>,

    /// Give up after this many plies without a result
    #[arg(long, default_value_t = 300)]
    max_turns: u32,

    /// Random plies played before the engine takes over
    #[arg(long, default_value_t = 0)]
    random_openings: u32,

    /// Seed for the random opening plies
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON file of evaluation scale factors
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from this position instead of the opening layout
    #[arg(long)]
    fen: Option<String>,

    /// Moves played before anything else, as row/col digit pairs: 21-32
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// Print the board after every ply
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::load_from_json(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    Ok(config)
}

/// Parses `21-32` into ((2, 1), (3, 2)).
fn parse_move(text: &str) -> Result<(BoardCoordinate, BoardCoordinate)> {
    let Some((from, to)) = text.split_once('-') else {
        bail!("move '{text}' is not of the form 21-32");
    };
    Ok((parse_square(from)?, parse_square(to)?))
}

fn parse_square(text: &str) -> Result<BoardCoordinate> {
    let digits: Vec<usize> = text
        .chars()
        .map(|ch| ch.to_digit(10).map(|d| d as usize))
        .collect::<Option<_>>()
        .with_context(|| format!("square '{text}' must be two digits"))?;
    match digits.as_slice() {
        &[row, col] => BoardCoordinate::new(row, col)
            .with_context(|| format!("square '{text}' is off the board")),
        _ => bail!("square '{text}' must be two digits"),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let limit = args
        .time_ms
        .map_or(SearchLimit::Depth(config.max_depth), SearchLimit::Time);
    log::info!("engine config: {}", serde_json::to_string(&config)?);

    let board = match &args.fen {
        Some(fen) => Board::from_fen(fen).context("invalid start position")?,
        None => Board::new(),
    };
    let mut game = GameState::from_board(board);
    let mut engine = AlphaBetaEngine::new(Arc::new(config));
    let mut rng = StdRng::seed_from_u64(args.seed);
    let scripted = args
        .moves
        .iter()
        .map(|text| parse_move(text))
        .collect::<Result<Vec<_>>>()?;

    println!("{}", game.board);
    let mut plies = 0;
    while !game.is_game_over() && plies < args.max_turns {
        let side = game.turn();
        let index = plies as usize;
        let choice: Option<Move> = if let Some(&(from, to)) = scripted.get(index) {
            Some(Move::new(from, to))
        } else if index < scripted.len() + args.random_openings as usize {
            game.legal_moves().choose(&mut rng).copied()
        } else {
            engine.search(&game, limit).map(|(mv, _)| mv)
        };
        let Some(mv) = choice else {
            break;
        };

        let outcome = game
            .make_move(mv.from, mv.to)
            .with_context(|| format!("{side} could not play {mv}"))?;
        plies += 1;

        let mut line = format!("{plies:>3}. {side} {mv}");
        if let Some(captured) = outcome.captured {
            line.push_str(&format!(" takes {captured}"));
        }
        if outcome.promoted {
            line.push_str(", crowned");
        }
        println!("{line}");
        if args.verbose {
            println!("{}", game.board);
        }
    }

    println!("{}", game.board);
    println!("FEN: {}", game.board.to_fen_string());
    match game.winner() {
        Ok(winner) => println!("{winner} wins after {plies} plies"),
        Err(_) => println!("No result after {plies} plies"),
    }
    Ok(())
}
