use crate::logic::board::{Board, BoardCoordinate};
use crate::logic::game::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod move_list;
pub mod search;

/// One ply: a single step or a single jump of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Move {
    pub from: BoardCoordinate,
    pub to: BoardCoordinate,
    pub score: i32,
}

impl Move {
    pub const fn new(from: BoardCoordinate, to: BoardCoordinate) -> Self {
        Self { from, to, score: 0 }
    }

    /// Same squares, ignoring the search score.
    pub fn same_squares(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SearchLimit {
    Depth(u8),
    Time(u64), // milliseconds
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
    pub aborted: bool,
}

pub trait Evaluator {
    fn evaluate(&self, board: &Board) -> i32;
}

pub trait Searcher {
    fn search(&mut self, game_state: &GameState, limit: SearchLimit)
        -> Option<(Move, SearchStats)>;
}
