//! Checkers (draughts) rules engine and alpha-beta search.
//!
//! [`logic`] owns the board, move legality and the turn state machine;
//! [`engine`] picks moves for the computer player.

pub mod engine;
pub mod logic;
