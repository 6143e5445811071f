use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::PlayerId;

/// Reasons the remote relay refuses a submitted visit. The relay performs no
/// state change when it answers with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RelayRejection {
    #[error("caller is not a participant of this match")]
    Unauthorized,
    #[error("match not found")]
    NotFound,
    #[error("it is not the caller's turn")]
    NotYourTurn,
    #[error("match is not in progress")]
    MatchNotActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrowParseError {
    #[error("unrecognised dart '{input}'")]
    Invalid { input: String },
    #[error("there is no triple bull")]
    TripleBull,
    #[error("segment {base} is not on the board")]
    OffBoard { base: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("a match needs at least one player")]
    EmptyRoster,
    #[error("{game} needs at least {required} players, got {actual}")]
    NotEnoughPlayers {
        game: String,
        required: usize,
        actual: usize,
    },
    #[error("player {0} appears more than once in the roster")]
    DuplicatePlayer(PlayerId),
    #[error("unsupported starting score {0}")]
    UnsupportedStartingScore(u32),
    #[error("starting lives must be at least 1")]
    NoLives,
    #[error("killer supports at most {max} players, got {actual}")]
    TooManyPlayers { max: usize, actual: usize },
    #[error("invalid killer number assignment: {0}")]
    InvalidAssignment(String),
    #[error("rules were built for {expected} seats but the roster has {actual}")]
    RosterMismatch { expected: usize, actual: usize },
}
