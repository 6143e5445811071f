use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::throws::ScoredThrow;
use crate::{MatchId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RemoteMatchStatus {
    Waiting,
    InProgress,
    Completed,
    Abandoned,
}

/// The single request type the remote relay accepts: one visit from the
/// authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VisitSubmission {
    pub match_id: MatchId,
    pub darts: [ScoredThrow; 3],
    pub score_before: u32,
    pub score_after: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RemoteVisit {
    pub player_id: PlayerId,
    pub darts: [ScoredThrow; 3],
    pub score_before: u32,
    pub score_after: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RemoteScore {
    pub player_id: PlayerId,
    pub score: u32,
}

/// Authoritative match row held by the hosted database. Clients only ever
/// apply rows they receive; `revision` increases with every accepted visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RemoteMatchRow {
    pub match_id: MatchId,
    pub status: RemoteMatchStatus,
    pub participants: Vec<PlayerId>,
    pub current_player: Option<PlayerId>,
    pub scores: Vec<RemoteScore>,
    pub last_visit: Option<RemoteVisit>,
    pub winner: Option<PlayerId>,
    pub revision: u64,
    pub updated_at: String, // ISO 8601 string
}

impl RemoteMatchRow {
    pub fn score_of(&self, player_id: PlayerId) -> Option<u32> {
        self.scores
            .iter()
            .find(|s| s.player_id == player_id)
            .map(|s| s.score)
    }

    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.participants.contains(&player_id)
    }
}
