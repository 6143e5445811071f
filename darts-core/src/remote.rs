use async_trait::async_trait;
use chrono::Utc;
use darts_types::{
    MatchId, PlayerId, RelayRejection, RemoteMatchRow, RemoteMatchStatus, RemoteScore,
    RemoteVisit, ScoredThrow, VisitSubmission,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};
use uuid::Uuid;

use crate::rules::{FinishRule, Settlement, settle};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("visit rejected: {0}")]
    Rejected(#[from] RelayRejection),
    #[error("relay unavailable: {0}")]
    Transport(String),
}

impl RelayError {
    pub fn rejection(&self) -> Option<RelayRejection> {
        match self {
            RelayError::Rejected(reason) => Some(*reason),
            RelayError::Transport(_) => None,
        }
    }
}

/// Network boundary for remote matches. The relay owns the match row;
/// clients submit visits and listen for the rows it publishes.
#[async_trait]
pub trait TurnRelay: Send + Sync {
    async fn submit_visit(
        &self,
        caller: PlayerId,
        visit: VisitSubmission,
    ) -> Result<(), RelayError>;

    async fn fetch_match(&self, match_id: MatchId) -> Result<RemoteMatchRow, RelayError>;

    /// Feed of every row the relay publishes, for any match.
    async fn subscribe(&self) -> Result<broadcast::Receiver<RemoteMatchRow>, RelayError>;
}

/// Checks the relay applies before accepting a visit, in order.
pub fn validate_visit(
    row: Option<&RemoteMatchRow>,
    caller: PlayerId,
) -> Result<(), RelayRejection> {
    let row = row.ok_or(RelayRejection::NotFound)?;
    if !row.is_participant(caller) {
        return Err(RelayRejection::Unauthorized);
    }
    if row.status != RemoteMatchStatus::InProgress {
        return Err(RelayRejection::MatchNotActive);
    }
    if row.current_player != Some(caller) {
        return Err(RelayRejection::NotYourTurn);
    }
    Ok(())
}

/// Client view of a remote countdown match. Local state only ever changes
/// when the relay publishes a row.
pub struct RemoteMatchSession<T: TurnRelay> {
    relay: Arc<T>,
    player_id: PlayerId,
    finish: FinishRule,
    row: RemoteMatchRow,
    last_heard: Instant,
}

impl<T: TurnRelay> RemoteMatchSession<T> {
    pub async fn join(
        relay: Arc<T>,
        player_id: PlayerId,
        match_id: MatchId,
        finish: FinishRule,
    ) -> Result<Self, RelayError> {
        let row = relay.fetch_match(match_id).await?;
        if !row.is_participant(player_id) {
            return Err(RelayRejection::Unauthorized.into());
        }

        info!("Joined remote match {} at revision {}", match_id, row.revision);
        Ok(Self {
            relay,
            player_id,
            finish,
            row,
            last_heard: Instant::now(),
        })
    }

    pub fn row(&self) -> &RemoteMatchRow {
        &self.row
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn is_my_turn(&self) -> bool {
        self.row.status == RemoteMatchStatus::InProgress
            && self.row.current_player == Some(self.player_id)
    }

    pub fn my_score(&self) -> Option<u32> {
        self.row.score_of(self.player_id)
    }

    /// The visit this client would send for `darts`, settled against the
    /// last score the relay published for us.
    pub fn prepare_visit(&self, darts: [ScoredThrow; 3]) -> Result<VisitSubmission, RelayError> {
        let score_before = self.my_score().ok_or(RelayRejection::Unauthorized)?;
        let score_after = match settle(score_before, &darts, self.finish) {
            Settlement::Checkout => 0,
            Settlement::Bust => score_before,
            Settlement::Continue(remaining) => remaining,
        };

        Ok(VisitSubmission {
            match_id: self.row.match_id,
            darts,
            score_before,
            score_after,
        })
    }

    /// Send a visit. Nothing local moves until the relay's row arrives
    /// through `apply_update` or `resync`.
    pub async fn submit(&self, darts: [ScoredThrow; 3]) -> Result<VisitSubmission, RelayError> {
        let visit = self.prepare_visit(darts)?;
        self.relay.submit_visit(self.player_id, visit.clone()).await?;
        debug!(
            "Submitted visit for match {}: {} -> {}",
            visit.match_id, visit.score_before, visit.score_after
        );
        Ok(visit)
    }

    /// Take a pushed row if it belongs to this match and is newer than ours.
    pub fn apply_update(&mut self, row: RemoteMatchRow) -> bool {
        if row.match_id != self.row.match_id {
            return false;
        }
        self.last_heard = Instant::now();
        if row.revision <= self.row.revision {
            return false;
        }
        self.row = row;
        true
    }

    /// Pull the current row, for when pushes may have been missed.
    pub async fn resync(&mut self) -> Result<bool, RelayError> {
        let row = self.relay.fetch_match(self.row.match_id).await?;
        let changed = self.apply_update(row);
        if changed {
            info!(
                "Resynced remote match {} to revision {}",
                self.row.match_id, self.row.revision
            );
        }
        Ok(changed)
    }

    pub fn needs_resync(&self, stale_after: Duration) -> bool {
        self.last_heard.elapsed() >= stale_after
    }
}

/// In-process relay with the same contract as the hosted one.
pub struct InMemoryRelay {
    matches: RwLock<HashMap<MatchId, RemoteMatchRow>>,
    updates: broadcast::Sender<RemoteMatchRow>,
}

impl InMemoryRelay {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            matches: RwLock::new(HashMap::new()),
            updates,
        }
    }

    /// Open a countdown match with the first participant to throw.
    pub async fn create_match(&self, participants: Vec<PlayerId>, starting_score: u32) -> RemoteMatchRow {
        let row = RemoteMatchRow {
            match_id: Uuid::new_v4(),
            status: RemoteMatchStatus::InProgress,
            current_player: participants.first().copied(),
            scores: participants
                .iter()
                .map(|id| RemoteScore {
                    player_id: *id,
                    score: starting_score,
                })
                .collect(),
            participants,
            last_visit: None,
            winner: None,
            revision: 1,
            updated_at: Utc::now().to_rfc3339(),
        };

        self.matches.write().await.insert(row.match_id, row.clone());
        row
    }

    pub async fn set_status(&self, match_id: MatchId, status: RemoteMatchStatus) -> Result<(), RelayError> {
        let row = {
            let mut matches = self.matches.write().await;
            let row = matches.get_mut(&match_id).ok_or(RelayRejection::NotFound)?;
            row.status = status;
            row.revision += 1;
            row.updated_at = Utc::now().to_rfc3339();
            row.clone()
        };
        let _ = self.updates.send(row);
        Ok(())
    }
}

impl Default for InMemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TurnRelay for InMemoryRelay {
    async fn submit_visit(
        &self,
        caller: PlayerId,
        visit: VisitSubmission,
    ) -> Result<(), RelayError> {
        let row = {
            let mut matches = self.matches.write().await;
            validate_visit(matches.get(&visit.match_id), caller)?;
            let Some(row) = matches.get_mut(&visit.match_id) else {
                return Err(RelayRejection::NotFound.into());
            };

            if let Some(entry) = row.scores.iter_mut().find(|s| s.player_id == caller) {
                entry.score = visit.score_after;
            }
            row.last_visit = Some(RemoteVisit {
                player_id: caller,
                darts: visit.darts,
                score_before: visit.score_before,
                score_after: visit.score_after,
            });

            if visit.score_after == 0 {
                row.status = RemoteMatchStatus::Completed;
                row.winner = Some(caller);
                row.current_player = None;
            } else {
                let seat = row.participants.iter().position(|p| *p == caller).unwrap_or(0);
                let next = (seat + 1) % row.participants.len();
                row.current_player = Some(row.participants[next]);
            }
            row.revision += 1;
            row.updated_at = Utc::now().to_rfc3339();
            row.clone()
        };

        // No subscribers is fine; they resync on reconnect
        let _ = self.updates.send(row);
        Ok(())
    }

    async fn fetch_match(&self, match_id: MatchId) -> Result<RemoteMatchRow, RelayError> {
        self.matches
            .read()
            .await
            .get(&match_id)
            .cloned()
            .ok_or_else(|| RelayRejection::NotFound.into())
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<RemoteMatchRow>, RelayError> {
        Ok(self.updates.subscribe())
    }
}
