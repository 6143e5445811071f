use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{match_players, match_results, prelude::*};
use darts_types::{MatchId, MatchResult};

pub struct MatchRepository {
    db: DatabaseConnection,
}

/// Listing row for a stored match, without the turn log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub game_type: String,
    pub winner_id: Option<Uuid>,
    pub turn_count: u32,
    pub finished_at: String,
}

fn parse_timestamp(value: &str) -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::DateTime::parse_from_rfc3339(value).unwrap_or_else(|_| chrono::Utc::now().into())
}

impl MatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_summary(model: match_results::Model) -> MatchSummary {
        MatchSummary {
            match_id: model.id,
            game_type: model.game_type,
            winner_id: model.winner_id,
            turn_count: model.turn_count.max(0) as u32,
            finished_at: model.finished_at.to_rfc3339(),
        }
    }

    fn decode(model: match_results::Model) -> Result<MatchResult> {
        serde_json::from_str(&model.payload)
            .with_context(|| format!("Corrupt payload for match {}", model.id))
    }

    /// Store a finished match. Saving a match that is already stored is a no-op.
    pub async fn save(&self, result: &MatchResult) -> Result<()> {
        if MatchResults::find_by_id(result.match_id)
            .one(&self.db)
            .await?
            .is_some()
        {
            debug!("Match {} already stored", result.match_id);
            return Ok(());
        }

        let payload = serde_json::to_string(result)?;
        let txn = self.db.begin().await?;

        let match_model = match_results::ActiveModel {
            id: sea_orm::ActiveValue::Set(result.match_id),
            game_type: sea_orm::ActiveValue::Set(result.game_type.to_string()),
            winner_id: sea_orm::ActiveValue::Set(result.winner),
            turn_count: sea_orm::ActiveValue::Set(result.turns.len() as i32),
            payload: sea_orm::ActiveValue::Set(payload),
            started_at: sea_orm::ActiveValue::Set(parse_timestamp(&result.started_at)),
            finished_at: sea_orm::ActiveValue::Set(parse_timestamp(&result.finished_at)),
        };
        MatchResults::insert(match_model).exec(&txn).await?;

        let participants: Vec<match_players::ActiveModel> = result
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| match_players::ActiveModel {
                match_id: sea_orm::ActiveValue::Set(result.match_id),
                player_id: sea_orm::ActiveValue::Set(player.player_id),
                seat: sea_orm::ActiveValue::Set(seat as i32),
                final_score: sea_orm::ActiveValue::Set(player.final_score as i32),
                is_winner: sea_orm::ActiveValue::Set(result.is_winner(player.player_id)),
            })
            .collect();
        if !participants.is_empty() {
            MatchPlayers::insert_many(participants)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, match_id: MatchId) -> Result<Option<MatchResult>> {
        match MatchResults::find_by_id(match_id).one(&self.db).await? {
            Some(model) => Ok(Some(Self::decode(model)?)),
            None => Ok(None),
        }
    }

    /// Most recently finished matches first.
    pub async fn recent(&self, limit: u64) -> Result<Vec<MatchSummary>> {
        let matches = MatchResults::find()
            .order_by_desc(match_results::Column::FinishedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(matches.into_iter().map(Self::model_to_summary).collect())
    }

    pub async fn find_by_player(&self, player_id: Uuid, limit: u64) -> Result<Vec<MatchResult>> {
        let matches = MatchResults::find()
            .inner_join(MatchPlayers)
            .filter(match_players::Column::PlayerId.eq(player_id))
            .order_by_desc(match_results::Column::FinishedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        matches.into_iter().map(Self::decode).collect()
    }
}
