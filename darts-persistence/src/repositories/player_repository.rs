use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::{players, prelude::*};
use darts_types::Player;

pub struct PlayerRepository {
    db: DatabaseConnection,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LeaderboardEntry {
    pub player: Player,
    pub rank: u32,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            display_name: model.display_name,
            nickname: model.nickname,
            avatar: model.avatar,
            is_guest: model.is_guest,
            account_id: model.account_id,
            wins: model.wins.max(0) as u32,
            losses: model.losses.max(0) as u32,
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>> {
        let player_model = Players::find_by_id(id).one(&self.db).await?;
        Ok(player_model.map(Self::model_to_player))
    }

    pub async fn find_by_name(&self, display_name: &str) -> Result<Option<Player>> {
        let player_model = Players::find()
            .filter(players::Column::DisplayName.eq(display_name))
            .order_by_asc(players::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(player_model.map(Self::model_to_player))
    }

    pub async fn create_player(&self, player: Player) -> Result<Player> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let player_model = players::ActiveModel {
            id: sea_orm::ActiveValue::Set(player.id),
            display_name: sea_orm::ActiveValue::Set(player.display_name),
            nickname: sea_orm::ActiveValue::Set(player.nickname),
            avatar: sea_orm::ActiveValue::Set(player.avatar),
            is_guest: sea_orm::ActiveValue::Set(player.is_guest),
            account_id: sea_orm::ActiveValue::Set(player.account_id),
            wins: sea_orm::ActiveValue::Set(player.wins as i32),
            losses: sea_orm::ActiveValue::Set(player.losses as i32),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
        };

        let saved_model = Players::insert(player_model).exec(&self.db).await?;

        // Fetch the created player
        let created_player = Players::find_by_id(saved_model.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created player"))?;

        Ok(Self::model_to_player(created_player))
    }

    /// Existing profile with this name, or a new guest profile.
    pub async fn find_or_create_guest(&self, display_name: &str) -> Result<Player> {
        if let Some(player) = self.find_by_name(display_name).await? {
            return Ok(player);
        }
        self.create_player(Player::guest(display_name)).await
    }

    /// Count one finished match against a player's record.
    pub async fn record_match(&self, player_id: Uuid, won: bool) -> Result<()> {
        let player = Players::find_by_id(player_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Player not found"))?;

        let updated_player = players::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(player.id),
            display_name: sea_orm::ActiveValue::Unchanged(player.display_name),
            nickname: sea_orm::ActiveValue::Unchanged(player.nickname),
            avatar: sea_orm::ActiveValue::Unchanged(player.avatar),
            is_guest: sea_orm::ActiveValue::Unchanged(player.is_guest),
            account_id: sea_orm::ActiveValue::Unchanged(player.account_id),
            wins: sea_orm::ActiveValue::Set(player.wins + if won { 1 } else { 0 }),
            losses: sea_orm::ActiveValue::Set(player.losses + if won { 0 } else { 1 }),
            created_at: sea_orm::ActiveValue::Unchanged(player.created_at),
            updated_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        Players::update(updated_player).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        let players = Players::find()
            .order_by_desc(players::Column::Wins)
            .order_by_asc(players::Column::Losses)
            .limit(limit)
            .all(&self.db)
            .await?;

        let leaderboard = players
            .into_iter()
            .enumerate()
            .map(|(index, model)| LeaderboardEntry {
                player: Self::model_to_player(model),
                rank: (index + 1) as u32,
            })
            .collect();

        Ok(leaderboard)
    }

    pub async fn get_player_rank(&self, player_id: Uuid) -> Result<Option<u32>> {
        let player = Players::find_by_id(player_id).one(&self.db).await?;

        if let Some(player_model) = player {
            let players_above = Players::find()
                .filter(players::Column::Wins.gt(player_model.wins))
                .count(&self.db)
                .await?;

            Ok(Some(players_above as u32 + 1))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use uuid::Uuid;

    async fn setup_test_db() -> PlayerRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        PlayerRepository::new(db)
    }

    fn player_with_record(name: &str, wins: u32, losses: u32) -> Player {
        Player {
            wins,
            losses,
            ..Player::guest(name)
        }
    }

    #[tokio::test]
    async fn test_create_and_find_player() {
        let repo = setup_test_db().await;

        let player = Player {
            nickname: Some("The Power".to_string()),
            ..Player::linked("Phil", "acct-42")
        };
        let player_id = player.id;

        // Create player
        let created = repo.create_player(player.clone()).await.unwrap();
        assert_eq!(created, player);

        // Find by ID
        let found = repo.find_by_id(player_id).await.unwrap().unwrap();
        assert_eq!(found.account_id.as_deref(), Some("acct-42"));
        assert!(!found.is_guest);

        // Find by name
        let found_by_name = repo.find_by_name("Phil").await.unwrap().unwrap();
        assert_eq!(found_by_name.id, player_id);
        assert!(repo.find_by_name("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_or_create_guest_reuses_profile() {
        let repo = setup_test_db().await;

        let first = repo.find_or_create_guest("Alice").await.unwrap();
        let second = repo.find_or_create_guest("Alice").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_guest);
    }

    #[tokio::test]
    async fn test_record_match() {
        let repo = setup_test_db().await;
        let player = repo
            .create_player(player_with_record("Test Player", 1, 2))
            .await
            .unwrap();

        repo.record_match(player.id, true).await.unwrap();
        repo.record_match(player.id, false).await.unwrap();

        let updated = repo.find_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(updated.wins, 2);
        assert_eq!(updated.losses, 3);
        assert_eq!(updated.games_played(), 5);

        assert!(repo.record_match(Uuid::new_v4(), true).await.is_err());
    }

    #[tokio::test]
    async fn test_leaderboard() {
        let repo = setup_test_db().await;

        let players = vec![
            player_with_record("Player One", 5, 5),
            player_with_record("Player Two", 8, 4),
            player_with_record("Player Three", 5, 1),
        ];
        for player in &players {
            repo.create_player(player.clone()).await.unwrap();
        }

        let leaderboard = repo.get_leaderboard(10).await.unwrap();
        assert_eq!(leaderboard.len(), 3);

        // Most wins first, fewer losses breaks ties
        assert_eq!(leaderboard[0].player.display_name, "Player Two");
        assert_eq!(leaderboard[0].rank, 1);
        assert_eq!(leaderboard[1].player.display_name, "Player Three");
        assert_eq!(leaderboard[2].player.display_name, "Player One");
        assert_eq!(leaderboard[2].rank, 3);

        let top = repo.get_leaderboard(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_player_rank() {
        let repo = setup_test_db().await;

        let leader = repo.create_player(player_with_record("Leader", 9, 0)).await.unwrap();
        let chaser = repo.create_player(player_with_record("Chaser", 3, 3)).await.unwrap();

        assert_eq!(repo.get_player_rank(leader.id).await.unwrap(), Some(1));
        assert_eq!(repo.get_player_rank(chaser.id).await.unwrap(), Some(2));

        // Non-existent player should return None
        assert_eq!(repo.get_player_rank(Uuid::new_v4()).await.unwrap(), None);
    }
}
