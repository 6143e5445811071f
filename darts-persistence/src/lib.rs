pub mod connection;
pub mod entities;
pub mod repositories;
pub mod sink;

pub use repositories::{LeaderboardEntry, MatchRepository, MatchSummary, PlayerRepository};
pub use sink::DatabaseResultSink;

use sea_orm::{DatabaseConnection, DbErr};

pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    /// Connects and runs pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let connection = connection::connect_and_migrate(database_url).await?;
        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn players(&self) -> PlayerRepository {
        PlayerRepository::new(self.connection.clone())
    }

    pub fn matches(&self) -> MatchRepository {
        MatchRepository::new(self.connection.clone())
    }
}
