use anyhow::Result;
use async_trait::async_trait;
use darts_core::MatchResultSink;
use darts_types::MatchResult;
use sea_orm::DatabaseConnection;

use crate::repositories::MatchRepository;

/// Writes finished matches through a `MatchRepository`.
pub struct DatabaseResultSink {
    name: String,
    matches: MatchRepository,
}

impl DatabaseResultSink {
    pub fn new(name: impl Into<String>, db: DatabaseConnection) -> Self {
        Self {
            name: name.into(),
            matches: MatchRepository::new(db),
        }
    }
}

#[async_trait]
impl MatchResultSink for DatabaseResultSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn save(&self, result: &MatchResult) -> Result<()> {
        self.matches.save(result).await
    }
}
