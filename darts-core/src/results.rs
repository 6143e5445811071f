use anyhow::Result;
use async_trait::async_trait;
use darts_types::{MatchId, MatchResult, Player};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Somewhere a finished match gets written to.
#[async_trait]
pub trait MatchResultSink: Send + Sync {
    fn name(&self) -> &str;

    async fn save(&self, result: &MatchResult) -> Result<()>;
}

/// Per-sink outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub saved: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    pub fn all_saved(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Pending saves for one result. Dropping it leaves the saves running.
pub struct DispatchHandle {
    tasks: Vec<(String, JoinHandle<Result<()>>)>,
}

impl DispatchHandle {
    pub async fn wait(self) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (name, task) in self.tasks {
            match task.await {
                Ok(Ok(())) => report.saved.push(name),
                Ok(Err(e)) => report.failed.push((name, e.to_string())),
                Err(e) => report.failed.push((name, format!("save task panicked: {}", e))),
            }
        }
        report
    }
}

#[derive(Clone, Default)]
pub struct ResultDispatcher {
    sinks: Vec<Arc<dyn MatchResultSink>>,
}

impl ResultDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn MatchResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn MatchResultSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Hand the result to every sink on its own task. A failing sink is
    /// logged and never affects the others. Must be called inside a tokio
    /// runtime.
    pub fn dispatch(&self, result: MatchResult) -> DispatchHandle {
        let result = Arc::new(result);
        let tasks = self
            .sinks
            .iter()
            .map(|sink| {
                let sink = Arc::clone(sink);
                let result = Arc::clone(&result);
                let name = sink.name().to_string();
                let task = tokio::spawn(async move {
                    let outcome = sink.save(&result).await;
                    match &outcome {
                        Ok(()) => debug!("Saved match {} to {}", result.match_id, sink.name()),
                        Err(e) => warn!(
                            "Failed to save match {} to {}: {}",
                            result.match_id,
                            sink.name(),
                            e
                        ),
                    }
                    outcome
                });
                (name, task)
            })
            .collect();

        DispatchHandle { tasks }
    }
}

/// Keeps finished matches in memory, newest last.
#[derive(Default)]
pub struct InMemoryResultStore {
    results: RwLock<Vec<MatchResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<MatchResult> {
        self.results.read().await.clone()
    }

    pub async fn find(&self, match_id: MatchId) -> Option<MatchResult> {
        self.results
            .read()
            .await
            .iter()
            .find(|r| r.match_id == match_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }
}

#[async_trait]
impl MatchResultSink for InMemoryResultStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, result: &MatchResult) -> Result<()> {
        let mut results = self.results.write().await;
        // Saving the same match twice replaces the earlier copy
        results.retain(|r| r.match_id != result.match_id);
        results.push(result.clone());
        Ok(())
    }
}

/// Apply a finished match to the roster's win/loss counters. Players that
/// did not take part are left alone.
pub fn update_player_stats(players: &mut [Player], result: &MatchResult) {
    for player in players.iter_mut().filter(|p| result.participated(p.id)) {
        if result.is_winner(player.id) {
            player.record_win();
        } else {
            player.record_loss();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use darts_types::{GameType, MatchMetadata, PlayerResult};
    use uuid::Uuid;

    struct FailingSink;

    #[async_trait]
    impl MatchResultSink for FailingSink {
        fn name(&self) -> &str {
            "broken"
        }

        async fn save(&self, _result: &MatchResult) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn finished(players: &[Player], winner: usize) -> MatchResult {
        MatchResult {
            match_id: Uuid::new_v4(),
            game_type: GameType::Countdown,
            players: players
                .iter()
                .map(|p| PlayerResult {
                    player_id: p.id,
                    display_name: p.display_name.clone(),
                    final_score: 0,
                    turns_taken: 1,
                    eliminated: false,
                })
                .collect(),
            turns: Vec::new(),
            winner: Some(players[winner].id),
            started_at: "2024-01-01T00:00:00+00:00".to_string(),
            finished_at: "2024-01-01T00:10:00+00:00".to_string(),
            metadata: MatchMetadata::Countdown {
                starting_score: 301,
                double_out: false,
            },
        }
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let store = Arc::new(InMemoryResultStore::new());
        let dispatcher = ResultDispatcher::new()
            .with_sink(Arc::new(FailingSink))
            .with_sink(store.clone());

        let players = vec![Player::guest("A"), Player::guest("B")];
        let result = finished(&players, 0);
        let report = dispatcher.dispatch(result.clone()).wait().await;

        assert_eq!(report.saved, vec!["memory".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert!(!report.all_saved());
        assert_eq!(store.find(result.match_id).await, Some(result));
    }

    #[tokio::test]
    async fn test_saving_twice_keeps_one_copy() {
        let store = InMemoryResultStore::new();
        let players = vec![Player::guest("A")];
        let result = finished(&players, 0);
        store.save(&result).await.unwrap();
        store.save(&result).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_no_sinks_is_an_empty_report() {
        let players = vec![Player::guest("A")];
        let report = ResultDispatcher::new().dispatch(finished(&players, 0)).wait().await;
        assert!(report.all_saved());
        assert!(report.saved.is_empty());
    }

    #[test]
    fn test_update_player_stats() {
        let mut players = vec![Player::guest("A"), Player::guest("B"), Player::guest("Bench")];
        let result = finished(&players[..2], 1);
        update_player_stats(&mut players, &result);

        assert_eq!((players[0].wins, players[0].losses), (0, 1));
        assert_eq!((players[1].wins, players[1].losses), (1, 0));
        assert_eq!(players[2].games_played(), 0);
    }
}
