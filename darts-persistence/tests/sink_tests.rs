use darts_core::rules::Knockout;
use darts_core::{InMemoryResultStore, Match, ResultDispatcher, update_player_stats};
use darts_persistence::connection::connect_to_memory_database;
use darts_persistence::{DatabaseResultSink, MatchRepository, PlayerRepository};
use darts_types::{Player, ScoredThrow};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;

async fn finished_knockout(players: Vec<Player>) -> darts_types::MatchResult {
    let rules = Knockout::new(1, players.len()).unwrap();
    let mut game = Match::new(players, rules).unwrap();

    game.record_throw(ScoredThrow::triple(20));
    game.save_turn();
    game.record_throw(ScoredThrow::single(3));
    game.save_turn();

    assert!(game.is_complete());
    game.result().unwrap()
}

#[tokio::test]
async fn test_dispatch_to_database_and_memory() {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let profiles = PlayerRepository::new(db.clone());
    let mut roster = vec![
        profiles.find_or_create_guest("Alice").await.unwrap(),
        profiles.find_or_create_guest("Bob").await.unwrap(),
    ];
    let result = finished_knockout(roster.clone()).await;

    let memory = Arc::new(InMemoryResultStore::new());
    let dispatcher = ResultDispatcher::new()
        .with_sink(Arc::new(DatabaseResultSink::new("local", db.clone())))
        .with_sink(memory.clone());
    let report = dispatcher.dispatch(result.clone()).wait().await;
    assert!(report.all_saved(), "failed sinks: {:?}", report.failed);

    let stored = MatchRepository::new(db.clone())
        .find_by_id(result.match_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, result);
    assert_eq!(memory.len().await, 1);

    update_player_stats(&mut roster, &result);
    for player in &roster {
        profiles
            .record_match(player.id, result.is_winner(player.id))
            .await
            .unwrap();
    }

    let alice = profiles.find_by_name("Alice").await.unwrap().unwrap();
    assert_eq!((alice.wins, alice.losses), (1, 0));
    assert_eq!(roster[1].losses, 1);
    let board = profiles.get_leaderboard(5).await.unwrap();
    assert_eq!(board[0].player.display_name, "Alice");
}

#[tokio::test]
async fn test_unmigrated_database_fails_without_blocking_memory_sink() {
    // No migrations, so the insert fails
    let db = connect_to_memory_database().await.unwrap();
    let result = finished_knockout(vec![Player::guest("Alice"), Player::guest("Bob")]).await;

    let memory = Arc::new(InMemoryResultStore::new());
    let dispatcher = ResultDispatcher::new()
        .with_sink(Arc::new(DatabaseResultSink::new("remote", db)))
        .with_sink(memory.clone());
    let report = dispatcher.dispatch(result.clone()).wait().await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "remote");
    assert_eq!(memory.find(result.match_id).await, Some(result));
}
