use darts_core::{DispatchReport, ResultDispatcher, update_player_stats};
use darts_persistence::PlayerRepository;
use darts_types::{MatchResult, Player};
use tracing::{info, warn};

/// Hand a finished match to every sink and update win/loss records.
/// Sink and profile failures are logged and never abort the caller.
pub async fn record_result(
    dispatcher: &ResultDispatcher,
    profiles: Option<&PlayerRepository>,
    roster: &mut [Player],
    result: &MatchResult,
) -> DispatchReport {
    let report = dispatcher.dispatch(result.clone()).wait().await;
    for (sink, error) in &report.failed {
        warn!("Result for match {} not stored in {}: {}", result.match_id, sink, error);
    }
    if !report.saved.is_empty() {
        info!("Match {} stored in {}", result.match_id, report.saved.join(", "));
    }

    update_player_stats(roster, result);

    if let Some(profiles) = profiles {
        for player in roster.iter().filter(|p| result.participated(p.id)) {
            if let Err(e) = profiles
                .record_match(player.id, result.is_winner(player.id))
                .await
            {
                warn!("Failed to update record for {}: {}", player.label(), e);
            }
        }
    }

    report
}
