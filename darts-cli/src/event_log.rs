use darts_core::{GameEvent, GameEventHandler};
use tracing::{debug, info, warn};

/// Writes every match event to the log as JSON.
pub struct TracingEventLog;

impl GameEventHandler for TracingEventLog {
    fn handle_event(&mut self, event: GameEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize event for match {}: {}", event.match_id(), e);
                return;
            }
        };

        match event {
            GameEvent::MatchStarted { .. } | GameEvent::MatchCompleted { .. } => info!("{}", json),
            _ => debug!("{}", json),
        }
    }
}
