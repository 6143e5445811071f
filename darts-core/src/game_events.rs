use darts_types::{GameType, MatchId, PlayerId, ScoredThrow, TurnRecord};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    MatchStarted {
        match_id: MatchId,
        game_type: GameType,
        players: Vec<PlayerId>,
    },
    DartRecorded {
        match_id: MatchId,
        player_id: PlayerId,
        dart: ScoredThrow,
    },
    TurnCompleted {
        match_id: MatchId,
        record: TurnRecord,
    },
    Bust {
        match_id: MatchId,
        player_id: PlayerId,
    },
    PlayerEliminated {
        match_id: MatchId,
        player_id: PlayerId,
    },
    RoundAdvanced {
        match_id: MatchId,
        round: u32,
    },
    TurnUndone {
        match_id: MatchId,
        player_id: PlayerId,
    },
    MatchCompleted {
        match_id: MatchId,
        winner: Option<PlayerId>,
    },
}

impl GameEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            GameEvent::MatchStarted { match_id, .. } => *match_id,
            GameEvent::DartRecorded { match_id, .. } => *match_id,
            GameEvent::TurnCompleted { match_id, .. } => *match_id,
            GameEvent::Bust { match_id, .. } => *match_id,
            GameEvent::PlayerEliminated { match_id, .. } => *match_id,
            GameEvent::RoundAdvanced { match_id, .. } => *match_id,
            GameEvent::TurnUndone { match_id, .. } => *match_id,
            GameEvent::MatchCompleted { match_id, .. } => *match_id,
        }
    }
}

/// Receives match events: sound, haptics, rendering, analytics.
pub trait GameEventHandler: Send {
    fn handle_event(&mut self, event: GameEvent);
}

/// Simple event bus for distributing game events. Owned by a match and
/// populated by whoever composes the application.
pub struct GameEventBus {
    handlers: Vec<Box<dyn GameEventHandler>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with_handler(mut self, handler: Box<dyn GameEventHandler>) -> Self {
        self.add_handler(handler);
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&mut self, event: GameEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
