use chrono::Utc;
use darts_types::{
    GameType, LifeChange, MatchId, MatchMetadata, MatchResult, MatchStatus, Player,
    PlayerResult, PlayerStanding, ScoredThrow, SetupError, TurnOutcome, TurnRecord,
};
use std::collections::HashSet;
use std::fmt::Debug;
use tracing::{debug, info};
use uuid::Uuid;

use crate::checkout::Checkout;
use crate::{GameEvent, GameEventBus};

pub const DARTS_PER_TURN: usize = 3;

/// Darts entered for the active player but not yet committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrowBuffer {
    darts: Vec<ScoredThrow>,
    selected: Option<usize>,
}

impl ThrowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_accept(&self) -> bool {
        self.selected.is_some() || self.darts.len() < DARTS_PER_TURN
    }

    /// Replace the selected dart, or append when there is room.
    pub fn record(&mut self, dart: ScoredThrow) -> bool {
        if let Some(index) = self.selected.take() {
            self.darts[index] = dart;
            return true;
        }
        if self.darts.len() >= DARTS_PER_TURN {
            return false;
        }
        self.darts.push(dart);
        true
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.darts.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn darts(&self) -> &[ScoredThrow] {
        &self.darts
    }

    pub fn total(&self) -> u32 {
        self.darts.iter().map(|d| d.total()).sum()
    }

    pub fn len(&self) -> usize {
        self.darts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.darts.is_empty()
    }

    pub fn remaining(&self) -> usize {
        DARTS_PER_TURN - self.darts.len()
    }

    pub fn clear(&mut self) {
        self.darts.clear();
        self.selected = None;
    }
}

/// What the rules see when a turn is committed.
pub struct TurnContext<'a> {
    pub seat: usize,
    pub players: &'a [Player],
    pub darts: &'a [ScoredThrow],
}

impl TurnContext<'_> {
    pub fn total(&self) -> u32 {
        self.darts.iter().map(|d| d.total()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub score_before: u32,
    pub score_after: u32,
    pub outcome: TurnOutcome,
    pub life_changes: Vec<LifeChange>,
    /// Seat that won the match with this turn, if any.
    pub winner: Option<usize>,
}

impl Resolution {
    pub fn new(score_before: u32, score_after: u32, outcome: TurnOutcome) -> Self {
        Self {
            score_before,
            score_after,
            outcome,
            life_changes: Vec::new(),
            winner: None,
        }
    }

    pub fn with_life_changes(mut self, life_changes: Vec<LifeChange>) -> Self {
        self.life_changes = life_changes;
        self
    }

    pub fn with_winner(mut self, winner: Option<usize>) -> Self {
        self.winner = winner;
        self
    }
}

/// Game-specific half of a match. The shared core owns the roster, buffer,
/// rotation, history and undo; rules own scores and decide each turn.
pub trait TurnRules: Clone + Debug + Send {
    fn game_type(&self) -> GameType;

    fn min_players(&self) -> usize {
        1
    }

    fn seat_count(&self) -> usize;

    /// Committed score (or lives) for a seat.
    fn score(&self, seat: usize) -> u32;

    /// Value shown on the scoreboard; may lag `score` when reveals are deferred.
    fn display_score(&self, seat: usize) -> u32 {
        self.score(seat)
    }

    fn is_eliminated(&self, _seat: usize) -> bool {
        false
    }

    /// Elimination as the scoreboard shows it; follows `display_score`.
    fn shows_eliminated(&self, seat: usize) -> bool {
        self.is_eliminated(seat)
    }

    /// Down to a last life, as currently shown.
    fn in_danger(&self, _seat: usize) -> bool {
        false
    }

    /// Whether the seat takes part in rotation right now.
    fn is_active(&self, seat: usize) -> bool {
        !self.is_eliminated(seat)
    }

    fn round(&self) -> u32 {
        1
    }

    /// A dart that closes the turn as soon as it is entered.
    fn ends_turn_on(&self, _dart: &ScoredThrow) -> bool {
        false
    }

    fn suggest_checkout(&self, _seat: usize, _darts: &[ScoredThrow]) -> Option<Checkout> {
        None
    }

    fn on_turn_start(&mut self, _seat: usize) {}

    fn on_match_end(&mut self) {}

    fn resolve(&mut self, ctx: TurnContext<'_>) -> Resolution;

    fn metadata(&self, players: &[Player]) -> MatchMetadata;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowFeedback {
    pub accepted: bool,
    pub running_total: u32,
    pub darts_remaining: usize,
    pub current_score: u32,
    pub checkout: Option<Checkout>,
    pub completed_turn: Option<TurnRecord>,
}

#[derive(Debug, Clone)]
struct UndoPoint<R> {
    rules: R,
    seat: usize,
}

pub fn validate_roster(
    players: &[Player],
    min_players: usize,
    game_type: GameType,
) -> Result<(), SetupError> {
    if players.is_empty() {
        return Err(SetupError::EmptyRoster);
    }
    if players.len() < min_players {
        return Err(SetupError::NotEnoughPlayers {
            game: game_type.to_string(),
            required: min_players,
            actual: players.len(),
        });
    }

    let mut seen = HashSet::new();
    for player in players {
        if !seen.insert(player.id) {
            return Err(SetupError::DuplicatePlayer(player.id));
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct Match<R: TurnRules> {
    id: MatchId,
    players: Vec<Player>,
    current: usize,
    buffer: ThrowBuffer,
    history: Vec<TurnRecord>,
    winner: Option<usize>,
    status: MatchStatus,
    rules: R,
    undo: Option<UndoPoint<R>>,
    turn_started: bool,
    events: GameEventBus,
    started_at: String,
    finished_at: Option<String>,
}

impl<R: TurnRules> Match<R> {
    pub fn new(players: Vec<Player>, rules: R) -> Result<Self, SetupError> {
        Self::with_events(players, rules, GameEventBus::new())
    }

    pub fn with_events(
        players: Vec<Player>,
        rules: R,
        events: GameEventBus,
    ) -> Result<Self, SetupError> {
        validate_roster(&players, rules.min_players(), rules.game_type())?;
        if rules.seat_count() != players.len() {
            return Err(SetupError::RosterMismatch {
                expected: rules.seat_count(),
                actual: players.len(),
            });
        }

        let mut game = Self {
            id: Uuid::new_v4(),
            players,
            current: 0,
            buffer: ThrowBuffer::new(),
            history: Vec::new(),
            winner: None,
            status: MatchStatus::InProgress,
            rules,
            undo: None,
            turn_started: false,
            events,
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
        };

        info!(
            "Started {} match {} with {} players",
            game.rules.game_type(),
            game.id,
            game.players.len()
        );
        game.events.publish(GameEvent::MatchStarted {
            match_id: game.id,
            game_type: game.rules.game_type(),
            players: game.players.iter().map(|p| p.id).collect(),
        });

        Ok(game)
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn game_type(&self) -> GameType {
        self.rules.game_type()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_seat(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn round(&self) -> u32 {
        self.rules.round()
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut R {
        &mut self.rules
    }

    pub fn events_mut(&mut self) -> &mut GameEventBus {
        &mut self.events
    }

    pub fn buffer(&self) -> &ThrowBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|seat| &self.players[seat])
    }

    pub fn can_undo(&self) -> bool {
        !self.is_complete() && self.undo.is_some()
    }

    /// Record one dart for the active player. Ignored once the buffer is full
    /// (and nothing is selected for edit) or the match is over.
    pub fn record_throw(&mut self, dart: ScoredThrow) -> ThrowFeedback {
        if self.is_complete() || !self.buffer.can_accept() {
            return self.feedback(false, None);
        }

        self.start_turn();
        self.buffer.record(dart);
        self.events.publish(GameEvent::DartRecorded {
            match_id: self.id,
            player_id: self.players[self.current].id,
            dart,
        });

        if self.rules.ends_turn_on(&dart) {
            let record = self.save_turn();
            return self.feedback(true, record);
        }

        self.feedback(true, None)
    }

    pub fn select_dart(&mut self, index: usize) -> bool {
        !self.is_complete() && self.buffer.select(index)
    }

    pub fn checkout_hint(&self) -> Option<Checkout> {
        if self.is_complete() {
            return None;
        }
        self.rules.suggest_checkout(self.current, self.buffer.darts())
    }

    /// Commit the buffered darts as the active player's turn.
    pub fn save_turn(&mut self) -> Option<TurnRecord> {
        if self.is_complete() {
            return None;
        }

        self.start_turn();
        let seat = self.current;
        let round = self.rules.round();
        let snapshot = self.rules.clone();
        let darts = self.buffer.darts().to_vec();

        let resolution = self.rules.resolve(TurnContext {
            seat,
            players: &self.players,
            darts: &darts,
        });

        let record = TurnRecord {
            player_id: self.players[seat].id,
            round,
            turn_total: darts.iter().map(|d| d.total()).sum(),
            throws: darts,
            score_before: resolution.score_before,
            score_after: resolution.score_after,
            outcome: resolution.outcome,
            life_changes: resolution.life_changes,
            timestamp: Utc::now().to_rfc3339(),
        };

        debug!(
            "Match {}: {} scored {} ({:?}) {} -> {}",
            self.id,
            self.players[seat].display_name,
            record.turn_total,
            record.outcome,
            record.score_before,
            record.score_after
        );

        self.history.push(record.clone());
        self.buffer.clear();
        self.turn_started = false;
        self.publish_turn(&record);

        match resolution.winner {
            Some(winner) => {
                self.undo = None;
                self.finish(winner);
            }
            None => {
                self.undo = Some(UndoPoint {
                    rules: snapshot,
                    seat,
                });
                self.advance();
                if self.rules.round() != round {
                    self.events.publish(GameEvent::RoundAdvanced {
                        match_id: self.id,
                        round: self.rules.round(),
                    });
                }
            }
        }

        Some(record)
    }

    /// Revert the most recent committed turn. Single level: a second call
    /// without a new turn in between does nothing.
    pub fn undo_last_turn(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        let Some(point) = self.undo.take() else {
            return false;
        };

        self.rules = point.rules;
        self.current = point.seat;
        self.buffer.clear();
        self.turn_started = false;

        if let Some(record) = self.history.pop() {
            debug!("Match {}: undid turn by {}", self.id, record.player_id);
            self.events.publish(GameEvent::TurnUndone {
                match_id: self.id,
                player_id: record.player_id,
            });
        }
        true
    }

    pub fn standings(&self) -> Vec<PlayerStanding> {
        self.players
            .iter()
            .enumerate()
            .map(|(seat, player)| PlayerStanding {
                player_id: player.id,
                display_name: player.label().to_string(),
                score: self.rules.display_score(seat),
                is_current: !self.is_complete() && seat == self.current,
                eliminated: self.rules.shows_eliminated(seat),
                in_danger: self.rules.in_danger(seat),
            })
            .collect()
    }

    pub fn result(&self) -> Option<MatchResult> {
        let finished_at = self.finished_at.clone()?;

        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| PlayerResult {
                player_id: player.id,
                display_name: player.display_name.clone(),
                final_score: self.rules.score(seat),
                turns_taken: self
                    .history
                    .iter()
                    .filter(|turn| turn.player_id == player.id)
                    .count() as u32,
                eliminated: self.rules.is_eliminated(seat),
            })
            .collect();

        Some(MatchResult {
            match_id: self.id,
            game_type: self.rules.game_type(),
            players,
            turns: self.history.clone(),
            winner: self.winner().map(|p| p.id),
            started_at: self.started_at.clone(),
            finished_at,
            metadata: self.rules.metadata(&self.players),
        })
    }

    fn start_turn(&mut self) {
        if !self.turn_started {
            self.turn_started = true;
            self.rules.on_turn_start(self.current);
        }
    }

    fn publish_turn(&mut self, record: &TurnRecord) {
        self.events.publish(GameEvent::TurnCompleted {
            match_id: self.id,
            record: record.clone(),
        });
        if record.is_bust() {
            self.events.publish(GameEvent::Bust {
                match_id: self.id,
                player_id: record.player_id,
            });
        }
        for change in record.life_changes.iter().filter(|c| c.is_elimination()) {
            info!("Match {}: player {} eliminated", self.id, change.player_id);
            self.events.publish(GameEvent::PlayerEliminated {
                match_id: self.id,
                player_id: change.player_id,
            });
        }
    }

    // Next seat in rotation order that the rules consider active.
    fn advance(&mut self) {
        let count = self.players.len();
        for step in 1..=count {
            let seat = (self.current + step) % count;
            if self.rules.is_active(seat) {
                self.current = seat;
                return;
            }
        }
    }

    fn finish(&mut self, winner: usize) {
        self.winner = Some(winner);
        self.status = MatchStatus::Completed;
        self.finished_at = Some(Utc::now().to_rfc3339());
        self.rules.on_match_end();

        info!(
            "Match {} finished after {} turns, winner {}",
            self.id,
            self.history.len(),
            self.players[winner].display_name
        );
        self.events.publish(GameEvent::MatchCompleted {
            match_id: self.id,
            winner: Some(self.players[winner].id),
        });
    }

    fn feedback(&self, accepted: bool, completed_turn: Option<TurnRecord>) -> ThrowFeedback {
        let checkout = if completed_turn.is_some() {
            None
        } else {
            self.checkout_hint()
        };

        ThrowFeedback {
            accepted,
            running_total: self.buffer.total(),
            darts_remaining: self.buffer.remaining(),
            current_score: self.rules.display_score(self.current),
            checkout,
            completed_turn,
        }
    }
}

/// Object-safe view of a match, for callers that pick the game at runtime.
pub trait MatchControl: Send {
    fn id(&self) -> MatchId;
    fn game_type(&self) -> GameType;
    fn players(&self) -> &[Player];
    fn current_player(&self) -> &Player;
    fn round(&self) -> u32;
    fn record_throw(&mut self, dart: ScoredThrow) -> ThrowFeedback;
    fn select_dart(&mut self, index: usize) -> bool;
    fn save_turn(&mut self) -> Option<TurnRecord>;
    fn undo_last_turn(&mut self) -> bool;
    fn pending_darts(&self) -> &[ScoredThrow];
    fn checkout_hint(&self) -> Option<Checkout>;
    fn standings(&self) -> Vec<PlayerStanding>;
    fn history(&self) -> &[TurnRecord];
    fn winner(&self) -> Option<&Player>;
    fn is_complete(&self) -> bool;
    fn result(&self) -> Option<MatchResult>;
    fn events_mut(&mut self) -> &mut GameEventBus;
}

impl<R: TurnRules> MatchControl for Match<R> {
    fn id(&self) -> MatchId {
        Match::id(self)
    }

    fn game_type(&self) -> GameType {
        Match::game_type(self)
    }

    fn players(&self) -> &[Player] {
        Match::players(self)
    }

    fn current_player(&self) -> &Player {
        Match::current_player(self)
    }

    fn round(&self) -> u32 {
        Match::round(self)
    }

    fn record_throw(&mut self, dart: ScoredThrow) -> ThrowFeedback {
        Match::record_throw(self, dart)
    }

    fn select_dart(&mut self, index: usize) -> bool {
        Match::select_dart(self, index)
    }

    fn save_turn(&mut self) -> Option<TurnRecord> {
        Match::save_turn(self)
    }

    fn undo_last_turn(&mut self) -> bool {
        Match::undo_last_turn(self)
    }

    fn pending_darts(&self) -> &[ScoredThrow] {
        self.buffer.darts()
    }

    fn checkout_hint(&self) -> Option<Checkout> {
        Match::checkout_hint(self)
    }

    fn standings(&self) -> Vec<PlayerStanding> {
        Match::standings(self)
    }

    fn history(&self) -> &[TurnRecord] {
        Match::history(self)
    }

    fn winner(&self) -> Option<&Player> {
        Match::winner(self)
    }

    fn is_complete(&self) -> bool {
        Match::is_complete(self)
    }

    fn result(&self) -> Option<MatchResult> {
        Match::result(self)
    }

    fn events_mut(&mut self) -> &mut GameEventBus {
        Match::events_mut(self)
    }
}
