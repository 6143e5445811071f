use darts_core::rules::{Countdown, FinishRule, Knockout, SuddenDeath};
use darts_core::{GameEvent, GameEventBus, GameEventHandler, Match, TurnRules};
use darts_types::{Player, ScoredThrow};
use std::sync::{Arc, Mutex};

/// Creates a guest player with the given name
pub fn create_test_player(name: &str) -> Player {
    Player::guest(name)
}

/// Creates `count` players named Player1, Player2, ...
pub fn create_roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|i| create_test_player(&format!("Player{}", i + 1)))
        .collect()
}

/// Creates a 301 match for Alice and Bob
pub fn create_standard_countdown() -> Match<Countdown> {
    create_countdown(301, FinishRule::Any, vec![create_test_player("Alice"), create_test_player("Bob")])
}

pub fn create_countdown(start: u32, finish: FinishRule, players: Vec<Player>) -> Match<Countdown> {
    let rules = Countdown::with_finish(start, finish, players.len()).unwrap();
    Match::new(players, rules).unwrap()
}

pub fn create_knockout(lives: u32, players: usize) -> Match<Knockout> {
    Match::new(create_roster(players), Knockout::new(lives, players).unwrap()).unwrap()
}

pub fn create_sudden_death(lives: u32, players: usize) -> Match<SuddenDeath> {
    Match::new(create_roster(players), SuddenDeath::new(lives, players).unwrap()).unwrap()
}

/// Records each dart then commits the turn
pub fn play_turn<R: TurnRules>(game: &mut Match<R>, darts: &[ScoredThrow]) {
    for dart in darts {
        game.record_throw(*dart);
    }
    game.save_turn();
}

/// Parses shorthand like "T20 T20 D16" into darts
pub fn visit(input: &str) -> Vec<ScoredThrow> {
    darts_types::parse_visit(input).unwrap()
}

/// Event collector for testing event emissions
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn bus(&self) -> GameEventBus {
        GameEventBus::new().with_handler(Box::new(self.clone()))
    }

    pub fn get_events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn last_event(&self) -> Option<GameEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl GameEventHandler for EventCollector {
    fn handle_event(&mut self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Asserts a seat's committed score
pub fn assert_score<R: TurnRules>(game: &Match<R>, seat: usize, expected: u32) {
    let actual = game.rules().score(seat);
    assert_eq!(
        actual, expected,
        "Expected seat {} to have {}, got {}",
        seat, expected, actual
    );
}
