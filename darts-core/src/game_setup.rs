use darts_types::{Difficulty, GameType, Player, SetupError};
use rand::Rng;

use crate::game_events::GameEventBus;
use crate::rules::{
    Countdown, FinishRule, HalveIt, Killer, KillerSettings, Knockout, RevealPolicy, SuddenDeath,
};
use crate::turn_engine::{Match, MatchControl};

/// Everything needed to pick and configure a game before the roster is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSettings {
    Countdown { starting_score: u32, finish: FinishRule },
    HalveIt { difficulty: Difficulty },
    Knockout { lives: u32 },
    Killer(KillerSettings),
    SuddenDeath { lives: u32, reveal: RevealPolicy },
}

impl MatchSettings {
    pub fn game_type(&self) -> GameType {
        match self {
            MatchSettings::Countdown { .. } => GameType::Countdown,
            MatchSettings::HalveIt { .. } => GameType::HalveIt,
            MatchSettings::Knockout { .. } => GameType::Knockout,
            MatchSettings::Killer(_) => GameType::Killer,
            MatchSettings::SuddenDeath { .. } => GameType::SuddenDeath,
        }
    }
}

pub fn start_match<G: Rng + ?Sized>(
    settings: &MatchSettings,
    players: Vec<Player>,
    rng: &mut G,
) -> Result<Box<dyn MatchControl>, SetupError> {
    start_match_with_events(settings, players, rng, GameEventBus::new())
}

/// Build the rules for `settings` and seat `players` in roster order.
pub fn start_match_with_events<G: Rng + ?Sized>(
    settings: &MatchSettings,
    players: Vec<Player>,
    rng: &mut G,
    events: GameEventBus,
) -> Result<Box<dyn MatchControl>, SetupError> {
    let seats = players.len();

    let game: Box<dyn MatchControl> = match settings {
        MatchSettings::Countdown {
            starting_score,
            finish,
        } => {
            let rules = Countdown::with_finish(*starting_score, *finish, seats)?;
            Box::new(Match::with_events(players, rules, events)?)
        }
        MatchSettings::HalveIt { difficulty } => {
            let rules = HalveIt::new(*difficulty, seats, rng);
            Box::new(Match::with_events(players, rules, events)?)
        }
        MatchSettings::Knockout { lives } => {
            let rules = Knockout::new(*lives, seats)?;
            Box::new(Match::with_events(players, rules, events)?)
        }
        MatchSettings::Killer(killer) => {
            let rules = Killer::new(*killer, seats, rng)?;
            Box::new(Match::with_events(players, rules, events)?)
        }
        MatchSettings::SuddenDeath { lives, reveal } => {
            let rules = SuddenDeath::with_reveal(*lives, *reveal, seats)?;
            Box::new(Match::with_events(players, rules, events)?)
        }
    };

    Ok(game)
}
