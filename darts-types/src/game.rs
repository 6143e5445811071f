use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::throws::{BULLSEYE, ScoredThrow};
use crate::{MatchId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Countdown,
    HalveIt,
    Knockout,
    Killer,
    SuddenDeath,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::Countdown => "Countdown",
            GameType::HalveIt => "Halve-It",
            GameType::Knockout => "Knockout",
            GameType::Killer => "Killer",
            GameType::SuddenDeath => "Sudden Death",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    InProgress,
    Completed,
}

/// Game-specific meaning of a closed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Scored,
    Bust,    // countdown: score left unchanged
    Halved,  // halve-it: missed the target
    LifeLost,
    KillerActivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LifeChange {
    pub player_id: PlayerId,
    pub lives_before: u32,
    pub lives_after: u32,
}

impl LifeChange {
    pub fn is_elimination(&self) -> bool {
        self.lives_before > 0 && self.lives_after == 0
    }
}

/// Closed log entry for one committed turn. `score_before`/`score_after`
/// hold points for scoring games and lives for elimination games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurnRecord {
    pub player_id: PlayerId,
    pub round: u32,
    pub throws: Vec<ScoredThrow>,
    pub turn_total: u32,
    pub score_before: u32,
    pub score_after: u32,
    pub outcome: TurnOutcome,
    pub life_changes: Vec<LifeChange>,
    pub timestamp: String, // ISO 8601 string
}

impl TurnRecord {
    pub fn is_bust(&self) -> bool {
        self.outcome == TurnOutcome::Bust
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// A Halve-It round target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum HalveItTarget {
    Number(u8),
    Double(u8),
    Triple(u8),
    AnyDouble,
    AnyTriple,
    Bullseye,
}

impl HalveItTarget {
    pub fn is_hit(&self, dart: &ScoredThrow) -> bool {
        match self {
            HalveItTarget::Number(n) => dart.hits_number(*n),
            HalveItTarget::Double(n) => dart.hits_number(*n) && dart.is_double(),
            HalveItTarget::Triple(n) => dart.hits_number(*n) && dart.is_triple(),
            HalveItTarget::AnyDouble => dart.is_double(),
            HalveItTarget::AnyTriple => dart.is_triple(),
            HalveItTarget::Bullseye => dart.is_bullseye(),
        }
    }

    /// Points a dart earns against this target; zero when it misses.
    pub fn points_for(&self, dart: &ScoredThrow) -> u32 {
        if self.is_hit(dart) { dart.total() } else { 0 }
    }
}

impl fmt::Display for HalveItTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalveItTarget::Number(n) => write!(f, "{}", n),
            HalveItTarget::Double(n) => write!(f, "Double {}", n),
            HalveItTarget::Triple(n) => write!(f, "Triple {}", n),
            HalveItTarget::AnyDouble => write!(f, "Any double"),
            HalveItTarget::AnyTriple => write!(f, "Any triple"),
            HalveItTarget::Bullseye => write!(f, "Bull ({})", BULLSEYE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KillerAssignment {
    pub player_id: PlayerId,
    pub number: u8,
}

/// Per-game settings kept with a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum MatchMetadata {
    Countdown {
        starting_score: u32,
        double_out: bool,
    },
    HalveIt {
        difficulty: Difficulty,
        targets: Vec<HalveItTarget>,
    },
    Knockout {
        starting_lives: u32,
    },
    Killer {
        starting_lives: u32,
        assignments: Vec<KillerAssignment>,
    },
    SuddenDeath {
        starting_lives: u32,
    },
}

/// Display row for the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub display_name: String,
    pub score: u32,
    pub is_current: bool,
    pub eliminated: bool,
    pub in_danger: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    pub display_name: String,
    pub final_score: u32,
    pub turns_taken: u32,
    pub eliminated: bool,
}

/// Immutable summary of a finished match, handed to the persistence sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub game_type: GameType,
    pub players: Vec<PlayerResult>,
    pub turns: Vec<TurnRecord>,
    pub winner: Option<PlayerId>,
    pub started_at: String,
    pub finished_at: String,
    pub metadata: MatchMetadata,
}

impl MatchResult {
    pub fn is_winner(&self, player_id: PlayerId) -> bool {
        self.winner == Some(player_id)
    }

    pub fn participated(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halve_it_target_predicates() {
        let d20 = ScoredThrow::double(20);
        let t19 = ScoredThrow::triple(19);
        let s5 = ScoredThrow::single(5);

        assert!(HalveItTarget::Double(20).is_hit(&d20));
        assert!(!HalveItTarget::Double(20).is_hit(&ScoredThrow::single(20)));
        assert!(HalveItTarget::Number(5).is_hit(&s5));
        assert!(HalveItTarget::Number(19).is_hit(&t19));
        assert!(HalveItTarget::AnyTriple.is_hit(&t19));
        assert!(!HalveItTarget::AnyDouble.is_hit(&t19));
        assert!(HalveItTarget::Bullseye.is_hit(&ScoredThrow::outer_bull()));
        assert!(HalveItTarget::Bullseye.is_hit(&ScoredThrow::inner_bull()));
        assert!(!HalveItTarget::Bullseye.is_hit(&ScoredThrow::Bust));
    }

    #[test]
    fn test_points_for_uses_dart_score() {
        assert_eq!(HalveItTarget::Number(19).points_for(&ScoredThrow::triple(19)), 57);
        assert_eq!(HalveItTarget::Double(20).points_for(&ScoredThrow::triple(20)), 0);
        assert_eq!(HalveItTarget::Bullseye.points_for(&ScoredThrow::inner_bull()), 50);
    }

    #[test]
    fn test_life_change_elimination() {
        let id = uuid::Uuid::new_v4();
        let lost = LifeChange { player_id: id, lives_before: 2, lives_after: 1 };
        let out = LifeChange { player_id: id, lives_before: 1, lives_after: 0 };
        assert!(!lost.is_elimination());
        assert!(out.is_elimination());
    }

    #[test]
    fn test_metadata_serialization_is_tagged() {
        let metadata = MatchMetadata::Countdown { starting_score: 501, double_out: false };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["game"], "countdown");
        assert_eq!(json["starting_score"], 501);
    }
}
