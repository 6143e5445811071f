use darts_types::{
    GameType, KillerAssignment, LifeChange, MatchMetadata, Player, ScoredThrow, SetupError,
    TurnOutcome,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::rules::knockout::last_standing;
use crate::turn_engine::{Resolution, TurnContext, TurnRules};

pub const KILLER_NUMBERS: usize = 20;

/// Which part of a number's segment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitRequirement {
    AnySegment,
    #[default]
    DoubleOnly,
}

impl HitRequirement {
    pub fn accepts(self, dart: &ScoredThrow) -> bool {
        match self {
            HitRequirement::AnySegment => !dart.is_miss() && !dart.is_bust(),
            HitRequirement::DoubleOnly => dart.is_double(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillerSettings {
    pub lives: u32,
    pub activation: HitRequirement,
    pub damage: HitRequirement,
}

impl Default for KillerSettings {
    fn default() -> Self {
        Self {
            lives: 3,
            activation: HitRequirement::DoubleOnly,
            damage: HitRequirement::DoubleOnly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Killer {
    settings: KillerSettings,
    numbers: Vec<u8>,
    killers: Vec<bool>,
    lives: Vec<u32>,
}

impl Killer {
    /// Deal every seat a distinct random number from 1 to 20.
    pub fn new<G: Rng + ?Sized>(
        settings: KillerSettings,
        seats: usize,
        rng: &mut G,
    ) -> Result<Self, SetupError> {
        if seats > KILLER_NUMBERS {
            return Err(SetupError::TooManyPlayers {
                max: KILLER_NUMBERS,
                actual: seats,
            });
        }
        let mut numbers: Vec<u8> = (1..=KILLER_NUMBERS as u8).collect();
        numbers.shuffle(rng);
        numbers.truncate(seats);
        Self::with_numbers(settings, numbers)
    }

    pub fn with_numbers(settings: KillerSettings, numbers: Vec<u8>) -> Result<Self, SetupError> {
        if settings.lives == 0 {
            return Err(SetupError::NoLives);
        }
        if let Some(bad) = numbers.iter().find(|n| !(1..=20).contains(*n)) {
            return Err(SetupError::InvalidAssignment(format!("{} is not a board number", bad)));
        }
        let unique: HashSet<_> = numbers.iter().collect();
        if unique.len() != numbers.len() {
            return Err(SetupError::InvalidAssignment("numbers must be distinct".to_string()));
        }

        let seats = numbers.len();
        Ok(Self {
            settings,
            numbers,
            killers: vec![false; seats],
            lives: vec![settings.lives; seats],
        })
    }

    pub fn number(&self, seat: usize) -> u8 {
        self.numbers[seat]
    }

    pub fn is_killer(&self, seat: usize) -> bool {
        self.killers[seat]
    }

    pub fn lives(&self, seat: usize) -> u32 {
        self.lives[seat]
    }

    fn owner_of(&self, number: u8) -> Option<usize> {
        self.numbers.iter().position(|n| *n == number)
    }

    fn take_life(&mut self, seat: usize, players: &[Player], changes: &mut Vec<LifeChange>) {
        let before = self.lives[seat];
        if before == 0 {
            return;
        }
        self.lives[seat] = before - 1;
        changes.push(LifeChange {
            player_id: players[seat].id,
            lives_before: before,
            lives_after: before - 1,
        });
    }
}

impl TurnRules for Killer {
    fn game_type(&self) -> GameType {
        GameType::Killer
    }

    fn min_players(&self) -> usize {
        2
    }

    fn seat_count(&self) -> usize {
        self.numbers.len()
    }

    fn score(&self, seat: usize) -> u32 {
        self.lives[seat]
    }

    fn is_eliminated(&self, seat: usize) -> bool {
        self.lives[seat] == 0
    }

    fn in_danger(&self, seat: usize) -> bool {
        self.lives[seat] == 1
    }

    fn resolve(&mut self, ctx: TurnContext<'_>) -> Resolution {
        let seat = ctx.seat;
        let before = self.lives[seat];
        let mut changes = Vec::new();
        let mut activated = false;

        for dart in ctx.darts {
            // Nothing after the thrower's own elimination or the last opponent's
            if self.lives[seat] == 0 || last_standing(&self.lives).is_some() {
                break;
            }
            let Some(owner) = dart.base().and_then(|base| self.owner_of(base)) else {
                continue;
            };

            if owner == seat {
                if !self.killers[seat] {
                    if self.settings.activation.accepts(dart) {
                        self.killers[seat] = true;
                        activated = true;
                    }
                } else if self.settings.damage.accepts(dart) {
                    self.take_life(seat, ctx.players, &mut changes);
                }
            } else if self.killers[seat] && self.settings.damage.accepts(dart) {
                self.take_life(owner, ctx.players, &mut changes);
            }
        }

        let after = self.lives[seat];
        let outcome = if after < before {
            TurnOutcome::LifeLost
        } else if activated {
            TurnOutcome::KillerActivated
        } else {
            TurnOutcome::Scored
        };

        Resolution::new(before, after, outcome)
            .with_life_changes(changes)
            .with_winner(last_standing(&self.lives))
    }

    fn metadata(&self, players: &[Player]) -> MatchMetadata {
        MatchMetadata::Killer {
            starting_lives: self.settings.lives,
            assignments: players
                .iter()
                .zip(&self.numbers)
                .map(|(player, number)| KillerAssignment {
                    player_id: player.id,
                    number: *number,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roster(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::guest(format!("P{}", i))).collect()
    }

    fn turn(rules: &mut Killer, players: &[Player], seat: usize, darts: &[ScoredThrow]) -> Resolution {
        rules.resolve(TurnContext { seat, players, darts })
    }

    #[test]
    fn test_random_numbers_are_distinct() {
        let rules = Killer::new(KillerSettings::default(), 20, &mut StdRng::seed_from_u64(5)).unwrap();
        let unique: HashSet<_> = (0..20).map(|s| rules.number(s)).collect();
        assert_eq!(unique.len(), 20);

        assert!(matches!(
            Killer::new(KillerSettings::default(), 21, &mut StdRng::seed_from_u64(5)),
            Err(SetupError::TooManyPlayers { max: 20, actual: 21 })
        ));
    }

    #[test]
    fn test_invalid_assignments() {
        let settings = KillerSettings::default();
        assert!(Killer::with_numbers(settings, vec![20, 20]).is_err());
        assert!(Killer::with_numbers(settings, vec![0, 5]).is_err());
        assert!(Killer::with_numbers(settings, vec![25, 5]).is_err());
    }

    #[test]
    fn test_activation_needs_a_double_by_default() {
        let players = roster(2);
        let mut rules = Killer::with_numbers(KillerSettings::default(), vec![20, 3]).unwrap();

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::single(20), ScoredThrow::triple(20)]);
        assert_eq!(resolution.outcome, TurnOutcome::Scored);
        assert!(!rules.is_killer(0));

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::double(20)]);
        assert_eq!(resolution.outcome, TurnOutcome::KillerActivated);
        assert!(rules.is_killer(0));
    }

    #[test]
    fn test_killer_takes_opponent_lives_in_the_same_turn() {
        let players = roster(3);
        let mut rules = Killer::with_numbers(KillerSettings::default(), vec![20, 3, 17]).unwrap();

        let resolution = turn(
            &mut rules,
            &players,
            0,
            &[ScoredThrow::double(20), ScoredThrow::double(3), ScoredThrow::double(17)],
        );
        assert_eq!(resolution.outcome, TurnOutcome::KillerActivated);
        assert_eq!(resolution.life_changes.len(), 2);
        assert_eq!(rules.lives(1), 2);
        assert_eq!(rules.lives(2), 2);
        assert_eq!(rules.lives(0), 3);
    }

    #[test]
    fn test_non_killer_cannot_damage() {
        let players = roster(2);
        let mut rules = Killer::with_numbers(KillerSettings::default(), vec![20, 3]).unwrap();
        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::double(3); 3]);
        assert!(resolution.life_changes.is_empty());
        assert_eq!(rules.lives(1), 3);
    }

    #[test]
    fn test_killer_hitting_own_number_loses_a_life() {
        let players = roster(2);
        let mut rules = Killer::with_numbers(KillerSettings::default(), vec![20, 3]).unwrap();
        turn(&mut rules, &players, 0, &[ScoredThrow::double(20)]);

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::double(20)]);
        assert_eq!(resolution.outcome, TurnOutcome::LifeLost);
        assert_eq!(resolution.score_after, 2);
        assert_eq!(resolution.life_changes[0].player_id, players[0].id);
    }

    #[test]
    fn test_any_segment_settings() {
        let players = roster(2);
        let settings = KillerSettings {
            lives: 1,
            activation: HitRequirement::AnySegment,
            damage: HitRequirement::AnySegment,
        };
        let mut rules = Killer::with_numbers(settings, vec![20, 3]).unwrap();

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::single(20), ScoredThrow::triple(3)]);
        assert!(rules.is_eliminated(1));
        assert_eq!(resolution.winner, Some(0));
    }

    #[test]
    fn test_darts_after_final_elimination_are_ignored() {
        let players = roster(2);
        let settings = KillerSettings { lives: 1, ..KillerSettings::default() };
        let mut rules = Killer::with_numbers(settings, vec![20, 3]).unwrap();
        rules.killers[0] = true;

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::double(3), ScoredThrow::double(20)]);
        assert_eq!(resolution.life_changes.len(), 1);
        assert_eq!(rules.lives(0), 1);
        assert_eq!(rules.lives(1), 0);
        assert_eq!(resolution.winner, Some(0));
    }

    #[test]
    fn test_darts_after_self_elimination_are_ignored() {
        let players = roster(3);
        let settings = KillerSettings { lives: 1, ..KillerSettings::default() };
        let mut rules = Killer::with_numbers(settings, vec![20, 3, 17]).unwrap();
        rules.killers[0] = true;

        let resolution = turn(&mut rules, &players, 0, &[ScoredThrow::double(20), ScoredThrow::double(3)]);
        assert_eq!(resolution.life_changes.len(), 1);
        assert_eq!(rules.lives(1), 1);
        assert_eq!(resolution.winner, None);
    }
}
