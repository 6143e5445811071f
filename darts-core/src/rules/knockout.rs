use darts_types::{GameType, LifeChange, MatchMetadata, Player, SetupError, TurnOutcome};

use crate::turn_engine::{Resolution, TurnContext, TurnRules};

/// Seat left standing once every other seat is out of lives.
pub(crate) fn last_standing(lives: &[u32]) -> Option<usize> {
    let mut alive = lives.iter().enumerate().filter(|(_, l)| **l > 0);
    match (alive.next(), alive.next()) {
        (Some((seat, _)), None) => Some(seat),
        _ => None,
    }
}

/// Beat the score to beat or lose a life.
#[derive(Debug, Clone)]
pub struct Knockout {
    starting_lives: u32,
    lives: Vec<u32>,
    score_to_beat: Option<u32>,
}

impl Knockout {
    pub fn new(starting_lives: u32, seats: usize) -> Result<Self, SetupError> {
        if starting_lives == 0 {
            return Err(SetupError::NoLives);
        }
        Ok(Self {
            starting_lives,
            lives: vec![starting_lives; seats],
            score_to_beat: None,
        })
    }

    pub fn score_to_beat(&self) -> Option<u32> {
        self.score_to_beat
    }

    pub fn lives(&self, seat: usize) -> u32 {
        self.lives[seat]
    }
}

impl TurnRules for Knockout {
    fn game_type(&self) -> GameType {
        GameType::Knockout
    }

    fn min_players(&self) -> usize {
        2
    }

    fn seat_count(&self) -> usize {
        self.lives.len()
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
        let before = self.lives[ctx.seat];
        let total = ctx.total();

        // The first turn of the match always sets the bar
        let beaten = self.score_to_beat.is_none_or(|bar| total > bar);
        if beaten {
            self.score_to_beat = Some(total);
            return Resolution::new(before, before, TurnOutcome::Scored);
        }

        let after = before.saturating_sub(1);
        self.lives[ctx.seat] = after;
        let change = LifeChange {
            player_id: ctx.players[ctx.seat].id,
            lives_before: before,
            lives_after: after,
        };

        Resolution::new(before, after, TurnOutcome::LifeLost)
            .with_life_changes(vec![change])
            .with_winner(last_standing(&self.lives))
    }

    fn metadata(&self, _players: &[Player]) -> MatchMetadata {
        MatchMetadata::Knockout {
            starting_lives: self.starting_lives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darts_types::ScoredThrow;

    fn resolve(rules: &mut Knockout, players: &[Player], seat: usize, darts: &[ScoredThrow]) -> Resolution {
        rules.resolve(TurnContext { seat, players, darts })
    }

    #[test]
    fn test_first_turn_sets_the_bar() {
        let players = vec![Player::guest("A"), Player::guest("B")];
        let mut rules = Knockout::new(3, 2).unwrap();

        let resolution = resolve(&mut rules, &players, 0, &[ScoredThrow::miss()]);
        assert_eq!(resolution.outcome, TurnOutcome::Scored);
        assert_eq!(rules.score_to_beat(), Some(0));
    }

    #[test]
    fn test_matching_the_bar_costs_a_life() {
        let players = vec![Player::guest("A"), Player::guest("B")];
        let mut rules = Knockout::new(3, 2).unwrap();
        rules.score_to_beat = Some(60);

        let resolution = resolve(&mut rules, &players, 1, &[ScoredThrow::triple(20)]);
        assert_eq!(resolution.outcome, TurnOutcome::LifeLost);
        assert_eq!(resolution.score_after, 2);
        assert_eq!(rules.score_to_beat(), Some(60));

        let resolution = resolve(&mut rules, &players, 0, &[ScoredThrow::triple(20), ScoredThrow::single(1)]);
        assert_eq!(resolution.outcome, TurnOutcome::Scored);
        assert_eq!(rules.score_to_beat(), Some(61));
    }

    #[test]
    fn test_last_life_ends_the_match() {
        let players = vec![Player::guest("A"), Player::guest("B")];
        let mut rules = Knockout::new(1, 2).unwrap();
        rules.score_to_beat = Some(100);

        let resolution = resolve(&mut rules, &players, 0, &[ScoredThrow::single(20)]);
        assert!(resolution.life_changes[0].is_elimination());
        assert_eq!(resolution.winner, Some(1));
        assert!(rules.is_eliminated(0));
    }

    #[test]
    fn test_zero_lives_rejected() {
        assert_eq!(Knockout::new(0, 2).unwrap_err(), SetupError::NoLives);
    }

    #[test]
    fn test_last_standing() {
        assert_eq!(last_standing(&[0, 2, 0]), Some(1));
        assert_eq!(last_standing(&[1, 2, 0]), None);
        assert_eq!(last_standing(&[0, 0]), None);
    }
}
