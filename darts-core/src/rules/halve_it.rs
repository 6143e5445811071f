use darts_types::{Difficulty, GameType, HalveItTarget, MatchMetadata, Player, TurnOutcome};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::turn_engine::{DARTS_PER_TURN, Resolution, TurnContext, TurnRules};

pub const HALVE_IT_ROUNDS: usize = 6;

/// Six targets for a difficulty. Numbers never repeat within a match and the
/// bull is always the closing round.
pub fn generate_targets<G: Rng + ?Sized>(difficulty: Difficulty, rng: &mut G) -> Vec<HalveItTarget> {
    let mut numbers: Vec<u8> = (1..=20).collect();
    numbers.shuffle(rng);
    let mut numbers = numbers.into_iter();
    let mut next_number = || numbers.next().unwrap_or(20);

    let mut targets: Vec<HalveItTarget> = match difficulty {
        Difficulty::Easy => (0..5).map(|_| HalveItTarget::Number(next_number())).collect(),
        Difficulty::Medium => vec![
            HalveItTarget::Number(next_number()),
            HalveItTarget::Number(next_number()),
            HalveItTarget::Number(next_number()),
            HalveItTarget::Double(next_number()),
            HalveItTarget::Triple(next_number()),
        ],
        Difficulty::Hard => vec![
            HalveItTarget::Number(next_number()),
            HalveItTarget::Double(next_number()),
            HalveItTarget::Triple(next_number()),
            HalveItTarget::AnyDouble,
            HalveItTarget::AnyTriple,
        ],
    };
    targets.shuffle(rng);
    targets.push(HalveItTarget::Bullseye);
    targets
}

/// Hit the round's target or lose half your score.
#[derive(Debug, Clone)]
pub struct HalveIt {
    difficulty: Difficulty,
    targets: Vec<HalveItTarget>,
    round_index: usize,
    scores: Vec<u32>,
}

impl HalveIt {
    pub fn new<G: Rng + ?Sized>(difficulty: Difficulty, seats: usize, rng: &mut G) -> Self {
        Self::with_targets(difficulty, generate_targets(difficulty, rng), seats)
    }

    pub fn with_targets(difficulty: Difficulty, targets: Vec<HalveItTarget>, seats: usize) -> Self {
        Self {
            difficulty,
            targets,
            round_index: 0,
            scores: vec![0; seats],
        }
    }

    pub fn targets(&self) -> &[HalveItTarget] {
        &self.targets
    }

    pub fn current_target(&self) -> Option<HalveItTarget> {
        self.targets.get(self.round_index).copied()
    }

    /// First seat whose score beats everyone before it; ties favour the
    /// earlier seat.
    pub fn leader(&self) -> usize {
        let mut best = 0;
        for (seat, score) in self.scores.iter().enumerate() {
            if *score > self.scores[best] {
                best = seat;
            }
        }
        best
    }
}

impl TurnRules for HalveIt {
    fn game_type(&self) -> GameType {
        GameType::HalveIt
    }

    fn seat_count(&self) -> usize {
        self.scores.len()
    }

    fn score(&self, seat: usize) -> u32 {
        self.scores[seat]
    }

    fn round(&self) -> u32 {
        (self.round_index + 1).min(self.targets.len()) as u32
    }

    fn resolve(&mut self, ctx: TurnContext<'_>) -> Resolution {
        let before = self.scores[ctx.seat];
        let Some(target) = self.current_target() else {
            return Resolution::new(before, before, TurnOutcome::Scored)
                .with_winner(Some(self.leader()));
        };

        let hits: u32 = ctx.darts.iter().map(|d| target.points_for(d)).sum();
        let any_hit = ctx.darts.iter().any(|d| target.is_hit(d));
        let halved = ctx.darts.is_empty() || (!any_hit && ctx.darts.len() == DARTS_PER_TURN);

        let after = if halved { before.div_ceil(2) } else { before + hits };
        self.scores[ctx.seat] = after;

        if ctx.seat + 1 == self.scores.len() {
            self.round_index += 1;
        }

        let outcome = if halved { TurnOutcome::Halved } else { TurnOutcome::Scored };
        let winner = (self.round_index >= self.targets.len()).then(|| self.leader());
        Resolution::new(before, after, outcome).with_winner(winner)
    }

    fn metadata(&self, _players: &[Player]) -> MatchMetadata {
        MatchMetadata::HalveIt {
            difficulty: self.difficulty,
            targets: self.targets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darts_types::ScoredThrow;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn numbers_used(targets: &[HalveItTarget]) -> Vec<u8> {
        targets
            .iter()
            .filter_map(|t| match t {
                HalveItTarget::Number(n) | HalveItTarget::Double(n) | HalveItTarget::Triple(n) => {
                    Some(*n)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_generated_targets_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let targets = generate_targets(difficulty, &mut rng);
            assert_eq!(targets.len(), HALVE_IT_ROUNDS);
            assert_eq!(targets.last(), Some(&HalveItTarget::Bullseye));

            let numbers = numbers_used(&targets);
            let unique: HashSet<_> = numbers.iter().collect();
            assert_eq!(unique.len(), numbers.len());
            assert!(numbers.iter().all(|n| (1..=20).contains(n)));
        }
    }

    #[test]
    fn test_difficulty_mix() {
        let mut rng = StdRng::seed_from_u64(11);
        let easy = generate_targets(Difficulty::Easy, &mut rng);
        assert!(easy[..5].iter().all(|t| matches!(t, HalveItTarget::Number(_))));

        let hard = generate_targets(Difficulty::Hard, &mut rng);
        assert!(hard.contains(&HalveItTarget::AnyDouble));
        assert!(hard.contains(&HalveItTarget::AnyTriple));
    }

    #[test]
    fn test_same_seed_same_targets() {
        let a = generate_targets(Difficulty::Medium, &mut StdRng::seed_from_u64(3));
        let b = generate_targets(Difficulty::Medium, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_halving_rounds_up() {
        let mut rules = HalveIt::with_targets(Difficulty::Easy, vec![HalveItTarget::Number(20); 6], 2);
        rules.scores[0] = 41;
        let players = vec![Player::guest("A"), Player::guest("B")];
        let misses = [ScoredThrow::single(1); 3];

        let resolution = rules.resolve(TurnContext {
            seat: 0,
            players: &players,
            darts: &misses,
        });
        assert_eq!(resolution.score_after, 21);
        assert_eq!(resolution.outcome, TurnOutcome::Halved);
    }

    #[test]
    fn test_zero_stays_zero_when_halved() {
        let mut rules = HalveIt::with_targets(Difficulty::Easy, vec![HalveItTarget::Number(20); 6], 1);
        let players = vec![Player::guest("A")];
        let resolution = rules.resolve(TurnContext {
            seat: 0,
            players: &players,
            darts: &[ScoredThrow::miss(); 3],
        });
        assert_eq!(resolution.score_before, 0);
        assert_eq!(resolution.score_after, 0);
    }

    #[test]
    fn test_leader_prefers_earliest_seat_on_ties() {
        let mut rules = HalveIt::with_targets(Difficulty::Easy, vec![HalveItTarget::Number(20); 6], 3);
        rules.scores = vec![38, 50, 50];
        assert_eq!(rules.leader(), 1);

        rules.scores = vec![0, 0, 0];
        assert_eq!(rules.leader(), 0);
    }
}
