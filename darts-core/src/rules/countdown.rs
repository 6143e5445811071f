use darts_types::{GameType, MatchMetadata, Player, ScoredThrow, SetupError, TurnOutcome};

use crate::checkout::{Checkout, CheckoutAdvisor, MAX_CHECKOUT, MIN_CHECKOUT};
use crate::turn_engine::{Resolution, TurnContext, TurnRules};

pub const SUPPORTED_STARTING_SCORES: [u32; 2] = [301, 501];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishRule {
    /// Any dart that lands exactly on zero wins.
    #[default]
    Any,
    /// The winning dart must be a double or the inner bull.
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Checkout,
    Bust,
    Continue(u32),
}

/// Settle a visit against a remaining score.
pub fn settle(score_before: u32, darts: &[ScoredThrow], finish: FinishRule) -> Settlement {
    if darts.iter().any(|d| d.is_bust()) {
        return Settlement::Bust;
    }

    let total: u32 = darts.iter().map(|d| d.total()).sum();
    match score_before.checked_sub(total) {
        None | Some(1) => Settlement::Bust,
        Some(0) => {
            let finished_on_double = darts
                .iter()
                .rev()
                .find(|d| !d.is_miss())
                .is_some_and(|d| d.is_double());
            if finish == FinishRule::Double && !finished_on_double {
                Settlement::Bust
            } else {
                Settlement::Checkout
            }
        }
        Some(remaining) => Settlement::Continue(remaining),
    }
}

/// 301/501: race from the starting score down to exactly zero.
#[derive(Debug, Clone)]
pub struct Countdown {
    starting_score: u32,
    finish: FinishRule,
    remaining: Vec<u32>,
}

impl Countdown {
    pub fn new(starting_score: u32, seats: usize) -> Result<Self, SetupError> {
        Self::with_finish(starting_score, FinishRule::Any, seats)
    }

    pub fn with_finish(
        starting_score: u32,
        finish: FinishRule,
        seats: usize,
    ) -> Result<Self, SetupError> {
        if !SUPPORTED_STARTING_SCORES.contains(&starting_score) {
            return Err(SetupError::UnsupportedStartingScore(starting_score));
        }
        Ok(Self {
            starting_score,
            finish,
            remaining: vec![starting_score; seats],
        })
    }

    pub fn starting_score(&self) -> u32 {
        self.starting_score
    }

    pub fn remaining(&self, seat: usize) -> u32 {
        self.remaining[seat]
    }
}

impl TurnRules for Countdown {
    fn game_type(&self) -> GameType {
        GameType::Countdown
    }

    fn seat_count(&self) -> usize {
        self.remaining.len()
    }

    fn score(&self, seat: usize) -> u32 {
        self.remaining[seat]
    }

    fn ends_turn_on(&self, dart: &ScoredThrow) -> bool {
        dart.is_bust()
    }

    fn suggest_checkout(&self, seat: usize, darts: &[ScoredThrow]) -> Option<Checkout> {
        if darts.iter().any(|d| d.is_bust()) {
            return None;
        }
        let thrown: u32 = darts.iter().map(|d| d.total()).sum();
        let left = self.remaining[seat].checked_sub(thrown)?;
        let darts_left = crate::DARTS_PER_TURN.saturating_sub(darts.len());

        if darts_left == 0 || !(MIN_CHECKOUT..=MAX_CHECKOUT).contains(&left) {
            return None;
        }
        CheckoutAdvisor::suggest(left, darts_left)
    }

    fn resolve(&mut self, ctx: TurnContext<'_>) -> Resolution {
        let before = self.remaining[ctx.seat];

        match settle(before, ctx.darts, self.finish) {
            Settlement::Checkout => {
                self.remaining[ctx.seat] = 0;
                Resolution::new(before, 0, TurnOutcome::Scored).with_winner(Some(ctx.seat))
            }
            Settlement::Bust => Resolution::new(before, before, TurnOutcome::Bust),
            Settlement::Continue(after) => {
                self.remaining[ctx.seat] = after;
                Resolution::new(before, after, TurnOutcome::Scored)
            }
        }
    }

    fn metadata(&self, _players: &[Player]) -> MatchMetadata {
        MatchMetadata::Countdown {
            starting_score: self.starting_score,
            double_out: self.finish == FinishRule::Double,
        }
    }
}
