use darts_types::{GameType, LifeChange, MatchMetadata, Player, SetupError, TurnOutcome};

use crate::rules::knockout::last_standing;
use crate::turn_engine::{Resolution, TurnContext, TurnRules};

/// When life losses from a resolved round reach the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPolicy {
    /// Publish as soon as the round resolves.
    #[default]
    Immediate,
    /// Hold until the first dart of the next round.
    NextRound,
}

/// Lowest total of each round loses a life. Ties all lose.
#[derive(Debug, Clone)]
pub struct SuddenDeath {
    starting_lives: u32,
    reveal: RevealPolicy,
    lives: Vec<u32>,
    shown_lives: Vec<u32>,
    round_scores: Vec<Option<u32>>,
    round: u32,
    pending_reveal: bool,
}

impl SuddenDeath {
    pub fn new(starting_lives: u32, seats: usize) -> Result<Self, SetupError> {
        Self::with_reveal(starting_lives, RevealPolicy::Immediate, seats)
    }

    pub fn with_reveal(
        starting_lives: u32,
        reveal: RevealPolicy,
        seats: usize,
    ) -> Result<Self, SetupError> {
        if starting_lives == 0 {
            return Err(SetupError::NoLives);
        }
        Ok(Self {
            starting_lives,
            reveal,
            lives: vec![starting_lives; seats],
            shown_lives: vec![starting_lives; seats],
            round_scores: vec![None; seats],
            round: 1,
            pending_reveal: false,
        })
    }

    pub fn lives(&self, seat: usize) -> u32 {
        self.lives[seat]
    }

    /// Total committed by a seat in the current round, if it has thrown.
    pub fn round_score(&self, seat: usize) -> Option<u32> {
        self.round_scores[seat]
    }

    pub fn has_pending_reveal(&self) -> bool {
        self.pending_reveal
    }

    pub fn reveal(&mut self) {
        self.shown_lives.clone_from(&self.lives);
        self.pending_reveal = false;
    }

    fn round_complete(&self) -> bool {
        self.lives
            .iter()
            .zip(&self.round_scores)
            .all(|(lives, score)| *lives == 0 || score.is_some())
    }

    // Charge a life to every seat on the round's lowest total.
    fn resolve_round(&mut self, players: &[Player]) -> Vec<LifeChange> {
        let thrown: Vec<(usize, u32)> = self
            .round_scores
            .iter()
            .enumerate()
            .filter(|(seat, _)| self.lives[*seat] > 0)
            .filter_map(|(seat, score)| score.map(|s| (seat, s)))
            .collect();

        let mut changes = Vec::new();
        if let Some(lowest) = thrown.iter().map(|(_, score)| *score).min() {
            let losers: Vec<usize> = thrown
                .iter()
                .filter(|(_, score)| *score == lowest)
                .map(|(seat, _)| *seat)
                .collect();

            // A round that would knock out every remaining player doesn't count
            let wipes_out = losers.len() == thrown.len()
                && losers.iter().all(|seat| self.lives[*seat] == 1);

            if !wipes_out {
                for seat in losers {
                    let before = self.lives[seat];
                    self.lives[seat] = before - 1;
                    changes.push(LifeChange {
                        player_id: players[seat].id,
                        lives_before: before,
                        lives_after: before - 1,
                    });
                }
            }
        }

        self.round_scores.iter_mut().for_each(|score| *score = None);
        self.round += 1;
        match self.reveal {
            RevealPolicy::Immediate => self.reveal(),
            RevealPolicy::NextRound => self.pending_reveal = true,
        }
        changes
    }
}

impl TurnRules for SuddenDeath {
    fn game_type(&self) -> GameType {
        GameType::SuddenDeath
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

    fn display_score(&self, seat: usize) -> u32 {
        self.shown_lives[seat]
    }

    fn is_eliminated(&self, seat: usize) -> bool {
        self.lives[seat] == 0
    }

    fn shows_eliminated(&self, seat: usize) -> bool {
        self.shown_lives[seat] == 0
    }

    fn in_danger(&self, seat: usize) -> bool {
        self.shown_lives[seat] == 1
    }

    fn is_active(&self, seat: usize) -> bool {
        self.lives[seat] > 0 && self.round_scores[seat].is_none()
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn on_turn_start(&mut self, _seat: usize) {
        if self.pending_reveal {
            self.reveal();
        }
    }

    fn on_match_end(&mut self) {
        self.reveal();
    }

    fn resolve(&mut self, ctx: TurnContext<'_>) -> Resolution {
        let before = self.lives[ctx.seat];
        self.round_scores[ctx.seat] = Some(ctx.total());

        if !self.round_complete() {
            return Resolution::new(before, before, TurnOutcome::Scored);
        }

        let changes = self.resolve_round(ctx.players);
        let after = self.lives[ctx.seat];
        let outcome = if after < before {
            TurnOutcome::LifeLost
        } else {
            TurnOutcome::Scored
        };

        Resolution::new(before, after, outcome)
            .with_life_changes(changes)
            .with_winner(last_standing(&self.lives))
    }

    fn metadata(&self, _players: &[Player]) -> MatchMetadata {
        MatchMetadata::SuddenDeath {
            starting_lives: self.starting_lives,
        }
    }
}
