pub mod match_repository;
pub mod player_repository;

pub use match_repository::{MatchRepository, MatchSummary};
pub use player_repository::{LeaderboardEntry, PlayerRepository};
