pub use super::match_players::Entity as MatchPlayers;
pub use super::match_results::Entity as MatchResults;
pub use super::players::Entity as Players;
