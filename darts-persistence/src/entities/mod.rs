pub mod prelude;

pub mod match_players;
pub mod match_results;
pub mod players;
