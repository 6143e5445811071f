pub mod checkout;
pub mod game_events;
pub mod game_setup;
pub mod remote;
pub mod results;
pub mod rules;
pub mod turn_engine;

// Re-export main components
pub use checkout::*;
pub use game_events::*;
pub use game_setup::*;
pub use remote::*;
pub use results::*;
pub use turn_engine::*;
