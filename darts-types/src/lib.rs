pub mod errors;
pub mod game;
pub mod messages;
pub mod throws;
pub mod user;

use uuid::Uuid;

pub type PlayerId = Uuid;
pub type MatchId = Uuid;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use throws::*;
pub use user::*;
