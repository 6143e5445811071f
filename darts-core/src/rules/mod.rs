pub mod countdown;
pub mod halve_it;
pub mod killer;
pub mod knockout;
pub mod sudden_death;

pub use countdown::{Countdown, FinishRule, SUPPORTED_STARTING_SCORES, Settlement, settle};
pub use halve_it::{HALVE_IT_ROUNDS, HalveIt, generate_targets};
pub use killer::{HitRequirement, KILLER_NUMBERS, Killer, KillerSettings};
pub use knockout::Knockout;
pub use sudden_death::{RevealPolicy, SuddenDeath};
