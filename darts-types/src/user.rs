use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::PlayerId;

/// A profile selectable on the roster screen. Persists across matches;
/// only the win/loss counters change, and only after a match completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>, // asset key or URL
    pub is_guest: bool,
    pub account_id: Option<String>, // external account when linked
    pub wins: u32,
    pub losses: u32,
}

impl Player {
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            nickname: None,
            avatar: None,
            is_guest: true,
            account_id: None,
            wins: 0,
            losses: 0,
        }
    }

    pub fn linked(display_name: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            is_guest: false,
            account_id: Some(account_id.into()),
            ..Self::guest(display_name)
        }
    }

    /// Nickname when set, display name otherwise.
    pub fn label(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.display_name)
    }

    pub fn record_win(&mut self) {
        self.wins += 1;
    }

    pub fn record_loss(&mut self) {
        self.losses += 1;
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }
}
