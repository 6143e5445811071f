use anyhow::{Context, Result, bail};
use darts_core::MatchSettings;
use darts_core::rules::{FinishRule, KillerSettings, RevealPolicy};
use darts_persistence::connection::DEFAULT_DATABASE_URL;
use darts_types::Difficulty;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameChoice {
    Countdown(u32),
    HalveIt,
    Knockout,
    Killer,
    SuddenDeath,
}

impl GameChoice {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "301" => Ok(GameChoice::Countdown(301)),
            "501" => Ok(GameChoice::Countdown(501)),
            "halve-it" | "halveit" => Ok(GameChoice::HalveIt),
            "knockout" => Ok(GameChoice::Knockout),
            "killer" => Ok(GameChoice::Killer),
            "sudden-death" | "suddendeath" => Ok(GameChoice::SuddenDeath),
            other => bail!("Unknown game '{}'", other),
        }
    }
}

pub const USAGE: &str = "Usage: darts-cli <player> [player...]";

/// Player names from the positional arguments. Each name maps to one stored
/// profile, so repeats are rejected here rather than at match setup.
pub fn player_names(args: impl IntoIterator<Item = String>) -> Result<Vec<String>> {
    let names: Vec<String> = args
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    if names.is_empty() {
        bail!(USAGE);
    }
    if let Some(blank) = names.iter().position(|name| name.is_empty()) {
        bail!("Player {} has an empty name. {}", blank + 1, USAGE);
    }
    for (index, name) in names.iter().enumerate() {
        if names[..index].contains(name) {
            bail!("Player '{}' is listed more than once. {}", name, USAGE);
        }
    }

    Ok(names)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub remote_database_url: Option<String>,
    pub game: GameChoice,
    pub lives: u32,
    pub difficulty: Difficulty,
    pub double_out: bool,
    pub advance_delay: Duration,
    pub reveal: RevealPolicy,
}

fn parse_difficulty(value: &str) -> Result<Difficulty> {
    match value.trim().to_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "medium" => Ok(Difficulty::Medium),
        "hard" => Ok(Difficulty::Hard),
        other => bail!("Invalid DARTS_DIFFICULTY '{}'", other),
    }
}

fn parse_reveal(value: &str) -> Result<RevealPolicy> {
    match value.trim().to_lowercase().as_str() {
        "immediate" => Ok(RevealPolicy::Immediate),
        "next-round" | "next_round" => Ok(RevealPolicy::NextRound),
        other => bail!("Invalid DARTS_REVEAL '{}'", other),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean '{}'", other),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let game = match lookup("DARTS_GAME") {
            Some(value) => GameChoice::parse(&value)?,
            None => GameChoice::Countdown(501),
        };

        let lives = lookup("DARTS_LIVES")
            .unwrap_or_else(|| "3".to_string())
            .trim()
            .parse()
            .context("Invalid DARTS_LIVES")?;

        let difficulty = match lookup("DARTS_DIFFICULTY") {
            Some(value) => parse_difficulty(&value)?,
            None => Difficulty::default(),
        };

        let double_out = match lookup("DARTS_DOUBLE_OUT") {
            Some(value) => parse_bool(&value).context("Invalid DARTS_DOUBLE_OUT")?,
            None => false,
        };

        let delay_ms: u64 = lookup("DARTS_ADVANCE_DELAY_MS")
            .unwrap_or_else(|| "250".to_string())
            .trim()
            .parse()
            .context("Invalid DARTS_ADVANCE_DELAY_MS")?;

        let reveal = match lookup("DARTS_REVEAL") {
            Some(value) => parse_reveal(&value)?,
            None => RevealPolicy::default(),
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            remote_database_url: lookup("REMOTE_DATABASE_URL").filter(|url| !url.trim().is_empty()),
            game,
            lives,
            difficulty,
            double_out,
            advance_delay: Duration::from_millis(delay_ms),
            reveal,
        })
    }

    pub fn match_settings(&self) -> MatchSettings {
        match self.game {
            GameChoice::Countdown(starting_score) => MatchSettings::Countdown {
                starting_score,
                finish: if self.double_out {
                    FinishRule::Double
                } else {
                    FinishRule::Any
                },
            },
            GameChoice::HalveIt => MatchSettings::HalveIt {
                difficulty: self.difficulty,
            },
            GameChoice::Knockout => MatchSettings::Knockout { lives: self.lives },
            GameChoice::Killer => MatchSettings::Killer(KillerSettings {
                lives: self.lives,
                ..KillerSettings::default()
            }),
            GameChoice::SuddenDeath => MatchSettings::SuddenDeath {
                lives: self.lives,
                reveal: self.reveal,
            },
        }
    }
}
