use std::sync::Arc;

use anyhow::Context;
use darts_core::{GameEventBus, ResultDispatcher, start_match_with_events};
use darts_persistence::connection::connect_and_migrate;
use darts_persistence::{DatabaseManager, DatabaseResultSink, PlayerRepository};
use darts_types::Player;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use darts_cli::console::HELP;
use darts_cli::config::player_names;
use darts_cli::{Config, ConsoleSession, TracingEventLog, parse_command, record_result};

async fn load_roster(names: &[String], profiles: Option<&PlayerRepository>) -> Vec<Player> {
    let mut roster = Vec::with_capacity(names.len());
    for name in names {
        let player = match profiles {
            Some(profiles) => match profiles.find_or_create_guest(name).await {
                Ok(player) => player,
                Err(e) => {
                    warn!("Could not load profile for {}: {}", name, e);
                    Player::guest(name.as_str())
                }
            },
            None => Player::guest(name.as_str()),
        };
        roster.push(player);
    }
    roster
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let names = player_names(std::env::args().skip(1))?;

    info!("Starting {:?} for {}", config.game, names.join(", "));

    // Local history is optional; play goes on without it
    let database = match DatabaseManager::connect(&config.database_url).await {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("Local database unavailable at {}: {}", config.database_url, e);
            None
        }
    };
    let profiles = database.as_ref().map(DatabaseManager::players);

    let mut dispatcher = ResultDispatcher::new();
    if let Some(db) = &database {
        dispatcher.add_sink(Arc::new(DatabaseResultSink::new("local", db.get_connection().clone())));
    }
    if let Some(url) = &config.remote_database_url {
        match connect_and_migrate(url).await {
            Ok(remote) => dispatcher.add_sink(Arc::new(DatabaseResultSink::new("remote", remote))),
            Err(e) => warn!("Remote store unavailable, results stay local: {}", e),
        }
    }

    let mut roster = load_roster(&names, profiles.as_ref()).await;
    let events = GameEventBus::new().with_handler(Box::new(TracingEventLog));
    let game = start_match_with_events(
        &config.match_settings(),
        roster.clone(),
        &mut rand::thread_rng(),
        events,
    )?;
    let mut session = ConsoleSession::new(game);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(format!("{}\n\n", HELP).as_bytes()).await?;

    while !session.game().is_complete() {
        stdout.write_all(session.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                continue;
            }
        };
        let reply = session.handle(command);
        for text in &reply.lines {
            stdout.write_all(format!("{}\n", text).as_bytes()).await?;
        }
        if reply.quit {
            break;
        }

        // Let the committed score sit before the next player is prompted
        if reply.turn_completed && !session.game().is_complete() {
            tokio::time::sleep(config.advance_delay).await;
        }
    }

    let Some(result) = session.game().result() else {
        info!("Match {} abandoned", session.game().id());
        return Ok(());
    };

    record_result(&dispatcher, profiles.as_ref(), &mut roster, &result).await;

    stdout
        .write_all(format!("{}\n", serde_json::to_string_pretty(&result)?).as_bytes())
        .await?;
    for player in &roster {
        stdout
            .write_all(format!("{}: {} won, {} lost\n", player.label(), player.wins, player.losses).as_bytes())
            .await?;
    }
    stdout.flush().await?;

    Ok(())
}
