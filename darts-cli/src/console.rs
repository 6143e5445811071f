use anyhow::{Result, bail};
use darts_core::MatchControl;
use darts_types::{Player, PlayerStanding, ScoredThrow, TurnOutcome, TurnRecord, parse_visit};

pub const HELP: &str = "\
Commands:
  <darts>      record darts, e.g. 'T20 D16 S5', 'BULL', 'OB', 'MISS'
  save | next  commit the current turn
  undo         revert the last committed turn
  select <n>   re-enter dart n of the current turn
  score        show standings
  hint         show a checkout route
  help         show this message
  quit         leave without finishing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Darts(Vec<ScoredThrow>),
    Save,
    Undo,
    /// One-based dart position in the current turn.
    Select(usize),
    Standings,
    Hint,
    Help,
    Quit,
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut words = trimmed.split_whitespace();
    let head = words.next().unwrap_or_default().to_lowercase();

    let command = match head.as_str() {
        "save" | "next" => Command::Save,
        "undo" => Command::Undo,
        "score" | "standings" => Command::Standings,
        "hint" => Command::Hint,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "select" | "edit" => {
            let Some(position) = words.next() else {
                bail!("Usage: select <dart number>");
            };
            match position.parse::<usize>() {
                Ok(n) if n >= 1 => Command::Select(n),
                _ => bail!("Dart number must be 1, 2 or 3"),
            }
        }
        _ => Command::Darts(parse_visit(trimmed)?),
    };

    Ok(Some(command))
}

fn player_name(players: &[Player], id: darts_types::PlayerId) -> &str {
    players
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.label())
        .unwrap_or("?")
}

fn format_darts(darts: &[ScoredThrow]) -> String {
    if darts.is_empty() {
        return "no darts".to_string();
    }
    darts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per committed turn, plus a line per life change.
pub fn describe_turn(record: &TurnRecord, players: &[Player]) -> Vec<String> {
    let name = player_name(players, record.player_id);
    let summary = match record.outcome {
        TurnOutcome::Bust => "BUST".to_string(),
        TurnOutcome::Halved => format!("halved {} -> {}", record.score_before, record.score_after),
        TurnOutcome::KillerActivated => "is now a killer".to_string(),
        _ => format!("{} -> {}", record.score_before, record.score_after),
    };

    let mut lines = vec![format!(
        "{}: {} = {} ({})",
        name,
        format_darts(&record.throws),
        record.turn_total,
        summary
    )];

    for change in &record.life_changes {
        let target = player_name(players, change.player_id);
        if change.is_elimination() {
            lines.push(format!("{} is out", target));
        } else if change.lives_after < change.lives_before {
            lines.push(format!("{} loses a life ({} left)", target, change.lives_after));
        }
    }

    lines
}

pub fn render_standings(standings: &[PlayerStanding]) -> String {
    let width = standings
        .iter()
        .map(|s| s.display_name.len())
        .max()
        .unwrap_or(0);

    standings
        .iter()
        .map(|s| {
            let marker = if s.is_current { ">" } else { " " };
            let status = if s.eliminated {
                "  out"
            } else if s.in_danger {
                "  last life"
            } else {
                ""
            };
            format!(
                "{} {:<width$}  {:>4}{}",
                marker,
                s.display_name,
                s.score,
                status,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    /// A turn was committed, so the next player is up.
    pub turn_completed: bool,
    pub quit: bool,
}

impl Reply {
    fn say(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// Drives one match from console commands.
pub struct ConsoleSession {
    game: Box<dyn MatchControl>,
}

impl ConsoleSession {
    pub fn new(game: Box<dyn MatchControl>) -> Self {
        Self { game }
    }

    pub fn game(&self) -> &dyn MatchControl {
        self.game.as_ref()
    }

    pub fn prompt(&self) -> String {
        let current = self.game.current_player();
        let score = self
            .game
            .standings()
            .into_iter()
            .find(|s| s.player_id == current.id)
            .map(|s| s.score)
            .unwrap_or_default();
        format!(
            "[{} round {}] {} ({}) > ",
            self.game.game_type(),
            self.game.round(),
            current.label(),
            score
        )
    }

    pub fn handle(&mut self, command: Command) -> Reply {
        let mutates = matches!(
            command,
            Command::Darts(_) | Command::Save | Command::Undo | Command::Select(_)
        );
        if self.game.is_complete() && mutates {
            return Reply::default().say("Match is over");
        }

        match command {
            Command::Darts(darts) => self.record(darts),
            Command::Save => match self.game.save_turn() {
                Some(record) => self.completed(Reply::default(), &record),
                None => Reply::default().say("Nothing to save"),
            },
            Command::Undo => {
                if self.game.undo_last_turn() {
                    Reply::default().say(format!("Turn undone, {} to throw", self.game.current_player().label()))
                } else {
                    Reply::default().say("Nothing to undo")
                }
            }
            Command::Select(position) => {
                let selected = position
                    .checked_sub(1)
                    .is_some_and(|index| self.game.select_dart(index));
                if selected {
                    Reply::default().say(format!("Enter a replacement for dart {}", position))
                } else {
                    Reply::default().say(format!("No dart {} in this turn", position))
                }
            }
            Command::Standings => Reply::default().say(render_standings(&self.game.standings())),
            Command::Hint => match self.game.checkout_hint() {
                Some(checkout) => Reply::default().say(format!("Checkout {}: {}", checkout.score, checkout.route)),
                None => Reply::default().say("No checkout available"),
            },
            Command::Help => Reply::default().say(HELP),
            Command::Quit => Reply {
                quit: true,
                ..Reply::default()
            },
        }
    }

    fn record(&mut self, darts: Vec<ScoredThrow>) -> Reply {
        let mut reply = Reply::default();
        let total = darts.len();

        for (index, dart) in darts.into_iter().enumerate() {
            let feedback = self.game.record_throw(dart);
            if !feedback.accepted {
                return reply.say("Turn is full; 'save' it or 'select' a dart to change");
            }

            if let Some(record) = feedback.completed_turn {
                let skipped = total - index - 1;
                if skipped > 0 {
                    reply = reply.say(format!("Turn ended early, ignored {} dart(s)", skipped));
                }
                return self.completed(reply, &record);
            }

            if index + 1 == total {
                reply = reply.say(format!(
                    "{} thrown, {} dart(s) left",
                    feedback.running_total, feedback.darts_remaining
                ));
                if let Some(checkout) = feedback.checkout {
                    reply = reply.say(format!("Checkout: {}", checkout.route));
                }
            }
        }

        reply
    }

    fn completed(&self, mut reply: Reply, record: &TurnRecord) -> Reply {
        reply.lines.extend(describe_turn(record, self.game.players()));
        reply.turn_completed = true;
        if let Some(winner) = self.game.winner() {
            reply = reply.say(format!("{} wins!", winner.label()));
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darts_core::rules::{Countdown, Knockout};
    use darts_core::Match;

    fn countdown_session(start: u32) -> ConsoleSession {
        let players = vec![Player::guest("Alice"), Player::guest("Bob")];
        let rules = Countdown::new(start, players.len()).unwrap();
        ConsoleSession::new(Box::new(Match::new(players, rules).unwrap()))
    }

    fn darts(input: &str) -> Command {
        parse_command(input).unwrap().unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(darts("save"), Command::Save);
        assert_eq!(darts("NEXT"), Command::Save);
        assert_eq!(darts("select 2"), Command::Select(2));
        assert_eq!(darts("quit"), Command::Quit);
        assert_eq!(
            darts("T20 d16"),
            Command::Darts(vec![ScoredThrow::triple(20), ScoredThrow::double(16)])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("select").is_err());
        assert!(parse_command("select 0").is_err());
        assert!(parse_command("T21").is_err());
        assert!(parse_command("banana").is_err());
    }

    #[test]
    fn test_turn_and_save() {
        let mut session = countdown_session(301);

        let reply = session.handle(darts("T20 T20"));
        assert!(!reply.turn_completed);
        assert_eq!(reply.lines[0], "120 thrown, 1 dart(s) left");

        let reply = session.handle(darts("T20"));
        assert!(!reply.turn_completed);

        let reply = session.handle(Command::Save);
        assert!(reply.turn_completed);
        assert_eq!(reply.lines[0], "Alice: T20 T20 T20 = 180 (301 -> 121)");
        assert_eq!(session.game().current_player().display_name, "Bob");
    }

    #[test]
    fn test_full_turn_rejects_extra_dart() {
        let mut session = countdown_session(501);
        session.handle(darts("S1 S1 S1"));

        let reply = session.handle(darts("S1"));
        assert!(reply.lines[0].starts_with("Turn is full"));
    }

    #[test]
    fn test_select_replaces_dart() {
        let mut session = countdown_session(301);
        session.handle(darts("T20 S5"));

        let reply = session.handle(Command::Select(2));
        assert_eq!(reply.lines[0], "Enter a replacement for dart 2");
        session.handle(darts("T19"));

        assert_eq!(
            session.game().pending_darts(),
            &[ScoredThrow::triple(20), ScoredThrow::triple(19)]
        );
        assert!(session.handle(Command::Select(3)).lines[0].starts_with("No dart 3"));
    }

    #[test]
    fn test_undo() {
        let mut session = countdown_session(301);
        assert_eq!(session.handle(Command::Undo).lines[0], "Nothing to undo");

        session.handle(darts("T20"));
        session.handle(Command::Save);
        let reply = session.handle(Command::Undo);
        assert_eq!(reply.lines[0], "Turn undone, Alice to throw");
    }

    #[test]
    fn test_winning_turn_reports_winner() {
        let players = vec![Player::guest("Alice"), Player::guest("Bob")];
        let rules = Knockout::new(1, players.len()).unwrap();
        let mut session = ConsoleSession::new(Box::new(Match::new(players, rules).unwrap()));

        session.handle(darts("T20"));
        session.handle(Command::Save);
        session.handle(darts("S3"));
        let reply = session.handle(Command::Save);

        assert!(reply.turn_completed);
        assert!(reply.lines.contains(&"Bob is out".to_string()));
        assert_eq!(reply.lines.last().unwrap(), "Alice wins!");
        assert!(session.game().is_complete());
        assert_eq!(session.handle(Command::Save).lines[0], "Match is over");
    }

    #[test]
    fn test_render_standings() {
        let session = countdown_session(501);
        let rendered = render_standings(&session.game().standings());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("> Alice"));
        assert!(lines[1].starts_with("  Bob"));
        assert!(lines[1].ends_with("501"));
    }

    #[test]
    fn test_render_standings_flags_last_life() {
        let standing = |name: &str, score, eliminated, in_danger| PlayerStanding {
            player_id: Player::guest(name).id,
            display_name: name.to_string(),
            score,
            is_current: false,
            eliminated,
            in_danger,
        };
        let rendered = render_standings(&[
            standing("Alice", 1, false, true),
            standing("Bob", 0, true, false),
            standing("Cy", 2, false, false),
        ]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].ends_with("last life"));
        assert!(lines[1].ends_with("out"));
        assert!(lines[2].ends_with("2"));
    }
}
