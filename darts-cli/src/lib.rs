pub mod config;
pub mod console;
pub mod event_log;
pub mod recording;

pub use config::{Config, GameChoice};
pub use console::{Command, ConsoleSession, Reply, parse_command};
pub use event_log::TracingEventLog;
pub use recording::record_result;
