//! `-v` / `GHABATY_LOG_LEVEL` handling.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted from the environment, indexed by verbosity count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_level(raw: &str) -> Result<u8, String> {
    let raw = raw.trim();
    if let Ok(count) = raw.parse::<u8>() {
        return if usize::from(count) < LEVEL_NAMES.len() {
            Ok(count)
        } else {
            Err(format!("verbosity must be between 0 and {}", LEVEL_NAMES.len() - 1))
        };
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(raw))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level '{raw}', expected one of {LEVEL_NAMES:?}"))
}

/// Tracing level for a verbosity count; `None` keeps the default (`ERROR`).
#[must_use]
pub const fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Resolve the requested tracing level from parsed arguments.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    level_for(matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log verbosity, repeat -v or set error|warn|info|debug|trace (default: error)")
            .env("GHABATY_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}
