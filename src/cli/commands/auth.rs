//! Token and password hashing settings.

use crate::auth::{HashCost, token::DEFAULT_TOKEN_TTL};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_HASH_MEMORY_KIB: &str = "hash-memory-kib";
pub const ARG_HASH_ITERATIONS: &str = "hash-iterations";
pub const ARG_HASH_PARALLELISM: &str = "hash-parallelism";

// Must match `DEFAULT_TOKEN_TTL` and `HashCost::default()`.
const DEFAULT_TOKEN_TTL_SECONDS: &str = "3600";
const DEFAULT_HASH_MEMORY_KIB: &str = "19456";
const DEFAULT_HASH_ITERATIONS: &str = "2";
const DEFAULT_HASH_PARALLELISM: &str = "1";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign session tokens (at least 32 bytes)")
                .env("GHABATY_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("GHABATY_TOKEN_TTL_SECONDS")
                .default_value(DEFAULT_TOKEN_TTL_SECONDS)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_HASH_MEMORY_KIB)
                .long(ARG_HASH_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("GHABATY_HASH_MEMORY_KIB")
                .default_value(DEFAULT_HASH_MEMORY_KIB)
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_ITERATIONS)
                .long(ARG_HASH_ITERATIONS)
                .help("Argon2id time cost (iterations)")
                .env("GHABATY_HASH_ITERATIONS")
                .default_value(DEFAULT_HASH_ITERATIONS)
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_PARALLELISM)
                .long(ARG_HASH_PARALLELISM)
                .help("Argon2id parallelism (lanes)")
                .env("GHABATY_HASH_PARALLELISM")
                .default_value(DEFAULT_HASH_PARALLELISM)
                .value_parser(clap::value_parser!(u32)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub hash_cost: HashCost,
}

impl Options {
    /// Read auth settings from validated matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --token-secret")?;

        let defaults = HashCost::default();

        Ok(Self {
            token_secret,
            token_ttl_seconds: matches
                .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or_else(|| DEFAULT_TOKEN_TTL.as_secs()),
            hash_cost: HashCost {
                memory_kib: matches
                    .get_one::<u32>(ARG_HASH_MEMORY_KIB)
                    .copied()
                    .unwrap_or(defaults.memory_kib),
                iterations: matches
                    .get_one::<u32>(ARG_HASH_ITERATIONS)
                    .copied()
                    .unwrap_or(defaults.iterations),
                parallelism: matches
                    .get_one::<u32>(ARG_HASH_PARALLELISM)
                    .copied()
                    .unwrap_or(defaults.parallelism),
            },
        })
    }
}
