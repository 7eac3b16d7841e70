//! Map validated CLI arguments to the action the binary executes.

use crate::cli::{
    actions::{Action, server::Args},
    commands::auth,
    globals::GlobalArgs,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(4000);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        globals: GlobalArgs::new(dsn, auth_opts.token_secret),
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        hash_cost: auth_opts.hash_cost,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::HashCost;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_carries_configuration() {
        temp_env::with_vars(
            [
                ("GHABATY_DSN", Some("postgres://user@localhost:5432/ghabaty")),
                ("GHABATY_TOKEN_SECRET", Some("0123456789abcdef0123456789abcdef")),
                ("GHABATY_PORT", None),
                ("GHABATY_TOKEN_TTL_SECONDS", None),
                ("GHABATY_HASH_MEMORY_KIB", None),
                ("GHABATY_HASH_ITERATIONS", None),
                ("GHABATY_HASH_PARALLELISM", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["ghabaty"]);
                let Action::Server(args) = handler(&matches).unwrap();
                assert_eq!(args.port, 4000);
                assert_eq!(args.token_ttl_seconds, 3600);
                assert_eq!(args.hash_cost, HashCost::default());
                assert_eq!(
                    args.globals.token_secret.expose_secret(),
                    "0123456789abcdef0123456789abcdef"
                );
            },
        );
    }
}
