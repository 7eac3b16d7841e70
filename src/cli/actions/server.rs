use crate::{
    api::{self, Services},
    auth::{HashCost, PasswordHasher, TokenService},
    cli::{globals::GlobalArgs, telemetry},
    store::postgres::PgStore,
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub globals: GlobalArgs,
    pub token_ttl_seconds: u64,
    pub hash_cost: HashCost,
}

/// Build the auth services from configuration.
///
/// # Errors
/// Returns an error if the signing secret, ttl or hashing cost is invalid.
pub fn build_auth(args: &Args) -> Result<(Arc<TokenService>, Arc<PasswordHasher>)> {
    let tokens = TokenService::new(
        &args.globals.token_secret,
        Duration::from_secs(args.token_ttl_seconds),
    )
    .context("Invalid token configuration")?;

    let hasher = PasswordHasher::new(args.hash_cost).context("Invalid password hashing cost")?;

    Ok((Arc::new(tokens), Arc::new(hasher)))
}

/// Execute the server action.
/// # Errors
/// Returns an error if configuration is invalid, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let (tokens, hasher) = build_auth(&args)?;

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(args.globals.dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    let services = Services {
        store: Arc::new(PgStore::new(pool)),
        tokens,
        hasher,
    };

    let result = api::new(args.port, services).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn args(secret: &str, ttl: u64) -> Args {
        Args {
            port: 4000,
            globals: GlobalArgs::new(
                SecretString::from("postgres://localhost/ghabaty".to_string()),
                SecretString::from(secret.to_string()),
            ),
            token_ttl_seconds: ttl,
            hash_cost: HashCost {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    #[test]
    fn build_auth_accepts_valid_configuration() {
        assert!(build_auth(&args("0123456789abcdef0123456789abcdef", 3600)).is_ok());
    }

    #[test]
    fn build_auth_rejects_short_secret() {
        let err = build_auth(&args("short", 3600)).err();
        assert!(err.is_some_and(|err| err.to_string().contains("Invalid token configuration")));
    }

    #[test]
    fn build_auth_rejects_bad_hash_cost() {
        let mut invalid = args("0123456789abcdef0123456789abcdef", 3600);
        invalid.hash_cost.iterations = 0;
        assert!(build_auth(&invalid).is_err());
    }
}
