use secrecy::SecretString;

/// Process-wide secrets, read once at startup and never mutated.
#[derive(Clone)]
pub struct GlobalArgs {
    pub dsn: SecretString,
    pub token_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(dsn: SecretString, token_secret: SecretString) -> Self {
        Self { dsn, token_secret }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("dsn", &"***")
            .field("token_secret", &"***")
            .finish()
    }
}
