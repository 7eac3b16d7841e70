//! Authentication and authorization.
//!
//! - [`password`]: salted `Argon2id` hashing for stored credentials.
//! - [`token`]: `HS256` session tokens binding user id and role.
//! - [`guard`]: middleware that turns a bearer token into a [`Principal`].
//! - [`ownership`]: per-request check that the principal owns the resource.
//!
//! Registration and login establish trust and therefore bypass the guard.

pub mod guard;
pub mod ownership;
pub mod password;
pub mod principal;
pub mod role;
pub mod token;

pub use password::{HashCost, PasswordHasher};
pub use principal::Principal;
pub use role::Role;
pub use token::TokenService;
