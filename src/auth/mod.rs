//! Authentication module
//!
//! The seller API uses the OAuth2 client credentials grant with the client
//! id and secret sent as an HTTP Basic header. `TokenProvider` performs that
//! exchange and caches the bearer token until it expires.
//!
//! One provider exists per credential pair for the whole process; streams
//! obtain it through [`TokenProvider::shared`].

mod provider;
mod types;

pub use provider::{TokenProvider, SCOPE, TOKEN_TIMEOUT};
pub use types::{AccessToken, Credentials};

#[cfg(test)]
mod tests;
