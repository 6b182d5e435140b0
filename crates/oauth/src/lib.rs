//! GitHub OAuth code exchange and identity lookup.
//!
//! One authorization code buys at most one access token, which buys at most
//! one identity. Both upstream calls carry an explicit network timeout; a
//! deadline miss is reported as [`OAuthError::Timeout`], never conflated
//! with the provider rejecting the code.

mod client;
pub mod types;

pub use {
    client::{GithubOAuthClient, OAuthEndpoints},
    types::{Identity, OAuthError, ProviderToken},
};
