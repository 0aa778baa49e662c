//! # devportal-auth
//!
//! Authentication and session core of the developer portal.
//!
//! - OAuth2 authorization-code login against named providers
//!   ([`oauth`]), currently GitHub (including Enterprise) and Atlassian
//! - HS256 session JWTs ([`jwt`])
//! - Encrypted custody of one provider access token per user and provider
//!   ([`token_store`])
//! - [`AuthService`], which ties these together and hands provider
//!   credentials to downstream API clients

#![warn(clippy::all)]

pub mod config;
pub mod errors;
pub mod jwt;
pub mod oauth;
mod service;
pub mod token_store;
pub mod types;
pub mod user_lookup;

#[cfg(test)]
mod tests;

pub use config::{AuthConfig, ProviderSettings};
pub use errors::{AuthError, Result};
pub use jwt::SessionSigner;
pub use oauth::generate_state;
pub use service::AuthService;
pub use token_store::{ProviderTokenStore, StoredProviderToken};
pub use types::*;
pub use user_lookup::{StaticUserDirectory, StorageUserDirectory, UserLookup};
