//! OAuth2 authorization-code flow against named providers.

pub mod client;
pub mod config;
pub mod providers;

pub use client::OAuthClient;
pub use config::OAuthConfig;
pub use providers::{provider_for, AtlassianProvider, GitHubProvider, Provider};

/// Generate a random anti-forgery `state` value (64 hex chars)
pub fn generate_state() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}
