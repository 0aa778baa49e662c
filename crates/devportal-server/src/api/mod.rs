pub mod auth;
pub mod cache;
pub mod health;
pub mod helpers;
