//! RocksDB column family definitions.

/// Provider access tokens: (user_uuid, provider) → StoredProviderToken
pub const CF_PROVIDER_TOKENS: &str = "provider_tokens";

/// Directory users: user_uuid → DirectoryUser
pub const CF_USERS: &str = "users";

/// Email index: lowercase email → user_uuid
pub const CF_USERS_BY_EMAIL: &str = "users_by_email";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![CF_PROVIDER_TOKENS, CF_USERS, CF_USERS_BY_EMAIL]
}
