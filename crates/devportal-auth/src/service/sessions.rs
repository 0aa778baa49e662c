//! Session token operations.

use crate::{errors::*, types::*, user_lookup::UserLookup};
use devportal_storage::Storage;
use tracing::debug;

use super::AuthService;

impl<S: Storage + 'static, U: UserLookup> AuthService<S, U> {
    /// Issue a session token for `profile`
    pub fn generate_jwt(&self, profile: &ExternalProfile) -> Result<String> {
        self.signer.issue(profile)
    }

    /// Issue a session token with an explicit lifetime in seconds
    pub fn generate_jwt_with_ttl(
        &self,
        profile: &ExternalProfile,
        ttl_secs: i64,
    ) -> Result<String> {
        self.signer.issue_with_ttl(profile, ttl_secs)
    }

    /// Verify a session token
    pub fn validate_jwt(&self, token: &str) -> Result<SessionClaims> {
        self.signer.verify(token)
    }

    /// Exchange a valid session token for a fresh one with the same identity
    pub fn refresh_jwt(&self, token: &str) -> Result<String> {
        let claims = self.signer.verify(token)?;
        debug!(username = %claims.username, "Refreshing session token");
        self.signer.reissue(&claims)
    }

    /// End a session
    ///
    /// Session tokens are not revocable server side; the caller clears the
    /// session cookie and the token lapses at its expiry.
    pub fn logout(&self, claims: Option<&SessionClaims>) {
        if let Some(claims) = claims {
            debug!(jti = %claims.jti, "Session logged out");
        }
    }
}
