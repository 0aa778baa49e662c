//! Session JWT issuance and validation.

use crate::{
    config::{MAX_SESSION_TTL, MIN_JWT_SECRET_LEN},
    errors::*,
    types::{ExternalProfile, SessionClaims},
};
use devportal_crypto::current_timestamp;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Algorithms accepted on incoming session tokens. Tokens are always
/// signed with HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Signs and verifies session tokens with a shared HMAC secret
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    ttl_secs: i64,
}

impl SessionSigner {
    /// Create a signer; `secret` must be at least [`MIN_JWT_SECRET_LEN`]
    /// bytes and `ttl` between one second and [`MAX_SESSION_TTL`].
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }
        if ttl.as_secs() == 0 || ttl > MAX_SESSION_TTL {
            return Err(AuthError::Config(format!(
                "JWT TTL must be between 1 and {} seconds",
                MAX_SESSION_TTL.as_secs()
            )));
        }
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthError::Config("JWT TTL out of range".to_string()))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
            ttl_secs,
        })
    }

    /// Configured session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `profile` with the configured lifetime
    pub fn issue(&self, profile: &ExternalProfile) -> Result<String> {
        self.issue_with_ttl(profile, self.ttl_secs)
    }

    /// Issue a token with an explicit lifetime in seconds; negative values
    /// produce already-expired tokens.
    pub fn issue_with_ttl(&self, profile: &ExternalProfile, ttl_secs: i64) -> Result<String> {
        let now = now_secs()?;
        let claims = SessionClaims {
            username: profile.login.clone(),
            email: profile.email.clone(),
            user_uuid: profile.user_uuid,
            iss: self.issuer.clone(),
            iat: now,
            exp: expiry(now, ttl_secs)?,
            jti: Uuid::new_v4().to_string(),
        };

        self.sign(&claims)
    }

    /// Re-sign existing identity claims with a fresh id and expiry
    pub fn reissue(&self, claims: &SessionClaims) -> Result<String> {
        let now = now_secs()?;
        let renewed = SessionClaims {
            iat: now,
            exp: expiry(now, self.ttl_secs)?,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            ..claims.clone()
        };

        self.sign(&renewed)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Verify a token and return its claims
    ///
    /// Rejects tokens whose header names a non-HMAC algorithm before any
    /// signature check, then verifies signature, issuer and expiry with no
    /// leeway. Every failure is reported as [`AuthError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Malformed session token header");
            AuthError::InvalidToken
        })?;

        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            debug!(alg = ?header.alg, "Rejected session token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "iat"]);
        validation.leeway = 0;
        validation.validate_exp = true;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        // jsonwebtoken accepts exp == now; a token is only valid strictly before exp
        if claims.exp <= now_secs().map_err(|_| AuthError::InvalidToken)? {
            debug!("Session token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

fn now_secs() -> Result<i64> {
    i64::try_from(current_timestamp())
        .map_err(|_| AuthError::TokenSigning("clock out of range".to_string()))
}

fn expiry(now: i64, ttl_secs: i64) -> Result<i64> {
    now.checked_add(ttl_secs)
        .ok_or_else(|| AuthError::TokenSigning("token lifetime out of range".to_string()))
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
