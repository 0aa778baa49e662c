use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use devportal_auth::SessionClaims;
use uuid::Uuid;

use crate::error::ApiError;

/// Extractor for requests that passed [`require_session`](crate::middleware::require_session)
///
/// Reads the claims the middleware verified; it never parses tokens itself.
pub struct AuthenticatedUser {
    pub claims: SessionClaims,
}

impl AuthenticatedUser {
    /// Portal user the session is linked to
    pub fn user_uuid(&self) -> Result<Uuid, ApiError> {
        self.claims.user_uuid.ok_or(ApiError::NotLinked)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .ok_or(ApiError::AuthenticationRequired)?;

        Ok(AuthenticatedUser { claims })
    }
}
