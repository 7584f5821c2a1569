use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::UserId;

/// Header carrying the opaque user id injected by the identity gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller identity.
///
/// Authentication itself is delegated to the hosted identity provider in
/// front of this service; by the time a request arrives here the gateway has
/// verified the session and injected the opaque user id. A request without
/// one is a precondition failure, not a case the core handles.
pub struct Identity(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| Identity(UserId(s.to_string())))
            .ok_or_else(|| AppError::Unauthorized("Missing authenticated identity".to_string()))
    }
}
