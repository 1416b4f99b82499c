use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::api::dto::ApiError;
use crate::modules::identity::jwt::{self, TokenKind};

/// A request carrying a valid access token. Rejects with 401 otherwise.
pub struct AuthenticatedAccount {
    pub account_id: Uuid,
}

/// The viewer behind a request, if any.
///
/// No Authorization header means an anonymous viewer. A header that is
/// present but unusable is rejected with 401, as on required routes.
pub struct CurrentViewer(pub Option<Uuid>);

pub enum AuthError {
    MissingAuthHeader,
    InvalidAuthHeaderFormat,
    InvalidToken(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader => ApiError::unauthorized("Missing Authorization header"),
            AuthError::InvalidAuthHeaderFormat => ApiError::unauthorized(
                "Invalid Authorization header format. Expected: Bearer <token>",
            ),
            AuthError::InvalidToken(e) => ApiError::unauthorized(format!("Invalid token: {e}")),
        }
    }
}

fn authenticate(parts: &Parts) -> Result<AuthenticatedAccount, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    let claims = jwt::validate_kind(token.trim(), TokenKind::Access)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let account_id = claims
        .account_id()
        .ok_or_else(|| AuthError::InvalidToken("subject is not an account id".to_string()))?;

    Ok(AuthenticatedAccount { account_id })
}

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts).map_err(ApiError::from)
    }
}

impl<S> FromRequestParts<S> for CurrentViewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match authenticate(parts) {
            Ok(account) => Ok(CurrentViewer(Some(account.account_id))),
            Err(AuthError::MissingAuthHeader) => Ok(CurrentViewer(None)),
            Err(e) => {
                debug!("Rejecting unusable credentials on an optional-auth route");
                Err(e.into())
            }
        }
    }
}
