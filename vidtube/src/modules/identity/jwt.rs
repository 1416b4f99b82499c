use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

static JWT_SECRET: OnceLock<String> = OnceLock::new();

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("JWT secret not initialized")]
    SecretNotInitialized,
    #[error("Wrong token kind: expected {expected:?}")]
    WrongKind { expected: TokenKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub handle: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issued token, so two refresh tokens minted in the same
    /// second still differ
    pub jti: String,
}

impl Claims {
    pub fn new(account_id: Uuid, handle: &str, kind: TokenKind, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id.to_string(),
            handle: handle.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

pub fn init_jwt_secret(secret: &str) {
    let _ = JWT_SECRET.set(secret.to_string());
}

fn get_secret() -> Result<&'static str, JwtError> {
    JWT_SECRET
        .get()
        .map(|s| s.as_str())
        .ok_or(JwtError::SecretNotInitialized)
}

pub fn generate_token(
    account_id: Uuid,
    handle: &str,
    kind: TokenKind,
    expiry_hours: i64,
) -> Result<String, JwtError> {
    let secret = get_secret()?;
    let claims = Claims::new(account_id, handle, kind, expiry_hours);

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn validate_token(token: &str) -> Result<TokenData<Claims>, JwtError> {
    let secret = get_secret()?;

    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data)
}

/// Validate `token` and require it to be of `kind`.
pub fn validate_kind(token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
    let claims = validate_token(token)?.claims;
    if claims.kind != kind {
        return Err(JwtError::WrongKind { expected: kind });
    }
    Ok(claims)
}
