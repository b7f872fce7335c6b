//! Bearer token checks for routes that act on behalf of a user.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const USER_MISMATCH_MESSAGE: &str =
    "Unauthorized: User id from the token does not match userId from the passed parameter";

const BEARER_PREFIX: &str = "Bearer ";

/// Claims carried by user tokens. The user id is read from `uid`, or from
/// `sub` for issuers that only set the standard claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Option<&str> {
        self.uid.as_deref().or(self.sub.as_deref())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    InvalidToken(String),
    UserMismatch,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidToken(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
            AuthError::UserMismatch => {
                (StatusCode::FORBIDDEN, USER_MISMATCH_MESSAGE).into_response()
            }
        }
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value);
    (!token.is_empty()).then_some(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
}

/// Check that the request carries a valid token issued to `user_id`.
/// Always passes when no secret is configured.
pub fn authorize_user(
    jwt_secret: Option<&str>,
    headers: &HeaderMap,
    user_id: &str,
) -> Result<(), AuthError> {
    let Some(secret) = jwt_secret else {
        return Ok(());
    };
    let token = extract_token(headers)
        .ok_or_else(|| AuthError::InvalidToken("Missing authorization token".to_string()))?;
    let claims = verify_token(token, secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        AuthError::InvalidToken(format!("Invalid authorization token: {}", e))
    })?;
    if claims.user_id() != Some(user_id) {
        return Err(AuthError::UserMismatch);
    }
    Ok(())
}
