//! Bearer-token authentication.
//!
//! Session tokens are HS256 JWTs carrying the user's identity. The
//! extractor rejects missing, malformed and expired tokens with 401
//! before any handler logic runs.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, resolved from a verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Claims carried by a session token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// Verify a raw token against the signing secret.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let claims = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthorized("Token expired"),
        _ => ApiError::unauthorized("Invalid token"),
    })?
    .claims;

    if claims.id.is_empty() {
        return Err(ApiError::unauthorized("Token carries no user id"));
    }

    Ok(AuthUser {
        id: claims.id,
        email: claims.email,
        name: claims.name,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::unauthorized("Missing bearer token"))?;

        let user = verify_token(bearer.token(), &state.config.jwt_secret)?;
        debug!(user_id = %user.id, "Authenticated request");
        Ok(user)
    }
}
