use std::convert::Infallible;

use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use forum_types::api::Claims;

use crate::error::ApiError;
use crate::state::AppState;

/// Decode a bearer token into the user id it was issued for. Any failure
/// (bad signature, expired, malformed) yields `None`.
pub fn resolve_token(token: &str, secret: &str) -> Option<i64> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|e| debug!("Rejected bearer token: {}", e))
    .ok()
}

/// The requesting identity for endpoints that allow anonymous access.
/// A missing or invalid credential resolves to the anonymous viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewer(pub Option<i64>);

impl Viewer {
    pub fn id(self) -> Option<i64> {
        self.0
    }

    /// Viewer-relative authorship; always false for anonymous viewers.
    pub fn is(self, user_id: i64) -> bool {
        self.0 == Some(user_id)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => resolve_token(bearer.token(), &state.jwt_secret),
            Err(_) => None,
        };
        Ok(Self(user_id))
    }
}

/// The requesting identity for endpoints that require one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await.unwrap_or_default();
        viewer.id().map(Self).ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(sub: i64, secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub,
            role: "student".into(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_resolves_user() {
        assert_eq!(resolve_token(&token(7, "s3cret", 3600), "s3cret"), Some(7));
    }

    #[test]
    fn bad_tokens_resolve_to_anonymous() {
        assert_eq!(resolve_token(&token(7, "other", 3600), "s3cret"), None);
        assert_eq!(resolve_token(&token(7, "s3cret", -3600), "s3cret"), None);
        assert_eq!(resolve_token("not-a-jwt", "s3cret"), None);
    }

    #[test]
    fn viewer_authorship() {
        assert!(Viewer(Some(3)).is(3));
        assert!(!Viewer(Some(3)).is(4));
        assert!(!Viewer(None).is(0));
    }
}
