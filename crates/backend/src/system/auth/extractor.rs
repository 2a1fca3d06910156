use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use contracts::system::auth::TokenClaims;
use std::convert::Infallible;

use super::jwt;
use crate::state::AppState;

/// Claims of the caller, if any.
/// Missing, malformed or expired tokens yield `None` instead of a rejection.
pub struct SessionClaims(pub Option<TokenClaims>);

#[async_trait]
impl FromRequestParts<AppState> for SessionClaims {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Уже проверено middleware
        if let Some(claims) = parts.extensions.get::<TokenClaims>() {
            return Ok(SessionClaims(Some(claims.clone())));
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let claims = jwt::bearer_token(header)
            .and_then(|token| jwt::validate_token(token, &state.config.auth).ok());

        Ok(SessionClaims(claims))
    }
}
