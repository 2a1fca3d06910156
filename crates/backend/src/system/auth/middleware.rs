use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::jwt;
use crate::shared::error::ApiError;
use crate::state::AppState;

/// Middleware that requires a valid bearer token (включается `auth.protect_api`)
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = jwt::bearer_token(header)
        .ok_or_else(|| ApiError::Unauthorized("Token de acesso ausente".into()))?;

    let claims = jwt::validate_token(token, &state.config.auth)
        .map_err(|_| ApiError::Unauthorized("Token inválido ou expirado".into()))?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
