use axum::{extract::State, Json};
use contracts::shared::api::MessageResponse;
use contracts::system::auth::{SessionResponse, SessionToken, SignInRequest, SignInResponse};

use crate::shared::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::system::auth::{extractor::SessionClaims, jwt};
use crate::system::users::service::{self as user_service, SignInOutcome};

/// POST /api/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Email e senha são obrigatórios".into()));
    }

    let outcome =
        user_service::verify_credentials(state.store.as_ref(), &state.config.auth, email, password)
            .await?;

    let user = match outcome {
        SignInOutcome::Authenticated(user) => user,
        SignInOutcome::InvalidCredentials => {
            tracing::info!("Sign-in rejected for {}", email);
            return Err(ApiError::Unauthorized("Email ou senha inválidos".into()));
        }
        SignInOutcome::Inactive => {
            return Err(ApiError::Forbidden("Usuário inativo".into()));
        }
    };

    let access_token = jwt::generate_access_token(&user, &state.config.auth)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SignInResponse {
        user: user.to_user_info(),
        session: SessionToken { access_token },
    }))
}

/// POST /api/auth/signout (токены не хранятся на сервере)
pub async fn signout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logout realizado com sucesso".into(),
    })
}

/// GET /api/auth/session
pub async fn session(
    State(state): State<AppState>,
    SessionClaims(claims): SessionClaims,
) -> ApiResult<Json<SessionResponse>> {
    let Some(claims) = claims else {
        return Ok(Json(SessionResponse { user: None }));
    };

    let user = user_service::session_user(state.store.as_ref(), &claims).await?;
    Ok(Json(SessionResponse {
        user: user.map(|u| u.to_user_info()),
    }))
}
