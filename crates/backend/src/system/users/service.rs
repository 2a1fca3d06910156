use contracts::system::auth::TokenClaims;

use super::PortalUser;
use crate::shared::config::AuthConfig;
use crate::shared::data::{AnalyticsStore, StoreResult};
use crate::system::auth::password;

/// Результат проверки email/пароля
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Authenticated(PortalUser),
    InvalidCredentials,
    Inactive,
}

/// Verify user credentials (for sign-in)
///
/// Unknown email and wrong password are indistinguishable to the caller.
/// The inactive check happens only after the password matched.
pub async fn verify_credentials(
    store: &dyn AnalyticsStore,
    auth: &AuthConfig,
    email: &str,
    plain_password: &str,
) -> StoreResult<SignInOutcome> {
    let user = match store.portal_user_by_email(email).await? {
        Some(u) => u,
        None => return Ok(SignInOutcome::InvalidCredentials),
    };

    if !password::verify_password(
        plain_password,
        &user.credential,
        auth.allow_plaintext_passwords,
    ) {
        return Ok(SignInOutcome::InvalidCredentials);
    }

    if user.is_inactive() {
        return Ok(SignInOutcome::Inactive);
    }

    Ok(SignInOutcome::Authenticated(user))
}

/// Пользователь для текущей сессии: перечитывается из хранилища на каждый запрос
pub async fn session_user(
    store: &dyn AnalyticsStore,
    claims: &TokenClaims,
) -> StoreResult<Option<PortalUser>> {
    let user = store.portal_user_by_id(claims.id).await?;
    Ok(user.filter(|u| !u.is_inactive()))
}
