use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::shared::config::AuthConfig;
use crate::system::users::PortalUser;

/// Секрет на время жизни процесса, если JWT_SECRET не задан
static PROCESS_SECRET: Lazy<String> = Lazy::new(|| {
    tracing::warn!("JWT secret is not configured; using a random secret, tokens will not survive a restart");
    generate_jwt_secret()
});

/// Generate access token (HS256) for a portal user
pub fn generate_access_token(user: &PortalUser, auth: &AuthConfig) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::days(auth.token_lifetime_days)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        exp,
        iat,
    };

    let secret = jwt_secret(auth);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Validate JWT token and extract claims
pub fn validate_token(token: &str, auth: &AuthConfig) -> Result<TokenClaims> {
    let secret = jwt_secret(auth);
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// `Authorization: Bearer <token>` -> token
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn jwt_secret(auth: &AuthConfig) -> &str {
    match auth.jwt_secret.as_deref() {
        Some(secret) => secret,
        None => PROCESS_SECRET.as_str(),
    }
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}
