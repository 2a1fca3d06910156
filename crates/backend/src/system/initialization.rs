use anyhow::{Context, Result};

use crate::shared::config::AuthConfig;
use crate::shared::data::db::SqliteStore;
use crate::system::auth::password;

/// Ensure a portal user exists (create one if the table is empty and
/// `auth.bootstrap_email` / `auth.bootstrap_password` are set)
pub async fn ensure_bootstrap_user(store: &SqliteStore, auth: &AuthConfig) -> Result<()> {
    let (email, plain) = match (&auth.bootstrap_email, &auth.bootstrap_password) {
        (Some(email), Some(plain)) if !email.trim().is_empty() && !plain.is_empty() => {
            (email.trim(), plain.as_str())
        }
        (None, None) => return Ok(()),
        _ => {
            tracing::warn!("Bootstrap user needs both auth.bootstrap_email and auth.bootstrap_password; skipping");
            return Ok(());
        }
    };

    let count = store
        .count_portal_users()
        .await
        .context("Failed to count portal users")?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("No portal users found. Creating bootstrap user...");
    let credential = password::hash_password(plain)?;
    store
        .insert_portal_user(email, &credential, "Administrador", Some("admin"))
        .await
        .context("Failed to create bootstrap user")?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Bootstrap portal user created: {}", email);
    tracing::warn!("  ⚠️  Remove bootstrap_password from the config!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(())
}
