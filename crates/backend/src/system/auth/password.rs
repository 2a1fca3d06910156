use anyhow::Result;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

/// Hash password with Argon2 (PHC string)
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to encode salt: {}", e))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

/// Проверка пароля против сохранённого значения.
///
/// Значение, не являющееся PHC-хешем, сравнивается как открытый текст
/// только при `allow_plaintext`.
pub fn verify_password(password: &str, stored: &str, allow_plaintext: bool) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            if !allow_plaintext {
                tracing::warn!("Stored credential is not an Argon2 hash; plaintext passwords are disabled");
                return false;
            }
            !stored.is_empty() && stored == password
        }
    }
}
