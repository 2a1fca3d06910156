use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub postgrest: PostgrestConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    /// None = любой origin
    pub frontend_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Postgrest,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "postgrest" | "supabase" => Ok(StoreBackend::Postgrest),
            other => Err(anyhow::anyhow!("Unknown database backend: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgrestConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PostgrestConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_lifetime_days")]
    pub token_lifetime_days: i64,
    /// Принимать старые пароли, сохранённые открытым текстом
    #[serde(default)]
    pub allow_plaintext_passwords: bool,
    /// Требовать bearer-токен для /api/sellers, /api/rfv, /api/geoloc
    #[serde(default)]
    pub protect_api: bool,
    pub bootstrap_email: Option<String>,
    pub bootstrap_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_days: default_token_lifetime_days(),
            allow_plaintext_passwords: false,
            protect_api: false,
            bootstrap_email: None,
            bootstrap_password: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_lifetime_days() -> i64 {
    7
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3001

[database]
backend = "sqlite"
path = "target/db/rfv.db"

[auth]
token_lifetime_days = 7
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment variables are applied on top of either source.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_file_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    normalize(&mut config);
    Ok(config)
}

fn load_file_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Переменные окружения имеют приоритет над файлом
fn apply_env_overrides<F>(config: &mut Config, env: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = env("PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?;
    }
    if let Some(url) = env("FRONTEND_URL") {
        config.cors.frontend_url = Some(url);
    }
    if let Some(backend) = env("DATABASE_BACKEND") {
        config.database.backend = backend.parse()?;
    }
    if let Some(path) = env("DATABASE_PATH") {
        config.database.path = path;
    }
    if let Some(url) = env("SUPABASE_URL") {
        config.postgrest.url = Some(url);
    }
    // service role key wins over the anon key
    if let Some(key) = env("SUPABASE_SERVICE_ROLE_KEY").or_else(|| env("SUPABASE_ANON_KEY")) {
        config.postgrest.api_key = Some(key);
    }
    if let Some(secret) = env("JWT_SECRET") {
        config.auth.jwt_secret = Some(secret);
    }
    Ok(())
}

fn normalize(config: &mut Config) {
    if let Some(url) = config.postgrest.url.as_mut() {
        while url.ends_with('/') {
            url.pop();
        }
    }
    if config
        .auth
        .jwt_secret
        .as_ref()
        .is_some_and(|s| s.trim().is_empty())
    {
        config.auth.jwt_secret = None;
    }
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
    config.auth.jwt_secret = Some("test-secret".into());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/rfv.db");
        assert_eq!(config.database.backend, StoreBackend::Sqlite);
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.token_lifetime_days, 7);
        assert!(!config.auth.allow_plaintext_passwords);
        assert!(!config.auth.protect_api);
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "8080"),
            ("DATABASE_BACKEND", "supabase"),
            ("SUPABASE_URL", "https://example.supabase.co//"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("JWT_SECRET", "s3cret"),
        ]);

        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        normalize(&mut config);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Postgrest);
        assert_eq!(
            config.postgrest.url.as_deref(),
            Some("https://example.supabase.co")
        );
        assert_eq!(config.postgrest.api_key.as_deref(), Some("service"));
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_jwt_secret_is_dropped() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.auth.jwt_secret = Some("  ".into());
        normalize(&mut config);
        assert!(config.auth.jwt_secret.is_none());
    }
}
