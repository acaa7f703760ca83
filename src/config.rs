/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT, パスワードハッシュ, CORS, 公開パスなど)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::password::HashCost;

pub const DEFAULT_PUBLIC_PATH_PREFIXES: &str = "/health,/api/v1/health,/api/v1/auth/register,/api/v1/auth/login,/api/v1/auth/check-username,/api/v1/auth/check-email,/docs";

const DEFAULT_SQIDS_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    /// `None` only in development; the app then runs on in-memory stores.
    pub database_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub public_path_prefixes: Vec<String>,
    pub password_hash_cost: HashCost,
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_expiration_seconds", &self.jwt_expiration_seconds)
            .field("public_path_prefixes", &self.public_path_prefixes)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish_non_exhaustive()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let sqids_min_length = parse_or("SQIDS_MIN_LENGTH", 10usize)?;
        let sqids_alphabet = std::env::var("SQIDS_ALPHABET")
            .unwrap_or_else(|_| DEFAULT_SQIDS_ALPHABET.to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration_seconds = parse_or("JWT_EXPIRATION_SECONDS", 86_400u64)?;
        if jwt_expiration_seconds == 0 {
            return Err(ConfigError::Invalid("JWT_EXPIRATION_SECONDS"));
        }

        let public_path_prefixes = split_list(
            &std::env::var("PUBLIC_PATH_PREFIXES")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_PATH_PREFIXES.to_string()),
        );

        let defaults = HashCost::default();
        let password_hash_cost = HashCost {
            memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            jwt_secret,
            jwt_expiration_seconds,
            public_path_prefixes,
            password_hash_cost,
        })
    }

    /// In-memory, cheap-hashing configuration for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            sqids_min_length: 10,
            sqids_alphabet: DEFAULT_SQIDS_ALPHABET.to_string(),
            jwt_secret: "k3y-for-tests-0123456789-abcdefghij-XYZ".to_string(),
            jwt_expiration_seconds: 3600,
            public_path_prefixes: split_list(DEFAULT_PUBLIC_PATH_PREFIXES),
            password_hash_cost: crate::services::auth::password::cheap_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn list_splitting_drops_blanks() {
        assert_eq!(
            split_list(" /health, ,/docs ,"),
            vec!["/health".to_string(), "/docs".to_string()]
        );
    }

    #[test]
    fn default_public_paths_cover_auth_entry_points() {
        let prefixes = split_list(DEFAULT_PUBLIC_PATH_PREFIXES);
        assert!(prefixes.contains(&"/api/v1/auth/login".to_string()));
        assert!(prefixes.contains(&"/api/v1/auth/register".to_string()));
        assert!(!prefixes.iter().any(|p| p.starts_with("/api/v1/contacts")));
    }

    #[test]
    fn debug_hides_secret() {
        let cfg = Config::for_tests();
        assert!(!format!("{cfg:?}").contains(&cfg.jwt_secret));
    }
}
