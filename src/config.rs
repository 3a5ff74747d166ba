use jsonwebtoken::Algorithm;
use thiserror::Error;

const DEFAULT_TTL_MINUTES: i64 = 30;
/// One year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "APP_PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt: JwtConfig::from_lookup(get)?,
        })
    }
}

impl JwtConfig {
    fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = get("JWT_SECRET")
            .or_else(|| get("SECRET_KEY"))
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let algorithm = match get("JWT_ALGORITHM") {
            Some(v) => parse_hmac_algorithm(&v)?,
            None => Algorithm::HS256,
        };

        let ttl_minutes = match get("JWT_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
                .ok_or_else(|| ConfigError::Invalid {
                    key: "JWT_TTL_MINUTES",
                    reason: format!("expected 1..={MAX_TTL_MINUTES} minutes, got {v:?}"),
                })?,
            None => DEFAULT_TTL_MINUTES,
        };

        Ok(Self {
            secret,
            algorithm,
            ttl_minutes,
        })
    }
}

// Tokens are signed with a shared secret, so only the HMAC family makes sense.
fn parse_hmac_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "JWT_ALGORITHM",
        reason,
    };
    let algorithm = value
        .trim()
        .to_uppercase()
        .parse::<Algorithm>()
        .map_err(|e| invalid(e.to_string()))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(invalid(format!("{other:?} is not an HMAC algorithm"))),
    }
}
