//! Environment-driven configuration.

use std::env;

use secrecy::SecretString;

/// Minimum length of a signing secret, in bytes.
const MIN_SECRET_LENGTH: usize = 32;

/// Values that show up in tutorials and .env templates; refusing them keeps
/// a copy-pasted deployment from signing tokens with a guessable key.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "changeme",
    "change-me",
    "secret",
    "your-secret-key",
    "super-secret",
    "please-change-this-secret-in-production",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub host: String,
    pub port: u16,
    pub catalog_base_url: String,
    pub jwt_secret: SecretString,
    /// Shared with the OAuth gateway, which signs social-login payloads.
    pub social_gateway_secret: SecretString,
    pub token_ttl_minutes: i64,
}

impl AppConfig {
    /// Loads configuration from the environment. `.env` is read beforehand
    /// by `main`, so plain process environment wins over the file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("FAVORITOS_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .map_err(|_| ConfigError::MissingVar("FAVORITOS_DATABASE_URL"))?;

        let host = env::var("FAVORITOS_HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());
        let port = parse_var("FAVORITOS_PORT", 8000)?;

        let catalog_base_url = env::var("FAVORITOS_CATALOG_URL")
            .unwrap_or_else(|_| "https://fakestoreapi.com".to_owned());

        let jwt_secret =
            env::var("FAVORITOS_JWT_SECRET").map_err(|_| ConfigError::MissingVar("FAVORITOS_JWT_SECRET"))?;
        validate_secret("FAVORITOS_JWT_SECRET", &jwt_secret)?;

        let social_gateway_secret = env::var("FAVORITOS_SOCIAL_GATEWAY_SECRET")
            .map_err(|_| ConfigError::MissingVar("FAVORITOS_SOCIAL_GATEWAY_SECRET"))?;
        validate_secret("FAVORITOS_SOCIAL_GATEWAY_SECRET", &social_gateway_secret)?;

        let token_ttl_minutes = parse_var("FAVORITOS_TOKEN_TTL_MINUTES", 1440)?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            catalog_base_url,
            jwt_secret: SecretString::from(jwt_secret),
            social_gateway_secret: SecretString::from(social_gateway_secret),
            token_ttl_minutes,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|err: T::Err| ConfigError::InvalidVar {
            name,
            reason: err.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn validate_secret(name: &'static str, secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InvalidVar {
            name,
            reason: format!("must be at least {MIN_SECRET_LENGTH} bytes"),
        });
    }
    let lowered = secret.to_ascii_lowercase();
    if PLACEHOLDER_SECRETS.iter().any(|p| lowered.contains(p)) {
        return Err(ConfigError::InvalidVar {
            name,
            reason: "looks like a placeholder value".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_is_rejected() {
        assert!(validate_secret("FAVORITOS_JWT_SECRET", "too-short").is_err());
    }

    #[test]
    fn test_placeholder_secret_is_rejected() {
        let err = validate_secret(
            "FAVORITOS_JWT_SECRET",
            "please-change-this-secret-in-production",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));
        assert!(
            validate_secret(
                "FAVORITOS_SOCIAL_GATEWAY_SECRET",
                "CHANGEME-changeme-changeme-changeme"
            )
            .is_err()
        );
    }

    #[test]
    fn test_long_random_secret_is_accepted() {
        assert!(validate_secret("FAVORITOS_JWT_SECRET", "kP3qvJ9tR1wX5yB7dF2hL8nM4cV6zA0s").is_ok());
    }
}
