//! Configuration loading from disk and environment.
//!
//! Tunables (listener, timeouts, rate limit policies) come from an optional
//! TOML file. Collaborator credentials are secrets and come from the
//! environment only; each optional collaborator resolves to a capability
//! exactly once here, at startup, never per request.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the storage API base URL.
pub const ENV_STORAGE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the storage service credential.
pub const ENV_STORAGE_SERVICE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
/// Environment variable holding the CAPTCHA verification secret.
pub const ENV_CAPTCHA_SECRET: &str = "HCAPTCHA_SECRET_KEY";
/// Environment variable holding the public CAPTCHA site key (client-side
/// only; surfaced for completeness, never used in admission decisions).
pub const ENV_CAPTCHA_SITE_KEY: &str = "HCAPTCHA_SITE_KEY";
/// Environment variable holding the email provider credential.
pub const ENV_EMAIL_API_KEY: &str = "SENDGRID_API_KEY";
/// Environment variable holding the verified sender address.
pub const ENV_EMAIL_FROM: &str = "SENDGRID_FROM";
/// Environment variable holding the recipient for the diagnostic send.
pub const ENV_EMAIL_TEST_RECIPIENT: &str = "EMAIL_TEST_RECIPIENT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// With no path, defaults apply; a missing explicit path is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Credentials for the storage collaborator. Both parts are required for
/// any insert to succeed.
#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub url: Url,
    pub service_key: String,
}

/// Credentials for the email provider. Both the API key and a verified
/// sender are required before any send is attempted.
#[derive(Debug, Clone)]
pub struct EmailCredentials {
    pub api_key: String,
    pub from: String,
}

/// Collaborator credentials resolved from the environment at startup.
///
/// Every field except storage is optional: absence disables the
/// corresponding workflow stage rather than failing startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub storage: Option<StorageCredentials>,
    pub captcha_secret: Option<String>,
    pub captcha_site_key: Option<String>,
    pub email: Option<EmailCredentials>,
    pub email_test_recipient: Option<String>,
}

impl Credentials {
    /// Read collaborator credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = match (non_empty(ENV_STORAGE_URL), non_empty(ENV_STORAGE_SERVICE_KEY)) {
            (Some(url), Some(service_key)) => {
                let url = url.parse().map_err(|source| ConfigError::InvalidUrl {
                    var: ENV_STORAGE_URL,
                    source,
                })?;
                Some(StorageCredentials { url, service_key })
            }
            (None, None) => None,
            (url, _) => {
                // Half-configured storage is a deployment mistake; call it
                // out instead of silently running without persistence.
                let missing = if url.is_none() {
                    ENV_STORAGE_URL
                } else {
                    ENV_STORAGE_SERVICE_KEY
                };
                tracing::warn!(missing, "storage partially configured, treating as disabled");
                None
            }
        };

        let email = match (non_empty(ENV_EMAIL_API_KEY), non_empty(ENV_EMAIL_FROM)) {
            (Some(api_key), Some(from)) => Some(EmailCredentials { api_key, from }),
            (None, None) => None,
            (api_key, _) => {
                let missing = if api_key.is_none() {
                    ENV_EMAIL_API_KEY
                } else {
                    ENV_EMAIL_FROM
                };
                tracing::warn!(missing, "email partially configured, treating as disabled");
                None
            }
        };

        Ok(Self {
            storage,
            captcha_secret: non_empty(ENV_CAPTCHA_SECRET),
            captcha_site_key: non_empty(ENV_CAPTCHA_SITE_KEY),
            email,
            email_test_recipient: non_empty(ENV_EMAIL_TEST_RECIPIENT),
        })
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/waitlist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = std::env::temp_dir().join("waitlist-api-loader-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
