use reqwest::Url;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const URL_VAR: &str = "SPLUNK_SOAR_URL";
pub const TOKEN_VAR: &str = "SPLUNK_SOAR_TOKEN";
pub const VERIFY_SSL_VAR: &str = "SPLUNK_SOAR_VERIFY_SSL";
pub const TIMEOUT_VAR: &str = "SPLUNK_SOAR_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} is not a valid absolute http(s) URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the target SOAR instance.
///
/// Built once at startup and handed by reference to whatever needs it.
#[derive(Clone)]
pub struct SoarConfig {
    pub base_url: Url,
    pub token: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

impl fmt::Debug for SoarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoarConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SoarConfig {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::Missing(TOKEN_VAR));
        }

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: token.trim().to_string(),
            verify_ssl: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup, so the
    /// rules can be checked without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let base_url = required(URL_VAR)?;
        let token = required(TOKEN_VAR)?;

        let mut config = Self::new(&base_url, token)?;

        if let Some(raw) = lookup(VERIFY_SSL_VAR).filter(|v| !v.trim().is_empty()) {
            config.verify_ssl = parse_bool(VERIFY_SSL_VAR, &raw)?;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.timeout = parse_timeout(TIMEOUT_VAR, &raw)?;
        }

        Ok(config)
    }

    /// Joins a REST path (e.g. `/container/7`) onto `<base>/rest`.
    pub fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/rest/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Missing(URL_VAR));
    }

    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        var: URL_VAR,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var: URL_VAR,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            var: URL_VAR,
            reason: "missing host".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl {
            var: URL_VAR,
            reason: "query strings and fragments are not allowed".to_string(),
        });
    }

    Ok(url)
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("timeout must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(invalid("expected a whole number of seconds")),
    }
}
