use std::time::Duration;

use printables_core::product::ProductType;

/// A configuration variable holds a value that cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash (default: `http://localhost:3000`).
    pub api_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Period of the background session refresh in seconds (default: `60`).
    pub token_refresh_interval_secs: u64,
    /// Storefront section managed by this client (default: `DIGITAL_PRINTABLE`).
    pub product_type: ProductType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            request_timeout_secs: 30,
            token_refresh_interval_secs: 60,
            product_type: ProductType::DigitalPrintable,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `PRINTABLES_API_URL`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `TOKEN_REFRESH_INTERVAL_SECS` | `60`                    |
    /// | `PRODUCT_TYPE`                | `DIGITAL_PRINTABLE`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("PRINTABLES_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError {
                var: "PRINTABLES_API_URL",
                value: api_url,
                expected: "an http(s) URL",
            });
        }

        let request_timeout_secs =
            parse_secs(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
        let token_refresh_interval_secs = parse_secs(
            &lookup,
            "TOKEN_REFRESH_INTERVAL_SECS",
            defaults.token_refresh_interval_secs,
        )?;

        let product_type = match lookup("PRODUCT_TYPE") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError {
                var: "PRODUCT_TYPE",
                value,
                expected: "DIGITAL_PRINTABLE or WEDDING_INVITATION",
            })?,
            None => defaults.product_type,
        };

        Ok(Self {
            api_url,
            request_timeout_secs,
            token_refresh_interval_secs,
            product_type,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_interval_secs)
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError {
            var,
            value,
            expected: "a positive number of seconds",
        }),
    }
}
