//! Server configuration loaded from the environment at startup.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime settings for the server.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to bind.
    pub port: u16,
    /// Shared secret the payment processor signs webhook deliveries with.
    pub webhook_secret: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// - `SHIPLOG_PORT` (default `8080`)
    /// - `SHIPLOG_WEBHOOK_SECRET` (default `dev-secret`, with a warning:
    ///   production deployments must set their own)
    #[must_use]
    pub fn load() -> Self {
        Self {
            port: try_load("SHIPLOG_PORT", 8080),
            webhook_secret: load_secret("SHIPLOG_WEBHOOK_SECRET"),
        }
    }
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("invalid {key} value {raw:?} ({e}), using default: {default}");
            default
        }
    }
}

fn load_secret(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{key} not set, falling back to the development secret");
        "dev-secret".to_owned()
    })
}
