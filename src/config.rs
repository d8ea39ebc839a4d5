use time::Duration;

use crate::constants::*;

/// Process configuration, loaded once at startup.
///
/// The token secret and TTL live here and are handed to the auth component
/// explicitly; nothing reads the environment after this point.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub token_secret: String,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let data_path =
            std::env::var("DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

        let token_secret =
            std::env::var("TOKEN_SECRET").map_err(|_| "TOKEN_SECRET is required".to_string())?;
        if token_secret.len() < MIN_TOKEN_SECRET_LENGTH {
            return Err(format!(
                "TOKEN_SECRET must be at least {} characters",
                MIN_TOKEN_SECRET_LENGTH
            ));
        }

        let token_ttl_secs = match std::env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| format!("TOKEN_TTL_SECS must be an integer, got '{}'", raw))?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };
        if token_ttl_secs <= 0 {
            return Err("TOKEN_TTL_SECS must be positive".to_string());
        }

        Ok(Self {
            host,
            port,
            data_path,
            token_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
