use tracing::debug;

use crate::error::{AppError, Result};

pub const BITSO_API_URL: &str = "https://api.bitso.com/v3";

/// Bitso rejects requests without a browser-like agent.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Snapshot store file, relative to $HOME.
pub const DB_FILE_NAME: &str = ".xbar_bitsodata.db";

pub const SPEECH_COMMAND: &str = "say";

/// Fallback for VAR_HIGH_LIMIT_PERCENT / VAR_LOW_LIMIT_PERCENT when unset or malformed.
pub const DEFAULT_LIMIT_PERCENT: i64 = 15;

pub const DEFAULT_CLOSE_TO_HIGH_ALERT: &str = "Coin is moving high!";
pub const DEFAULT_CLOSE_TO_LOW_ALERT: &str = "Coin is moving down!";

pub const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bitso book as configured, e.g. "btc_mxn" (VAR_COIN_MARKET)
    pub coin_market: String,
    /// Upper-cased first symbol of the book, e.g. "BTC"
    pub coin_name: String,
    /// Upper-cased second symbol of the book, e.g. "MXN"
    pub market_name: String,
    /// Quantity of the coin owned (VAR_COIN_INVESTMENT)
    pub coin_investment: f64,
    /// Speak alerts (VAR_TALK = "Yes")
    pub talk: bool,
    /// Percentile at or below which the close-to-high alert fires (VAR_HIGH_LIMIT_PERCENT)
    pub high_limit_percent: i64,
    /// Percentile at or above which the close-to-low alert fires.
    /// Stored as `100 - VAR_LOW_LIMIT_PERCENT`.
    pub low_limit_percent: i64,
    pub close_to_high_alert: String,
    pub close_to_low_alert: String,
    /// XBARDarkMode = "true"
    pub dark_mode: bool,
    pub api_url: String,
    pub db_path: String,
    pub speech_command: String,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let coin_market = lookup("VAR_COIN_MARKET").ok_or(AppError::NotConfigured)?;
        let (coin_name, market_name) = split_market(&coin_market)?;

        let db_path = match lookup("BITSO_DB_PATH") {
            Some(path) => path,
            None => {
                let home = lookup("HOME").ok_or_else(|| {
                    AppError::Config("HOME must be set to locate the snapshot store".to_string())
                })?;
                format!("{}/{}", home.trim_end_matches('/'), DB_FILE_NAME)
            }
        };

        Ok(Self {
            coin_investment: lookup("VAR_COIN_INVESTMENT")
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(0.0),
            talk: lookup("VAR_TALK")
                .map(|s| s.trim().eq_ignore_ascii_case("yes"))
                .unwrap_or(false),
            high_limit_percent: limit_percent(&lookup, "VAR_HIGH_LIMIT_PERCENT"),
            low_limit_percent: 100 - limit_percent(&lookup, "VAR_LOW_LIMIT_PERCENT"),
            close_to_high_alert: lookup("VAR_CLOSE_TO_HIGH_ALERT")
                .unwrap_or_else(|| DEFAULT_CLOSE_TO_HIGH_ALERT.to_string()),
            close_to_low_alert: lookup("VAR_CLOSE_TO_LOW_ALERT")
                .unwrap_or_else(|| DEFAULT_CLOSE_TO_LOW_ALERT.to_string()),
            dark_mode: lookup("XBARDarkMode").as_deref() == Some("true"),
            api_url: lookup("BITSO_API_URL").unwrap_or_else(|| BITSO_API_URL.to_string()),
            db_path,
            speech_command: lookup("SPEECH_COMMAND").unwrap_or_else(|| SPEECH_COMMAND.to_string()),
            http_timeout_secs: lookup("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(HTTP_TIMEOUT_SECS),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
            coin_market,
            coin_name,
            market_name,
        })
    }
}

/// `btc_mxn` → ("BTC", "MXN").
fn split_market(coin_market: &str) -> Result<(String, String)> {
    let upper = coin_market.to_uppercase();
    let mut parts = upper.split('_');
    match (parts.next(), parts.next()) {
        (Some(coin), Some(market)) if !coin.is_empty() && !market.is_empty() => {
            Ok((coin.to_string(), market.to_string()))
        }
        _ => Err(AppError::Config(format!(
            "VAR_COIN_MARKET must look like coin_book (e.g. btc_mxn), got {coin_market:?}"
        ))),
    }
}

fn limit_percent<F>(lookup: &F, key: &str) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|s| s.trim().parse::<i64>()) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            debug!("{key} is not an integer ({e}), using {DEFAULT_LIMIT_PERCENT}");
            DEFAULT_LIMIT_PERCENT
        }
        None => DEFAULT_LIMIT_PERCENT,
    }
}
