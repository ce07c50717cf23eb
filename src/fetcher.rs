use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use tracing::debug;

use crate::config::{Config, USER_AGENT};
use crate::error::{AppError, Result};
use crate::types::TickerReading;

// ---------------------------------------------------------------------------
// Wire types for GET /ticker
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TickerResponse {
    success: bool,
    payload: Option<TickerPayload>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Bitso sends prices as decimal strings; plain JSON numbers are accepted as well.
#[derive(Debug, Deserialize)]
struct TickerPayload {
    #[serde(deserialize_with = "string_or_number")]
    last: f64,
    #[serde(deserialize_with = "string_or_number")]
    high: f64,
    #[serde(deserialize_with = "string_or_number")]
    low: f64,
    #[serde(deserialize_with = "string_or_number")]
    ask: f64,
    #[serde(deserialize_with = "string_or_number")]
    bid: f64,
    #[serde(deserialize_with = "string_or_number")]
    volume: f64,
    #[serde(deserialize_with = "string_or_number")]
    vwap: f64,
    created_at: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => Ok(n),
        RawPrice::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("price is not a number: {s:?}"))),
    }
}

/// Fetch the current ticker for `cfg.coin_market` from the Bitso REST API.
pub async fn fetch_ticker(cfg: &Config) -> Result<TickerReading> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?;

    let url = ticker_url(&cfg.api_url, &cfg.coin_market);
    debug!(url = %url, "requesting ticker");

    let body = client.get(&url).send().await?.text().await?;
    parse_ticker(&body)
}

pub fn ticker_url(api_url: &str, coin_market: &str) -> String {
    format!("{}/ticker/?book={}", api_url.trim_end_matches('/'), coin_market)
}

/// Parse a `/ticker` response body.
pub fn parse_ticker(body: &str) -> Result<TickerReading> {
    let resp: TickerResponse = serde_json::from_str(body)?;
    if !resp.success {
        let detail = resp
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "success=false".to_string());
        return Err(AppError::Api(detail));
    }

    let payload = resp
        .payload
        .ok_or_else(|| AppError::Parse("response has no payload".to_string()))?;

    Ok(TickerReading {
        last: payload.last,
        high: payload.high,
        low: payload.low,
        ask: payload.ask,
        bid: payload.bid,
        volume: payload.volume,
        vwap: payload.vwap,
        created_at: parse_created_at(&payload.created_at)?,
    })
}

/// `2016-04-08T17:52:31.000+00:00`. Timestamps without an offset are taken as UTC.
pub fn parse_created_at(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| AppError::Parse(format!("created_at {s:?}: {e}")))
}
