use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// One reading of the Bitso ticker. Fetched fresh every run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReading {
    pub last: f64,
    pub high: f64,
    pub low: f64,
    pub ask: f64,
    pub bid: f64,
    /// 24h volume in the coin
    pub volume: f64,
    pub vwap: f64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Percentile and range for one market, as persisted between runs.
/// Columns are nullable in the store, so every value is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub coin_market: String,
    pub distance_from_high: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
}

impl Snapshot {
    pub fn observed(coin_market: &str, distance_from_high: i64, reading: &TickerReading) -> Self {
        Self {
            coin_market: coin_market.to_string(),
            distance_from_high: Some(distance_from_high as f64),
            high_price: Some(reading.high),
            low_price: Some(reading.low),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The 24h high moved up since the previous run.
    NewHigh,
    /// Price moved toward the high and is within the configured limit. Carries VAR_CLOSE_TO_HIGH_ALERT.
    CloseToHigh(String),
    /// The 24h low moved down since the previous run.
    NewLow,
    /// Price moved toward the low and is within the configured limit. Carries VAR_CLOSE_TO_LOW_ALERT.
    CloseToLow(String),
}

impl Alert {
    /// The phrase handed to the speech command.
    pub fn message(&self) -> &str {
        match self {
            Alert::NewHigh => "There is a new High Price!",
            Alert::NewLow => "There is a new Low Price!",
            Alert::CloseToHigh(msg) | Alert::CloseToLow(msg) => msg,
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Alert::NewHigh => "new_high",
            Alert::CloseToHigh(_) => "close_to_high",
            Alert::NewLow => "new_low",
            Alert::CloseToLow(_) => "close_to_low",
        };
        write!(f, "{s}")
    }
}
