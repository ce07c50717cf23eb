use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// VAR_COIN_MARKET is not set; the plugin has not been configured yet.
    #[error("Configure with plugin browser!")]
    NotConfigured,

    #[error("Ticker API error: {0}")]
    Api(String),

    #[error("Ticker payload error: {0}")]
    Parse(String),

    #[error("Degenerate price range: high == low == {0}")]
    DegenerateRange(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
