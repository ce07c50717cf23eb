mod config;
mod db;
mod error;
mod fetcher;
mod notifier;
mod render;
mod tracker;
mod types;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::SnapshotStore;
use crate::error::{AppError, Result};
use crate::fetcher::fetch_ticker;
use crate::notifier::{announce, Notifier, SpeechNotifier};
use crate::render::{format_local_timestamp, render_menu, MenuLine, MenuView};
use crate::tracker::{distance_color, distance_from_high, AlertPolicy, HistoryTracker};
use crate::types::{Snapshot, TickerReading};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(AppError::NotConfigured) => {
            // Shown in the menu bar until the plugin preferences are filled in.
            println!("{}", AppError::NotConfigured);
            return;
        }
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // stdout belongs to xbar
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    let notifier = SpeechNotifier::new(cfg.speech_command.clone());
    match run(&cfg, &notifier).await {
        Ok(lines) => {
            for line in &lines {
                println!("{line}");
            }
        }
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cfg: &Config, notifier: &dyn Notifier) -> Result<Vec<MenuLine>> {
    let mut store = SnapshotStore::open(&cfg.db_path).await?;
    debug!("Snapshot store ready at {}", cfg.db_path);

    let reading = fetch_ticker(cfg).await?;
    info!(
        market = %cfg.coin_market,
        last = reading.last,
        high = reading.high,
        low = reading.low,
        "ticker fetched"
    );

    let lines = process(cfg, &mut store, notifier, &reading).await?;
    store.close().await?;
    Ok(lines)
}

/// Everything after the fetch: track the reading, voice alerts, build the menu.
async fn process(
    cfg: &Config,
    store: &mut SnapshotStore,
    notifier: &dyn Notifier,
    reading: &TickerReading,
) -> Result<Vec<MenuLine>> {
    let percentile = distance_from_high(reading.last, reading.low, reading.high)?;
    let current = Snapshot::observed(&cfg.coin_market, percentile, reading);

    let tracker = HistoryTracker::new(AlertPolicy::from_config(cfg));
    let alerts = tracker.observe(store, &current).await?;
    announce(notifier, &alerts).await?;

    let color = distance_color(percentile);
    let timestamp = format_local_timestamp(&reading.created_at);
    Ok(render_menu(&MenuView {
        coin_name: &cfg.coin_name,
        market_name: &cfg.market_name,
        coin_investment: cfg.coin_investment,
        reading,
        distance_from_high: percentile,
        distance_color: &color,
        dark_mode: cfg.dark_mode,
        timestamp: &timestamp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::parse_created_at;
    use crate::notifier::testing::RecordingNotifier;

    fn config(talk: &str, dark_mode: &str) -> Config {
        let vars = [
            ("VAR_COIN_MARKET", "btc_mxn"),
            ("VAR_COIN_INVESTMENT", "0.5"),
            ("VAR_TALK", talk),
            ("VAR_HIGH_LIMIT_PERCENT", "15"),
            ("VAR_LOW_LIMIT_PERCENT", "15"),
            ("XBARDarkMode", dark_mode),
            ("BITSO_DB_PATH", ":unused:"),
        ];
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    fn reading(last: f64, high: f64, low: f64) -> TickerReading {
        TickerReading {
            last,
            high,
            low,
            ask: last + 1.0,
            bid: last - 1.0,
            volume: 12.5,
            vwap: last,
            created_at: parse_created_at("2024-01-15T12:00:00+00:00").unwrap(),
        }
    }

    #[tokio::test]
    async fn first_run_is_silent_and_renders_menu() {
        let cfg = config("Yes", "false");
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let notifier = RecordingNotifier::default();

        let lines = process(&cfg, &mut store, &notifier, &reading(75.0, 100.0, 50.0))
            .await
            .unwrap();

        assert!(notifier.messages().is_empty());
        assert_eq!(lines[0].to_string(), "BTC $75.0 MXN");
        assert_eq!(lines[4].to_string(), "$37.5 MXN | color=#000000");
        assert_eq!(lines[7].to_string(), "Distance From High: 50% | color=#000000");
        assert_eq!(lines[8].to_string(), "Distance From Low: 50% | color=#000000");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn new_high_on_second_run_is_spoken() {
        let cfg = config("yes", "true");
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let notifier = RecordingNotifier::default();

        process(&cfg, &mut store, &notifier, &reading(75.0, 100.0, 50.0)).await.unwrap();
        let lines = process(&cfg, &mut store, &notifier, &reading(110.0, 110.0, 50.0))
            .await
            .unwrap();

        assert_eq!(notifier.messages(), vec!["There is a new High Price!".to_string()]);
        assert_eq!(lines[0].to_string(), "BTC $110.0 MXN | color=#00FF00");
    }

    #[tokio::test]
    async fn talk_off_keeps_quiet_but_tracks() {
        let cfg = config("No", "false");
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let notifier = RecordingNotifier::default();

        process(&cfg, &mut store, &notifier, &reading(75.0, 100.0, 50.0)).await.unwrap();
        process(&cfg, &mut store, &notifier, &reading(40.0, 100.0, 40.0)).await.unwrap();

        assert!(notifier.messages().is_empty());
        let stored = store.load("btc_mxn").await.unwrap().unwrap();
        assert_eq!(stored.distance_from_high, Some(100.0));
        assert_eq!(stored.low_price, Some(40.0));
    }

    #[tokio::test]
    async fn flat_range_fails_before_touching_store() {
        let cfg = config("Yes", "false");
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let notifier = RecordingNotifier::default();

        let err = process(&cfg, &mut store, &notifier, &reading(10.0, 10.0, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DegenerateRange(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
