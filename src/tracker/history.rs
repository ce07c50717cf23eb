use tracing::info;

use crate::config::Config;
use crate::db::SnapshotStore;
use crate::error::Result;
use crate::types::{Alert, Snapshot};

/// When and what to alert. Built once from [`Config`].
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    pub enabled: bool,
    pub high_limit_percent: i64,
    /// Already inverted: `100 - VAR_LOW_LIMIT_PERCENT`.
    pub low_limit_percent: i64,
    pub close_to_high_alert: String,
    pub close_to_low_alert: String,
}

impl AlertPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            enabled: cfg.talk,
            high_limit_percent: cfg.high_limit_percent,
            low_limit_percent: cfg.low_limit_percent,
            close_to_high_alert: cfg.close_to_high_alert.clone(),
            close_to_low_alert: cfg.close_to_low_alert.clone(),
        }
    }
}

/// Compare the previous snapshot of a market with the current one.
///
/// The high side is decided first, then the low side; each side yields at most
/// one alert and both may fire on the same run. A new 24h extreme wins over the
/// threshold message for its side. Threshold alerts need the percentile to have
/// moved toward that side since the previous run.
pub fn evaluate_alerts(previous: &Snapshot, current: &Snapshot, policy: &AlertPolicy) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if !policy.enabled {
        return alerts;
    }

    // (previous, current) percentile, only when it changed
    let moved = match (previous.distance_from_high, current.distance_from_high) {
        (Some(last), Some(now)) if last != now => Some((last, now)),
        _ => None,
    };

    match (recorded(previous.high_price), current.high_price) {
        (Some(last_high), Some(high)) if last_high < high => alerts.push(Alert::NewHigh),
        _ => {
            if let Some((last, now)) = moved {
                if now < last && now <= policy.high_limit_percent as f64 {
                    alerts.push(Alert::CloseToHigh(policy.close_to_high_alert.clone()));
                }
            }
        }
    }

    match (recorded(previous.low_price), current.low_price) {
        (Some(last_low), Some(low)) if last_low > low => alerts.push(Alert::NewLow),
        _ => {
            if let Some((last, now)) = moved {
                if now > last && now >= policy.low_limit_percent as f64 {
                    alerts.push(Alert::CloseToLow(policy.close_to_low_alert.clone()));
                }
            }
        }
    }

    alerts
}

/// A stored price of 0 counts as never recorded.
fn recorded(price: Option<f64>) -> Option<f64> {
    price.filter(|p| *p != 0.0)
}

/// Per-market history: UNSEEN until the first snapshot is stored, TRACKED after.
pub struct HistoryTracker {
    policy: AlertPolicy,
}

impl HistoryTracker {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    /// Persist `current` and return the alerts it triggers against the previous run.
    /// A market seen for the first time never alerts.
    pub async fn observe(&self, store: &mut SnapshotStore, current: &Snapshot) -> Result<Vec<Alert>> {
        let Some(previous) = store.exchange(current).await? else {
            info!(market = %current.coin_market, "first observation, snapshot created");
            return Ok(Vec::new());
        };

        let alerts = evaluate_alerts(&previous, current, &self.policy);
        info!(
            market = %current.coin_market,
            previous_pct = ?previous.distance_from_high,
            current_pct = ?current.distance_from_high,
            alerts = alerts.len(),
            "snapshot updated"
        );
        Ok(alerts)
    }
}
