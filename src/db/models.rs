//! Row type for the `bitsodata` table, columns aliased to snake_case in queries.

use crate::types::Snapshot;

#[derive(Debug, sqlx::FromRow)]
pub struct SnapshotRow {
    pub coin_market: String,
    pub distance_from_high: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
}

impl From<SnapshotRow> for Snapshot {
    fn from(row: SnapshotRow) -> Self {
        Snapshot {
            coin_market: row.coin_market,
            distance_from_high: row.distance_from_high,
            high_price: row.high_price,
            low_price: row.low_price,
        }
    }
}
