use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::debug;

use crate::db::models::SnapshotRow;
use crate::error::Result;
use crate::types::Snapshot;

const SELECT_SNAPSHOT: &str = r#"
    SELECT
        CoinMarket           AS coin_market,
        LastDistanceFromHigh AS distance_from_high,
        LastHighPrice        AS high_price,
        LastLowPrice         AS low_price
    FROM bitsodata
    WHERE CoinMarket = ?
"#;

/// Single-table store of the previous reading per market.
///
/// Holds one connection for the lifetime of a run. Call [`SnapshotStore::close`]
/// when done; dropping the store without closing still releases the connection.
pub struct SnapshotStore {
    conn: SqliteConnection,
}

impl SnapshotStore {
    /// Open (creating if missing) the SQLite file at `db_path` and apply migrations.
    pub async fn open(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::connect(options).await
    }

    #[cfg(test)]
    /// Private in-memory database, gone once the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        use std::str::FromStr;
        Self::connect(SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let mut conn = options.connect().await?;
        sqlx::migrate!("./migrations").run(&mut conn).await?;
        Ok(Self { conn })
    }

    /// Store `current` and return what was stored for the same market before.
    ///
    /// Read and write share one transaction. Inserts when the market has no row
    /// yet, otherwise updates it in place.
    pub async fn exchange(&mut self, current: &Snapshot) -> Result<Option<Snapshot>> {
        let mut tx = self.conn.begin().await?;

        let previous: Option<Snapshot> = sqlx::query_as::<_, SnapshotRow>(SELECT_SNAPSHOT)
            .bind(&current.coin_market)
            .fetch_optional(&mut *tx)
            .await?
            .map(Snapshot::from);

        if previous.is_some() {
            sqlx::query(
                r#"
                UPDATE bitsodata
                SET LastDistanceFromHigh = ?, LastHighPrice = ?, LastLowPrice = ?
                WHERE CoinMarket = ?
                "#,
            )
            .bind(current.distance_from_high)
            .bind(current.high_price)
            .bind(current.low_price)
            .bind(&current.coin_market)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO bitsodata (CoinMarket, LastDistanceFromHigh, LastHighPrice, LastLowPrice)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&current.coin_market)
            .bind(current.distance_from_high)
            .bind(current.high_price)
            .bind(current.low_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            market = %current.coin_market,
            inserted = previous.is_none(),
            "snapshot stored"
        );
        Ok(previous)
    }

    #[cfg(test)]
    pub async fn load(&mut self, coin_market: &str) -> Result<Option<Snapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(SELECT_SNAPSHOT)
            .bind(coin_market)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row.map(Snapshot::from))
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn count(&mut self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bitsodata")
            .fetch_one(&mut self.conn)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(market: &str, pct: f64, high: f64, low: f64) -> Snapshot {
        Snapshot {
            coin_market: market.to_string(),
            distance_from_high: Some(pct),
            high_price: Some(high),
            low_price: Some(low),
        }
    }

    #[tokio::test]
    async fn first_exchange_inserts_and_returns_none() {
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let previous = store.exchange(&snapshot("btc_mxn", 40.0, 100.0, 50.0)).await.unwrap();
        assert!(previous.is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn second_exchange_returns_first_and_updates_in_place() {
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let first = snapshot("btc_mxn", 40.0, 100.0, 50.0);
        let second = snapshot("btc_mxn", 10.0, 120.0, 50.0);

        store.exchange(&first).await.unwrap();
        let previous = store.exchange(&second).await.unwrap();

        assert_eq!(previous, Some(first));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.load("btc_mxn").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn markets_are_kept_apart() {
        let mut store = SnapshotStore::in_memory().await.unwrap();
        store.exchange(&snapshot("btc_mxn", 40.0, 100.0, 50.0)).await.unwrap();
        let previous = store.exchange(&snapshot("eth_mxn", 20.0, 10.0, 5.0)).await.unwrap();
        assert!(previous.is_none());
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.load("xrp_mxn").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn path_is_used_verbatim() {
        // '?' and '%' would be read as URL syntax if the path went through a sqlite:// URL
        let path = std::env::temp_dir().join(format!("bitso ticker?mode=ro%41-{}.db", std::process::id()));
        let path_str = path.to_str().unwrap();
        let _ = std::fs::remove_file(&path);

        let mut store = SnapshotStore::open(path_str).await.unwrap();
        store.exchange(&snapshot("btc_mxn", 40.0, 100.0, 50.0)).await.unwrap();
        store.close().await.unwrap();
        assert!(path.exists());

        let mut reopened = SnapshotStore::open(path_str).await.unwrap();
        assert_eq!(
            reopened.load("btc_mxn").await.unwrap(),
            Some(snapshot("btc_mxn", 40.0, 100.0, 50.0))
        );
        reopened.close().await.unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn null_columns_round_trip_as_none() {
        let mut store = SnapshotStore::in_memory().await.unwrap();
        let empty = Snapshot {
            coin_market: "btc_usd".to_string(),
            distance_from_high: None,
            high_price: None,
            low_price: None,
        };
        store.exchange(&empty).await.unwrap();
        assert_eq!(store.load("btc_usd").await.unwrap(), Some(empty));
    }
}
