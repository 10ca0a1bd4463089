//! SQLite-backed product cache.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tillpoint_core::Product;

use crate::error::CacheError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY,
    barcode     TEXT NOT NULL DEFAULT '',
    name        TEXT NOT NULL DEFAULT '',
    unit_price  REAL NOT NULL DEFAULT 0.0
);
CREATE INDEX IF NOT EXISTS idx_products_barcode ON products(barcode);
CREATE TABLE IF NOT EXISTS cache_meta (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
";

const META_SYNCED_AT: &str = "synced_at";

/// Keyed product store over a single SQLite file.
///
/// Upserts replace whole rows by product id (last write wins) and record the
/// synchronization time. One client instance owns the file; the connection is
/// guarded by a mutex so lookups from concurrent background tasks serialize.
pub struct ProductCache {
    conn: Mutex<Connection>,
}

impl ProductCache {
    /// Open the cache at the given path, creating the schema if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| CacheError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open a transient in-memory cache.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or replace the given products in one transaction.
    ///
    /// Returns the number of rows written and stamps the sync time.
    pub fn upsert_all(&self, products: &[Product]) -> Result<usize, CacheError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO products (id, barcode, name, unit_price)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for product in products {
                stmt.execute(params![
                    product.id,
                    product.barcode,
                    product.name,
                    product.unit_price
                ])?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO cache_meta (key, value) VALUES (?1, ?2)",
            params![META_SYNCED_AT, Utc::now().timestamp().to_string()],
        )?;
        tx.commit()?;

        tracing::debug!(count = products.len(), "product cache updated");
        Ok(products.len())
    }

    /// Look up a product by barcode.
    ///
    /// Returns `Ok(None)` when the barcode is unknown locally.
    pub fn find_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CacheError> {
        let conn = self.conn.lock();
        let product = conn
            .query_row(
                "SELECT id, barcode, name, unit_price FROM products WHERE barcode = ?1",
                params![barcode],
                |row| {
                    Ok(Product {
                        id: row.get(0)?,
                        barcode: row.get(1)?,
                        name: row.get(2)?,
                        unit_price: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    /// Number of cached products.
    pub fn product_count(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock();
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    /// When the cache was last synchronized, if ever.
    pub fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        let conn = self.conn.lock();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM cache_meta WHERE key = ?1",
                params![META_SYNCED_AT],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)))
    }
}

impl std::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, barcode: &str, name: &str, price: f64) -> Product {
        Product {
            id,
            barcode: barcode.to_string(),
            name: name.to_string(),
            unit_price: price,
        }
    }

    #[test]
    fn upsert_then_lookup_by_barcode() {
        let cache = ProductCache::open_in_memory().unwrap();

        cache
            .upsert_all(&[sample(123, "074312038228", "Omega 3", 500.0)])
            .unwrap();

        let product = cache.find_by_barcode("074312038228").unwrap().unwrap();
        assert_eq!(product.id, 123);
        assert_eq!(product.name, "Omega 3");
        assert_eq!(product.unit_price, 500.0);
    }

    #[test]
    fn unknown_barcode_is_none() {
        let cache = ProductCache::open_in_memory().unwrap();
        assert!(cache.find_by_barcode("000000000000").unwrap().is_none());
    }

    #[test]
    fn upsert_same_id_replaces_row() {
        let cache = ProductCache::open_in_memory().unwrap();

        cache.upsert_all(&[sample(1, "111", "Old name", 100.0)]).unwrap();
        cache.upsert_all(&[sample(1, "111", "New name", 150.0)]).unwrap();

        assert_eq!(cache.product_count().unwrap(), 1);
        let product = cache.find_by_barcode("111").unwrap().unwrap();
        assert_eq!(product.name, "New name");
        assert_eq!(product.unit_price, 150.0);
    }

    #[test]
    fn sync_timestamp_recorded() {
        let cache = ProductCache::open_in_memory().unwrap();
        assert!(cache.last_synced_at().unwrap().is_none());

        cache.upsert_all(&[sample(1, "111", "A", 1.0)]).unwrap();

        let synced = cache.last_synced_at().unwrap().unwrap();
        assert!(synced <= Utc::now());
    }

    #[test]
    fn empty_upsert_still_stamps_sync_time() {
        let cache = ProductCache::open_in_memory().unwrap();
        cache.upsert_all(&[]).unwrap();
        assert!(cache.last_synced_at().unwrap().is_some());
    }

    #[test]
    fn cache_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.db");

        {
            let cache = ProductCache::open(&path).unwrap();
            cache.upsert_all(&[sample(9, "999", "Kept", 9.0)]).unwrap();
        }

        let cache = ProductCache::open(&path).unwrap();
        assert_eq!(cache.find_by_barcode("999").unwrap().unwrap().name, "Kept");
    }
}
