//! Relational storage of scraped products using SQLite.
//!
//! Products are keyed by their external identifier. Saving a product again
//! overwrites every scalar column and replaces (never appends) its image
//! list and category associations, so renamed fields leave no stale rows.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;
use crate::page_extractor::ProductRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored value is malformed: {0}")]
    Malformed(String),

    #[error("invalid table prefix '{0}'")]
    InvalidPrefix(String),

    #[error("persistence is disabled")]
    Disabled,
}

/// Table names with the configured prefix applied
#[derive(Debug, Clone)]
struct Tables {
    products: String,
    images: String,
    categories: String,
    product_categories: String,
}

impl Tables {
    fn new(prefix: &str) -> Result<Self, PersistenceError> {
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PersistenceError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Self {
            products: format!("{prefix}products"),
            images: format!("{prefix}product_images"),
            categories: format!("{prefix}categories"),
            product_categories: format!("{prefix}product_categories"),
        })
    }

    fn schema(&self) -> String {
        let Self {
            products,
            images,
            categories,
            product_categories,
        } = self;
        format!(
            r#"
CREATE TABLE IF NOT EXISTS {products} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL UNIQUE,
    title TEXT,
    price TEXT,
    description TEXT,
    sku TEXT,
    oem TEXT,
    attributes TEXT,
    tags TEXT,
    url TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_{products}_sku ON {products}(sku);
CREATE INDEX IF NOT EXISTS idx_{products}_oem ON {products}(oem);

CREATE TABLE IF NOT EXISTS {images} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES {products}(id) ON DELETE CASCADE,
    image_url TEXT NOT NULL,
    image_order INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_{images}_product ON {images}(product_id);

CREATE TABLE IF NOT EXISTS {categories} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS {product_categories} (
    product_id INTEGER NOT NULL REFERENCES {products}(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES {categories}(id) ON DELETE CASCADE,
    PRIMARY KEY (product_id, category_id)
);
"#
        )
    }
}

/// A row of the products table before child collections are attached
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    external_id: String,
    title: Option<String>,
    price: Option<String>,
    description: Option<String>,
    sku: Option<String>,
    oem: Option<String>,
    attributes: Option<String>,
    tags: Option<String>,
    url: String,
    scraped_at: String,
}

/// Idempotent product store.
///
/// A disabled gateway accepts every call and stores nothing, so callers
/// never branch on whether persistence is configured.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    inner: Option<Store>,
}

#[derive(Debug, Clone)]
struct Store {
    pool: SqlitePool,
    tables: Tables,
    batch_lock: std::sync::Arc<Mutex<()>>,
}

impl PersistenceGateway {
    /// Gateway that stores nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Open (creating if missing) the configured database and its schema.
    ///
    /// Returns a disabled gateway when `config.enabled` is false.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        let tables = Tables::new(&config.table_prefix)?;

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::Database(sqlx::Error::Io(e)))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        // Idempotent (CREATE IF NOT EXISTS)
        sqlx::raw_sql(&tables.schema()).execute(&pool).await?;
        info!(url = %config.url, prefix = %config.table_prefix, "Database tables verified/created");

        Ok(Self {
            inner: Some(Store {
                pool,
                tables,
                batch_lock: std::sync::Arc::new(Mutex::new(())),
            }),
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Insert or overwrite one product; returns its row id.
    ///
    /// `Ok(None)` when the gateway is disabled.
    pub async fn upsert(&self, record: &ProductRecord) -> Result<Option<i64>, PersistenceError> {
        let Some(store) = &self.inner else {
            return Ok(None);
        };
        let mut tx = store.pool.begin().await?;
        let id = store.upsert_in(&mut tx, record).await?;
        tx.commit().await?;
        info!(external_id = %record.external_id, id, "Product saved: {}", record.display_name());
        Ok(Some(id))
    }

    /// Save every record, one transaction each; returns how many succeeded.
    ///
    /// A failing record is logged and skipped. Concurrent batches are
    /// serialized.
    pub async fn save_batch(&self, records: &[ProductRecord]) -> usize {
        let Some(store) = &self.inner else {
            return 0;
        };
        let _guard = store.batch_lock.lock().await;

        let mut saved = 0usize;
        for record in records {
            match self.upsert(record).await {
                Ok(Some(_)) => saved += 1,
                Ok(None) => {}
                Err(e) => error!(
                    external_id = %record.external_id,
                    "Failed to save product {}: {e}",
                    record.display_name()
                ),
            }
        }
        saved
    }

    /// Delete every stored row; `false` when disabled or on failure.
    pub async fn clear_all(&self) -> bool {
        let Some(store) = &self.inner else {
            return false;
        };
        match store.clear().await {
            Ok(()) => {
                warn!("All database data cleared");
                true
            }
            Err(e) => {
                error!("Failed to clear data: {e}");
                false
            }
        }
    }

    pub async fn count_products(&self) -> Result<i64, PersistenceError> {
        let store = self.store()?;
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", store.tables.products))
            .fetch_one(&store.pool)
            .await?;
        Ok(count)
    }

    /// Image list of a product in stored order
    pub async fn product_images(&self, external_id: &str) -> Result<Vec<String>, PersistenceError> {
        let store = self.store()?;
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT i.image_url FROM {images} i JOIN {products} p ON p.id = i.product_id \
             WHERE p.external_id = ? ORDER BY i.image_order",
            images = store.tables.images,
            products = store.tables.products,
        ))
        .bind(external_id)
        .fetch_all(&store.pool)
        .await?;
        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    /// Category names associated with a product, sorted by name
    pub async fn product_categories(&self, external_id: &str) -> Result<Vec<String>, PersistenceError> {
        let store = self.store()?;
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT c.name FROM {categories} c \
             JOIN {links} pc ON pc.category_id = c.id \
             JOIN {products} p ON p.id = pc.product_id \
             WHERE p.external_id = ? ORDER BY c.name",
            categories = store.tables.categories,
            links = store.tables.product_categories,
            products = store.tables.products,
        ))
        .bind(external_id)
        .fetch_all(&store.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Rebuild a stored product, child collections included
    pub async fn find_product(&self, external_id: &str) -> Result<Option<ProductRecord>, PersistenceError> {
        let store = self.store()?;
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT id, external_id, title, price, description, sku, oem, attributes, tags, url, scraped_at \
             FROM {} WHERE external_id = ?",
            store.tables.products
        ))
        .bind(external_id)
        .fetch_optional(&store.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attributes: BTreeMap<String, Option<String>> = match row.attributes.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => BTreeMap::new(),
        };
        let tags: Vec<String> = match row.tags.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };
        let scraped_at = DateTime::parse_from_rfc3339(&row.scraped_at)
            .map_err(|e| PersistenceError::Malformed(format!("scraped_at '{}': {e}", row.scraped_at)))?
            .with_timezone(&Utc);

        let mut record = ProductRecord::new(row.external_id, row.url);
        record.title = row.title;
        record.price = row.price;
        record.description = row.description;
        record.sku = row.sku;
        record.oem = row.oem;
        record.attributes = attributes;
        record.tags = tags;
        record.scraped_at = scraped_at;
        record.images = self.product_images(external_id).await?;
        record.categories = self.product_categories(external_id).await?;
        tracing::debug!(id = row.id, "Loaded product {external_id}");
        Ok(Some(record))
    }

    /// Close the connection pool
    pub async fn close(&self) {
        if let Some(store) = &self.inner {
            store.pool.close().await;
        }
    }

    fn store(&self) -> Result<&Store, PersistenceError> {
        self.inner.as_ref().ok_or(PersistenceError::Disabled)
    }
}

impl Store {
    async fn upsert_in(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        record: &ProductRecord,
    ) -> Result<i64, PersistenceError> {
        let tables = &self.tables;
        let now = Utc::now().to_rfc3339();

        // Empty collections are stored as NULL
        let attributes = if record.attributes.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&record.attributes)?)
        };
        let tags = if record.tags.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&record.tags)?)
        };

        let (product_id,): (i64,) = sqlx::query_as(&format!(
            r#"
            INSERT INTO {products}
                (external_id, title, price, description, sku, oem, attributes, tags, url, scraped_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(external_id) DO UPDATE SET
                title = excluded.title,
                price = excluded.price,
                description = excluded.description,
                sku = excluded.sku,
                oem = excluded.oem,
                attributes = excluded.attributes,
                tags = excluded.tags,
                url = excluded.url,
                scraped_at = excluded.scraped_at,
                updated_at = excluded.updated_at
            RETURNING id
            "#,
            products = tables.products
        ))
        .bind(&record.external_id)
        .bind(&record.title)
        .bind(&record.price)
        .bind(&record.description)
        .bind(&record.sku)
        .bind(&record.oem)
        .bind(attributes)
        .bind(tags)
        .bind(&record.url)
        .bind(record.scraped_at.to_rfc3339())
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(&format!("DELETE FROM {} WHERE product_id = ?", tables.images))
            .bind(product_id)
            .execute(&mut **tx)
            .await?;
        let insert_image = format!(
            "INSERT INTO {} (product_id, image_url, image_order) VALUES (?, ?, ?)",
            tables.images
        );
        for (order, image) in record.images.iter().enumerate() {
            sqlx::query(&insert_image)
                .bind(product_id)
                .bind(image)
                .bind(i64::try_from(order).unwrap_or(i64::MAX))
                .execute(&mut **tx)
                .await?;
        }

        sqlx::query(&format!(
            "DELETE FROM {} WHERE product_id = ?",
            tables.product_categories
        ))
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
        let find_or_create = format!(
            "INSERT INTO {} (name, created_at) VALUES (?, ?) \
             ON CONFLICT(name) DO UPDATE SET name = excluded.name RETURNING id",
            tables.categories
        );
        let associate = format!(
            "INSERT OR IGNORE INTO {} (product_id, category_id) VALUES (?, ?)",
            tables.product_categories
        );
        for name in &record.categories {
            let (category_id,): (i64,) = sqlx::query_as(&find_or_create)
                .bind(name)
                .bind(&now)
                .fetch_one(&mut **tx)
                .await?;
            sqlx::query(&associate)
                .bind(product_id)
                .bind(category_id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(product_id)
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        let tables = &self.tables;
        let mut tx = self.pool.begin().await?;
        // Children first
        for table in [
            &tables.product_categories,
            &tables.images,
            &tables.categories,
            &tables.products,
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
