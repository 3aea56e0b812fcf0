use async_trait::async_trait;
use jiff::Timestamp;
use shortenit_core::{
    InsertOutcome, LongUrl, LongUrlHash, ReadRepository, Repository, ShortCode, StorageError,
};
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

use crate::Result;

const SCHEMA: [(&str, &str); 2] = [
    (
        "short_urls_by_long_url_hash",
        include_str!("../ddl/mysql/short_urls_by_long_url_hash.sql"),
    ),
    (
        "long_urls_by_code",
        include_str!("../ddl/mysql/long_urls_by_code.sql"),
    ),
];

/// MySQL implementation of the repository contract.
///
/// A mapping is stored as two rows, one per lookup direction:
/// `short_urls_by_long_url_hash` keyed on the SHA-256 of the long URL and
/// `long_urls_by_code` keyed on the code. Both are written in one
/// transaction. The primary key on the hash table is what makes
/// [`Repository::insert_mapping`] conditional: a second writer for the same
/// long URL hits a duplicate key and reads back the winner's code instead.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates both index tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        for (table, ddl) in SCHEMA {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            debug!(table, "ensured table exists");
        }
        info!("MySQL schema ready");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn parse_code(raw: String) -> Result<ShortCode> {
    ShortCode::new(raw)
        .map_err(|e| StorageError::InvalidData(format!("stored short code is invalid: {e}")))
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn fetch_long_url(&self, code: &ShortCode) -> Result<Option<LongUrl>> {
        let row = sqlx::query(
            r#"
            SELECT long_url
            FROM long_urls_by_code
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
        Ok(Some(LongUrl::new_unchecked(long_url)))
    }

    async fn fetch_short_code(&self, hash: &LongUrlHash) -> Result<Option<ShortCode>> {
        let row = sqlx::query(
            r#"
            SELECT code
            FROM short_urls_by_long_url_hash
            WHERE long_url_hash = ?
            LIMIT 1
            "#,
        )
        .bind(hash.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let code: String = row.try_get("code").map_err(map_sqlx_error)?;
        parse_code(code).map(Some)
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert_mapping(&self, long_url: &LongUrl, code: &ShortCode) -> Result<InsertOutcome> {
        let hash = long_url.hash();
        let created_at = Timestamp::now().as_second();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let claimed = sqlx::query(
            r#"
            INSERT INTO short_urls_by_long_url_hash (long_url_hash, code, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(hash.as_str())
        .bind(code.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        match claimed {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await.map_err(map_sqlx_error)?;
                let existing = self.fetch_short_code(&hash).await?.ok_or_else(|| {
                    StorageError::InvalidData(format!(
                        "duplicate key for long URL hash {hash} but no row found"
                    ))
                })?;
                debug!(long_url = %long_url, code = %existing, "mapping already committed");
                return Ok(InsertOutcome::Existing(existing));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        }

        let indexed = sqlx::query(
            r#"
            INSERT INTO long_urls_by_code (code, long_url, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(long_url.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        match indexed {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await.map_err(map_sqlx_error)?;
                return Err(StorageError::Operation(format!(
                    "short code '{code}' is already assigned to another long URL"
                )));
            }
            Err(err) => return Err(map_sqlx_error(err)),
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(long_url = %long_url, code = %code, "inserted mapping");
        Ok(InsertOutcome::Inserted(code.clone()))
    }
}
