use crate::domain::ports::{SqlSession, SqlValue};
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::redact_connection_string;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};

/// 以 sqlx 連線池實作的 [`SqlSession`]。
///
/// 第一個 `execute` 開啟交易，`commit`／`rollback` 結束交易；
/// 交易未結束就被 drop 時 sqlx 會自動 rollback。
/// `query_count` 直接在連線池上執行，不會開啟交易。
pub struct PgSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let redacted = redact_connection_string(database_url);
        tracing::info!("Connecting to PostgreSQL with max {max_connections} connections: {redacted}");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        tracing::info!("Connected to PostgreSQL database");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    pub async fn close(mut self) {
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback().await {
                tracing::warn!("Rollback of open transaction on close failed: {}", e);
            }
        }
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }

    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        if self.tx.is_none() {
            self.tx = Some(self.pool.begin().await?);
        }
        self.tx.as_mut().ok_or_else(|| FeedError::PersistenceError {
            message: "transaction unavailable".to_string(),
        })
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Text(value) => query.bind(value.clone()),
            SqlValue::Int(value) => query.bind(*value),
        };
    }
    query
}

#[async_trait]
impl SqlSession for PgSession {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let tx = self.transaction().await?;
        let query = bind_params(sqlx::query(sql), params);
        let result = query.execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
