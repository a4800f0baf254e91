use crate::domain::model::{DeliveryOutcome, RawPerson};
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// 綁定到 SQL 參數的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(value.into())
    }
}

#[async_trait]
pub trait PersonSource: Send + Sync {
    async fn fetch(&self) -> std::result::Result<RawPerson, FetchError>;
}

/// 呼叫端持有的資料庫連線；pipeline 只使用，不開啟也不關閉
#[async_trait]
pub trait SqlSession: Send {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;
    async fn query_count(&mut self, sql: &str) -> Result<i64>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}

/// 發布後立即返回；結果經由 [`DeliveryHandler`] 非同步回報
pub trait RecordPublisher: Send + Sync {
    fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<()>;
    fn flush(&self, timeout: Duration) -> Result<()>;
}

pub trait DeliveryHandler: Send + Sync + 'static {
    fn on_delivery(&self, outcome: DeliveryOutcome);
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn database_url(&self) -> Option<&str>;
    fn brokers(&self) -> &str;
    fn topic(&self) -> &str;
    fn voter_count(&self) -> usize;
    fn candidate_count(&self) -> usize;
    fn flush_timeout(&self) -> Duration;
}
