use crate::domain::model::{DeliveryOutcome, RawPerson};
use crate::domain::ports::{DeliveryHandler, PersonSource, RecordPublisher, SqlSession, SqlValue};
use crate::utils::error::{FeedError, FetchError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct SessionLog {
    pub statements: Vec<(String, Vec<SqlValue>)>,
    pub commits: usize,
    pub rollbacks: usize,
    pub fail_on: Option<String>,
    /// 符合 `fail_on` 的前幾次執行照常成功
    pub fail_skip: usize,
    pub count_result: i64,
    /// 尚未 commit／rollback 的交易內語句
    pub open: Vec<String>,
    /// 已結束的交易，依順序
    pub transactions: Vec<Vec<String>>,
}

impl SessionLog {
    fn end_transaction(&mut self) {
        if !self.open.is_empty() {
            let statements = std::mem::take(&mut self.open);
            self.transactions.push(statements);
        }
    }
}

/// 記錄所有 SQL 與 commit 的假連線；`fail_on` 內容出現在 SQL 時強制失敗。
/// 和 `PgSession` 一樣，第一個語句隱含開啟交易。
#[derive(Clone, Default)]
pub struct MemorySession {
    pub log: Arc<Mutex<SessionLog>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        let session = Self::new();
        session.log.lock().unwrap().fail_on = Some(pattern.to_string());
        session
    }

    /// 第 `nth` 次（從 1 起算）符合 `pattern` 的語句才失敗
    pub fn failing_on_nth(pattern: &str, nth: usize) -> Self {
        let session = Self::failing_on(pattern);
        session.log.lock().unwrap().fail_skip = nth.saturating_sub(1);
        session
    }

    pub fn commits(&self) -> usize {
        self.log.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.log.lock().unwrap().rollbacks
    }

    pub fn statements(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.log.lock().unwrap().statements.clone()
    }

    pub fn transactions(&self) -> Vec<Vec<String>> {
        self.log.lock().unwrap().transactions.clone()
    }

    pub fn open_statements(&self) -> Vec<String> {
        self.log.lock().unwrap().open.clone()
    }
}

#[async_trait::async_trait]
impl SqlSession for MemorySession {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let mut log = self.log.lock().unwrap();
        log.open.push(sql.to_string());
        let forced = match log.fail_on.clone() {
            Some(pattern) if sql.contains(pattern.as_str()) => {
                if log.fail_skip > 0 {
                    log.fail_skip -= 1;
                    None
                } else {
                    Some(pattern)
                }
            }
            _ => None,
        };
        if let Some(pattern) = forced {
            return Err(FeedError::PersistenceError {
                message: format!("forced failure on '{}'", pattern),
            });
        }
        log.statements.push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        let mut log = self.log.lock().unwrap();
        log.open.push(sql.to_string());
        log.statements.push((sql.to_string(), Vec::new()));
        Ok(log.count_result)
    }

    async fn commit(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.commits += 1;
        log.end_transaction();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.rollbacks += 1;
        log.end_transaction();
        Ok(())
    }
}

/// 模擬傳輸層：publish 後立即以指定結果呼叫 handler
pub struct LoopbackPublisher<H: DeliveryHandler> {
    pub handler: Arc<H>,
    pub published: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub fail_delivery: bool,
}

impl<H: DeliveryHandler> LoopbackPublisher<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            published: Mutex::new(Vec::new()),
            fail_delivery: false,
        }
    }
}

impl<H: DeliveryHandler> RecordPublisher for LoopbackPublisher<H> {
    fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), key.to_string(), value.to_vec()));

        let outcome = if self.fail_delivery {
            DeliveryOutcome::Failed {
                error: "Broker: Message timed out".to_string(),
            }
        } else {
            DeliveryOutcome::Delivered {
                topic: topic.to_string(),
                partition: 0,
            }
        };
        self.handler.on_delivery(outcome);
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

/// 模擬 rdkafka 的行為：投遞結果先排隊，到 flush 才回報給 handler
pub struct DeferredPublisher<H: DeliveryHandler> {
    pub handler: Arc<H>,
    pub pending: Mutex<Vec<DeliveryOutcome>>,
}

impl<H: DeliveryHandler> DeferredPublisher<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

impl<H: DeliveryHandler> RecordPublisher for DeferredPublisher<H> {
    fn publish(&self, topic: &str, _key: &str, _value: &[u8]) -> Result<()> {
        self.pending.lock().unwrap().push(DeliveryOutcome::Delivered {
            topic: topic.to_string(),
            partition: 0,
        });
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        let outcomes = std::mem::take(&mut *self.pending.lock().unwrap());
        for outcome in outcomes {
            self.handler.on_delivery(outcome);
        }
        Ok(())
    }
}

/// 依序回傳預先排好的取數結果，用完後回報 `EmptyResults`
pub struct ScriptedSource {
    responses: Mutex<VecDeque<std::result::Result<RawPerson, FetchError>>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<std::result::Result<RawPerson, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait::async_trait]
impl PersonSource for ScriptedSource {
    async fn fetch(&self) -> std::result::Result<RawPerson, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::EmptyResults))
    }
}
