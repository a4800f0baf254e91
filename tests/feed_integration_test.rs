use election_feed::core::inserter::insert_voter;
use election_feed::core::schema::ensure_schema;
use election_feed::core::{
    DeliveryHandler, DeliveryOutcome, PersonSource, RecordPublisher, SqlSession, SqlValue,
};
use election_feed::{
    on_delivery, DeliveryAcknowledger, FeedEngine, FeedError, FeedPipeline, PersonFetcher,
    RunPlan,
};
use httpmock::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorded {
    statements: Vec<String>,
    commits: usize,
    fail_on: Option<&'static str>,
}

#[derive(Clone, Default)]
struct RecordingSession {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSession {
    fn commits(&self) -> usize {
        self.inner.lock().unwrap().commits
    }

    fn statements(&self) -> Vec<String> {
        self.inner.lock().unwrap().statements.clone()
    }
}

#[async_trait::async_trait]
impl SqlSession for RecordingSession {
    async fn execute(&mut self, sql: &str, _params: &[SqlValue]) -> election_feed::Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(pattern) = inner.fail_on {
            if sql.contains(pattern) {
                return Err(FeedError::PersistenceError {
                    message: "duplicate key value violates unique constraint".to_string(),
                });
            }
        }
        inner.statements.push(sql.to_string());
        Ok(1)
    }

    async fn query_count(&mut self, _sql: &str) -> election_feed::Result<i64> {
        Ok(0)
    }

    async fn commit(&mut self) -> election_feed::Result<()> {
        self.inner.lock().unwrap().commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> election_feed::Result<()> {
        Ok(())
    }
}

/// 模擬傳輸層：把投遞結果放到另一條執行緒上回報
struct ThreadedLoopback<H: DeliveryHandler> {
    handler: Arc<H>,
    pending: Mutex<Vec<std::thread::JoinHandle<()>>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl<H: DeliveryHandler> ThreadedLoopback<H> {
    fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            pending: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl<H: DeliveryHandler> RecordPublisher for ThreadedLoopback<H> {
    fn publish(&self, topic: &str, key: &str, _value: &[u8]) -> election_feed::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((topic.to_string(), key.to_string()));

        let handler = self.handler.clone();
        let topic = topic.to_string();
        let join = std::thread::spawn(move || {
            handler.on_delivery(DeliveryOutcome::Delivered {
                topic,
                partition: 0,
            });
        });
        self.pending.lock().unwrap().push(join);
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> election_feed::Result<()> {
        for join in self.pending.lock().unwrap().drain(..) {
            let _ = join.join();
        }
        Ok(())
    }
}

fn john_doe() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "login": {"uuid": "123", "username": "user1"},
            "name": {"first": "John", "last": "Doe"},
            "dob": {"date": "2000-01-01"},
            "gender": "male",
            "nat": "GB",
            "location": {
                "street": {"number": 1, "name": "Main St"},
                "city": "London", "state": "London", "country": "UK", "postcode": "12345"
            },
            "email": "john@example.com",
            "phone": "123456789",
            "cell": "987654321",
            "picture": {"large": "url"},
            "registered": {"age": 22}
        }]
    })
}

#[tokio::test]
async fn test_end_to_end_voter_fetch_map_insert() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(john_doe());
    });

    let ack = Arc::new(DeliveryAcknowledger::new());
    let pipeline = FeedPipeline::new(
        PersonFetcher::new(server.url("/api/")),
        ThreadedLoopback::new(ack.clone()),
        "voters_topic",
    );

    let voter = pipeline.generate_voter().await.unwrap();
    api_mock.assert();
    assert_eq!(voter.voter_id, "123");
    assert_eq!(voter.voter_name, "John Doe");

    let mut session = RecordingSession::default();
    insert_voter(&mut session, &voter).await.unwrap();
    assert_eq!(session.commits(), 1);
}

#[tokio::test]
async fn test_fetch_failure_for_voter_and_candidate() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/");
        then.status(404);
    });

    let fetcher = PersonFetcher::new(server.url("/api/"));
    let err = fetcher.fetch().await.unwrap_err();
    assert!(err.to_string().starts_with("Error fetching data"));

    let ack = Arc::new(DeliveryAcknowledger::new());
    let pipeline = FeedPipeline::new(fetcher, ThreadedLoopback::new(ack), "voters_topic");

    assert!(matches!(
        pipeline.generate_voter().await,
        Err(FeedError::FetchError(_))
    ));
    assert!(matches!(
        pipeline.generate_candidate(1, 3).await,
        Err(FeedError::FetchError(_))
    ));
}

#[tokio::test]
async fn test_candidate_generation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "results": [{
                    "login": {"uuid": "456"},
                    "name": {"first": "Jane", "last": "Smith"},
                    "picture": {"large": "url"}
                }]
            }));
    });

    let ack = Arc::new(DeliveryAcknowledger::new());
    let pipeline = FeedPipeline::new(
        PersonFetcher::new(server.url("/api/")),
        ThreadedLoopback::new(ack),
        "voters_topic",
    );

    let candidate = pipeline.generate_candidate(1, 3).await.unwrap();
    assert_eq!(candidate.candidate_id, "456");
    assert_eq!(candidate.candidate_name, "Jane Smith");
    assert_eq!(candidate.candidate_index, 1);
    assert_eq!(candidate.total_candidates, 3);

    assert!(matches!(
        pipeline.generate_candidate(4, 3).await,
        Err(FeedError::InvalidCandidateIndex { index: 4, total: 3 })
    ));
}

#[tokio::test]
async fn test_schema_then_insert_commits() {
    let mut session = RecordingSession::default();

    ensure_schema(&mut session).await.unwrap();
    ensure_schema(&mut session).await.unwrap();
    assert_eq!(session.commits(), 2);

    let tables: Vec<String> = session
        .statements()
        .iter()
        .filter(|sql| sql.contains("CREATE TABLE IF NOT EXISTS"))
        .cloned()
        .collect();
    assert_eq!(tables.len(), 6);
}

#[tokio::test]
async fn test_insert_failure_leaves_commit_uncalled() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(john_doe());
    });

    let ack = Arc::new(DeliveryAcknowledger::new());
    let pipeline = FeedPipeline::new(
        PersonFetcher::new(server.url("/api/")),
        ThreadedLoopback::new(ack),
        "voters_topic",
    );
    let voter = pipeline.generate_voter().await.unwrap();

    let mut session = RecordingSession::default();
    session.inner.lock().unwrap().fail_on = Some("INSERT INTO voters");

    assert!(insert_voter(&mut session, &voter).await.is_err());
    assert_eq!(session.commits(), 0);
}

#[tokio::test]
async fn test_engine_delivers_on_transport_thread() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(john_doe());
    });

    let ack = Arc::new(DeliveryAcknowledger::new());
    let pipeline = FeedPipeline::new(
        PersonFetcher::new(server.url("/api/")),
        ThreadedLoopback::new(ack.clone()),
        "voters_topic",
    );
    let engine = FeedEngine::new(
        pipeline,
        RunPlan {
            voters: 3,
            candidates: 2,
            flush_timeout: Duration::from_secs(1),
        },
    );
    let mut session = RecordingSession::default();

    let summary = engine.run(&mut session).await.unwrap();

    assert_eq!(summary.candidates_inserted, 2);
    assert_eq!(summary.voters_published, 3);
    // flush 之後每次發布恰好回報一次
    assert_eq!(ack.delivered(), 3);
    assert_eq!(ack.failed(), 0);

    let sent = engine.pipeline().publisher().sent.lock().unwrap().clone();
    assert!(sent
        .iter()
        .all(|(topic, key)| topic == "voters_topic" && key == "123"));
}

#[test]
fn test_delivery_report_messages() {
    let delivered = DeliveryOutcome::Delivered {
        topic: "topic".to_string(),
        partition: 0,
    };
    assert_eq!(on_delivery(&delivered), "Message delivered to topic [0]");

    let failed = DeliveryOutcome::Failed {
        error: "error".to_string(),
    };
    assert_eq!(on_delivery(&failed), "Message delivery failed: error");
}
