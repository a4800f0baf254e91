//! Kafka 發布端。
//!
//! [`KafkaPublisher`] 使用 `ThreadedProducer`，由 rdkafka 自己的輪詢執行緒
//! 觸發 [`DeliveryContext::delivery`]，再轉交給呼叫端提供的 [`DeliveryHandler`]。

use crate::domain::model::DeliveryOutcome;
use crate::domain::ports::{DeliveryHandler, RecordPublisher};
use crate::utils::error::{FeedError, Result};
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::util::Timeout;
use rdkafka::ClientContext;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

impl From<KafkaError> for FeedError {
    fn from(e: KafkaError) -> Self {
        FeedError::StreamError {
            message: e.to_string(),
        }
    }
}

/// 將 rdkafka 的投遞回呼轉成 [`DeliveryOutcome`]
pub struct DeliveryContext<H: DeliveryHandler> {
    handler: Arc<H>,
}

impl<H: DeliveryHandler> DeliveryContext<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

pub fn outcome_from(result: &DeliveryResult<'_>) -> DeliveryOutcome {
    match result {
        Ok(message) => DeliveryOutcome::Delivered {
            topic: message.topic().to_string(),
            partition: message.partition(),
        },
        Err((error, _message)) => DeliveryOutcome::Failed {
            error: error.to_string(),
        },
    }
}

impl<H: DeliveryHandler> ClientContext for DeliveryContext<H> {}

impl<H: DeliveryHandler> ProducerContext for DeliveryContext<H> {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _delivery_opaque: Self::DeliveryOpaque) {
        self.handler.on_delivery(outcome_from(delivery_result));
    }
}

pub struct KafkaPublisher<H: DeliveryHandler> {
    producer: ThreadedProducer<DeliveryContext<H>>,
}

impl<H: DeliveryHandler> KafkaPublisher<H> {
    pub fn new(brokers: &str, handler: Arc<H>) -> Result<Self> {
        Self::with_message_timeout(brokers, handler, DEFAULT_MESSAGE_TIMEOUT)
    }

    /// `message_timeout` 之內未送達的訊息會以失敗回報
    pub fn with_message_timeout(
        brokers: &str,
        handler: Arc<H>,
        message_timeout: Duration,
    ) -> Result<Self> {
        let producer: ThreadedProducer<DeliveryContext<H>> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", message_timeout.as_millis().to_string())
            .create_with_context(DeliveryContext::new(handler))?;

        tracing::info!("Kafka producer created for brokers: {}", brokers);
        Ok(Self { producer })
    }
}

impl<H: DeliveryHandler> RecordPublisher for KafkaPublisher<H> {
    fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<()> {
        let record = BaseRecord::to(topic).key(key).payload(value);
        self.producer.send(record).map_err(|(e, _record)| e)?;
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer.flush(Timeout::After(timeout))?;
        Ok(())
    }
}
