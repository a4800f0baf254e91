//! 發布結果的回報。
//!
//! 傳輸層在自己的背景執行緒上、每次發布恰好呼叫一次 [`DeliveryHandler::on_delivery`]；
//! 這裡只觀察結果，不重試也不重新發布。

use crate::domain::model::DeliveryOutcome;
use crate::domain::ports::DeliveryHandler;
use std::sync::atomic::{AtomicU64, Ordering};

/// 將單次發布結果寫入日誌並回傳報告字串
pub fn on_delivery(outcome: &DeliveryOutcome) -> String {
    match outcome {
        DeliveryOutcome::Delivered { topic, partition } => {
            let report = format!("Message delivered to {} [{}]", topic, partition);
            tracing::info!("{}", report);
            report
        }
        DeliveryOutcome::Failed { error } => {
            let report = format!("Message delivery failed: {}", error);
            tracing::error!("{}", report);
            report
        }
    }
}

/// 預設 handler：記錄日誌並累計成功／失敗次數
#[derive(Debug, Default)]
pub struct DeliveryAcknowledger {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryAcknowledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

impl DeliveryHandler for DeliveryAcknowledger {
    fn on_delivery(&self, outcome: DeliveryOutcome) {
        on_delivery(&outcome);
        if outcome.is_delivered() {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
