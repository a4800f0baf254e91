use crate::core::inserter::{insert_candidate, insert_voter};
use crate::core::mapper::{map_candidate, map_voter};
use crate::domain::model::{CandidateRecord, VoterRecord};
use crate::domain::ports::{PersonSource, RecordPublisher, SqlSession};
use crate::utils::error::Result;

/// 單筆紀錄的處理流程：取數 → 轉換 → 寫入 → 發布
pub struct FeedPipeline<P: PersonSource, R: RecordPublisher> {
    source: P,
    publisher: R,
    topic: String,
}

impl<P: PersonSource, R: RecordPublisher> FeedPipeline<P, R> {
    pub fn new(source: P, publisher: R, topic: impl Into<String>) -> Self {
        Self {
            source,
            publisher,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn publisher(&self) -> &R {
        &self.publisher
    }

    /// 取數失敗以 [`FeedError::FetchError`](crate::utils::error::FeedError::FetchError) 回傳，呼叫端據此跳過該筆
    pub async fn generate_voter(&self) -> Result<VoterRecord> {
        let person = self.source.fetch().await?;
        map_voter(&person)
    }

    pub async fn generate_candidate(&self, index: u32, total: u32) -> Result<CandidateRecord> {
        let person = self.source.fetch().await?;
        map_candidate(index, total, &person)
    }

    pub fn publish_voter(&self, voter: &VoterRecord) -> Result<()> {
        let value = serde_json::to_vec(voter)?;
        self.publisher.publish(&self.topic, &voter.voter_id, &value)?;
        tracing::debug!("Submitted voter {} to '{}'", voter.voter_id, self.topic);
        Ok(())
    }

    pub async fn process_voter<S: SqlSession + ?Sized>(&self, session: &mut S) -> Result<VoterRecord> {
        let voter = self.generate_voter().await?;
        insert_voter(session, &voter).await?;
        self.publish_voter(&voter)?;
        Ok(voter)
    }

    pub async fn process_candidate<S: SqlSession + ?Sized>(
        &self,
        session: &mut S,
        index: u32,
        total: u32,
    ) -> Result<CandidateRecord> {
        let candidate = self.generate_candidate(index, total).await?;
        insert_candidate(session, &candidate).await?;
        Ok(candidate)
    }
}
