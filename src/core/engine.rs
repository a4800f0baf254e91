use crate::core::pipeline::FeedPipeline;
use crate::core::schema::ensure_schema;
use crate::domain::model::{CandidateRecord, FeedSummary};
use crate::domain::ports::{PersonSource, RecordPublisher, SqlSession};
use crate::utils::error::{FeedError, Result};
use std::time::Duration;

pub const COUNT_CANDIDATES: &str = "SELECT COUNT(*) FROM candidates";

/// 單一候選人取數失敗時的嘗試次數上限
pub const CANDIDATE_FETCH_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    pub voters: usize,
    pub candidates: u32,
    pub flush_timeout: Duration,
}

pub struct FeedEngine<P: PersonSource, R: RecordPublisher> {
    pipeline: FeedPipeline<P, R>,
    plan: RunPlan,
}

impl<P: PersonSource, R: RecordPublisher> FeedEngine<P, R> {
    pub fn new(pipeline: FeedPipeline<P, R>, plan: RunPlan) -> Self {
        Self { pipeline, plan }
    }

    pub fn pipeline(&self) -> &FeedPipeline<P, R> {
        &self.pipeline
    }

    /// 依序執行 schema、候選人、選民三個階段。
    ///
    /// 不論階段成功與否都會 flush 發布端，已送出的每筆選民都會得到投遞回報；
    /// 回傳的是第一個階段錯誤。
    pub async fn run<S: SqlSession + ?Sized>(&self, session: &mut S) -> Result<FeedSummary> {
        let mut summary = FeedSummary::default();

        tracing::info!("Starting election feed...");
        let phases = self.run_phases(session, &mut summary).await;
        self.flush_pending();

        phases?;
        tracing::info!(
            "Feed finished: {} candidates, {} voters inserted, {} published, {} fetch failures",
            summary.candidates_inserted,
            summary.voters_inserted,
            summary.voters_published,
            summary.fetch_failures
        );
        Ok(summary)
    }

    async fn run_phases<S: SqlSession + ?Sized>(
        &self,
        session: &mut S,
        summary: &mut FeedSummary,
    ) -> Result<()> {
        ensure_schema(session).await?;
        self.seed_candidates(session, summary).await?;
        self.feed_voters(session, summary).await
    }

    // 資料已經 commit，flush 逾時只記錄不視為失敗
    fn flush_pending(&self) {
        tracing::info!("Flushing pending messages (timeout {:?})", self.plan.flush_timeout);
        if let Err(e) = self.pipeline.publisher().flush(self.plan.flush_timeout) {
            tracing::warn!("⚠️  Flush did not complete: {}", e);
        }
    }

    // 候選人依 index 順序逐筆 commit，因此已有 k 筆代表 1..=k 已存在
    async fn seed_candidates<S: SqlSession + ?Sized>(
        &self,
        session: &mut S,
        summary: &mut FeedSummary,
    ) -> Result<()> {
        let existing = session.query_count(COUNT_CANDIDATES).await?;
        // 讀取不得與之後的 INSERT 共用交易
        session.rollback().await?;

        let total = self.plan.candidates;
        let existing = u32::try_from(existing.max(0)).unwrap_or(u32::MAX);
        if existing >= total {
            tracing::info!("Found {} existing candidates, skipping generation", existing);
            return Ok(());
        }
        if existing > 0 {
            tracing::info!(
                "Found {} of {} candidates, resuming at {}",
                existing,
                total,
                existing + 1
            );
        } else {
            tracing::info!("Generating {} candidates", total);
        }

        for index in (existing + 1)..=total {
            let candidate = self.seed_candidate(session, index, total, summary).await?;
            tracing::info!("Candidate {}/{}: {}", index, total, candidate.candidate_name);
            summary.candidates_inserted += 1;
        }
        Ok(())
    }

    // 候選人不能跳號，取數失敗就重試同一個 index，用完次數才中止
    async fn seed_candidate<S: SqlSession + ?Sized>(
        &self,
        session: &mut S,
        index: u32,
        total: u32,
        summary: &mut FeedSummary,
    ) -> Result<CandidateRecord> {
        let mut attempt = 1;
        loop {
            match self.pipeline.process_candidate(session, index, total).await {
                Ok(candidate) => return Ok(candidate),
                Err(FeedError::FetchError(e)) if attempt < CANDIDATE_FETCH_ATTEMPTS => {
                    tracing::warn!(
                        "Retrying candidate {}/{} (attempt {}/{}): {}",
                        index,
                        total,
                        attempt,
                        CANDIDATE_FETCH_ATTEMPTS,
                        e
                    );
                    summary.fetch_failures += 1;
                    attempt += 1;
                }
                Err(FeedError::FetchError(e)) => {
                    summary.fetch_failures += 1;
                    tracing::error!(
                        "Giving up on candidate {}/{} after {} attempts",
                        index,
                        total,
                        attempt
                    );
                    return Err(e.into());
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn feed_voters<S: SqlSession + ?Sized>(
        &self,
        session: &mut S,
        summary: &mut FeedSummary,
    ) -> Result<()> {
        tracing::info!(
            "Generating {} voters into topic '{}'",
            self.plan.voters,
            self.pipeline.topic()
        );
        for n in 1..=self.plan.voters {
            match self.pipeline.process_voter(session).await {
                Ok(voter) => {
                    summary.voters_inserted += 1;
                    summary.voters_published += 1;
                    tracing::debug!("Voter {}/{}: {}", n, self.plan.voters, voter.voter_id);
                }
                Err(FeedError::FetchError(e)) => {
                    tracing::warn!("Skipping voter {}/{}: {}", n, self.plan.voters, e);
                    summary.fetch_failures += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
