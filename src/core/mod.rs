pub mod delivery;
pub mod engine;
pub mod fetcher;
pub mod inserter;
pub mod mapper;
pub mod pipeline;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{CandidateRecord, DeliveryOutcome, FeedSummary, RawPerson, VoterRecord};
pub use crate::domain::ports::{
    ConfigProvider, DeliveryHandler, PersonSource, RecordPublisher, SqlSession, SqlValue,
};
pub use crate::utils::error::Result;
