pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{toml_config::TomlConfig, CliConfig};

#[cfg(feature = "kafka")]
pub use adapters::kafka::KafkaPublisher;
pub use adapters::postgres::PgSession;

pub use core::{
    delivery::{on_delivery, DeliveryAcknowledger},
    engine::{FeedEngine, RunPlan},
    fetcher::PersonFetcher,
    pipeline::FeedPipeline,
};
pub use utils::error::{FeedError, FetchError, Result};
