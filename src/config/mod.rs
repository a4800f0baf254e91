pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_database_url, validate_http_url, validate_non_empty_string,
    validate_positive_number, validate_required_field,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://randomuser.me/api/?nat=gb";
pub const DEFAULT_BROKERS: &str = "localhost:9092";
pub const DEFAULT_TOPIC: &str = "voters_topic";
pub const DEFAULT_VOTERS: usize = 1000;
pub const DEFAULT_CANDIDATES: usize = 3;
pub const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 10;

/// CLI 與 TOML 共用的配置檢查
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_http_url("api_endpoint", config.api_endpoint())?;

    let database_url = config.database_url().map(str::to_string);
    let database_url = validate_required_field("database_url", &database_url)?;
    validate_database_url("database_url", database_url)?;

    validate_non_empty_string("brokers", config.brokers())?;
    validate_non_empty_string("topic", config.topic())?;
    validate_positive_number("candidates", config.candidate_count(), 1)?;
    Ok(())
}

#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "election-feed"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Generate voters and candidates into PostgreSQL and Kafka")
)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_API_ENDPOINT))]
    pub api_endpoint: String,

    #[cfg_attr(feature = "cli", arg(long, help = "PostgreSQL connection string"))]
    pub database_url: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_BROKERS))]
    pub brokers: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_TOPIC))]
    pub topic: String,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_VOTERS))]
    pub voters: usize,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_CANDIDATES))]
    pub candidates: usize,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_FLUSH_TIMEOUT_SECS))]
    pub flush_timeout_secs: u64,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Load settings from a TOML file instead of flags")
    )]
    pub config: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    fn brokers(&self) -> &str {
        &self.brokers
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn voter_count(&self) -> usize {
        self.voters
    }

    fn candidate_count(&self) -> usize {
        self.candidates
    }

    fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }
}

impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
