use crate::config::{
    validate_provider, DEFAULT_API_ENDPOINT, DEFAULT_BROKERS, DEFAULT_CANDIDATES,
    DEFAULT_FLUSH_TIMEOUT_SECS, DEFAULT_TOPIC, DEFAULT_VOTERS,
};
use crate::core::ConfigProvider;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub brokers: String,
    pub topic: String,
    pub flush_timeout_secs: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            brokers: DEFAULT_BROKERS.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            flush_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub voters: usize,
    pub candidates: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            voters: DEFAULT_VOTERS,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FeedError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_PASSWORD})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FeedError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_connections(&self) -> u32 {
        self.database.max_connections.unwrap_or(1)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn database_url(&self) -> Option<&str> {
        Some(&self.database.url)
    }

    fn brokers(&self) -> &str {
        &self.stream.brokers
    }

    fn topic(&self) -> &str {
        &self.stream.topic
    }

    fn voter_count(&self) -> usize {
        self.generation.voters
    }

    fn candidate_count(&self) -> usize {
        self.generation.candidates
    }

    fn flush_timeout(&self) -> Duration {
        Duration::from_secs(
            self.stream
                .flush_timeout_secs
                .unwrap_or(DEFAULT_FLUSH_TIMEOUT_SECS),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
