use thiserror::Error;

/// 外部人員 API 取數失敗時的標記訊息
pub const FETCH_ERROR_SENTINEL: &str = "Error fetching data";

/// 取數結果的錯誤分支；所有變體的訊息都以 [`FETCH_ERROR_SENTINEL`] 開頭
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{sentinel} (HTTP {status})", sentinel = FETCH_ERROR_SENTINEL)]
    Status { status: u16 },

    #[error("{sentinel}: {0}", sentinel = FETCH_ERROR_SENTINEL)]
    Transport(#[from] reqwest::Error),

    #[error("{sentinel}: response contained no results", sentinel = FETCH_ERROR_SENTINEL)]
    EmptyResults,

    #[error("{sentinel}: malformed body: {0}", sentinel = FETCH_ERROR_SENTINEL)]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("{0}")]
    FetchError(#[from] FetchError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Stream error: {message}")]
    StreamError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing field in person payload: {field}")]
    MappingError { field: String },

    #[error("Candidate index {index} out of range 1..={total}")]
    InvalidCandidateIndex { index: u32, total: u32 },

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Stream,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::FetchError(_) => ErrorCategory::Network,
            FeedError::SerializationError(_)
            | FeedError::MappingError { .. }
            | FeedError::InvalidCandidateIndex { .. } => ErrorCategory::Data,
            FeedError::DatabaseError(_) | FeedError::PersistenceError { .. } => {
                ErrorCategory::Storage
            }
            FeedError::StreamError { .. } => ErrorCategory::Stream,
            FeedError::ConfigError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FeedError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單筆取數失敗只會跳過該筆紀錄
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Stream => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the person API: {}", self),
            ErrorCategory::Data => format!("Received person data could not be used: {}", self),
            ErrorCategory::Storage => format!("Writing to the database failed: {}", self),
            ErrorCategory::Stream => format!("Publishing to the message stream failed: {}", self),
            ErrorCategory::Configuration => format!("Configuration is invalid: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the --api-endpoint value",
            ErrorCategory::Data => "Verify the person API still returns the expected payload shape",
            ErrorCategory::Storage => "Check --database-url and that PostgreSQL is reachable",
            ErrorCategory::Stream => "Check --brokers and that the Kafka cluster is reachable",
            ErrorCategory::Configuration => "Fix the reported option and run again",
            ErrorCategory::System => "Check file permissions and available resources",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
