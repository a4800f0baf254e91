use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 終端機用的精簡單行格式
    Compact,
    /// 容器環境使用 JSON 格式，方便日誌收集器解析
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

// sqlx 每個語句都以 info 記錄，一般執行時壓到 warn
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "election_feed=debug,sqlx=info,info"
    } else {
        "election_feed=info,sqlx=warn,warn"
    }
}

/// `RUST_LOG` 優先於預設值
pub fn init_logger(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let compact = (format == LogFormat::Compact).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
    });
    // 投遞回報在 rdkafka 的執行緒上記錄，JSON 裡保留 thread id 以便對照
    let json = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .init();
}
