use clap::Parser;
use election_feed::core::ConfigProvider;
use election_feed::utils::error::{ErrorSeverity, FeedError};
use election_feed::utils::logger::{self, LogFormat};
use election_feed::utils::validation::Validate;
use election_feed::{
    CliConfig, DeliveryAcknowledger, FeedEngine, FeedPipeline, KafkaPublisher, PersonFetcher,
    PgSession, RunPlan, TomlConfig,
};
use std::sync::Arc;

fn exit_with(e: &FeedError) -> ! {
    tracing::error!(
        "❌ Election feed failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, LogFormat::from_json_flag(cli.log_json));

    tracing::info!("🗳️  Starting election-feed");

    // 指定 --config 時以 TOML 檔為準
    let (config, max_connections): (Box<dyn ConfigProvider>, u32) = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path).and_then(|toml| toml.validate().map(|()| toml)) {
                Ok(toml) => {
                    let max_connections = toml.max_connections();
                    (Box::new(toml) as Box<dyn ConfigProvider>, max_connections)
                }
                Err(e) => exit_with(&e),
            }
        }
        None => match cli.validate() {
            Ok(()) => (Box::new(cli.clone()) as Box<dyn ConfigProvider>, 1),
            Err(e) => exit_with(&e),
        },
    };

    let database_url = config.database_url().unwrap_or_default().to_string();
    let plan = RunPlan {
        voters: config.voter_count(),
        candidates: u32::try_from(config.candidate_count()).unwrap_or(u32::MAX),
        flush_timeout: config.flush_timeout(),
    };

    let acknowledger = Arc::new(DeliveryAcknowledger::new());
    let publisher = match KafkaPublisher::new(config.brokers(), acknowledger.clone()) {
        Ok(publisher) => publisher,
        Err(e) => exit_with(&e),
    };
    let mut session = match PgSession::connect(&database_url, max_connections).await {
        Ok(session) => session,
        Err(e) => exit_with(&e),
    };

    let fetcher = PersonFetcher::new(config.api_endpoint());
    tracing::info!("🌐 Person API: {}", fetcher.endpoint());
    let pipeline = FeedPipeline::new(
        fetcher,
        publisher,
        config.topic(),
    );
    let engine = FeedEngine::new(pipeline, plan);

    let result = engine.run(&mut session).await;
    // producer 在 drop 時清空佇列，剩餘訊息也會回報投遞結果；process::exit 不會執行解構
    drop(engine);
    session.close().await;

    tracing::info!(
        "📨 Deliveries: {} delivered, {} failed",
        acknowledger.delivered(),
        acknowledger.failed()
    );

    match result {
        Ok(summary) => {
            println!("✅ Election feed completed successfully!");
            println!(
                "   candidates: {}, voters: {}, fetch failures: {}",
                summary.candidates_inserted, summary.voters_inserted, summary.fetch_failures
            );
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
