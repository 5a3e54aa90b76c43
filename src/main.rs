use anyhow::Result;
use studio_relay::{config, server};
use tracing::info;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG takes precedence over the configured level
    let (filter, log_level) = match std::env::var("RUST_LOG") {
        Ok(directives) => (tracing_subscriber::EnvFilter::try_new(&directives)?, directives),
        Err(_) => {
            let level = config.server.logs.level.clone();
            if let Err(e) = validate_log_level(&level) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            (tracing_subscriber::EnvFilter::try_new(&level)?, level)
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting studio relay with log level: {}", log_level);
    info!(
        "Providers: text={}, transcription={}",
        config.providers.text.as_str(),
        config.providers.transcription.as_str()
    );
    info!(
        "Gemini key loaded: {}, OpenAI key loaded: {}",
        !config.gemini.api_key.is_empty(),
        !config.openai.api_key.is_empty()
    );

    server::run(config).await?;

    Ok(())
}
