use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;

use config_harvester::cli::{Cli, Commands};
use config_harvester::collector::{ChannelResult, Protocol};
use config_harvester::core::{config, init_logger, AppError, AppResult};
use config_harvester::pipeline::{self, RunSettings};
use config_harvester::telegram::{SessionSource, TelegramSource};
use strum::IntoEnumIterator;

/// Main entry point for the harvester
///
/// Parses CLI arguments and dispatches to the requested command. Without a
/// command a full collection run is performed.
///
/// # Errors
/// Returns an error if initialization fails, the session cannot be used, or
/// the output folder cannot be written.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present, before any config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH, *config::LOG_LEVEL)?;

    match cli.command {
        Some(Commands::Collect {
            channels,
            output_dir,
            limit,
            no_publish,
        }) => run_collect(channels, output_dir, limit, no_publish).await,
        Some(Commands::Scan { channel, limit }) => run_scan(channel, limit).await,
        None => {
            log::info!("No command specified, running a collection");
            run_collect(None, None, None, false).await
        }
    }
}

fn session_source() -> SessionSource {
    match config::SESSION_STRING.as_ref() {
        Some(encoded) => SessionSource::Encoded(encoded.clone()),
        None => SessionSource::File(PathBuf::from(config::SESSION_FILE.as_str())),
    }
}

async fn connect() -> AppResult<TelegramSource> {
    let api_id = (*config::API_ID).ok_or_else(|| AppError::Config("API_ID is missing or not a number".to_string()))?;
    if config::API_HASH.is_empty() {
        return Err(AppError::Config("API_HASH is missing".to_string()));
    }
    TelegramSource::connect(api_id, &config::API_HASH, &session_source()).await
}

async fn run_collect(
    channels: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    limit: Option<usize>,
    no_publish: bool,
) -> Result<()> {
    let mut settings = RunSettings::from_env();
    if let Some(path) = channels {
        settings.channels_file = path;
    }
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    if let Some(limit) = limit {
        settings.limit = limit;
    }
    settings.publish = !no_publish;

    log::info!(
        "Starting collection (channels: {}, output: {}, limit: {})",
        settings.channels_file.display(),
        settings.output_dir.display(),
        settings.limit
    );

    let report = pipeline::run_once(&settings, connect).await?;
    println!(
        "{} channels ({} failed): {} configs, {} proxies",
        report.channels, report.failed, report.configs, report.proxies
    );
    Ok(())
}

async fn run_scan(channel: String, limit: Option<usize>) -> Result<()> {
    let source = connect().await?;
    let limit = limit.unwrap_or(config::fetch::MESSAGE_LIMIT);

    match pipeline::scan(&source, &channel, limit).await? {
        Some(result) => print_result(&channel, &result),
        None => println!("{}: nothing fetched, see {}", channel, config::LOG_FILE_PATH.as_str()),
    }
    Ok(())
}

fn print_result(channel: &str, result: &ChannelResult) {
    println!("{}", channel);
    for protocol in Protocol::iter() {
        let configs = result.configs.get(protocol);
        println!("  {}: {}", protocol, configs.len());
        for config in configs {
            println!("    {}", config);
        }
    }
    println!("  proxies: {}", result.proxies.len());
    for proxy in &result.proxies {
        println!("    {}", proxy);
    }
}
