//! One harvesting run, start to finish.
//!
//! Load channels -> connect -> check authorization -> collect -> write
//! snapshot -> publish. Connecting is deferred until there is something to
//! fetch, so an empty channel list never touches the network.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::path::PathBuf;

use crate::collector::{
    collect, fetch_channel, publish, AggregateState, ChannelResult, FetchWindow, MessageSource, PublishOutcome,
    PublishSettings, SkipReason,
};
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::storage::{load_channel_list, write_snapshot};

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub channels_file: PathBuf,
    pub output_dir: PathBuf,
    /// Channel receiving the sample post. `None` disables publishing.
    pub destination: Option<String>,
    /// Most recent messages read per channel.
    pub limit: usize,
    pub publish: bool,
}

impl RunSettings {
    /// Settings taken from the environment.
    pub fn from_env() -> Self {
        Self {
            channels_file: PathBuf::from(config::CHANNELS_FILE.as_str()),
            output_dir: PathBuf::from(config::CONFIG_FOLDER.as_str()),
            destination: config::OUTPUT_CHANNEL.clone(),
            limit: config::fetch::MESSAGE_LIMIT,
            publish: true,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Entries in the channel list, duplicates included.
    pub channels: usize,
    /// Distinct channels that were fetched.
    pub succeeded: usize,
    /// Distinct channels that failed.
    pub failed: usize,
    /// Unique configs written across all protocol files.
    pub configs: usize,
    /// Unique proxy links written.
    pub proxies: usize,
    pub publish: PublishOutcome,
}

async fn ensure_authorized<S: MessageSource + ?Sized>(source: &S) -> AppResult<()> {
    if !source.is_authorized().await? {
        log::error!("Client not authorized, the session is invalid");
        return Err(AppError::NotAuthorized);
    }
    log::info!("Client authorized");
    Ok(())
}

/// Runs one harvest.
///
/// `connect` is called at most once, and only when the channel list is
/// non-empty. Losing authorization aborts the run before any file is
/// written; every other failure is contained in the status file.
pub async fn run_once<S, C, Fut>(settings: &RunSettings, connect: C) -> AppResult<RunReport>
where
    S: MessageSource,
    C: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<S>>,
{
    let channels = load_channel_list(&settings.channels_file).await;
    let window = FetchWindow::current(settings.limit);

    if channels.is_empty() {
        log::warn!("No channels to fetch, writing empty results");
        let summary = write_snapshot(&settings.output_dir, &AggregateState::new()).await?;
        return Ok(RunReport {
            channels: 0,
            succeeded: 0,
            failed: 0,
            configs: summary.configs,
            proxies: summary.proxies,
            publish: PublishOutcome::Skipped(SkipReason::NothingCollected),
        });
    }

    let source = connect().await?;
    ensure_authorized(&source).await?;

    log::info!("Collecting from {} channels", channels.len());
    let state = collect(&source, &channels, &window).await;
    let failed = state
        .channel_status
        .iter()
        .filter(|record| record.status.error.is_some())
        .count();
    let succeeded = state.channel_status.len() - failed;

    let summary = write_snapshot(&settings.output_dir, &state).await?;

    let outcome = match (&settings.destination, settings.publish) {
        (Some(destination), true) => {
            let publish_settings = PublishSettings::new(destination.clone(), window);
            let mut rng = StdRng::from_os_rng();
            publish(&source, &state, &publish_settings, &mut rng).await
        }
        _ => {
            log::info!("Publishing disabled");
            PublishOutcome::Skipped(SkipReason::Disabled)
        }
    };

    let report = RunReport {
        channels: channels.len(),
        succeeded,
        failed,
        configs: summary.configs,
        proxies: summary.proxies,
        publish: outcome,
    };
    log::info!(
        "Run finished: {}/{} channels ok, {} configs, {} proxies, publish: {:?}",
        report.succeeded,
        report.channels,
        report.configs,
        report.proxies,
        report.publish
    );
    Ok(report)
}

/// Fetches a single channel without writing or publishing anything.
pub async fn scan<S>(source: &S, channel: &str, limit: usize) -> AppResult<Option<ChannelResult>>
where
    S: MessageSource + ?Sized,
{
    ensure_authorized(source).await?;
    let window = FetchWindow::current(limit);
    match fetch_channel(source, channel, &window).await {
        Ok(result) => Ok(Some(result)),
        Err(e) => {
            log::warn!("Scan of {} produced nothing: {}", channel, e);
            Ok(None)
        }
    }
}
