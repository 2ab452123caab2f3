//! Republishing a sample of the best channel's findings.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::fetcher::{fetch_channel, FetchWindow};
use super::traits::{MarkupMode, MessageSource};
use super::types::AggregateState;
use crate::core::config;

pub const POST_HEADER: &str = "🚀 Fresh configs of the day";
pub const PROXY_HEADER: &str = "🔐 Proxies";
pub const PROXY_SEPARATOR: &str = " | ";

/// Where and how much to publish.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Channel receiving the post.
    pub destination: String,
    /// Number of configs drawn (with replacement) into the post.
    pub sample_size: usize,
    /// Maximum number of proxy links in the post.
    pub max_proxies: usize,
    /// Proxy labels per line.
    pub proxies_per_row: usize,
    /// Longest post accepted by the destination, in characters.
    pub max_length: usize,
    pub window: FetchWindow,
}

impl PublishSettings {
    pub fn new(destination: impl Into<String>, window: FetchWindow) -> Self {
        Self {
            destination: destination.into(),
            sample_size: config::publish::SAMPLE_SIZE,
            max_proxies: config::publish::MAX_PROXIES,
            proxies_per_row: config::publish::PROXIES_PER_ROW,
            max_length: config::publish::MAX_POST_LENGTH,
            window,
        }
    }
}

/// Why nothing was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No channel scored above zero.
    NothingCollected,
    /// Publishing disabled or no destination configured.
    Disabled,
    /// The winning channel had no configs on refetch and the run found no proxies.
    EmptyPost,
    /// Re-fetching the winning channel failed.
    RefetchFailed(String),
    /// The post could not be delivered.
    SendFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent { channel: String },
    Skipped(SkipReason),
}

/// The channel with the strictly highest positive score.
///
/// Ties keep the channel that appears first.
pub fn select_best_channel(state: &AggregateState) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for record in &state.channel_status {
        let score = record.status.score;
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((record.channel.as_str(), score));
        }
    }
    best.map(|(channel, _)| channel)
}

/// Re-fetches the best channel and posts a sample of it to the destination.
///
/// Never fails: every problem is logged and reported as a skip.
pub async fn publish<S, R>(source: &S, state: &AggregateState, settings: &PublishSettings, rng: &mut R) -> PublishOutcome
where
    S: MessageSource + ?Sized,
    R: Rng + ?Sized,
{
    let Some(channel) = select_best_channel(state) else {
        log::info!("No channel with a positive score, skipping publish");
        return PublishOutcome::Skipped(SkipReason::NothingCollected);
    };
    log::info!("Best channel is {}, refetching before publishing", channel);

    let fresh = match fetch_channel(source, channel, &settings.window).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Refetch of {} failed, not publishing: {}", channel, e);
            return PublishOutcome::Skipped(SkipReason::RefetchFailed(e.to_string()));
        }
    };

    let configs = fresh.configs.combined();
    if configs.is_empty() && state.all_proxies.is_empty() {
        log::info!("Nothing to post from {}, skipping publish", channel);
        return PublishOutcome::Skipped(SkipReason::EmptyPost);
    }
    let post = compose_post(&configs, &state.all_proxies, settings, rng);

    match source.send(&settings.destination, &post, MarkupMode::Markdown).await {
        Ok(()) => {
            log::info!("Published sample from {} to {}", channel, settings.destination);
            PublishOutcome::Sent {
                channel: channel.to_string(),
            }
        }
        Err(e) => {
            log::error!("Failed to send post to {}: {}", settings.destination, e);
            PublishOutcome::Skipped(SkipReason::SendFailed(e.to_string()))
        }
    }
}

/// Builds the Markdown post.
///
/// Configs are drawn uniformly with replacement, so a short list repeats
/// entries. Proxies are shuffled and cut to `max_proxies`. If the result is
/// longer than `max_length` characters, sampled configs and then proxy
/// labels are dropped from the end until it fits.
pub fn compose_post<C, R>(configs: &[C], proxies: &[String], settings: &PublishSettings, rng: &mut R) -> String
where
    C: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut sample: Vec<&str> = if configs.is_empty() {
        Vec::new()
    } else {
        (0..settings.sample_size)
            .filter_map(|_| configs.choose(&mut *rng).map(|c| c.as_ref()))
            .collect()
    };

    let mut shuffled: Vec<&String> = proxies.iter().collect();
    shuffled.shuffle(&mut *rng);
    shuffled.truncate(settings.max_proxies);
    let mut labels: Vec<String> = shuffled
        .iter()
        .enumerate()
        .map(|(i, url)| format!("[Proxy {}]({})", i + 1, url))
        .collect();

    loop {
        let post = render_post(&sample, &labels, settings);
        if post.chars().count() <= settings.max_length {
            return post;
        }
        if sample.pop().is_none() && labels.pop().is_none() {
            log::warn!("Post header alone exceeds {} characters", settings.max_length);
            return post;
        }
        log::debug!("Post too long, dropping an entry");
    }
}

fn render_post(sample: &[&str], labels: &[String], settings: &PublishSettings) -> String {
    let mut post = String::from(POST_HEADER);
    post.push_str("\n\n");

    if !sample.is_empty() {
        post.push_str("```\n");
        post.push_str(&sample.join("\n"));
        post.push_str("\n```\n\n");
    }

    if !labels.is_empty() {
        post.push_str(PROXY_HEADER);
        post.push('\n');
        for row in labels.chunks(settings.proxies_per_row.max(1)) {
            post.push_str(&row.join(PROXY_SEPARATOR));
            post.push('\n');
        }
        post.push('\n');
    }

    post.push_str(&format!("📡 {}", settings.destination));
    post
}
