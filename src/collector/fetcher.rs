//! Per-channel fetch: recent history, date filter, extraction, dedup.

use chrono::{Local, NaiveDate};
use itertools::Itertools;
use thiserror::Error;

use super::extract::{extract_configs, extract_proxies};
use super::traits::{MessageSource, SourceError};
use super::types::{ChannelResult, ConfigSet};
use crate::core::config;

/// Why a channel produced no result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The channel could not be resolved (private, deleted, misspelled).
    #[error("channel {channel} does not exist or is inaccessible: {reason}")]
    Unavailable { channel: String, reason: String },

    /// Network or API failure while talking to the channel.
    #[error("failed to fetch from {channel}: {reason}")]
    Request { channel: String, reason: String },

    /// The fetch panicked; caught by the aggregator.
    #[error("fetch from {channel} panicked: {reason}")]
    Panicked { channel: String, reason: String },
}

impl FetchError {
    fn from_source(channel: &str, err: SourceError) -> Self {
        let channel = channel.to_string();
        match err {
            SourceError::ChannelUnavailable(reason) => FetchError::Unavailable { channel, reason },
            SourceError::Request(reason) => FetchError::Request { channel, reason },
        }
    }
}

/// Which part of a channel's history a fetch looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Maximum number of recent messages requested.
    pub limit: usize,
    /// The run's local calendar date.
    pub today: NaiveDate,
}

impl FetchWindow {
    pub fn new(limit: usize, today: NaiveDate) -> Self {
        Self { limit, today }
    }

    /// Window ending at the current local date.
    pub fn current(limit: usize) -> Self {
        Self::new(limit, Local::now().date_naive())
    }

    pub fn yesterday(&self) -> NaiveDate {
        self.today.pred_opt().unwrap_or(self.today)
    }

    fn is_recent(&self, date: NaiveDate) -> bool {
        date >= self.yesterday() && date <= self.today
    }
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self::current(config::fetch::MESSAGE_LIMIT)
    }
}

/// Fetches one channel and extracts its configs and proxy links.
///
/// Only messages dated yesterday or later are considered; proxy links are
/// additionally restricted to `[yesterday, today]`. On any failure nothing
/// collected so far is returned.
pub async fn fetch_channel<S>(source: &S, channel: &str, window: &FetchWindow) -> Result<ChannelResult, FetchError>
where
    S: MessageSource + ?Sized,
{
    let handle = source.resolve(channel).await.map_err(|e| {
        let err = FetchError::from_source(channel, e);
        log::error!("{}", err);
        err
    })?;

    let messages = source.recent_messages(&handle, window.limit).await.map_err(|e| {
        let err = FetchError::from_source(channel, e);
        log::error!("{}", err);
        err
    })?;

    let yesterday = window.yesterday();
    let mut configs = ConfigSet::new();
    let mut proxies = Vec::new();
    let mut considered = 0usize;

    for message in &messages {
        let Some(date) = message.local_date() else {
            continue;
        };
        if date < yesterday {
            continue;
        }
        considered += 1;

        if let Some(text) = message.text() {
            let found = extract_configs(text);
            if !found.is_empty() {
                log::debug!("Found {} configs in message from {}", found.total(), channel);
            }
            configs.merge(found);
        }

        if window.is_recent(date) {
            proxies.extend(extract_proxies(message));
        }
    }

    let result = ChannelResult {
        configs: configs.dedup(),
        proxies: proxies.into_iter().unique().collect(),
    };

    log::info!(
        "Processed {} messages from {} ({} in window), found {} configs, {} proxies",
        messages.len(),
        channel,
        considered,
        result.configs.total(),
        result.proxies.len()
    );

    Ok(result)
}
