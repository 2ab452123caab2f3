//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use config_harvester::collector::{ChannelMessage, MarkupMode, MessageSource, SourceError};

/// How a [`MockSource`] channel behaves
#[derive(Debug, Clone)]
pub enum ChannelMode {
    Messages(Vec<ChannelMessage>),
    /// Resolution fails as for a private or deleted channel
    Unavailable,
    /// Resolution works, the history request fails
    Broken,
    /// The history request panics
    Panics,
    /// First history request returns `first`; later ones return `later`,
    /// or fail when it is `None`
    Refetched {
        first: Vec<ChannelMessage>,
        later: Option<Vec<ChannelMessage>>,
    },
}

/// A post recorded by [`MockSource::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPost {
    pub destination: String,
    pub text: String,
    pub mode: MarkupMode,
}

/// In-memory message source
///
/// Clones share the recorded posts and fetch counters, so a clone kept by
/// the test can inspect a source moved into the pipeline.
#[derive(Clone)]
pub struct MockSource {
    pub authorized: bool,
    pub fail_send: bool,
    channels: HashMap<String, ChannelMode>,
    sent: Arc<Mutex<Vec<SentPost>>>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            authorized: true,
            fail_send: false,
            channels: HashMap::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            fetches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_channel(mut self, name: &str, mode: ChannelMode) -> Self {
        self.channels.insert(name.to_string(), mode);
        self
    }

    pub fn unauthorized(mut self) -> Self {
        self.authorized = false;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn sent(&self) -> Vec<SentPost> {
        self.sent.lock().clone()
    }

    /// Number of history requests made for `channel`
    pub fn fetch_count(&self, channel: &str) -> usize {
        self.fetches.lock().get(channel).copied().unwrap_or(0)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSource for MockSource {
    type Handle = String;

    async fn is_authorized(&self) -> Result<bool, SourceError> {
        Ok(self.authorized)
    }

    async fn resolve(&self, channel: &str) -> Result<String, SourceError> {
        match self.channels.get(channel) {
            None | Some(ChannelMode::Unavailable) => {
                Err(SourceError::ChannelUnavailable(format!("USERNAME_NOT_OCCUPIED: {}", channel)))
            }
            Some(_) => Ok(channel.to_string()),
        }
    }

    async fn recent_messages(&self, channel: &String, limit: usize) -> Result<Vec<ChannelMessage>, SourceError> {
        let calls = {
            let mut fetches = self.fetches.lock();
            let count = fetches.entry(channel.clone()).or_insert(0);
            *count += 1;
            *count
        };
        match self.channels.get(channel) {
            Some(ChannelMode::Messages(messages)) => Ok(messages.iter().take(limit).cloned().collect()),
            Some(ChannelMode::Refetched { first, .. }) if calls == 1 => {
                Ok(first.iter().take(limit).cloned().collect())
            }
            Some(ChannelMode::Refetched { later: Some(later), .. }) => Ok(later.iter().take(limit).cloned().collect()),
            Some(ChannelMode::Panics) => panic!("history of {} is corrupted", channel),
            _ => Err(SourceError::Request("connection reset".to_string())),
        }
    }

    async fn send(&self, destination: &str, text: &str, mode: MarkupMode) -> Result<(), SourceError> {
        if self.fail_send {
            return Err(SourceError::Request("CHAT_WRITE_FORBIDDEN".to_string()));
        }
        self.sent.lock().push(SentPost {
            destination: destination.to_string(),
            text: text.to_string(),
            mode,
        });
        Ok(())
    }
}

/// A message posted at local noon `days_ago` days before today
pub fn message_days_ago(days_ago: i64, text: &str) -> ChannelMessage {
    let date = Local::now().date_naive() - Duration::days(days_ago);
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    let local = Local.from_local_datetime(&noon).earliest().unwrap();
    ChannelMessage::new(local.with_timezone(&Utc), text)
}

pub fn today(text: &str) -> ChannelMessage {
    message_days_ago(0, text)
}

pub fn channels(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
