//! Domain types shared by the collection pipeline.
//!
//! No Telegram types here: the adapter in `crate::telegram` maps grammers
//! messages into [`ChannelMessage`] before the collector sees them.

use chrono::{DateTime, Local, NaiveDate, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// Proxy configuration URI families the extractor recognizes.
///
/// The lowercase name doubles as the output file stem (`vless.txt`) and the
/// prefix of the per-protocol count in `channel_status.json`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Vless,
    Vmess,
    Shadowsocks,
    Trojan,
}

impl Protocol {
    /// Output file name for this protocol's configs.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self)
    }
}

/// Link annotation attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAnnotation {
    /// Hidden link with an explicit target (`[label](url)`).
    TextUrl { url: String },
    /// Bare link inside the text, given as a span in UTF-16 code units.
    Url { offset: i32, length: i32 },
}

/// A message as seen by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMessage {
    pub date: Option<DateTime<Utc>>,
    pub text: Option<String>,
    pub links: Vec<LinkAnnotation>,
}

impl ChannelMessage {
    pub fn new(date: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            text: Some(text.into()),
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: LinkAnnotation) -> Self {
        self.links.push(link);
        self
    }

    /// Message text, `None` when absent or empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Calendar date of the message in the local timezone.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.with_timezone(&Local).date_naive())
    }
}

/// Config strings grouped by protocol, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSet {
    by_protocol: BTreeMap<Protocol, Vec<String>>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, protocol: Protocol) -> &[String] {
        self.by_protocol.get(&protocol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn extend_protocol<I>(&mut self, protocol: Protocol, configs: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut configs = configs.into_iter().peekable();
        if configs.peek().is_some() {
            self.by_protocol.entry(protocol).or_default().extend(configs);
        }
    }

    /// Appends every list of `other`, keeping duplicates.
    pub fn merge(&mut self, other: ConfigSet) {
        for (protocol, configs) in other.by_protocol {
            self.extend_protocol(protocol, configs);
        }
    }

    /// Drops repeated entries inside each protocol list, keeping the first one.
    pub fn dedup(self) -> Self {
        let by_protocol = self
            .by_protocol
            .into_iter()
            .map(|(protocol, configs)| (protocol, configs.into_iter().unique().collect()))
            .collect();
        Self { by_protocol }
    }

    pub fn count(&self, protocol: Protocol) -> usize {
        self.get(protocol).len()
    }

    pub fn total(&self) -> usize {
        self.by_protocol.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Every protocol in declaration order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Protocol, &[String])> + '_ {
        Protocol::iter().map(move |p| (p, self.get(p)))
    }

    /// All configs concatenated in protocol order.
    pub fn combined(&self) -> Vec<&str> {
        self.iter()
            .flat_map(|(_, configs)| configs.iter().map(String::as_str))
            .collect()
    }
}

/// What one channel yielded in one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelResult {
    pub configs: ConfigSet,
    pub proxies: Vec<String>,
}

/// Per-channel counters recorded for a run.
///
/// `score` is only a ranking key for the publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub vless_count: usize,
    pub vmess_count: usize,
    pub shadowsocks_count: usize,
    pub trojan_count: usize,
    pub proxy_count: usize,
    pub total_configs: usize,
    pub score: usize,
    pub error: Option<String>,
}

impl ChannelStatus {
    pub fn from_result(result: &ChannelResult) -> Self {
        let configs = &result.configs;
        let vless_count = configs.count(Protocol::Vless);
        let vmess_count = configs.count(Protocol::Vmess);
        let shadowsocks_count = configs.count(Protocol::Shadowsocks);
        let trojan_count = configs.count(Protocol::Trojan);
        let total_configs = vless_count + vmess_count + shadowsocks_count + trojan_count;
        let proxy_count = result.proxies.len();

        Self {
            vless_count,
            vmess_count,
            shadowsocks_count,
            trojan_count,
            proxy_count,
            total_configs,
            score: total_configs + proxy_count,
            error: None,
        }
    }

    /// Zero-count status carrying the failure reason.
    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// A status row as written to `channel_status.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatusRecord {
    pub channel: String,
    #[serde(flatten)]
    pub status: ChannelStatus,
}

/// Everything one run collected.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    pub all_configs: ConfigSet,
    pub all_proxies: Vec<String>,
    pub channel_status: Vec<ChannelStatusRecord>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `status` for `channel`, replacing an earlier entry in place.
    pub fn record_status(&mut self, channel: &str, status: ChannelStatus) {
        match self.channel_status.iter_mut().find(|r| r.channel == channel) {
            Some(record) => record.status = status,
            None => self.channel_status.push(ChannelStatusRecord {
                channel: channel.to_string(),
                status,
            }),
        }
    }

    pub fn status(&self, channel: &str) -> Option<&ChannelStatus> {
        self.channel_status
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| &r.status)
    }

    /// Appends a channel's findings to the run-wide lists.
    pub fn merge(&mut self, result: ChannelResult) {
        self.all_configs.merge(result.configs);
        self.all_proxies.extend(result.proxies);
    }
}
