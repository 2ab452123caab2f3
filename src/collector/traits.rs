//! The message source the collector reads from and publishes to.
//!
//! The collector has zero grammers dependency: `crate::telegram` implements
//! [`MessageSource`] on top of an MTProto user session, tests use an
//! in-memory implementation.

use async_trait::async_trait;
use thiserror::Error;

use super::types::ChannelMessage;

/// Failures reported by a [`MessageSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Channel is private, deleted or never existed. Expected, not fatal.
    #[error("channel is invalid or inaccessible: {0}")]
    ChannelUnavailable(String),

    /// Transport or API failure.
    #[error("request failed: {0}")]
    Request(String),
}

/// Markup used when sending a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupMode {
    Plain,
    Markdown,
}

/// An authenticated connection to the messaging platform.
///
/// Calls are made one at a time by the pipeline; implementations share a
/// single rate-limited session and do not need to support concurrent use.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Resolved channel reference used for history requests.
    type Handle: Send + Sync;

    /// Whether the session is signed in.
    async fn is_authorized(&self) -> Result<bool, SourceError>;

    /// Looks up a channel by identifier.
    async fn resolve(&self, channel: &str) -> Result<Self::Handle, SourceError>;

    /// Up to `limit` most recent messages, newest first.
    async fn recent_messages(&self, channel: &Self::Handle, limit: usize) -> Result<Vec<ChannelMessage>, SourceError>;

    /// Posts `text` to `destination`.
    async fn send(&self, destination: &str, text: &str, mode: MarkupMode) -> Result<(), SourceError>;
}
