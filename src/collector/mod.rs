//! Collection pipeline: extraction, per-channel fetch, aggregation, publishing.
//!
//! Architecture: everything here talks to the platform through the
//! [`MessageSource`] trait only. The Telegram layer (`crate::telegram`)
//! provides the real implementation.

pub mod aggregate;
pub mod extract;
pub mod fetcher;
pub mod publish;
pub mod traits;
pub mod types;
pub mod validation;

pub use aggregate::collect;
pub use extract::{extract_configs, extract_proxies};
pub use fetcher::{fetch_channel, FetchError, FetchWindow};
pub use publish::{compose_post, publish, select_best_channel, PublishOutcome, PublishSettings, SkipReason};
pub use traits::{MarkupMode, MessageSource, SourceError};
pub use types::{
    AggregateState, ChannelMessage, ChannelResult, ChannelStatus, ChannelStatusRecord, ConfigSet, LinkAnnotation,
    Protocol,
};
pub use validation::is_valid_proxy_url;
