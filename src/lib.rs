//! Config Harvester - collects VPN configs and MTProto proxy links from Telegram channels
//!
//! A run reads the recent history of every listed channel through a user
//! session, extracts `vless://`, `vmess://`, `ss://` and `trojan://` configs
//! plus `t.me/proxy` links, writes them to per-protocol files with a
//! per-channel status report, and republishes a sample of the best channel.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors and logging
//! - `collector`: Extraction, per-channel fetch, aggregation and publishing
//! - `storage`: Channel list input and snapshot output
//! - `telegram`: grammers-backed message source
//! - `pipeline`: One complete run

pub mod cli;
pub mod collector;
pub mod core;
pub mod pipeline;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use collector::{AggregateState, ChannelStatus, MessageSource, Protocol, PublishOutcome};
pub use crate::core::{config, AppError, AppResult};
pub use pipeline::{run_once, RunReport, RunSettings};
pub use telegram::TelegramSource;
