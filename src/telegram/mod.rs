//! Telegram integration: the MTProto user client behind [`crate::collector::MessageSource`].

pub mod client;

pub use client::{normalize_channel, SessionSource, TelegramSource};
