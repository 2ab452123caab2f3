//! Runs the fetcher over every channel and builds the run's [`AggregateState`].

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use super::fetcher::{fetch_channel, FetchError, FetchWindow};
use super::traits::MessageSource;
use super::types::{AggregateState, ChannelStatus};

/// Fetches every channel in order and aggregates the results.
///
/// Channels are processed strictly one after another: they share a single
/// rate-limited session. A failing or panicking channel is recorded with a
/// zero score and never stops the loop.
pub async fn collect<S>(source: &S, channels: &[String], window: &FetchWindow) -> AggregateState
where
    S: MessageSource + ?Sized,
{
    let mut state = AggregateState::new();

    for (index, channel) in channels.iter().enumerate() {
        log::info!("Fetching configs/proxies from {} ({}/{})...", channel, index + 1, channels.len());

        let outcome = AssertUnwindSafe(fetch_channel(source, channel, window))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(FetchError::Panicked {
                    channel: channel.clone(),
                    reason: panic_message(payload.as_ref()),
                })
            });

        match outcome {
            Ok(result) => {
                let status = ChannelStatus::from_result(&result);
                log::info!(
                    "{}: {} configs, {} proxies, score {}",
                    channel,
                    status.total_configs,
                    status.proxy_count,
                    status.score
                );
                state.record_status(channel, status);
                state.merge(result);
            }
            Err(e) => {
                log::warn!("Invalid channel {}: {}", channel, e);
                state.record_status(channel, ChannelStatus::failed(&e));
            }
        }
    }

    let failed = state.channel_status.iter().filter(|r| r.status.error.is_some()).count();
    log::info!(
        "Collection finished: {} channel(s), {} failed, {} configs, {} proxies",
        state.channel_status.len(),
        failed,
        state.all_configs.total(),
        state.all_proxies.len()
    );

    state
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
