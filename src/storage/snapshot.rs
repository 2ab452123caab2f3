//! Writes a run's results to the output folder.
//!
//! Every file is rewritten from scratch; nothing is merged with earlier
//! runs.

use itertools::Itertools;
use std::path::{Path, PathBuf};

use crate::collector::{AggregateState, Protocol};
use crate::core::config::files;
use crate::core::error::AppResult;
use strum::IntoEnumIterator;

pub const NO_PROXIES: &str = "No proxies found";

fn no_configs(protocol: Protocol) -> String {
    format!("No {} configs found", protocol)
}

/// One entry per line (deduplicated, first occurrence wins), or the sentinel.
fn render_lines<'a, I>(items: I, sentinel: &str) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut lines = items.into_iter().unique().peekable();
    if lines.peek().is_none() {
        return format!("{}\n", sentinel);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Files written by [`write_snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub files: Vec<PathBuf>,
    pub configs: usize,
    pub proxies: usize,
}

/// Writes per-protocol config files, `proxies.txt` and `channel_status.json`.
pub async fn write_snapshot(dir: &Path, state: &AggregateState) -> AppResult<SnapshotSummary> {
    fs_err::tokio::create_dir_all(dir).await?;

    let mut files_written = Vec::new();
    let mut configs = 0;

    for protocol in Protocol::iter() {
        let entries = state.all_configs.get(protocol);
        let contents = render_lines(entries, &no_configs(protocol));
        let path = dir.join(protocol.file_name());
        fs_err::tokio::write(&path, &contents).await?;

        let unique = entries.iter().unique().count();
        log::info!("Saved {} {} configs to {}", unique, protocol, path.display());
        configs += unique;
        files_written.push(path);
    }

    let path = dir.join(files::PROXIES);
    fs_err::tokio::write(&path, render_lines(&state.all_proxies, NO_PROXIES)).await?;
    let proxies = state.all_proxies.iter().unique().count();
    log::info!("Saved {} proxies to {}", proxies, path.display());
    files_written.push(path);

    let path = dir.join(files::CHANNEL_STATUS);
    let status = serde_json::to_string_pretty(&state.channel_status)?;
    fs_err::tokio::write(&path, status).await?;
    log::info!("Saved status of {} channels to {}", state.channel_status.len(), path.display());
    files_written.push(path);

    Ok(SnapshotSummary {
        files: files_written,
        configs,
        proxies,
    })
}
