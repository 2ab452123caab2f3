//! File-based input and output: the channel list and the run snapshot.

pub mod channels;
pub mod snapshot;

pub use channels::{load_channel_list, parse_channel_list};
pub use snapshot::{write_snapshot, SnapshotSummary};
