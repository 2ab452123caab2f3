use once_cell::sync::Lazy;
use std::env;

/// Configuration read from the environment
/// Every value is read once, on first use, after `.env` has been loaded

/// Telegram API ID from my.telegram.org
/// Read from API_ID environment variable
/// `None` when unset or not a number
pub static API_ID: Lazy<Option<i32>> = Lazy::new(|| env::var("API_ID").ok().and_then(|v| v.trim().parse().ok()));

/// Telegram API hash from my.telegram.org
/// Read from API_HASH environment variable
pub static API_HASH: Lazy<String> = Lazy::new(|| env::var("API_HASH").unwrap_or_else(|_| String::new()));

/// Base64-encoded grammers session
/// Read from SESSION_STRING environment variable
/// Takes priority over SESSION_FILE when set
pub static SESSION_STRING: Lazy<Option<String>> = Lazy::new(|| {
    env::var("SESSION_STRING")
        .ok()
        .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
});

/// Session file path
/// Read from SESSION_FILE environment variable
/// Default: harvester.session
pub static SESSION_FILE: Lazy<String> =
    Lazy::new(|| env::var("SESSION_FILE").unwrap_or_else(|_| "harvester.session".to_string()));

/// Channel list document (`{"all_channels": [...]}`)
/// Read from CHANNELS_FILE environment variable
/// Default: channels.json
pub static CHANNELS_FILE: Lazy<String> =
    Lazy::new(|| env::var("CHANNELS_FILE").unwrap_or_else(|_| "channels.json".to_string()));

/// Output folder for config, proxy and status files
/// Read from CONFIG_FOLDER environment variable
/// Default: Configs
pub static CONFIG_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("CONFIG_FOLDER").unwrap_or_else(|_| "Configs".to_string()));

/// Log file path, truncated on every run
/// Read from LOG_FILE_PATH environment variable
/// Default: logs.txt
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs.txt".to_string()));

/// Log level: error, warn, info, debug, trace
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<log::LevelFilter> = Lazy::new(|| {
    env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Info)
});

/// Channel receiving the published sample
/// Read from OUTPUT_CHANNEL environment variable
/// Publishing is disabled when unset
pub static OUTPUT_CHANNEL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("OUTPUT_CHANNEL")
        .ok()
        .and_then(|s| if s.trim().is_empty() { None } else { Some(s.trim().to_string()) })
});

/// Channel history configuration
pub mod fetch {
    /// Most recent messages requested per channel
    pub const MESSAGE_LIMIT: usize = 200;
}

/// Published post configuration
pub mod publish {
    /// Configs drawn into each post (with replacement)
    pub const SAMPLE_SIZE: usize = 5;

    /// Maximum proxy links per post
    pub const MAX_PROXIES: usize = 8;

    /// Proxy labels per line
    pub const PROXIES_PER_ROW: usize = 4;

    /// Telegram message length limit
    pub const MAX_POST_LENGTH: usize = 4096;
}

/// Output file names inside CONFIG_FOLDER
pub mod files {
    /// All proxy links of the run, one per line
    pub const PROXIES: &str = "proxies.txt";

    /// Per-channel counters and errors
    pub const CHANNEL_STATUS: &str = "channel_status.json";
}
