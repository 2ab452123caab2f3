//! Logging initialization
//!
//! Console output plus a log file that is recreated on every run, so the
//! file always holds exactly one run's channel outcomes.

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file (truncated if it exists)
/// * `level` - Maximum level written to both outputs
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str, level: LevelFilter) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
