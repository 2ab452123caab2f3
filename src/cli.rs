use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "config-harvester")]
#[command(author, version, about = "Collects VPN configs and proxy links from Telegram channels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest every listed channel, write the results and publish a sample
    Collect {
        /// Channel list file (overrides CHANNELS_FILE)
        #[arg(short, long)]
        channels: Option<PathBuf>,

        /// Output folder (overrides CONFIG_FOLDER)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Most recent messages read per channel
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write files only, do not post to OUTPUT_CHANNEL
        #[arg(long)]
        no_publish: bool,
    },

    /// Fetch one channel and print what it contains, writing nothing
    Scan {
        /// Channel username, @name or t.me link
        channel: String,

        /// Most recent messages read
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
