use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Subgrab - collect YouTube transcripts, resuming where the last run stopped
#[derive(Parser, Debug)]
#[command(name = "subgrab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true, env = "SUBGRAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write a daily-rotated log file into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Netscape cookie file handed to yt-dlp
    #[arg(long, global = true, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Transcribe locally with whisper when no usable captions exist
    #[arg(long, global = true)]
    pub whisper: bool,

    /// Whisper model name
    #[arg(long, global = true, value_name = "MODEL")]
    pub whisper_model: Option<String>,

    /// Summary output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process the uploads of a channel
    Channel {
        /// Channel handle, with or without the leading @
        handle: String,

        /// Process at most N videos after skipping known ones (0 = no limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Ignore the ledger and process every video
        #[arg(long)]
        full: bool,

        /// Process known videos again, replacing their ledger rows
        #[arg(long)]
        no_incremental: bool,

        /// Output directory (default: from-channel-<handle> under the output root)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Where to save the selected video URLs (default: <handle>-list.txt in the output directory)
        #[arg(long, value_name = "FILE")]
        urls_file: Option<PathBuf>,
    },

    /// Process a single video
    Video {
        /// Video URL
        url: String,

        /// Channel name; looked up from the video when omitted
        #[arg(long)]
        channel: Option<String>,

        /// Output directory (default: from-channel-<channel> under the output root)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Print the transcript to stdout instead of writing files
        #[arg(long)]
        print: bool,

        /// Do not print the run summary
        #[arg(long)]
        no_summary: bool,
    },

    /// Show or reset the configuration
    Config {
        /// Print the current configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration
        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Pretty,
    /// JSON summary on stdout
    Json,
}
