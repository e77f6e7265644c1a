use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffplan")]
#[command(author, version, about = "Plan ffmpeg stream mapping from ffprobe output")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file and display its streams
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output the probe document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the ffmpeg arguments the configured policy would use
    Plan {
        /// Input media file
        #[arg(required = true)]
        input: PathBuf,

        /// Output file
        #[arg(required = true)]
        output: PathBuf,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read ffmpeg output on stdin and print progress
    Progress {
        /// Media file to probe for duration and frame rate
        #[arg(required_unless_present = "probe_json", conflicts_with = "probe_json")]
        file: Option<PathBuf>,

        /// Use a saved ffprobe JSON document instead of probing
        #[arg(long)]
        probe_json: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
