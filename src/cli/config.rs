// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};

/// id3rs - ID3v2 tag CLI tool
#[derive(Parser, Debug)]
#[command(name = "id3rs")]
#[command(about = "Inspect ID3v2 tags and set popularity ratings", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for tag listings
#[derive(Debug, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Flattened key-value pairs
    KeyValue,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the frames of tagged file(s)
    Show {
        /// Audio file path(s) or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Set the popularity rating for a user
    Rate {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Identifying email/user string
        #[arg(short, long)]
        email: String,

        /// Rating 0-255, stored as given
        #[arg(short, long)]
        rating: u8,

        /// Write the retagged audio to this file instead of FILE
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print a text frame, or set it when VALUE is given
    Text {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Frame id, e.g. TIT2
        #[arg(value_name = "ID")]
        id: String,

        /// New value
        #[arg(value_name = "VALUE")]
        value: Option<String>,
    },
}
