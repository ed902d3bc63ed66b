// CLI module for id3rs
//
// Command-line front end over the library: show tags, set ratings, edit
// text frames. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::OutputFormatter;
