//! CLI definitions for AccessProbe.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AccessProbe CLI.
#[derive(Parser)]
#[command(name = "accessprobe")]
#[command(about = "Extract WCAG accessibility evidence from web pages")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "accessprobe.toml", global = true, env = "ACCESSPROBE_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Load a page and print its evidence document as JSON
    Scan {
        /// Absolute URL to inspect
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Navigation timeout in milliseconds (overrides config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Use the Chrome on this debugging port (launching it there if absent)
        /// instead of a private browser
        #[arg(long)]
        port: Option<u16>,

        /// Chrome executable (overrides config)
        #[arg(long, env = "ACCESSPROBE_CHROME")]
        chrome: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Report which Chrome would be used and whether it is reachable
    CheckBrowser,
}
