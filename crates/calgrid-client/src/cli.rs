//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// calgrid - calendar events on a month grid
#[derive(Debug, Parser)]
#[command(name = "calgrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Print responses as JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Path to the server socket
    #[arg(long, env = "CALGRID_SOCKET")]
    pub socket_path: Option<PathBuf>,

    /// Connection timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an event
    Add {
        /// Event title
        title: String,

        /// Start timestamp (RFC 3339, e.g. 2024-03-15T09:00:00Z)
        #[arg(long)]
        start: DateTime<Utc>,

        /// End timestamp (RFC 3339), strictly after the start
        #[arg(long)]
        end: DateTime<Utc>,

        /// Display color (hex)
        #[arg(long)]
        color: Option<String>,

        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// List events, optionally restricted to a day window
    List {
        /// First day of the window (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Show a single event
    Show {
        /// Event identifier
        id: String,
    },

    /// Update an event; omitted fields keep their current value
    Edit {
        /// Event identifier
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New start timestamp (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// New end timestamp (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,

        /// New display color (hex)
        #[arg(long)]
        color: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete an event
    Rm {
        /// Event identifier
        id: String,
    },

    /// Show the month grid
    Grid {
        /// Calendar year; defaults to the current month
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Calendar month (1-12)
        #[arg(long, requires = "year")]
        month: Option<u32>,

        /// Day to highlight as selected (YYYY-MM-DD)
        #[arg(long)]
        selected: Option<NaiveDate>,

        /// Events shown per day before overflowing
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show daemon status
    Status,

    /// Check daemon liveness
    Ping,

    /// Ask the daemon to shut down
    Stop,

    /// Start the server daemon in the foreground
    Serve,
}
