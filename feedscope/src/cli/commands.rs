//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Feedscope - CLI for working with Feedbin API content
#[derive(Parser, Debug)]
#[command(name = "feedscope")]
#[command(version, about = "Feedscope - CLI for working with Feedbin API content", long_about = None)]
pub struct Cli {
    /// Path to a logging configuration file (TOML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_config: Option<PathBuf>,

    /// API base URL (overrides config file and FEEDSCOPE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bypass the on-disk HTTP cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Manage feed subscriptions
    Subscriptions {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Check credentials with the Feedbin API and store them
    Login {
        /// Feedbin email address
        email: String,

        /// Feedbin password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Verify the stored credentials
    Status,

    /// Show which account is stored
    Whoami,

    /// Remove stored credentials
    Remove,
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommands {
    /// List all feed subscriptions
    List {
        /// Request extended metadata and print each subscription as JSON
        #[arg(long)]
        extended: bool,

        /// Print one compact JSON object per line
        #[arg(long)]
        jsonl: bool,

        /// Stop after this many subscriptions
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one subscription
    Get {
        /// Subscription ID
        id: u64,

        /// Request extended metadata
        #[arg(long)]
        extended: bool,
    },

    /// Subscribe to a feed
    Create {
        /// Feed URL, or a site URL advertising a feed
        feed_url: String,
    },

    /// Rename a subscription
    Update {
        /// Subscription ID
        id: u64,

        /// New title (prompted when omitted)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Unsubscribe from a feed
    Delete {
        /// Subscription ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the configuration directory
    Location,
}
