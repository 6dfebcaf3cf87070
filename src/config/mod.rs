use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::{DEFAULT_ENDPOINT, DEFAULT_ETHERSCAN_URL};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Policy client configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "txguard")]
#[command(about = "Submit transactions to a policy-evaluation endpoint and report the decision")]
pub struct Config {
    /// Policy-evaluation endpoint URL
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT, env = "TXGUARD_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token presented to the endpoint (required, checked before sending)
    #[arg(long, global = true, env = "TXGUARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "15", env = "TXGUARD_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "TXGUARD_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit an already-broadcast transaction for risk scoring
    Check {
        /// JSON or YAML file holding a `transaction:broadcasted` event
        #[arg(long)]
        payload: PathBuf,
    },

    /// Submit a transaction before it is signed or sent
    Simulate {
        /// JSON or YAML file holding a `transaction:prebroadcast` event
        #[arg(long)]
        payload: PathBuf,
    },

    /// Evaluate recent transactions sent to an address
    Monitor {
        /// Address to watch
        address: String,

        /// How far back to look, in hours
        lookback_hours: u32,

        /// Block explorer API URL
        #[arg(long, default_value = DEFAULT_ETHERSCAN_URL, env = "TXGUARD_ETHERSCAN_URL")]
        etherscan_url: String,

        /// Block explorer API key
        #[arg(long, env = "TXGUARD_ETHERSCAN_API_KEY", hide_env_values = true)]
        etherscan_api_key: String,

        /// Network identifier reported for each transaction
        #[arg(long, default_value = "eth", env = "TXGUARD_NETWORK")]
        network: String,
    },
}

impl Config {
    /// Get request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
