//! CLI for rfetch.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rfetch_core::config::{self, RetryConfig};

use commands::{run_config, run_get};

/// Top-level CLI for rfetch.
#[derive(Debug, Parser)]
#[command(name = "rfetch")]
#[command(about = "rfetch: HTTP GET with retries and exponential backoff", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL, retrying transient (5xx) failures.
    Get(GetArgs),

    /// Show the config file location and the effective configuration.
    Config,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// HTTP/HTTPS URL to fetch.
    pub url: String,

    /// Query parameter; repeatable. Replaces any query string already in the URL.
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,

    /// Retries after the first attempt (overrides config).
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Wait before the first retry, in milliseconds (overrides config).
    #[arg(long, value_name = "MS")]
    pub min_wait_ms: Option<u64>,

    /// Backoff ceiling, in milliseconds (overrides config).
    #[arg(long, value_name = "MS")]
    pub max_wait_ms: Option<u64>,

    /// Also retry timeouts and connection failures.
    #[arg(long)]
    pub retry_transport: bool,

    /// Give up starting new attempts after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Decode the body as JSON and pretty-print it.
    #[arg(long)]
    pub json: bool,

    /// Print the status line and response headers before the body.
    #[arg(short = 'i', long, conflicts_with = "json")]
    pub include: bool,
}

impl GetArgs {
    /// Config values with command-line overrides applied.
    pub fn retry_config(&self, base: &RetryConfig) -> RetryConfig {
        RetryConfig {
            retries: self.retries.unwrap_or(base.retries),
            min_wait_ms: self.min_wait_ms.unwrap_or(base.min_wait_ms),
            max_wait_ms: self.max_wait_ms.unwrap_or(base.max_wait_ms),
            retry_transport_errors: self.retry_transport || base.retry_transport_errors,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if k.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((k.to_string(), v.to_string()))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get(args) => run_get(&cfg, args).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
