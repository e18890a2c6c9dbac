// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use garmin_mcp_server::config::Config;
use garmin_mcp_server::logging::{LogFormat, LoggingConfig};
use garmin_mcp_server::mcp::McpServer;
use garmin_mcp_server::providers::{GarminApi, GarminConnectClient};
use garmin_mcp_server::tools::ToolContext;
use garmin_mcp_server::workout::WorkoutCompiler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Log format (json, pretty, compact); overrides LOG_FORMAT
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(format) = args.log_format {
        logging.format = format;
    }
    logging.init()?;

    let config = Config::load(args.config)?;
    info!("{}", config.summary());

    let client = GarminConnectClient::from_config(&config.garmin).context("Failed to create Garmin client")?;
    let retry = client.retry_policy();
    info!(
        "Upstream: {} (up to {} attempts on rate limit, {:?} base backoff)",
        client.provider_name(),
        retry.max_attempts,
        retry.base_delay
    );
    let compiler = WorkoutCompiler::new(config.workout.compiler_options()?);

    let server = McpServer::new(ToolContext::new(Arc::new(client), compiler));
    server.run_stdio().await?;

    Ok(())
}
