mod args;
mod commands;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use soundsmith_core::{load_config_or_default, validate_config, LoggingConfig, ToolContext};

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let print_metrics = cli.print_metrics;

    let outcome = run(cli).await;

    if print_metrics {
        match metrics::encode_metrics() {
            Ok(text) => eprint!("{}", text),
            Err(e) => eprintln!("Failed to encode metrics: {:#}", e),
        }
    }
    if let Err(e) = outcome {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config from {:?}", path),
        None => "Failed to load configuration".to_string(),
    })?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);
    debug!(?config, "Configuration loaded");

    let ctx = ToolContext::system(config).context("Failed to set up tool context")?;
    let output = commands::execute(cli.command, ctx).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!("Done");
    Ok(())
}

/// Logs go to stderr so stdout only carries the JSON result.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
