use anyhow::{Context, Result};
use clap::Parser;
use supply::config::AppConfig;
use supply::logging::init_logging;
use supply::mail::RecordingDispatcher;
use supply::server::ServerBuilder;
use supply::storage::InMemoryOrderStore;

/// Store supply order service
#[derive(Debug, Parser)]
#[command(name = "supply-orders", version, about)]
struct CliArgs {
    /// YAML configuration file; environment variables override its values
    #[arg(short, long, env = "SUPPLY_CONFIG")]
    config: Option<String>,

    /// Port to listen on, overriding PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Record outgoing mail in memory instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Skip the mail server check at startup
    #[arg(long)]
    skip_verify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_yaml_file(path)?.with_env_overrides()?,
        None => AppConfig::from_env()?,
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    init_logging(config.log_format(), config.environment)?;

    if args.dry_run {
        config
            .validate_recipient()
            .context("invalid configuration")?;
    } else {
        config.validate().context("invalid configuration")?;
    }

    let mut builder = ServerBuilder::new()
        .with_config(config)
        .with_order_store(InMemoryOrderStore::new())
        .verify_on_start(!args.skip_verify);

    if args.dry_run {
        tracing::warn!("Dry run: order emails are recorded, not sent");
        builder = builder.with_dispatcher(RecordingDispatcher::new());
    }

    builder.serve().await
}
