use clap::Parser;
use ticker_feed::cli::{Cli, Commands};
use ticker_feed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    config.apply_env()?;
    config.validate()?;

    // Initialize telemetry
    ticker_feed::telemetry::init_telemetry(&config.telemetry)?;
    config.log_summary();

    match cli.command {
        Commands::Watch(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.url);
            println!("  Quote asset: {}", config.feed.quote_suffix);
            println!(
                "  Reconnect: {} attempts every {} ms (manual settle {} ms)",
                config.feed.max_reconnect_attempts,
                config.feed.reconnect_interval_ms,
                config.feed.reconnect_settle_ms
            );
            println!(
                "  Logging: {} ({:?})",
                config.telemetry.log_level, config.telemetry.log_format
            );
            match config.telemetry.metrics_port {
                Some(port) => println!("  Metrics: port {}", port),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
