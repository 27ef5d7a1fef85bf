use clap::Parser;
use price_alert::cli::{show_config, AppContext, Cli, Commands, WatchArgs};
use price_alert::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        let mut config: Config =
            toml::from_str(include_str!("../config.toml.example")).unwrap_or_default();
        config.apply_env_overrides();
        config
    });

    // Initialize telemetry
    price_alert::telemetry::init_telemetry(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or(Commands::Watch(WatchArgs { symbol: None }));

    match command {
        Commands::Watch(args) => {
            tracing::info!("Starting interactive watch");
            let app = AppContext::from_config(config)?;
            args.execute(&app).await?;
        }
        Commands::Alert(args) => {
            tracing::info!(symbol = %args.symbol, target = %args.target, "Starting one-shot alert");
            let app = AppContext::from_config(config)?;
            args.execute(&app).await?;
        }
        Commands::Config => show_config(&config),
    }

    Ok(())
}
