use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "portico", about = "Portico — external-integration edge gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server.
    Gateway {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load the config, apply env overrides, and report missing settings.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn check_config() -> anyhow::Result<()> {
    let config = portico_config::discover_and_load();
    match config.validate() {
        Ok(()) => {
            println!("configuration ok");
            println!(
                "  deepseek: {}",
                if config.providers.deepseek.api_key.is_some() {
                    "configured"
                } else {
                    "disabled (no api key)"
                }
            );
            println!("  ollama:   {}", config.providers.ollama.base_url);
            println!(
                "  pool:     {} workers, queue depth {}",
                config.pool.workers, config.pool.queue
            );
            Ok(())
        },
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "portico starting");

    match cli.command {
        Commands::Gateway { bind, port } => {
            portico_gateway::server::start_gateway(&bind, port).await
        },
        Commands::Config { action } => match action {
            ConfigAction::Check => check_config(),
        },
    }
}
