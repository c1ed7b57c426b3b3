//! Workeasy gateway - HTTP API for the shift-scheduling app.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_lib::config::GatewayConfig;

#[derive(Parser)]
#[command(name = "workeasy")]
#[command(about = "Workeasy shift-scheduling gateway")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(short = 'H', long, env = "SERVER_HOST")]
        host: Option<String>,
        #[arg(short, long, env = "SERVER_PORT")]
        port: Option<u16>,
    },
    /// Validate configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = GatewayConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    let problems = config.problems();

    match cli.command {
        Commands::Serve { host, port } => {
            if !problems.is_empty() {
                for problem in &problems {
                    tracing::error!("{}", problem);
                }
                std::process::exit(1);
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Err(e) = gateway_lib::run_server(config).await {
                tracing::error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => {
            if problems.is_empty() {
                tracing::info!("Configuration OK");
            } else {
                for problem in &problems {
                    tracing::error!("{}", problem);
                }
                std::process::exit(1);
            }
        }
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
