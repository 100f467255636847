use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logforge::cli::run::RunArgs;

#[derive(Parser)]
#[command(name = "logforge")]
#[command(about = "Synthetic security telemetry generator", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a generation run (the default command).
    Run(RunArgs),
    /// Serve the HTTP trigger endpoint.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8750")]
        listen: String,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config_path = logforge::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run(args)) => {
            logforge::cli::run::run(config_path, args).await?;
        }
        None => {
            logforge::cli::run::run(config_path, RunArgs::default_invocation()).await?;
        }
        Some(Commands::Serve { listen }) => {
            let config = Arc::new(logforge::config::parse::load_config_or_default(
                config_path.as_deref(),
            )?);

            let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, shutting down");
                    let _ = shutdown_tx.send(true);
                }
            });

            logforge::web::server::run_server(config, &listen, shutdown_rx).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                logforge::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                logforge::cli::config::validate(config_path)?;
            }
        },
    }

    Ok(())
}
