use crate::config::parse::load_config_or_default;
use crate::orchestrator::{self, execute_run, Outcome, RunReport};
use crate::run::{GenerationRun, OutputMode};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::parse::ConfigError),

    #[error("{0}")]
    Execute(#[from] crate::orchestrator::ExecuteError),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Comma-separated source ids, or 'all'.
    #[arg(long, default_value = "all")]
    pub sources: String,

    /// Comma-separated scenario ids, 'all', or 'none'.
    #[arg(long, default_value = "none")]
    pub scenarios: String,

    /// Number of days to generate.
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// First day of the window (ISO date). Defaults to today.
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Global volume multiplier.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Write to the durable output location instead of the scratch one.
    #[arg(long)]
    pub no_test: bool,

    /// Report every written file, not just per-generator totals.
    #[arg(long)]
    pub show_files: bool,

    /// Worker pool size; defaults to the config (or available parallelism).
    #[arg(long)]
    pub workers: Option<usize>,
}

impl RunArgs {
    /// A bare `logforge` invocation behaves like `logforge run` with defaults.
    pub fn default_invocation() -> Self {
        RunArgs {
            sources: "all".to_string(),
            scenarios: "none".to_string(),
            days: 7,
            start_date: None,
            scale: 1.0,
            no_test: false,
            show_files: false,
            workers: None,
        }
    }
}

pub async fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<(), RunError> {
    let config = Arc::new(load_config_or_default(config_path.as_deref())?);

    let run = GenerationRun {
        start_date: args
            .start_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        days: args.days,
        scale: args.scale,
        sources: orchestrator::resolve_sources(&args.sources),
        scenarios: orchestrator::resolve_scenarios(&args.scenarios),
        output_mode: if args.no_test {
            OutputMode::Durable
        } else {
            OutputMode::Scratch
        },
        workers: args
            .workers
            .unwrap_or_else(|| config.orchestrator.effective_workers()),
        show_files: args.show_files,
    };

    info!(
        company = %config.company.name,
        start_date = %run.start_date,
        days = run.days,
        scale = run.scale,
        mode = ?run.output_mode,
        "Starting generation run"
    );

    // Ctrl-C stops dispatching new generators; in-flight ones finish so no
    // output file is left half-written.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, letting running generators finish");
            let _ = shutdown_tx.send(true);
        }
    });

    let show_files = run.show_files;
    let report = execute_run(config, run, shutdown_rx).await?;
    print_report(&report, show_files);

    if !report.all_ok() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &RunReport, show_files: bool) {
    println!();
    println!("{:<12} {}", "SOURCE", "OUTCOME");
    for (id, outcome) in &report.outcomes {
        println!("{:<12} {}", id, outcome.describe());
        if show_files {
            if let Outcome::Ok { files, .. } = outcome {
                for file in files {
                    println!("             {} ({} events)", file.path.display(), file.events);
                }
            }
        }
    }
    println!();
    println!(
        "{} generators, {} events total, {} failed",
        report.outcomes.len(),
        report.total_events(),
        report.failed_count()
    );
}
