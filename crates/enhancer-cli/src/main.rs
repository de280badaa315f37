use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use enhancer_chain::ChainsFile;
use enhancer_cli::{render_plan, ChainHost, OutputFormat};
use enhancer_monitoring::MonitoringConfig;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "chainctl",
    about = "Compile, inspect and watch enhancement chain execution plans",
    version
)]
struct Cli {
    /// Chain configuration file (YAML)
    #[arg(long, short, env = "CHAINCTL_CONFIG", default_value = "chains.yaml")]
    config: PathBuf,

    /// Directory with execution plan resources, overrides `data_dir` of the configuration
    #[arg(long, env = "CHAINCTL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "LOG_FILTER", default_value = "warn")]
    log_filter: String,

    /// Log as JSON
    #[arg(long)]
    json_logs: bool,

    /// Additionally log to this file, rotated daily
    #[arg(long, env = "CHAINCTL_LOG_FILE")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Activate every configured chain and report its plan or error.
    Validate,
    /// Print the execution plan of one chain.
    Show {
        chain: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Poll the data directory and report chains whenever resources change.
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    enhancer_monitoring::init_logging(&MonitoringConfig {
        service_name: "chainctl".to_string(),
        log_filter: cli.log_filter.clone(),
        enable_json_logging: cli.json_logs,
        log_file: cli.log_file.clone(),
    })
    .context("Failed to initialize logging")?;

    let file = ChainsFile::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let host = ChainHost::start(&file, cli.data_dir)?;

    match cli.command {
        Command::Validate => {
            let reports = host.reports();
            for report in &reports {
                println!("{}", report.summary());
            }
            if reports.iter().all(|report| report.is_ok()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Show { chain, format } => {
            let plan = host.plan(&chain)?;
            println!("{}", render_plan(&plan, format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch { interval } => {
            watch(&host, Duration::from_secs(interval.max(1))).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn watch(host: &ChainHost, interval: Duration) -> Result<()> {
    for report in host.reports() {
        println!("{}", report.summary());
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let changes = host.sync()?;
                if changes.is_empty() {
                    continue;
                }
                info!(published = ?changes.published, withdrawn = ?changes.withdrawn, "Resources changed");
                for report in host.reports() {
                    println!("{}", report.summary());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                return Ok(());
            }
        }
    }
}
