use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use packetguardian::config::{GuardianConfig, LoggingConfig};
use packetguardian::ScanError;

#[derive(Parser)]
#[command(
    name = "packetguardian",
    about = "Heuristic flow anomaly detector for free-text network logs",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a log file (or stdin) for suspicious flows
    Scan {
        /// Log file to read; `-` or omitted reads stdin
        input: Option<PathBuf>,

        /// Total bytes per flow that triggers an alert
        #[arg(long)]
        byte_threshold: Option<u64>,

        /// Number of strictly increasing packet sizes that triggers an alert
        #[arg(long)]
        run_length: Option<usize>,

        /// Time window in seconds (reserved, not used by detection)
        #[arg(long)]
        time_window: Option<u64>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,

        /// Also write alerts as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Print a sample log in the supported format
    Sample,
}

fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = env_filter(&logging.level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read log file: {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The logging level lives in the config file, so config resolution logs
    // through a scoped stderr subscriber until the real one is installed.
    // Only an explicit --config failure is fatal; see GuardianConfig::resolve.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        GuardianConfig::resolve(cli.config.as_deref())
    })?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Scan {
            input,
            byte_threshold,
            run_length,
            time_window,
            json,
            csv,
        } => {
            let detection = &mut config.detection;
            if let Some(v) = byte_threshold {
                detection.byte_threshold = v;
            }
            if let Some(v) = run_length {
                detection.increasing_run_length = v;
            }
            if let Some(v) = time_window {
                detection.time_window_seconds = v;
            }

            let text = read_input(input.as_ref()).await?;
            tracing::info!(bytes = text.len(), ?input, "Running scan");

            let report = match packetguardian::scan(&text, &config.detection) {
                Ok(report) => report,
                Err(e @ (ScanError::EmptyInput | ScanError::NoParsableLines { .. })) => {
                    eprintln!("{}", e);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(path) = &csv {
                packetguardian::report::write_csv(path, &report.alerts)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.alerts.is_empty() {
                println!("No suspicious flows detected.");
            } else {
                for alert in &report.alerts {
                    tracing::warn!(
                        source = %alert.source,
                        destination = %alert.destination,
                        bytes = alert.total_bytes,
                        reason = %alert.reason,
                        "suspicious flow"
                    );
                    println!("{}", packetguardian::report::format_alert(alert));
                }
                println!(
                    "\n{} alert(s) across {} flow(s), {} line(s) skipped",
                    report.alerts.len(),
                    report.flows,
                    report.stats.skipped
                );
            }
        }
        Commands::Sample => {
            print!("{}", packetguardian::SAMPLE_LOG);
        }
    }

    Ok(())
}
