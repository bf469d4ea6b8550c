use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parley_graph::AnalysisError;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;
mod sources;
mod ui;

use config::ParleyConfig;
use render::OutputFormat;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Who talks to whom. Interaction graphs from chat exports.")]
#[command(version)]
struct Cli {
    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to $PARLEY_CONFIG, then ./parley.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the interaction graph of an export and render it
    Analyze {
        /// Telegram export (result.json)
        #[arg(value_name = "EXPORT")]
        export: PathBuf,

        /// Output format
        #[arg(long, short, value_enum)]
        format: Option<OutputFormat>,

        /// Write to a file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Number of strongest connections to list
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// List the participants resolved from an export
    Participants {
        /// Telegram export (result.json)
        #[arg(value_name = "EXPORT")]
        export: PathBuf,

        /// Include participants left out of the report
        #[arg(long, short)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, env.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<AnalysisError>() {
            Some(AnalysisError::EmptyInput) => {
                ui::error("The export contains no usable messages.");
                ui::info("Check that it is a Telegram result.json with a messages list.");
                ExitCode::from(2)
            }
            _ => {
                ui::error(&format!("{err:#}"));
                ExitCode::FAILURE
            }
        },
    }
}

/// `RUST_LOG` decides when no `-v` is given, falling back to `warn`.
/// `-v`/`-vv` raise the global level and keep per-target directives.
fn log_filter(verbose: u8, env: Option<&str>) -> EnvFilter {
    let from_env = || env.and_then(|spec| EnvFilter::try_new(spec).ok());
    let level = match verbose {
        0 => return from_env().unwrap_or_else(|| EnvFilter::new("warn")),
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    from_env()
        .unwrap_or_else(|| EnvFilter::new("warn"))
        .add_directive(level.into())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = ParleyConfig::resolve_path(cli.config.as_deref());
    let config = ParleyConfig::load(&config_path)?;

    match cli.command {
        Commands::Analyze {
            export,
            format,
            output,
            top,
        } => commands::analyze::run(
            commands::analyze::AnalyzeArgs {
                export,
                format,
                output,
                top,
            },
            &config,
        ),
        Commands::Participants { export, all, json } => {
            commands::participants::run(&export, all, json, &config)
        }
    }
}
