use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

use denial_analytics::run_pipeline;
use denial_cli::{
    init_tracing, render_default_config, render_summary, resolve_config, FileFormat,
    FlagOverrides, LogStyle,
};

/// Claims denial simulation and analytics
#[derive(Parser, Debug)]
#[command(name = "rcm-denials")]
#[command(about = "Simulate a healthcare claim population and analyze its denials")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate claims and print the analysis report
    Run(RunArgs),
    /// Print the built-in default configuration
    DefaultConfig {
        /// Output format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Yaml)]
        format: ConfigFormat,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Configuration file path (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of claims to generate
    #[arg(long)]
    claims: Option<u32>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Summary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConfigFormat {
    Yaml,
    Json,
}

impl From<ConfigFormat> for FileFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Yaml => FileFormat::Yaml,
            ConfigFormat::Json => FileFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::DefaultConfig { format } => {
            print!("{}", render_default_config(format.into())?);
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    init_tracing(args.verbose, LogStyle::detect())?;

    let config = resolve_config(
        args.config.as_deref(),
        |key| std::env::var(key).ok(),
        FlagOverrides {
            seed: args.seed,
            total_claims: args.claims,
        },
    )?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        seed = config.simulation.seed,
        total_claims = config.simulation.total_claims,
        "Starting denial analysis run"
    );

    let output = run_pipeline(&config).context("Analysis pipeline failed")?;

    let rendered = match args.format {
        ReportFormat::Json => output.report.to_json_pretty()?,
        ReportFormat::Summary => {
            let color = args.output.is_none()
                && std::env::var("NO_COLOR").is_err()
                && std::io::stdout().is_terminal();
            render_summary(&output.report, color)?
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
