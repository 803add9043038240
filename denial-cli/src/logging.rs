use anyhow::{anyhow, Result};
use std::env;
use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Colored,
    Json,
}

impl LogStyle {
    /// Colored output only for a development run on a terminal without `NO_COLOR`
    pub fn detect() -> Self {
        let is_development =
            env::var("RCM_ENV").unwrap_or_else(|_| "development".to_string()) == "development";
        let use_colors = env::var("NO_COLOR").is_err() && std::io::stderr().is_terminal();
        if is_development && use_colors {
            LogStyle::Colored
        } else {
            LogStyle::Json
        }
    }
}

pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    format!(
        "denial_cli={level},rcm_denials={level},denial_analytics={level},claims_simulation={level}",
        level = level
    )
}

/// Install the global subscriber. `RUST_LOG` wins over the defaults.
pub fn init_tracing(verbose: bool, style: LogStyle) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let installed = match style {
        LogStyle::Colored => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init(),
        LogStyle::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}
