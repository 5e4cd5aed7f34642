use anyhow::{anyhow, Result};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter for `-v` counts. RUST_LOG wins unless `--quiet` is set.
fn level_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let default = match verbose_level {
        0 => "info",
        // reqwest's connection pool is chatty at debug
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,html5ever=warn,selectors=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Daily-rotated appender; `moviepicks.log` rotates as `moviepicks.2026-01-17`.
fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let dir = log_path
        .parent()
        .ok_or_else(|| anyhow!("Log file path {} has no parent directory", log_path.display()))?;
    std::fs::create_dir_all(dir)?;

    let prefix = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename: {}", log_path.display()))?;

    Ok(RollingFileAppender::new(Rotation::DAILY, dir, prefix))
}

/// Installs the global subscriber. Interactive runs log to stderr; the daemon
/// passes a file so scheduled runs leave a trail. JSON lines are used when
/// stdout is not a terminal or `RUST_LOG_JSON=true`.
pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(level_filter(verbose_level, quiet));

    match (log_file, json) {
        (Some(path), true) => {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(rolling_appender(&path)?);
            registry.with(layer).init();
        }
        (Some(path), false) => {
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(rolling_appender(&path)?);
            registry.with(layer).init();
        }
        (None, true) => {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(layer).init();
        }
        (None, false) => {
            let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
            registry.with(layer).init();
        }
    }

    Ok(())
}
