use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,sriracha=info,sriracha_mirror=info,sriracha_config=info";

/// Initialize logging for the sriracha CLI
///
/// Logs always go to stderr. When a log directory is configured, they are also
/// written to `<log_dir>/sriracha/log_<timestamp>.log`, whose path is returned.
///
/// The log level can be controlled via the RUST_LOG environment variable.
pub fn init(log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let log_file = log_dir.map(|dir| log_file_path(dir, chrono::Local::now()));

    let file_layer = match &log_file {
        Some(path) => {
            let (dir, name) = match (path.parent(), path.file_name()) {
                (Some(dir), Some(name)) => (dir, name),
                _ => anyhow::bail!("Invalid log file path: {}", path.display()),
            };
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(path) = &log_file {
        tracing::debug!("Writing to log file {}", path.display());
    }

    Ok(log_file)
}

/// Log file for a run started at `now`
fn log_file_path<Tz>(log_dir: &Path, now: chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    log_dir
        .join("sriracha")
        .join(format!("log_{}.log", now.format("%Y-%m-%dT%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_path() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let path = log_file_path(Path::new("/var/log/me"), now);
        assert_eq!(
            path,
            PathBuf::from("/var/log/me/sriracha/log_2024-03-05T140709.log")
        );
    }
}
