//! The `configure` command

use anyhow::Context;
use clap::Args;
use sriracha_config::{self as config, UserConfig};
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Clone, Debug)]
pub struct ConfigureArgs {
    /// Local sync directory for S3 files (empty string removes the setting)
    #[arg(long, short = 's', value_name = "DIR")]
    pub local_sync_dir: Option<String>,

    /// Local directory to store logs (empty string removes the setting)
    #[arg(long, short = 'l', value_name = "DIR")]
    pub log_dir: Option<String>,

    /// Do not prompt; use current or default values for unspecified settings
    #[arg(long)]
    pub no_input: bool,
}

/// Configure the local directories and write the config file at `config_path`
pub fn run(args: ConfigureArgs, config_path: &Path) -> anyhow::Result<UserConfig> {
    let existing = UserConfig::load_or_default(config_path)?;
    let interactive = !args.no_input && std::io::stdin().is_terminal();
    let mut input = std::io::stdin().lock();

    let local_sync_dir = choose_dir(
        "local_sync_dir",
        "S3 Local Sync Directory",
        args.local_sync_dir,
        existing.local_sync_dir.as_deref(),
        config::default_sync_dir()?,
        interactive.then_some(&mut input as &mut dyn BufRead),
    )?;

    let log_dir = choose_dir(
        "log_dir",
        "Local log directory",
        args.log_dir,
        existing.log_dir.as_deref(),
        config::default_log_dir()?,
        interactive.then_some(&mut input as &mut dyn BufRead),
    )?;

    let updated = UserConfig {
        local_sync_dir,
        log_dir,
    };
    updated
        .save(config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(updated)
}

/// Pick the value for one directory setting and create the directory
///
/// An explicit value wins; otherwise the user is prompted (if `input` is
/// given) with the current value or `fallback` as default.
fn choose_dir(
    key: &str,
    label: &str,
    explicit: Option<String>,
    current: Option<&Path>,
    fallback: PathBuf,
    input: Option<&mut dyn BufRead>,
) -> anyhow::Result<Option<PathBuf>> {
    let default = current.map(Path::to_path_buf).unwrap_or(fallback);
    let default = default.display().to_string();

    let value = match (explicit, input) {
        (Some(value), _) => value,
        (None, Some(input)) => prompt(label, &default, input)?,
        (None, None) => default,
    };

    if value.trim().is_empty() {
        return Ok(None);
    }

    let path = config::prepare_dir(key, value.trim())?;
    Ok(Some(path))
}

fn prompt(label: &str, default: &str, input: &mut dyn BufRead) -> anyhow::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label} [{default}]: ")?;
    stderr.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_values_are_written() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let sync_dir = temp_dir.path().join("s3");
        let log_dir = temp_dir.path().join("logs");

        let args = ConfigureArgs {
            local_sync_dir: Some(sync_dir.display().to_string()),
            log_dir: Some(log_dir.display().to_string()),
            no_input: true,
        };
        let written = run(args, &config_path).unwrap();

        assert_eq!(written.local_sync_dir.as_deref(), Some(sync_dir.as_path()));
        assert!(sync_dir.is_dir());
        assert!(log_dir.is_dir());
        assert_eq!(UserConfig::load(&config_path).unwrap(), written);
    }

    #[test]
    fn test_empty_value_removes_setting() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        UserConfig {
            local_sync_dir: Some(temp_dir.path().join("s3")),
            log_dir: Some(temp_dir.path().join("logs")),
        }
        .save(&config_path)
        .unwrap();

        let args = ConfigureArgs {
            local_sync_dir: None,
            log_dir: Some(String::new()),
            no_input: true,
        };
        let written = run(args, &config_path).unwrap();

        assert_eq!(
            written.local_sync_dir.as_deref(),
            Some(temp_dir.path().join("s3").as_path())
        );
        assert!(written.log_dir.is_none());
    }

    #[test]
    fn test_prompt_uses_default_on_empty_answer() {
        let mut input: &[u8] = b"\n";
        let answer = prompt("Dir", "/default", &mut input).unwrap();
        assert_eq!(answer, "/default");

        let mut input: &[u8] = b"  /custom  \n";
        let answer = prompt("Dir", "/default", &mut input).unwrap();
        assert_eq!(answer, "/custom");
    }

    #[test]
    fn test_choose_dir_prompts_with_current_value() {
        let temp_dir = TempDir::new().unwrap();
        let current = temp_dir.path().join("current");
        let mut input: &[u8] = b"\n";

        let chosen = choose_dir(
            "local_sync_dir",
            "Dir",
            None,
            Some(&current),
            temp_dir.path().join("fallback"),
            Some(&mut input),
        )
        .unwrap();

        assert_eq!(chosen.as_deref(), Some(current.as_path()));
        assert!(current.is_dir());
        assert!(!temp_dir.path().join("fallback").exists());
    }

    #[test]
    fn test_choose_dir_rejects_remote_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = choose_dir(
            "log_dir",
            "Dir",
            Some("s3://bucket/logs".to_string()),
            None,
            temp_dir.path().join("fallback"),
            None,
        );
        assert!(result.is_err());
    }
}
