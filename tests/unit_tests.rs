use clap::Parser;
use sriracha::mirror::{DownloadMode, MirrorError};
use sriracha::{ConfigOpts, MirrorOpts};
use std::path::PathBuf;

#[test]
fn test_mirror_opts_defaults() {
    let opts = MirrorOpts::try_parse_from(["s3-to-local"]).unwrap();

    assert_eq!(opts.download_mode, DownloadMode::SizeAndTimestamp);
    assert!(opts.include.is_empty());

    let options = opts.resolve_options().unwrap();
    assert_eq!(options.mode, DownloadMode::SizeAndTimestamp);
}

#[test]
fn test_mirror_opts_download_mode_and_includes() {
    let opts = MirrorOpts::try_parse_from([
        "s3-to-local",
        "--download-mode",
        "size-only",
        "--include",
        "*.csv",
        "--include",
        "2024/*",
    ])
    .unwrap();

    assert_eq!(opts.download_mode, DownloadMode::SizeOnly);
    assert_eq!(opts.include, vec!["*.csv".to_string(), "2024/*".to_string()]);
    assert!(opts.resolve_options().is_ok());
}

#[test]
fn test_mirror_opts_rejects_unknown_mode() {
    let result = MirrorOpts::try_parse_from(["s3-to-local", "--download-mode", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn test_mirror_opts_bad_pattern() {
    let opts = MirrorOpts::try_parse_from(["s3-to-local", "--include", "[oops"]).unwrap();
    assert!(matches!(
        opts.resolve_options(),
        Err(MirrorError::InvalidOption(_))
    ));
}

#[test]
fn test_config_opts_explicit_path() {
    let opts = ConfigOpts::try_parse_from(["sriracha", "--config", "/tmp/sriracha.toml"]).unwrap();
    assert_eq!(opts.path().unwrap(), PathBuf::from("/tmp/sriracha.toml"));
}
