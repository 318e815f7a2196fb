//! Command-line interface for sriracha
//!
//! # Usage Examples
//!
//! ```bash
//! # Set up the local sync and log directories (prompts on a terminal)
//! sriracha configure
//! sriracha configure --local-sync-dir ~/data/s3 --log-dir ~/data/logs --no-input
//!
//! # Mirror an object and print its local path
//! sriracha s3-to-local s3://bucket/path/to/file.csv
//!
//! # Mirror a prefix, re-downloading whenever the size differs
//! sriracha s3-to-local s3://bucket/dataset/ --download-mode size-only --include '*.csv'
//!
//! # Print a dataset manifest
//! sriracha get-manifest s3://bucket/dataset
//! ```

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use sriracha::configure::{self, ConfigureArgs};
use sriracha::{logging, ConfigOpts, MirrorOpts};
use sriracha_config::UserConfig;
use sriracha_mirror::{
    fetch_manifest, local_passthrough, MirrorError, MirrorResolver, S3Store, S3_SCHEME,
};

#[derive(Parser)]
#[command(name = "sriracha")]
#[command(about = "Keep local copies of S3 data under a configured directory")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the local directories used by sriracha
    Configure {
        #[command(flatten)]
        args: ConfigureArgs,
    },

    /// Mirror an S3 path locally and print the local path
    #[command(name = "s3-to-local")]
    S3ToLocal {
        /// S3 path (s3://bucket/key) or a local path, which is printed unchanged
        path: String,

        #[command(flatten)]
        opts: MirrorOpts,
    },

    /// Print the dataset information from the manifest under an S3 prefix
    #[command(name = "get-manifest")]
    GetManifest {
        /// S3 dataset path (s3://bucket/prefix)
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.path()?;

    // A broken config file is reported by the command that needs it
    let log_dir = UserConfig::load(&config_path)
        .ok()
        .and_then(|config| config.log_dir);
    logging::init(log_dir.as_deref())?;

    match cli.command {
        Commands::Configure { args } => {
            configure::run(args, &config_path)?;
        }
        Commands::S3ToLocal { path, opts } => {
            let options = opts.resolve_options()?;

            // Local paths need neither configuration nor credentials
            if let Some(local_path) = local_passthrough(&path)? {
                println!("{}", local_path.display());
                return Ok(());
            }

            let root = UserConfig::load(&config_path)
                .map_err(MirrorError::from)?
                .mirror_root()?;

            let resolver = MirrorResolver::new(root, S3Store::new().await);
            let local_path = resolver
                .resolve_path(&path, &options)
                .await
                .with_context(|| format!("Failed to mirror {path}"))?;

            println!("{}", local_path.display());
        }
        Commands::GetManifest { path } => {
            if !path.starts_with(S3_SCHEME) {
                Cli::command()
                    .error(
                        clap::error::ErrorKind::InvalidValue,
                        format!("URL scheme should be s3, but received {path}"),
                    )
                    .exit();
            }

            let store = S3Store::new().await;
            let (found, body) = fetch_manifest(&store, &path).await?;

            eprintln!("Found manifest in {found}");
            print!("{body}");
        }
    }

    Ok(())
}
