//! imgbed CLI: upload images to a CloudFlare ImgBed style host.
//!
//! Settings come from a JSON file (`--config`) or from `IMGBED_*` environment
//! variables, `.env` included.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use imgbed_api_client::ApiClient;
use imgbed_cli::{init_tracing, load_env, markdown_image, ConsoleNotifier};
use imgbed_core::{SourceFile, UploadConfiguration};
use imgbed_processing::UploadPipeline;
use imgbed_storage::LocalBackupStorage;

#[derive(Parser)]
#[command(name = "imgbed", about = "Image host upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and print its markdown embed
    Upload {
        /// Path to the image
        file: PathBuf,
        /// JSON settings file (defaults to IMGBED_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory that backupPath is resolved against
        #[arg(long, default_value = ".")]
        vault: PathBuf,
    },
    /// Validate settings and report every problem found
    CheckConfig {
        /// JSON settings file (defaults to IMGBED_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<UploadConfiguration> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading settings file");
            UploadConfiguration::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        }
        None => UploadConfiguration::from_env()
            .context("Failed to load settings from IMGBED_* environment variables")?,
    };
    Ok(config)
}

async fn upload(file: &Path, config: &UploadConfiguration, vault: &Path) -> anyhow::Result<()> {
    let source = SourceFile::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let client = ApiClient::new()?;
    let mut pipeline = UploadPipeline::new(Arc::new(client), Arc::new(ConsoleNotifier));
    if config.enable_local_backup {
        let storage = LocalBackupStorage::new(vault)
            .await
            .context("Failed to open backup vault")?;
        pipeline = pipeline.with_backup(Arc::new(storage));
    }

    let name = source.name().to_string();
    let url = pipeline.upload(source, config).await?;
    println!("{}", markdown_image(&name, &url));
    Ok(())
}

fn check_config(config: &UploadConfiguration) -> bool {
    match config.validate() {
        Ok(()) => {
            println!("Settings are valid");
            true
        }
        Err(e) => {
            println!("{}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing(load_env(None));

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            config,
            vault,
        } => {
            let config = load_config(config.as_deref())?;
            upload(&file, &config, &vault).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            if check_config(&config) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
