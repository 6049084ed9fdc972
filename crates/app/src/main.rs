use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tally_core::Settings;

mod commands;
mod confirm;

#[derive(Parser)]
#[command(name = "tally", version, about = "Personal finance tracker with receipt matching")]
struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review and import receipt photos from a folder.
    Import {
        /// Folder to import from; falls back to `import_folder` in settings.
        folder: Option<PathBuf>,
    },
    /// List merchants by distance from a point.
    Nearby {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Show the metadata embedded in a receipt photo.
    Inspect { file: PathBuf },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Command::Inspect { file } = &cli.command {
        return commands::inspect(file);
    }

    let project_dirs = directories::ProjectDirs::from("com", "tally", "Tally")
        .context("Failed to locate a home directory")?;
    let data_dir = project_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| project_dirs.config_dir().join("settings.toml"));
    let settings = Settings::load(&config_path, &data_dir)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    tracing::debug!("Using database {}", settings.database_path.display());

    let db = tally_storage::create_db(&settings.database_path)
        .await
        .with_context(|| format!("Failed to open {}", settings.database_path.display()))?;

    match cli.command {
        Command::Import { folder } => commands::import(&db, &settings, folder).await,
        Command::Nearby { latitude, longitude } => {
            commands::nearby(&db, &settings, latitude, longitude).await
        }
        Command::Inspect { .. } => Ok(()),
    }
}
