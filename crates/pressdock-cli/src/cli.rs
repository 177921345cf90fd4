//! Command-line arguments.

use anyhow::{Context, Result};
use clap::Parser;
use pressdock_core::{log, term, ProjectConfig, APP_NAME, DEFAULT_CONFIG_FILE, VERSION};
use pressdock_types::LogLevel;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Provision a local Docker Compose WordPress stack", long_about = None)]
#[command(after_help = "Running pressdock again on a provisioned stack changes nothing.")]
pub struct Cli {
    /// Project configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub debug: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log level after applying the verbosity flags to the configured one.
    pub fn log_level(&self, configured: LogLevel) -> LogLevel {
        if self.debug {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            configured
        }
    }

    /// Directory the project lives in: the configuration file's parent.
    pub fn project_dir(&self) -> PathBuf {
        match self.config.parent() {
            Some(dir) if dir != Path::new("") => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        term::configure_colors();

        let config = ProjectConfig::load(&self.config)
            .with_context(|| format!("Failed to load {}", self.config.display()))?;

        let mut logging = config.logging;
        logging.level = self.log_level(logging.level);
        log::init(&logging).context("Failed to initialize logging")?;

        crate::run::execute(config, &self.project_dir(), !self.quiet).await
    }
}
