use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use gram_core::{browser, BrowserError, ConfigError, RunConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Log into Instagram and leave one comment on the first post of a profile",
    long_about = None
)]
pub struct Cli {
    /// Environment file with credentials, comment text, and target URL
    #[arg(default_value = ".env")]
    pub env_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Automation(#[from] BrowserError),
}

impl AppError {
    /// Process exit code: 1 for configuration problems, 2 for a bounded
    /// wait that expired, 3 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1,
            AppError::Automation(BrowserError::Timeout(_)) => 2,
            AppError::Automation(_) => 3,
        }
    }

    /// Single diagnostic line for stderr.
    pub fn report(&self) -> String {
        match self {
            AppError::Config(err) => format!("Error: {err}"),
            AppError::Automation(err @ BrowserError::Timeout(_)) => {
                format!("Automation timed out: {err}")
            }
            AppError::Automation(err) => format!("Unexpected error: {err}"),
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = RunConfig::from_env_file(&cli.env_file)?;
    browser::run_once(&config).await?;
    println!("Comment posted successfully!");
    Ok(())
}
