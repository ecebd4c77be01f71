use crate::config::cli::Args;
use crate::error::{DashError, Result};
use clap::Parser;
use reqwest::Client;
use tracing::{info, Level};

pub mod cli;

pub struct Config {
    pub args: Args,
    pub http_client: Client,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        // No timeout: a pending fetch simply stays in flight.
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { args, http_client })
    }

    pub fn log_level(&self) -> Level {
        self.args.log_level.parse().unwrap_or(Level::INFO)
    }

    pub fn api_key(&self) -> Result<String> {
        self.args
            .rawg_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DashError::Config("RAWG_API_KEY is not set".to_string()))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }

        info!("Data dir exists");
        Ok(())
    }
}
