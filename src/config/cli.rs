use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_UPSTREAM: &str = "https://api.rawg.io/api";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// RAWG API key injected into upstream requests
    #[clap(long, env = "RAWG_API_KEY", hide_env_values = true)]
    pub rawg_api_key: Option<String>,

    /// Directory holding the persisted favorites list
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve static files and relay the trending query to RAWG
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,

        /// Directory static files are served from
        #[arg(long, default_value = ".")]
        doc_root: PathBuf,

        /// Base URL of the RAWG API
        #[arg(long, default_value = DEFAULT_UPSTREAM)]
        upstream: String,
    },
    /// Load trending games and print the dashboard rows
    Browse {
        /// Fetch through a running gateway (e.g. http://localhost:3000)
        #[arg(long)]
        gateway: Option<String>,

        /// Base URL of the RAWG API
        #[arg(long, default_value = DEFAULT_UPSTREAM)]
        upstream: String,

        /// Additional pages to request after the first one
        #[arg(long, default_value_t = 0)]
        pages: u32,

        /// Initial search filter
        #[arg(long)]
        search: Option<String>,

        /// Read commands from stdin (more, search <text>, clear, fav <id>, quit)
        #[arg(long)]
        interactive: bool,
    },
}
