use std::path::PathBuf;

use clap::Parser;

/// Catalog process configuration: host/port for itself and the front-end
/// come from the environment (matching the original's `.env` file);
/// cache-mode is a process argument, as §6 specifies.
#[derive(Parser, Debug)]
pub struct Config {
    #[arg(long, env = "CATALOG_PORT")]
    pub catalog_port: u16,

    #[arg(long, env = "FRONT_HOST")]
    pub front_host: String,

    #[arg(long, env = "FRONT_PORT")]
    pub front_port: u16,

    /// Whether a successful update fires an invalidation to the front-end.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub cache_mode: bool,

    #[arg(long, default_value = "catalog_database.json")]
    pub store_path: PathBuf,

    /// Seed file loaded only when `store_path` doesn't exist yet.
    #[arg(long)]
    pub seed_file: Option<PathBuf>,
}
