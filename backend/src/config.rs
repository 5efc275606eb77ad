use anyhow::Context;
use std::path::PathBuf;

/// Runtime configuration, read from environment variables with local-development defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// SQLite database file. `:memory:` keeps everything in memory.
    pub database_path: String,
    /// Directory holding `frameworks/` and `data-point-types/` specification files.
    pub specification_dir: PathBuf,
    /// Maximum accepted JSON body size in bytes.
    pub json_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("DATALAND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("DATALAND_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("DATALAND_PORT must be a valid port number")?;
        let database_path = std::env::var("DATALAND_DATABASE_PATH")
            .unwrap_or_else(|_| "dataland.sqlite".to_string());
        let specification_dir = std::env::var("DATALAND_SPECIFICATION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("specifications"));
        let json_limit_bytes = std::env::var("DATALAND_JSON_LIMIT_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<usize>()
            .context("DATALAND_JSON_LIMIT_BYTES must be a byte count")?;

        Ok(Config {
            host,
            port,
            database_path,
            specification_dir,
            json_limit_bytes,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
