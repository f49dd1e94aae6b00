use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Stylesheets and images shipped with the server crate
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// Connection string: a file path, `sqlite://path`, `sqlite::memory:` or `:memory:`
    pub url: String,
    /// Insert sample users and messages on startup
    pub seed: bool,
}

impl Database {
    /// Filesystem path (or ":memory:") that the SQLite pool should open
    pub fn path(&self) -> String {
        database_path_from_url(&self.url)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub ttl_days: i64,
    /// Mark the session cookie `Secure` (serve over HTTPS only)
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub session: Session,
}

/// Strip the scheme from a `DATABASE_URL`-style value
pub fn database_path_from_url(url: &str) -> String {
    let url = url.trim();
    if url.eq_ignore_ascii_case("sqlite::memory:") {
        return ":memory:".to_string();
    }
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
        .to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Optional settings.toml
        let config_file_name = "settings.toml";

        // Check in current directory
        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in warbler-server directory (for development)
        let dev_path = PathBuf::from("warbler-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // 2. Defaults, then environment variables (highest priority)
        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.static_dir", DEFAULT_STATIC_DIR)?
            .set_default("database.url", "warbler.db")?
            .set_default("database.seed", false)?
            .set_default("session.ttl_days", crate::session::DEFAULT_SESSION_TTL_DAYS)?
            .set_default("session.secure_cookie", false)?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(seed) = std::env::var("WARBLER_SEED") {
            builder = builder.set_override("database.seed", seed)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
