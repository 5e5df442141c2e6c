use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_AUDIT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Browser executable override; when unset the launcher searches `PATH`.
    pub chrome_path: Option<PathBuf>,
    pub lighthouse_path: PathBuf,
    pub audit_timeout: Duration,
    pub public_dir: PathBuf,
    /// Adds error details to 500 responses.
    pub development: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::new(IpAddr::from([0, 0, 0, 0]), DEFAULT_PORT),
            chrome_path: None,
            lighthouse_path: PathBuf::from("lighthouse"),
            audit_timeout: Duration::from_secs(DEFAULT_AUDIT_TIMEOUT_SECS),
            public_dir: PathBuf::from("public"),
            development: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?,
            None => DEFAULT_PORT,
        };
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let audit_timeout = match lookup("AUDIT_TIMEOUT_SECS") {
            Some(secs) => {
                let secs = secs
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid audit timeout: {}", e)))?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "Audit timeout must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.audit_timeout,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            chrome_path: lookup("CHROME_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            lighthouse_path: lookup("LIGHTHOUSE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.lighthouse_path),
            audit_timeout,
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            development: lookup("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("development")),
        })
    }
}
