use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "hurricane_model.json";
pub const DEFAULT_BACKGROUND_PATH: &str = "1714343434-nasa-hurricane-isabel.jpg";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub background_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Log every prediction at info level (`LOG_PRED=1`).
    pub log_predictions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            background_path: PathBuf::from(DEFAULT_BACKGROUND_PATH),
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_predictions: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            background_path: lookup("BACKGROUND_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.background_path),
            host: lookup("BIND_HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            log_predictions: lookup("LOG_PRED").as_deref() == Some("1"),
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", addr, e))
    }
}
