use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_QUIZ_DIR: &str = "content/quizzes";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// JSON competency catalog; the built-in seed catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    pub quiz_dir: PathBuf,
    /// JSON resource documents for path recommendations; none when unset
    pub content_path: Option<PathBuf>,
    /// Directory for per-user mastery files (profiles and history under `profiles/`);
    /// everything stays in memory when unset
    pub mastery_store_path: Option<PathBuf>,
    /// Daily-rolling log directory, set when `ENABLE_FILE_LOGS` is on
    pub file_log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let quiz_dir = env_path("QUIZ_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_QUIZ_DIR));

        Self {
            host,
            port,
            log_level,
            catalog_path: env_path("CATALOG_PATH"),
            quiz_dir,
            content_path: env_path("CONTENT_PATH"),
            mastery_store_path: env_path("MASTERY_STORE_PATH"),
            file_log_dir: file_logging_enabled()
                .then(|| env_path("LOG_DIR").unwrap_or_else(|| PathBuf::from("./logs"))),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn file_logging_enabled() -> bool {
    std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
