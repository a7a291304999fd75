use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MESSAGES_FILE: &str = "messages.json";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// JSON file holding the message history
    pub messages_file: PathBuf,
    /// Directory with the browser client
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            messages_file: PathBuf::from(DEFAULT_MESSAGES_FILE),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let port = match std::env::var("PORT") {
            Ok(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!("Invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let messages_file =
            env_path("MESSAGES_FILE").unwrap_or_else(|| DEFAULT_MESSAGES_FILE.into());
        let static_dir = env_path("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.into());

        Self {
            port,
            messages_file,
            static_dir,
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
