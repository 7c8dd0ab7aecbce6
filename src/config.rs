use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// File slot the queue persists to.
    pub queue_path: PathBuf,
    /// Retry ceiling applied when `add` is not given an explicit one.
    pub default_max_retries: u32,
}

impl Config {
    pub fn new(queue_path: impl Into<PathBuf>) -> Self {
        Self {
            queue_path: queue_path.into(),
            default_max_retries: 3,
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let queue_path = env_required("SAFECON_QUEUE_PATH")?;

        let default_max_retries: u32 = env_or("SAFECON_MAX_RETRIES", "3")
            .parse()
            .map_err(|e| format!("Invalid SAFECON_MAX_RETRIES: {e}"))?;

        Ok(Config {
            queue_path: PathBuf::from(queue_path),
            default_max_retries,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
