use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CHAT_MODEL: &str = "command-r-plus";
const DEFAULT_VISION_MODEL: &str = "c4ai-aya-vision-32b";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide settings, read once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub cohere_api_key: Option<String>,
    pub spoonacular_api_key: Option<String>,
    pub chat_model: String,
    pub vision_model: String,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("UPSTREAM_TIMEOUT_SECS is not a number: {}", v))?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES is not a number: {}", v))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            cohere_api_key: non_empty_var("COHERE_API_KEY"),
            spoonacular_api_key: non_empty_var("SPOONACULAR_API_KEY"),
            chat_model: env::var("COHERE_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            vision_model: env::var("COHERE_VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            frontend_dir: env::var("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("frontend/dist")),
            upstream_timeout,
            max_upload_bytes,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
