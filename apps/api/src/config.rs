use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub max_words: usize,
    pub max_file_size_mb: f64,
    pub artifact_path: PathBuf,
    pub model_timeout_secs: u64,
    pub queue_max_size: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            max_words: parse_env("MAX_WORDS", 1000)?,
            max_file_size_mb: parse_env("MAX_FILE_SIZE_MB", 5.0)?,
            artifact_path: std::env::var("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_PATH)),
            model_timeout_secs: parse_env("MODEL_TIMEOUT_SECS", 120)?,
            queue_max_size: parse_env("QUEUE_MAX_SIZE", 3)?,
            port: parse_env("PORT", 7860)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The slice of configuration the coaching orchestrator runs against.
    pub fn coach_settings(&self) -> CoachSettings {
        CoachSettings {
            max_words: self.max_words,
            max_file_size_mb: self.max_file_size_mb,
            artifact_path: self.artifact_path.clone(),
        }
    }

    /// Upper bound on a multipart body: two files at the ceiling plus form slack.
    /// Files above the ceiling but under this bound still reach the orchestrator,
    /// which reports them with a labelled size error. Bodies over the bound
    /// get the unlabelled upload-too-large message from the handler.
    pub fn body_limit_bytes(&self) -> usize {
        let per_file = (self.max_file_size_mb * 2.0 * BYTES_PER_MB as f64) as usize;
        per_file * 2 + BYTES_PER_MB
    }
}

pub const DEFAULT_ARTIFACT_PATH: &str = "career_buddy_feedback.md";
pub const BYTES_PER_MB: usize = 1024 * 1024;

/// Immutable limits handed to `Coach::new`.
#[derive(Debug, Clone)]
pub struct CoachSettings {
    pub max_words: usize,
    pub max_file_size_mb: f64,
    pub artifact_path: PathBuf,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            max_words: 1000,
            max_file_size_mb: 5.0,
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
