//! Coaching Orchestrator — runs one coaching request end to end.
//!
//! Flow: collect texts → validate → compose prompt → call model →
//!       strip fences + parse JSON → normalize → render → persist artifact.
//!
//! Every failure is resolved here into a short user-facing message. Nothing
//! from upstream (model errors, raw output) reaches the user.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::coaching::artifact;
use crate::coaching::normalizer::normalize;
use crate::coaching::prompts::build_coaching_prompt;
use crate::coaching::renderer::render;
use crate::config::{CoachSettings, BYTES_PER_MB};
use crate::extract::{extract_text_blocking, ExtractError};
use crate::llm_client::{strip_json_fences, CompletionModel, LlmError, COACHING_TEMPERATURE};

/// Raw model output is logged up to this many characters on parse failure.
const RAW_LOG_LIMIT: usize = 10_000;

// ────────────────────────────────────────────────────────────────────────────
// Request / outcome types
// ────────────────────────────────────────────────────────────────────────────

/// One user action's inputs. Not persisted beyond the request.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    /// Pasted JD text. Preferred over `jd_file` when non-blank.
    pub jd_text: Option<String>,
    pub jd_file: Option<PathBuf>,
    /// Mandatory; there is no paste option for the résumé.
    pub resume_file: Option<PathBuf>,
    pub domain: String,
    pub years_of_experience: f64,
}

/// The tri-part result handed back to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachOutcome {
    pub display: String,
    pub artifact: Option<PathBuf>,
    /// True iff the artifact was written.
    pub download_visible: bool,
}

impl CoachOutcome {
    pub fn failure(err: &CoachError) -> Self {
        Self {
            display: err.user_message(),
            artifact: None,
            download_visible: false,
        }
    }
}

/// Which input a failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLabel {
    JobDescription,
    Resume,
}

impl InputLabel {
    fn long_name(self) -> &'static str {
        match self {
            InputLabel::JobDescription => "Job Description",
            InputLabel::Resume => "Resume",
        }
    }
}

impl fmt::Display for InputLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputLabel::JobDescription => "JD",
            InputLabel::Resume => "Resume",
        })
    }
}

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("{label} file exceeds {limit_mb} MB")]
    FileTooLarge { label: InputLabel, limit_mb: f64 },

    #[error("{label} PDF could not be parsed")]
    PdfParse { label: InputLabel },

    #[error("{label} file could not be read")]
    Read { label: InputLabel },

    #[error("job description or resume text missing")]
    MissingInput,

    #[error("{label} exceeds {limit} words")]
    TooManyWords { label: InputLabel, limit: usize },

    #[error("model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("model returned invalid JSON")]
    InvalidJson,

    #[error("model returned a non-object JSON value")]
    UnexpectedStructure,

    #[error("request body exceeds the upload limit")]
    UploadTooLarge { limit_mb: f64 },

    #[error("too many requests in flight")]
    Busy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    /// Short text shown on the page. Upstream detail is never included.
    pub fn user_message(&self) -> String {
        match self {
            CoachError::FileTooLarge { label, limit_mb } => {
                format!("❌ {label} file is too large (max {limit_mb} MB).")
            }
            CoachError::PdfParse { label } => {
                format!("❌ Could not parse the {label} PDF. Try a DOCX or text file.")
            }
            CoachError::Read { label } => format!("❌ Could not read the {label} file."),
            CoachError::MissingInput => "⚠️ Please provide both JD and Resume.".to_string(),
            CoachError::TooManyWords { label, limit } => {
                format!("⚠️ {} exceeds {limit} words.", label.long_name())
            }
            CoachError::Upstream(_) => {
                "⚠️ The AI service did not respond successfully. Retry.".to_string()
            }
            CoachError::InvalidJson => "⚠️ AI returned invalid JSON. Retry.".to_string(),
            CoachError::UnexpectedStructure => {
                "⚠️ AI returned unexpected structure. Retry.".to_string()
            }
            CoachError::UploadTooLarge { limit_mb } => {
                format!("❌ Upload is too large (max {limit_mb} MB per file).")
            }
            CoachError::Busy => "⚠️ Server busy. Retry in a moment.".to_string(),
            CoachError::Internal(_) => "❌ Unexpected error. Please try again.".to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct Coach {
    settings: CoachSettings,
    model: Arc<dyn CompletionModel>,
}

impl Coach {
    pub fn new(settings: CoachSettings, model: Arc<dyn CompletionModel>) -> Self {
        Self { settings, model }
    }

    /// Runs the request on its own task so a panic anywhere in the pipeline
    /// becomes the generic error response instead of taking the handler down.
    pub async fn run_isolated(self: Arc<Self>, input: RequestInput) -> CoachOutcome {
        match tokio::spawn(async move { self.run(input).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Unexpected error in coaching request: {e}");
                CoachOutcome::failure(&CoachError::Internal(e.to_string()))
            }
        }
    }

    pub async fn run(&self, input: RequestInput) -> CoachOutcome {
        let request_id = Uuid::new_v4();
        info!("--- New coaching request {request_id} ---");

        match self.try_run(input).await {
            Ok(outcome) => {
                info!(
                    "Coaching request {request_id} completed (artifact written: {})",
                    outcome.download_visible
                );
                outcome
            }
            Err(e) => {
                warn!("Coaching request {request_id} failed: {e}");
                CoachOutcome::failure(&e)
            }
        }
    }

    async fn try_run(&self, input: RequestInput) -> Result<CoachOutcome, CoachError> {
        // Step 1: Collect
        let mut jd_text = input
            .jd_text
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if jd_text.is_empty() {
            if let Some(path) = &input.jd_file {
                jd_text = self
                    .read_file_safely(path, InputLabel::JobDescription)
                    .await?;
            }
        }

        let resume_text = match &input.resume_file {
            Some(path) => self.read_file_safely(path, InputLabel::Resume).await?,
            None => String::new(),
        };

        // Step 2: Validate
        if jd_text.trim().is_empty() || resume_text.trim().is_empty() {
            return Err(CoachError::MissingInput);
        }
        self.check_word_count(&jd_text, InputLabel::JobDescription)?;
        self.check_word_count(&resume_text, InputLabel::Resume)?;

        // Step 3: Compose
        let prompt = build_coaching_prompt(
            &jd_text,
            &resume_text,
            &input.domain,
            input.years_of_experience,
        );

        // Step 4: Invoke
        let raw = self.model.complete(&prompt, COACHING_TEMPERATURE).await?;

        // Step 5: Parse
        let feedback = parse_model_output(&raw)?;

        // Step 6: Normalize & render
        let record = normalize(&feedback);
        let rendered = render(&record, chrono::Local::now().date_naive());

        // Step 7: Persist (non-fatal)
        let artifact = artifact::persist(&self.settings.artifact_path, &rendered.markdown).await;

        // Step 8: Respond
        Ok(CoachOutcome {
            display: rendered.display_html,
            download_visible: artifact.is_some(),
            artifact,
        })
    }

    /// Size ceiling first, then extraction. Every failure names the input.
    async fn read_file_safely(&self, path: &Path, label: InputLabel) -> Result<String, CoachError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            warn!("Error reading {label} metadata: {e}");
            CoachError::Read { label }
        })?;

        let size_mb = metadata.len() as f64 / BYTES_PER_MB as f64;
        if size_mb > self.settings.max_file_size_mb {
            return Err(CoachError::FileTooLarge {
                label,
                limit_mb: self.settings.max_file_size_mb,
            });
        }

        match extract_text_blocking(path).await {
            Ok(text) => Ok(text),
            Err(ExtractError::PdfParsing(_)) => Err(CoachError::PdfParse { label }),
            Err(e) => {
                warn!("Error reading {label}: {e}");
                Err(CoachError::Read { label })
            }
        }
    }

    fn check_word_count(&self, text: &str, label: InputLabel) -> Result<(), CoachError> {
        if text.split_whitespace().count() > self.settings.max_words {
            return Err(CoachError::TooManyWords {
                label,
                limit: self.settings.max_words,
            });
        }
        Ok(())
    }
}

/// Strips code fences and parses strictly. Only JSON objects are accepted.
pub fn parse_model_output(raw: &str) -> Result<Value, CoachError> {
    let cleaned = strip_json_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(RAW_LOG_LIMIT).collect();
        warn!("JSON decode failed ({e}). Raw model output:\n{preview}");
        CoachError::InvalidJson
    })?;

    if !value.is_object() {
        warn!("Model returned JSON that is not an object: {value}");
        return Err(CoachError::UnexpectedStructure);
    }

    Ok(value)
}
