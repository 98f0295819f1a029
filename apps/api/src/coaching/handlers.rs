//! Axum route handlers for the Coaching API.

use std::path::{Path, PathBuf};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::coaching::artifact::DOWNLOAD_ROUTE;
use crate::coaching::orchestrator::{CoachError, CoachOutcome, RequestInput};
use crate::errors::AppError;
use crate::state::AppState;

/// Bounds of the years-of-experience field on the form.
const MAX_YEARS_OF_EXPERIENCE: f64 = 50.0;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
pub struct CoachResponse {
    /// Rendered feedback HTML, or a short error line.
    pub display: String,
    pub download_url: Option<String>,
    pub download_visible: bool,
}

impl From<CoachOutcome> for CoachResponse {
    fn from(outcome: CoachOutcome) -> Self {
        Self {
            display: outcome.display,
            download_url: outcome.artifact.map(|_| DOWNLOAD_ROUTE.to_string()),
            download_visible: outcome.download_visible,
        }
    }
}

/// A prefilled form offered on the page.
#[derive(Debug, Clone, Serialize)]
pub struct ExampleInput {
    pub jd_text: &'static str,
    pub domain: &'static str,
    pub years_experience: u32,
}

pub const EXAMPLES: &[ExampleInput] = &[
    ExampleInput {
        jd_text: "Product Manager for FinTech role requiring A/B testing and Agile.",
        domain: "Product Management",
        years_experience: 2,
    },
    ExampleInput {
        jd_text: "Senior Software Engineer, Python/Django, 5+ years, requiring AWS and CI/CD.",
        domain: "Software Engineering",
        years_experience: 5,
    },
    ExampleInput {
        jd_text: "Marketing Analyst focusing on SEO performance and Google Analytics reporting.",
        domain: "Digital Marketing",
        years_experience: 3,
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/examples
pub async fn handle_examples() -> Json<&'static [ExampleInput]> {
    Json(EXAMPLES)
}

/// POST /api/v1/coach
///
/// Multipart fields: `jd_text`, `jd_file`, `resume_file`, `domain`,
/// `years_experience`. Coaching failures come back as a 200 with the error
/// line in `display`; only malformed uploads are HTTP errors.
pub async fn handle_coach(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CoachResponse>, AppError> {
    let Ok(_permit) = state.permits.clone().try_acquire_owned() else {
        info!("Coaching request turned away: queue full");
        return Ok(Json(CoachOutcome::failure(&CoachError::Busy).into()));
    };

    // Uploads live only as long as this request.
    let upload_dir = tempfile::tempdir()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;

    let mut input = RequestInput::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return upload_rejected(&state, e),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return upload_rejected(&state, e),
        };

        match name.as_str() {
            "jd_text" => input.jd_text = Some(String::from_utf8_lossy(&data).into_owned()),
            "domain" => input.domain = String::from_utf8_lossy(&data).trim().to_string(),
            "years_experience" => {
                input.years_of_experience = parse_years(&String::from_utf8_lossy(&data))
            }
            "jd_file" => {
                input.jd_file =
                    save_upload(upload_dir.path(), "jd", file_name.as_deref(), data).await?
            }
            "resume_file" => {
                input.resume_file =
                    save_upload(upload_dir.path(), "resume", file_name.as_deref(), data).await?
            }
            _ => {}
        }
    }

    let outcome = state.coach.clone().run_isolated(input).await;
    Ok(Json(outcome.into()))
}

/// A body over the router's limit is reported like an oversized file; any
/// other multipart failure is a 400.
fn upload_rejected(
    state: &AppState,
    err: MultipartError,
) -> Result<Json<CoachResponse>, AppError> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        info!("Coaching request rejected: body over upload limit");
        let limit_mb = state.config.max_file_size_mb;
        return Ok(Json(
            CoachOutcome::failure(&CoachError::UploadTooLarge { limit_mb }).into(),
        ));
    }
    Err(AppError::Validation(format!("Invalid upload: {}", err.body_text())))
}

/// Writes one uploaded file under `dir`, keeping only its extension so the
/// extractor can dispatch on it. An empty part means no file was chosen.
async fn save_upload(
    dir: &Path,
    stem: &str,
    file_name: Option<&str>,
    data: Bytes,
) -> Result<Option<PathBuf>, AppError> {
    if data.is_empty() && file_name.map_or(true, str::is_empty) {
        return Ok(None);
    }

    let path = dir.join(match file_name.and_then(safe_extension) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    });

    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {e}")))?;

    Ok(Some(path))
}

fn safe_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}

/// Blank or garbage is 0; the rest is clamped to the form's bounds.
fn parse_years(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.clamp(0.0, MAX_YEARS_OF_EXPERIENCE),
        _ => 0.0,
    }
}
