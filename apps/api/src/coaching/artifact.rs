//! Feedback artifact — the Markdown report behind the download button.
//!
//! One fixed path, overwritten by every successful request. Concurrent
//! requests race on it and the last writer wins.

use std::path::{Path, PathBuf};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;

/// Download name offered to the browser.
pub const DOWNLOAD_FILE_NAME: &str = "career_buddy_feedback.md";
/// Route serving the current artifact.
pub const DOWNLOAD_ROUTE: &str = "/api/v1/feedback/download";

/// Writes the report. Returns the path on success, `None` when the write
/// failed; the failure is logged and otherwise swallowed.
pub async fn persist(path: &Path, markdown: &str) -> Option<PathBuf> {
    match tokio::fs::write(path, markdown).await {
        Ok(()) => {
            info!("Feedback artifact written to {}", path.display());
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!("Failed to write markdown file {}: {e}", path.display());
            None
        }
    }
}

/// GET /api/v1/feedback/download
///
/// Serves whatever report the most recent successful request left behind.
pub async fn handle_download(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = &state.config.artifact_path;
    let markdown = match tokio::fs::read_to_string(path).await {
        Ok(markdown) => markdown,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(
                "No feedback has been generated yet".to_string(),
            ))
        }
        Err(e) => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Failed to read feedback artifact {}: {e}",
                path.display()
            )))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        markdown,
    )
        .into_response())
}
