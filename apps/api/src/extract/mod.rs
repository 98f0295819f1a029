//! Document Text Extractor — turns an uploaded file into plain text.
//!
//! Dispatch is by file extension: `.pdf` → pdf-extract, `.docx` → docx-rs,
//! anything else is read as UTF-8. Parsing is blocking; async callers go
//! through `extract_text_blocking`.

use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;
use tracing::warn;

/// Failure conditions of extraction. `PdfParsing` is the distinguished
/// sentinel for an unreadable PDF; the caller matches on it instead of
/// treating it as a generic read failure.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parsing error: {0}")]
    PdfParsing(String),

    #[error("DOCX parsing error: {0}")]
    Docx(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Declared document kind, resolved from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

/// Extracts text from `path`. `None` (no file supplied) yields empty text.
pub fn extract_text(path: Option<&Path>) -> Result<String, ExtractError> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    if path.as_os_str().is_empty() {
        return Ok(String::new());
    }

    match DocumentKind::from_path(path) {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Docx => extract_docx(path),
        DocumentKind::PlainText => Ok(std::fs::read_to_string(path)?),
    }
}

/// Runs `extract_text` on the blocking pool.
pub async fn extract_text_blocking(path: &Path) -> Result<String, ExtractError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text(Some(&path)))
        .await
        .map_err(|e| ExtractError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Page text is concatenated in page order; pages without a text layer add
/// nothing. pdf-extract can panic on malformed input, so panics are folded
/// into the `PdfParsing` sentinel along with ordinary errors.
fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let owned = path.to_path_buf();
    let outcome = std::panic::catch_unwind(move || pdf_extract::extract_text(&owned));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            warn!("PDF parsing error in '{}': {e:?}", path.display());
            Err(ExtractError::PdfParsing(format!("{e:?}")))
        }
        Err(_) => {
            warn!("PDF parser panicked on '{}'", path.display());
            Err(ExtractError::PdfParsing("parser panicked".to_string()))
        }
    }
}

/// One line per paragraph, in document order. Empty paragraphs stay as
/// empty lines.
fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let docx =
        docx_rs::read_docx(&bytes).map_err(|e| ExtractError::Docx(format!("{e:?}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}
