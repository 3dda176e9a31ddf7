//! Plain-text extraction from uploaded PDF, DOCX and text files.
//!
//! Extraction never fails outward: any parse error (or a panic inside
//! `pdf_extract`, which it does on some malformed files) is logged and turned
//! into an empty string. Callers treat `""` as "no usable content".

use std::panic::{self, AssertUnwindSafe};

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space run pattern is valid"));

static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("PDF extraction panicked on malformed input")]
    PdfPanic,
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Text,
}

impl FileKind {
    /// Dispatches on the case-insensitive extension; unknown means text.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => FileKind::Pdf,
            "docx" => FileKind::Docx,
            _ => FileKind::Text,
        }
    }
}

/// Extracts cleaned plain text from `data`. Returns `""` on any failure.
pub fn extract_text(data: &[u8], filename: &str) -> String {
    let kind = FileKind::from_filename(filename);
    let raw = match kind {
        FileKind::Pdf => extract_pdf(data),
        FileKind::Docx => extract_docx(data),
        FileKind::Text => Ok(String::from_utf8_lossy(data).into_owned()),
    };

    match raw {
        Ok(text) => {
            let cleaned = clean_text(&text);
            tracing::debug!(filename, ?kind, chars = cleaned.len(), "Extracted text");
            cleaned
        }
        Err(e) => {
            tracing::warn!(filename, ?kind, error = %e, "Text extraction failed");
            String::new()
        }
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => Err(ExtractionError::PdfPanic),
    }
}

/// Raw paragraph text, one paragraph per line. Formatting is discarded.
fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(
                p.children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(run),
                        _ => None,
                    })
                    .flat_map(|run| run.children.iter())
                    .filter_map(|rc| match rc {
                        RunChild::Text(t) => Some(t.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Keeps printable ASCII plus newlines, collapses space runs, trims every
/// line and the whole text. Blank-line paragraph breaks survive (at most one
/// blank line in a row).
pub fn clean_text(raw: &str) -> String {
    let printable: String = raw
        .replace("\r\n", "\n")
        .chars()
        .map(|c| if c == '\t' || c == '\r' { ' ' } else { c })
        .filter(|c| *c == '\n' || (' '..='~').contains(c))
        .collect();
    let collapsed = SPACE_RUN.replace_all(&printable, " ");
    let trimmed_lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUN
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}
