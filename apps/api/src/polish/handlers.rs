//! Axum route handlers for extraction, polishing, formatting and rendering.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::polish::pipeline::{polish, PolishResponse, SubmissionInput};
use crate::render::{render_docx, render_pdf};
use crate::resume::extract::extract_text;
use crate::resume::model::{RawTextBlock, ResumeSource};
use crate::resume::text_format::format_value;
use crate::state::AppState;

pub const PDF_FILENAME: &str = "optimized_resume.pdf";
pub const DOCX_FILENAME: &str = "resume.docx";
const PDF_CONTENT_TYPE: &str = "application/pdf";
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub text: String,
    pub chars: usize,
}

/// Body for `/format` and `/render/*`: a JSON value (usually the resume
/// object) or raw free text.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub data: Option<Value>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub text: String,
}

impl RenderRequest {
    fn into_source(self) -> Result<ResumeSource, AppError> {
        match (self.data, self.text) {
            (Some(data), _) if !data.is_null() => Ok(ResumeSource::from_value(&data)),
            (_, Some(text)) => {
                let block = RawTextBlock::from_text(&text);
                if block.is_empty() {
                    return Err(AppError::Validation("'text' is empty".to_string()));
                }
                Ok(ResumeSource::FreeText(block))
            }
            _ => Err(AppError::Validation(
                "Request body must contain 'data' or 'text'".to_string(),
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

/// Reads an upload field and extracts its text off the async executor.
async fn extract_field(field: Field<'_>) -> Result<(String, String), AppError> {
    let filename = field.file_name().unwrap_or("upload.txt").to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &name))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))?;

    Ok((filename, text))
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/extract
///
/// Multipart with a single `file` field. Returns the cleaned plain text.
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let (filename, text) = extract_field(field).await?;
        if text.is_empty() {
            return Err(AppError::EmptyInput(format!(
                "No readable text could be extracted from '{filename}'"
            )));
        }
        info!(filename = %filename, chars = text.len(), "File extracted");
        return Ok(Json(ExtractResponse {
            chars: text.chars().count(),
            filename,
            text,
        }));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}

/// POST /api/v1/polish
///
/// Multipart fields: `resume` (file) or `resumeText`, `jd` (file) or
/// `jobDescriptionText`, and `techStack`. An uploaded file wins over pasted
/// text when both yield content.
pub async fn handle_polish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PolishResponse>, AppError> {
    let mut resume_file = String::new();
    let mut resume_pasted = String::new();
    let mut jd_file = String::new();
    let mut jd_pasted = String::new();
    let mut tech_stack = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => resume_file = extract_field(field).await?.1,
            "jd" => jd_file = extract_field(field).await?.1,
            "resumeText" => resume_pasted = field.text().await.map_err(multipart_error)?,
            "jobDescriptionText" => jd_pasted = field.text().await.map_err(multipart_error)?,
            "techStack" => tech_stack = field.text().await.map_err(multipart_error)?,
            _ => {}
        }
    }

    let pick = |file: String, pasted: String| if file.trim().is_empty() { pasted } else { file };
    let input = SubmissionInput {
        resume_text: pick(resume_file, resume_pasted),
        jd_text: pick(jd_file, jd_pasted),
        tech_stack,
    };

    let response = polish(&input, state.generator.as_ref(), state.config.prompt_mode).await?;
    Ok(Json(response))
}

/// POST /api/v1/format
pub async fn handle_format(
    Json(request): Json<RenderRequest>,
) -> Result<Json<FormatResponse>, AppError> {
    let text = match (request.data, request.text) {
        (Some(data), _) if !data.is_null() => format_value(&data),
        (_, Some(text)) => text,
        _ => {
            return Err(AppError::Validation(
                "Request body must contain 'data' or 'text'".to_string(),
            ))
        }
    };
    Ok(Json(FormatResponse { text }))
}

/// POST /api/v1/render/pdf
pub async fn handle_render_pdf(Json(request): Json<RenderRequest>) -> Result<Response, AppError> {
    let source = request.into_source()?;
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&source))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF render: {e}")))??;
    Ok(attachment(bytes, PDF_CONTENT_TYPE, PDF_FILENAME))
}

/// POST /api/v1/render/docx
pub async fn handle_render_docx(Json(request): Json<RenderRequest>) -> Result<Response, AppError> {
    let source = request.into_source()?;
    let bytes = tokio::task::spawn_blocking(move || render_docx(&source))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in DOCX render: {e}")))??;
    Ok(attachment(bytes, DOCX_CONTENT_TYPE, DOCX_FILENAME))
}
