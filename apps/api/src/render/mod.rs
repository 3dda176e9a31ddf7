// Document renderers: paginated PDF and flow DOCX.
// Both walk the same resume::outline::Block list; only typography differs.
// Rendering is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod docx;
pub mod font_metrics;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("DOCX packing failed: {0}")]
    Docx(String),
}

pub use docx::render_docx;
pub use pdf::render_pdf;
