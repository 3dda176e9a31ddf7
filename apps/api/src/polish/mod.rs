// Polish flow: multipart intake, scenario detection, prompt construction,
// the AI Generation Service call and response normalization, plus the
// format/render endpoints that turn a resume into text, PDF or DOCX.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
