//! Polish flow: pick a scenario from the submitted inputs, build the prompt,
//! call the generator, and normalize whatever comes back.

use serde::Serialize;
use tracing::info;

use crate::config::PromptMode;
use crate::errors::AppError;
use crate::llm_client::ResumeGenerator;
use crate::polish::prompts::{
    FREE_TEXT_OUTPUT, FROM_TECH_STACK_TASK, OPTIMIZE_FOR_JD_TASK, OPTIMIZE_TASK, ROLE_INSTRUCTION,
    STRUCTURED_OUTPUT,
};
use crate::resume::model::{RawTextBlock, ResumeDocument, ResumeSource};
use crate::resume::normalize::{resolve_source, strip_code_fences};
use crate::resume::text_format::format_source;

/// Text collected from one submission, after extraction.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub resume_text: String,
    pub jd_text: String,
    pub tech_stack: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario<'a> {
    OptimizeForJd { resume: &'a str, jd: &'a str },
    Optimize { resume: &'a str },
    FromTechStack { tech_stack: &'a str },
}

impl Scenario<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::OptimizeForJd { .. } => "resume_with_jd",
            Scenario::Optimize { .. } => "resume_only",
            Scenario::FromTechStack { .. } => "tech_stack",
        }
    }
}

impl SubmissionInput {
    /// Resume + JD, then resume alone, then tech stack. A job description on
    /// its own is not enough to write a resume.
    pub fn scenario(&self) -> Result<Scenario<'_>, AppError> {
        let resume = self.resume_text.trim();
        let jd = self.jd_text.trim();
        let tech_stack = self.tech_stack.trim();

        match (resume.is_empty(), jd.is_empty(), tech_stack.is_empty()) {
            (false, false, _) => Ok(Scenario::OptimizeForJd { resume, jd }),
            (false, true, _) => Ok(Scenario::Optimize { resume }),
            (true, _, false) => Ok(Scenario::FromTechStack { tech_stack }),
            (true, _, true) => Err(AppError::EmptyInput(
                "Provide a resume (file or text) or a tech stack description".to_string(),
            )),
        }
    }
}

pub fn build_prompt(scenario: &Scenario<'_>, mode: PromptMode) -> String {
    let task = match scenario {
        Scenario::OptimizeForJd { resume, jd } => OPTIMIZE_FOR_JD_TASK
            .replace("{jd_text}", jd)
            .replace("{resume_text}", resume),
        Scenario::Optimize { resume } => OPTIMIZE_TASK.replace("{resume_text}", resume),
        Scenario::FromTechStack { tech_stack } => {
            FROM_TECH_STACK_TASK.replace("{tech_stack}", tech_stack)
        }
    };
    let contract = match mode {
        PromptMode::Structured => STRUCTURED_OUTPUT,
        PromptMode::FreeText => FREE_TEXT_OUTPUT,
    };
    format!("{ROLE_INSTRUCTION}\n\n{task}\n\n{contract}")
}

#[derive(Debug, Serialize)]
pub struct PolishResponse {
    pub mode: &'static str,
    /// Text Formatter output for preview and copy.
    pub text: String,
    /// The structured document, or `null` on the free-text path.
    pub data: Option<ResumeDocument>,
}

impl From<ResumeSource> for PolishResponse {
    fn from(source: ResumeSource) -> Self {
        let text = format_source(&source);
        let mode = source.mode();
        let data = match source {
            ResumeSource::Structured(doc) => Some(doc),
            ResumeSource::FreeText(_) => None,
        };
        PolishResponse { mode, text, data }
    }
}

/// Runs one submission through the generator and the normalizer.
pub async fn polish(
    input: &SubmissionInput,
    generator: &dyn ResumeGenerator,
    mode: PromptMode,
) -> Result<PolishResponse, AppError> {
    let scenario = input.scenario()?;
    let prompt = build_prompt(&scenario, mode);
    info!(
        scenario = scenario.name(),
        prompt_chars = prompt.len(),
        "Sending polish request"
    );

    let raw = generator.generate(&prompt).await?;

    let source = match mode {
        PromptMode::Structured => resolve_source(&raw)?,
        PromptMode::FreeText => ResumeSource::FreeText(RawTextBlock::from_text(
            &strip_code_fences(&raw),
        )),
    };
    info!(
        scenario = scenario.name(),
        mode = source.mode(),
        response_chars = raw.len(),
        "Polish response normalized"
    );

    Ok(source.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::StubGenerator;

    fn input(resume: &str, jd: &str, tech: &str) -> SubmissionInput {
        SubmissionInput {
            resume_text: resume.to_string(),
            jd_text: jd.to_string(),
            tech_stack: tech.to_string(),
        }
    }

    #[test]
    fn test_scenario_detection_order() {
        assert_eq!(input("r", "j", "t").scenario().unwrap().name(), "resume_with_jd");
        assert_eq!(input("r", "  ", "t").scenario().unwrap().name(), "resume_only");
        assert_eq!(input("", "", "rust").scenario().unwrap().name(), "tech_stack");
        assert_eq!(input("", "j", "rust").scenario().unwrap().name(), "tech_stack");
    }

    #[test]
    fn test_missing_input_is_empty_input() {
        assert!(matches!(input("", "", " ").scenario(), Err(AppError::EmptyInput(_))));
        assert!(matches!(input("", "jd only", "").scenario(), Err(AppError::EmptyInput(_))));
    }

    #[test]
    fn test_prompt_carries_inputs_and_contract() {
        let submission = input("My resume", "Rust job", "");
        let scenario = submission.scenario().unwrap();
        let prompt = build_prompt(&scenario, PromptMode::Structured);
        assert!(prompt.contains("My resume"));
        assert!(prompt.contains("Rust job"));
        assert!(prompt.contains("\"graduationDate\""));

        let legacy = build_prompt(&scenario, PromptMode::FreeText);
        assert!(!legacy.contains("\"graduationDate\""));
        assert!(legacy.contains("ALL CAPS"));
    }

    #[tokio::test]
    async fn test_structured_reply_is_normalized_and_formatted() {
        let stub = StubGenerator::replying(
            "Here's your resume:\n```json\n{\"name\":\"Jane Doe\",\"contact\":{\"email\":\"j@x.com\"}}\n```",
        );
        let response = polish(&input("cv", "", ""), &stub, PromptMode::Structured)
            .await
            .unwrap();
        assert_eq!(response.mode, "structured");
        assert_eq!(response.data.unwrap().name.as_deref(), Some("Jane Doe"));
        assert!(response.text.contains("Email: j@x.com"));
        assert!(stub.last_prompt().unwrap().contains("cv"));
    }

    #[tokio::test]
    async fn test_reply_without_json_falls_back_to_free_text() {
        let stub = StubGenerator::replying("JANE DOE\n\nEXPERIENCE\n\n- Built X");
        let response = polish(&input("cv", "", ""), &stub, PromptMode::Structured)
            .await
            .unwrap();
        assert_eq!(response.mode, "free_text");
        assert!(response.data.is_none());
        assert_eq!(response.text, "JANE DOE\n\nEXPERIENCE\n\n- Built X");
    }

    #[tokio::test]
    async fn test_broken_json_is_malformed_response() {
        let stub = StubGenerator::replying("{\"name\": \"A\",,}");
        let err = polish(&input("cv", "", ""), &stub, PromptMode::Structured)
            .await
            .unwrap_err();
        match err {
            AppError::MalformedAiResponse(e) => assert!(e.snippet.len() <= 200),
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_free_text_mode_skips_json_parsing() {
        let stub = StubGenerator::replying("{\"name\": \"A\"}");
        let response = polish(&input("", "", "rust"), &stub, PromptMode::FreeText)
            .await
            .unwrap();
        assert_eq!(response.mode, "free_text");
        assert_eq!(response.text, "{\"name\": \"A\"}");
    }

    #[tokio::test]
    async fn test_generator_failure_is_llm_error() {
        let stub = StubGenerator::failing("upstream down");
        let err = polish(&input("cv", "", ""), &stub, PromptMode::Structured)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_generator() {
        let stub = StubGenerator::replying("{}");
        let err = polish(&input("", "", ""), &stub, PromptMode::Structured)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
        assert!(stub.last_prompt().is_none());
    }
}
