//! Flow-document (DOCX) rendering.
//!
//! The outline is first mapped to a flat list of `FlowParagraph`s (the part
//! tests assert on), then packed with `docx-rs`. Calibri throughout, 480-twip
//! page margins, one bullet numbering definition shared by every list item.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Run, RunFonts,
    SpecialIndentType, Start,
};

use crate::render::RenderError;
use crate::resume::classify::Span;
use crate::resume::model::ResumeSource;
use crate::resume::outline::{outline, Block};

const FONT: &str = "Calibri";
const PAGE_MARGIN_TWIPS: i32 = 480;
const BULLET_NUMBERING_ID: usize = 1;

// Sizes are half-points.
const TITLE_SIZE: usize = 36;
const CONTACT_SIZE: usize = 20;
const HEADING_SIZE: usize = 28;
const BODY_SIZE: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStyle {
    Title,
    Contact,
    Heading,
    EntryTitle,
    Body,
    Bullet,
}

impl FlowStyle {
    fn size(self) -> usize {
        match self {
            FlowStyle::Title => TITLE_SIZE,
            FlowStyle::Contact => CONTACT_SIZE,
            FlowStyle::Heading => HEADING_SIZE,
            FlowStyle::EntryTitle | FlowStyle::Body | FlowStyle::Bullet => BODY_SIZE,
        }
    }

    /// (before, after) paragraph spacing in twips.
    fn spacing(self) -> (u32, u32) {
        match self {
            FlowStyle::Title => (0, 200),
            FlowStyle::Contact => (0, 400),
            FlowStyle::Heading => (240, 120),
            FlowStyle::EntryTitle => (120, 100),
            FlowStyle::Body => (0, 200),
            FlowStyle::Bullet => (0, 100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowParagraph {
    pub style: FlowStyle,
    pub spans: Vec<Span>,
}

impl FlowParagraph {
    fn new(style: FlowStyle, spans: Vec<Span>) -> Self {
        Self { style, spans }
    }
}

/// Maps outline blocks to flow paragraphs. The rule under the header has no
/// flow counterpart; the contact paragraph's spacing separates it instead.
pub fn plan(blocks: &[Block]) -> Vec<FlowParagraph> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Name(name) => Some(FlowParagraph::new(
                FlowStyle::Title,
                vec![Span::bold(name.as_str())],
            )),
            Block::Contact(contact) => Some(FlowParagraph::new(
                FlowStyle::Contact,
                vec![Span::plain(contact.as_str())],
            )),
            Block::Rule => None,
            Block::SectionHeading(heading) => Some(FlowParagraph::new(
                FlowStyle::Heading,
                vec![Span::bold(heading.to_uppercase())],
            )),
            Block::EntryTitle(spans) => Some(FlowParagraph::new(
                FlowStyle::EntryTitle,
                spans.iter().map(|s| Span::bold(s.text.as_str())).collect(),
            )),
            Block::Labeled { label, text } => Some(FlowParagraph::new(
                FlowStyle::Body,
                vec![Span::bold(format!("{label}: ")), Span::plain(text.as_str())],
            )),
            Block::Paragraph(spans) => Some(FlowParagraph::new(FlowStyle::Body, spans.clone())),
            Block::Bullet(spans) => Some(FlowParagraph::new(FlowStyle::Bullet, spans.clone())),
        })
        .collect()
}

fn to_paragraph(flow: &FlowParagraph) -> Paragraph {
    let (before, after) = flow.style.spacing();
    let mut paragraph = Paragraph::new().line_spacing(LineSpacing::new().before(before).after(after));

    for span in &flow.spans {
        let mut run = Run::new()
            .add_text(span.text.as_str())
            .size(flow.style.size())
            .fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT));
        if span.bold {
            run = run.bold();
        }
        paragraph = paragraph.add_run(run);
    }

    match flow.style {
        FlowStyle::Title | FlowStyle::Contact => paragraph.align(AlignmentType::Center),
        FlowStyle::Bullet => paragraph.numbering(
            NumberingId::new(BULLET_NUMBERING_ID),
            IndentLevel::new(0),
        ),
        _ => paragraph,
    }
}

fn bullet_numbering() -> AbstractNumbering {
    AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

/// Packs flow paragraphs into DOCX bytes.
pub fn pack(paragraphs: &[FlowParagraph]) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new()
        .page_margin(
            PageMargin::new()
                .top(PAGE_MARGIN_TWIPS)
                .bottom(PAGE_MARGIN_TWIPS)
                .left(PAGE_MARGIN_TWIPS)
                .right(PAGE_MARGIN_TWIPS),
        )
        .add_abstract_numbering(bullet_numbering())
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for flow in paragraphs {
        docx = docx.add_paragraph(to_paragraph(flow));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| RenderError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Renders a resume source to DOCX bytes.
pub fn render_docx(source: &ResumeSource) -> Result<Vec<u8>, RenderError> {
    let paragraphs = plan(&outline(source));
    let bytes = pack(&paragraphs)?;
    tracing::debug!(
        mode = source.mode(),
        paragraphs = paragraphs.len(),
        bytes = bytes.len(),
        "Rendered DOCX"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::model::RawTextBlock;
    use crate::resume::normalize::coerce_document;
    use crate::resume::outline::{EDUCATION, EXPERIENCE, PROJECTS, SKILLS};
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};
    use serde_json::json;

    fn jane() -> ResumeSource {
        ResumeSource::Structured(coerce_document(&json!({
            "name": "Jane Doe",
            "contact": {"email": "j@x.com"},
            "skills": {"tools": ["Git"], "languages": ["Go"]},
            "experience": [{"title": "Engineer", "company": "Acme", "description": ["Built **X**"]}]
        })))
    }

    /// Paragraph texts read back from packed DOCX bytes.
    fn read_back(bytes: &[u8]) -> Vec<String> {
        let docx = docx_rs::read_docx(bytes).expect("generated DOCX parses");
        docx.document
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
                            RunChild::Text(t) => Some(t.text.clone()),
                            _ => None,
                        })
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_docx_text_order() {
        let texts = read_back(&render_docx(&jane()).unwrap());
        assert_eq!(
            texts,
            vec![
                "Jane Doe",
                "j@x.com",
                SKILLS,
                "Tools: Git",
                "Languages: Go",
                EXPERIENCE,
                "Engineer | Acme",
                "Built X",
            ]
        );
    }

    #[test]
    fn test_absent_sections_have_no_heading() {
        let texts = read_back(&render_docx(&jane()).unwrap());
        assert!(!texts.iter().any(|t| t == PROJECTS || t == EDUCATION));
    }

    #[test]
    fn test_plan_styles_and_inline_bold() {
        let paragraphs = plan(&outline(&jane()));
        let bullet = paragraphs
            .iter()
            .find(|p| p.style == FlowStyle::Bullet)
            .expect("bullet paragraph");
        assert_eq!(bullet.spans, vec![Span::plain("Built "), Span::bold("X")]);
        assert_eq!(paragraphs[0].style, FlowStyle::Title);
        assert_eq!(paragraphs[1].style, FlowStyle::Contact);
        assert_eq!(paragraphs[2].style, FlowStyle::Heading);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let blocks = outline(&jane());
        assert_eq!(plan(&blocks), plan(&blocks));
    }

    #[test]
    fn test_free_text_matches_pdf_structure() {
        let source = ResumeSource::FreeText(RawTextBlock::from_text(
            "Jane Doe\nj@x.com\n\nEXPERIENCE:\n\n- Built X\n- Shipped Y\n\nGraduated with honors",
        ));
        let styles: Vec<FlowStyle> = plan(&outline(&source)).iter().map(|p| p.style).collect();
        assert_eq!(
            styles,
            vec![
                FlowStyle::Title,
                FlowStyle::Contact,
                FlowStyle::Heading,
                FlowStyle::Bullet,
                FlowStyle::Bullet,
                FlowStyle::Body,
            ]
        );
        let texts = read_back(&render_docx(&source).unwrap());
        assert_eq!(texts[2], "EXPERIENCE");
        assert_eq!(texts[3], "Built X");
    }

    #[test]
    fn test_empty_source_packs() {
        let bytes = render_docx(&ResumeSource::Structured(Default::default())).unwrap();
        assert!(read_back(&bytes).is_empty());
    }
}
