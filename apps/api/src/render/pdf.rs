//! Paginated A4 rendering.
//!
//! Two phases: `layout_pages` places every outline block onto fixed-size
//! pages (pure, testable geometry), then `encode` serializes the pages with
//! `lopdf` using the Helvetica base fonts. No timestamps or random IDs are
//! written, so identical input produces byte-identical output.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::render::font_metrics::{runs_width, wrap_runs, Font, TextRun};
use crate::render::RenderError;
use crate::resume::classify::Span;
use crate::resume::model::ResumeSource;
use crate::resume::outline::{outline, Block};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN_X: f32 = 35.0;
pub const MARGIN_Y: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const LINE_HEIGHT: f32 = 1.3;

const NAME_SIZE: f32 = 18.0;
const CONTACT_SIZE: f32 = 9.5;
const HEADER_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.5;
const BULLET_GLYPH_SIZE: f32 = 10.0;

/// Bullet glyph offset from the left margin.
pub const BULLET_INDENT: f32 = 12.0;
/// Bullet text offset from the left margin.
pub const BULLET_TEXT_INDENT: f32 = 22.0;

const RULE_WIDTH: f32 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Layout model
// ────────────────────────────────────────────────────────────────────────────

/// Something drawn on a page. Coordinates are PDF user space (origin at the
/// bottom-left corner); `y` of a text mark is its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        x: f32,
        y: f32,
        size: f32,
        runs: Vec<TextRun>,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub marks: Vec<Mark>,
}

#[derive(Clone, Copy)]
enum Align {
    Left(f32),
    Center,
}

/// Top-down cursor over a growing list of pages.
struct Layout {
    pages: Vec<Page>,
    page: Page,
    /// Distance from the top edge of the current page.
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            page: Page::default(),
            cursor: MARGIN_Y,
        }
    }

    /// Vertical gap. Dropped at the top of a page.
    fn space(&mut self, pts: f32) {
        if self.cursor > MARGIN_Y {
            self.cursor += pts;
        }
    }

    /// Starts a new page if `height` does not fit on the current one.
    fn ensure(&mut self, height: f32) {
        if self.cursor + height > PAGE_HEIGHT - MARGIN_Y && !self.page.marks.is_empty() {
            self.pages.push(std::mem::take(&mut self.page));
            self.cursor = MARGIN_Y;
        }
    }

    /// Reserves one line box and returns its baseline.
    fn line(&mut self, size: f32) -> f32 {
        let height = size * LINE_HEIGHT;
        self.ensure(height);
        let baseline = PAGE_HEIGHT - self.cursor - size;
        self.cursor += height;
        baseline
    }

    fn text(&mut self, runs: &[TextRun], size: f32, align: Align) {
        let width = match align {
            Align::Left(indent) => CONTENT_WIDTH - indent,
            Align::Center => CONTENT_WIDTH,
        };
        for line in wrap_runs(runs, size, width) {
            let y = self.line(size);
            let x = match align {
                Align::Left(indent) => MARGIN_X + indent,
                Align::Center => (PAGE_WIDTH - runs_width(&line, size)) / 2.0,
            };
            self.page.marks.push(Mark::Text {
                x,
                y,
                size,
                runs: line,
            });
        }
    }

    fn bullet(&mut self, runs: &[TextRun]) {
        let lines = wrap_runs(runs, BODY_SIZE, CONTENT_WIDTH - BULLET_TEXT_INDENT);
        for (i, line) in lines.into_iter().enumerate() {
            let y = self.line(BODY_SIZE);
            if i == 0 {
                self.page.marks.push(Mark::Text {
                    x: MARGIN_X + BULLET_INDENT,
                    y,
                    size: BULLET_GLYPH_SIZE,
                    runs: vec![TextRun::new("•", Font::Regular)],
                });
            }
            self.page.marks.push(Mark::Text {
                x: MARGIN_X + BULLET_TEXT_INDENT,
                y,
                size: BODY_SIZE,
                runs: line,
            });
        }
    }

    fn rule(&mut self) {
        self.ensure(RULE_WIDTH);
        let y = PAGE_HEIGHT - self.cursor;
        self.page.marks.push(Mark::Rule {
            x1: MARGIN_X,
            x2: PAGE_WIDTH - MARGIN_X,
            y,
        });
        self.cursor += RULE_WIDTH;
    }

    /// Always yields at least one (possibly blank) page.
    fn finish(mut self) -> Vec<Page> {
        if !self.page.marks.is_empty() || self.pages.is_empty() {
            self.pages.push(self.page);
        }
        self.pages
    }
}

fn to_runs(spans: &[Span]) -> Vec<TextRun> {
    spans
        .iter()
        .map(|s| TextRun::new(s.text.as_str(), if s.bold { Font::Bold } else { Font::Regular }))
        .collect()
}

/// Places outline blocks onto A4 pages, continuing on a new page whenever
/// the next line would cross the bottom margin.
pub fn layout_pages(blocks: &[Block]) -> Vec<Page> {
    let mut layout = Layout::new();

    for block in blocks {
        match block {
            Block::Name(name) => {
                layout.text(&[TextRun::new(name.as_str(), Font::Bold)], NAME_SIZE, Align::Center);
                layout.space(4.0);
            }
            Block::Contact(contact) => {
                layout.text(
                    &[TextRun::new(contact.as_str(), Font::Regular)],
                    CONTACT_SIZE,
                    Align::Center,
                );
                layout.space(2.0);
            }
            Block::Rule => {
                layout.space(6.0);
                layout.rule();
                layout.space(6.0);
            }
            Block::SectionHeading(heading) => {
                layout.space(12.0);
                layout.text(
                    &[TextRun::new(heading.to_uppercase(), Font::Bold)],
                    HEADER_SIZE,
                    Align::Left(0.0),
                );
                layout.space(4.0);
            }
            Block::EntryTitle(spans) => {
                layout.text(&to_runs(spans), BODY_SIZE, Align::Left(0.0));
                layout.space(2.0);
            }
            Block::Labeled { label, text } => {
                let runs = [
                    TextRun::new(format!("{label}: "), Font::Bold),
                    TextRun::new(text.as_str(), Font::Regular),
                ];
                layout.text(&runs, BODY_SIZE, Align::Left(0.0));
                layout.space(3.0);
            }
            Block::Paragraph(spans) => {
                layout.text(&to_runs(spans), BODY_SIZE, Align::Left(0.0));
                layout.space(3.0);
            }
            Block::Bullet(spans) => {
                layout.bullet(&to_runs(spans));
                layout.space(2.0);
            }
        }
    }

    layout.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps text onto WinAnsiEncoding bytes. Characters outside the code page
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for mark in &page.marks {
        match mark {
            Mark::Text { x, y, size, runs } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Td", vec![real(*x), real(*y)]));
                for run in runs {
                    ops.push(Operation::new(
                        "Tf",
                        vec![
                            Object::Name(run.font.resource_name().as_bytes().to_vec()),
                            real(*size),
                        ],
                    ));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(win_ansi(&run.text), StringFormat::Literal)],
                    ));
                }
                ops.push(Operation::new("ET", vec![]));
            }
            Mark::Rule { x1, x2, y } => {
                ops.push(Operation::new("w", vec![real(RULE_WIDTH)]));
                ops.push(Operation::new("m", vec![real(*x1), real(*y)]));
                ops.push(Operation::new("l", vec![real(*x2), real(*y)]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

fn font_object(doc: &mut Document, font: Font) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Serializes laid-out pages into PDF bytes.
pub fn encode(pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = font_object(&mut doc, Font::Regular);
    let bold_id = font_object(&mut doc, Font::Bold);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let bytes = content
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH),
                real(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Optimized Resume"),
        "Producer" => Object::string_literal("polish-api"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(out)
}

/// Renders a resume source to PDF bytes.
pub fn render_pdf(source: &ResumeSource) -> Result<Vec<u8>, RenderError> {
    let blocks = outline(source);
    let pages = layout_pages(&blocks);
    let bytes = encode(&pages)?;
    tracing::debug!(
        mode = source.mode(),
        blocks = blocks.len(),
        pages = pages.len(),
        bytes = bytes.len(),
        "Rendered PDF"
    );
    Ok(bytes)
}
