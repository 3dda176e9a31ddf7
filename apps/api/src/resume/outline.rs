//! Renderer-agnostic document outline.
//!
//! Both the PDF and DOCX renderers walk the same `Block` list, so section
//! order, content selection, and heading/bullet decisions are made here once.
//! Renderers only decide typography.

use crate::resume::classify::{classify_block, parse_inline, Classified, EntryLine, Span};
use crate::resume::model::{join_present, non_empty, ResumeDocument, ResumeSource};

pub const SUMMARY: &str = "SUMMARY";
pub const SKILLS: &str = "TECHNICAL SKILLS";
pub const EXPERIENCE: &str = "PROFESSIONAL EXPERIENCE";
pub const EDUCATION: &str = "EDUCATION";
pub const PROJECTS: &str = "PROJECTS";
pub const ACHIEVEMENTS: &str = "ACHIEVEMENTS";
pub const HOBBIES: &str = "HOBBIES";
pub const LANGUAGES: &str = "LANGUAGES";

/// Separator between joined parts of a contact or entry title line.
pub const PIPE: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Large centered bold name.
    Name(String),
    /// Smaller centered contact line.
    Contact(String),
    /// Horizontal rule under the header.
    Rule,
    SectionHeading(String),
    /// Bold single line, e.g. `title | company | dates` or a project name.
    EntryTitle(Vec<Span>),
    /// `Label: text` with a bold label (skill categories).
    Labeled { label: String, text: String },
    Paragraph(Vec<Span>),
    Bullet(Vec<Span>),
}

pub fn outline(source: &ResumeSource) -> Vec<Block> {
    match source {
        ResumeSource::Structured(doc) => outline_document(doc),
        ResumeSource::FreeText(block) => classify_block(block)
            .into_iter()
            .flat_map(outline_classified)
            .collect(),
    }
}

/// Upper-cases the first character: `languages` → `Languages`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn bullets<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<Block> {
    items
        .into_iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(|i| Block::Bullet(parse_inline(i)))
        .collect()
}

fn section(out: &mut Vec<Block>, heading: &str, body: Vec<Block>) {
    if body.is_empty() {
        return;
    }
    out.push(Block::SectionHeading(heading.to_string()));
    out.extend(body);
}

fn outline_document(doc: &ResumeDocument) -> Vec<Block> {
    let mut out = Vec::new();

    let name = non_empty(&doc.name);
    if let Some(name) = name {
        out.push(Block::Name(name.to_string()));
    }
    let contact: Vec<&str> = doc.contact.fields().into_iter().map(|(_, v)| v).collect();
    if !contact.is_empty() {
        out.push(Block::Contact(contact.join(PIPE)));
    }
    if name.is_some() || !contact.is_empty() {
        out.push(Block::Rule);
    }

    section(
        &mut out,
        SUMMARY,
        non_empty(&doc.summary)
            .map(|s| vec![Block::Paragraph(parse_inline(s))])
            .unwrap_or_default(),
    );

    section(
        &mut out,
        SKILLS,
        doc.skills
            .non_empty()
            .map(|c| Block::Labeled {
                label: capitalize(&c.name),
                text: c
                    .items
                    .iter()
                    .map(|i| i.trim())
                    .filter(|i| !i.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect(),
    );

    let mut experience = Vec::new();
    for job in &doc.experience {
        let title = join_present(&[&job.title, &job.company, &job.dates], PIPE);
        if !title.is_empty() {
            experience.push(Block::EntryTitle(vec![Span::bold(title)]));
        }
        experience.extend(bullets(&job.description));
    }
    section(&mut out, EXPERIENCE, experience);

    section(
        &mut out,
        EDUCATION,
        doc.education
            .iter()
            .map(|e| join_present(&[&e.degree, &e.university, &e.graduation_date], PIPE))
            .filter(|line| !line.is_empty())
            .map(|line| Block::Paragraph(vec![Span::plain(line)]))
            .collect(),
    );

    let mut projects = Vec::new();
    for project in &doc.projects {
        if let Some(name) = non_empty(&project.name) {
            projects.push(Block::EntryTitle(vec![Span::bold(name)]));
        }
        if let Some(description) = non_empty(&project.description) {
            projects.push(Block::Bullet(parse_inline(description)));
        }
    }
    section(&mut out, PROJECTS, projects);

    section(&mut out, ACHIEVEMENTS, bullets(&doc.achievements));
    section(&mut out, HOBBIES, bullets(&doc.hobbies));
    section(&mut out, LANGUAGES, bullets(&doc.languages));

    out
}

fn outline_classified(classified: Classified) -> Vec<Block> {
    match classified {
        Classified::NameContact { name, contact } => vec![
            Block::Name(name),
            Block::Contact(contact.join(PIPE)),
        ],
        Classified::Heading(text) => vec![Block::SectionHeading(text)],
        Classified::BulletList(items) => items
            .iter()
            .map(|i| Block::Bullet(parse_inline(i)))
            .collect(),
        Classified::Entry { title, lines } => {
            let mut blocks = vec![Block::EntryTitle(
                parse_inline(&title)
                    .into_iter()
                    .map(|s| Span::bold(s.text))
                    .collect(),
            )];
            blocks.extend(lines.into_iter().map(|line| match line {
                EntryLine::Bullet(text) => Block::Bullet(parse_inline(&text)),
                EntryLine::Paragraph(text) => Block::Paragraph(parse_inline(&text)),
            }));
            blocks
        }
        Classified::Paragraphs(lines) => lines
            .iter()
            .map(|l| Block::Paragraph(parse_inline(l)))
            .collect(),
    }
}
