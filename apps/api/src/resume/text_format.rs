//! Flat-text rendering for on-screen preview and clipboard copy.

use serde_json::Value;

use crate::resume::model::{non_empty, ResumeDocument, ResumeSource};
use crate::resume::normalize::coerce_document;
use crate::resume::outline::capitalize;

const BULLET: &str = "•";

/// Formats any JSON value the way the preview expects.
///
/// Strings pass through unchanged, objects are coerced into the canonical
/// model, every other value comes back as indented JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => format_document(&coerce_document(value)),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

pub fn format_source(source: &ResumeSource) -> String {
    match source {
        ResumeSource::Structured(doc) => format_document(doc),
        ResumeSource::FreeText(block) => block.to_text(),
    }
}

/// Renders the document as sections separated by one blank line.
pub fn format_document(doc: &ResumeDocument) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(name) = non_empty(&doc.name) {
        sections.push(format!("{name}\n{}", "=".repeat(name.chars().count())));
    }

    let contact: Vec<String> = doc
        .contact
        .fields()
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    push_section(&mut sections, "CONTACT INFORMATION", contact);

    push_section(
        &mut sections,
        "PROFESSIONAL SUMMARY",
        non_empty(&doc.summary).map(str::to_string).into_iter().collect(),
    );

    let skills = doc
        .skills
        .non_empty()
        .map(|c| format!("{}: {}", capitalize(&c.name), joined(&c.items, ", ")))
        .collect();
    push_section(&mut sections, "SKILLS", skills);

    push_section(&mut sections, "PROFESSIONAL EXPERIENCE", experience_lines(doc));
    push_section(&mut sections, "EDUCATION", education_lines(doc));
    push_section(&mut sections, "PROJECTS", project_lines(doc));

    let achievements = present(&doc.achievements)
        .map(|a| format!("{BULLET} {a}"))
        .collect();
    push_section(&mut sections, "ACHIEVEMENTS", achievements);

    push_section(&mut sections, "HOBBIES & INTERESTS", comma_line(&doc.hobbies));
    push_section(&mut sections, "LANGUAGES", comma_line(&doc.languages));

    sections.join("\n\n").trim().to_string()
}

/// Appends `LABEL`, a dashed underline of the same width, and the body.
/// Nothing is appended for an empty body.
fn push_section(sections: &mut Vec<String>, label: &str, body: Vec<String>) {
    if body.is_empty() {
        return;
    }
    let mut out = format!("{label}\n{}\n", "-".repeat(label.chars().count()));
    out.push_str(&body.join("\n"));
    sections.push(out.trim_end().to_string());
}

fn present(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|i| i.trim()).filter(|i| !i.is_empty())
}

fn joined(items: &[String], sep: &str) -> String {
    present(items).collect::<Vec<_>>().join(sep)
}

fn comma_line(items: &[String]) -> Vec<String> {
    let line = joined(items, ", ");
    if line.is_empty() {
        vec![]
    } else {
        vec![line]
    }
}

/// `N. title at company (dates)` then one `   • item` per description line.
/// Entries are separated by a blank line.
fn experience_lines(doc: &ResumeDocument) -> Vec<String> {
    let mut lines = Vec::new();
    let mut n = 0;
    for job in &doc.experience {
        let mut heading = String::new();
        if let Some(title) = non_empty(&job.title) {
            heading.push_str(title);
        }
        if let Some(company) = non_empty(&job.company) {
            if !heading.is_empty() {
                heading.push_str(" at ");
            }
            heading.push_str(company);
        }
        if let Some(dates) = non_empty(&job.dates) {
            if !heading.is_empty() {
                heading.push(' ');
            }
            heading.push_str(&format!("({dates})"));
        }
        let details: Vec<&str> = present(&job.description).collect();
        if heading.is_empty() && details.is_empty() {
            continue;
        }

        n += 1;
        if n > 1 {
            lines.push(String::new());
        }
        lines.push(format!("{n}. {heading}").trim_end().to_string());
        lines.extend(details.into_iter().map(|d| format!("   {BULLET} {d}")));
    }
    lines
}

/// `N. degree - university (date)`.
fn education_lines(doc: &ResumeDocument) -> Vec<String> {
    doc.education
        .iter()
        .filter_map(|e| {
            let mut line = String::new();
            if let Some(degree) = non_empty(&e.degree) {
                line.push_str(degree);
            }
            if let Some(university) = non_empty(&e.university) {
                if !line.is_empty() {
                    line.push_str(" - ");
                }
                line.push_str(university);
            }
            if let Some(date) = non_empty(&e.graduation_date) {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&format!("({date})"));
            }
            (!line.is_empty()).then_some(line)
        })
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect()
}

/// `N. name` with the description indented beneath it.
fn project_lines(doc: &ResumeDocument) -> Vec<String> {
    let mut lines = Vec::new();
    let mut n = 0;
    for project in &doc.projects {
        let name = non_empty(&project.name);
        let description = non_empty(&project.description);
        if name.is_none() && description.is_none() {
            continue;
        }

        n += 1;
        if n > 1 {
            lines.push(String::new());
        }
        lines.push(format!("{n}. {}", name.unwrap_or_default()).trim_end().to_string());
        if let Some(description) = description {
            lines.push(format!("   {description}"));
        }
    }
    lines
}
