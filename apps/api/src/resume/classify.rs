//! Free-text classification shared by both document renderers.
//!
//! A `RawTextBlock` paragraph is split into trimmed lines and classified as
//! exactly one of: name/contact header, heading, bullet list, compressed
//! entry block, or plain paragraphs. Both renderers consume this output so
//! they can never disagree on what is a heading or a bullet.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::resume::model::RawTextBlock;

static MARKDOWN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s*").expect("markdown heading pattern is valid"));

static ALL_CAPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9 ,&-]+$").expect("all caps pattern is valid"));

/// `-`, `*`, `•` and the other common Unicode bullets, followed by whitespace.
static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*•‣⁃◦▪●■]\s+").expect("bullet marker pattern is valid")
});

static NUMBERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[.)]\s+").expect("numbered marker pattern is valid"));

/// Section keywords that trigger entry compression (checked case-insensitively).
pub const ENTRY_KEYWORDS: &[&str] = &[
    "EXPERIENCE",
    "FREELANCE",
    "EDUCATION",
    "PROJECTS",
    "TECHNICAL PROJECTS",
    "SUMMARY",
];

/// Lines merged into the pipe-joined title of a compressed entry.
const ENTRY_TITLE_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLine {
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// First section of the document: a name followed by contact lines.
    NameContact { name: String, contact: Vec<String> },
    Heading(String),
    BulletList(Vec<String>),
    /// Experience/education/project style block: `title | org | dates` then details.
    Entry { title: String, lines: Vec<EntryLine> },
    Paragraphs(Vec<String>),
}

/// Splits one paragraph into cleaned lines: trimmed, markdown `#` removed, blanks dropped.
pub fn section_lines(section: &str) -> Vec<String> {
    section
        .lines()
        .map(|l| MARKDOWN_HEADING.replace(l.trim(), "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn is_bullet(line: &str) -> bool {
    BULLET_MARKER.is_match(line)
}

fn is_list_item(line: &str) -> bool {
    is_bullet(line) || NUMBERED_MARKER.is_match(line)
}

/// Removes a leading bullet or number marker.
pub fn strip_marker(line: &str) -> String {
    let stripped = BULLET_MARKER.replace(line, "");
    NUMBERED_MARKER.replace(&stripped, "").trim().to_string()
}

/// A single line that is ALL CAPS (letters, digits, space, dash, comma,
/// ampersand) or ends with a colon. `**` emphasis markers are ignored.
pub fn is_heading_line(line: &str) -> bool {
    let bare = line.replace("**", "");
    let bare = bare.trim();
    if bare.ends_with(':') {
        return true;
    }
    ALL_CAPS.is_match(bare) && bare.chars().any(|c| c.is_ascii_uppercase())
}

fn heading_text(line: &str) -> String {
    line.replace([':', '*'], "").trim().to_string()
}

fn has_entry_keyword(lines: &[String]) -> bool {
    let upper = lines.join("\n").to_uppercase();
    ENTRY_KEYWORDS.iter().any(|k| upper.contains(k))
}

fn is_section_keyword(line: &str) -> bool {
    let upper = heading_text(line).to_uppercase();
    ENTRY_KEYWORDS.iter().any(|k| upper == *k)
}

/// Classifies one section's cleaned lines. `first` marks the document's first section.
pub fn classify(lines: &[String], first: bool) -> Option<Classified> {
    if lines.is_empty() {
        return None;
    }

    let all_list_items = lines.iter().all(|l| is_list_item(l));

    if first
        && lines.len() >= 2
        && !all_list_items
        && !lines[0].trim_end().ends_with(':')
        && !is_section_keyword(&lines[0])
    {
        return Some(Classified::NameContact {
            name: lines[0].replace("**", "").trim().to_string(),
            contact: lines[1..].to_vec(),
        });
    }

    if lines.len() == 1 && is_heading_line(&lines[0]) {
        return Some(Classified::Heading(heading_text(&lines[0])));
    }

    if all_list_items {
        return Some(Classified::BulletList(
            lines.iter().map(|l| strip_marker(l)).collect(),
        ));
    }

    if has_entry_keyword(lines) {
        let split = lines.len().min(ENTRY_TITLE_LINES);
        let title = lines[..split].join(" | ");
        let rest = lines[split..]
            .iter()
            .map(|l| {
                if is_bullet(l) {
                    EntryLine::Bullet(strip_marker(l))
                } else {
                    EntryLine::Paragraph(l.clone())
                }
            })
            .collect();
        return Some(Classified::Entry { title, lines: rest });
    }

    Some(Classified::Paragraphs(lines.to_vec()))
}

/// Classifies every paragraph of a free-text block in order.
pub fn classify_block(block: &RawTextBlock) -> Vec<Classified> {
    block
        .paragraphs
        .iter()
        .map(|p| section_lines(p))
        .filter(|lines| !lines.is_empty())
        .enumerate()
        .filter_map(|(i, lines)| classify(&lines, i == 0))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Inline emphasis
// ────────────────────────────────────────────────────────────────────────────

/// A run of text with uniform weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Splits `**bold**` markup into runs with the asterisks removed.
///
/// An unmatched trailing `**` is dropped and the text after it stays plain.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let parts: Vec<&str> = text.split("**").collect();
    let balanced = parts.len() % 2 == 1;
    let last = parts.len() - 1;

    parts
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_empty())
        .map(|(i, p)| {
            let bold = i % 2 == 1 && (balanced || i != last);
            Span {
                text: (*p).to_string(),
                bold,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        section_lines(text)
    }

    #[test]
    fn test_all_caps_single_line_is_heading() {
        assert_eq!(
            classify(&lines("EDUCATION"), false),
            Some(Classified::Heading("EDUCATION".to_string()))
        );
    }

    #[test]
    fn test_mixed_case_single_line_is_paragraph() {
        assert_eq!(
            classify(&lines("Graduated with honors"), false),
            Some(Classified::Paragraphs(vec!["Graduated with honors".to_string()]))
        );
    }

    #[test]
    fn test_colon_terminated_line_is_heading_without_colon() {
        assert_eq!(
            classify(&lines("**Technical Skills:**"), false),
            Some(Classified::Heading("Technical Skills".to_string()))
        );
    }

    #[test]
    fn test_dash_bullets_become_list_with_markers_stripped() {
        assert_eq!(
            classify(&lines("- Built X\n- Shipped Y"), false),
            Some(Classified::BulletList(vec![
                "Built X".to_string(),
                "Shipped Y".to_string()
            ]))
        );
    }

    #[test]
    fn test_unicode_and_numbered_bullets() {
        assert_eq!(
            classify(&lines("• One\n2. Two\n▪ Three"), false),
            Some(Classified::BulletList(vec![
                "One".to_string(),
                "Two".to_string(),
                "Three".to_string()
            ]))
        );
    }

    #[test]
    fn test_bold_line_is_not_a_bullet() {
        assert!(!is_bullet("**Senior Engineer**"));
    }

    #[test]
    fn test_first_section_is_name_and_contact() {
        assert_eq!(
            classify(&lines("Jane Doe\njane@x.com\n555-1234"), true),
            Some(Classified::NameContact {
                name: "Jane Doe".to_string(),
                contact: vec!["jane@x.com".to_string(), "555-1234".to_string()],
            })
        );
    }

    #[test]
    fn test_first_section_heading_is_not_a_name() {
        let result = classify(&lines("EXPERIENCE\nEngineer\nAcme"), true);
        assert!(matches!(result, Some(Classified::Entry { .. })));
    }

    #[test]
    fn test_entry_block_compresses_first_three_lines() {
        let result = classify(
            &lines("Software Engineer\nAcme Corp\n2020 - 2023\n- Built X\nLed the EXPERIENCE team"),
            false,
        );
        assert_eq!(
            result,
            Some(Classified::Entry {
                title: "Software Engineer | Acme Corp | 2020 - 2023".to_string(),
                lines: vec![
                    EntryLine::Bullet("Built X".to_string()),
                    EntryLine::Paragraph("Led the EXPERIENCE team".to_string()),
                ],
            })
        );
    }

    #[test]
    fn test_short_entry_block_keeps_available_lines() {
        let result = classify(&lines("PROJECTS\nResume Parser"), false);
        assert_eq!(
            result,
            Some(Classified::Entry {
                title: "PROJECTS | Resume Parser".to_string(),
                lines: vec![],
            })
        );
    }

    #[test]
    fn test_markdown_heading_prefix_is_removed() {
        assert_eq!(
            classify(&lines("### SKILLS"), false),
            Some(Classified::Heading("SKILLS".to_string()))
        );
    }

    #[test]
    fn test_classify_block_marks_only_first_section() {
        let block = RawTextBlock::from_text("Jane Doe\njane@x.com\n\nFoo bar\nBaz qux");
        let classified = classify_block(&block);
        assert!(matches!(classified[0], Classified::NameContact { .. }));
        assert!(matches!(classified[1], Classified::Paragraphs(_)));
    }

    #[test]
    fn test_parse_inline_splits_bold_runs() {
        assert_eq!(
            parse_inline("Built **fast** APIs"),
            vec![Span::plain("Built "), Span::bold("fast"), Span::plain(" APIs")]
        );
    }

    #[test]
    fn test_parse_inline_unmatched_marker_stays_plain() {
        assert_eq!(
            parse_inline("Led **migration"),
            vec![Span::plain("Led "), Span::plain("migration")]
        );
    }

    #[test]
    fn test_parse_inline_plain_text() {
        assert_eq!(parse_inline("plain"), vec![Span::plain("plain")]);
        assert!(parse_inline("").is_empty());
    }
}
