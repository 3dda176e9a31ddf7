//! Canonical resume model consumed by every renderer.
//!
//! A `ResumeDocument` is built once per request (usually by
//! `normalize::coerce_document`) and handed to the renderers read-only.
//! Every field is optional; renderers omit absent or empty fields entirely.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("paragraph break pattern is valid"));

// ────────────────────────────────────────────────────────────────────────────
// Structured model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Contact::is_empty")]
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Skills::is_empty")]
    pub skills: Skills,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<EducationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hobbies: Vec<String>,
    /// Spoken languages. Programming languages live under `skills`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
}

impl Contact {
    /// Present fields in display order: email, phone, linkedin, address, portfolio.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("LinkedIn", &self.linkedin),
            ("Address", &self.address),
            ("Portfolio", &self.portfolio),
        ]
        .into_iter()
        .filter_map(|(label, value)| non_empty(value).map(|v| (label, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// One skill category, e.g. `tools: ["Git", "Docker"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCategory {
    pub name: String,
    pub items: Vec<String>,
}

/// Open, insertion-ordered mapping of category name to items.
///
/// Serialized as a JSON object whose key order matches the upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skills(pub Vec<SkillCategory>);

impl Skills {
    pub fn push(&mut self, name: impl Into<String>, items: Vec<String>) {
        self.0.push(SkillCategory {
            name: name.into(),
            items,
        });
    }

    /// Categories that have at least one item, in insertion order.
    pub fn non_empty(&self) -> impl Iterator<Item = &SkillCategory> {
        self.0.iter().filter(|c| c.items.iter().any(|i| !i.trim().is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.non_empty().next().is_none()
    }
}

impl Serialize for Skills {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExperienceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Free-text fallback
// ────────────────────────────────────────────────────────────────────────────

/// Unstructured AI output: paragraphs separated by blank lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTextBlock {
    pub paragraphs: Vec<String>,
}

impl RawTextBlock {
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let paragraphs = PARAGRAPH_BREAK
            .split(normalized.trim())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        Self { paragraphs }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

/// What the renderers receive: either the structured model or the legacy
/// free-text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    Structured(ResumeDocument),
    FreeText(RawTextBlock),
}

impl ResumeSource {
    /// Builds a source from an arbitrary JSON value.
    ///
    /// Objects are coerced into the structured model, strings become free
    /// text, anything else is pretty-printed and treated as free text so the
    /// caller still gets visible output.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(_) => {
                ResumeSource::Structured(crate::resume::normalize::coerce_document(value))
            }
            serde_json::Value::String(s) => ResumeSource::FreeText(RawTextBlock::from_text(s)),
            other => ResumeSource::FreeText(RawTextBlock::from_text(
                &serde_json::to_string_pretty(other).unwrap_or_default(),
            )),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            ResumeSource::Structured(_) => "structured",
            ResumeSource::FreeText(_) => "free_text",
        }
    }
}

/// Returns the trimmed value if present and non-blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Joins the present parts with `sep`, skipping absent or blank ones.
pub fn join_present(parts: &[&Option<String>], sep: &str) -> String {
    parts
        .iter()
        .filter_map(|p| non_empty(p))
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_text_block_splits_on_blank_lines() {
        let block = RawTextBlock::from_text("Jane Doe\njane@x.com\r\n\r\nEXPERIENCE\n\n\n- Built X");
        assert_eq!(
            block.paragraphs,
            vec!["Jane Doe\njane@x.com", "EXPERIENCE", "- Built X"]
        );
    }

    #[test]
    fn test_raw_text_block_empty_input() {
        assert!(RawTextBlock::from_text("  \n\n ").is_empty());
    }

    #[test]
    fn test_skills_serialize_in_insertion_order() {
        let mut skills = Skills::default();
        skills.push("tools", vec!["Git".to_string()]);
        skills.push("languages", vec!["Go".to_string()]);
        let json = serde_json::to_string(&skills).unwrap();
        assert_eq!(json, r#"{"tools":["Git"],"languages":["Go"]}"#);
    }

    #[test]
    fn test_skills_without_items_count_as_empty() {
        let mut skills = Skills::default();
        skills.push("tools", vec![]);
        skills.push("concepts", vec!["  ".to_string()]);
        assert!(skills.is_empty());
    }

    #[test]
    fn test_contact_fields_skip_blank_values() {
        let contact = Contact {
            email: Some("j@x.com".to_string()),
            phone: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(contact.fields(), vec![("Email", "j@x.com")]);
    }

    #[test]
    fn test_document_serializes_camel_case_and_omits_empty() {
        let doc = ResumeDocument {
            name: Some("A".to_string()),
            education: vec![EducationEntry {
                graduation_date: Some("May 2016".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({"name": "A", "education": [{"graduationDate": "May 2016"}]})
        );
    }

    #[test]
    fn test_source_from_non_object_value_degrades_to_text() {
        let source = ResumeSource::from_value(&json!([1, 2]));
        match source {
            ResumeSource::FreeText(block) => assert!(block.to_text().contains('1')),
            other => panic!("expected free text, got {other:?}"),
        }
    }

    #[test]
    fn test_join_present_skips_blank_parts() {
        let title = Some("Engineer".to_string());
        let company = None;
        let dates = Some("2020".to_string());
        assert_eq!(join_present(&[&title, &company, &dates], " | "), "Engineer | 2020");
    }
}
