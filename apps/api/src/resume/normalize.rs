//! Response normalization: turns raw AI output into a `ResumeDocument`.
//!
//! Upstream output is not contractually bound to the template, so parsing is
//! lenient: fences and leading prose are stripped, the outermost `{...}` is
//! parsed, and every field is coerced to its nearest safe representation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::resume::model::{
    Contact, EducationEntry, ExperienceEntry, ProjectEntry, RawTextBlock, ResumeDocument,
    ResumeSource, Skills,
};

/// Diagnostic snippets never exceed this many characters.
pub const SNIPPET_MAX_CHARS: usize = 200;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("code fence pattern is valid"));

/// Best-effort match for an introductory sentence ("Here's your resume:",
/// "Sure! Below is ...") that precedes the JSON body.
static LEADING_PROSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(?:here(?:'s|’s| is| are)|below is|sure|certainly|of course|okay)[^{]*")
        .expect("leading prose pattern is valid")
});

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("json object pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("no JSON object found")]
    NoJsonObject,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// The AI response could not be turned into a structured document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed AI response ({reason}); response began with: {snippet:?}")]
pub struct MalformedResponse {
    pub reason: MalformedReason,
    /// At most `SNIPPET_MAX_CHARS` characters of the raw response.
    pub snippet: String,
}

impl MalformedResponse {
    fn new(reason: MalformedReason, raw: &str) -> Self {
        Self {
            reason,
            snippet: snippet(raw),
        }
    }
}

/// Returns a bounded prefix of `raw` safe to log or return to a client.
pub fn snippet(raw: &str) -> String {
    raw.trim().chars().take(SNIPPET_MAX_CHARS).collect()
}

/// Removes triple-backtick fences (with an optional language tag) anywhere in the text.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").into_owned()
}

fn strip_leading_prose(text: &str) -> &str {
    match LEADING_PROSE.find(text) {
        Some(m) if text[m.end()..].starts_with('{') => &text[m.end()..],
        _ => text,
    }
}

/// Parses a raw AI response into the canonical model.
pub fn normalize_response(raw: &str) -> Result<ResumeDocument, MalformedResponse> {
    let unfenced = strip_code_fences(raw);
    let body = strip_leading_prose(&unfenced);

    let candidate = JSON_OBJECT
        .find(body)
        .ok_or_else(|| MalformedResponse::new(MalformedReason::NoJsonObject, raw))?;

    let value: Value = serde_json::from_str(candidate.as_str()).map_err(|e| {
        let err = MalformedResponse::new(MalformedReason::InvalidJson(e.to_string()), raw);
        warn!(snippet = %err.snippet, "AI response JSON failed to parse: {e}");
        err
    })?;

    debug!(bytes = candidate.as_str().len(), "AI response JSON parsed");
    Ok(coerce_document(&value))
}

/// Like `normalize_response`, but falls back to free text when the response
/// holds no JSON object at all (older prompt contracts asked for plain text).
pub fn resolve_source(raw: &str) -> Result<ResumeSource, MalformedResponse> {
    match normalize_response(raw) {
        Ok(doc) => Ok(ResumeSource::Structured(doc)),
        Err(MalformedResponse {
            reason: MalformedReason::NoJsonObject,
            ..
        }) => {
            debug!("no JSON object in AI response; using free-text path");
            Ok(ResumeSource::FreeText(RawTextBlock::from_text(
                &strip_code_fences(raw),
            )))
        }
        Err(e) => Err(e),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shape coercion
// ────────────────────────────────────────────────────────────────────────────

/// Coerces any JSON value into a `ResumeDocument`, field by field.
///
/// Non-objects yield an empty document. Known aliases from older templates
/// (`role`, `duration`, `responsibilities`, `institution`, `technicalSkills`,
/// top-level contact fields) are accepted.
pub fn coerce_document(value: &Value) -> ResumeDocument {
    let Some(obj) = value.as_object() else {
        return ResumeDocument::default();
    };

    ResumeDocument {
        name: text_field(obj, &["name", "fullName"]),
        contact: coerce_contact(obj),
        summary: text_field(obj, &["summary", "professionalSummary", "objective"]),
        skills: coerce_skills(field(obj, &["skills", "technicalSkills"])),
        experience: records(field(obj, &["experience", "workExperience"]))
            .filter_map(coerce_experience)
            .collect(),
        education: records(field(obj, &["education"]))
            .filter_map(coerce_education)
            .collect(),
        projects: records(field(obj, &["projects"]))
            .filter_map(coerce_project)
            .collect(),
        achievements: coerce_list(field(obj, &["achievements", "awards"])),
        hobbies: coerce_list(field(obj, &["hobbies", "interests"])),
        languages: coerce_list(field(obj, &["languages", "spokenLanguages"])),
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(coerce_text)
}

/// Scalar coercion: strings are trimmed, numbers and booleans stringified,
/// arrays joined with ", ", objects joined from their values.
pub fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(coerce_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .filter_map(coerce_text)
            .collect::<Vec<_>>()
            .join(", "),
    };
    (!text.is_empty()).then_some(text)
}

/// Sequence coercion: a lone scalar becomes a one-element list.
pub fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(coerce_text).collect(),
        Some(Value::Object(map)) => map.values().filter_map(coerce_text).collect(),
        Some(scalar) => coerce_text(scalar).into_iter().collect(),
    }
}

/// Iterates the objects of a record list; a single object counts as a list of one.
fn records(value: Option<&Value>) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Some(Value::Array(items)) => Box::new(items.iter()),
        Some(v @ Value::Object(_)) | Some(v @ Value::String(_)) => Box::new(std::iter::once(v)),
        _ => Box::new(std::iter::empty()),
    }
}

fn coerce_contact(obj: &Map<String, Value>) -> Contact {
    let nested = field(obj, &["contact", "contactInfo"]).and_then(Value::as_object);
    let pick = |keys: &[&str]| -> Option<String> {
        nested
            .and_then(|c| text_field(c, keys))
            .or_else(|| text_field(obj, keys))
    };

    Contact {
        email: pick(&["email"]),
        phone: pick(&["phone", "phoneNumber"]),
        linkedin: pick(&["linkedin", "linkedIn"]),
        address: pick(&["address", "location"]),
        portfolio: pick(&["portfolio", "github", "website"]),
    }
}

fn coerce_skills(value: Option<&Value>) -> Skills {
    let mut skills = Skills::default();
    match value {
        Some(Value::Object(map)) => {
            for (category, items) in map {
                skills.push(category.clone(), coerce_list(Some(items)));
            }
        }
        Some(v @ Value::Array(_)) | Some(v @ Value::String(_)) => {
            skills.push("skills", coerce_list(Some(v)));
        }
        _ => {}
    }
    skills
}

fn coerce_experience(value: &Value) -> Option<ExperienceEntry> {
    let entry = match value {
        Value::Object(obj) => ExperienceEntry {
            title: text_field(obj, &["title", "role", "position"]),
            company: text_field(obj, &["company", "employer", "organization"]),
            dates: text_field(obj, &["dates", "duration", "period"]),
            description: coerce_list(field(obj, &["description", "responsibilities", "bullets"])),
        },
        other => ExperienceEntry {
            title: coerce_text(other),
            ..Default::default()
        },
    };
    let empty = entry.title.is_none()
        && entry.company.is_none()
        && entry.dates.is_none()
        && entry.description.is_empty();
    (!empty).then_some(entry)
}

fn coerce_education(value: &Value) -> Option<EducationEntry> {
    let entry = match value {
        Value::Object(obj) => EducationEntry {
            degree: text_field(obj, &["degree"]),
            university: text_field(obj, &["university", "institution", "school"]),
            graduation_date: text_field(
                obj,
                &["graduationDate", "graduation_date", "graduation", "dates"],
            ),
        },
        other => EducationEntry {
            degree: coerce_text(other),
            ..Default::default()
        },
    };
    let empty =
        entry.degree.is_none() && entry.university.is_none() && entry.graduation_date.is_none();
    (!empty).then_some(entry)
}

fn coerce_project(value: &Value) -> Option<ProjectEntry> {
    let entry = match value {
        Value::Object(obj) => ProjectEntry {
            name: text_field(obj, &["name", "title"]),
            description: field(obj, &["description", "responsibilities"]).and_then(|v| {
                let parts = coerce_list(Some(v));
                (!parts.is_empty()).then(|| parts.join(" "))
            }),
        },
        other => ProjectEntry {
            name: coerce_text(other),
            ..Default::default()
        },
    };
    (entry.name.is_some() || entry.description.is_some()).then_some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skill<'a>(doc: &'a ResumeDocument, name: &str) -> Option<&'a [String]> {
        doc.skills
            .0
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.items.as_slice())
    }

    #[test]
    fn test_fenced_json_is_parsed() {
        let doc = normalize_response(" ```json\n{\"name\":\"A\"}\n``` ").unwrap();
        assert_eq!(doc.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_leading_prose_is_tolerated() {
        let doc = normalize_response("Here's your resume:\n{\"name\":\"B\"}").unwrap();
        assert_eq!(doc.name.as_deref(), Some("B"));
    }

    #[test]
    fn test_trailing_prose_is_tolerated() {
        let doc =
            normalize_response("{\"name\":\"C\"}\n\nLet me know if you need changes.").unwrap();
        assert_eq!(doc.name.as_deref(), Some("C"));
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let err = normalize_response("not json at all").unwrap_err();
        assert_eq!(err.reason, MalformedReason::NoJsonObject);
        assert_eq!(err.snippet, "not json at all");
    }

    #[test]
    fn test_broken_json_is_malformed_with_bounded_snippet() {
        let raw = format!("{{\"name\": \"A\", {}", "x".repeat(500));
        let err = normalize_response(&format!("{raw}}}")).unwrap_err();
        assert!(matches!(err.reason, MalformedReason::InvalidJson(_)));
        assert!(err.snippet.chars().count() <= SNIPPET_MAX_CHARS);
    }

    #[test]
    fn test_resolve_source_falls_back_to_free_text() {
        let source = resolve_source("```\nJane Doe\n\nEXPERIENCE\n```").unwrap();
        match source {
            ResumeSource::FreeText(block) => {
                assert_eq!(block.paragraphs, vec!["Jane Doe", "EXPERIENCE"]);
            }
            other => panic!("expected free text, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_source_surfaces_invalid_json() {
        assert!(resolve_source("{ name: unquoted }").is_err());
    }

    #[test]
    fn test_string_where_array_expected_becomes_single_item() {
        let doc = coerce_document(&json!({
            "achievements": "Employee of the Year",
            "experience": [{"title": "Engineer", "description": "Built X"}]
        }));
        assert_eq!(doc.achievements, vec!["Employee of the Year"]);
        assert_eq!(doc.experience[0].description, vec!["Built X"]);
    }

    #[test]
    fn test_nulls_become_absent() {
        let doc = coerce_document(&json!({
            "name": null,
            "summary": "   ",
            "hobbies": null,
            "contact": {"email": null, "phone": "555"}
        }));
        assert!(doc.name.is_none());
        assert!(doc.summary.is_none());
        assert!(doc.hobbies.is_empty());
        assert_eq!(doc.contact.email, None);
        assert_eq!(doc.contact.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_skill_categories_keep_upstream_order() {
        let doc = normalize_response(r#"{"skills": {"tools": ["Git"], "languages": ["Go"]}}"#)
            .unwrap();
        let names: Vec<_> = doc.skills.0.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["tools", "languages"]);
    }

    #[test]
    fn test_unknown_skill_categories_are_kept() {
        let doc = coerce_document(&json!({"skills": {"cloud": "AWS"}}));
        assert_eq!(skill(&doc, "cloud"), Some(&["AWS".to_string()][..]));
    }

    #[test]
    fn test_legacy_aliases_are_accepted() {
        let doc = coerce_document(&json!({
            "email": "john@example.com",
            "address": {"street": "789 Pine Ave", "city": "Cityville"},
            "technicalSkills": {"languages": ["Python"]},
            "experience": [{"role": "Intern", "company": "Tech", "duration": "2023",
                            "responsibilities": ["Fixed bugs"]}],
            "education": {"degree": "B.S.", "institution": "State", "graduation": "2023"}
        }));
        assert_eq!(doc.contact.email.as_deref(), Some("john@example.com"));
        assert_eq!(doc.contact.address.as_deref(), Some("789 Pine Ave, Cityville"));
        assert_eq!(skill(&doc, "languages"), Some(&["Python".to_string()][..]));
        assert_eq!(doc.experience[0].title.as_deref(), Some("Intern"));
        assert_eq!(doc.experience[0].dates.as_deref(), Some("2023"));
        assert_eq!(doc.education.len(), 1);
        assert_eq!(doc.education[0].university.as_deref(), Some("State"));
    }

    #[test]
    fn test_empty_records_are_dropped() {
        let doc = coerce_document(&json!({
            "experience": [{}, {"title": null}],
            "projects": [{"name": "Tool"}, {}]
        }));
        assert!(doc.experience.is_empty());
        assert_eq!(doc.projects.len(), 1);
    }

    #[test]
    fn test_non_object_coerces_to_empty_document() {
        assert_eq!(coerce_document(&json!("text")), ResumeDocument::default());
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let raw = "Sure! ```json\n{\"name\":\"A\",\"skills\":{\"b\":[\"1\"],\"a\":[\"2\"]}}```";
        assert_eq!(normalize_response(raw), normalize_response(raw));
    }
}
