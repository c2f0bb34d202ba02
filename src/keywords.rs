use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::text::{collapse_whitespace, join_with_and};

/// Optional phrase families added on top of the base candidates.
///
/// Unknown keys are rejected when deserializing so a misspelled option
/// surfaces as an error instead of silently doing nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct KeywordExtras {
    /// "back to school", "end of year" and "test prep" phrases around the focus.
    pub seasonal: bool,
    /// One "<focus> <standards> aligned" phrase.
    pub standards: Option<String>,
    /// Two phrases per format: focus + format and resource type + format.
    pub formats: Vec<String>,
    /// Differentiated, small group, printable, no-prep, self-checking and
    /// formative-assessment phrases around the focus.
    pub long_tail: bool,
    /// Grade-specific focus, resource type and subject phrases.
    pub per_grade: bool,
}

fn leading_grade_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*grade\s*").unwrap())
}

/// "Grade 3" -> "grade 3", "3" -> "grade 3", "Kindergarten" -> "grade kindergarten".
pub fn normalize_grades<S: AsRef<str>>(grades: &[S]) -> Vec<String> {
    grades
        .iter()
        .map(|g| leading_grade_token().replace(g.as_ref(), "").trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .map(|g| format!("grade {g}"))
        .collect()
}

pub fn keyword_candidates<S: AsRef<str>>(
    subject: &str,
    grades: &[S],
    resource_type: &str,
    focus: &str,
    extras: &KeywordExtras,
) -> Vec<String> {
    let grade_phrases = normalize_grades(grades);

    let mut phrases = vec![
        subject.to_string(),
        resource_type.to_string(),
        focus.to_string(),
        format!("{focus} {resource_type}"),
        format!("{subject} {focus}"),
        format!("{} {resource_type}", join_with_and(&grade_phrases)),
        format!("{focus} activities"),
        format!("{focus} worksheets"),
        format!("{focus} lesson plans"),
    ];

    if extras.long_tail {
        phrases.extend([
            format!("differentiated {focus}"),
            format!("{focus} small group"),
            format!("printable {focus} {resource_type}"),
            format!("no-prep {focus} {resource_type}"),
            format!("self-checking {focus}"),
            format!("{focus} formative assessment"),
        ]);
    }

    if extras.seasonal {
        phrases.extend([
            format!("back to school {focus}"),
            format!("end of year {focus}"),
            format!("{focus} test prep"),
        ]);
    }

    if let Some(standards) = extras.standards.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        phrases.push(format!("{focus} {standards} aligned"));
    }

    for format in &extras.formats {
        phrases.push(format!("{focus} {format}"));
        phrases.push(format!("{resource_type} {format}"));
    }

    if extras.per_grade {
        for grade in &grade_phrases {
            phrases.push(format!("{grade} {focus}"));
            phrases.push(format!("{grade} {resource_type}"));
            phrases.push(format!("{grade} {subject}"));
        }
    }

    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .map(|p| collapse_whitespace(&p.to_lowercase()))
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
