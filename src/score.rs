use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::text::char_len;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreReport {
    pub length: usize,
    pub score: f64,
}

/// Length bands: inside `ideal` scores 1.0, inside `acceptable` 0.7, else 0.4.
struct LengthBands {
    ideal: (usize, usize),
    acceptable: (usize, usize),
}

impl LengthBands {
    fn score(&self, length: usize) -> f64 {
        let within = |(lo, hi): (usize, usize)| (lo..=hi).contains(&length);
        if within(self.ideal) {
            1.0
        } else if within(self.acceptable) {
            0.7
        } else {
            0.4
        }
    }
}

const TITLE_BANDS: LengthBands = LengthBands { ideal: (40, 100), acceptable: (30, 120) };
const DESCRIPTION_BANDS: LengthBands = LengthBands { ideal: (300, 900), acceptable: (200, 1200) };

const STRUCTURE_BONUS: f64 = 0.2;
const DESCRIPTION_CUES: &[&str] = &["perfect for", "includes", "what's inside", "how to use"];

fn grade_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(grades?\s*\d+|\d+(st|nd|rd|th)\s+grade|k\s*-\s*\d+|kindergarten|preschool|pre-k)\b").unwrap()
    })
}

fn resource_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(worksheets?|activit(y|ies)|lesson plans?|task cards?|centers?|printables?|bundle|unit)\b").unwrap()
    })
}

fn presence_score(text: &str, focus_terms: &[String]) -> f64 {
    let haystack = text.to_lowercase();
    let terms: Vec<String> = focus_terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
    (hits as f64 / terms.len().max(1) as f64).min(1.0)
}

fn combine(length_score: f64, presence: f64, bonus: f64) -> f64 {
    let raw = (0.6 * length_score + 0.4 * presence + bonus).min(1.0);
    ((raw * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

pub fn score_title(title: &str, focus_terms: &[String]) -> ScoreReport {
    let length = char_len(title);
    let mut bonus = 0.0;
    if grade_pattern().is_match(title) {
        bonus += STRUCTURE_BONUS;
    }
    if resource_pattern().is_match(title) {
        bonus += STRUCTURE_BONUS;
    }
    ScoreReport {
        length,
        score: combine(TITLE_BANDS.score(length), presence_score(title, focus_terms), bonus),
    }
}

pub fn score_description(desc: &str, focus_terms: &[String]) -> ScoreReport {
    let length = char_len(desc);
    let lower = desc.to_lowercase();
    let bonus = if DESCRIPTION_CUES.iter().any(|cue| lower.contains(cue)) { STRUCTURE_BONUS } else { 0.0 };
    ScoreReport {
        length,
        score: combine(DESCRIPTION_BANDS.score(length), presence_score(desc, focus_terms), bonus),
    }
}
