use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cluster::KeywordCluster;

pub const GRADE_OPTIONS: &[&str] = &[
    "Preschool", "Kindergarten", "Grade 1", "Grade 2", "Grade 3", "Grade 4", "Grade 5", "Grade 6",
];
pub const RESOURCE_TYPE_OPTIONS: &[&str] = &["Worksheet", "Activities", "Lesson Plan"];
pub const FORMAT_OPTIONS: &[&str] = &["Printable", "Digital", "Google Slides", "Easel"];

pub const WORD_GOAL_RANGE: (usize, usize) = (120, 600);
pub const VARIATION_RANGE: (usize, usize) = (1, 12);
pub const MAX_BATCH_TOPICS: usize = 20;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Tone {
    #[default]
    Neutral,
    Professional,
    Enthusiastic,
}

// Unknown tones fall back to neutral instead of failing the request.
impl From<String> for Tone {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "professional" => Tone::Professional,
            "enthusiastic" => Tone::Enthusiastic,
            _ => Tone::Neutral,
        }
    }
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Neutral, Tone::Professional, Tone::Enthusiastic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Professional => "professional",
            Tone::Enthusiastic => "enthusiastic",
        }
    }
}

fn default_word_goal() -> usize { 280 }
fn default_variation_count() -> usize { 3 }

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationRequest {
    pub subject: String,
    #[serde(default)]
    pub grades: Vec<String>,
    pub resource_type: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(default)]
    pub standards: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_word_goal")]
    pub word_goal: usize,
    #[serde(default = "default_variation_count")]
    pub variation_count: usize,
    #[serde(default)]
    pub seasonal: bool,
    /// One focus topic per entry; when present it replaces `focus`.
    #[serde(default)]
    pub batch_focus: Option<Vec<String>>,
}

impl GenerationRequest {
    /// Topics this request generates copy for, in input order.
    pub fn focus_topics(&self) -> Vec<String> {
        let batch: Vec<String> = self
            .batch_focus
            .iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if batch.is_empty() { vec![self.focus.trim().to_string()] } else { batch }
    }

    pub fn standards_text(&self) -> Option<&str> {
        self.standards.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        let (min_words, max_words) = WORD_GOAL_RANGE;
        if !(min_words..=max_words).contains(&self.word_goal) {
            return Err(format!("word_goal must be between {min_words} and {max_words}, got {}", self.word_goal));
        }
        let (min_vars, max_vars) = VARIATION_RANGE;
        if !(min_vars..=max_vars).contains(&self.variation_count) {
            return Err(format!("variation_count must be between {min_vars} and {max_vars}, got {}", self.variation_count));
        }
        let topics = self.focus_topics().len();
        if topics > MAX_BATCH_TOPICS {
            return Err(format!("at most {MAX_BATCH_TOPICS} batch focus topics are allowed, got {topics}"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedVariation {
    pub focus: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub tags: String,
    pub title_score: f64,
    pub description_score: f64,
    pub title_length: usize,
    pub description_length: usize,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TopicKeywords {
    pub focus: String,
    pub keywords: Vec<String>,
    pub clusters: Vec<KeywordCluster>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationBatch {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub topics: Vec<TopicKeywords>,
    pub variations: Vec<GeneratedVariation>,
    #[serde(default)]
    pub thumbnail_text: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct InputOptions {
    pub grades: &'static [&'static str],
    pub resource_types: &'static [&'static str],
    pub formats: &'static [&'static str],
    pub tones: Vec<&'static str>,
    pub word_goal: (usize, usize),
    pub variation_count: (usize, usize),
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            grades: GRADE_OPTIONS,
            resource_types: RESOURCE_TYPE_OPTIONS,
            formats: FORMAT_OPTIONS,
            tones: Tone::ALL.iter().map(Tone::as_str).collect(),
            word_goal: WORD_GOAL_RANGE,
            variation_count: VARIATION_RANGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({ "subject": "Math", "resource_type": "Worksheet", "focus": "Fractions" })
    }

    #[test]
    fn unknown_tone_falls_back_to_neutral() {
        let mut body = minimal();
        body["tone"] = json!("sarcastic");
        let req: GenerationRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.tone, Tone::Neutral);

        let mut body = minimal();
        body["tone"] = json!("Enthusiastic");
        let req: GenerationRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.tone, Tone::Enthusiastic);
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let req: GenerationRequest = serde_json::from_value(minimal()).unwrap();
        assert_eq!(req.word_goal, 280);
        assert_eq!(req.variation_count, 3);
        assert!(req.grades.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn focus_topics_prefers_non_empty_batch() {
        let mut req: GenerationRequest = serde_json::from_value(minimal()).unwrap();
        assert_eq!(req.focus_topics(), vec!["Fractions".to_string()]);

        req.batch_focus = Some(vec!["Decimals".into(), "  ".into(), " Place Value ".into()]);
        assert_eq!(req.focus_topics(), vec!["Decimals".to_string(), "Place Value".to_string()]);

        req.batch_focus = Some(vec!["".into()]);
        assert_eq!(req.focus_topics(), vec!["Fractions".to_string()]);
    }

    #[test]
    fn validate_rejects_out_of_range_sliders() {
        let mut req: GenerationRequest = serde_json::from_value(minimal()).unwrap();
        req.word_goal = 50;
        assert!(req.validate().unwrap_err().contains("word_goal"));
        req.word_goal = 280;
        req.variation_count = 0;
        assert!(req.validate().unwrap_err().contains("variation_count"));
    }

    #[test]
    fn batch_limit_counts_only_non_blank_topics() {
        let mut req: GenerationRequest = serde_json::from_value(minimal()).unwrap();
        let mut lines: Vec<String> = (0..MAX_BATCH_TOPICS).map(|i| format!("topic {i}")).collect();
        lines.extend(std::iter::repeat(String::from("  ")).take(10));
        req.batch_focus = Some(lines);
        assert_eq!(req.validate(), Ok(()));

        req.batch_focus.as_mut().unwrap().push("one too many".into());
        assert!(req.validate().unwrap_err().contains("batch focus"));
    }

    #[test]
    fn blank_standards_are_treated_as_absent() {
        let mut req: GenerationRequest = serde_json::from_value(minimal()).unwrap();
        req.standards = Some("   ".into());
        assert_eq!(req.standards_text(), None);
        req.standards = Some(" CCSS ".into());
        assert_eq!(req.standards_text(), Some("CCSS"));
    }
}
