use std::collections::HashMap;
use std::sync::OnceLock;

/// Reduces an inflected word to its dictionary base form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str) -> String;
}

/// Rule-based English noun lemmatizer: an irregular-form table, a list of
/// words that end in `s` without being plural, then suffix rules.
pub struct EnglishLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: Vec<&'static str>,
}

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("lives", "life"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("quizzes", "quiz"),
    ("shoes", "shoe"),
    ("toes", "toe"),
    ("canoes", "canoe"),
    ("indices", "index"),
    ("analyses", "analysis"),
    ("hypotheses", "hypothesis"),
    ("theses", "thesis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("syllabi", "syllabus"),
];

// Singular words with a trailing `s` that the suffix rules would mangle.
const INVARIANT: &[&str] = &[
    "math", "mathematics", "physics", "economics", "civics", "phonics", "genetics", "statistics",
    "news", "series", "species", "means", "gas", "bus", "yes", "this", "his", "is", "was", "has",
    "us", "its", "as", "always", "perhaps", "canvas", "atlas", "chaos", "lens", "bonus", "campus",
    "census", "circus", "focus", "virus", "status", "corpus", "cosmos", "ethos", "plus", "thus",
];

impl EnglishLemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR.iter().copied().collect(),
            invariant: INVARIANT.to_vec(),
        }
    }
}

impl Default for EnglishLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some(base) = self.irregular.get(lower.as_str()) {
            return base.to_string();
        }
        if self.invariant.contains(&lower.as_str()) || !lower.chars().all(|c| c.is_alphabetic()) {
            return lower;
        }
        let len = lower.len();
        if len > 4 && lower.ends_with("ies") {
            return format!("{}y", &lower[..len - 3]);
        }
        if lower.ends_with("sses")
            || lower.ends_with("ches")
            || lower.ends_with("shes")
            || lower.ends_with("xes")
            || lower.ends_with("zes")
        {
            return lower[..len - 2].to_string();
        }
        // gases, buses, viruses: the stem is itself a singular ending in `s`.
        if lower.ends_with("ses") && self.invariant.contains(&&lower[..len - 2]) {
            return lower[..len - 2].to_string();
        }
        if len > 4 && lower.ends_with("oes") {
            return lower[..len - 2].to_string();
        }
        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return lower;
        }
        if len > 3 && lower.ends_with('s') {
            return lower[..len - 1].to_string();
        }
        lower
    }
}

/// Process-wide lemmatizer, built on first use and never mutated afterwards.
pub fn english() -> &'static EnglishLemmatizer {
    static LEMMATIZER: OnceLock<EnglishLemmatizer> = OnceLock::new();
    LEMMATIZER.get_or_init(EnglishLemmatizer::new)
}
