use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_TOP_N: usize = 12;

/// Common English words that never make useful listing tags.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "it", "its", "this", "that", "these", "those", "i", "you", "your", "yours", "he", "she", "we",
    "our", "they", "them", "their", "what", "which", "who", "when", "where", "why", "how", "all",
    "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "just", "also", "now", "here", "there",
    "then", "once", "if", "while", "because", "until", "about", "into", "through", "during",
    "before", "after", "above", "below", "between", "under", "again", "further", "any", "am",
    "being", "one", "get", "got", "make", "use", "used", "using", "ll", "re", "ve", "s", "t",
];

fn alpha_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Alphabetic}+").unwrap())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Most frequent content words in `text`, ties broken by first appearance.
pub fn top_keywords(text: &str, n: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in alpha_token().find_iter(&lower).map(|m| m.as_str()) {
        if token.chars().count() <= 2 || is_stop_word(token) {
            continue;
        }
        let slot = *index.entry(token).or_insert_with(|| {
            order.push((token.to_string(), 0));
            order.len() - 1
        });
        order[slot].1 += 1;
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.into_iter().take(n).map(|(word, _)| word).collect()
}
