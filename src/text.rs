use regex::Regex;
use std::sync::OnceLock;

pub const ELLIPSIS: char = '…';

fn non_slug_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap())
}

fn slug_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").unwrap())
}

/// Lowercase, hyphen-separated form of `s` suitable for URLs and file names.
pub fn slugify(s: &str) -> String {
    let stripped = non_slug_chars().replace_all(s, "");
    let lowered = stripped.trim().to_lowercase();
    slug_separators()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalizes the first letter of each word and lowercases the rest.
/// A word starts after any character that is not alphanumeric, so
/// `no-prep` becomes `No-Prep` while `3rd` is left alone.
pub fn title_case(s: &str) -> String {
    let collapsed = collapse_whitespace(s);
    let mut out = String::with_capacity(collapsed.len());
    let mut at_word_start = true;
    for c in collapsed.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// `["A", "B", "C"]` -> `"A, B and C"`. Empty entries are skipped.
pub fn join_with_and<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.is_empty())
        .collect();
    match items.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

/// Truncates to `limit` characters without splitting a word and appends an
/// ellipsis. The result is at most `limit + 1` characters long.
pub fn soft_cap(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    let kept = match cut.rfind(char::is_whitespace) {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
