use rand::Rng;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::models::Tone;
use crate::text::{collapse_whitespace, join_with_and, soft_cap, title_case, word_count};

pub const TITLE_LIMIT: usize = 110;
pub const DEFAULT_FORMATS: &str = "Printable & Digital";
pub const DEFAULT_STANDARDS: &str = "key standards";

pub const TITLE_TEMPLATES: &[&str] = &[
    "{Focus} {Resource} for {Grades} | {Subject}",
    "{Grades} {Subject}: {Focus} {Resource}",
    "Engaging {Focus} {Resource} for {Grades} | {Formats}",
    "{Subject} {Focus} {Resource} | {Grades} | {Formats}",
];

const INCLUDED_TEMPLATES: &[&str] = &[
    "Inside you'll find {count} {focus} practice pages with answer keys, so students build confidence one step at a time.",
    "This resource includes {count} ready-to-print {focus} problems plus a complete answer key.",
    "What's inside: {count} carefully sequenced {focus} tasks, student directions and teacher answer keys.",
];

const USAGE_TEMPLATES: &[&str] = &[
    "Use it for whole-group lessons, small groups, centers or homework, with every page aligned to {standards}.",
    "How to use: assign it as warm-ups, exit tickets or review days and track progress toward {standards}.",
    "Perfect for centers, intervention, early finishers or sub plans, with practice aligned to {standards}.",
];

const CTA_TEMPLATES: &[&str] = &[
    "Download now and make {focus} practice the easiest part of your week!",
    "Grab this {resource} today and give your students the {focus} practice they need.",
    "Add it to your cart and follow the store for more {subject} resources.",
];

const FILLER: &str = "Each page is designed to save you prep time while keeping {grades} students focused on meaningful {focus} practice.";

// Named platforms that make a bare "Digital" label redundant.
const DIGITAL_PLATFORMS: &[&str] = &["google slides", "google forms", "easel", "boom cards", "seesaw"];

fn tone_words(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Neutral => &["ready-to-use", "practical", "straightforward"],
        Tone::Professional => &["standards-based", "research-informed", "rigorous"],
        Tone::Enthusiastic => &["fun", "engaging", "exciting"],
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").unwrap())
}

/// Substitutes `{name}` placeholders in a single pass over `template`.
/// Inserted values are never rescanned; unknown names are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn is_specific_digital(format: &str) -> bool {
    let lower = format.trim().to_lowercase();
    lower != "digital" && (lower.contains("digital") || DIGITAL_PLATFORMS.contains(&lower.as_str()))
}

/// Human-readable format list, e.g. "Printable and Google Slides".
pub fn format_short<S: AsRef<str>>(formats: &[S]) -> String {
    let labels: Vec<&str> = formats.iter().map(|f| f.as_ref().trim()).filter(|f| !f.is_empty()).collect();
    if labels.is_empty() {
        return DEFAULT_FORMATS.to_string();
    }
    let has_specific_digital = labels.iter().any(|f| is_specific_digital(f));
    let titled: Vec<String> = labels
        .iter()
        .filter(|f| !(has_specific_digital && f.eq_ignore_ascii_case("digital")))
        .map(|f| title_case(f))
        .collect();
    join_with_and(&titled)
}

pub fn generate_title<R: Rng + ?Sized, S: AsRef<str>>(
    rng: &mut R,
    subject: &str,
    grades: &[S],
    resource_type: &str,
    focus: &str,
    formats: &[S],
) -> String {
    let template = pick(rng, TITLE_TEMPLATES);
    let title = fill_template(
        template,
        &[
            ("Focus", title_case(focus).as_str()),
            ("Resource", title_case(resource_type).as_str()),
            ("Grades", join_with_and(grades).as_str()),
            ("Subject", title_case(subject).as_str()),
            ("Formats", format_short(formats).as_str()),
        ],
    );
    soft_cap(&collapse_whitespace(&title), TITLE_LIMIT)
}

#[allow(clippy::too_many_arguments)]
pub fn generate_description<R: Rng + ?Sized, S: AsRef<str>>(
    rng: &mut R,
    subject: &str,
    grades: &[S],
    resource_type: &str,
    focus: &str,
    formats: &[S],
    standards: Option<&str>,
    tone: Tone,
    word_goal: usize,
) -> String {
    let grades_txt = join_with_and(grades);
    let subject_lower = subject.trim().to_lowercase();
    let focus_lower = focus.trim().to_lowercase();
    let resource_lower = resource_type.trim().to_lowercase();
    let standards = standards.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STANDARDS);
    let adjective = pick(rng, tone_words(tone));

    let count = rng.gen_range(10..=40).to_string();
    let fill = |template: &str| {
        fill_template(
            template,
            &[
                ("focus", focus_lower.as_str()),
                ("resource", resource_lower.as_str()),
                ("subject", subject_lower.as_str()),
                ("grades", grades_txt.as_str()),
                ("standards", standards),
                ("count", count.as_str()),
            ],
        )
    };

    let hook = format!(
        "Help your {} {subject_lower} students master {focus_lower} with this {adjective} {resource_lower}. \
         It's low-prep and comes in {} for flexible teaching.",
        grades_txt.to_lowercase(),
        format_short(formats).to_lowercase()
    );
    let included = fill(pick(rng, INCLUDED_TEMPLATES));
    let usage = fill(pick(rng, USAGE_TEMPLATES));
    let cta = fill(pick(rng, CTA_TEMPLATES));

    let mut desc = collapse_whitespace(&[hook, included, usage, cta].join(" "));
    let filler = collapse_whitespace(&fill(FILLER));
    while word_count(&desc) < word_goal {
        desc.push(' ');
        desc.push_str(&filler);
    }
    desc.trim().to_string()
}
