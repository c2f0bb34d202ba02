use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cluster::{cluster_keywords, DEFAULT_MAX_PER_CLUSTER};
use crate::copy::{generate_description, generate_title};
use crate::extract::{top_keywords, DEFAULT_TOP_N};
use crate::keywords::{keyword_candidates, KeywordExtras};
use crate::lemma::english;
use crate::models::{GeneratedVariation, GenerationBatch, GenerationRequest, TopicKeywords};
use crate::score::{score_description, score_title};
use crate::text::slugify;

#[derive(Debug, Error)]
pub enum VariationError {
    #[error("variation {index} for '{focus}' produced an empty {field}")]
    Empty { index: usize, focus: String, field: &'static str },
}

impl GenerationRequest {
    pub fn keyword_extras(&self) -> KeywordExtras {
        KeywordExtras {
            seasonal: self.seasonal,
            standards: self.standards_text().map(str::to_string),
            formats: self.formats.clone(),
            long_tail: true,
            per_grade: true,
        }
    }

    fn focus_terms(&self, focus: &str) -> Vec<String> {
        [focus, self.subject.as_str(), self.resource_type.as_str()]
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Runs one full generation pass: keywords and clusters per focus topic,
/// then `variation_count` scored variations per topic.
///
/// A variation that fails is skipped and reported in `warnings`; it never
/// aborts the rest of the batch.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    request: &GenerationRequest,
    thumbnail_text: Option<&str>,
) -> GenerationBatch {
    let id = Uuid::new_v4();
    let thumbnail_text = thumbnail_text.map(str::trim).filter(|t| !t.is_empty());
    let extras = request.keyword_extras();
    let mut topics = Vec::new();
    let mut variations = Vec::new();
    let mut warnings = Vec::new();

    info!(%id, "🚀 Generating {} variation(s) for {} topic(s)", request.variation_count, request.focus_topics().len());

    for focus in request.focus_topics() {
        let keywords = keyword_candidates(&request.subject, &request.grades, &request.resource_type, &focus, &extras);
        let clusters = cluster_keywords(&keywords, DEFAULT_MAX_PER_CLUSTER, english());

        for index in 0..request.variation_count {
            match build_variation(rng, request, &focus, &keywords, thumbnail_text, index) {
                Ok(variation) => variations.push(variation),
                Err(e) => {
                    warn!(%id, "Skipping variation: {}", e);
                    warnings.push(e.to_string());
                }
            }
        }

        topics.push(TopicKeywords { focus, keywords, clusters });
    }

    info!(%id, "✅ Generated {} variation(s), {} skipped", variations.len(), warnings.len());

    GenerationBatch {
        id,
        created_at: Utc::now(),
        topics,
        variations,
        thumbnail_text: thumbnail_text.map(str::to_string),
        warnings,
    }
}

fn build_variation<R: Rng + ?Sized>(
    rng: &mut R,
    request: &GenerationRequest,
    focus: &str,
    keywords: &[String],
    thumbnail_text: Option<&str>,
    index: usize,
) -> Result<GeneratedVariation, VariationError> {
    let empty = |field| VariationError::Empty { index, focus: focus.to_string(), field };

    let title = generate_title(rng, &request.subject, &request.grades, &request.resource_type, focus, &request.formats);
    let mut description = generate_description(
        rng,
        &request.subject,
        &request.grades,
        &request.resource_type,
        focus,
        &request.formats,
        request.standards_text(),
        request.tone,
        request.word_goal,
    );
    if let Some(text) = thumbnail_text {
        description.push_str(&format!(" Thumbnail highlights: {text}"));
    }

    let slug = slugify(&title);
    if title.trim().is_empty() {
        return Err(empty("title"));
    }
    if slug.is_empty() {
        return Err(empty("slug"));
    }

    let tag_source = format!("{} {} {}", thumbnail_text.unwrap_or_default(), title, description);
    let focus_terms = request.focus_terms(focus);
    let title_report = score_title(&title, &focus_terms);
    let description_report = score_description(&description, &focus_terms);

    Ok(GeneratedVariation {
        focus: focus.to_string(),
        keywords: keywords.join(", "),
        tags: top_keywords(&tag_source, DEFAULT_TOP_N).join(", "),
        title_score: title_report.score,
        description_score: description_report.score,
        title_length: title_report.length,
        description_length: description_report.length,
        title,
        description,
        slug,
    })
}
