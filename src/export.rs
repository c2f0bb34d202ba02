use chrono::NaiveDate;

use crate::models::{GeneratedVariation, GenerationBatch};

pub const COLUMNS: &[&str] = &[
    "title",
    "description",
    "keywords",
    "tags",
    "title_score",
    "description_score",
    "title_length",
    "description_length",
    "slug",
];

pub fn export_filename(date: NaiveDate) -> String {
    format!("tpt_seo_{}.csv", date.format("%Y-%m-%d"))
}

fn row(variation: &GeneratedVariation) -> [String; 9] {
    [
        variation.title.clone(),
        variation.description.clone(),
        variation.keywords.clone(),
        variation.tags.clone(),
        variation.title_score.to_string(),
        variation.description_score.to_string(),
        variation.title_length.to_string(),
        variation.description_length.to_string(),
        variation.slug.clone(),
    ]
}

/// Writes the batch as UTF-8 CSV with a header row. A leading `focus`
/// column is added when the batch spans more than one focus topic.
pub fn batch_to_csv(batch: &GenerationBatch) -> Result<Vec<u8>, csv::Error> {
    let with_focus = batch.topics.len() > 1;
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = Vec::with_capacity(COLUMNS.len() + 1);
    if with_focus {
        header.push("focus");
    }
    header.extend_from_slice(COLUMNS);
    writer.write_record(&header)?;

    for variation in &batch.variations {
        let fields = row(variation);
        if with_focus {
            writer.write_record(std::iter::once(variation.focus.as_str()).chain(fields.iter().map(String::as_str)))?;
        } else {
            writer.write_record(&fields)?;
        }
    }

    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}
