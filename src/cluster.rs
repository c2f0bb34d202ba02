use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::lemma::Lemmatizer;

pub const DEFAULT_MAX_PER_CLUSTER: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordCluster {
    pub head: String,
    pub phrases: Vec<String>,
}

/// Groups phrases by the lemma of their first word.
///
/// Each cluster keeps at most `max_per_cluster` phrases, so the cluster view
/// is a preview: phrases past the cap stay in the candidate list but do not
/// appear here. Clusters are ordered by size, largest first, with ties kept
/// in the order their head word was first seen.
pub fn cluster_keywords(
    candidates: &[String],
    max_per_cluster: usize,
    lemmatizer: &dyn Lemmatizer,
) -> Vec<KeywordCluster> {
    let mut clusters: Vec<KeywordCluster> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for phrase in candidates {
        let Some(first) = phrase.split_whitespace().next() else { continue };
        let head = lemmatizer.lemmatize(first);
        let slot = *index.entry(head.clone()).or_insert_with(|| {
            clusters.push(KeywordCluster { head, phrases: Vec::new() });
            clusters.len() - 1
        });
        clusters[slot].phrases.push(phrase.clone());
    }

    let mut dropped = 0;
    for cluster in &mut clusters {
        if cluster.phrases.len() > max_per_cluster {
            dropped += cluster.phrases.len() - max_per_cluster;
            cluster.phrases.truncate(max_per_cluster);
        }
    }

    clusters.sort_by(|a, b| b.phrases.len().cmp(&a.phrases.len()));
    debug!(
        "Clustered {} phrases into {} clusters ({} dropped past cap {})",
        candidates.len(), clusters.len(), dropped, max_per_cluster
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{keyword_candidates, KeywordExtras};
    use crate::lemma::english;
    use pretty_assertions::assert_eq;

    fn phrases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_by_lemmatized_head_word() {
        let input = phrases(&["activity cards", "math", "activities for kids", "math centers", "activity"]);
        let clusters = cluster_keywords(&input, DEFAULT_MAX_PER_CLUSTER, english());
        assert_eq!(
            clusters,
            vec![
                KeywordCluster {
                    head: "activity".into(),
                    phrases: phrases(&["activity cards", "activities for kids", "activity"]),
                },
                KeywordCluster { head: "math".into(), phrases: phrases(&["math", "math centers"]) },
            ]
        );
    }

    #[test]
    fn ties_keep_encounter_order() {
        let input = phrases(&["zebra", "apple", "mango"]);
        let heads: Vec<String> = cluster_keywords(&input, 6, english()).into_iter().map(|c| c.head).collect();
        assert_eq!(heads, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn clusters_are_capped_and_never_exceed_candidates() {
        let extras = KeywordExtras {
            seasonal: true,
            standards: Some("CCSS".into()),
            formats: vec!["Printable".into(), "Digital".into(), "Google Slides".into()],
            long_tail: true,
            per_grade: true,
        };
        let candidates = keyword_candidates(
            "Math",
            &["Grade 1", "Grade 2", "Grade 3", "Grade 4"],
            "Worksheet",
            "Fractions",
            &extras,
        );
        for cap in [1, 3, DEFAULT_MAX_PER_CLUSTER] {
            let clusters = cluster_keywords(&candidates, cap, english());
            let total: usize = clusters.iter().map(|c| c.phrases.len()).sum();
            assert!(total <= candidates.len());
            assert!(clusters.iter().all(|c| c.phrases.len() <= cap));
            assert!(clusters.windows(2).all(|w| w[0].phrases.len() >= w[1].phrases.len()));
        }
        // Uncapped: 13 "grade" phrases outrank 12 "fraction" phrases.
        let clusters = cluster_keywords(&candidates, usize::MAX, english());
        assert_eq!(clusters[0].head, "grade");
        assert_eq!(clusters[1].head, "fraction");
        // Capped: both hit the cap and fall back to encounter order.
        let clusters = cluster_keywords(&candidates, DEFAULT_MAX_PER_CLUSTER, english());
        assert_eq!(clusters[0].head, "fraction");
    }

    #[test]
    fn uncapped_clusters_partition_the_candidates() {
        let extras = KeywordExtras {
            seasonal: true,
            standards: Some("NGSS".into()),
            formats: vec!["Printable".into(), "Boom Cards".into()],
            long_tail: true,
            per_grade: true,
        };
        let candidates = keyword_candidates("Science", &["Grade 2", "Grade 5"], "Task Cards", "Ecosystems", &extras);
        let clusters = cluster_keywords(&candidates, usize::MAX, english());

        let mut clustered: Vec<String> = clusters.into_iter().flat_map(|c| c.phrases).collect();
        let mut expected = candidates.clone();
        clustered.sort();
        expected.sort();
        assert_eq!(clustered, expected);
    }
}
