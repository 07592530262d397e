//! Ranked-document interface to the external content store.
//!
//! The engine only ever asks for resources to attach to path steps; retrieval
//! quality is the collaborator's business. [`KeywordContentStore`] is a small
//! term-overlap ranker used by tests and local runs without a retrieval service.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDocument {
    pub excerpt: String,
    pub source_id: String,
    pub score: f64,
}

pub trait ContentStore: Send + Sync {
    /// Up to `k` documents for `query`, best first. With a filter, only documents
    /// tagged with that competency are eligible.
    fn query(&self, query: &str, competency_filter: Option<&str>, k: usize) -> Vec<RankedDocument>;
}

/// Content store that never returns anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContent;

impl ContentStore for NoContent {
    fn query(&self, _query: &str, _competency_filter: Option<&str>, _k: usize) -> Vec<RankedDocument> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub source_id: String,
    pub text: String,
    #[serde(default)]
    pub competencies: Vec<String>,
}

/// Scores documents by the share of query terms they contain.
#[derive(Debug, Default, Clone)]
pub struct KeywordContentStore {
    documents: Vec<(ContentDocument, HashSet<String>)>,
}

impl KeywordContentStore {
    pub fn new(documents: Vec<ContentDocument>) -> Self {
        let documents = documents
            .into_iter()
            .map(|doc| {
                let terms = tokenize(&doc.text).collect();
                (doc, terms)
            })
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ContentStore for KeywordContentStore {
    fn query(&self, query: &str, competency_filter: Option<&str>, k: usize) -> Vec<RankedDocument> {
        let query_terms: HashSet<String> = tokenize(query).collect();
        if query_terms.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<RankedDocument> = self
            .documents
            .iter()
            .filter(|(doc, _)| {
                competency_filter.map_or(true, |c| doc.competencies.iter().any(|t| t == c))
            })
            .filter_map(|(doc, terms)| {
                let overlap = query_terms.iter().filter(|t| terms.contains(*t)).count();
                (overlap > 0).then(|| RankedDocument {
                    excerpt: excerpt(&doc.text),
                    source_id: doc.source_id.clone(),
                    score: overlap as f64 / query_terms.len() as f64,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.source_id.cmp(&b.source_id))
        });
        hits.truncate(k);
        hits
    }
}

const EXCERPT_CHARS: usize = 240;

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
}
