use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type DocId = usize;

/// Similarity method the service ranks documents with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Cosine, Metric::Euclidean];

    /// Wire value sent as `metric`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cosine => "Cosine similarity",
            Self::Euclidean => "Euclidean distance",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown metric {s:?}, expected cosine or euclidean"))
    }
}

#[derive(Debug, Serialize)]
pub struct IndexRequest<'a> {
    pub documents: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub metric: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: u64,
    pub score: f64,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Absent and `null` both mean no results.
    #[serde(default)]
    pub results: Option<Vec<SearchHit>>,
}

impl SearchResponse {
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.results.unwrap_or_default()
    }
}

/// Per-document term frequencies.
///
/// The service sends a list indexed by document position; a map keyed by the
/// stringified document id is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermFrequencies {
    Rows(Vec<IndexMap<String, f64>>),
    Keyed(IndexMap<String, IndexMap<String, f64>>),
}

impl TermFrequencies {
    pub fn row(&self, doc: DocId) -> Option<&IndexMap<String, f64>> {
        match self {
            Self::Rows(rows) => rows.get(doc),
            Self::Keyed(map) => map.get(&doc.to_string()),
        }
    }
}

impl Default for TermFrequencies {
    fn default() -> Self {
        Self::Rows(Vec::new())
    }
}

/// Full state of the built index as returned by `GET /view-index/`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Position is the document id; the values themselves are not displayed.
    pub documents: Vec<serde_json::Value>,
    pub tf: TermFrequencies,
    pub idf: IndexMap<String, f64>,
    /// Key order drives the row order of both tables.
    pub tfidf: IndexMap<String, Vec<f64>>,
}

impl IndexSnapshot {
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
