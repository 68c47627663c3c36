pub mod fusion;
pub mod pattern;
pub mod registry;


use serde::{Deserialize, Serialize};

pub use fusion::{FallbackPolicy, FusionWeights};
pub use pattern::{PatternKind, RetrievalPattern};
pub use registry::PatternRegistry;

/// Where a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrigin {
    Pattern(PatternKind),
    Hybrid,
}

impl std::fmt::Display for SearchOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchOrigin::Pattern(kind) => write!(f, "{}", kind),
            SearchOrigin::Hybrid => f.write_str("hybrid"),
        }
    }
}

/// One ranked hit. Scores are in [0, 1]; ordering is descending score with
/// ascending chunk id breaking ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub content: String,
    pub score: f32,
    pub source_pattern: SearchOrigin,
}

/// Shared final ordering for every retrieval path.
pub(crate) fn sort_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
}
