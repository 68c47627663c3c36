//! Fusing text and vector relevance scores into one ranking.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::ScoredChunk;
use crate::retrieval::{sort_results, SearchOrigin, SearchResult};

/// Caller-supplied weights for the two sources. Validated non-negative with
/// at least one positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    pub text_weight: f32,
    pub vector_weight: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text_weight: 0.5,
            vector_weight: 0.5,
        }
    }
}

impl FusionWeights {
    pub fn new(text_weight: f32, vector_weight: f32) -> Result<Self> {
        let weights = Self {
            text_weight,
            vector_weight,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.text_weight.is_finite()
            || !self.vector_weight.is_finite()
            || self.text_weight < 0.0
            || self.vector_weight < 0.0
        {
            return Err(Error::Validation(
                "fusion weights must be non-negative".to_string(),
            ));
        }
        if self.text_weight + self.vector_weight <= 0.0 {
            return Err(Error::Validation(
                "at least one fusion weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn sum(&self) -> f32 {
        self.text_weight + self.vector_weight
    }
}

/// What a hybrid query does when one of its two sub-queries fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Fail the whole request.
    FailFast,
    /// Continue with the surviving source alone.
    Degrade,
}

/// Min-max normalize scores into [0, 1] in place. Lists where every score is
/// equal (including singletons) normalize to 1.0.
pub fn normalize_scores(hits: &mut [ScoredChunk]) {
    if hits.is_empty() {
        return;
    }
    let min = hits.iter().map(|h| h.score).fold(f32::INFINITY, f32::min);
    let max = hits
        .iter()
        .map(|h| h.score)
        .fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    for hit in hits {
        hit.score = if range <= f32::EPSILON {
            1.0
        } else {
            (hit.score - min) / range
        };
    }
}

/// Combine text and vector hits into one ranking.
///
/// Each list is normalized independently; a chunk missing from a list
/// contributes 0.0 for that source. The combined score is the weighted sum
/// divided by the weight sum, so it stays in [0, 1].
pub fn fuse(
    mut text_hits: Vec<ScoredChunk>,
    mut vector_hits: Vec<ScoredChunk>,
    weights: &FusionWeights,
    limit: usize,
) -> Vec<SearchResult> {
    normalize_scores(&mut text_hits);
    normalize_scores(&mut vector_hits);

    struct Entry {
        content: String,
        text: f32,
        vector: f32,
    }
    let mut combined: std::collections::HashMap<String, Entry> = std::collections::HashMap::new();

    for hit in text_hits {
        combined.insert(
            hit.chunk_id,
            Entry {
                content: hit.content,
                text: hit.score,
                vector: 0.0,
            },
        );
    }
    for hit in vector_hits {
        combined
            .entry(hit.chunk_id)
            .and_modify(|e| e.vector = hit.score)
            .or_insert(Entry {
                content: hit.content,
                text: 0.0,
                vector: hit.score,
            });
    }

    let weight_sum = weights.sum();
    let mut results: Vec<SearchResult> = combined
        .into_iter()
        .map(|(chunk_id, entry)| SearchResult {
            chunk_id,
            content: entry.content,
            score: ((weights.text_weight * entry.text + weights.vector_weight * entry.vector)
                / weight_sum)
                .clamp(0.0, 1.0),
            source_pattern: SearchOrigin::Hybrid,
        })
        .collect();

    sort_results(&mut results);
    results.truncate(limit);
    results
}
