//! Quality scoring for chunking runs.

use serde::{Deserialize, Serialize};

use crate::chunking::{Chunk, ChunkingConfig, ChunkingMetrics};
use crate::error::{Error, Result};

/// Relative weight of each quality component. Defaults sum to 1.0; the
/// combined score divides by the weight sum, so any non-negative weighting
/// with at least one positive entry is usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub sentence_completeness: f64,
    pub paragraph_preservation: f64,
    pub size_consistency: f64,
    pub count_efficiency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sentence_completeness: 0.30,
            paragraph_preservation: 0.30,
            size_consistency: 0.20,
            count_efficiency: 0.20,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.sentence_completeness,
            self.paragraph_preservation,
            self.size_consistency,
            self.count_efficiency,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Validation(
                "score weights must be non-negative".to_string(),
            ));
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err(Error::Validation(
                "at least one score weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn sum(&self) -> f64 {
        self.sentence_completeness
            + self.paragraph_preservation
            + self.size_consistency
            + self.count_efficiency
    }
}

/// The four quality components, each in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreComponents {
    pub sentence_completeness: f64,
    pub paragraph_preservation: f64,
    pub size_consistency: f64,
    pub count_efficiency: f64,
}

/// Compute metrics and score components for one chunking run.
pub fn evaluate(
    text: &str,
    chunks: &[Chunk],
    config: &ChunkingConfig,
) -> (ChunkingMetrics, ScoreComponents) {
    if chunks.is_empty() {
        return (ChunkingMetrics::default(), ScoreComponents::default());
    }

    let sizes: Vec<f64> = chunks.iter().map(|c| c.content.len() as f64).collect();
    let n = sizes.len() as f64;
    let mean = sizes.iter().sum::<f64>() / n;

    let complete_sentences = chunks
        .iter()
        .filter(|c| ends_at_sentence(text, c))
        .count() as f64;
    let preserved_paragraphs = chunks
        .iter()
        .filter(|c| paragraph_preserved(text, c.end_offset))
        .count() as f64;

    let metrics = ChunkingMetrics {
        num_chunks: chunks.len(),
        avg_chunk_size: mean,
        min_chunk_size: chunks.iter().map(|c| c.content.len()).min().unwrap_or(0),
        max_chunk_size: chunks.iter().map(|c| c.content.len()).max().unwrap_or(0),
        avg_sentence_completeness: complete_sentences / n,
        avg_paragraph_preservation: preserved_paragraphs / n,
    };

    let components = ScoreComponents {
        sentence_completeness: metrics.avg_sentence_completeness,
        paragraph_preservation: metrics.avg_paragraph_preservation,
        size_consistency: size_consistency(&sizes, mean),
        count_efficiency: count_efficiency(text.len(), chunks.len(), config.chunk_size),
    };

    (metrics, components)
}

/// Weighted combination of the components, always in [0, 1] and monotone
/// non-decreasing in each component.
pub fn score(components: &ScoreComponents, weights: &ScoreWeights) -> f64 {
    let weighted = weights.sentence_completeness * components.sentence_completeness
        + weights.paragraph_preservation * components.paragraph_preservation
        + weights.size_consistency * components.size_consistency
        + weights.count_efficiency * components.count_efficiency;
    (weighted / weights.sum()).clamp(0.0, 1.0)
}

/// A chunk ends cleanly if its trailing text closes a sentence, or it is the
/// final chunk of the document.
fn ends_at_sentence(text: &str, chunk: &Chunk) -> bool {
    if chunk.end_offset == text.len() {
        return true;
    }
    matches!(
        chunk.content.trim_end().chars().last(),
        Some('.' | '!' | '?')
    )
}

/// A chunk boundary preserves paragraphs when it falls on a blank line or at
/// the end of the document.
fn paragraph_preserved(text: &str, end: usize) -> bool {
    end == text.len()
        || text[..end].ends_with("\n\n")
        || (text[..end].ends_with('\n') && text[end..].starts_with('\n'))
}

/// `1 - cv` where cv is the coefficient of variation of chunk sizes, clamped
/// into [0, 1]. A single chunk is perfectly consistent.
fn size_consistency(sizes: &[f64], mean: f64) -> f64 {
    if sizes.len() < 2 || mean <= 0.0 {
        return 1.0;
    }
    let variance = sizes.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / sizes.len() as f64;
    let cv = variance.sqrt() / mean;
    1.0 - cv.clamp(0.0, 1.0)
}

/// Penalize chunk counts far from the expected `ceil(len / chunk_size)`.
fn count_efficiency(text_len: usize, num_chunks: usize, chunk_size: usize) -> f64 {
    let target = text_len.div_ceil(chunk_size).max(1) as f64;
    let deviation = (num_chunks as f64 - target).abs() / target;
    1.0 / (1.0 + deviation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{strategies, StrategyId};

    fn chunks_for(text: &str, strategy: StrategyId, size: usize, overlap: usize) -> Vec<Chunk> {
        let config = ChunkingConfig::new(strategy, size, overlap).unwrap();
        strategies::chunk_text("doc", text, &config)
    }

    #[test]
    fn test_score_is_bounded() {
        let weights = ScoreWeights::default();
        let zero = ScoreComponents::default();
        let full = ScoreComponents {
            sentence_completeness: 1.0,
            paragraph_preservation: 1.0,
            size_consistency: 1.0,
            count_efficiency: 1.0,
        };
        assert_eq!(score(&zero, &weights), 0.0);
        assert_eq!(score(&full, &weights), 1.0);
    }

    #[test]
    fn test_score_is_monotone_in_each_component() {
        let weights = ScoreWeights::default();
        let base = ScoreComponents {
            sentence_completeness: 0.4,
            paragraph_preservation: 0.5,
            size_consistency: 0.6,
            count_efficiency: 0.7,
        };
        let base_score = score(&base, &weights);

        for bump in 0..4 {
            let mut raised = base;
            match bump {
                0 => raised.sentence_completeness += 0.2,
                1 => raised.paragraph_preservation += 0.2,
                2 => raised.size_consistency += 0.2,
                _ => raised.count_efficiency += 0.2,
            }
            assert!(score(&raised, &weights) > base_score);
        }
    }

    #[test]
    fn test_single_chunk_is_fully_consistent() {
        let text = "One sentence here.";
        let config = ChunkingConfig::new(StrategyId::FixedSize, 100, 20).unwrap();
        let chunks = chunks_for(text, StrategyId::FixedSize, 100, 20);
        let (metrics, components) = evaluate(text, &chunks, &config);
        assert_eq!(metrics.num_chunks, 1);
        assert_eq!(components.size_consistency, 1.0);
        assert_eq!(components.sentence_completeness, 1.0);
    }

    #[test]
    fn test_paragraph_cuts_score_higher_than_mid_word_cuts() {
        let text = "First paragraph with a few sentences. It keeps going for a while here.\n\nSecond paragraph follows after the break. It also has content worth reading.\n\nThird paragraph closes the document. Final sentence ends it.\n";
        let config_fixed = ChunkingConfig::new(StrategyId::FixedSize, 80, 16).unwrap();
        let config_rec = ChunkingConfig::new(StrategyId::RecursiveCharacter, 80, 16).unwrap();

        let fixed = strategies::chunk_text("doc", text, &config_fixed);
        let recursive = strategies::chunk_text("doc", text, &config_rec);

        let (_, fixed_components) = evaluate(text, &fixed, &config_fixed);
        let (_, rec_components) = evaluate(text, &recursive, &config_rec);
        let weights = ScoreWeights::default();
        assert!(score(&rec_components, &weights) >= score(&fixed_components, &weights));
    }

    #[test]
    fn test_empty_chunk_list_scores_zero() {
        let config = ChunkingConfig::new(StrategyId::FixedSize, 100, 20).unwrap();
        let (metrics, components) = evaluate("", &[], &config);
        assert_eq!(metrics.num_chunks, 0);
        assert_eq!(score(&components, &ScoreWeights::default()), 0.0);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let negative = ScoreWeights {
            sentence_completeness: -0.1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let all_zero = ScoreWeights {
            sentence_completeness: 0.0,
            paragraph_preservation: 0.0,
            size_consistency: 0.0,
            count_efficiency: 0.0,
        };
        assert!(all_zero.validate().is_err());
    }
}
