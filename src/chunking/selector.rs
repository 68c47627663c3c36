//! Strategy selection: a static fast path keyed on document type, and a full
//! evaluation mode that runs every applicable strategy and keeps the best
//! scoring one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunking::{
    evaluator, strategies, Chunk, ChunkingConfig, ChunkingMetrics, ChunkingResult, DocType,
    ScoreWeights, StrategyId, StructureProfile,
};
use crate::document::Document;
use crate::error::Result;

/// Derive a chunk size from document length: one twentieth of the byte
/// length, clamped into [256, 2048].
pub fn derived_chunk_size(text_len: usize) -> usize {
    (text_len / 20).clamp(256, 2048)
}

/// Overlap is a fifth of the chunk size.
pub fn derived_overlap(chunk_size: usize) -> usize {
    chunk_size / 5
}

/// One line of the alternatives table in a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyScore {
    pub strategy: StrategyId,
    pub quality_score: f64,
    pub num_chunks: usize,
    pub avg_chunk_size: f64,
}

/// Outcome of `suggest_chunking_strategy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingRecommendation {
    pub strategy: StrategyId,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub explanation: String,
    pub quality_score: f64,
    pub alternatives: Vec<StrategyScore>,
    pub metrics: ChunkingMetrics,
}

/// Full selection outcome, including the winning chunks for ingestion.
#[derive(Debug, Clone)]
pub struct Selection {
    pub result: ChunkingResult,
    pub alternatives: Vec<StrategyScore>,
    pub profile: StructureProfile,
}

pub struct StrategySelector {
    weights: ScoreWeights,
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl StrategySelector {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Static document-type mapping used when `evaluate_all` is off.
    pub fn fast_strategy(doc_type: DocType) -> StrategyId {
        match doc_type {
            DocType::Markdown => StrategyId::MarkdownHeader,
            DocType::Code => StrategyId::LanguageSpecific,
            DocType::Plain => StrategyId::RecursiveCharacter,
        }
    }

    /// Select a strategy and chunk the document with it.
    ///
    /// Never fails for non-empty text; empty text yields a zero-chunk result.
    /// Explicit sizes are validated, missing ones derived from length.
    pub fn select(
        &self,
        document: &Document,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
        evaluate_all: bool,
    ) -> Result<Selection> {
        self.weights.validate()?;
        let profile = StructureProfile::analyze(&document.raw_text, document.content_type);

        let size = chunk_size.unwrap_or_else(|| derived_chunk_size(document.raw_text.len()));
        let overlap = chunk_overlap.unwrap_or_else(|| derived_overlap(size));

        if evaluate_all {
            self.evaluate_all(document, &profile, size, overlap)
        } else {
            let strategy = Self::fast_strategy(document.content_type);
            let config = ChunkingConfig::new(strategy, size, overlap)?;
            let result = self.run_one(document, &config);
            debug!(
                strategy = %strategy,
                chunks = result.metrics.num_chunks,
                "fast-path chunking"
            );
            Ok(Selection {
                result,
                alternatives: Vec::new(),
                profile,
            })
        }
    }

    /// Produce a recommendation with explanation and alternatives.
    pub fn recommend(
        &self,
        document: &Document,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
        evaluate_all: bool,
    ) -> Result<ChunkingRecommendation> {
        let selection = self.select(document, chunk_size, chunk_overlap, evaluate_all)?;
        let explanation = explain(&selection, document.raw_text.len());
        let result = selection.result;
        Ok(ChunkingRecommendation {
            strategy: result.strategy,
            chunk_size: result.config.chunk_size,
            chunk_overlap: result.config.chunk_overlap,
            explanation,
            quality_score: result.quality_score,
            alternatives: selection.alternatives,
            metrics: result.metrics,
        })
    }

    fn evaluate_all(
        &self,
        document: &Document,
        profile: &StructureProfile,
        size: usize,
        overlap: usize,
    ) -> Result<Selection> {
        let mut candidates: Vec<ChunkingResult> = Vec::new();
        for strategy in StrategyId::all() {
            if !strategy.applicable_to(document.content_type) {
                continue;
            }
            let config = ChunkingConfig::new(strategy, size, overlap)?;
            candidates.push(self.run_one(document, &config));
        }

        // Max score wins; ties go to fewer chunks, then declared priority.
        candidates.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.metrics.num_chunks.cmp(&b.metrics.num_chunks))
                .then(a.strategy.priority().cmp(&b.strategy.priority()))
        });

        let alternatives: Vec<StrategyScore> = candidates
            .iter()
            .map(|c| StrategyScore {
                strategy: c.strategy,
                quality_score: c.quality_score,
                num_chunks: c.metrics.num_chunks,
                avg_chunk_size: c.metrics.avg_chunk_size,
            })
            .collect();

        let mut candidates = candidates;
        let result = candidates.remove(0);
        debug!(
            strategy = %result.strategy,
            score = result.quality_score,
            evaluated = alternatives.len(),
            "full-evaluation chunking"
        );

        Ok(Selection {
            result,
            alternatives,
            profile: profile.clone(),
        })
    }

    fn run_one(&self, document: &Document, config: &ChunkingConfig) -> ChunkingResult {
        let chunks: Vec<Chunk> = strategies::chunk_text(&document.id, &document.raw_text, config);
        let (metrics, components) = evaluator::evaluate(&document.raw_text, &chunks, config);
        let quality_score = if chunks.is_empty() {
            0.0
        } else {
            evaluator::score(&components, &self.weights)
        };
        ChunkingResult {
            strategy: config.strategy,
            config: config.clone(),
            metrics,
            chunks,
            quality_score,
        }
    }
}

/// Human-readable rationale for a selection, in the shape the suggestion
/// surface reports to users.
fn explain(selection: &Selection, text_len: usize) -> String {
    let result = &selection.result;
    let profile = &selection.profile;

    let rationale = match result.strategy {
        StrategyId::MarkdownHeader => "Markdown headers provide natural section boundaries.",
        StrategyId::LanguageSpecific => "Top-level definitions provide natural code boundaries.",
        StrategyId::RecursiveCharacter => {
            "Paragraph and sentence breaks give the cleanest general-purpose splits."
        }
        StrategyId::FixedSize => "Uniform windows fit this document best.",
    };

    let mut lines = vec![
        format!("Recommended strategy: {}", result.strategy),
        format!(
            "Document: {} bytes, type {} ({} headers, {} paragraphs, {} code blocks)",
            text_len,
            profile.doc_type.as_str(),
            profile.header_count,
            profile.paragraph_count,
            profile.code_block_count
        ),
        format!(
            "Configuration: chunk_size {} with overlap {}",
            result.config.chunk_size, result.config.chunk_overlap
        ),
        format!(
            "Expected output: {} chunks, average {:.0} bytes",
            result.metrics.num_chunks, result.metrics.avg_chunk_size
        ),
        format!(
            "Quality score: {:.3} (sentence completeness {:.2}, paragraph preservation {:.2})",
            result.quality_score,
            result.metrics.avg_sentence_completeness,
            result.metrics.avg_paragraph_preservation
        ),
        rationale.to_string(),
    ];

    if !selection.alternatives.is_empty() {
        lines.push(format!(
            "Evaluated {} strategies; closest alternative: {}",
            selection.alternatives.len(),
            selection
                .alternatives
                .get(1)
                .map(|a| format!("{} ({:.3})", a.strategy, a.quality_score))
                .unwrap_or_else(|| "none".to_string())
        ));
    }

    lines.join("\n")
}
