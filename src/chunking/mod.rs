pub mod evaluator;
pub mod profiler;
pub mod selector;
pub mod strategies;

#[cfg(test)]
mod roundtrip_tests;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use evaluator::{ScoreComponents, ScoreWeights};
pub use profiler::StructureProfile;
pub use selector::{ChunkingRecommendation, StrategyScore, StrategySelector};

/// Document content classification used by the profiler and the selector
/// fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Markdown,
    Code,
    Plain,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Markdown => "markdown",
            DocType::Code => "code",
            DocType::Plain => "plain",
        }
    }
}

/// Chunking strategies, ordered by declared tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    MarkdownHeader,
    LanguageSpecific,
    RecursiveCharacter,
    FixedSize,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::MarkdownHeader => "markdown_header",
            StrategyId::LanguageSpecific => "language_specific",
            StrategyId::RecursiveCharacter => "recursive_character",
            StrategyId::FixedSize => "fixed_size",
        }
    }

    /// Lower value wins ties after score and chunk count are equal.
    pub fn priority(&self) -> u8 {
        match self {
            StrategyId::MarkdownHeader => 0,
            StrategyId::LanguageSpecific => 1,
            StrategyId::RecursiveCharacter => 2,
            StrategyId::FixedSize => 3,
        }
    }

    /// Whether the strategy may be applied to a document of this type.
    /// `fixed_size` and `recursive_character` are universal fallbacks.
    pub fn applicable_to(&self, doc_type: DocType) -> bool {
        match self {
            StrategyId::MarkdownHeader => doc_type == DocType::Markdown,
            StrategyId::LanguageSpecific => doc_type == DocType::Code,
            StrategyId::RecursiveCharacter | StrategyId::FixedSize => true,
        }
    }

    pub fn all() -> [StrategyId; 4] {
        [
            StrategyId::MarkdownHeader,
            StrategyId::LanguageSpecific,
            StrategyId::RecursiveCharacter,
            StrategyId::FixedSize,
        ]
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "markdown_header" | "markdown" => Ok(StrategyId::MarkdownHeader),
            "language_specific" | "code" => Ok(StrategyId::LanguageSpecific),
            "recursive_character" | "recursive" => Ok(StrategyId::RecursiveCharacter),
            "fixed_size" | "fixed" => Ok(StrategyId::FixedSize),
            other => Err(Error::Validation(format!(
                "unknown chunking strategy '{}'",
                other
            ))),
        }
    }
}

/// Validated chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub strategy: StrategyId,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(strategy: StrategyId, chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self {
            strategy,
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Validation("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// One piece of a chunked document. Offsets are byte positions into the
/// original text; `end_offset - start_offset == content.len()` always holds,
/// and concatenating chunks in sequence order while trimming the leading
/// overlap from every chunk after the first reproduces the input exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub parent_document_id: String,
    pub sequence_index: usize,
    pub content: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Aggregate quality metrics over one chunking run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingMetrics {
    pub num_chunks: usize,
    pub avg_chunk_size: f64,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub avg_sentence_completeness: f64,
    pub avg_paragraph_preservation: f64,
}

/// Chunks plus their evaluation, for one strategy applied to one document.
#[derive(Debug, Clone)]
pub struct ChunkingResult {
    pub strategy: StrategyId,
    pub config: ChunkingConfig,
    pub metrics: ChunkingMetrics,
    pub chunks: Vec<Chunk>,
    pub quality_score: f64,
}
