pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chunking::Chunk;
use crate::document::Document;
use crate::error::{Error, Result};

pub use memory::InMemoryGraphStore;

/// An extracted entity node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub label: String,
}

/// A directed relationship between two extracted nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub source: String,
    pub target: String,
    pub rel_type: String,
}

/// Nodes and relationships extracted from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFragment {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

/// Store-wide counters for the stats surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub documents: usize,
    pub chunks: usize,
    pub nodes: usize,
    pub relationships: usize,
    pub oldest_indexed: Option<chrono::DateTime<chrono::Utc>>,
    pub newest_indexed: Option<chrono::DateTime<chrono::Utc>>,
}

/// A chunk hit with its raw store score. Scores from different search paths
/// are on different scales; fusion normalizes before combining.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub content: String,
    pub score: f32,
}

/// A parent-level hit for the parent/child retrieval pattern.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document_id: String,
    pub score: f32,
}

/// Entity/relationship extraction collaborator. LLM-backed extractors live
/// outside this crate; failures surface per document, never per batch.
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<GraphFragment>;
}

/// Graph persistence collaborator.
///
/// The advanced search methods have unsupported defaults; stores that report
/// `graph_capability_available() == false` keep them and the pattern layer
/// refuses the request before dispatch.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Persist a document with its chunks, embeddings and extracted graph
    /// fragment as one atomic unit.
    async fn upsert_document(
        &self,
        document: &Document,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
        fragment: &GraphFragment,
    ) -> Result<()>;

    /// Full-text chunk search. `filters` are exact-match metadata
    /// predicates, all of which must hold.
    async fn text_search(
        &self,
        query: &str,
        filters: &HashMap<String, String>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Nearest-neighbour chunk search over stored embeddings.
    async fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Document-level full-text search for the parent/child pattern. The
    /// label selects the parent node kind in graph backends.
    async fn parent_search(
        &self,
        query: &str,
        parent_label: &str,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>>;

    /// Chunks of one document in sequence order, restricted to the child
    /// node kind in graph backends.
    async fn children_of(&self, document_id: &str, child_label: &str) -> Result<Vec<Chunk>>;

    /// Whether graph-analytics searches (local, graph-enhanced, community)
    /// are supported.
    fn graph_capability_available(&self) -> bool;

    async fn local_search(
        &self,
        _query: &str,
        _community_threshold: usize,
        _max_depth: usize,
        _limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        Err(Error::CapabilityUnavailable("local search"))
    }

    async fn graph_enhanced_search(
        &self,
        _query: &str,
        _max_traversal_depth: usize,
        _limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        Err(Error::CapabilityUnavailable("graph-enhanced search"))
    }

    async fn community_summaries(
        &self,
        _query: &str,
        _community_threshold: usize,
        _limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        Err(Error::CapabilityUnavailable("community summaries"))
    }

    async fn stats(&self) -> Result<GraphStats>;
}

/// Deterministic extractor used by the CLI and tests.
///
/// Treats capitalized multi-character terms as entities and links terms that
/// co-occur in the same sentence. Vocabulary lists, when non-empty, restrict
/// the labels and relationship types it may emit.
pub struct HeuristicExtractor;

#[async_trait]
impl GraphExtractor for HeuristicExtractor {
    async fn extract(
        &self,
        text: &str,
        allowed_nodes: &[String],
        allowed_relationships: &[String],
    ) -> Result<GraphFragment> {
        let label = pick_allowed(allowed_nodes, "Entity")?;
        let rel_type = pick_allowed(allowed_relationships, "RELATED_TO")?;

        let mut fragment = GraphFragment::default();
        let mut seen: Vec<String> = Vec::new();

        for sentence in text.split_terminator(['.', '!', '?', '\n']) {
            let mut in_sentence: Vec<String> = Vec::new();
            for word in sentence.split_whitespace() {
                let term: String = word
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_string();
                if term.len() < 2 || !term.chars().next().is_some_and(|c| c.is_uppercase()) {
                    continue;
                }
                if !seen.contains(&term) {
                    seen.push(term.clone());
                    fragment.nodes.push(GraphNode {
                        name: term.clone(),
                        label: label.clone(),
                    });
                }
                if !in_sentence.contains(&term) {
                    in_sentence.push(term);
                }
            }
            for pair in in_sentence.windows(2) {
                fragment.relationships.push(GraphRelationship {
                    source: pair[0].clone(),
                    target: pair[1].clone(),
                    rel_type: rel_type.clone(),
                });
            }
        }

        Ok(fragment)
    }
}

fn pick_allowed(allowed: &[String], default: &str) -> Result<String> {
    if allowed.is_empty() {
        return Ok(default.to_string());
    }
    if let Some(found) = allowed.iter().find(|a| a.as_str() == default) {
        return Ok(found.clone());
    }
    allowed
        .first()
        .cloned()
        .ok_or_else(|| Error::Extraction("empty vocabulary".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_heuristic_extractor_finds_capitalized_terms() {
        let fragment = HeuristicExtractor
            .extract("Alice met Bob in Paris. Later Alice left.", &[], &[])
            .await
            .unwrap();
        let names: Vec<&str> = fragment.nodes.iter().map(|n| n.name.as_str()).collect();
        assert!(names.contains(&"Alice"));
        assert!(names.contains(&"Bob"));
        assert!(names.contains(&"Paris"));
        // Alice appears twice but is one node.
        assert_eq!(names.iter().filter(|n| **n == "Alice").count(), 1);
        assert!(!fragment.relationships.is_empty());
        assert_eq!(fragment.relationships[0].rel_type, "RELATED_TO");
    }

    #[tokio::test]
    async fn test_extractor_respects_vocabulary() {
        let fragment = HeuristicExtractor
            .extract(
                "Rust powers Octograph.",
                &["Technology".to_string()],
                &["USES".to_string()],
            )
            .await
            .unwrap();
        assert!(fragment.nodes.iter().all(|n| n.label == "Technology"));
        assert!(fragment
            .relationships
            .iter()
            .all(|r| r.rel_type == "USES"));
    }

    #[tokio::test]
    async fn test_extractor_empty_text() {
        let fragment = HeuristicExtractor.extract("", &[], &[]).await.unwrap();
        assert!(fragment.nodes.is_empty());
        assert!(fragment.relationships.is_empty());
    }
}
