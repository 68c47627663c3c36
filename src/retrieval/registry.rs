//! Pattern dispatch over a [`GraphStore`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{GraphStore, ScoredChunk};
use crate::retrieval::pattern::{PatternKind, RetrievalPattern};
use crate::retrieval::{sort_results, SearchOrigin, SearchResult};

/// Per-position decay applied to children of a matched parent. Monotone
/// non-increasing in position.
pub const CHILD_DECAY: f32 = 0.85;

pub struct PatternRegistry {
    store: Arc<dyn GraphStore>,
}

impl PatternRegistry {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Execute one retrieval pattern. Advanced patterns are refused up front
    /// when the store lacks graph analytics; they never degrade to basic
    /// search silently.
    pub async fn execute(
        &self,
        pattern: &RetrievalPattern,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(Error::Validation("limit must be positive".to_string()));
        }

        let kind = pattern.kind();
        if kind.requires_graph_capability() && !self.store.graph_capability_available() {
            return Err(Error::CapabilityUnavailable(match kind {
                PatternKind::Local => "local search",
                PatternKind::GraphEnhanced => "graph-enhanced search",
                _ => "community summaries",
            }));
        }

        debug!(pattern = %kind, query, limit, "dispatching retrieval pattern");

        let results = match pattern {
            RetrievalPattern::Basic => {
                let hits = self
                    .store
                    .text_search(query, &HashMap::new(), limit)
                    .await?;
                to_results(hits, kind)
            }
            RetrievalPattern::MetadataFiltering { filters } => {
                let hits = self.store.text_search(query, filters, limit).await?;
                to_results(hits, kind)
            }
            RetrievalPattern::ParentChild {
                parent_label,
                child_label,
            } => {
                self.parent_child(query, parent_label, child_label, limit)
                    .await?
            }
            RetrievalPattern::Local {
                community_threshold,
                max_depth,
            } => to_results(
                self.store
                    .local_search(query, *community_threshold, *max_depth, limit)
                    .await?,
                kind,
            ),
            RetrievalPattern::GraphEnhanced { max_traversal_depth } => to_results(
                self.store
                    .graph_enhanced_search(query, *max_traversal_depth, limit)
                    .await?,
                kind,
            ),
            RetrievalPattern::CommunitySummary { community_threshold } => to_results(
                self.store
                    .community_summaries(query, *community_threshold, limit)
                    .await?,
                kind,
            ),
        };

        Ok(results)
    }

    /// Match parents by full text, then surface their children with the
    /// parent score decayed per child position.
    async fn parent_child(
        &self,
        query: &str,
        parent_label: &str,
        child_label: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let parents = self.store.parent_search(query, parent_label, limit).await?;

        let mut results = Vec::new();
        for parent in parents {
            let children = self
                .store
                .children_of(&parent.document_id, child_label)
                .await?;
            for (position, chunk) in children.into_iter().enumerate() {
                results.push(SearchResult {
                    chunk_id: chunk.id,
                    content: chunk.content,
                    score: parent.score * CHILD_DECAY.powi(position as i32),
                    source_pattern: SearchOrigin::Pattern(PatternKind::ParentChild),
                });
            }
        }

        sort_results(&mut results);
        results.truncate(limit);
        Ok(results)
    }
}

fn to_results(hits: Vec<ScoredChunk>, kind: PatternKind) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = hits
        .into_iter()
        .map(|hit| SearchResult {
            chunk_id: hit.chunk_id,
            content: hit.content,
            score: hit.score.clamp(0.0, 1.0),
            source_pattern: SearchOrigin::Pattern(kind),
        })
        .collect();
    sort_results(&mut results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{Chunk, DocType};
    use crate::document::Document;
    use crate::graph::{GraphFragment, InMemoryGraphStore};

    async fn seeded_registry() -> PatternRegistry {
        let store = Arc::new(InMemoryGraphStore::new());
        let doc = Document::new(
            "graph retrieval notes with chunking details",
            DocType::Plain,
        )
        .with_metadata("topic", "retrieval");
        let chunks = vec![
            Chunk {
                id: "k1".to_string(),
                parent_document_id: doc.id.clone(),
                sequence_index: 0,
                content: "Graph retrieval notes live here.".to_string(),
                start_offset: 0,
                end_offset: 32,
            },
            Chunk {
                id: "k2".to_string(),
                parent_document_id: doc.id.clone(),
                sequence_index: 1,
                content: "Chunking details follow in this part.".to_string(),
                start_offset: 0,
                end_offset: 37,
            },
        ];
        store
            .upsert_document(&doc, &chunks, &[], &GraphFragment::default())
            .await
            .unwrap();
        PatternRegistry::new(store)
    }

    #[tokio::test]
    async fn test_basic_pattern_returns_text_hits() {
        let registry = seeded_registry().await;
        let results = registry
            .execute(&RetrievalPattern::Basic, "retrieval notes", 10)
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].chunk_id, "k1");
        assert_eq!(
            results[0].source_pattern,
            SearchOrigin::Pattern(PatternKind::Basic)
        );
    }

    #[tokio::test]
    async fn test_metadata_pattern_with_no_matches_is_empty_not_error() {
        let registry = seeded_registry().await;
        let mut filters = HashMap::new();
        filters.insert("topic".to_string(), "unrelated".to_string());
        let results = registry
            .execute(
                &RetrievalPattern::MetadataFiltering { filters },
                "retrieval",
                10,
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_parent_child_decays_by_position() {
        let registry = seeded_registry().await;
        let pattern = RetrievalPattern::from_kind(PatternKind::ParentChild, HashMap::new()).unwrap();
        let results = registry
            .execute(&pattern, "chunking retrieval", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        // First child carries the parent score, the second one decay step.
        assert_eq!(results[0].chunk_id, "k1");
        assert!((results[1].score / results[0].score - CHILD_DECAY).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_advanced_patterns_refused_without_capability() {
        let registry = seeded_registry().await;
        for kind in [
            PatternKind::Local,
            PatternKind::GraphEnhanced,
            PatternKind::CommunitySummary,
        ] {
            let pattern = RetrievalPattern::from_kind(kind, HashMap::new()).unwrap();
            let err = registry.execute(&pattern, "anything", 5).await.unwrap_err();
            assert!(matches!(err, Error::CapabilityUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_dispatch() {
        let registry = seeded_registry().await;
        let err = registry
            .execute(&RetrievalPattern::Basic, "   ", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
