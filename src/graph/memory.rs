//! In-memory reference store: term-frequency text scoring, brute-force
//! cosine over embeddings, no graph analytics.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::chunking::Chunk;
use crate::document::Document;
use crate::error::Result;
use crate::graph::{GraphFragment, GraphStats, GraphStore, ScoredChunk, ScoredDocument};

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Document>,
    chunks: HashMap<String, Chunk>,
    // Chunk ids per document, in sequence order.
    chunk_order: HashMap<String, Vec<String>>,
    embeddings: HashMap<String, Vec<f32>>,
    indexed_at: HashMap<String, DateTime<Utc>>,
    node_count: usize,
    relationship_count: usize,
}

#[derive(Default)]
pub struct InMemoryGraphStore {
    inner: RwLock<Inner>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn upsert_document(
        &self,
        document: &Document,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
        fragment: &GraphFragment,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;

        // Replace any previous version of the document atomically.
        if let Some(old) = inner.chunk_order.remove(&document.id) {
            for chunk_id in old {
                inner.chunks.remove(&chunk_id);
                inner.embeddings.remove(&chunk_id);
            }
        }

        let mut order = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            order.push(chunk.id.clone());
            inner.chunks.insert(chunk.id.clone(), chunk.clone());
            if let Some(embedding) = embeddings.get(i) {
                inner.embeddings.insert(chunk.id.clone(), embedding.clone());
            }
        }
        inner.chunk_order.insert(document.id.clone(), order);
        inner.documents.insert(document.id.clone(), document.clone());
        inner.indexed_at.insert(document.id.clone(), Utc::now());
        inner.node_count += fragment.nodes.len();
        inner.relationship_count += fragment.relationships.len();

        debug!(
            document_id = %document.id,
            chunks = chunks.len(),
            nodes = fragment.nodes.len(),
            "stored document"
        );
        Ok(())
    }

    async fn text_search(
        &self,
        query: &str,
        filters: &HashMap<String, String>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        let mut hits: Vec<ScoredChunk> = Vec::new();

        for chunk in inner.chunks.values() {
            if !filters.is_empty() {
                let doc = inner.documents.get(&chunk.parent_document_id);
                let matches_all = doc.is_some_and(|d| {
                    filters
                        .iter()
                        .all(|(k, v)| d.metadata.get(k).is_some_and(|m| m == v))
                });
                if !matches_all {
                    continue;
                }
            }

            let score = score_text(&chunk.content, &query_tokens);
            if score > 0.0 {
                hits.push(ScoredChunk {
                    chunk_id: chunk.id.clone(),
                    content: chunk.content.clone(),
                    score,
                });
            }
        }

        sort_and_truncate(&mut hits, limit);
        Ok(hits)
    }

    async fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let inner = self.inner.read().await;
        let mut hits: Vec<ScoredChunk> = inner
            .embeddings
            .iter()
            .filter_map(|(chunk_id, embedding)| {
                let score = cosine_similarity(vector, embedding).max(0.0);
                if score <= 0.0 {
                    return None;
                }
                inner.chunks.get(chunk_id).map(|chunk| ScoredChunk {
                    chunk_id: chunk_id.clone(),
                    content: chunk.content.clone(),
                    score,
                })
            })
            .collect();

        sort_and_truncate(&mut hits, limit);
        Ok(hits)
    }

    // Documents are the only parent level here; the labels steer real graph
    // backends.
    async fn parent_search(
        &self,
        query: &str,
        _parent_label: &str,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        let mut hits: Vec<ScoredDocument> = inner
            .documents
            .values()
            .filter_map(|doc| {
                let score = score_text(&doc.raw_text, &query_tokens);
                (score > 0.0).then(|| ScoredDocument {
                    document_id: doc.id.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn children_of(&self, document_id: &str, _child_label: &str) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        let chunks = inner
            .chunk_order
            .get(document_id)
            .map(|order| {
                order
                    .iter()
                    .filter_map(|id| inner.chunks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(chunks)
    }

    fn graph_capability_available(&self) -> bool {
        false
    }

    async fn stats(&self) -> Result<GraphStats> {
        let inner = self.inner.read().await;
        Ok(GraphStats {
            documents: inner.documents.len(),
            chunks: inner.chunks.len(),
            nodes: inner.node_count,
            relationships: inner.relationship_count,
            oldest_indexed: inner.indexed_at.values().min().copied(),
            newest_indexed: inner.indexed_at.values().max().copied(),
        })
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Fraction of query tokens present, with term frequency dampened at 3.
/// Always in [0, 1].
fn score_text(content: &str, query_tokens: &[String]) -> f32 {
    let content_tokens = tokenize(content);
    if content_tokens.is_empty() {
        return 0.0;
    }

    let mut matched = 0.0f32;
    for token in query_tokens {
        let tf = content_tokens.iter().filter(|t| *t == token).count();
        matched += (tf.min(3) as f32) / 3.0;
    }
    matched / query_tokens.len() as f32
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn sort_and_truncate(hits: &mut Vec<ScoredChunk>, limit: usize) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    hits.truncate(limit);
}
