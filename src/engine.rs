// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The engine facade wiring chunking, extraction, embedding and retrieval
//! over the collaborator traits.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::{ChunkingRecommendation, StrategySelector};
use crate::config::Config;
use crate::document::{Document, DocumentLoader, FsDocumentLoader};
use crate::embedding::{embed_batch, EmbeddingProvider, HashEmbedding};
use crate::error::{Error, Result};
use crate::graph::{GraphExtractor, GraphStats, GraphStore, HeuristicExtractor, InMemoryGraphStore};
use crate::ingest::{run_batches, BatchOptions, BatchReport, CancelFlag, IngestSummary};
use crate::retrieval::{
    fusion, FallbackPolicy, FusionWeights, PatternRegistry, RetrievalPattern, SearchResult,
};
use crate::schema::GraphSchema;

pub struct GraphEngine {
    config: Config,
    loader: Box<dyn DocumentLoader>,
    extractor: Box<dyn GraphExtractor>,
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn GraphStore>,
    registry: PatternRegistry,
    selector: StrategySelector,
    schema: GraphSchema,
}

impl GraphEngine {
    /// Engine with the bundled collaborators: filesystem loader, heuristic
    /// extractor, hash embedder, in-memory store.
    pub fn new(config: Config) -> Self {
        let embedding = Arc::new(HashEmbedding::new(config.embedding.dimensions));
        Self::with_collaborators(
            config,
            Box::new(FsDocumentLoader),
            Box::new(HeuristicExtractor),
            embedding,
            Arc::new(InMemoryGraphStore::new()),
        )
    }

    pub fn with_collaborators(
        config: Config,
        loader: Box<dyn DocumentLoader>,
        extractor: Box<dyn GraphExtractor>,
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            config,
            loader,
            extractor,
            embedding,
            registry: PatternRegistry::new(store.clone()),
            store,
            selector: StrategySelector::default(),
            schema: GraphSchema::default(),
        }
    }

    pub fn set_schema(&mut self, schema: GraphSchema) {
        self.schema = schema;
    }

    pub fn schema(&self) -> &GraphSchema {
        &self.schema
    }

    /// Chunk, embed, extract and persist one document as an atomic unit.
    pub async fn ingest(&self, document: Document) -> Result<IngestSummary> {
        self.ingest_with(document, None, None).await
    }

    /// [`ingest`](Self::ingest) with per-call size overrides taking
    /// precedence over the configured ones.
    pub async fn ingest_with(
        &self,
        document: Document,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
    ) -> Result<IngestSummary> {
        let selection = self.selector.select(
            &document,
            chunk_size.or(self.config.chunking.chunk_size),
            chunk_overlap.or(self.config.chunking.chunk_overlap),
            self.config.chunking.evaluate_all,
        )?;
        let chunks = selection.result.chunks;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embed_batch(&texts, self.embedding.as_ref()).await?;

        let fragment = self
            .extractor
            .extract(&document.raw_text, &self.schema.nodes, &self.schema.relations)
            .await?;

        self.store
            .upsert_document(&document, &chunks, &embeddings, &fragment)
            .await?;

        info!(
            document_id = %document.id,
            strategy = %selection.result.strategy,
            chunks = chunks.len(),
            "ingested document"
        );

        Ok(IngestSummary {
            document_id: document.id,
            chunks,
            nodes: fragment.nodes.len(),
            relationships: fragment.relationships.len(),
        })
    }

    /// Load a file from disk without ingesting it.
    pub async fn load_document(&self, path: &Path) -> Result<Document> {
        self.loader
            .load(path, self.config.ingestion.clean_text)
            .await
    }

    /// Load a file from disk and ingest it.
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestSummary> {
        let document = self.load_document(path).await?;
        self.ingest(document).await
    }

    /// Ingest many documents in fixed batches; failures surface per
    /// document, never abort the run.
    pub async fn ingest_batch(
        &self,
        documents: Vec<Document>,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
        cancel: &CancelFlag,
    ) -> Result<BatchReport> {
        let options = BatchOptions {
            batch_size: self.config.ingestion.batch_size,
        };
        run_batches(documents, &options, cancel, |document| {
            self.ingest_with(document, chunk_size, chunk_overlap)
        })
        .await
    }

    /// Plain full-text search over chunks.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.registry
            .execute(&RetrievalPattern::Basic, query, limit)
            .await
    }

    /// Execute one retrieval pattern.
    pub async fn search_with_pattern(
        &self,
        pattern: &RetrievalPattern,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.registry.execute(pattern, query, limit).await
    }

    /// Text and vector search fanned out concurrently, fused into one
    /// ranking.
    pub async fn hybrid_search(
        &self,
        query: &str,
        weights: &FusionWeights,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(Error::Validation("limit must be positive".to_string()));
        }
        weights.validate()?;

        let filters = HashMap::new();
        let text_fut = self.store.text_search(query, &filters, limit);
        let vector_fut = async {
            let vector = self.embedding.embed(query).await?;
            self.store.vector_search(&vector, limit).await
        };
        let (text_res, vector_res) = tokio::join!(text_fut, vector_fut);

        let (text_hits, vector_hits) = match self.config.search.fallback {
            FallbackPolicy::FailFast => (text_res?, vector_res?),
            FallbackPolicy::Degrade => match (text_res, vector_res) {
                (Ok(text), Ok(vector)) => (text, vector),
                (Ok(text), Err(err)) => {
                    warn!(error = %err, "vector search failed, degrading to text only");
                    (text, Vec::new())
                }
                (Err(err), Ok(vector)) => {
                    warn!(error = %err, "text search failed, degrading to vector only");
                    (Vec::new(), vector)
                }
                (Err(err), Err(_)) => return Err(err),
            },
        };

        Ok(fusion::fuse(text_hits, vector_hits, weights, limit))
    }

    /// Recommend a chunking configuration for a document without storing
    /// anything.
    pub fn suggest_chunking_strategy(
        &self,
        document: &Document,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
        evaluate_all: bool,
    ) -> Result<ChunkingRecommendation> {
        self.selector
            .recommend(document, chunk_size, chunk_overlap, evaluate_all)
    }

    pub async fn stats(&self) -> Result<GraphStats> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{Chunk, DocType};
    use crate::graph::{GraphFragment, ScoredChunk, ScoredDocument};
    use crate::retrieval::{PatternKind, SearchOrigin};

    fn engine() -> GraphEngine {
        GraphEngine::new(Config::default())
    }

    fn sample_doc(body: &str) -> Document {
        Document::new(body, DocType::Plain).with_metadata("lang", "en")
    }

    /// Store double whose vector index is unreachable; everything else
    /// behaves like the bundled in-memory store.
    #[derive(Default)]
    struct OfflineVectorStore {
        inner: InMemoryGraphStore,
    }

    #[async_trait::async_trait]
    impl GraphStore for OfflineVectorStore {
        async fn upsert_document(
            &self,
            document: &Document,
            chunks: &[Chunk],
            embeddings: &[Vec<f32>],
            fragment: &GraphFragment,
        ) -> Result<()> {
            self.inner
                .upsert_document(document, chunks, embeddings, fragment)
                .await
        }

        async fn text_search(
            &self,
            query: &str,
            filters: &HashMap<String, String>,
            limit: usize,
        ) -> Result<Vec<ScoredChunk>> {
            self.inner.text_search(query, filters, limit).await
        }

        async fn vector_search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<ScoredChunk>> {
            Err(Error::Connectivity("vector index offline".to_string()))
        }

        async fn parent_search(
            &self,
            query: &str,
            parent_label: &str,
            limit: usize,
        ) -> Result<Vec<ScoredDocument>> {
            self.inner.parent_search(query, parent_label, limit).await
        }

        async fn children_of(&self, document_id: &str, child_label: &str) -> Result<Vec<Chunk>> {
            self.inner.children_of(document_id, child_label).await
        }

        fn graph_capability_available(&self) -> bool {
            false
        }

        async fn stats(&self) -> Result<GraphStats> {
            self.inner.stats().await
        }
    }

    fn engine_with_offline_vectors(fallback: FallbackPolicy) -> GraphEngine {
        let mut config = Config::default();
        config.search.fallback = fallback;
        GraphEngine::with_collaborators(
            config,
            Box::new(FsDocumentLoader),
            Box::new(HeuristicExtractor),
            Arc::new(HashEmbedding::default()),
            Arc::new(OfflineVectorStore::default()),
        )
    }

    #[tokio::test]
    async fn test_ingest_then_search_round_trip() {
        let engine = engine();
        let summary = engine
            .ingest(sample_doc(
                "Telemetry pipelines aggregate metrics. Dashboards render the aggregates.",
            ))
            .await
            .unwrap();
        assert!(!summary.chunks.is_empty());

        let results = engine.search("telemetry metrics", 5).await.unwrap();
        assert!(!results.is_empty());
        assert!(results[0].content.contains("Telemetry"));
        assert_eq!(
            results[0].source_pattern,
            SearchOrigin::Pattern(PatternKind::Basic)
        );
    }

    #[tokio::test]
    async fn test_hybrid_text_only_weights_match_text_search() {
        let engine = engine();
        engine
            .ingest(sample_doc("Alpha document talks about compilers."))
            .await
            .unwrap();
        engine
            .ingest(sample_doc("Beta document talks about gardening."))
            .await
            .unwrap();

        let text_only = engine
            .hybrid_search("compilers", &FusionWeights::new(1.0, 0.0).unwrap(), 5)
            .await
            .unwrap();
        let plain = engine.search("compilers", 5).await.unwrap();

        let hybrid_text_ids: Vec<&str> = text_only
            .iter()
            .filter(|r| r.score > 0.0)
            .map(|r| r.chunk_id.as_str())
            .collect();
        let plain_ids: Vec<&str> = plain.iter().map(|r| r.chunk_id.as_str()).collect();
        assert_eq!(hybrid_text_ids, plain_ids);
    }

    #[tokio::test]
    async fn test_metadata_filtered_pattern() {
        let engine = engine();
        engine
            .ingest(sample_doc("Filtered content about lighthouses."))
            .await
            .unwrap();

        let mut filters = HashMap::new();
        filters.insert("lang".to_string(), "en".to_string());
        let hits = engine
            .search_with_pattern(
                &RetrievalPattern::MetadataFiltering { filters },
                "lighthouses",
                5,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_advanced_pattern_surfaces_capability_error() {
        let engine = engine();
        let pattern =
            RetrievalPattern::from_kind(PatternKind::GraphEnhanced, HashMap::new()).unwrap();
        let err = engine
            .search_with_pattern(&pattern, "anything", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityUnavailable(_)));
    }

    #[tokio::test]
    async fn test_batch_ingest_reports_outcomes() {
        let engine = engine();
        let docs = vec![
            sample_doc("First body of text for the batch."),
            sample_doc("Second body of text for the batch."),
            sample_doc("Third body of text for the batch."),
        ];
        let report = engine
            .ingest_batch(docs, None, None, &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(report.successes(), 3);

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.documents, 3);
    }

    #[tokio::test]
    async fn test_ingest_respects_per_call_sizes() {
        let engine = engine();
        let doc = sample_doc(&"Each sentence adds a little more body. ".repeat(10));
        let raw = doc.raw_text.clone();

        let summary = engine.ingest_with(doc, Some(64), Some(0)).await.unwrap();
        assert!(summary.chunks.len() > 1);
        assert!(summary.chunks.iter().all(|c| c.content.len() <= 64));

        let joined: String = summary.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, raw);
    }

    #[tokio::test]
    async fn test_hybrid_degrades_to_text_when_vector_index_is_down() {
        let engine = engine_with_offline_vectors(FallbackPolicy::Degrade);
        engine
            .ingest(sample_doc("Degraded search still finds this sentence."))
            .await
            .unwrap();

        let results = engine
            .hybrid_search("degraded sentence", &FusionWeights::new(0.5, 0.5).unwrap(), 5)
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results[0].content.contains("Degraded"));
    }

    #[tokio::test]
    async fn test_hybrid_fail_fast_propagates_vector_error() {
        let engine = engine_with_offline_vectors(FallbackPolicy::FailFast);
        engine
            .ingest(sample_doc("Some indexed sentence."))
            .await
            .unwrap();

        let err = engine
            .hybrid_search("indexed", &FusionWeights::new(0.5, 0.5).unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_suggestion_does_not_store() {
        let engine = engine();
        let doc = sample_doc("Some text that is only analyzed. Never persisted anywhere.");
        let rec = engine
            .suggest_chunking_strategy(&doc, None, None, true)
            .unwrap();
        assert!((0.0..=1.0).contains(&rec.quality_score));
        assert!(!rec.explanation.is_empty());

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.documents, 0);
    }
}
