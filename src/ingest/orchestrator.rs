//! Batch ingestion: fixed-size batches processed in order, bounded
//! concurrency inside each batch, per-document outcomes instead of aborts.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunking::Chunk;
use crate::document::Document;
use crate::error::Result;

/// Cooperative cancellation, checked between batches only. A batch that has
/// started always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOptions {
    pub batch_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { batch_size: 4 }
    }
}

/// One successfully ingested document: the chunks it produced and the size
/// of its extracted graph fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub document_id: String,
    pub chunks: Vec<Chunk>,
    pub nodes: usize,
    pub relationships: usize,
}

/// What happened to one document. Failures carry the error text and never
/// abort the batch or the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentOutcome {
    Success(IngestSummary),
    Failure { document_id: String, error: String },
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Success(_))
    }

    pub fn document_id(&self) -> &str {
        match self {
            DocumentOutcome::Success(summary) => &summary.document_id,
            DocumentOutcome::Failure { document_id, .. } => document_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }
}

/// Process documents in fixed batches.
///
/// Batches complete in submission order; inside a batch documents run
/// concurrently (bounded at the batch size) and their completion order is
/// unspecified, but outcomes are reported in submission order regardless.
pub async fn run_batches<F, Fut>(
    documents: Vec<Document>,
    options: &BatchOptions,
    cancel: &CancelFlag,
    process: F,
) -> Result<BatchReport>
where
    F: Fn(Document) -> Fut,
    Fut: Future<Output = Result<IngestSummary>>,
{
    let batch_size = options.batch_size.max(1);
    let total = documents.len();
    let mut report = BatchReport::default();

    let mut batches: Vec<Vec<Document>> = Vec::new();
    let mut remaining = documents.into_iter();
    loop {
        let batch: Vec<Document> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }

    for (batch_index, batch) in batches.into_iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                batch = batch_index,
                processed = report.outcomes.len(),
                total,
                "ingestion cancelled between batches"
            );
            report.cancelled = true;
            break;
        }

        let mut outcomes: Vec<(usize, DocumentOutcome)> = stream::iter(
            batch.into_iter().enumerate().map(|(i, document)| {
                let document_id = document.id.clone();
                let fut = process(document);
                async move {
                    let outcome = match fut.await {
                        Ok(summary) => DocumentOutcome::Success(summary),
                        Err(err) => {
                            warn!(document_id = %document_id, error = %err, "document failed");
                            DocumentOutcome::Failure {
                                document_id,
                                error: err.to_string(),
                            }
                        }
                    };
                    (i, outcome)
                }
            }),
        )
        .buffer_unordered(batch_size)
        .collect()
        .await;

        // Completion order inside the batch is arbitrary; report in
        // submission order.
        outcomes.sort_by_key(|(i, _)| *i);
        report
            .outcomes
            .extend(outcomes.into_iter().map(|(_, outcome)| outcome));

        info!(
            batch = batch_index,
            processed = report.outcomes.len(),
            total,
            "batch complete"
        );
    }

    Ok(report)
}
