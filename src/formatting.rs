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

use colored::Colorize;

use crate::chunking::ChunkingRecommendation;
use crate::graph::GraphStats;
use crate::ingest::{BatchReport, DocumentOutcome};
use crate::retrieval::SearchResult;
use crate::schema::GraphSchema;

pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut output = String::new();

    for result in results {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        output.push_str(&result.chunk_id.blue().bold().to_string());
        output.push('\n');
        output.push_str(
            &format!("via {}", result.source_pattern)
                .bright_black()
                .to_string(),
        );
        output.push('\n');

        // Content preview (first 200 chars)
        let content = if result.content.chars().count() > 200 {
            format!("{}...", truncate_chars(&result.content, 200))
        } else {
            result.content.clone()
        };
        output.push_str(&content);
        output.push('\n');

        let score_pct = (result.score * 100.0) as u32;
        output.push_str(&format!("{}% relevant", score_pct).green().to_string());
        output.push_str("\n\n");
    }

    output
}

pub fn format_recommendation(rec: &ChunkingRecommendation) -> String {
    let mut output = String::new();

    output.push_str(&"Chunking Recommendation".bold().to_string());
    output.push('\n');
    output.push_str(&rec.explanation);
    output.push('\n');

    if !rec.alternatives.is_empty() {
        output.push('\n');
        output.push_str(&"Evaluated strategies".bold().to_string());
        output.push('\n');
        for alt in &rec.alternatives {
            output.push_str(&format!(
                "  {:<20} score {:.3}  {} chunks, avg {:.0} bytes\n",
                alt.strategy.to_string(),
                alt.quality_score,
                alt.num_chunks,
                alt.avg_chunk_size
            ));
        }
    }

    output
}

pub fn format_batch_report(report: &BatchReport) -> String {
    let mut output = String::new();

    output.push_str(
        &format!(
            "{} succeeded, {} failed",
            report.successes(),
            report.failures()
        )
        .bold()
        .to_string(),
    );
    if report.cancelled {
        output.push_str(&" (cancelled)".yellow().to_string());
    }
    output.push('\n');

    for outcome in &report.outcomes {
        match outcome {
            DocumentOutcome::Success(summary) => {
                output.push_str(&format!(
                    "  {} {} ({} chunks, {} nodes)\n",
                    "ok".green(),
                    summary.document_id,
                    summary.chunks.len(),
                    summary.nodes
                ));
            }
            DocumentOutcome::Failure { document_id, error } => {
                output.push_str(&format!("  {} {}: {}\n", "fail".red(), document_id, error));
            }
        }
    }

    output
}

pub fn format_stats(stats: &GraphStats) -> String {
    let mut output = String::new();

    output.push_str(&"Knowledge Graph Statistics".bold().to_string());
    output.push('\n');
    output.push_str(&format!("Documents: {}", stats.documents));
    output.push('\n');
    output.push_str(&format!("Chunks: {}", stats.chunks));
    output.push('\n');
    output.push_str(&format!("Nodes: {}", stats.nodes));
    output.push('\n');
    output.push_str(&format!("Relationships: {}", stats.relationships));
    output.push('\n');
    if let Some(oldest) = stats.oldest_indexed {
        output.push_str(&format!(
            "Oldest Indexed: {}",
            oldest.format("%Y-%m-%d %H:%M UTC")
        ));
        output.push('\n');
    }
    if let Some(newest) = stats.newest_indexed {
        output.push_str(&format!(
            "Newest Indexed: {}",
            newest.format("%Y-%m-%d %H:%M UTC")
        ));
        output.push('\n');
    }

    output
}

pub fn format_schema(schema: &GraphSchema) -> String {
    let mut output = String::new();

    output.push_str(&"Graph Schema".bold().to_string());
    output.push('\n');
    output.push_str(&format!("Node labels: {}", schema.nodes.join(", ")));
    output.push('\n');
    output.push_str(&format!(
        "Relationship types: {}",
        schema.relations.join(", ")
    ));
    output.push('\n');

    output
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
