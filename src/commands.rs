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

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Commands;
use crate::config::Config;
use crate::engine::GraphEngine;
use crate::formatting;
use crate::ingest::{CancelFlag, DocumentOutcome};
use crate::retrieval::{FusionWeights, PatternKind, RetrievalPattern};
use crate::schema::GraphSchema;
use crate::storage;

pub async fn execute(config: &Config, command: Commands) -> Result<()> {
    let mut engine = GraphEngine::new(config.clone());
    let schema_path = storage::get_schema_path()?;
    engine.set_schema(GraphSchema::load(&schema_path)?);

    match command {
        Commands::Ingest {
            paths,
            chunk_size,
            chunk_overlap,
        } => {
            // A file that fails to load becomes a reported failure, not an
            // abort; the remaining files still go through the batch runner.
            let mut documents = Vec::new();
            let mut load_failures = Vec::new();
            for path in &paths {
                match engine.load_document(path).await {
                    Ok(document) => documents.push(document),
                    Err(err) => load_failures.push(DocumentOutcome::Failure {
                        document_id: path.display().to_string(),
                        error: err.to_string(),
                    }),
                }
            }

            let mut report = engine
                .ingest_batch(documents, chunk_size, chunk_overlap, &CancelFlag::new())
                .await?;
            report.outcomes.extend(load_failures);
            println!("{}", formatting::format_batch_report(&report));
        }

        Commands::Search {
            query,
            limit,
            from,
            json,
        } => {
            index_files(&engine, &from).await?;
            let limit = limit.unwrap_or(config.search.max_results);
            let results = engine.search(&query, limit).await?;
            print_results(&results, json)?;
        }

        Commands::HybridSearch {
            query,
            text_weight,
            vector_weight,
            limit,
            from,
            json,
        } => {
            index_files(&engine, &from).await?;
            let weights = FusionWeights::new(
                text_weight.unwrap_or(config.search.text_weight),
                vector_weight.unwrap_or(config.search.vector_weight),
            )?;
            let limit = limit.unwrap_or(config.search.max_results);
            let results = engine.hybrid_search(&query, &weights, limit).await?;
            print_results(&results, json)?;
        }

        Commands::PatternSearch {
            pattern,
            query,
            filter,
            limit,
            from,
            json,
        } => {
            // Parse the pattern before touching the store.
            let kind: PatternKind = pattern.parse()?;
            let pattern = RetrievalPattern::from_kind(kind, parse_filters(&filter)?)?;

            index_files(&engine, &from).await?;
            let limit = limit.unwrap_or(config.search.max_results);
            let results = engine.search_with_pattern(&pattern, &query, limit).await?;
            print_results(&results, json)?;
        }

        Commands::Suggest {
            path,
            chunk_size,
            chunk_overlap,
            evaluate_all,
            json,
        } => {
            let document = engine_load(&engine, &path).await?;
            let rec = engine.suggest_chunking_strategy(
                &document,
                chunk_size,
                chunk_overlap,
                evaluate_all,
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                println!("{}", formatting::format_recommendation(&rec));
            }
        }

        Commands::Schema { nodes, relations } => {
            let mut schema = engine.schema().clone();
            let mut changed = false;
            if let Some(nodes) = nodes {
                schema.nodes = split_list(&nodes);
                changed = true;
            }
            if let Some(relations) = relations {
                schema.relations = split_list(&relations);
                changed = true;
            }
            if changed {
                schema.save(&schema_path)?;
            }
            println!("{}", formatting::format_schema(&schema));
        }

        Commands::Stats { json } => {
            let stats = engine.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", formatting::format_stats(&stats));
            }
        }
    }

    Ok(())
}

fn print_results(results: &[crate::retrieval::SearchResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        println!("{}", formatting::format_search_results(results));
    }
    Ok(())
}

/// Index `--from` files before answering a query.
async fn index_files(engine: &GraphEngine, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        engine
            .ingest_path(path)
            .await
            .with_context(|| format!("failed to index {}", path.display()))?;
    }
    Ok(())
}

async fn engine_load(
    engine: &GraphEngine,
    path: &PathBuf,
) -> Result<crate::document::Document> {
    engine
        .load_document(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))
}

fn parse_filters(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut filters = HashMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("filter '{}' is not key=value", entry))?;
        filters.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(filters)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
