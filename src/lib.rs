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

//! Knowledge-graph document ingestion and pattern-based hybrid retrieval.
//!
//! Documents are profiled, chunked with an adaptively selected strategy,
//! embedded and persisted with their extracted graph fragment; queries run
//! through a closed catalog of retrieval patterns or a hybrid text/vector
//! search with score fusion. External systems (LLM extraction, graph
//! databases, embedding services) plug in behind the collaborator traits in
//! [`document`], [`graph`] and [`embedding`].

pub mod chunking;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod formatting;
pub mod graph;
pub mod ingest;
pub mod retrieval;
pub mod schema;
pub mod storage;

pub use chunking::{ChunkingRecommendation, DocType, StrategyId};
pub use document::Document;
pub use engine::GraphEngine;
pub use error::{Error, Result};
pub use ingest::{BatchReport, CancelFlag, DocumentOutcome};
pub use retrieval::{FusionWeights, PatternKind, RetrievalPattern, SearchResult};
pub use schema::GraphSchema;
