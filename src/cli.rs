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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "octograph")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Knowledge-graph document ingestion and pattern-based hybrid retrieval", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest documents into the knowledge graph
    Ingest {
        /// Files to ingest
        paths: Vec<PathBuf>,

        /// Override the derived chunk size
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Override the derived chunk overlap
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Full-text search over ingested chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Files to ingest before searching
        #[arg(long)]
        from: Vec<PathBuf>,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Combined text and vector search with score fusion
    HybridSearch {
        /// Search query
        query: String,

        /// Weight of the full-text source
        #[arg(long)]
        text_weight: Option<f32>,

        /// Weight of the vector source
        #[arg(long)]
        vector_weight: Option<f32>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Files to ingest before searching
        #[arg(long)]
        from: Vec<PathBuf>,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search with a named retrieval pattern
    PatternSearch {
        /// Pattern name: basic, metadata, parent-child, local, graph, community
        pattern: String,

        /// Search query
        query: String,

        /// Metadata filters as key=value (metadata pattern only)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Files to ingest before searching
        #[arg(long)]
        from: Vec<PathBuf>,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recommend a chunking strategy for a file without ingesting it
    Suggest {
        /// File to analyze
        path: PathBuf,

        /// Override the derived chunk size
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Override the derived chunk overlap
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Score every applicable strategy instead of the fast path
        #[arg(long, default_value_t = true)]
        evaluate_all: bool,

        /// Emit the recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or edit the graph extraction vocabulary
    Schema {
        /// Replace node labels (comma-separated)
        #[arg(long)]
        nodes: Option<String>,

        /// Replace relationship types (comma-separated)
        #[arg(long)]
        relations: Option<String>,
    },

    /// Show knowledge graph statistics
    Stats {
        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },
}
