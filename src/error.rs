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

/// Error taxonomy shared across ingestion and retrieval.
///
/// `Validation` is raised before any collaborator is contacted.
/// `Extraction` is only ever surfaced per document; batch ingestion wraps it
/// into a [`DocumentOutcome`](crate::ingest::DocumentOutcome) instead of
/// aborting the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid caller input: empty query, bad weights, overlap >= chunk size.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced document or file does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An advanced retrieval pattern was requested but the store lacks the
    /// graph analytics capability. Never downgraded silently.
    #[error("graph capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    /// External store or service unreachable. Retry policy belongs to the
    /// collaborator, not the core.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Entity/relationship extraction produced malformed output.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Schema vocabulary file could not be read or parsed.
    #[error("schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
