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
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chunking::DocType;
use crate::error::{Error, Result};

/// Immutable ingestion input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub raw_text: String,
    pub metadata: HashMap<String, String>,
    pub content_type: DocType,
}

impl Document {
    pub fn new(raw_text: impl Into<String>, content_type: DocType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            raw_text: raw_text.into(),
            metadata: HashMap::new(),
            content_type,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Compute SHA256 hash of document content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loader collaborator. HTML/PDF/web loaders live outside this crate; the
/// bundled implementation reads local text and markdown files.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path, clean: bool) -> Result<Document>;
}

/// Filesystem loader for plain text, markdown and source files.
pub struct FsDocumentLoader;

impl FsDocumentLoader {
    fn doc_type_for(path: &Path) -> DocType {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "md" | "markdown" => DocType::Markdown,
            "rs" | "py" | "js" | "ts" | "go" | "java" | "c" | "cpp" | "h" => DocType::Code,
            _ => DocType::Plain,
        }
    }

    /// Normalize line endings, strip trailing whitespace per line, collapse
    /// runs of 3+ newlines down to a paragraph break.
    fn clean_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        let mut cleaned = String::with_capacity(normalized.len());
        let mut blank_run = 0usize;

        for line in normalized.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            cleaned.push_str(line);
            cleaned.push('\n');
        }

        cleaned
    }
}

#[async_trait]
impl DocumentLoader for FsDocumentLoader {
    async fn load(&self, path: &Path, clean: bool) -> Result<Document> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path)?;
        let text = if clean { Self::clean_text(&raw) } else { raw };

        let mut document = Document::new(text, Self::doc_type_for(path));
        document.metadata.insert(
            "filename".to_string(),
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        document
            .metadata
            .insert("path".to_string(), path.to_string_lossy().to_string());
        document.metadata.insert(
            "content_hash".to_string(),
            content_hash(&document.raw_text),
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_blank_runs() {
        let cleaned = FsDocumentLoader::clean_text("a\r\n\r\n\r\n\r\nb   \n");
        assert_eq!(cleaned, "a\n\nb\n");
    }

    #[test]
    fn test_doc_type_from_extension() {
        assert_eq!(
            FsDocumentLoader::doc_type_for(Path::new("notes.md")),
            DocType::Markdown
        );
        assert_eq!(
            FsDocumentLoader::doc_type_for(Path::new("lib.rs")),
            DocType::Code
        );
        assert_eq!(
            FsDocumentLoader::doc_type_for(Path::new("notes.txt")),
            DocType::Plain
        );
    }

    #[tokio::test]
    async fn test_load_missing_path_is_not_found() {
        let loader = FsDocumentLoader;
        let err = loader
            .load(Path::new("/nonexistent/file.md"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_sets_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n\nBody.\n").unwrap();

        let loader = FsDocumentLoader;
        let document = loader.load(&path, true).await.unwrap();

        assert_eq!(document.content_type, DocType::Markdown);
        assert_eq!(document.metadata.get("filename").unwrap(), "doc.md");
        assert!(document.metadata.contains_key("content_hash"));
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
    }
}
