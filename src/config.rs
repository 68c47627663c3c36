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

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::retrieval::FallbackPolicy;

/// Chunking configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Evaluate every applicable strategy instead of the type-based fast path
    #[serde(default)]
    pub evaluate_all: bool,
    /// Fixed chunk size; derived from document length when absent
    pub chunk_size: Option<usize>,
    /// Fixed overlap; a fifth of the chunk size when absent
    pub chunk_overlap: Option<usize>,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub max_results: usize,
    pub text_weight: f32,
    pub vector_weight: f32,
    /// What hybrid search does when one sub-query fails
    pub fallback: FallbackPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 10,
            text_weight: 0.5,
            vector_weight: 0.5,
            fallback: FallbackPolicy::Degrade,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSettings {
    pub batch_size: usize,
    /// Strip trailing whitespace and collapse blank-line runs while loading
    pub clean_text: bool,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            batch_size: 4,
            clean_text: true,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimensions: 256 }
    }
}

/// Main configuration for octograph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub ingestion: IngestionSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

impl Config {
    /// Load configuration from config.toml file
    /// First tries to load from system config directory, falls back to embedded template
    pub fn load() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Config doesn't exist, create from template
            let template_content = include_str!("../config-templates/default.toml");
            let config: Self = toml::from_str(template_content)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, template_content)?;

            Ok(config)
        }
    }
}
