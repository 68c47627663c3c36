use serde::{Deserialize, Serialize};

use crate::chunking::DocType;

/// Structural summary of a document, derived once before strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureProfile {
    pub doc_type: DocType,
    pub header_count: usize,
    pub paragraph_count: usize,
    pub code_block_count: usize,
}

impl StructureProfile {
    /// Profile raw text. Total: empty input yields zero counts.
    pub fn analyze(text: &str, doc_type: DocType) -> Self {
        let mut header_count = 0;
        let mut fence_count = 0;
        let mut in_fence = false;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                fence_count += usize::from(in_fence);
                in_fence = !in_fence;
                continue;
            }
            if !in_fence && header_level(line).is_some() {
                header_count += 1;
            }
        }

        Self {
            doc_type,
            header_count,
            paragraph_count: count_paragraphs(text),
            code_block_count: fence_count,
        }
    }
}

/// Markdown ATX header level (1-6), if the line is a header.
pub fn header_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    // Require "# text" or a bare run of hashes, not "#hashtag".
    match trimmed[level..].chars().next() {
        Some(c) if c.is_whitespace() => Some(level),
        None => Some(level),
        _ => None,
    }
}

/// Count blank-line-delimited blocks of non-empty text.
fn count_paragraphs(text: &str) -> usize {
    let mut count = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            in_paragraph = true;
            count += 1;
        }
    }
    count
}
