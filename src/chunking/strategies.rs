//! Chunking strategy catalog.
//!
//! Every strategy is a pure function from text to a list of interior cut
//! points. Chunk assembly is shared: chunk `i` starts `chunk_overlap` bytes
//! before cut `i` (shortened where the cut sits closer to the text start
//! than the overlap, or where a UTF-8 boundary forces it) and ends at cut
//! `i + 1`, so trimming the lead-in overlap from every chunk after the
//! first reconstructs the input byte for byte.

use crate::chunking::profiler::header_level;
use crate::chunking::{Chunk, ChunkingConfig, StrategyId};

/// Zero-indent line prefixes treated as definition boundaries in source code.
const DEFINITION_PREFIXES: &[&str] = &[
    "fn ",
    "pub ",
    "struct ",
    "enum ",
    "impl ",
    "trait ",
    "mod ",
    "const ",
    "static ",
    "async ",
    "def ",
    "class ",
    "function ",
    "func ",
    "type ",
    "export ",
];

/// Chunk `text` with the strategy named in `config`.
///
/// Empty text produces zero chunks. For non-empty text there is always at
/// least one chunk, the first starting at offset 0 and the last ending at
/// `text.len()`.
pub fn chunk_text(document_id: &str, text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let cuts = match config.strategy {
        StrategyId::FixedSize => fixed_size_cuts(text, config),
        StrategyId::RecursiveCharacter => recursive_cuts(text, config),
        StrategyId::MarkdownHeader => markdown_header_cuts(text, config),
        StrategyId::LanguageSpecific => language_cuts(text, config),
    };

    assemble(document_id, text, cuts, config.chunk_overlap)
}

/// Cuts at `chunk_size`, then every `chunk_size - chunk_overlap` bytes, so
/// each assembled chunk is exactly `chunk_size` bytes long apart from the
/// tail.
fn fixed_size_cuts(text: &str, config: &ChunkingConfig) -> Vec<usize> {
    let stride = config.chunk_size - config.chunk_overlap;
    let mut cuts = Vec::new();
    let mut cut = config.chunk_size;
    while cut < text.len() {
        cuts.push(cut);
        cut += stride;
    }
    cuts
}

/// Fixed-size pacing with each cut snapped backward to the strongest nearby
/// separator: paragraph break, then newline, then sentence end, then space.
fn recursive_cuts(text: &str, config: &ChunkingConfig) -> Vec<usize> {
    let stride = config.chunk_size - config.chunk_overlap;
    let window = stride / 2;
    let mut cuts = Vec::new();
    let mut prev = 0usize;
    let mut target = config.chunk_size;

    while target < text.len() {
        let hi = floor_char_boundary(text, target);
        let lo = floor_char_boundary(text, target.saturating_sub(window).max(prev + 1));
        let mut cut = if lo < hi {
            snap_to_separator(text, lo, hi)
        } else {
            hi
        };
        if cut <= prev {
            cut = ceil_char_boundary(text, prev + 1);
        }
        if cut >= text.len() {
            break;
        }
        cuts.push(cut);
        prev = cut;
        target = cut + stride;
    }

    cuts
}

/// Best separator position in `[lo, hi]`, searching backward from `hi`.
fn snap_to_separator(text: &str, lo: usize, hi: usize) -> usize {
    let slice = &text[lo..hi];

    if let Some(pos) = slice.rfind("\n\n") {
        return lo + pos + 2;
    }
    if let Some(pos) = slice.rfind('\n') {
        return lo + pos + 1;
    }
    for (i, ch) in slice.char_indices().rev() {
        if matches!(ch, '.' | '!' | '?') {
            let after = i + ch.len_utf8();
            if slice[after..].chars().next().is_none_or(|c| c.is_whitespace()) {
                return lo + after;
            }
        }
    }
    if let Some(pos) = slice.rfind(' ') {
        return lo + pos + 1;
    }
    hi
}

/// Cuts at every markdown header line, with oversize sections subdivided at
/// fixed-size pacing. Headers inside fenced code blocks are ignored.
fn markdown_header_cuts(text: &str, config: &ChunkingConfig) -> Vec<usize> {
    let mut cuts = Vec::new();
    let mut offset = 0usize;
    let mut in_fence = false;

    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && offset > 0 && header_level(line).is_some() {
            cuts.push(offset);
        }
        offset += line.len();
    }

    subdivide_oversize(text.len(), cuts, config)
}

/// Cuts at zero-indent definition lines, with oversize spans subdivided.
fn language_cuts(text: &str, config: &ChunkingConfig) -> Vec<usize> {
    let mut cuts = Vec::new();
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        if offset > 0
            && !line.starts_with(char::is_whitespace)
            && DEFINITION_PREFIXES.iter().any(|p| line.starts_with(p))
        {
            cuts.push(offset);
        }
        offset += line.len();
    }

    subdivide_oversize(text.len(), cuts, config)
}

/// Insert fixed-size cuts inside any span longer than `chunk_size`, keeping
/// the structural cuts in place.
fn subdivide_oversize(text_len: usize, cuts: Vec<usize>, config: &ChunkingConfig) -> Vec<usize> {
    let mut out = Vec::new();
    let mut boundaries = cuts;
    boundaries.push(text_len);

    let mut segment_start = 0usize;
    for boundary in boundaries {
        if segment_start > 0 {
            out.push(segment_start);
        }
        // The chunk at this segment extends backward by the overlap.
        let mut start = if segment_start == 0 {
            0
        } else {
            segment_start.saturating_sub(config.chunk_overlap)
        };
        while boundary - start > config.chunk_size {
            let cut = start + config.chunk_size;
            out.push(cut);
            start = cut - config.chunk_overlap;
        }
        segment_start = boundary;
    }

    out
}

/// Turn interior cut points into chunks with leading overlap.
///
/// Cuts are floored to UTF-8 boundaries. The backward extension is
/// shortened for cuts closer to the text start than the overlap distance,
/// so structural cuts near the start are never lost.
fn assemble(document_id: &str, text: &str, cuts: Vec<usize>, overlap: usize) -> Vec<Chunk> {
    let mut clean: Vec<usize> = cuts
        .into_iter()
        .map(|c| floor_char_boundary(text, c))
        .filter(|&c| c > 0 && c < text.len())
        .collect();
    clean.sort_unstable();
    clean.dedup();

    let mut starts = Vec::with_capacity(clean.len() + 1);
    starts.push(0usize);
    for &cut in &clean {
        starts.push(ceil_char_boundary(text, cut.saturating_sub(overlap)));
    }

    let mut chunks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = clean.get(i).copied().unwrap_or(text.len());
        chunks.push(Chunk {
            id: uuid::Uuid::new_v4().to_string(),
            parent_document_id: document_id.to_string(),
            sequence_index: i,
            content: text[start..end].to_string(),
            start_offset: start,
            end_offset: end,
        });
    }

    chunks
}

pub(crate) fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub(crate) fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
