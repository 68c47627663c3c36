//! Reconstruction guarantees across the whole strategy catalog.

use crate::chunking::{strategies, Chunk, ChunkingConfig, StrategyId};

fn sample_texts() -> Vec<String> {
    vec![
        "Tiny.".to_string(),
        "A plain paragraph of text. It has a couple of sentences in it. Nothing fancy at all.".to_string(),
        format!(
            "# Title\n\nIntro paragraph with several sentences. {}\n\n## Section\n\n{}\n\n## Another\n\n{}\n",
            "More context follows here. ".repeat(8),
            "Body content for the first section goes on for a while. ".repeat(6),
            "Closing material sits at the end of the document. ".repeat(5),
        ),
        format!(
            "fn alpha() {{\n    work();\n}}\n\npub fn beta() {{\n{}}}\n\nconst GAMMA: u32 = 3;\n",
            "    step();\n".repeat(30),
        ),
        "word ".repeat(500),
        "x".repeat(3000),
    ]
}

/// Trim each chunk's lead-in overlap after the first and concatenate.
/// Exact for any input, including shortened overlaps near the text start
/// and at UTF-8 boundaries.
fn reconstruct_by_offsets(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    let mut covered = 0usize;
    for chunk in chunks {
        out.push_str(&chunk.content[covered - chunk.start_offset..]);
        covered = chunk.end_offset;
    }
    out
}

#[test]
fn test_round_trip_all_strategies_and_configs() {
    let configs = [(100, 0), (100, 20), (256, 51), (64, 16), (512, 128)];
    for text in sample_texts() {
        for strategy in StrategyId::all() {
            for (size, overlap) in configs {
                let config = ChunkingConfig::new(strategy, size, overlap).unwrap();
                let chunks = strategies::chunk_text("doc", &text, &config);
                assert_eq!(
                    reconstruct_by_offsets(&chunks),
                    text,
                    "strategy {} with size {} overlap {}",
                    strategy,
                    size,
                    overlap
                );
                // Chunks not pinned at the text start carry the full
                // configured overlap, so trimming exactly `chunk_overlap`
                // bytes from them is valid.
                for pair in chunks.windows(2) {
                    if pair[1].start_offset > 0 {
                        assert_eq!(
                            pair[0].end_offset - pair[1].start_offset,
                            overlap,
                            "strategy {} with size {} overlap {}",
                            strategy,
                            size,
                            overlap
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_round_trip_with_cut_inside_overlap_distance() {
    // The first header cut sits closer to the start than the overlap; the
    // chunk behind it is pinned at offset 0 and reconstruction stays exact.
    let text = format!("# T\n## Early\n{}\n", "body ".repeat(60));
    let config = ChunkingConfig::new(StrategyId::MarkdownHeader, 2000, 64).unwrap();
    let chunks = strategies::chunk_text("doc", &text, &config);
    assert!(chunks.len() >= 2);
    assert_eq!(chunks[1].start_offset, 0);
    assert_eq!(reconstruct_by_offsets(&chunks), text);
}

#[test]
fn test_round_trip_multibyte_text_by_offsets() {
    let text = format!(
        "# Überschrift\n\n{}\n\n## Abschnitt\n\n{}\n",
        "Längere Sätze mit Umlauten füllen den Absatz. ".repeat(6),
        "日本語のテキストもここに入ります。".repeat(10),
    );
    for strategy in StrategyId::all() {
        let config = ChunkingConfig::new(strategy, 120, 30).unwrap();
        let chunks = strategies::chunk_text("doc", &text, &config);
        assert_eq!(reconstruct_by_offsets(&chunks), text, "strategy {}", strategy);
    }
}

#[test]
fn test_chunk_invariants() {
    for text in sample_texts() {
        for strategy in StrategyId::all() {
            let config = ChunkingConfig::new(strategy, 128, 32).unwrap();
            let chunks = strategies::chunk_text("doc", &text, &config);
            assert!(!chunks.is_empty());
            assert_eq!(chunks[0].start_offset, 0);
            assert_eq!(chunks.last().unwrap().end_offset, text.len());

            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.sequence_index, i);
                assert_eq!(chunk.end_offset - chunk.start_offset, chunk.content.len());
                assert_eq!(chunk.parent_document_id, "doc");
            }
        }
    }
}

#[test]
fn test_overlap_contract_between_neighbours() {
    for text in sample_texts() {
        for strategy in StrategyId::all() {
            let config = ChunkingConfig::new(strategy, 128, 32).unwrap();
            let chunks = strategies::chunk_text("doc", &text, &config);
            for pair in chunks.windows(2) {
                // The next chunk starts at most `chunk_overlap` bytes before
                // the previous one ends, and never after it ends.
                assert!(pair[1].start_offset <= pair[0].end_offset);
                assert!(pair[0].end_offset - pair[1].start_offset <= 32);
                assert!(pair[1].end_offset > pair[0].end_offset);
            }
        }
    }
}

#[test]
fn test_zero_overlap_partitions_exactly() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
    let config = ChunkingConfig::new(StrategyId::RecursiveCharacter, 150, 0).unwrap();
    let chunks = strategies::chunk_text("doc", &text, &config);
    assert!(chunks.len() > 1);
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].end_offset, pair[1].start_offset);
    }
    let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(joined, text);
}
