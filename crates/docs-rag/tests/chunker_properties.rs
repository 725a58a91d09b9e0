//! Property tests for sentence-aligned chunking with word overlap.

use docs_rag::ingestion::{split_into_sentences, TextChunker};
use docs_rag::Chunk;
use proptest::prelude::*;

/// A sentence of 1-12 lowercase words ending in `.`, `!`, `?` or `...`
fn arb_sentence() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z]{1,10}", 1..12),
        prop_oneof![Just("."), Just("!"), Just("?"), Just("...")],
    )
        .prop_map(|(words, end)| format!("{}{}", words.join(" "), end))
}

fn arb_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(arb_sentence(), 0..60).prop_map(|s| s.join(" "))
}

/// The words carried over from `prev`, if any
fn overlap_prefix(prev: &str, n: usize) -> Option<String> {
    if n == 0 {
        return None;
    }
    let words: Vec<&str> = prev.split(' ').collect();
    Some(words[words.len().saturating_sub(n)..].join(" "))
}

/// Chunk texts with the carried-over words removed
fn new_text_per_chunk(chunks: &[Chunk], n: usize) -> Vec<String> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                return chunk.text.clone();
            }
            match overlap_prefix(&chunks[i - 1].text, n) {
                Some(prefix) => {
                    let with_space = format!("{} ", prefix);
                    assert!(
                        chunk.text.starts_with(&with_space),
                        "chunk {} does not start with overlap {:?}: {:?}",
                        i,
                        prefix,
                        chunk.text
                    );
                    chunk.text[with_space.len()..].to_string()
                }
                None => chunk.text.clone(),
            }
        })
        .collect()
}

mod prop_chunking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_reconstruct_sentences_in_order(
            doc in arb_document(),
            chunk_size in 20usize..400,
            overlap in 0usize..200,
        ) {
            let chunker = TextChunker::new(chunk_size, overlap);
            let chunks = chunker.chunk(&doc);
            let sentences = split_into_sentences(&doc);

            prop_assert_eq!(chunks.is_empty(), sentences.is_empty());

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.chunk_index as usize, i);
            }

            let new_text = new_text_per_chunk(&chunks, chunker.overlap_words());
            prop_assert_eq!(new_text.join(" "), sentences.join(" "));
        }

        #[test]
        fn chunks_split_only_between_sentences(
            doc in arb_document(),
            chunk_size in 20usize..400,
            overlap in 0usize..200,
        ) {
            let chunker = TextChunker::new(chunk_size, overlap);
            let chunks = chunker.chunk(&doc);
            let new_text = new_text_per_chunk(&chunks, chunker.overlap_words());

            for (chunk, text) in chunks.iter().zip(&new_text) {
                // Every chunk adds whole sentences only
                prop_assert!(text.ends_with('.'));
                let added = split_into_sentences(text).len();
                prop_assert!(added >= 1);

                // Only a chunk holding a single new sentence may overflow
                prop_assert!(
                    chunk.size <= chunk_size + 1 || added == 1,
                    "chunk of size {} with {} sentences exceeds {}",
                    chunk.size,
                    added,
                    chunk_size
                );
            }
        }

        #[test]
        fn chunking_is_deterministic(
            doc in arb_document(),
            chunk_size in 20usize..400,
            overlap in 0usize..200,
        ) {
            let chunker = TextChunker::new(chunk_size, overlap);
            prop_assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));
        }
    }
}

#[test]
fn three_thousand_char_document() {
    let doc: String = (0..60)
        .map(|i| format!("Sentence number {:02} describes topic {:02} in some detail.", i, i))
        .collect::<Vec<_>>()
        .join(" ");
    assert!(doc.len() >= 3000);

    let chunker = TextChunker::new(1000, 200);
    let chunks = chunker.chunk(&doc);
    let longest_sentence = split_into_sentences(&doc)
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap();

    assert!(chunks.len() >= 3, "got {} chunks", chunks.len());
    for chunk in &chunks {
        assert!(chunk.size <= 1000 + longest_sentence);
    }

    // 200 / 6 = 33 words carried over
    for pair in chunks.windows(2) {
        let prefix = overlap_prefix(&pair[0].text, 33).unwrap();
        assert_eq!(prefix.split(' ').count(), 33);
        assert!(pair[1].text.starts_with(&prefix));
    }
}

#[test]
fn three_sentence_document() {
    let chunks = TextChunker::default().chunk("The sky is blue. Water is wet. Fire is hot.");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[0].text, "The sky is blue. Water is wet. Fire is hot.");
}
