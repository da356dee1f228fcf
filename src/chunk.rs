use crate::error::{Result, TubesumError};
use crate::tokenize::TokenCodec;
use tracing::debug;

/// Default window size for the summarization model input.
pub const DEFAULT_MAX_TOKENS: usize = 700;

/// A decoded token window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub token_count: usize,
    pub text: String,
}

/// Partition a token sequence into consecutive windows of `max_tokens`.
///
/// Every window except the last holds exactly `max_tokens` ids. An empty
/// sequence yields no windows.
pub fn token_windows(ids: &[u32], max_tokens: usize) -> Result<std::slice::Chunks<'_, u32>> {
    if max_tokens == 0 {
        return Err(TubesumError::ChunkingPrecondition(max_tokens));
    }
    Ok(ids.chunks(max_tokens))
}

/// Split text into segments that each fit in `max_tokens` tokens.
///
/// Boundaries are computed in token space, so a segment may start or end
/// mid-word.
pub fn split_into_chunks(
    text: &str,
    tokenizer: &dyn TokenCodec,
    max_tokens: usize,
) -> Result<Vec<TextChunk>> {
    if max_tokens == 0 {
        return Err(TubesumError::ChunkingPrecondition(max_tokens));
    }

    let ids = tokenizer.encode(text)?;
    debug!("Chunking {} tokens into windows of {}", ids.len(), max_tokens);

    token_windows(&ids, max_tokens)?
        .enumerate()
        .map(|(index, window)| {
            Ok(TextChunk {
                index,
                token_count: window.len(),
                text: tokenizer.decode(window)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per character.
    struct CharCodec;

    impl TokenCodec for CharCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            Ok(text.chars().map(|c| c as u32).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String> {
            Ok(ids.iter().filter_map(|&id| char::from_u32(id)).collect())
        }
    }

    #[test]
    fn test_exact_multiple_of_window() {
        let text = "a".repeat(1400);
        let chunks = split_into_chunks(&text, &CharCodec, 700).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.token_count == 700));
    }

    #[test]
    fn test_one_token_over_window() {
        let text = "b".repeat(1401);
        let chunks = split_into_chunks(&text, &CharCodec, 700).unwrap();
        let counts: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
        assert_eq!(counts, vec![700, 700, 1]);
        assert_eq!(chunks[2].text, "b");
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = split_into_chunks("", &CharCodec, 700).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("hello there", &CharCodec, 700).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "hello there");
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = split_into_chunks("anything", &CharCodec, 0);
        assert!(matches!(result, Err(TubesumError::ChunkingPrecondition(0))));

        let ids = [1, 2, 3];
        assert!(token_windows(&ids, 0).is_err());
    }

    #[test]
    fn test_partition_is_lossless() {
        let texts = [
            "The quick brown fox jumps over the lazy dog.",
            "Grüße aus München, übrigens: 東京 ist weit weg!",
            "x",
        ];

        for text in texts {
            let original = CharCodec.encode(text).unwrap();
            for max_tokens in 1..=12 {
                let chunks = split_into_chunks(text, &CharCodec, max_tokens).unwrap();

                let mut rejoined = Vec::new();
                for (i, chunk) in chunks.iter().enumerate() {
                    let ids = CharCodec.encode(&chunk.text).unwrap();
                    assert!(ids.len() <= max_tokens);
                    if i + 1 < chunks.len() {
                        assert_eq!(ids.len(), max_tokens);
                    } else {
                        assert!(!ids.is_empty());
                    }
                    rejoined.extend(ids);
                }

                assert_eq!(rejoined, original, "text={:?} max={}", text, max_tokens);
            }
        }
    }

    #[test]
    fn test_windows_preserve_order() {
        let chunks = split_into_chunks("abcdefg", &CharCodec, 3).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
        assert_eq!(chunks[2].index, 2);
    }
}
