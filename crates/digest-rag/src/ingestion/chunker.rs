//! Sentence-aware text chunking with overlap

use std::ops::Range;

use crate::error::{Error, Result};

/// Text chunker with a character ceiling and trailing overlap
///
/// Lengths are counted in `char`s, not bytes, so multi-byte text is never
/// split inside a code point.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum characters per chunk
    max_chunk_chars: usize,
    /// Characters carried from the end of one chunk into the next
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// `max_chunk_chars` is clamped to at least 1.
    pub fn new(max_chunk_chars: usize, overlap: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
            overlap,
        }
    }

    /// Split text into ordered, overlapping chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.spans(&chars)
            .into_iter()
            .map(|span| chars[span].iter().collect())
            .collect()
    }

    /// Split text, refusing documents that need more than `max_chunks` chunks
    pub fn chunk_with_limit(&self, text: &str, max_chunks: usize) -> Result<Vec<String>> {
        let chunks = self.chunk(text);
        if chunks.len() > max_chunks {
            return Err(Error::too_large(format!(
                "Document is too long: it produces {} chunks, the limit is {}",
                chunks.len(),
                max_chunks
            )));
        }
        Ok(chunks)
    }

    /// Character ranges of each chunk within `text`
    pub fn chunk_spans(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<char> = text.chars().collect();
        self.spans(&chars)
    }

    fn spans(&self, chars: &[char]) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        // Start of the running buffer
        let mut start = 0usize;
        // Everything before this index is already part of an emitted chunk
        let mut emitted_to = 0usize;

        for pos in 1..=chars.len() {
            if pos - start < self.max_chunk_chars {
                continue;
            }

            // Periods inside the carried-over overlap were already cut at once
            let cut = self.find_cut(chars, emitted_to, pos);
            spans.push(start..cut);
            emitted_to = cut;

            // Seed must stay shorter than the chunk or the buffer never shrinks
            let seed = self.overlap.min(cut - start - 1);
            start = cut - seed;
        }

        if chars.len() > emitted_to {
            spans.push(start..chars.len());
        }

        spans
    }

    /// Cut after the last sentence-ending period in `search_from..end`, else at `end`
    fn find_cut(&self, chars: &[char], search_from: usize, end: usize) -> usize {
        (search_from..end)
            .rev()
            .find(|&i| is_sentence_end(chars, i))
            .map(|i| i + 1)
            .unwrap_or(end)
    }
}

/// A period followed by whitespace or by the end of the text
fn is_sentence_end(chars: &[char], i: usize) -> bool {
    chars[i] == '.' && chars.get(i + 1).map_or(true, |c| c.is_whitespace())
}
