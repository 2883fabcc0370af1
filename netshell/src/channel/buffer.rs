//! Accumulating output buffer with tail-only prompt search.
//!
//! Prompt patterns are only searched in the last N bytes of the buffer, so
//! long outputs (full configs, MAC tables) do not get rescanned on every
//! chunk.

use regex::bytes::{Match, Regex};

use super::sanitizer::PatternSet;

/// Buffer for accumulating sanitized output and searching for prompts.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated, sanitized output.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Rules applied to each chunk as it arrives.
    patterns: PatternSet,
}

impl PatternBuffer {
    /// Create a buffer using the standard sanitize rules.
    pub fn new(search_depth: usize) -> Self {
        Self::with_patterns(search_depth, PatternSet::default())
    }

    /// Create a buffer with custom sanitize rules.
    pub fn with_patterns(search_depth: usize, patterns: PatternSet) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            patterns,
        }
    }

    /// Sanitize a raw chunk and append it.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = self.patterns.sanitize(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search only the last `search_depth` bytes.
    ///
    /// Offsets in the match are relative to the start of the tail.
    pub fn search_tail(&self, pattern: &Regex) -> Option<Match<'_>> {
        pattern.find(self.tail())
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
