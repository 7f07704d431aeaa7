//! Sentence-aware text chunking

use uuid::Uuid;

use crate::types::DocumentChunk;

/// Joins sentences inside a chunk
const SENTENCE_JOINER: &str = ". ";
/// Joins words of an oversized sentence
const WORD_JOINER: &str = " ";

/// Text chunker with a fixed maximum chunk length (in characters)
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_size: usize,
}

impl TextChunker {
    /// Create a new chunker; `max_size` is clamped to at least 1
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
        }
    }

    /// Maximum chunk length in characters
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Split text into ordered chunks.
    ///
    /// Every chunk is at most `max_size` characters, except a chunk made of a
    /// single word that is itself longer than `max_size`.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = Buffer::new(self.max_size, SENTENCE_JOINER);

        for sentence in split_sentences(text) {
            if char_len(sentence) > self.max_size {
                if let Some(done) = buffer.take() {
                    chunks.push(done);
                }

                let mut word_chunks = self.pack_words(sentence);
                // The tail of an oversized sentence stays open for the next sentence
                if let Some(last) = word_chunks.pop() {
                    chunks.extend(word_chunks);
                    buffer.reset_to(last);
                }
                continue;
            }

            if let Some(done) = buffer.push(sentence) {
                chunks.push(done);
            }
        }

        if let Some(done) = buffer.take() {
            chunks.push(done);
        }

        chunks
    }

    /// Chunk text into numbered records for a document
    pub fn chunk_document(&self, document_id: Uuid, text: &str) -> Vec<DocumentChunk> {
        DocumentChunk::sequence(document_id, self.chunk(text))
    }

    /// Pack a sentence's words into chunks no longer than `max_size`
    fn pack_words(&self, sentence: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = Buffer::new(self.max_size, WORD_JOINER);

        for word in sentence.split_whitespace() {
            if let Some(done) = buffer.push(word) {
                chunks.push(done);
            }
        }

        if let Some(done) = buffer.take() {
            chunks.push(done);
        }

        chunks
    }
}

/// Running chunk under construction
struct Buffer {
    text: String,
    len: usize,
    max_size: usize,
    joiner: &'static str,
}

impl Buffer {
    fn new(max_size: usize, joiner: &'static str) -> Self {
        Self {
            text: String::new(),
            len: 0,
            max_size,
            joiner,
        }
    }

    /// Append a unit; returns the flushed chunk when the unit did not fit
    fn push(&mut self, unit: &str) -> Option<String> {
        let unit_len = char_len(unit);

        if self.text.is_empty() {
            self.reset_to(unit.to_string());
            return None;
        }

        let joined_len = self.len + self.joiner.len() + unit_len;
        if joined_len > self.max_size {
            let done = std::mem::take(&mut self.text);
            self.reset_to(unit.to_string());
            return Some(done);
        }

        self.text.push_str(self.joiner);
        self.text.push_str(unit);
        self.len = joined_len;
        None
    }

    fn reset_to(&mut self, text: String) {
        self.len = char_len(&text);
        self.text = text;
    }

    fn take(&mut self) -> Option<String> {
        self.len = 0;
        let text = std::mem::take(&mut self.text);
        (!text.is_empty()).then_some(text)
    }
}

/// Split on `.`, `!` and `?`, trimming and dropping empty pieces
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
