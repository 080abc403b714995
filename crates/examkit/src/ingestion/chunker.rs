//! Word-based text chunking with bounded size and overlap
//!
//! The chunker operates on whitespace-delimited words and never splits a
//! word. Chunk length is the rendered length: the words joined by single
//! spaces. When a chunk fills up, the next chunk is seeded with as many
//! trailing whole words of the previous chunk as fit within the overlap
//! budget.

use crate::config::ChunkingConfig;

/// Sliding window of words with a running rendered length.
struct WordWindow<'a> {
    words: Vec<&'a str>,
    rendered_len: usize,
}

impl<'a> WordWindow<'a> {
    fn new() -> Self {
        Self {
            words: Vec::new(),
            rendered_len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Rendered length if `word` were appended.
    fn rendered_len_with(&self, word: &str) -> usize {
        let separator = usize::from(!self.words.is_empty());
        self.rendered_len + separator + word.len()
    }

    fn push(&mut self, word: &'a str) {
        self.rendered_len = self.rendered_len_with(word);
        self.words.push(word);
    }

    fn render(&self) -> String {
        self.words.join(" ")
    }

    /// Keep only a suffix of trailing whole words whose rendered length fits
    /// within `budget`, greedily from the back.
    fn retain_suffix_within(&mut self, budget: usize) {
        let mut kept = 0;
        let mut kept_len = 0;
        for word in self.words.iter().rev() {
            let extra = word.len() + usize::from(kept > 0);
            if kept_len + extra > budget {
                break;
            }
            kept_len += extra;
            kept += 1;
        }
        self.words.drain(..self.words.len() - kept);
        self.rendered_len = kept_len;
    }

    fn clear(&mut self) {
        self.words.clear();
        self.rendered_len = 0;
    }
}

/// Splits text into an ordered sequence of overlapping, size-bounded chunks
pub struct Chunker {
    max_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker with the given rendered-size bound and overlap
    pub fn new(max_size: usize, overlap: usize) -> Self {
        Self { max_size, overlap }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chunk_size, config.chunk_overlap)
    }

    /// Split `text` into chunks. Emitted chunks are never empty or
    /// whitespace-only. A single word longer than the size bound still gets
    /// its own place in a chunk: the bound only triggers once the window
    /// already holds content.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window = WordWindow::new();

        for word in text.split_whitespace() {
            if !window.is_empty() && window.rendered_len_with(word) > self.max_size {
                chunks.push(window.render());
                if self.overlap > 0 && self.max_size > 0 {
                    window.retain_suffix_within(self.overlap);
                } else {
                    window.clear();
                }
            }
            window.push(word);
        }

        if !window.is_empty() {
            chunks.push(window.render());
        }

        chunks.retain(|chunk| !chunk.trim().is_empty());
        chunks
    }
}
