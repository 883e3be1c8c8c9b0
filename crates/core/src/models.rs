use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_LEADING_MARKER: &str = "";
pub const DEFAULT_TRAILING_MARKER: &str = "\n\n(FINISHED)";

/// Markers attached to a multi-part submission.
///
/// The leading marker rides on the first chunk and tells the receiver to wait
/// for more input. The trailing marker closes the last chunk, or becomes a
/// chunk of its own when it does not fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub leading_marker: String,
    pub trailing_marker: String,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            leading_marker: DEFAULT_LEADING_MARKER.to_string(),
            trailing_marker: DEFAULT_TRAILING_MARKER.to_string(),
        }
    }
}

impl ChunkerConfig {
    pub fn new(leading_marker: impl Into<String>, trailing_marker: impl Into<String>) -> Self {
        Self {
            leading_marker: leading_marker.into(),
            trailing_marker: trailing_marker.into(),
        }
    }

    pub fn leading_len(&self) -> usize {
        self.leading_marker.chars().count()
    }

    pub fn trailing_len(&self) -> usize {
        self.trailing_marker.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkReport {
    pub chunks: Vec<String>,
    pub total_chunks: usize,
    pub max_chunk_size: usize,
    pub input_chars: usize,
    /// False when the input already fit and was returned untouched.
    pub marked: bool,
}

impl ChunkReport {
    pub fn new(chunks: Vec<String>, max_chunk_size: usize, input_chars: usize) -> Self {
        let marked = input_chars > max_chunk_size;
        Self {
            total_chunks: chunks.len(),
            chunks,
            max_chunk_size,
            input_chars,
            marked,
        }
    }

    /// Looks up a chunk by its 1-based part number.
    pub fn part(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.chunks.get(idx))
            .map(String::as_str)
    }
}
