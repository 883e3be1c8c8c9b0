//! Splits a long prompt into parts that each fit an input box of fixed size.
//!
//! Cuts happen at the last ASCII space that keeps a part within the limit, or
//! hard at the limit when a run of text has no usable space. The first part
//! carries the leading marker and the last part carries the trailing marker,
//! unless the input already fits, in which case it is returned untouched.

mod boundary;

use divider_core::{ChunkError, ChunkReport, ChunkerConfig};

use boundary::CharView;

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    pub fn chunk(&self, text: &str, max_chunk_size: usize) -> Result<Vec<String>, ChunkError> {
        self.check_size(max_chunk_size)?;

        let view = CharView::new(text);
        if view.len() <= max_chunk_size {
            return Ok(vec![text.to_string()]);
        }

        let chunks = self
            .marked_pieces(&view, max_chunk_size)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .collect::<Vec<_>>();

        tracing::debug!(
            input_chars = view.len(),
            max_chunk_size,
            chunks = chunks.len(),
            "divided prompt"
        );

        Ok(chunks)
    }

    /// Cuts a text longer than `max_chunk_size` into untrimmed pieces with
    /// the markers attached.
    fn marked_pieces(&self, view: &CharView<'_>, max_chunk_size: usize) -> Vec<String> {
        let leading = &self.config.leading_marker;
        let trailing = &self.config.trailing_marker;

        let first_size = max_chunk_size - self.config.leading_len();
        let first_end = view
            .last_space_between(0, first_size)
            .unwrap_or(first_size);

        let mut pieces = vec![format!("{}{}", view.slice(0, first_end), leading)];
        let mut last_len = first_end + self.config.leading_len();

        let mut start = first_end;
        while start < view.len() {
            let limit = start.saturating_add(max_chunk_size);
            // A space at `start` itself would not advance, so search after it.
            let end = view
                .last_space_between(start + 1, limit)
                .unwrap_or(limit)
                .min(view.len());

            pieces.push(view.slice(start, end).to_string());
            last_len = end - start;
            start = end;
        }

        if last_len + self.config.trailing_len() <= max_chunk_size {
            if let Some(last) = pieces.last_mut() {
                last.push_str(trailing);
            }
        } else {
            pieces.push(trailing.clone());
        }

        pieces
    }

    pub fn report(&self, text: &str, max_chunk_size: usize) -> Result<ChunkReport, ChunkError> {
        let chunks = self.chunk(text, max_chunk_size)?;
        Ok(ChunkReport::new(chunks, max_chunk_size, text.chars().count()))
    }

    /// Rejects sizes of zero and sizes that cannot hold the leading marker.
    pub fn check_size(&self, max_chunk_size: usize) -> Result<(), ChunkError> {
        if max_chunk_size == 0 {
            return Err(ChunkError::InvalidArgument(
                "max_chunk_size must be a positive integer".to_string(),
            ));
        }

        let marker_len = self.config.leading_len();
        if max_chunk_size < marker_len {
            return Err(ChunkError::Configuration {
                max_chunk_size,
                marker_len,
            });
        }

        Ok(())
    }
}

/// Divides `text` with the default markers.
pub fn chunk(text: &str, max_chunk_size: usize) -> Result<Vec<String>, ChunkError> {
    Chunker::default().chunk(text, max_chunk_size)
}
