use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The first chunk cannot even hold the leading marker.
    #[error(
        "chunk size {max_chunk_size} is too small; it must be at least {marker_len} characters to accommodate the leading marker"
    )]
    Configuration {
        max_chunk_size: usize,
        marker_len: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChunkError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }
}

/// Converts an untyped size (JSON number, env value) into a chunk size.
pub fn chunk_size_from_i64(value: i64) -> Result<usize, ChunkError> {
    if value <= 0 {
        return Err(ChunkError::InvalidArgument(format!(
            "max_chunk_size must be a positive integer, got {value}"
        )));
    }

    usize::try_from(value).map_err(|_| {
        ChunkError::InvalidArgument(format!("max_chunk_size {value} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            chunk_size_from_i64(0),
            Err(ChunkError::InvalidArgument(_))
        ));
        assert!(matches!(
            chunk_size_from_i64(-12),
            Err(ChunkError::InvalidArgument(_))
        ));
        assert_eq!(chunk_size_from_i64(1500), Ok(1500));
    }

    #[test]
    fn configuration_message_names_marker_length() {
        let err = ChunkError::Configuration {
            max_chunk_size: 3,
            marker_len: 10,
        };
        assert!(err.to_string().contains("at least 10 characters"));
        assert_eq!(err.code(), "configuration_error");
    }
}
