use std::env;

use anyhow::{bail, Context, Result};

use crate::models::{
    ChunkerConfig, DEFAULT_LEADING_MARKER, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_TRAILING_MARKER,
};

pub const ENV_MAX_CHUNK_SIZE: &str = "DIVIDER_MAX_CHUNK_SIZE";
pub const ENV_LEADING_MARKER: &str = "DIVIDER_LEADING_MARKER";
pub const ENV_TRAILING_MARKER: &str = "DIVIDER_TRAILING_MARKER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerSettings {
    pub max_chunk_size: usize,
    pub chunker: ChunkerConfig,
}

impl Default for DividerSettings {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            chunker: ChunkerConfig::default(),
        }
    }
}

impl DividerSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_chunk_size = match lookup(ENV_MAX_CHUNK_SIZE) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{ENV_MAX_CHUNK_SIZE} must be an integer, got {raw:?}"))?,
            None => DEFAULT_MAX_CHUNK_SIZE,
        };

        let chunker = ChunkerConfig::new(
            lookup(ENV_LEADING_MARKER).unwrap_or_else(|| DEFAULT_LEADING_MARKER.to_string()),
            lookup(ENV_TRAILING_MARKER).unwrap_or_else(|| DEFAULT_TRAILING_MARKER.to_string()),
        );

        let settings = Self {
            max_chunk_size,
            chunker,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            bail!("{ENV_MAX_CHUNK_SIZE} must be > 0");
        }

        if self.max_chunk_size < self.chunker.leading_len() {
            bail!(
                "{ENV_MAX_CHUNK_SIZE} ({}) cannot hold the leading marker ({} characters)",
                self.max_chunk_size,
                self.chunker.leading_len()
            );
        }

        Ok(())
    }
}
