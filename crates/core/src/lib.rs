pub mod error;
pub mod models;
pub mod settings;

pub use error::{chunk_size_from_i64, ChunkError};
pub use models::*;
pub use settings::DividerSettings;
