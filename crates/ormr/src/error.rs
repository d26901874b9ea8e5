//! Engine error type.
//!
//! Failures are local to the operation that produced them; there is no global
//! error channel. Callers check the returned `Result` synchronously.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong inside the engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `EntityStore::create` was asked for a class that was never registered.
    #[error("no entity class registered under `{0}`")]
    UnknownClass(String),

    /// A registered resource could not be read or decoded.
    #[error("failed to load resource `{id}` from {}", path.display())]
    Resource {
        id: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A tile map document failed to parse.
    #[error("invalid tile map")]
    TileMapParse(#[from] serde_json::Error),

    /// A tile map parsed but its shape is unusable.
    #[error("invalid tile map: {0}")]
    TileMapShape(String),
}
