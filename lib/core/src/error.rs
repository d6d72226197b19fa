use crate::item::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Item not found in current catalog snapshot: {0}")]
    ItemNotFound(ItemId),

    #[error("Duplicate item id in catalog: {0}")]
    DuplicateId(ItemId),

    #[error("Similarity matrix was built from a different catalog snapshot (catalog: {catalog_len} items, matrix: {matrix_len} items)")]
    SnapshotMismatch { catalog_len: usize, matrix_len: usize },

    #[error("Invalid feature weights: {0}")]
    InvalidWeights(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
