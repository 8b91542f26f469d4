use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("no item with id {0}")]
    ItemNotFound(Uuid),
    #[error("category {0:?} already exists")]
    DuplicateCategory(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
