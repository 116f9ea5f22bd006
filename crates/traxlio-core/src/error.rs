use thiserror::Error;

use traxlio_remote::RemoteError;
use traxlio_types::ResourceKind;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{kind} `{id}` not found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("Invalid backup file: {0}")]
    InvalidImport(String),

    #[error("Could not allocate a unique share token after {attempts} attempts")]
    TokenExhausted { attempts: usize },

    #[error("Local store error: {0}")]
    Local(#[from] anyhow::Error),

    #[error("Remote backend error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl InventoryError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
