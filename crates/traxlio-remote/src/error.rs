use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid backend URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Insert into {table} returned no row")]
    EmptyInsert { table: &'static str },
}
