use crate::remote::ApiError;

/// What a mutation can report back to the view layer. The contract is strict:
/// either the in-memory snapshot changed and the new entity is returned, or it
/// did not change and the caller gets one of these.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Local guard tripped before any network traffic.
    #[error("{0}")]
    Validation(String),

    /// The remote collaborator rejected the call. Surfaced verbatim; never
    /// retried here.
    #[error("{0}")]
    Remote(#[from] ApiError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("encode/decode failed: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("durable storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl StoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> StoreError {
        StoreError::Validation(msg.into())
    }

    /// Stable code string for the IPC surface.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation_failed",
            StoreError::Remote(_) => "remote_rejected",
            StoreError::NotFound { .. } => "not_found",
            StoreError::Codec(_) => "codec_failed",
            StoreError::Storage(_) => "storage_failed",
        }
    }
}
