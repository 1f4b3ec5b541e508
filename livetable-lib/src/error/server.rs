//! Script endpoint error types

/// Errors from the script endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The signature does not match the carried payload.
    #[error("HMAC verification failed")]
    SignatureInvalid,

    /// The payload was present but could not be decoded. The message is
    /// what the endpoint reports back to the page console.
    #[error("{0}")]
    PayloadMalformed(String),

    /// Failed to serialize a script request payload.
    #[error("Script payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to bind or drive the endpoint listener.
    #[error("Script endpoint I/O error: {0}")]
    Io(#[from] std::io::Error),
}
