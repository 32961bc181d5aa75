use thiserror::Error;

/// Type alias of the [`Result`] type specific to `sea-kfmt`.
pub type StreamResult<T, E> = std::result::Result<T, StreamErr<E>>;

#[derive(Error, Debug)]
/// Common errors that may occur.
pub enum StreamErr<E: std::error::Error> {
    #[error("Connection Error: {0}")]
    Connect(String),
    #[error("Timeout has not yet been set")]
    TimeoutNotSet,
    #[error("Stream key set is empty")]
    StreamKeyEmpty,
    #[error("Record has no topic and the producer has no default topic")]
    NoTopic,
    #[error("Backend error: {0}")]
    Backend(E),
    #[error("Runtime error: {0}")]
    Runtime(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when handling StreamKey
pub enum StreamKeyErr {
    #[error("Invalid stream key: valid pattern is [a-zA-Z0-9._-]{{1, 249}}")]
    InvalidStreamKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when parsing a [`crate::SeqPos`]
pub enum SeqPosErr {
    #[error("Expected `beginning`, `end` or a non-negative offset, found `{0}`")]
    Invalid(String),
}

/// Function to construct a [`StreamErr::Runtime`] error variant.
pub fn runtime_error<T: std::error::Error, E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> StreamErr<T> {
    StreamErr::Runtime(Box::new(e))
}
