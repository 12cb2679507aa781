use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors reported by the storage query backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Select request failed: {0}")]
    Query(String),

    #[error("Select event stream failed: {0}")]
    Stream(String),

    #[error("Invalid storage configuration: {0}")]
    Configuration(String),
}

/// A server-side select over one CSV object
///
/// Framing is fixed: the input has a header row, fields are comma
/// separated, quoted fields may contain record delimiters and nothing is
/// compressed. Output rows are comma separated without a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRequest {
    pub bucket: String,
    pub key: String,
    pub expression: String,
}

impl SelectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            expression: expression.into(),
        }
    }
}

/// One event of a select response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    /// A chunk of output rows. Chunk edges need not fall on row boundaries.
    Records(Bytes),
    Progress,
    Stats,
    Continuation,
    End,
}

/// Finite, non-restartable sequence of select events
///
/// Dropping the stream releases the underlying connection.
#[async_trait]
pub trait SelectEventStream: Send {
    /// Next event in arrival order, `None` once the stream is exhausted
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, StorageError>;
}

/// Backend able to run a select expression against a stored object
#[async_trait]
pub trait SelectSource: Send + Sync {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError>;
}
