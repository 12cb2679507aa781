// Shared fakes for integration tests

use async_trait::async_trait;
use bytes::Bytes;
use kuso_search::services::{SelectEvent, SelectEventStream, SelectRequest, SelectSource, StorageError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-memory select backend
///
/// Returns the configured payload split into fixed-size chunks and records
/// every request it receives. It does not evaluate the expression.
pub struct MemorySource {
    payload: Vec<u8>,
    chunk_size: usize,
    fail_stream: bool,
    pub requests: Mutex<Vec<SelectRequest>>,
}

impl MemorySource {
    pub fn new(payload: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        Self {
            payload: payload.into(),
            chunk_size: chunk_size.max(1),
            fail_stream: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Same payload, but the stream reports an error after the last chunk
    pub fn failing(payload: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        Self {
            fail_stream: true,
            ..Self::new(payload, chunk_size)
        }
    }

    pub fn last_expression(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.expression.clone())
    }
}

struct MemoryStream(VecDeque<Result<SelectEvent, StorageError>>);

#[async_trait]
impl SelectEventStream for MemoryStream {
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, StorageError> {
        self.0.pop_front().transpose()
    }
}

#[async_trait]
impl SelectSource for MemorySource {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut events: VecDeque<_> = self
            .payload
            .chunks(self.chunk_size)
            .map(|chunk| Ok(SelectEvent::Records(Bytes::copy_from_slice(chunk))))
            .collect();
        events.push_front(Ok(SelectEvent::Progress));
        events.push_back(Ok(SelectEvent::Stats));
        if self.fail_stream {
            events.push_back(Err(StorageError::Stream("connection reset".into())));
        } else {
            events.push_back(Ok(SelectEvent::End));
        }

        Ok(Box::new(MemoryStream(events)))
    }
}

/// Backend whose select call itself fails
pub struct UnreachableSource;

#[async_trait]
impl SelectSource for UnreachableSource {
    async fn select(&self, _request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError> {
        Err(StorageError::Query("dispatch failure".into()))
    }
}
