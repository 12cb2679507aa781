use chrono::NaiveDate;
use thiserror::Error;

use crate::core::rows::{parse_records, RowError};
use crate::models::Record;
use crate::services::storage::{SelectEvent, SelectRequest, SelectSource, StorageError};

/// Errors that can occur while fetching records
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Rows(#[from] RowError),
}

/// Run a select and turn its output into records
///
/// Payload chunks are concatenated in arrival order and the stream is drained
/// completely before any row is parsed. Any error, from the backend or from a
/// single row, fails the whole fetch.
pub async fn fetch_records(
    source: &dyn SelectSource,
    request: &SelectRequest,
    today: NaiveDate,
) -> Result<Vec<Record>, FetchError> {
    let mut stream = source.select(request).await?;

    let mut payload = Vec::new();
    let mut chunks = 0usize;
    while let Some(event) = stream.next_event().await? {
        match event {
            SelectEvent::Records(bytes) => {
                payload.extend_from_slice(&bytes);
                chunks += 1;
            }
            SelectEvent::End => tracing::trace!("Select stream reported end"),
            _ => {}
        }
    }
    drop(stream);

    tracing::debug!("Received {} bytes in {} chunks", payload.len(), chunks);

    Ok(parse_records(&payload, today)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::SelectEventStream;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct ScriptedStream {
        events: VecDeque<Result<SelectEvent, StorageError>>,
        released: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SelectEventStream for ScriptedStream {
        async fn next_event(&mut self) -> Result<Option<SelectEvent>, StorageError> {
            self.events.pop_front().transpose()
        }
    }

    impl Drop for ScriptedStream {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    /// Hands out one scripted stream and records the request it was asked for
    struct ScriptedSource {
        script: Mutex<Option<Vec<Result<SelectEvent, StorageError>>>>,
        seen: Mutex<Option<SelectRequest>>,
        released: Arc<AtomicBool>,
    }

    impl ScriptedSource {
        fn released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }

        fn new(script: Vec<Result<SelectEvent, StorageError>>) -> Self {
            Self {
                script: Mutex::new(Some(script)),
                seen: Mutex::new(None),
                released: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl SelectSource for ScriptedSource {
        async fn select(&self, request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            let script = self
                .script
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| StorageError::Query("already consumed".into()))?;
            Ok(Box::new(ScriptedStream {
                events: script.into(),
                released: Arc::clone(&self.released),
            }))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SelectSource for FailingSource {
        async fn select(&self, _request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError> {
            Err(StorageError::Query("AccessDenied".into()))
        }
    }

    fn records(chunk: &'static str) -> Result<SelectEvent, StorageError> {
        Ok(SelectEvent::Records(Bytes::from_static(chunk.as_bytes())))
    }

    fn request() -> SelectRequest {
        SelectRequest::new("bucket", "av.csv", "SELECT * FROM S3Object s")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_chunks_split_mid_row_are_joined_in_order() {
        let source = ScriptedSource::new(vec![
            Ok(SelectEvent::Progress),
            records("a,a.jpg,150,1990-05-10,80,B,5"),
            records("8,85\nb,b.jpg,16"),
            Ok(SelectEvent::Stats),
            records("0,,90,E,60,92\n"),
            Ok(SelectEvent::End),
        ]);

        let result = fetch_records(&source, &request(), today()).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].waist, "58");
        assert_eq!(result[0].age, "36");
        assert_eq!(result[1].height, "160");
        assert_eq!(result[1].age, "-");
        assert_eq!(source.seen.lock().unwrap().as_ref(), Some(&request()));
        assert!(source.released());
    }

    #[tokio::test]
    async fn test_stream_error_after_payload_fails_fetch() {
        let source = ScriptedSource::new(vec![
            records("a,a.jpg,150,,80,B,58,85\n"),
            Err(StorageError::Stream("connection reset".into())),
        ]);

        let err = fetch_records(&source, &request(), today()).await.unwrap_err();
        assert!(matches!(err, FetchError::Storage(StorageError::Stream(_))));
        assert!(source.released());
    }

    #[tokio::test]
    async fn test_query_failure_is_propagated() {
        let err = fetch_records(&FailingSource, &request(), today()).await.unwrap_err();
        assert!(matches!(err, FetchError::Storage(StorageError::Query(_))));
    }

    #[tokio::test]
    async fn test_bad_birthdate_fails_fetch() {
        let source = ScriptedSource::new(vec![
            records("a,a.jpg,150,1990-05-10,80,B,58,85\n"),
            records("b,b.jpg,150,10 May 1990,80,B,58,85\n"),
            Ok(SelectEvent::End),
        ]);

        let err = fetch_records(&source, &request(), today()).await.unwrap_err();
        assert!(matches!(err, FetchError::Rows(RowError::Birthdate { row: 2, .. })));
        assert!(source.released());
    }

    #[tokio::test]
    async fn test_no_payload_yields_no_records() {
        let source = ScriptedSource::new(vec![Ok(SelectEvent::End)]);

        let result = fetch_records(&source, &request(), today()).await.unwrap();
        assert!(result.is_empty());
    }
}
