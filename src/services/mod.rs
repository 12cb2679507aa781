// Service exports
pub mod fetcher;
pub mod s3;
pub mod storage;

pub use fetcher::{fetch_records, FetchError};
pub use s3::S3SelectClient;
pub use storage::{SelectEvent, SelectEventStream, SelectRequest, SelectSource, StorageError};
