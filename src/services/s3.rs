//! S3 Select backend for [`SelectSource`].

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::Builder as S3ConfigBuilder,
    error::DisplayErrorContext,
    operation::select_object_content::SelectObjectContentOutput,
    types::{
        CompressionType, CsvInput, CsvOutput, ExpressionType, FileHeaderInfo, InputSerialization,
        OutputSerialization, SelectObjectContentEventStream,
    },
    Client as S3Client,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::StorageSettings;
use crate::services::storage::{
    SelectEvent, SelectEventStream, SelectRequest, SelectSource, StorageError,
};

const FIELD_DELIMITER: &str = ",";

/// Runs select expressions with `SelectObjectContent`
///
/// Built once at startup and shared through application state.
#[derive(Debug, Clone)]
pub struct S3SelectClient {
    client: S3Client,
}

impl S3SelectClient {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build a client for the configured region and endpoint
    ///
    /// Credentials come from the default provider chain.
    pub async fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        if settings.region.trim().is_empty() {
            return Err(StorageError::Configuration("storage.region must not be empty".into()));
        }

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint_url) = &settings.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        if settings.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        info!(
            "S3 select client ready (region: {}, endpoint: {})",
            settings.region,
            settings.endpoint.as_deref().unwrap_or("default")
        );

        Ok(Self::new(S3Client::from_conf(s3_config_builder.build())))
    }
}

#[async_trait]
impl SelectSource for S3SelectClient {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn SelectEventStream>, StorageError> {
        debug!("Selecting from s3://{}/{}: {}", request.bucket, request.key, request.expression);

        let input = InputSerialization::builder()
            .compression_type(CompressionType::None)
            .csv(
                CsvInput::builder()
                    .file_header_info(FileHeaderInfo::Use)
                    .field_delimiter(FIELD_DELIMITER)
                    .allow_quoted_record_delimiter(true)
                    .build(),
            )
            .build();

        let output = OutputSerialization::builder()
            .csv(CsvOutput::builder().field_delimiter(FIELD_DELIMITER).build())
            .build();

        let response = self
            .client
            .select_object_content()
            .bucket(&request.bucket)
            .key(&request.key)
            .expression_type(ExpressionType::Sql)
            .expression(&request.expression)
            .input_serialization(input)
            .output_serialization(output)
            .send()
            .await
            .map_err(|e| StorageError::Query(DisplayErrorContext(&e).to_string()))?;

        Ok(Box::new(S3SelectStream { output: response }))
    }
}

/// Event stream of one `SelectObjectContent` call
struct S3SelectStream {
    output: SelectObjectContentOutput,
}

#[async_trait]
impl SelectEventStream for S3SelectStream {
    async fn next_event(&mut self) -> Result<Option<SelectEvent>, StorageError> {
        loop {
            let event = self
                .output
                .payload
                .recv()
                .await
                .map_err(|e| StorageError::Stream(DisplayErrorContext(&e).to_string()))?;

            let event = match event {
                None => return Ok(None),
                Some(SelectObjectContentEventStream::Records(records)) => SelectEvent::Records(
                    records
                        .payload()
                        .map(|blob| Bytes::copy_from_slice(blob.as_ref()))
                        .unwrap_or_default(),
                ),
                Some(SelectObjectContentEventStream::Progress(_)) => SelectEvent::Progress,
                Some(SelectObjectContentEventStream::Stats(_)) => SelectEvent::Stats,
                Some(SelectObjectContentEventStream::Cont(_)) => SelectEvent::Continuation,
                Some(SelectObjectContentEventStream::End(_)) => SelectEvent::End,
                Some(other) => {
                    debug!("Skipping unrecognized select event: {:?}", other);
                    continue;
                }
            };

            return Ok(Some(event));
        }
    }
}
