//! `aws-sdk-s3`-backed [`ObjectStoreClient`] implementation.
//!
//! Talks to any S3-compatible store (the datarecords bucket is typically
//! MinIO) via a static credential pair and a custom endpoint, rather than
//! resolving credentials from the AWS environment chain.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials as AwsCredentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};

use crate::error::{RecorderError, RecorderResult};

use super::{Download, Meta, Object, ObjectStoreClient};

/// A single region placeholder; the endpoint is overridden explicitly, so
/// the region name itself is never resolved against real AWS.
const REGION: &str = "us-east-1";

/// Threshold at which buffered bytes are flushed as a multipart part.
/// S3 requires every non-final part to be at least 5 MiB; 8 MiB keeps part
/// count reasonable for multi-hour recordings without holding much more
/// than one part's worth of audio in memory at a time.
const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;

/// Talks to an S3-compatible bucket over a fixed endpoint URL.
pub struct S3ObjectStoreClient {
    client: Client,
    bucket: String,
}

impl S3ObjectStoreClient {
    /// Builds a client against `endpoint_url` using static credentials.
    #[must_use]
    pub fn new(endpoint_url: &str, user: &str, password: &str, bucket: String) -> Self {
        let credentials = AwsCredentials::new(user, password, None, None, "datarecords-static");
        let config = aws_sdk_s3::Config::builder()
            .region(Region::new(REGION))
            .endpoint_url(endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(true)
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();
        Self {
            client: Client::from_conf(config),
            bucket,
        }
    }

    fn to_datetime(value: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
        value
            .and_then(|dt| DateTime::from_timestamp(dt.secs(), 0))
            .unwrap_or_else(Utc::now)
    }

    /// Drains `body`, uploading each filled part as it crosses
    /// [`MULTIPART_PART_SIZE`]. The last part is uploaded whatever its size,
    /// including zero bytes if `body` was empty, since S3 requires at least
    /// one part per upload.
    async fn upload_parts(
        &self,
        name: &str,
        upload_id: &str,
        body: &mut BoxStream<'static, Result<Bytes, std::io::Error>>,
    ) -> RecorderResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut buffer = BytesMut::new();
        let mut part_number: i32 = 1;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;
            buffer.extend_from_slice(&chunk);
            while buffer.len() >= MULTIPART_PART_SIZE {
                let part = buffer.split_to(MULTIPART_PART_SIZE).freeze();
                parts.push(self.upload_part(name, upload_id, part_number, part).await?);
                part_number += 1;
            }
        }

        if !buffer.is_empty() || parts.is_empty() {
            parts.push(self.upload_part(name, upload_id, part_number, buffer.freeze()).await?);
        }

        Ok(parts)
    }

    async fn upload_part(
        &self,
        name: &str,
        upload_id: &str,
        part_number: i32,
        data: Bytes,
    ) -> RecorderResult<CompletedPart> {
        let response = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(name)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;

        Ok(CompletedPart::builder()
            .part_number(part_number)
            .set_e_tag(response.e_tag().map(str::to_string))
            .build())
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStoreClient {
    async fn list(&self, prefix: &str) -> RecorderResult<Vec<Object>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/");
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;

            for entry in response.contents() {
                objects.push(Object {
                    name: entry.key().unwrap_or_default().to_string(),
                    size: entry.size().unwrap_or(0).max(0) as u64,
                    etag: entry.e_tag().unwrap_or_default().trim_matches('"').to_string(),
                    last_modified: Self::to_datetime(entry.last_modified()),
                });
            }

            if response.is_truncated().unwrap_or(false) {
                continuation = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn head(&self, name: &str) -> RecorderResult<Meta> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e.into_service_error().to_string(), name))?;

        Ok(Meta {
            content_type: response
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
            size: response.content_length().unwrap_or(0).max(0) as u64,
            etag: response.e_tag().unwrap_or_default().trim_matches('"').to_string(),
            last_modified: Self::to_datetime(response.last_modified()),
        })
    }

    async fn get(&self, name: &str) -> RecorderResult<Download> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e.into_service_error().to_string(), name))?;

        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let size = response.content_length().unwrap_or(0).max(0) as u64;
        let etag = response.e_tag().unwrap_or_default().trim_matches('"').to_string();
        let last_modified = Self::to_datetime(response.last_modified());

        let body: BoxStream<'static, Result<Bytes, std::io::Error>> = response
            .body
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)))
            .boxed();

        Ok(Download {
            content_type,
            size,
            etag,
            last_modified,
            body,
        })
    }

    /// Uploads `body` via a multipart upload, streaming parts as they fill
    /// rather than buffering the entire object in memory first — a live
    /// recording can run for hours, and this is the difference between a
    /// bounded part buffer and holding the whole file in RAM.
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        mut body: BoxStream<'static, Result<Bytes, std::io::Error>>,
    ) -> RecorderResult<()> {
        let create = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;
        let upload_id = create
            .upload_id()
            .ok_or_else(|| RecorderError::ObjectStoreUnavailable("multipart upload id missing".to_string()))?
            .to_string();

        match self.upload_parts(name, &upload_id, &mut body).await {
            Ok(parts) => {
                let completed = CompletedMultipartUpload::builder().set_parts(Some(parts)).build();
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(name)
                    .upload_id(&upload_id)
                    .multipart_upload(completed)
                    .send()
                    .await
                    .map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;
                Ok(())
            }
            Err(e) => {
                let _ = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(name)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                Err(e)
            }
        }
    }

    async fn delete(&self, name: &str) -> RecorderResult<()> {
        // S3's DeleteObject returns 204 even for a missing key, so existence
        // has to be checked explicitly first.
        self.head(name).await?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| RecorderError::ObjectStoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

fn map_sdk_error(message: String, name: &str) -> RecorderError {
    if message.contains("NotFound") || message.contains("NoSuchKey") {
        RecorderError::RecordNotFound(name.to_string())
    } else {
        RecorderError::ObjectStoreUnavailable(message)
    }
}
