//! Client for the S3-compatible object store backing recorded media.

mod s3;

pub use s3::S3ObjectStoreClient;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::error::RecorderResult;

/// A single entry returned by [`ObjectStoreClient::list`].
#[derive(Debug, Clone)]
pub struct Object {
    /// Full object key.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag as reported by the store.
    pub etag: String,
    /// Last-modified instant as reported by the store.
    pub last_modified: DateTime<Utc>,
}

/// Metadata returned by [`ObjectStoreClient::head`].
#[derive(Debug, Clone)]
pub struct Meta {
    /// MIME type the object was stored with.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag as reported by the store.
    pub etag: String,
    /// Last-modified instant as reported by the store.
    pub last_modified: DateTime<Utc>,
}

/// A downloaded object's metadata plus its body.
pub struct Download {
    /// MIME type the object was stored with.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag as reported by the store.
    pub etag: String,
    /// Last-modified instant as reported by the store.
    pub last_modified: DateTime<Utc>,
    /// Object body, streamed.
    pub body: BoxStream<'static, Result<Bytes, std::io::Error>>,
}

/// Capability interface over an S3-compatible bucket.
///
/// Implementations are injected; tests use fakes rather than a live store.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Lists objects under `prefix`. Never recurses past one path component.
    async fn list(&self, prefix: &str) -> RecorderResult<Vec<Object>>;

    /// Returns metadata for `name` without downloading its body.
    async fn head(&self, name: &str) -> RecorderResult<Meta>;

    /// Downloads `name` in full, as metadata plus a body stream.
    async fn get(&self, name: &str) -> RecorderResult<Download>;

    /// Uploads `body` as `name` with the given content type, overwriting
    /// any existing object under that name.
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        body: BoxStream<'static, Result<Bytes, std::io::Error>>,
    ) -> RecorderResult<()>;

    /// Deletes `name`.
    async fn delete(&self, name: &str) -> RecorderResult<()>;
}
