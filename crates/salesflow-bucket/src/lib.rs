//! Object-storage access for the raw sales export.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::Client;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "my-sales-bucket".to_string(),
            force_path_style: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum BucketError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
    #[error("object not found: {0}")]
    NotFound(String),
}

impl BucketError {
    fn from_sdk(err: impl fmt::Display) -> Self {
        Self::Sdk(err.to_string())
    }
}

#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Name of the bucket objects are read from.
    fn bucket(&self) -> &str;

    async fn get_object(&self, key: &str) -> Result<Bytes, BucketError>;
}

#[derive(Clone)]
pub struct S3BucketStore {
    client: Client,
    bucket: String,
}

impl S3BucketStore {
    /// Builds an S3 client from an already-resolved SDK config.
    pub fn new(sdk_config: &SdkConfig, config: S3Config) -> Result<Self, BucketError> {
        if config.bucket.is_empty() {
            return Err(BucketError::Configuration(
                "bucket name cannot be empty".into(),
            ));
        }

        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        Ok(Self {
            client,
            bucket: config.bucket,
        })
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BucketError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(service_err) => {
                    if service_err.err().is_no_such_key() {
                        BucketError::NotFound(key.to_string())
                    } else {
                        BucketError::from_sdk(service_err.err())
                    }
                }
                other => BucketError::from_sdk(other),
            })?;

        let data = output.body.collect().await.map_err(BucketError::from_sdk)?;
        let bytes = data.into_bytes();
        debug!(bucket = %self.bucket, key, bytes = bytes.len(), "fetched object");
        Ok(bytes)
    }
}

/// Bucket held entirely in memory. Stands in for S3 in tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    bucket: String,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBucketStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_object(
        bucket: impl Into<String>,
        key: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        let mut objects = HashMap::new();
        objects.insert(key.into(), contents.into());
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(objects),
        }
    }

    pub async fn insert(&self, key: impl Into<String>, contents: impl Into<Bytes>) {
        self.objects.lock().await.insert(key.into(), contents.into());
    }
}

#[async_trait]
impl BucketStore for MemoryBucketStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BucketError> {
        self.objects
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BucketError::NotFound(key.to_string()))
    }
}
