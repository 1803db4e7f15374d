//! Object store boundary: a four-operation capability trait plus the
//! S3-compatible implementation.
//!
//! The trait is annotated for `mockall` so the batch uploader and the
//! orchestrator can be tested against deterministic mocks, the same way the
//! upload contract is mocked elsewhere in the test suite.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{BackupError, BackupResult};

/// Boxed error type for store operations; implementations flatten their
/// client errors into this.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Capability interface over a key-addressed object store.
///
/// Implemented by [`S3Store`] for real buckets and by the generated
/// `MockObjectStore` in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the contents of a local file under `key`.
    async fn put_object(&self, key: &str, local_path: &Path) -> Result<(), StoreError>;

    /// List all object keys under `prefix`. Inherits the eventual consistency
    /// of the underlying store; not transactional with recent uploads.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Whether an object exists at `key`.
    async fn object_exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete the object at `key`.
    async fn delete_object(&self, key: &str) -> Result<(), StoreError>;
}

/// [`ObjectStore`] backed by an S3-compatible bucket via `aws-sdk-s3`.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Builds the SDK client and binds it to `bucket`.
    ///
    /// An explicit credentials file is exported to the SDK's shared-config
    /// chain before the client is built. A custom endpoint (MinIO and
    /// friends) switches the client to path-style addressing.
    pub async fn connect(
        bucket: &str,
        credentials_file: Option<&Path>,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> BackupResult<Self> {
        if bucket.is_empty() {
            return Err(BackupError::config("bucket", "must not be empty"));
        }

        if let Some(credentials) = credentials_file {
            if !credentials.exists() {
                return Err(BackupError::not_found(credentials));
            }
            // The SDK reads this during config load, like the shared profile.
            std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", credentials);
            info!(credentials = %credentials.display(), "using credentials file");
        }

        let region = Region::new(region.unwrap_or("us-east-1").to_string());
        let mut loader = aws_config::from_env().region(region);
        if let Some(url) = endpoint {
            loader = loader.endpoint_url(url);
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if endpoint.is_some() {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        info!(bucket = %bucket, "connected to bucket");
        Ok(S3Store {
            client,
            bucket: bucket.to_string(),
        })
    }

    /// Bucket this store is bound to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, local_path: &Path) -> Result<(), StoreError> {
        let body = ByteStream::from_path(local_path).await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn object_exists(&self, key: &str) -> Result<bool, StoreError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(service_error.into())
                }
            }
        }
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}
