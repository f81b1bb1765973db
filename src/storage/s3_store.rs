//! S3 backend.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use crate::config::StorageConfig;
use crate::error_handling::{get_retry_strategy, StorageError};

use super::retry::{with_retry, ConnectionResetRetry, DefaultRetryPolicy, RetryPolicy};
use super::ObjectStore;

/// [`ObjectStore`] over one S3 bucket.
pub struct S3Store {
    bucket: Box<Bucket>,
    policy: Arc<dyn RetryPolicy>,
}

impl S3Store {
    /// Connects to the bucket of `config` with the credentials of its
    /// named profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Setup` if the region, profile or bucket is invalid.
    pub fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::from_profile(Some(config.profile.as_str())).map_err(|e| {
            StorageError::Setup(format!("credentials profile {}: {e}", config.profile))
        })?;
        Self::with_credentials(config, credentials)
    }

    /// Builds the store from explicit credentials.
    ///
    /// Calls retry connection resets on top of the default policy unless
    /// `config.retry_connection_reset` is off.
    pub fn with_credentials(
        config: &StorageConfig,
        credentials: Credentials,
    ) -> Result<Self, StorageError> {
        let region: Region = config
            .region
            .parse()
            .map_err(|e| StorageError::Setup(format!("invalid region {}: {e}", config.region)))?;
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Setup(format!("bucket {}: {e}", config.bucket)))?;

        info!(
            "Using bucket {} in {} (profile {})",
            config.bucket, config.region, config.profile
        );
        let store = S3Store {
            bucket,
            policy: Arc::new(DefaultRetryPolicy),
        };
        if config.retry_connection_reset {
            Ok(store.with_policy(Arc::new(ConnectionResetRetry::new(DefaultRetryPolicy))))
        } else {
            Ok(store)
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(&self) -> &dyn RetryPolicy {
        self.policy.as_ref()
    }
}

/// Maps a client error onto the storage taxonomy.
///
/// Only network and I/O failures become `Transport`; everything else the
/// client reports is a `Client` error and never retried.
pub(crate) fn storage_error(key: &str, error: S3Error) -> StorageError {
    match error {
        S3Error::HttpFailWithBody(status, _) => StorageError::Status {
            key: key.to_string(),
            status,
        },
        S3Error::Hyper(e) => StorageError::Transport {
            key: key.to_string(),
            message: e.to_string(),
        },
        S3Error::Io(e) => StorageError::Transport {
            key: key.to_string(),
            message: e.to_string(),
        },
        other => StorageError::Client {
            key: key.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let bucket = &self.bucket;
        let pages = with_retry(get_retry_strategy(), self.policy.as_ref(), move || async move {
            bucket
                .list(prefix.to_string(), None)
                .await
                .map_err(|e| storage_error(prefix, e))
        })
        .await?;

        let keys: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect();
        debug!("Listed {} objects under {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let bucket = &self.bucket;
        let response = with_retry(get_retry_strategy(), self.policy.as_ref(), move || async move {
            bucket
                .get_object(key)
                .await
                .map_err(|e| storage_error(key, e))
        })
        .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Status {
                key: key.to_string(),
                status,
            });
        }
        Ok(response.bytes().to_vec())
    }
}
