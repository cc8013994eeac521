//! AWS S3 object store.
//!
//! Backed by the official `aws-sdk-s3` crate. Credentials are resolved in the
//! standard AWS order: environment variables, shared credentials file, then
//! instance profile. Setting `endpoint_url` points the store at any
//! S3-compatible service such as MinIO or LocalStack.
//!
//! The SDK is async; the store owns a current-thread Tokio runtime and blocks
//! on each request. Do not call it from inside another Tokio runtime.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Builder as S3Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tokio::runtime::Runtime;

use crate::error::ResolveError;
use crate::source::ObjectStore;

/// Configuration for [`S3ObjectStore`].
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// AWS region; falls back to the environment when unset.
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible services.
    pub endpoint_url: Option<String>,
    /// Force path-style addressing (required by MinIO).
    ///
    /// Enabled automatically by [`S3Config::with_endpoint`].
    pub force_path_style: bool,
}

impl S3Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the S3 endpoint URL. Also enables path-style addressing.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self.force_path_style = true;
        self
    }

    pub fn with_path_style(mut self, enabled: bool) -> Self {
        self.force_path_style = enabled;
        self
    }
}

/// Object store backed by AWS S3.
pub struct S3ObjectStore {
    client: Client,
    runtime: Runtime,
}

impl S3ObjectStore {
    /// Build the store, loading credentials through the AWS SDK chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal runtime cannot be started.
    pub fn new(config: S3Config) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = runtime.block_on(loader.load());

        let mut s3_builder = S3Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            s3_builder = s3_builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(s3_builder.build()),
            runtime,
        })
    }
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str, version: &str) -> Result<Vec<u8>, ResolveError> {
        // The SDK rejects an empty versionId; omitting it selects the latest version.
        let version_id = (!version.is_empty()).then(|| version.to_string());

        self.runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .set_version_id(version_id)
                .send()
                .await
                .map_err(|e| ResolveError::RemoteFetch {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            let body = output
                .body
                .collect()
                .await
                .map_err(|e| ResolveError::RemoteBody {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: e.to_string(),
                })?;

            Ok(body.into_bytes().to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_endpoint_enables_path_style() {
        let config = S3Config::new().with_endpoint("http://localhost:9000");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.force_path_style);

        let config = config.with_path_style(false);
        assert!(!config.force_path_style);
    }

    #[test]
    fn default_config_uses_environment() {
        let config = S3Config::new();
        assert!(config.region.is_none());
        assert!(config.endpoint_url.is_none());
        assert!(!config.force_path_style);

        let config = config.with_region("eu-west-1");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    }
}
