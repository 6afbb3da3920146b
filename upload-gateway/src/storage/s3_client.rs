/// S3-compatible object storage client
///
/// Mirrors uploaded files into a bucket on AWS S3 or a compatible service
/// (MinIO, DigitalOcean Spaces, etc.).

use anyhow::{bail, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::{ObjectStore, StorageError};

/// S3 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint, e.g. `http://localhost:9000` for MinIO
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            path_style: false,
        }
    }
}

impl S3Config {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            bail!("S3 bucket name cannot be empty");
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            bail!("S3 access key id and secret access key must be set together");
        }
        Ok(())
    }
}

/// S3 client for object storage operations
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client. Static credentials take precedence over the
    /// default AWS provider chain.
    pub async fn new(config: S3Config) -> Result<Self> {
        info!("Initializing S3 client for bucket: {}", config.bucket);

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "upload-gateway",
            ));
        }

        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.path_style);
        if let Some(endpoint) = &config.endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket, key, "Uploading file to S3");

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Remote(DisplayErrorContext(&e).to_string()))?;

        info!(bucket = %self.bucket, key, "File uploaded to S3");
        Ok(())
    }
}
