//! Amazon S3 artifact store.
//!
//! Objects are written with `PutObject`; public URLs point at the bucket's
//! virtual-hosted endpoint unless a base URL (for example a CDN) is given.
//! Read access for those URLs is a bucket policy concern.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use super::{ArtifactStore, public_object_url};
use crate::error::StorageError;

/// Region assumed when the AWS configuration names none.
pub const DEFAULT_REGION: &str = "us-east-1";

/// [`ArtifactStore`] backed by one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ArtifactStore {
    /// Store over an existing client.
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Store using the default AWS credential and region chain.
    ///
    /// Without `public_base_url` the bucket's regional endpoint is used.
    pub async fn from_env(bucket: impl Into<String>, public_base_url: Option<String>) -> Self {
        let bucket = bucket.into();
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let region = aws_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let public_base_url =
            public_base_url.unwrap_or_else(|| default_public_base_url(&bucket, &region));

        log::info!(
            "Using S3 bucket {} in {} (public base: {})",
            bucket,
            region,
            public_base_url
        );

        Self::new(aws_sdk_s3::Client::new(&aws_config), bucket, public_base_url)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| StorageError::Write {
                key: key.to_string(),
                reason: DisplayErrorContext(&error).to_string(),
            })
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }
}

/// Virtual-hosted endpoint of `bucket` in `region`.
pub fn default_public_base_url(bucket: &str, region: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com", bucket, region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_public_base_url() {
        assert_eq!(
            default_public_base_url("prints", "eu-central-1"),
            "https://prints.s3.eu-central-1.amazonaws.com"
        );
    }

    #[test]
    fn test_public_url_uses_base() {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("eu-west-1"))
            .build();
        let store = S3ArtifactStore::new(
            aws_sdk_s3::Client::from_conf(config),
            "prints",
            "https://cdn.example/",
        );

        assert_eq!(store.bucket(), "prints");
        assert_eq!(
            store.public_url("abc/my file.pdf"),
            "https://cdn.example/abc/my%20file.pdf"
        );
    }
}
