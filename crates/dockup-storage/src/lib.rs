//! Storage adapter: a thin S3 client bound to one bucket. Synchronous from
//! the workflow's point of view — one object per call, no retries.

use anyhow::{Context, Result};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Connection parameters. With no endpoint or credentials the ambient AWS
/// chain (env, profile, instance role) applies; an endpoint override switches
/// to path-style addressing for S3-compatible services.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        let region = config
            .region
            .clone()
            .or_else(|| config.endpoint.is_some().then(|| "auto".to_string()));
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            let creds = Credentials::new(access_key, secret_key, None, None, "dockup");
            loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
        }
        let sdk_config = loader.load().await;

        let client = if config.endpoint.is_some() {
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&sdk_config)
        };

        Ok(Self {
            client,
            bucket: config.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn upload(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("failed to read file for upload: {}", path.display()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .with_context(|| format!("failed to upload {key} to bucket {}", self.bucket))?;
        Ok(())
    }

    pub async fn download(&self, key: &str, path: &Path) -> Result<()> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to download {key} from bucket {}", self.bucket))?;

        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("failed to create download file: {}", path.display()))?;
        let mut body = output.body.into_async_read();
        tokio::io::copy(&mut body, &mut file)
            .await
            .with_context(|| format!("failed to write downloaded file: {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("failed to flush downloaded file: {}", path.display()))?;
        Ok(())
    }

    /// Every key in the bucket, following continuation tokens. A listing
    /// failure is an error, intentionally distinguishable from an empty
    /// bucket.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }
            let response = request
                .send()
                .await
                .with_context(|| format!("failed to list bucket {}", self.bucket))?;
            for object in response.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        Ok(keys)
    }
}
