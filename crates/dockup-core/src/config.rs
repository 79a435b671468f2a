use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_IMAGE: &str = "kalilinux/kali-rolling";
pub const DEFAULT_CONTAINER: &str = "kali-vbox";
pub const DEFAULT_BUCKET: &str = "montaniz-bucket";

/// Optional on-disk configuration. Every section and field may be absent;
/// built-in defaults and command-line overrides fill the gaps.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub defaults: Defaults,
    pub cloud: Option<Cloud>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Defaults {
    pub image: Option<String>,
    pub container: Option<String>,
    pub bucket: Option<String>,
}

/// Static credentials and endpoint for S3-compatible services (Spaces, R2).
/// When absent, the ambient AWS credential chain is used.
#[derive(Debug, Deserialize, Clone)]
pub struct Cloud {
    pub endpoint: String,
    pub region: Option<String>,
    pub access_key: String,
    pub secret_key: String,
}

impl FileConfig {
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(cfg)
    }
}

/// Fully resolved configuration, built once at startup and passed down.
/// Precedence: command-line flag, then config file, then built-in default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub image: String,
    pub container: String,
    pub bucket: String,
    pub cloud: Option<Cloud>,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        image: Option<String>,
        container: Option<String>,
        bucket: Option<String>,
    ) -> Self {
        Self {
            image: image
                .or(file.defaults.image)
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            container: container
                .or(file.defaults.container)
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            bucket: bucket
                .or(file.defaults.bucket)
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            cloud: file.cloud,
        }
    }
}
