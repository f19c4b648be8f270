//! Configuration for the Vision client
use crate::error::VisionError;
use crate::schema::FeatureRequest;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT_BASE: &str = "https://vision.googleapis.com/v1/images:annotate?key=";

/// Configuration loaded from environment variables
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Google Cloud Vision API key
    #[serde(default)]
    pub google_vision_api_key: String,

    /// Endpoint the API key is appended to
    #[serde(default = "default_endpoint_base")]
    pub vision_endpoint_base: String,

    /// Requested features, `TYPE[:maxResults]`, comma separated
    #[serde(default = "default_features")]
    pub vision_features: Vec<String>,

    /// Default deadline for each analyze call
    #[serde(default)]
    pub vision_timeout_seconds: Option<u64>,
}

fn default_endpoint_base() -> String {
    DEFAULT_ENDPOINT_BASE.to_string()
}

fn default_features() -> Vec<String> {
    vec!["FACE_DETECTION:10".to_string()]
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse `vision_features`, keeping the first entry for each type
    pub fn feature_requests(&self) -> Result<Vec<FeatureRequest>, VisionError> {
        let mut features: Vec<FeatureRequest> = Vec::new();
        for raw in self.vision_features.iter().filter(|s| !s.trim().is_empty()) {
            let feature: FeatureRequest = raw.parse()?;
            if !features
                .iter()
                .any(|f| f.feature_type == feature.feature_type)
            {
                features.push(feature);
            }
        }
        Ok(features)
    }

    pub fn client_config(&self) -> Result<ClientConfig, VisionError> {
        Ok(ClientConfig {
            api_key: self.google_vision_api_key.clone(),
            endpoint_base: self.vision_endpoint_base.clone(),
            features: self.feature_requests()?,
            timeout: self.vision_timeout_seconds.map(Duration::from_secs),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("google_vision_api_key", &redact(&self.google_vision_api_key))
            .field("vision_endpoint_base", &self.vision_endpoint_base)
            .field("vision_features", &self.vision_features)
            .field("vision_timeout_seconds", &self.vision_timeout_seconds)
            .finish()
    }
}

/// Settings a [`GoogleVisionClient`](crate::GoogleVisionClient) is built from
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub endpoint_base: String,
    pub features: Vec<FeatureRequest>,
    /// Applied by `analyze` and `annotate`; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint_base: default_endpoint_base(),
            features: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_endpoint_base(mut self, endpoint_base: impl Into<String>) -> Self {
        self.endpoint_base = endpoint_base.into();
        self
    }

    pub fn with_features(mut self, features: Vec<FeatureRequest>) -> Self {
        self.features = features;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint_base", &self.endpoint_base)
            .field("features", &self.features)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub(crate) fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
