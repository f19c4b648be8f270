//! Google Cloud Vision API client
use crate::config::{redact, ClientConfig, Config};
use crate::error::{NetworkError, Result, VisionError};
use crate::schema::request::{AnnotateEnvelope, AnnotateImageRequest, ImageContent};
use crate::schema::{AnalyzeResponse, AnalyzeResult, FeatureRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{AbortHandle, Abortable};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Url};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Google Cloud Vision API client
///
/// The API key travels as the `key` query parameter appended to the endpoint
/// base. Share one instance (e.g. behind an `Arc`) so calls reuse the
/// connection pool.
pub struct GoogleVisionClient {
    client: Client,
    url: Url,
    endpoint_base: String,
    features: RwLock<Vec<FeatureRequest>>,
    timeout: Option<Duration>,
}

/// Everything a call needs, captured when the call is made
struct PreparedCall {
    request: RequestBuilder,
    request_id: Uuid,
    image_count: usize,
    feature_count: usize,
}

impl GoogleVisionClient {
    /// Create a client, validating the key and endpoint up front
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(VisionError::Config(
                "Google Vision API key is not set".to_string(),
            ));
        }
        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(VisionError::Config(
                "Google Vision API key contains whitespace".to_string(),
            ));
        }
        // Appended to the query string verbatim, so it must not need escaping
        if !api_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
        {
            return Err(VisionError::Config(
                "Google Vision API key contains characters not allowed in a URL".to_string(),
            ));
        }

        let url = Url::parse(&format!("{}{}", config.endpoint_base, api_key)).map_err(|e| {
            VisionError::Config(format!(
                "Invalid Vision endpoint '{}': {}",
                config.endpoint_base, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(VisionError::Config(format!(
                "Vision endpoint must be http(s), got '{}'",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("cloud-vision/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VisionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let vision_client = Self {
            client,
            url,
            endpoint_base: config.endpoint_base,
            features: RwLock::new(Vec::with_capacity(config.features.len())),
            timeout: config.timeout,
        };
        for feature in config.features {
            vision_client.add_feature(feature);
        }

        info!(
            endpoint = %vision_client.endpoint_base,
            api_key = redact(api_key),
            features = vision_client.features.read().len(),
            "Google Vision client initialized"
        );

        Ok(vision_client)
    }

    /// Create a client for the production endpoint with no features yet
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    /// Create a client from environment configuration
    pub fn from_env_config(config: &Config) -> Result<Self> {
        Self::new(config.client_config()?)
    }

    /// Endpoint base, without the API key
    pub fn endpoint_base(&self) -> &str {
        &self.endpoint_base
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Snapshot of the requested features, in insertion order
    pub fn features(&self) -> Vec<FeatureRequest> {
        self.features.read().clone()
    }

    /// Request `feature` unless its type is already requested.
    ///
    /// An existing entry of the same type is left untouched, including its
    /// `max_results`.
    pub fn add_feature(&self, feature: FeatureRequest) {
        let mut features = self.features.write();
        if features
            .iter()
            .any(|f| f.feature_type == feature.feature_type)
        {
            debug!(
                feature = %feature.feature_type,
                "Feature already requested, ignoring"
            );
            return;
        }

        debug!(
            feature = %feature.feature_type,
            max_results = feature.max_results,
            "Adding feature"
        );
        features.push(feature);
    }

    /// Remove the entry equal to `feature` (type and max results)
    pub fn remove_feature(&self, feature: &FeatureRequest) -> bool {
        let mut features = self.features.write();
        match features.iter().position(|f| f == feature) {
            Some(index) => {
                features.remove(index);
                true
            }
            None => false,
        }
    }

    /// Analyze one encoded image (PNG, JPEG, ...).
    ///
    /// The request body, including the feature list, is built before this
    /// returns; later feature changes do not affect the returned future.
    /// Dropping the future cancels the request. The client's default timeout
    /// applies, if configured.
    pub fn analyze(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<AnalyzeResponse>> + Send + 'static {
        let call = self.prepare(&[image]);
        let timeout = self.timeout;
        async move { single_response(run(call?, timeout).await?) }
    }

    /// Same as [`GoogleVisionClient::analyze`] with an explicit deadline
    pub fn analyze_with_timeout(
        &self,
        image: &[u8],
        timeout: Duration,
    ) -> impl Future<Output = Result<AnalyzeResponse>> + Send + 'static {
        let call = self.prepare(&[image]);
        async move { single_response(run(call?, Some(timeout)).await?) }
    }

    /// Annotate several images in one request.
    ///
    /// Responses come back in the order of `images`. Per-image failures are
    /// left in [`AnalyzeResponse::error`].
    pub fn annotate(
        &self,
        images: &[&[u8]],
    ) -> impl Future<Output = Result<AnalyzeResult>> + Send + 'static {
        let call = self.prepare(images);
        let timeout = self.timeout;
        async move { run(call?, timeout).await }
    }

    /// Run [`GoogleVisionClient::analyze`] on the current Tokio runtime and
    /// hand the outcome to `on_complete`.
    ///
    /// `on_complete` runs at most once, and never after
    /// [`AnalysisHandle::cancel`] was called on an unfinished analysis.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn spawn_analyze<F>(&self, image: &[u8], on_complete: F) -> AnalysisHandle
    where
        F: FnOnce(Result<AnalyzeResponse>) + Send + 'static,
    {
        let analysis = self.analyze(image);
        let (abort_handle, registration) = AbortHandle::new_pair();
        let task = Abortable::new(
            async move {
                let result = analysis.await;
                on_complete(result);
            },
            registration,
        );

        let join = tokio::spawn(async move {
            if task.await.is_err() {
                debug!("Vision analysis cancelled");
            }
        });

        AnalysisHandle { abort_handle, join }
    }

    fn prepare(&self, images: &[&[u8]]) -> Result<PreparedCall> {
        if images.is_empty() {
            return Err(VisionError::Config("No images to annotate".to_string()));
        }

        let features = self.features();
        if features.is_empty() {
            warn!("No features requested, Vision API will return empty annotations");
        }

        let envelope = AnnotateEnvelope {
            requests: images
                .iter()
                .map(|bytes| AnnotateImageRequest {
                    image: ImageContent {
                        content: STANDARD.encode(bytes),
                    },
                    features: features.clone(),
                })
                .collect(),
        };

        Ok(PreparedCall {
            request: self.client.post(self.url.clone()).json(&envelope),
            request_id: Uuid::new_v4(),
            image_count: images.len(),
            feature_count: features.len(),
        })
    }
}

/// Handle to an analysis started with [`GoogleVisionClient::spawn_analyze`]
#[derive(Debug)]
pub struct AnalysisHandle {
    abort_handle: AbortHandle,
    join: JoinHandle<()>,
}

impl AnalysisHandle {
    /// Abandon the analysis. The HTTP request is dropped and the completion
    /// callback will not run if it has not already.
    pub fn cancel(&self) {
        self.abort_handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort_handle.is_aborted()
    }

    /// True once the callback has returned or the cancellation took effect
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the analysis completes or is cancelled
    pub async fn wait(self) {
        if let Err(e) = self.join.await {
            error!(error = %e, "Vision analysis task failed");
        }
    }
}

async fn run(call: PreparedCall, timeout: Option<Duration>) -> Result<AnalyzeResult> {
    let span = info_span!("vision_annotate", request_id = %call.request_id);
    let execution = execute(call);

    match timeout {
        Some(limit) => tokio::time::timeout(limit, execution)
            .instrument(span.clone())
            .await
            .map_err(|_| {
                span.in_scope(|| {
                    warn!(
                        timeout_ms = limit.as_millis(),
                        "Vision API request timed out"
                    )
                });
                VisionError::Timeout(limit)
            })?,
        None => execution.instrument(span).await,
    }
}

async fn execute(call: PreparedCall) -> Result<AnalyzeResult> {
    info!(
        images = call.image_count,
        features = call.feature_count,
        "Analyzing image with Google Vision"
    );

    let start = Instant::now();

    // The request URL carries the API key, strip it from any error
    let response = call
        .request
        .send()
        .await
        .map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "Failed to call Vision API");
            NetworkError::Transport(e)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::Transport(e.without_url()))?;

    if !status.is_success() {
        error!(status = %status, error = %body, "Vision API request failed");
        return Err(NetworkError::Status {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let result: AnalyzeResult = serde_json::from_str(&body).map_err(|e| {
        error!(error = %e, "Failed to parse Vision API response");
        VisionError::decode(e.to_string(), body.clone())
    })?;

    if result.responses.len() != call.image_count {
        error!(
            expected = call.image_count,
            actual = result.responses.len(),
            "Vision API response count mismatch"
        );
        return Err(VisionError::decode(
            format!(
                "expected {} response(s), got {}",
                call.image_count,
                result.responses.len()
            ),
            body,
        ));
    }

    info!(
        responses = result.responses.len(),
        faces = result.responses.iter().map(|r| r.face_annotations.len()).sum::<usize>(),
        elapsed_ms = start.elapsed().as_millis(),
        "Image analysis complete"
    );

    Ok(result)
}

fn single_response(result: AnalyzeResult) -> Result<AnalyzeResponse> {
    let response = result
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::decode("response list is empty", String::new()))?;

    if let Some(status) = response.error {
        error!(
            code = status.code,
            message = %status.message,
            "Vision API returned error"
        );
        return Err(VisionError::Api {
            code: status.code,
            message: status.message,
        });
    }

    Ok(response)
}
