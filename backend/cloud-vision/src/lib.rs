//! Cloud Vision - async client for the Google Cloud Vision `images:annotate` API
//!
//! This crate provides:
//! - A typed model of the annotate request and response JSON
//! - `GoogleVisionClient`, which posts an encoded image and decodes the result
//! - Timeouts and cancellation for in-flight requests
//!
//! ```rust,no_run
//! use cloud_vision::{FeatureRequest, FeatureType, GoogleVisionClient};
//!
//! # async fn run(png: Vec<u8>) -> cloud_vision::Result<()> {
//! let client = GoogleVisionClient::with_api_key("my-key")?;
//! client.add_feature(FeatureRequest::new(FeatureType::FaceDetection, 10));
//!
//! let response = client.analyze(&png).await?;
//! for rect in response.face_rects() {
//!     println!("face at {}, {} ({}x{})", rect.x, rect.y, rect.width, rect.height);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod providers;
pub mod schema;

pub use config::{ClientConfig, Config, DEFAULT_ENDPOINT_BASE};
pub use error::{NetworkError, Result, VisionError};
pub use providers::{AnalysisHandle, GoogleVisionClient};
pub use schema::{
    AnalyzeResponse, AnalyzeResult, BoundingPoly, FaceAnnotation, FeatureRequest, FeatureType,
    LandmarkType, Likelihood, Position, Rect, Vector3, Vertex,
};
