//! Request payload for `images:annotate`
use crate::error::VisionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Annotation kinds the client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    LandmarkDetection,
    FaceDetection,
    ObjectLocalization,
    LogoDetection,
    LabelDetection,
    DocumentTextDetection,
    SafeSearchDetection,
    ImageProperties,
    CropHints,
    WebDetection,
}

impl FeatureType {
    pub const ALL: [FeatureType; 10] = [
        FeatureType::LandmarkDetection,
        FeatureType::FaceDetection,
        FeatureType::ObjectLocalization,
        FeatureType::LogoDetection,
        FeatureType::LabelDetection,
        FeatureType::DocumentTextDetection,
        FeatureType::SafeSearchDetection,
        FeatureType::ImageProperties,
        FeatureType::CropHints,
        FeatureType::WebDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::LandmarkDetection => "LANDMARK_DETECTION",
            FeatureType::FaceDetection => "FACE_DETECTION",
            FeatureType::ObjectLocalization => "OBJECT_LOCALIZATION",
            FeatureType::LogoDetection => "LOGO_DETECTION",
            FeatureType::LabelDetection => "LABEL_DETECTION",
            FeatureType::DocumentTextDetection => "DOCUMENT_TEXT_DETECTION",
            FeatureType::SafeSearchDetection => "SAFE_SEARCH_DETECTION",
            FeatureType::ImageProperties => "IMAGE_PROPERTIES",
            FeatureType::CropHints => "CROP_HINTS",
            FeatureType::WebDetection => "WEB_DETECTION",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        FeatureType::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| VisionError::Config(format!("Unknown feature type '{}'", s.trim())))
    }
}

/// A requested annotation kind with its result cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub max_results: i32,
}

impl FeatureRequest {
    pub const DEFAULT_MAX_RESULTS: i32 = 10;

    pub fn new(feature_type: FeatureType, max_results: i32) -> Self {
        Self {
            feature_type,
            max_results,
        }
    }
}

/// Parses `TYPE` or `TYPE:maxResults`
impl FromStr for FeatureRequest {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, max) = match s.split_once(':') {
            Some((name, max)) => {
                let max = max.trim().parse::<i32>().map_err(|e| {
                    VisionError::Config(format!("Invalid maxResults in '{}': {}", s.trim(), e))
                })?;
                (name, max)
            }
            None => (s, Self::DEFAULT_MAX_RESULTS),
        };

        if max <= 0 {
            return Err(VisionError::Config(format!(
                "maxResults must be positive in '{}'",
                s.trim()
            )));
        }

        Ok(Self::new(name.parse()?, max))
    }
}

// ============================================
// Wire envelope
// ============================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateEnvelope {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<FeatureRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageContent {
    /// Base64-encoded image bytes
    pub content: String,
}
