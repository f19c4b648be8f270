//! Response model for `images:annotate`
//!
//! Every record decodes leniently: keys that are absent or `null` take their
//! default and keys this model does not know are ignored.
use super::enums::{LandmarkType, Likelihood};
use super::geometry::{BoundingPoly, Position, Rect};
use super::null_as_default;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level response envelope, one entry per submitted image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeResult {
    #[serde(deserialize_with = "null_as_default")]
    pub responses: Vec<AnalyzeResponse>,
}

impl AnalyzeResult {
    /// Face rectangles across all responses, in response order
    pub fn face_rects(&self) -> Vec<Rect> {
        self.responses.iter().flat_map(|r| r.face_rects()).collect()
    }
}

/// Annotations for a single image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeResponse {
    pub crop_hints_annotation: Option<CropHintsAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub face_annotations: Vec<FaceAnnotation>,
    pub image_properties_annotation: Option<ImagePropertiesAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub label_annotations: Vec<EntityAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub landmark_annotations: Vec<EntityAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub logo_annotations: Vec<EntityAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub text_annotations: Vec<EntityAnnotation>,
    pub full_text_annotation: Option<TextAnnotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    pub safe_search_annotation: Option<SafeSearchAnnotation>,
    /// The live API returns a single object; a list is accepted as well
    #[serde(deserialize_with = "one_or_many")]
    pub web_detection: Vec<WebDetection>,
    /// Set when this particular image failed
    pub error: Option<Status>,
}

impl AnalyzeResponse {
    /// Rectangles of each face's `fdBoundingPoly`; faces without a usable
    /// polygon are skipped
    pub fn face_rects(&self) -> Vec<Rect> {
        self.face_annotations
            .iter()
            .filter_map(|face| face.fd_bounding_poly.as_ref()?.to_rect())
            .collect()
    }
}

/// Per-image error, `google.rpc.Status`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    #[serde(deserialize_with = "null_as_default")]
    pub code: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

// ============================================
// Faces
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceAnnotation {
    /// Box around the whole head
    pub bounding_poly: Option<BoundingPoly>,
    /// Tighter box around the skin of the face
    pub fd_bounding_poly: Option<BoundingPoly>,
    #[serde(deserialize_with = "null_as_default")]
    pub landmarks: Vec<Landmark>,
    #[serde(deserialize_with = "null_as_default")]
    pub roll_angle: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub pan_angle: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub tilt_angle: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub detection_confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub landmarking_confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub joy_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub sorrow_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub anger_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub surprise_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub under_exposed_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub blurred_likelihood: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub headwear_likelihood: Likelihood,
}

impl FaceAnnotation {
    pub fn landmark(&self, landmark_type: &LandmarkType) -> Option<&Landmark> {
        self.landmarks
            .iter()
            .find(|l| &l.landmark_type == landmark_type)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Landmark {
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub landmark_type: LandmarkType,
    #[serde(deserialize_with = "null_as_default")]
    pub position: Position,
}

// ============================================
// Entities (labels, landmarks, logos, text)
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAnnotation {
    /// Knowledge Graph MID (Machine ID)
    #[serde(deserialize_with = "null_as_default")]
    pub mid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub locale: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub topicality: f32,
    pub bounding_poly: Option<BoundingPoly>,
    #[serde(deserialize_with = "null_as_default")]
    pub locations: Vec<LocationInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInfo {
    pub lat_lng: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatLng {
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedObjectAnnotation {
    #[serde(deserialize_with = "null_as_default")]
    pub mid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
    /// Uses normalized vertices
    pub bounding_poly: Option<BoundingPoly>,
}

// ============================================
// Crop hints and image properties
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropHintsAnnotation {
    #[serde(deserialize_with = "null_as_default")]
    pub crop_hints: Vec<CropHint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropHint {
    pub bounding_poly: Option<BoundingPoly>,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub importance_fraction: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePropertiesAnnotation {
    pub dominant_colors: Option<DominantColorsAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DominantColorsAnnotation {
    #[serde(deserialize_with = "null_as_default")]
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub color: Color,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub pixel_fraction: f32,
}

/// RGB channels in `[0, 255]`, alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Color {
    #[serde(deserialize_with = "null_as_default")]
    pub red: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub green: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub blue: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
}

// ============================================
// Safe search
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeSearchAnnotation {
    #[serde(deserialize_with = "null_as_default")]
    pub adult: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub spoof: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub medical: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub violence: Likelihood,
    #[serde(deserialize_with = "null_as_default")]
    pub racy: Likelihood,
}

// ============================================
// Web detection
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebDetection {
    #[serde(deserialize_with = "null_as_default")]
    pub web_entities: Vec<WebEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub full_matching_images: Vec<WebImage>,
    #[serde(deserialize_with = "null_as_default")]
    pub partial_matching_images: Vec<WebImage>,
    #[serde(deserialize_with = "null_as_default")]
    pub pages_with_matching_images: Vec<WebPage>,
    #[serde(deserialize_with = "null_as_default")]
    pub visually_similar_images: Vec<WebImage>,
    #[serde(deserialize_with = "null_as_default")]
    pub best_guess_labels: Vec<WebLabel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebEntity {
    #[serde(deserialize_with = "null_as_default")]
    pub entity_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebImage {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebPage {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub page_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_matching_images: Vec<WebImage>,
    #[serde(deserialize_with = "null_as_default")]
    pub partial_matching_images: Vec<WebImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebLabel {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language_code: String,
}

// ============================================
// Document text
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextAnnotation {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    #[serde(deserialize_with = "null_as_default")]
    pub width: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub height: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    /// e.g. `TEXT`, `TABLE`, `PICTURE`
    #[serde(deserialize_with = "null_as_default")]
    pub block_type: String,
    pub bounding_box: Option<BoundingPoly>,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f32,
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}
