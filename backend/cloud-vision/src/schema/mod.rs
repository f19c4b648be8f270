//! Wire model of the Vision `images:annotate` API

pub mod enums;
pub mod geometry;
pub mod request;
pub mod response;

use serde::{Deserialize, Deserializer};

pub use enums::{LandmarkType, Likelihood};
pub use geometry::{BoundingPoly, NormalizedVertex, Position, Rect, Vector3, Vertex};
pub use request::{FeatureRequest, FeatureType};
pub use response::{
    AnalyzeResponse, AnalyzeResult, Block, Color, ColorInfo, CropHint, CropHintsAnnotation,
    DominantColorsAnnotation, EntityAnnotation, FaceAnnotation, ImagePropertiesAnnotation,
    Landmark, LatLng, LocalizedObjectAnnotation, LocationInfo, Page, SafeSearchAnnotation, Status,
    TextAnnotation, WebDetection, WebEntity, WebImage, WebLabel, WebPage,
};

/// Decodes an explicit JSON `null` the same way as an absent key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
