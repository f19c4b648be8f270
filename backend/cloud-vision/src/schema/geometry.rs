//! Geometry primitives shared by the annotation types
use super::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel coordinate. The API omits coordinates equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f32,
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Coordinate relative to the image size, in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedVertex {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f32,
}

/// 3D position of a face landmark, in pixels (z is depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub z: f32,
}

impl Position {
    pub fn to_vector(&self) -> Vector3 {
        Vector3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    fn from_corners(top_left: (f32, f32), bottom_right: (f32, f32)) -> Self {
        Self {
            x: top_left.0,
            y: top_left.1,
            width: bottom_right.0 - top_left.0,
            height: bottom_right.1 - top_left.1,
        }
    }
}

/// Polygon returned around a detected feature.
///
/// Vertices run clockwise from the top-left corner, so `vertices[0]` is the
/// top-left and `vertices[2]` the bottom-right corner of the box.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundingPoly {
    #[serde(deserialize_with = "null_as_default")]
    pub vertices: Vec<Vertex>,
    #[serde(deserialize_with = "null_as_default")]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

impl BoundingPoly {
    /// Rectangle spanned by `vertices[0]` and `vertices[2]`.
    ///
    /// Returns `None` when the polygon has fewer than 3 vertices.
    pub fn to_rect(&self) -> Option<Rect> {
        let top_left = self.vertices.first()?;
        let bottom_right = self.vertices.get(2)?;
        Some(Rect::from_corners(
            (top_left.x, top_left.y),
            (bottom_right.x, bottom_right.y),
        ))
    }

    /// Same as [`BoundingPoly::to_rect`] over the normalized vertices
    pub fn normalized_rect(&self) -> Option<Rect> {
        let top_left = self.normalized_vertices.first()?;
        let bottom_right = self.normalized_vertices.get(2)?;
        Some(Rect::from_corners(
            (top_left.x, top_left.y),
            (bottom_right.x, bottom_right.y),
        ))
    }
}
