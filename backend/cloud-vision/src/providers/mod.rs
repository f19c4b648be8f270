//! Vision provider implementations

pub mod google_vision;

pub use google_vision::{AnalysisHandle, GoogleVisionClient};
