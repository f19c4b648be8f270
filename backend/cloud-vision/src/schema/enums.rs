//! Categorical string values returned by the API.
//!
//! The API documents these as closed enumerations, but new values show up
//! across API versions. Anything outside the known set decodes to
//! `Unrecognized` with the raw string instead of failing the whole response.
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! open_string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $variant, )+
            /// Value outside the known set, kept verbatim
            Unrecognized(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unrecognized(raw) => raw,
                }
            }

            pub fn is_recognized(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $value => $name::$variant, )+
                    _ => $name::Unrecognized(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_string_enum! {
    /// Bucketized likelihood used by face and safe-search annotations
    pub enum Likelihood {
        Unknown => "UNKNOWN",
        VeryUnlikely => "VERY_UNLIKELY",
        Unlikely => "UNLIKELY",
        Possible => "POSSIBLE",
        Likely => "LIKELY",
        VeryLikely => "VERY_LIKELY",
    }
}

impl Default for Likelihood {
    fn default() -> Self {
        Likelihood::Unknown
    }
}

impl Likelihood {
    /// Rank from 1 (very unlikely) to 5 (very likely); `None` when unknown
    pub fn rank(&self) -> Option<u8> {
        match self {
            Likelihood::VeryUnlikely => Some(1),
            Likelihood::Unlikely => Some(2),
            Likelihood::Possible => Some(3),
            Likelihood::Likely => Some(4),
            Likelihood::VeryLikely => Some(5),
            Likelihood::Unknown | Likelihood::Unrecognized(_) => None,
        }
    }

    /// `LIKELY` or `VERY_LIKELY`
    pub fn is_likely(&self) -> bool {
        self.rank().is_some_and(|r| r >= 4)
    }
}

open_string_enum! {
    /// Anatomical face landmark
    pub enum LandmarkType {
        UnknownLandmark => "UNKNOWN_LANDMARK",
        LeftEye => "LEFT_EYE",
        RightEye => "RIGHT_EYE",
        LeftOfLeftEyebrow => "LEFT_OF_LEFT_EYEBROW",
        RightOfLeftEyebrow => "RIGHT_OF_LEFT_EYEBROW",
        LeftOfRightEyebrow => "LEFT_OF_RIGHT_EYEBROW",
        RightOfRightEyebrow => "RIGHT_OF_RIGHT_EYEBROW",
        MidpointBetweenEyes => "MIDPOINT_BETWEEN_EYES",
        NoseTip => "NOSE_TIP",
        UpperLip => "UPPER_LIP",
        LowerLip => "LOWER_LIP",
        MouthLeft => "MOUTH_LEFT",
        MouthRight => "MOUTH_RIGHT",
        MouthCenter => "MOUTH_CENTER",
        NoseBottomRight => "NOSE_BOTTOM_RIGHT",
        NoseBottomLeft => "NOSE_BOTTOM_LEFT",
        NoseBottomCenter => "NOSE_BOTTOM_CENTER",
        LeftEyeTopBoundary => "LEFT_EYE_TOP_BOUNDARY",
        LeftEyeRightCorner => "LEFT_EYE_RIGHT_CORNER",
        LeftEyeBottomBoundary => "LEFT_EYE_BOTTOM_BOUNDARY",
        LeftEyeLeftCorner => "LEFT_EYE_LEFT_CORNER",
        RightEyeTopBoundary => "RIGHT_EYE_TOP_BOUNDARY",
        RightEyeRightCorner => "RIGHT_EYE_RIGHT_CORNER",
        RightEyeBottomBoundary => "RIGHT_EYE_BOTTOM_BOUNDARY",
        RightEyeLeftCorner => "RIGHT_EYE_LEFT_CORNER",
        LeftEyebrowUpperMidpoint => "LEFT_EYEBROW_UPPER_MIDPOINT",
        RightEyebrowUpperMidpoint => "RIGHT_EYEBROW_UPPER_MIDPOINT",
        LeftEarTragion => "LEFT_EAR_TRAGION",
        RightEarTragion => "RIGHT_EAR_TRAGION",
        LeftEyePupil => "LEFT_EYE_PUPIL",
        RightEyePupil => "RIGHT_EYE_PUPIL",
        ForeheadGlabella => "FOREHEAD_GLABELLA",
        ChinGnathion => "CHIN_GNATHION",
        ChinLeftGonion => "CHIN_LEFT_GONION",
        ChinRightGonion => "CHIN_RIGHT_GONION",
    }
}

impl Default for LandmarkType {
    fn default() -> Self {
        LandmarkType::UnknownLandmark
    }
}
