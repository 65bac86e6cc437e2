//! Per-frame output of the external face/eye detector
//!
//! The classifier itself is a black box; the core only sees face regions and
//! how many eyes were found inside each one.

use serde::{Deserialize, Serialize};

/// Face bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceBbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBbox {
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// One detected face and the eyes found within it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub bbox: FaceBbox,
    pub eye_count: u32,
}

/// Everything the detector reported for a single video frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Frame sequence number
    #[serde(default)]
    pub sequence: u64,
    /// Capture timestamp (nanoseconds)
    #[serde(default)]
    pub timestamp_ns: u64,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
}

impl FrameObservation {
    /// The driver's face. Only one driver is tracked: the largest face wins,
    /// first in detector order on ties.
    pub fn primary_face(&self) -> Option<&FaceDetection> {
        self.faces.iter().fold(None, |best: Option<&FaceDetection>, face| match best {
            Some(b) if b.bbox.area() >= face.bbox.area() => Some(b),
            _ => Some(face),
        })
    }
}
