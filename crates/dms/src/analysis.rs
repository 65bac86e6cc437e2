//! DMS analysis results and alerts

use serde::{Deserialize, Serialize};

use crate::detector::FaceBbox;
use crate::smoother::EyeState;

/// DMS alert types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmsAlert {
    /// Eyes closed long enough to indicate drowsiness
    Drowsiness,

    /// Face not visible (camera blocked?)
    FaceNotVisible,
}

/// Per-frame DMS result handed back to the frame driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmsAnalysis {
    /// Frame sequence number
    pub sequence: u64,

    /// Whether a face was detected
    pub face_detected: bool,

    /// Face bounding box (if detected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_bbox: Option<FaceBbox>,

    /// Raw eye count for the primary face
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_count: Option<u32>,

    /// Smoothed eye state; absent when no face was seen this frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_state: Option<EyeState>,

    /// Continuous closed frames
    pub closed_frames: u32,

    /// Completed blinks this session
    pub blink_count: u64,

    /// Drowsiness alert raised
    pub alert_active: bool,

    /// Alert was raised on this frame
    pub just_alerted: bool,

    /// Consecutive frames without a face
    pub face_absent_frames: u32,

    /// Active alerts
    pub alerts: Vec<DmsAlert>,
}

impl DmsAnalysis {
    /// Check if any alerts are active
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Get highest severity alert
    pub fn highest_severity_alert(&self) -> Option<DmsAlert> {
        if self.alerts.contains(&DmsAlert::Drowsiness) {
            Some(DmsAlert::Drowsiness)
        } else {
            self.alerts.first().copied()
        }
    }
}
