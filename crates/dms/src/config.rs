//! DMS configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DmsError;

/// DMS configuration
///
/// Durations are expressed in frames, so thresholds assume a steady capture
/// rate. Use [`DmsConfig::consec_frames_for`] to derive a frame threshold
/// from a wall-clock duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Average eye count at or above which the eyes are considered open
    pub stability_threshold: f32,

    /// Number of recent observations in the smoothing window
    pub history_length: usize,

    /// Longest closure (frames) still counted as a blink
    pub max_blink_frames: u32,

    /// Closure length (frames) that raises the drowsiness alert
    pub consec_frames: u32,

    /// Consecutive face-less frames before reporting the face as not visible
    pub face_absent_alert_frames: u32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 1.5,
            history_length: 5,
            max_blink_frames: 10,
            consec_frames: 70,
            face_absent_alert_frames: 30,
        }
    }
}

impl DmsConfig {
    /// Create strict config (~1.5s at 30fps)
    pub fn strict() -> Self {
        Self {
            consec_frames: 45,
            ..Default::default()
        }
    }

    /// Create lenient config (~3s at 30fps)
    pub fn lenient() -> Self {
        Self {
            consec_frames: 90,
            ..Default::default()
        }
    }

    /// Number of frames covering `duration` at `fps`, rounded up.
    pub fn consec_frames_for(duration: Duration, fps: f64) -> u32 {
        (duration.as_secs_f64() * fps).ceil().max(1.0) as u32
    }

    /// Check that every threshold is usable.
    ///
    /// A closure of `max_blink_frames` must never also reach `consec_frames`,
    /// otherwise a single frame could count as both a blink and an alert.
    pub fn validate(&self) -> Result<(), DmsError> {
        if !self.stability_threshold.is_finite() || self.stability_threshold <= 0.0 {
            return Err(DmsError::Config(format!(
                "stability_threshold must be positive, got {}",
                self.stability_threshold
            )));
        }
        if self.history_length == 0 {
            return Err(DmsError::Config("history_length must be positive".into()));
        }
        if self.max_blink_frames == 0 {
            return Err(DmsError::Config("max_blink_frames must be positive".into()));
        }
        if self.consec_frames == 0 {
            return Err(DmsError::Config("consec_frames must be positive".into()));
        }
        if self.face_absent_alert_frames == 0 {
            return Err(DmsError::Config(
                "face_absent_alert_frames must be positive".into(),
            ));
        }
        if self.max_blink_frames >= self.consec_frames {
            return Err(DmsError::Config(format!(
                "max_blink_frames ({}) must be less than consec_frames ({})",
                self.max_blink_frames, self.consec_frames
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DmsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_length, 5);
        assert_eq!(config.max_blink_frames, 10);
        assert_eq!(config.consec_frames, 70);
        assert!((config.stability_threshold - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
        assert!(DmsConfig::strict().consec_frames < DmsConfig::lenient().consec_frames);
    }

    #[test]
    fn test_blink_window_must_be_below_alert() {
        let config = DmsConfig {
            max_blink_frames: 70,
            consec_frames: 70,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_and_bad_threshold() {
        let zero_history = DmsConfig {
            history_length: 0,
            ..Default::default()
        };
        assert!(zero_history.validate().is_err());

        let nan_threshold = DmsConfig {
            stability_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(nan_threshold.validate().is_err());

        let negative_threshold = DmsConfig {
            stability_threshold: -1.0,
            ..Default::default()
        };
        assert!(negative_threshold.validate().is_err());
    }

    #[test]
    fn test_consec_frames_for_duration() {
        assert_eq!(DmsConfig::consec_frames_for(Duration::from_secs(2), 30.0), 60);
        assert_eq!(DmsConfig::consec_frames_for(Duration::from_millis(10), 30.0), 1);
        // Exact products must not round up an extra frame
        assert_eq!(DmsConfig::consec_frames_for(Duration::from_millis(2300), 30.0), 69);
        assert_eq!(DmsConfig::consec_frames_for(Duration::from_millis(2333), 30.0), 70);
        assert_eq!(DmsConfig::consec_frames_for(Duration::from_millis(700), 30.0), 21);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: DmsConfig = serde_json::from_str(r#"{"consec_frames": 60}"#).unwrap();
        assert_eq!(config.consec_frames, 60);
        assert_eq!(config.history_length, 5);
    }
}
