//! Driver Monitoring System (DMS)
//!
//! Drowsiness detection from per-frame eye detections:
//! - Eye-count smoothing (debounce detector flicker)
//! - Blink counting
//! - Edge-triggered drowsiness alert
//! - Face visibility tracking

pub mod analysis;
pub mod config;
pub mod detector;
pub mod smoother;
pub mod state;

pub use analysis::{DmsAlert, DmsAnalysis};
pub use config::DmsConfig;
pub use detector::{FaceBbox, FaceDetection, FrameObservation};
pub use smoother::{EyeState, SignalSmoother};
pub use state::{BlinkStateMachine, DriverState, StateUpdate};

use thiserror::Error;
use tracing::{debug, info, warn};

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Driver monitoring session
///
/// Owns all per-driver state; run one instance per monitored driver.
pub struct DmsModule {
    config: DmsConfig,
    smoother: SignalSmoother,
    machine: BlinkStateMachine,
}

impl DmsModule {
    /// Create a new DMS module with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            history_length = config.history_length,
            stability_threshold = config.stability_threshold,
            max_blink_frames = config.max_blink_frames,
            consec_frames = config.consec_frames,
            "DMS module initialised"
        );
        Ok(Self {
            smoother: SignalSmoother::from_config(&config),
            machine: BlinkStateMachine::from_config(&config),
            config,
        })
    }

    /// Analyze a single frame of detector output
    ///
    /// Frames without a face leave the smoother and state machine untouched.
    pub fn process(&mut self, frame: &FrameObservation) -> DmsAnalysis {
        let Some(face) = frame.primary_face() else {
            return self.face_absent(frame.sequence);
        };

        if frame.faces.len() > 1 {
            debug!(
                faces = frame.faces.len(),
                sequence = frame.sequence,
                "Multiple faces, tracking largest"
            );
        }

        let mut analysis = self.observe_eyes(face.eye_count);
        analysis.sequence = frame.sequence;
        analysis.face_bbox = Some(face.bbox);
        analysis
    }

    /// Feed one eye count for a frame in which a face is present
    pub fn observe_eyes(&mut self, eye_count: u32) -> DmsAnalysis {
        self.machine.state_mut().face_absent_frames = 0;

        let eye_state = self.smoother.observe(eye_count);
        let update = self.machine.update(eye_state);

        let mut alerts = Vec::new();
        if update.alert_active {
            alerts.push(DmsAlert::Drowsiness);
        }

        DmsAnalysis {
            face_detected: true,
            eye_count: Some(eye_count),
            eye_state: Some(eye_state),
            closed_frames: update.closed_frames,
            blink_count: update.blink_count,
            alert_active: update.alert_active,
            just_alerted: update.just_alerted,
            alerts,
            ..Default::default()
        }
    }

    fn face_absent(&mut self, sequence: u64) -> DmsAnalysis {
        let state = self.machine.state_mut();
        state.face_absent_frames = state.face_absent_frames.saturating_add(1);
        if state.face_absent_frames == self.config.face_absent_alert_frames {
            warn!(frames = state.face_absent_frames, "Face not visible");
        }

        let state = self.machine.state();
        let mut alerts = Vec::new();
        if state.alert_active {
            alerts.push(DmsAlert::Drowsiness);
        }
        if state.face_absent_frames >= self.config.face_absent_alert_frames {
            alerts.push(DmsAlert::FaceNotVisible);
        }

        DmsAnalysis {
            sequence,
            face_detected: false,
            closed_frames: state.closed_frames,
            blink_count: state.blink_count,
            alert_active: state.alert_active,
            face_absent_frames: state.face_absent_frames,
            alerts,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    pub fn state(&self) -> &DriverState {
        self.machine.state()
    }

    pub fn blink_count(&self) -> u64 {
        self.machine.state().blink_count
    }

    pub fn alert_active(&self) -> bool {
        self.machine.state().alert_active
    }

    /// Reset driver state (on driver change)
    pub fn reset_state(&mut self) {
        info!("Resetting driver state");
        self.smoother.reset();
        self.machine.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u64, eye_count: Option<u32>) -> FrameObservation {
        FrameObservation {
            sequence,
            timestamp_ns: sequence * 33_333_333,
            faces: eye_count
                .map(|eye_count| {
                    vec![FaceDetection {
                        bbox: FaceBbox {
                            x: 100.0,
                            y: 80.0,
                            width: 200.0,
                            height: 200.0,
                        },
                        eye_count,
                    }]
                })
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = DmsConfig {
            max_blink_frames: 80,
            ..Default::default()
        };
        assert!(matches!(DmsModule::new(config), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_no_face_freezes_counters() {
        let mut dms = DmsModule::new(DmsConfig::default()).unwrap();
        for seq in 0..5 {
            dms.process(&frame(seq, Some(2)));
        }
        for seq in 5..15 {
            dms.process(&frame(seq, Some(0)));
        }
        let closed_before = dms.state().closed_frames;
        assert!(closed_before > 0);

        for seq in 15..25 {
            let analysis = dms.process(&frame(seq, None));
            assert!(!analysis.face_detected);
            assert_eq!(analysis.eye_state, None);
            assert_eq!(analysis.closed_frames, closed_before);
        }
        assert_eq!(dms.state().closed_frames, closed_before);
        assert_eq!(dms.state().face_absent_frames, 10);

        let analysis = dms.process(&frame(25, Some(0)));
        assert_eq!(analysis.closed_frames, closed_before + 1);
        assert_eq!(analysis.face_absent_frames, 0);
    }

    #[test]
    fn test_face_not_visible_alert() {
        let config = DmsConfig {
            face_absent_alert_frames: 3,
            ..Default::default()
        };
        let mut dms = DmsModule::new(config).unwrap();
        assert!(!dms.process(&frame(0, None)).has_alerts());
        assert!(!dms.process(&frame(1, None)).has_alerts());
        let analysis = dms.process(&frame(2, None));
        assert_eq!(analysis.alerts, vec![DmsAlert::FaceNotVisible]);
    }

    #[test]
    fn test_drowsiness_end_to_end() {
        let mut dms = DmsModule::new(DmsConfig::default()).unwrap();
        for seq in 0..5 {
            dms.process(&frame(seq, Some(2)));
        }

        let mut raised_at = Vec::new();
        for seq in 5..120 {
            let analysis = dms.process(&frame(seq, Some(0)));
            if analysis.just_alerted {
                raised_at.push(seq);
            }
        }
        // Smoother flips to closed on the second zero (seq 6); 70 frames later
        assert_eq!(raised_at, vec![75]);
        assert!(dms.alert_active());

        // Reopening takes a couple of frames to clear the window average
        let mut seq = 120;
        while dms.alert_active() {
            let analysis = dms.process(&frame(seq, Some(2)));
            seq += 1;
            if !analysis.alert_active {
                assert_eq!(analysis.closed_frames, 0);
                assert_eq!(analysis.eye_state, Some(EyeState::Open));
            }
        }
        assert_eq!(dms.blink_count(), 0);
    }

    #[test]
    fn test_blink_end_to_end() {
        let mut dms = DmsModule::new(DmsConfig::default()).unwrap();
        let counts = [2, 2, 2, 2, 2, 0, 0, 0, 2, 2, 2, 2, 2];
        let analyses: Vec<_> = counts.iter().map(|&c| dms.observe_eyes(c)).collect();
        assert_eq!(analyses.last().map(|a| a.blink_count), Some(1));
        assert!(analyses.iter().all(|a| !a.alert_active));
    }

    #[test]
    fn test_reset_state() {
        let mut dms = DmsModule::new(DmsConfig::default()).unwrap();
        for c in [2, 2, 2, 2, 2, 0, 0, 0, 2, 2, 2, 2, 2] {
            dms.observe_eyes(c);
        }
        assert_eq!(dms.blink_count(), 1);
        dms.reset_state();
        assert_eq!(dms.blink_count(), 0);
        assert_eq!(dms.state().closed_frames, 0);
    }
}
