//! Driver state tracking
//!
//! Converts the smoothed eye signal into closed-frame duration, completed
//! blinks and the drowsiness alert flag.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::smoother::EyeState;
use crate::DmsConfig;

/// Driver state (tracked over time)
#[derive(Debug, Clone, Default)]
pub struct DriverState {
    /// Frames the eyes have been continuously classified closed
    pub closed_frames: u32,

    /// A closure started from open and is still short enough to be a blink
    pub blink_in_progress: bool,

    /// Classification from the previous update
    pub last_eye_state: EyeState,

    /// Completed blinks this session
    pub blink_count: u64,

    /// Drowsiness alert currently raised
    pub alert_active: bool,

    /// Frames where face was not detected
    pub face_absent_frames: u32,
}

impl DriverState {
    /// Reset state (on driver change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of one state machine step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub closed_frames: u32,
    pub blink_count: u64,
    pub alert_active: bool,
    /// Set only on the frame the alert was raised
    pub just_alerted: bool,
    /// Set only on the frame a blink was counted
    pub blink_completed: bool,
}

/// Blink and drowsiness state machine
///
/// Every closure starting from open is optimistically treated as a blink.
/// It is counted when the eyes reopen within `max_blink_frames`; past that it
/// is only a long closure, and at `consec_frames` the alert is raised once.
/// Opening the eyes clears both the closed-frame count and the alert.
#[derive(Debug, Clone)]
pub struct BlinkStateMachine {
    max_blink_frames: u32,
    consec_frames: u32,
    state: DriverState,
}

impl BlinkStateMachine {
    pub fn new(max_blink_frames: u32, consec_frames: u32) -> Self {
        Self {
            max_blink_frames,
            consec_frames,
            state: DriverState::default(),
        }
    }

    pub fn from_config(config: &DmsConfig) -> Self {
        Self::new(config.max_blink_frames, config.consec_frames)
    }

    /// Advance by one frame
    pub fn update(&mut self, eye_state: EyeState) -> StateUpdate {
        let mut just_alerted = false;
        let mut blink_completed = false;
        let state = &mut self.state;

        match eye_state {
            EyeState::Open => {
                if state.last_eye_state == EyeState::Closed
                    && state.blink_in_progress
                    && state.closed_frames <= self.max_blink_frames
                {
                    state.blink_count += 1;
                    state.blink_in_progress = false;
                    blink_completed = true;
                    debug!(
                        closed_frames = state.closed_frames,
                        total = state.blink_count,
                        "Blink completed"
                    );
                }

                if state.alert_active {
                    info!(closed_frames = state.closed_frames, "Drowsiness resolved");
                    state.alert_active = false;
                }
                state.closed_frames = 0;
            }
            EyeState::Closed => {
                state.closed_frames = state.closed_frames.saturating_add(1);

                if state.last_eye_state == EyeState::Open && !state.blink_in_progress {
                    state.blink_in_progress = true;
                }

                if state.closed_frames > self.max_blink_frames {
                    state.blink_in_progress = false;
                }

                if state.closed_frames >= self.consec_frames && !state.alert_active {
                    state.alert_active = true;
                    just_alerted = true;
                    info!(closed_frames = state.closed_frames, "Drowsiness alert raised");
                }
            }
        }

        state.last_eye_state = eye_state;

        StateUpdate {
            closed_frames: state.closed_frames,
            blink_count: state.blink_count,
            alert_active: state.alert_active,
            just_alerted,
            blink_completed,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut DriverState {
        &mut self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}
