//! Eye-count smoothing
//!
//! Per-frame eye detection flickers: glare, head angle and the blink itself
//! produce single-frame dropouts. A short rolling average absorbs those
//! without noticeably delaying a real closure (5 frames is ~0.17s at 30fps).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::DmsConfig;

/// Debounced eye classification for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EyeState {
    #[default]
    Open,
    Closed,
}

impl EyeState {
    pub fn is_open(&self) -> bool {
        matches!(self, EyeState::Open)
    }
}

/// Sliding-window average over the last `history_length` eye counts
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    window: VecDeque<u32>,
    history_length: usize,
    threshold: f32,
}

impl SignalSmoother {
    /// Create a smoother. `history_length` is clamped to at least one sample.
    pub fn new(history_length: usize, threshold: f32) -> Self {
        let history_length = history_length.max(1);
        Self {
            window: VecDeque::with_capacity(history_length),
            history_length,
            threshold,
        }
    }

    pub fn from_config(config: &DmsConfig) -> Self {
        Self::new(config.history_length, config.stability_threshold)
    }

    /// Add one observation and classify the current window.
    ///
    /// Before the window is full the average covers only what has been seen.
    pub fn observe(&mut self, eye_count: u32) -> EyeState {
        if self.window.len() >= self.history_length {
            self.window.pop_front();
        }
        self.window.push_back(eye_count);

        if self.average() >= self.threshold {
            EyeState::Open
        } else {
            EyeState::Closed
        }
    }

    /// Mean eye count over the window (0.0 when empty)
    pub fn average(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.window.iter().map(|&c| u64::from(c)).sum();
        sum as f32 / self.window.len() as f32
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all history (driver change)
    pub fn reset(&mut self) {
        self.window.clear();
    }
}
