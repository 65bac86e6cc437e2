//! Overlay text for a frame
//!
//! Colours and placement belong to whatever draws the frame; each line only
//! carries a [`Tone`] for it to map.

use dms::{DmsAnalysis, EyeState};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Alert,
    Ok,
    Warn,
    Stat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    pub text: String,
    pub tone: Tone,
}

impl OverlayLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl fmt::Display for OverlayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Overlay lines in drawing order
pub fn render(analysis: &DmsAnalysis) -> Vec<OverlayLine> {
    let mut lines = Vec::with_capacity(5);

    if analysis.face_detected {
        if analysis.alert_active {
            lines.push(OverlayLine::new("DROWSINESS ALERT!", Tone::Alert));
            lines.push(OverlayLine::new("WAKE UP!", Tone::Alert));
        }
        match analysis.eye_state {
            Some(EyeState::Open) => lines.push(OverlayLine::new("Eyes Open", Tone::Ok)),
            _ => lines.push(OverlayLine::new("Eyes Closed/Not Detected", Tone::Warn)),
        }
    } else {
        lines.push(OverlayLine::new("No face detected", Tone::Warn));
    }

    lines.push(OverlayLine::new(
        format!("Closed Frames: {}", analysis.closed_frames),
        Tone::Stat,
    ));
    lines.push(OverlayLine::new(
        format!("Total Blinks: {}", analysis.blink_count),
        Tone::Stat,
    ));
    lines
}

/// Single-line rendering for terminal output
pub fn render_line(analysis: &DmsAnalysis) -> String {
    let text: Vec<String> = render(analysis).iter().map(ToString::to_string).collect();
    format!("[{:>6}] {}", analysis.sequence, text.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(analysis: &DmsAnalysis) -> Vec<String> {
        render(analysis).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_open_eyes() {
        let analysis = DmsAnalysis {
            face_detected: true,
            eye_state: Some(EyeState::Open),
            blink_count: 3,
            ..Default::default()
        };
        assert_eq!(
            texts(&analysis),
            vec!["Eyes Open", "Closed Frames: 0", "Total Blinks: 3"]
        );
    }

    #[test]
    fn test_alert_lines_first() {
        let analysis = DmsAnalysis {
            face_detected: true,
            eye_state: Some(EyeState::Closed),
            closed_frames: 72,
            alert_active: true,
            ..Default::default()
        };
        let lines = render(&analysis);
        assert_eq!(lines[0].text, "DROWSINESS ALERT!");
        assert_eq!(lines[1].text, "WAKE UP!");
        assert_eq!(lines[0].tone, Tone::Alert);
        assert_eq!(lines[2].text, "Eyes Closed/Not Detected");
        assert_eq!(lines[3].text, "Closed Frames: 72");
    }

    #[test]
    fn test_no_face() {
        let analysis = DmsAnalysis {
            sequence: 12,
            closed_frames: 4,
            ..Default::default()
        };
        assert_eq!(
            render_line(&analysis),
            "[    12] No face detected | Closed Frames: 4 | Total Blinks: 0"
        );
    }
}
