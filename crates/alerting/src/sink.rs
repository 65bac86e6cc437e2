//! Alarm output devices

use std::io::{IsTerminal, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Alarm device errors
#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("Alarm configuration error: {0}")]
    Config(String),

    #[error("Alarm device unavailable: {0}")]
    Unavailable(String),

    #[error("Alarm device failed: {0}")]
    Device(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tone to sound for one alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

/// External alarm device
///
/// `sound` may block for the length of the tone; the dispatcher runs it off
/// the frame path.
pub trait AlarmSink: Send + Sync + 'static {
    fn sound(&self, tone: &AlarmTone) -> Result<(), AlarmError>;
}

/// Rings the terminal bell on stderr and holds for the tone duration
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlarmSink for TerminalBell {
    fn sound(&self, tone: &AlarmTone) -> Result<(), AlarmError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(AlarmError::Unavailable("stderr is not a terminal".into()));
        }
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        std::thread::sleep(tone.duration);
        Ok(())
    }
}

/// Logs the alarm instead of sounding it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl AlarmSink for LogOnly {
    fn sound(&self, tone: &AlarmTone) -> Result<(), AlarmError> {
        info!(
            frequency_hz = tone.frequency_hz,
            duration_ms = tone.duration.as_millis() as u64,
            "ALARM"
        );
        Ok(())
    }
}

/// Discards alarms
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AlarmSink for Silent {
    fn sound(&self, _tone: &AlarmTone) -> Result<(), AlarmError> {
        Ok(())
    }
}
