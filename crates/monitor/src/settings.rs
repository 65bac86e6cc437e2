//! Layered monitor settings
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! then `DROWSY_<SECTION>__<KEY>` environment variables
//! (e.g. `DROWSY_DETECTION__CONSEC_FRAMES=60`).

use alerting::{AlarmConfig, AlarmSink, LogOnly, Silent, TerminalBell};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use dms::DmsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::MonitorError;

pub const ENV_PREFIX: &str = "DROWSY";

/// Per-frame output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Overlay text lines
    #[default]
    Overlay,
    /// One JSON analysis per frame
    Json,
}

/// Alarm device selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Bell,
    Log,
    Silent,
}

impl SinkKind {
    pub fn build(self) -> Arc<dyn AlarmSink> {
        match self {
            SinkKind::Bell => Arc::new(TerminalBell),
            SinkKind::Log => Arc::new(LogOnly),
            SinkKind::Silent => Arc::new(Silent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Frame input and output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Trace file of detector output; stdin when unset
    pub source: Option<PathBuf>,
    /// Minimum spacing between frames (0 = as fast as input arrives)
    pub frame_interval_ms: u64,
    pub output: OutputMode,
    pub alarm_sink: SinkKind,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            source: None,
            frame_interval_ms: 0,
            output: OutputMode::Overlay,
            alarm_sink: SinkKind::Bell,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
}

/// Complete monitor settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DmsConfig,
    pub alarm: AlarmConfig,
    pub input: InputSettings,
    pub logging: LogSettings,
}

impl Settings {
    /// Load defaults, then `path` (if given), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        Self::from_builder(builder.add_source(environment()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, MonitorError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.detection.validate()?;
        settings.alarm.validate()?;
        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::collections::HashMap;

    #[test]
    fn test_empty_sources_give_defaults() {
        let settings = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_toml_file_overrides() {
        let toml = r#"
            [detection]
            consec_frames = 45
            stability_threshold = 1.2

            [alarm]
            duration_ms = 250

            [input]
            output = "json"
            alarm_sink = "silent"
        "#;
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        let settings = Settings::from_builder(builder).unwrap();

        assert_eq!(settings.detection.consec_frames, 45);
        assert_eq!(settings.detection.history_length, 5);
        assert_eq!(settings.alarm.duration_ms, 250);
        assert_eq!(settings.alarm.frequency_hz, 2500);
        assert_eq!(settings.input.output, OutputMode::Json);
        assert_eq!(settings.input.alarm_sink, SinkKind::Silent);
    }

    #[test]
    fn test_environment_overrides_file() {
        let toml = "[detection]\nconsec_frames = 45\n";
        let vars: HashMap<String, String> = [
            ("DROWSY_DETECTION__CONSEC_FRAMES", "60"),
            ("DROWSY_INPUT__FRAME_INTERVAL_MS", "33"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let builder = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(environment().source(Some(vars)));
        let settings = Settings::from_builder(builder).unwrap();

        assert_eq!(settings.detection.consec_frames, 60);
        assert_eq!(settings.input.frame_interval_ms, 33);
    }

    #[test]
    fn test_alarm_longer_than_timeout_rejected() {
        let toml = "[alarm]\nduration_ms = 300\ntimeout_ms = 50\n";
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        assert!(matches!(
            Settings::from_builder(builder),
            Err(MonitorError::Alarm(_))
        ));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let toml = "[detection]\nmax_blink_frames = 20\nconsec_frames = 15\n";
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        assert!(matches!(
            Settings::from_builder(builder),
            Err(MonitorError::Dms(_))
        ));
    }
}
