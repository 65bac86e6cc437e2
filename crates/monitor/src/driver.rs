//! Frame loop
//!
//! Replays detector output, one JSON [`FrameObservation`] per line, through
//! a [`DmsModule`] and writes one result per frame.

use alerting::AlertDispatcher;
use dms::{DmsModule, FrameObservation};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::overlay;
use crate::settings::{OutputMode, Settings};
use crate::MonitorError;

/// Totals for one monitoring run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub face_frames: u64,
    pub skipped_lines: u64,
    pub blinks: u64,
    pub alerts: u64,
}

/// Run until the input ends or `shutdown` resolves
pub async fn run<R, W, S>(
    settings: &Settings,
    reader: R,
    writer: &mut W,
    dispatcher: &AlertDispatcher,
    shutdown: S,
) -> Result<RunSummary, MonitorError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut dms = DmsModule::new(settings.detection.clone())?;
    let mut summary = RunSummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0u64;

    let mut pacer = (settings.input.frame_interval_ms > 0).then(|| {
        let mut pacer = interval(Duration::from_millis(settings.input.frame_interval_ms));
        pacer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        pacer
    });

    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => {
                info!("Stop requested");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("End of input");
            break;
        };
        line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let frame: FrameObservation = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(line = line_no, "Skipping malformed frame: {}", e);
                summary.skipped_lines += 1;
                continue;
            }
        };

        if let Some(pacer) = pacer.as_mut() {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stop requested");
                    break;
                }
                _ = pacer.tick() => {}
            }
        }

        let analysis = dms.process(&frame);
        dispatcher.notify_at(frame.sequence, analysis.just_alerted);

        summary.frames += 1;
        if analysis.face_detected {
            summary.face_frames += 1;
        }
        if analysis.just_alerted {
            summary.alerts += 1;
        }
        summary.blinks = analysis.blink_count;

        let mut out = match settings.input.output {
            OutputMode::Overlay => overlay::render_line(&analysis),
            OutputMode::Json => serde_json::to_string(&analysis)?,
        };
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
    }

    writer.flush().await?;
    info!(
        frames = summary.frames,
        blinks = summary.blinks,
        alerts = summary.alerts,
        "Monitoring stopped"
    );
    Ok(summary)
}
