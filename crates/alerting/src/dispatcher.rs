//! Alert Dispatcher Implementation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sink::{AlarmError, AlarmSink, AlarmTone};

/// Alarm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Tone frequency (default: 2500 Hz)
    pub frequency_hz: u32,
    /// Tone length (default: 1000 ms)
    pub duration_ms: u64,
    /// Time after which a still-sounding alarm is reported as timed out
    pub timeout_ms: u64,
    /// Pending alarms held before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 2500,
            duration_ms: 1000,
            timeout_ms: 1500,
            queue_capacity: 4,
        }
    }
}

impl AlarmConfig {
    pub fn tone(&self) -> AlarmTone {
        AlarmTone {
            frequency_hz: self.frequency_hz,
            duration: Duration::from_millis(self.duration_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// A tone must fit inside the timeout, otherwise every alarm that
    /// sounds in full is reported as timed out.
    pub fn validate(&self) -> Result<(), AlarmError> {
        if self.timeout_ms == 0 {
            return Err(AlarmError::Config("timeout_ms must be positive".into()));
        }
        if self.timeout_ms <= self.duration_ms {
            return Err(AlarmError::Config(format!(
                "timeout_ms ({}) must exceed duration_ms ({})",
                self.timeout_ms, self.duration_ms
            )));
        }
        Ok(())
    }
}

/// One queued alarm
#[derive(Debug, Clone)]
pub struct AlarmRequest {
    /// Frame that raised the alert
    pub sequence: u64,
    pub tone: AlarmTone,
    pub raised_at: DateTime<Utc>,
}

/// Outcome counts reported by the worker on shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sounded: u64,
    pub failed: u64,
    pub timed_out: u64,
}

/// Edge-triggered alarm dispatcher
///
/// `notify` never waits on the alarm device. Requests go to a background
/// worker which sounds them one at a time; failures are logged and dropped,
/// leaving the on-screen alert as the only signal.
pub struct AlertDispatcher {
    sender: mpsc::Sender<AlarmRequest>,
    worker: JoinHandle<DispatchStats>,
    tone: AlarmTone,
    dropped: AtomicU64,
}

impl AlertDispatcher {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(sink: Arc<dyn AlarmSink>, config: AlarmConfig) -> Self {
        info!("Creating alert dispatcher with config: {:?}", config);
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(receiver, sink, config.timeout()));

        Self {
            sender,
            worker,
            tone: config.tone(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Forward the state machine's edge signal. Returns whether an alarm was queued.
    pub fn notify(&self, just_alerted: bool) -> bool {
        self.notify_at(0, just_alerted)
    }

    /// Like [`notify`](Self::notify), tagging the alarm with a frame sequence number
    pub fn notify_at(&self, sequence: u64, just_alerted: bool) -> bool {
        if !just_alerted {
            return false;
        }

        let request = AlarmRequest {
            sequence,
            tone: self.tone,
            raised_at: Utc::now(),
        };

        match self.sender.try_send(request) {
            Ok(()) => {
                debug!(sequence, "Alarm queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(sequence, "Alarm queue full, dropping alarm");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(sequence, "Alarm worker stopped, dropping alarm");
                false
            }
        }
    }

    /// Alarms rejected at the queue
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Close the queue and wait for pending alarms to finish
    pub async fn shutdown(self) -> DispatchStats {
        let Self { sender, worker, .. } = self;
        drop(sender);
        match worker.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Alarm worker ended abnormally: {}", e);
                DispatchStats::default()
            }
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<AlarmRequest>,
    sink: Arc<dyn AlarmSink>,
    timeout: Duration,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    while let Some(request) = receiver.recv().await {
        let device = Arc::clone(&sink);
        let tone = request.tone;
        let mut call = tokio::task::spawn_blocking(move || device.sound(&tone));

        match tokio::time::timeout(timeout, &mut call).await {
            Ok(Ok(Ok(()))) => {
                stats.sounded += 1;
                info!(
                    sequence = request.sequence,
                    raised_at = %request.raised_at,
                    "Alarm sounded"
                );
            }
            Ok(Ok(Err(e))) => {
                stats.failed += 1;
                warn!(sequence = request.sequence, "Alarm failed, visual alert only: {}", e);
            }
            Ok(Err(e)) => {
                stats.failed += 1;
                warn!(sequence = request.sequence, "Alarm device panicked: {}", e);
            }
            Err(_) => {
                stats.timed_out += 1;
                warn!(
                    sequence = request.sequence,
                    timeout_ms = timeout.as_millis() as u64,
                    "Alarm timed out"
                );
                // The device cannot be interrupted; wait it out so calls never overlap
                if let Ok(Err(e)) = call.await {
                    debug!(sequence = request.sequence, "Late alarm result: {}", e);
                }
            }
        }
    }

    debug!("Alarm worker finished: {:?}", stats);
    stats
}
