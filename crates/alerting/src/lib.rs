//! Alerting System
//!
//! Edge-triggered, non-blocking alarm dispatch for driver alerts.

mod dispatcher;
mod sink;

pub use dispatcher::{AlarmConfig, AlarmRequest, AlertDispatcher, DispatchStats};
pub use sink::{AlarmError, AlarmSink, AlarmTone, LogOnly, Silent, TerminalBell};
