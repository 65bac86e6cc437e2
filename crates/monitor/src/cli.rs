//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "drowsiness-monitor",
    version,
    about = "Driver drowsiness monitor over per-frame eye detections"
)]
pub struct CliArgs {
    /// Settings file (TOML); DROWSY_<SECTION>__<KEY> variables override it
    #[arg(long, short, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trace of detector output, one JSON frame per line (stdin when omitted or "-")
    #[arg(value_name = "TRACE")]
    pub trace: Option<PathBuf>,
}

impl CliArgs {
    /// Trace path, treating "-" as stdin
    pub fn trace_path(&self) -> Option<PathBuf> {
        self.trace.clone().filter(|p| p.as_os_str() != "-")
    }
}
