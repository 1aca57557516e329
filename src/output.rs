//! Spinner helpers and the CLI's status sink.

use crate::status::StatusSink;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

pub fn skipped(msg: &str) {
    println!("{} {}", style("•").yellow().bold(), msg);
}

/// Single status-signal slot backed by a spinner. The engine only ever
/// writes to it; clearing is safe on every exit path even when nothing was
/// ever shown.
pub struct SpinnerStatus {
    slot: Mutex<Option<ProgressBar>>,
}

impl SpinnerStatus {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn start(text: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(text.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl Default for SpinnerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for SpinnerStatus {
    fn set_status(&self, text: &str) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(pb) => pb.set_message(text.to_string()),
            None => *slot = Some(Self::start(text)),
        }
    }

    fn clear_status(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
    }
}
