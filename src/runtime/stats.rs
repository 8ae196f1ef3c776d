//! Per-session tick statistics

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    /// Ticks that evaluated the graph
    pub ticks: u64,
    /// Ticks with no frame available yet
    pub skipped_ticks: u64,
    /// Callbacks that arrived after the session left `Live`
    pub inactive_callbacks: u64,
    /// Detector calls that failed and were treated as zero subjects
    pub detector_failures: u64,
    /// Preview images produced
    pub previews_rendered: u64,
    pub last_tick_us: u64,
    /// Mean over completed ticks
    pub avg_tick_us: f64,
    pub max_tick_us: u64,
    /// Runtime messages the editing surface never received
    pub dropped_messages: u64,
}

impl TickStats {
    pub fn record_tick(&mut self, duration: Duration, previews: usize) {
        let us = duration.as_micros() as u64;
        self.ticks += 1;
        self.previews_rendered += previews as u64;
        self.last_tick_us = us;
        self.max_tick_us = self.max_tick_us.max(us);
        self.avg_tick_us += (us as f64 - self.avg_tick_us) / self.ticks as f64;
    }

    pub fn record_skip(&mut self) {
        self.skipped_ticks += 1;
    }

    pub fn record_inactive(&mut self) {
        self.inactive_callbacks += 1;
    }

    pub fn record_detector_failure(&mut self) {
        self.detector_failures += 1;
    }

    pub fn record_dropped_message(&mut self) {
        self.dropped_messages += 1;
    }

    /// Share of ticks that had to be skipped, in `[0, 1]`.
    pub fn skip_ratio(&self) -> f64 {
        let total = self.ticks + self.skipped_ticks;
        if total == 0 {
            0.0
        } else {
            self.skipped_ticks as f64 / total as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
