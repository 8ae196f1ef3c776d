//! Tick requesters: how the scheduler asks for its next frame callback.
//!
//! On a real display this is the platform's frame-callback queue. The
//! scheduler only ever sees the [`TickRequester`] capability, so tests can
//! drive ticks by hand and the binary can pace them with a fixed clock.

use std::time::{Duration, Instant};

/// Capability to schedule one future frame callback.
pub trait TickRequester {
    fn request_tick(&mut self);
}

/// Records requests; the test drives the callbacks.
#[derive(Debug, Default)]
pub struct ManualTicker {
    requests: u64,
    pending: bool,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests seen.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl TickRequester for ManualTicker {
    fn request_tick(&mut self) {
        self.requests += 1;
        self.pending = true;
    }
}

/// Fixed-rate pacing for headless runs.
///
/// A request arms the clock; [`wait`](Self::wait) sleeps until the next
/// frame boundary. If a tick overran its budget the next one fires
/// immediately and the schedule re-anchors, so slow ticks delay the
/// following one instead of queuing several.
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    next_deadline: Option<Instant>,
    pending: bool,
}

impl FrameClock {
    pub fn new(refresh_hz: u32) -> Self {
        let hz = refresh_hz.max(1);
        Self {
            interval: Duration::from_nanos(1_000_000_000 / hz as u64),
            next_deadline: None,
            pending: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Block until the armed tick is due. Returns `false` if nothing was requested.
    pub fn wait(&mut self) -> bool {
        if !std::mem::take(&mut self.pending) {
            return false;
        }
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.interval);
        } else {
            self.next_deadline = Some(now + self.interval);
        }
        true
    }
}

impl TickRequester for FrameClock {
    fn request_tick(&mut self) {
        self.pending = true;
    }
}
