//! Per-channel exponential smoothing of control values
//!
//! The smoother keeps no memory of its own: callers pass the previous
//! control vector in and store the result. Each channel moves a fixed
//! fraction `alpha` of the way towards its target per tick, so the error
//! shrinks by `(1 - alpha)` every frame and never overshoots.
//!
//! Pinch uses two factors. While a hand is tracked it follows the raw value
//! quickly; once the hand is lost its target becomes zero and it decays on
//! the slower factor, so a single missed detection never snaps the output.

use crate::config::SmoothingConfig;
use crate::types::ControlValues;

/// Stateless control smoother.
#[derive(Debug, Clone)]
pub struct ControlSmoother {
    config: SmoothingConfig,
    jaw_max: f32,
}

impl ControlSmoother {
    pub fn new(config: SmoothingConfig, jaw_max: f32) -> Self {
        Self { config, jaw_max }
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Advance `previous` one tick towards `raw`.
    pub fn smooth(
        &self,
        previous: ControlValues,
        raw: ControlValues,
        hand_tracked: bool,
    ) -> ControlValues {
        let c = &self.config;
        let (pinch_target, pinch_alpha) = if hand_tracked {
            (raw.pinch, c.pinch_tracked_alpha)
        } else {
            (0.0, c.pinch_untracked_alpha)
        };

        ControlValues {
            tilt: step(previous.tilt, raw.tilt, c.tilt_lift_alpha),
            lift: step(previous.lift, raw.lift, c.tilt_lift_alpha),
            pinch: step(previous.pinch, pinch_target, pinch_alpha),
            jaw: step(previous.jaw, raw.jaw, c.jaw_alpha),
            presence: step(previous.presence, raw.presence, c.presence_alpha),
        }
        .clamped(self.jaw_max)
    }

    /// Ticks needed for any channel error to shrink below `epsilon` of its
    /// initial size, using the slowest factor.
    pub fn frames_to_settle(&self, epsilon: f32) -> u32 {
        let alpha = self.config.min_alpha();
        if alpha >= 1.0 {
            return 1;
        }
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return 0;
        }
        (epsilon.ln() / (1.0 - alpha).ln()).ceil().max(0.0) as u32
    }
}

/// The canonical control vector carried across ticks.
///
/// Advanced at most once per tick: the first caller of [`advance`](Self::advance)
/// after [`begin_tick`](Self::begin_tick) moves it, later callers in the same
/// tick read the already-advanced value.
#[derive(Debug, Clone, Default)]
pub struct ControlMemory {
    current: ControlValues,
    advanced: bool,
}

impl ControlMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ControlValues {
        self.current
    }

    pub fn begin_tick(&mut self) {
        self.advanced = false;
    }

    pub fn has_advanced(&self) -> bool {
        self.advanced
    }

    pub fn advance(
        &mut self,
        smoother: &ControlSmoother,
        raw: ControlValues,
        hand_tracked: bool,
    ) -> ControlValues {
        if !self.advanced {
            self.current = smoother.smooth(self.current, raw, hand_tracked);
            self.advanced = true;
        }
        self.current
    }

    /// Back to the neutral vector.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Below this distance a channel lands exactly on its target, so sustained
/// absence reaches the neutral vector instead of stalling one ulp short.
const SNAP_EPSILON: f32 = 1e-6;

#[inline]
fn step(previous: f32, target: f32, alpha: f32) -> f32 {
    if !target.is_finite() {
        return previous;
    }
    if !previous.is_finite() {
        return target;
    }
    let next = previous + (target - previous) * alpha;
    if (target - next).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}
