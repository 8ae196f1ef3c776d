//! ControlMapperNode - per-channel gain and tilt inversion.
//!
//! Config keys:
//! - `gain_tilt`, `gain_lift`, `gain_pinch`, `gain_jaw`, `gain_presence`
//!   (float, default 1.0)
//! - `invert_tilt` (bool)
//! - `reset` (any value) restores the defaults
//!
//! Results are clamped back into each channel's range.

use crate::graph::node::NodeContext;
use crate::graph::port::{PortDescriptor, PortType};
use crate::graph::value::{ConfigValue, PortValue};
use crate::types::ControlValues;

static PORTS: &[PortDescriptor] = &[
    PortDescriptor::input("controls", PortType::Controls),
    PortDescriptor::output("controls", PortType::Controls),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ControlMapperNode {
    /// Gains in `ControlValues::CHANNELS` order
    gains: [f32; 5],
    invert_tilt: bool,
}

impl Default for ControlMapperNode {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlMapperNode {
    pub fn new() -> Self {
        Self {
            gains: [1.0; 5],
            invert_tilt: false,
        }
    }

    pub fn ports(&self) -> &[PortDescriptor] {
        PORTS
    }

    pub fn gains(&self) -> [f32; 5] {
        self.gains
    }

    pub fn invert_tilt(&self) -> bool {
        self.invert_tilt
    }

    /// Apply gains and inversion, then clamp.
    pub fn map(&self, input: ControlValues, jaw_max: f32) -> ControlValues {
        let [g_tilt, g_lift, g_pinch, g_jaw, g_presence] = self.gains;
        let sign = if self.invert_tilt { -1.0 } else { 1.0 };
        ControlValues {
            tilt: input.tilt * g_tilt * sign,
            lift: input.lift * g_lift,
            pinch: input.pinch * g_pinch,
            jaw: input.jaw * g_jaw,
            presence: input.presence * g_presence,
        }
        .clamped(jaw_max)
    }

    pub fn on_tick(&mut self, ctx: &mut NodeContext) {
        if let Some(input) = ctx.input(0).as_controls().copied() {
            let mapped = self.map(input, ctx.extractor.jaw_max());
            ctx.set_output(0, PortValue::Controls(mapped));
        }
    }

    pub fn on_config_change(&mut self, key: &str, value: &ConfigValue) -> bool {
        if let Some(channel) = key.strip_prefix("gain_") {
            let Some(index) = ControlValues::CHANNELS.iter().position(|c| *c == channel) else {
                return false;
            };
            match value.as_float() {
                Some(gain) if gain.is_finite() => {
                    self.gains[index] = gain as f32;
                    true
                }
                _ => false,
            }
        } else {
            match key {
                "invert_tilt" => match value.as_bool() {
                    Some(b) => {
                        self.invert_tilt = b;
                        true
                    }
                    None => false,
                },
                "reset" => {
                    *self = Self::new();
                    true
                }
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_default() {
        let c = ControlValues {
            tilt: -0.2,
            lift: 0.4,
            pinch: 0.1,
            jaw: 0.05,
            presence: 1.0,
        };
        assert_eq!(ControlMapperNode::new().map(c, 0.1), c);
    }

    #[test]
    fn test_gain_and_invert_clamped() {
        let mut mapper = ControlMapperNode::new();
        assert!(mapper.on_config_change("gain_lift", &ConfigValue::Float(3.0)));
        assert!(mapper.on_config_change("gain_tilt", &ConfigValue::Int(2)));
        assert!(mapper.on_config_change("invert_tilt", &ConfigValue::Bool(true)));
        let out = mapper.map(
            ControlValues {
                tilt: 0.2,
                lift: 0.5,
                ..ControlValues::NEUTRAL
            },
            0.1,
        );
        assert!((out.tilt + 0.4).abs() < 1e-6);
        assert_eq!(out.lift, 1.0);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut mapper = ControlMapperNode::new();
        assert!(!mapper.on_config_change("gain_volume", &ConfigValue::Float(2.0)));
        assert!(!mapper.on_config_change("gain_jaw", &ConfigValue::String("x".into())));
        assert!(!mapper.on_config_change("invert_tilt", &ConfigValue::Int(1)));
        assert!(!mapper.on_config_change("speed", &ConfigValue::Float(1.0)));
        assert_eq!(mapper, ControlMapperNode::new());
    }

    #[test]
    fn test_reset() {
        let mut mapper = ControlMapperNode::new();
        mapper.on_config_change("gain_pinch", &ConfigValue::Float(0.0));
        assert!(mapper.on_config_change("reset", &ConfigValue::Bool(true)));
        assert_eq!(mapper.gains(), [1.0; 5]);
        assert!(!mapper.invert_tilt());
    }
}
