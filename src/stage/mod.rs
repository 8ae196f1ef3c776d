//! The stage: primary reactive output driven by the smoothed controls.
//!
//! The scheduler hands every completed tick's sink inputs to a
//! [`StageRenderer`]. Renderers must accept a missing frame and draw a
//! neutral background instead.

use crate::config::StageRenderConfig;
use crate::preview::{draw, CoverFit};
use crate::types::{ControlValues, Frame};
use image::{Rgba, RgbaImage};

/// Consumer of the graph's terminal node.
pub trait StageRenderer {
    fn render(&mut self, frame: Option<&Frame>, controls: &ControlValues);

    /// Latest rendered image, if the renderer keeps one.
    fn last_output(&self) -> Option<&RgbaImage>;
}

/// Built-in renderer: the cover-scaled camera frame with an orb on top.
///
/// - `tilt` moves the orb horizontally, `lift` raises it
/// - `jaw` grows it, `pinch` shrinks it and warms its colour
/// - `presence` fades it in and dims the background frame out
pub struct ReactiveStage {
    config: StageRenderConfig,
    jaw_max: f32,
    canvas: RgbaImage,
    renders: u64,
    last_controls: ControlValues,
    last_had_frame: bool,
}

impl ReactiveStage {
    pub fn new(config: StageRenderConfig, jaw_max: f32) -> Self {
        let canvas = RgbaImage::from_pixel(
            config.width.max(1),
            config.height.max(1),
            Rgba(config.background),
        );
        Self {
            config,
            jaw_max,
            canvas,
            renders: 0,
            last_controls: ControlValues::NEUTRAL,
            last_had_frame: false,
        }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn last_controls(&self) -> ControlValues {
        self.last_controls
    }

    pub fn last_had_frame(&self) -> bool {
        self.last_had_frame
    }

    /// Orb centre (pixels) and radius for a control vector.
    pub fn orb_geometry(&self, controls: &ControlValues) -> ((f32, f32), f32) {
        let (w, h) = self.canvas.dimensions();
        let (w, h) = (w as f32, h as f32);
        let jaw = if self.jaw_max > 0.0 {
            (controls.jaw / self.jaw_max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let x = (0.5 + controls.tilt) * w;
        let y = (0.75 - 0.5 * controls.lift.clamp(0.0, 1.0)) * h;
        let radius = h * 0.12 * (1.0 + jaw) * (1.0 - 0.5 * controls.pinch.clamp(0.0, 1.0));
        ((x, y), radius)
    }

    fn orb_color(&self, controls: &ControlValues) -> Rgba<u8> {
        let [r, g, b, a] = self.config.orb_color;
        let pinch = controls.pinch.clamp(0.0, 1.0);
        let presence = controls.presence.clamp(0.0, 1.0);
        let warm = |c: u8, target: f32| (c as f32 + (target - c as f32) * pinch) as u8;
        Rgba([
            warm(r, 255.0),
            warm(g, 120.0),
            warm(b, 60.0),
            (a as f32 * presence) as u8,
        ])
    }
}

impl StageRenderer for ReactiveStage {
    fn render(&mut self, frame: Option<&Frame>, controls: &ControlValues) {
        let background = Rgba(self.config.background);
        let size = self.canvas.dimensions();

        match frame.and_then(|f| CoverFit::new(f.dimensions(), size).map(|fit| (f, fit))) {
            Some((frame, fit)) => {
                self.canvas = fit.apply(&frame.image);
                // Dim the camera as the performer is picked up
                let dim = [
                    background[0],
                    background[1],
                    background[2],
                    (160.0 * controls.presence.clamp(0.0, 1.0)) as u8,
                ];
                draw::fill_rect(
                    &mut self.canvas,
                    0,
                    0,
                    size.0 as i32,
                    size.1 as i32,
                    Rgba(dim),
                );
            }
            None => draw::fill(&mut self.canvas, background),
        }

        let (centre, radius) = self.orb_geometry(controls);
        let color = self.orb_color(controls);
        draw::draw_dot(&mut self.canvas, centre, radius, color);

        self.renders += 1;
        self.last_controls = *controls;
        self.last_had_frame = frame.is_some();
    }

    fn last_output(&self) -> Option<&RgbaImage> {
        if self.renders == 0 {
            None
        } else {
            Some(&self.canvas)
        }
    }
}
