//! Preview materialization for observed nodes
//!
//! Rendering a preview costs a resize plus per-pixel drawing, so it is only
//! paid for nodes whose `observed` flag is set. [`PreviewMaterializer::materialize_observed`]
//! walks the graph's observed set and nothing else: with no observed node a
//! tick renders zero previews, and each observed node adds exactly one.
//!
//! All recipes share one output size and the cover rule from [`cover`]:
//! the source is scaled to fill the preview box, centred, with overflow
//! cropped.
//!
//! Previews only read node output caches. They never write to the graph.

pub mod cover;
pub mod draw;

pub use cover::CoverFit;

use crate::config::PreviewConfig;
use crate::graph::{DataflowGraph, NodeId, PortValue, PreviewRecipe};
use crate::tracking::landmarks::{FACE_KEY_POINTS, HAND_CONNECTIONS};
use crate::types::{ControlValues, Frame, SubjectKind, SubjectPointSet};
use image::{Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([20, 20, 24, 255]);
const FACE_DOT: Rgba<u8> = Rgba([80, 230, 140, 255]);
const HAND_DOT: Rgba<u8> = Rgba([255, 190, 60, 255]);
const BONE: Rgba<u8> = Rgba([255, 255, 255, 200]);
const BAR: Rgba<u8> = Rgba([90, 170, 255, 255]);
const BAR_TRACK: Rgba<u8> = Rgba([255, 255, 255, 40]);

/// Per-tick state a recipe may draw from, besides the node's own cache.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    /// The frame acquired this tick
    pub frame: Option<&'a Frame>,
    /// Canonical control vector after this tick
    pub controls: ControlValues,
    pub jaw_max: f32,
    /// The stage renderer's latest output
    pub stage_output: Option<&'a RgbaImage>,
}

/// One rendered diagnostic image.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub node: NodeId,
    pub recipe: PreviewRecipe,
    pub image: RgbaImage,
}

pub struct PreviewMaterializer {
    width: u32,
    height: u32,
}

impl PreviewMaterializer {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            width: config.width.max(1),
            height: config.height.max(1),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Preview for `node`, or `None` if it is unknown or not observed.
    pub fn materialize(
        &self,
        graph: &DataflowGraph,
        node: NodeId,
        state: &FrameState<'_>,
    ) -> Option<PreviewImage> {
        if !graph.is_observed(node) {
            return None;
        }
        let recipe = graph.preview_recipe(node)?;
        let outputs = graph.outputs(node).unwrap_or(&[]);
        let inputs = graph.resolve_inputs(node).unwrap_or_default();

        let frame = outputs
            .iter()
            .chain(inputs.iter())
            .find_map(PortValue::as_frame)
            .map(|f| &**f)
            .or(state.frame);

        let image = match recipe {
            PreviewRecipe::RawFrame => self.frame_layer(frame),
            PreviewRecipe::LandmarkOverlay | PreviewRecipe::Skeleton => {
                let mut image = self.frame_layer(frame);
                if let Some((kind, sets)) = outputs.iter().find_map(PortValue::as_subjects) {
                    let fit = self.fit_for(frame);
                    if recipe == PreviewRecipe::Skeleton {
                        draw_skeleton(&mut image, &fit, sets);
                    } else {
                        draw_landmarks(&mut image, &fit, kind, sets);
                    }
                }
                image
            }
            PreviewRecipe::ControlScope => {
                let controls = outputs
                    .iter()
                    .chain(inputs.iter())
                    .find_map(PortValue::as_controls)
                    .copied()
                    .unwrap_or(state.controls);
                self.control_scope(&controls, state.jaw_max)
            }
            PreviewRecipe::SinkMirror => match state.stage_output {
                Some(stage) => self.cover(stage),
                None => self.frame_layer(frame),
            },
        };

        Some(PreviewImage {
            node,
            recipe,
            image,
        })
    }

    /// Previews for every observed node, in id order.
    pub fn materialize_observed(
        &self,
        graph: &DataflowGraph,
        state: &FrameState<'_>,
    ) -> Vec<PreviewImage> {
        graph
            .observed_nodes()
            .filter_map(|id| self.materialize(graph, id, state))
            .collect()
    }

    fn blank(&self) -> RgbaImage {
        RgbaImage::from_pixel(self.width, self.height, BACKGROUND)
    }

    fn cover(&self, src: &RgbaImage) -> RgbaImage {
        match CoverFit::new(src.dimensions(), self.size()) {
            Some(fit) => fit.apply(src),
            None => self.blank(),
        }
    }

    fn frame_layer(&self, frame: Option<&Frame>) -> RgbaImage {
        match frame {
            Some(frame) => self.cover(&frame.image),
            None => self.blank(),
        }
    }

    /// Landmark mapping; without a frame, landmarks map straight onto the box.
    fn fit_for(&self, frame: Option<&Frame>) -> CoverFit {
        let size = self.size();
        frame
            .and_then(|f| CoverFit::new(f.dimensions(), size))
            .or_else(|| CoverFit::new(size, size))
            .unwrap_or(CoverFit {
                src: size,
                dst: size,
                scale: 1.0,
                offset: (0.0, 0.0),
            })
    }

    fn control_scope(&self, controls: &ControlValues, jaw_max: f32) -> RgbaImage {
        let mut image = self.blank();
        let values = controls.normalized(jaw_max);
        let slot = self.width as i32 / ControlValues::CHANNELS.len() as i32;
        let gap = (slot / 5).max(1);
        let full = self.height as i32 - 4;

        for (i, value) in values.iter().enumerate() {
            let x = i as i32 * slot + gap;
            let w = (slot - 2 * gap).max(1);
            draw::fill_rect(&mut image, x, 2, w, full, BAR_TRACK);
            let h = (value.clamp(0.0, 1.0) * full as f32).round() as i32;
            draw::fill_rect(&mut image, x, 2 + full - h, w, h, BAR);
        }
        image
    }
}

fn draw_landmarks(
    image: &mut RgbaImage,
    fit: &CoverFit,
    kind: SubjectKind,
    sets: &[SubjectPointSet],
) {
    for set in sets {
        match kind {
            SubjectKind::Face => {
                for &index in FACE_KEY_POINTS.iter() {
                    if let Some(point) = set.get(index) {
                        draw::draw_dot(image, fit.map_landmark(point), 1.5, FACE_DOT);
                    }
                }
            }
            SubjectKind::Hand => {
                for point in set.points.iter().filter(|p| p.is_finite()) {
                    draw::draw_dot(image, fit.map_landmark(*point), 1.0, HAND_DOT);
                }
            }
        }
    }
}

fn draw_skeleton(image: &mut RgbaImage, fit: &CoverFit, sets: &[SubjectPointSet]) {
    for set in sets {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(pa), Some(pb)) = (set.get(a), set.get(b)) {
                draw::draw_line(image, fit.map_landmark(pa), fit.map_landmark(pb), BONE);
            }
        }
        for point in set.points.iter().filter(|p| p.is_finite()) {
            draw::draw_dot(image, fit.map_landmark(*point), 1.0, HAND_DOT);
        }
    }
}
