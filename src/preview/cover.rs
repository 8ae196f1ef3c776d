//! "Cover" scaling: fill the target box completely, centred, cropping
//! whatever overflows. Never letter-boxes.

use crate::types::Landmark;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Transform from a source image onto a target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub src: (u32, u32),
    pub dst: (u32, u32),
    /// Uniform scale, the larger of the two axis ratios
    pub scale: f32,
    /// Offset of the scaled source in target pixels (zero or negative)
    pub offset: (f32, f32),
}

impl CoverFit {
    /// `None` if either size is empty.
    pub fn new(src: (u32, u32), dst: (u32, u32)) -> Option<Self> {
        if src.0 == 0 || src.1 == 0 || dst.0 == 0 || dst.1 == 0 {
            return None;
        }
        let scale = (dst.0 as f32 / src.0 as f32).max(dst.1 as f32 / src.1 as f32);
        let offset = (
            (dst.0 as f32 - src.0 as f32 * scale) / 2.0,
            (dst.1 as f32 - src.1 as f32 * scale) / 2.0,
        );
        Some(Self {
            src,
            dst,
            scale,
            offset,
        })
    }

    /// Size of the whole source after scaling, rounded up so it still covers.
    pub fn scaled_size(&self) -> (u32, u32) {
        (
            ((self.src.0 as f32 * self.scale).ceil() as u32).max(self.dst.0),
            ((self.src.1 as f32 * self.scale).ceil() as u32).max(self.dst.1),
        )
    }

    /// Map a normalized source landmark into target pixel space.
    ///
    /// Points in the cropped margin land outside `[0, dst)`.
    pub fn map_landmark(&self, point: Landmark) -> (f32, f32) {
        (
            point.x * self.src.0 as f32 * self.scale + self.offset.0,
            point.y * self.src.1 as f32 * self.scale + self.offset.1,
        )
    }

    /// Render `src` into a new image of the target size.
    pub fn apply(&self, src: &RgbaImage) -> RgbaImage {
        let (sw, sh) = self.scaled_size();
        let scaled = imageops::resize(src, sw, sh, FilterType::Triangle);
        let x = (sw - self.dst.0) / 2;
        let y = (sh - self.dst.1) / 2;
        imageops::crop_imm(&scaled, x, y, self.dst.0, self.dst.1).to_image()
    }
}
