//! Small raster helpers shared by the preview recipes and the stage.

use image::{Rgba, RgbaImage};

pub fn fill(image: &mut RgbaImage, color: Rgba<u8>) {
    image.pixels_mut().for_each(|p| *p = color);
}

/// Alpha-blend `color` over the pixel at `(x, y)`; out-of-bounds is ignored.
pub fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return;
    }
    let dst = image.get_pixel_mut(x as u32, y as u32);
    let a = color[3] as u32;
    for c in 0..3 {
        dst[c] = ((color[c] as u32 * a + dst[c] as u32 * (255 - a)) / 255) as u8;
    }
    dst[3] = dst[3].max(color[3]);
}

/// Filled disc.
pub fn draw_dot(image: &mut RgbaImage, center: (f32, f32), radius: f32, color: Rgba<u8>) {
    if !(center.0.is_finite() && center.1.is_finite()) || radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let x0 = (center.0 - radius).floor() as i32;
    let x1 = (center.0 + radius).ceil() as i32;
    let y0 = (center.1 - radius).floor() as i32;
    let y1 = (center.1 + radius).ceil() as i32;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - center.0;
            let dy = y as f32 + 0.5 - center.1;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(image, x, y, color);
            }
        }
    }
}

/// One-pixel line, sampled along its longer axis.
pub fn draw_line(image: &mut RgbaImage, from: (f32, f32), to: (f32, f32), color: Rgba<u8>) {
    if !(from.0.is_finite() && from.1.is_finite() && to.0.is_finite() && to.1.is_finite()) {
        return;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        blend_pixel(
            image,
            (from.0 + dx * t).floor() as i32,
            (from.1 + dy * t).floor() as i32,
            color,
        );
    }
}

/// Axis-aligned filled rectangle, clipped to the image.
pub fn fill_rect(image: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
    for py in y.max(0)..(y + h).min(image.height() as i32) {
        for px in x.max(0)..(x + w).min(image.width() as i32) {
            blend_pixel(image, px, py, color);
        }
    }
}
