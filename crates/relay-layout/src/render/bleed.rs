//! Generated bleed: edge extension plus a smoothing pass

use image::{Rgba, RgbaImage, imageops};

use crate::layout::PixelRect;

/// Replicate the trim box's edge pixels outward across the bleed band.
///
/// Edge strips and corner pixels are snapshotted before anything is written,
/// so the extension only ever reads original interior pixels.
pub fn extend_edges(buffer: &mut RgbaImage, trim: PixelRect) {
    if trim.is_empty() || trim.right() > buffer.width() || trim.bottom() > buffer.height() {
        return;
    }
    let (last_x, last_y) = (trim.right() - 1, trim.bottom() - 1);
    let top: Vec<Rgba<u8>> = (trim.x..=last_x).map(|x| *buffer.get_pixel(x, trim.y)).collect();
    let bottom: Vec<Rgba<u8>> = (trim.x..=last_x).map(|x| *buffer.get_pixel(x, last_y)).collect();
    let left: Vec<Rgba<u8>> = (trim.y..=last_y).map(|y| *buffer.get_pixel(trim.x, y)).collect();
    let right: Vec<Rgba<u8>> = (trim.y..=last_y).map(|y| *buffer.get_pixel(last_x, y)).collect();

    let clamp_x = |x: u32| (x.clamp(trim.x, last_x) - trim.x) as usize;
    let clamp_y = |y: u32| (y.clamp(trim.y, last_y) - trim.y) as usize;

    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if trim.contains(x, y) {
                continue;
            }
            let pixel = if y < trim.y {
                top[clamp_x(x)]
            } else if y > last_y {
                bottom[clamp_x(x)]
            } else if x < trim.x {
                left[clamp_y(y)]
            } else {
                right[clamp_y(y)]
            };
            buffer.put_pixel(x, y, pixel);
        }
    }
}

/// Blur the whole buffer and keep the result only in the bleed band.
///
/// The blur reads interior pixels too, which is what softens the seam; the
/// trim box itself keeps its original, sharp pixels.
pub fn smooth_bleed(buffer: &mut RgbaImage, trim: PixelRect, sigma: f32) {
    if sigma <= 0.0 || !sigma.is_finite() {
        return;
    }
    let blurred = imageops::blur(&*buffer, sigma);
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        if !trim.contains(x, y) {
            *pixel = *blurred.get_pixel(x, y);
        }
    }
}
