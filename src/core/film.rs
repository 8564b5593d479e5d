//! Linear image buffers, read-out tonemapping and PNG output.

// std
use std::path::Path;
// lumen
use crate::core::geometry::{Vector3f, Vector4f};
use crate::core::lumen::{float_to_byte, rgb_to_srgb, Float};

/// Image of linear or display-encoded RGBA pixels.
#[derive(Debug, Default, Clone)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub linear: bool,
    pub pixels: Vec<Vector4f>,
}

pub fn make_image(width: usize, height: usize, linear: bool) -> ColorImage {
    ColorImage {
        width,
        height,
        linear,
        pixels: vec![Vector4f::default(); width * height],
    }
}

/// Filmic curve fit used for display; keeps values in [0, 1].
fn tonemap_filmic(color: &Vector3f) -> Vector3f {
    let c: Vector3f = *color * 0.6;
    let num: Vector3f = c * c * 2.51 + c * 0.03;
    let den: Vector3f = c * c * 2.43 + c * 0.59 + Vector3f::splat(0.14);
    num / den
}

/// Exposure pre-gain, optional filmic curve, then the sRGB transfer
/// function. Alpha passes through.
pub fn tonemap(rgba: &Vector4f, exposure: Float, filmic: bool) -> Vector4f {
    let mut color: Vector3f = rgba.xyz() * (2.0 as Float).powf(exposure);
    if filmic {
        color = tonemap_filmic(&color);
    }
    Vector4f {
        x: rgb_to_srgb(color.x),
        y: rgb_to_srgb(color.y),
        z: rgb_to_srgb(color.z),
        w: rgba.w,
    }
}

/// Tonemap a whole linear image into a display image.
pub fn tonemap_image(image: &ColorImage, exposure: Float, filmic: bool) -> ColorImage {
    let mut display = make_image(image.width, image.height, false);
    for (out, pixel) in display.pixels.iter_mut().zip(image.pixels.iter()) {
        *out = tonemap(pixel, exposure, filmic);
    }
    display
}

/// Quantize a display image to 8-bit RGBA.
pub fn image_to_bytes(image: &ColorImage) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::with_capacity(image.pixels.len() * 4);
    for pixel in &image.pixels {
        bytes.push(float_to_byte(pixel.x));
        bytes.push(float_to_byte(pixel.y));
        bytes.push(float_to_byte(pixel.z));
        bytes.push(float_to_byte(pixel.w));
    }
    bytes
}

/// Write a display image as PNG.
pub fn write_png(path: &Path, image: &ColorImage) -> Result<(), image::ImageError> {
    image::save_buffer(
        path,
        &image_to_bytes(image),
        image.width as u32,
        image.height as u32,
        image::ColorType::Rgba8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tonemap_exposure_gain() {
        let rgba = Vector4f::new(0.25, 0.25, 0.25, 1.0);
        let base = tonemap(&rgba, 0.0, false);
        let brighter = tonemap(&rgba, 1.0, false);
        assert!(brighter.x > base.x);
        assert_eq!(base.w, 1.0);
    }

    #[test]
    fn test_filmic_bounded() {
        let rgba = Vector4f::new(50.0, 10.0, 2.0, 1.0);
        let out = tonemap(&rgba, 0.0, true);
        assert!(out.x <= 1.0 + 1.0e-3 && out.y <= 1.0 + 1.0e-3 && out.z <= 1.0 + 1.0e-3);
    }

    #[test]
    fn test_image_to_bytes_size() {
        let image = make_image(4, 3, false);
        assert_eq!(image_to_bytes(&image).len(), 4 * 3 * 4);
    }
}
