//! 2D textures in sRGB-byte or linear-float storage with bilinear
//! wrap-repeat sampling.

// lumen
use crate::core::geometry::{Vector2f, Vector4f};
use crate::core::lumen::{byte_to_float, clamp_t, mod_t, srgb_to_rgb, Float};

/// Texture stored either as linear floats or as sRGB-encoded bytes; only
/// one of the two pixel arrays is non-empty.
#[derive(Debug, Default, Clone)]
pub struct TextureData {
    pub width: usize,
    pub height: usize,
    pub linear: bool,
    pub pixelsf: Vec<Vector4f>,
    pub pixelsb: Vec<[u8; 4]>,
    pub nearest: bool,
}

impl TextureData {
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Build a linear float texture from raw pixels.
pub fn make_texture_f(width: usize, height: usize, pixels: Vec<Vector4f>) -> TextureData {
    assert_eq!(pixels.len(), width * height);
    TextureData {
        width,
        height,
        linear: true,
        pixelsf: pixels,
        pixelsb: Vec::new(),
        nearest: false,
    }
}

/// Build an sRGB byte texture from raw pixels.
pub fn make_texture_b(width: usize, height: usize, pixels: Vec<[u8; 4]>) -> TextureData {
    assert_eq!(pixels.len(), width * height);
    TextureData {
        width,
        height,
        linear: false,
        pixelsf: Vec::new(),
        pixelsb: pixels,
        nearest: false,
    }
}

/// Fetch one texel. Byte texels are decoded to linear when `as_linear` is
/// set and the texture is sRGB-encoded.
pub fn lookup_texture(texture: &TextureData, i: usize, j: usize, as_linear: bool) -> Vector4f {
    let idx: usize = j * texture.width + i;
    let color: Vector4f = if !texture.pixelsf.is_empty() {
        texture.pixelsf[idx]
    } else {
        let p: [u8; 4] = texture.pixelsb[idx];
        Vector4f {
            x: byte_to_float(p[0]),
            y: byte_to_float(p[1]),
            z: byte_to_float(p[2]),
            w: byte_to_float(p[3]),
        }
    };
    if as_linear && !texture.linear {
        Vector4f {
            x: srgb_to_rgb(color.x),
            y: srgb_to_rgb(color.y),
            z: srgb_to_rgb(color.z),
            w: color.w,
        }
    } else {
        color
    }
}

/// Wrap-repeat bilinear texture sampling. Invalid textures evaluate to
/// white so a missing map is a no-op modulation.
pub fn eval_texture(texture: &TextureData, uv: &Vector2f, as_linear: bool) -> Vector4f {
    if !texture.is_valid() {
        return Vector4f::new(1.0, 1.0, 1.0, 1.0);
    }
    let width: usize = texture.width;
    let height: usize = texture.height;
    // wrap-repeat addressing
    let s: Float = mod_t(uv.x, 1.0) * width as Float;
    let t: Float = mod_t(uv.y, 1.0) * height as Float;
    let i: usize = clamp_t(s as usize, 0, width - 1);
    let j: usize = clamp_t(t as usize, 0, height - 1);
    let ii: usize = (i + 1) % width;
    let jj: usize = (j + 1) % height;
    let u: Float = s - i as Float;
    let v: Float = t - j as Float;
    if texture.nearest {
        return lookup_texture(texture, i, j, as_linear);
    }
    lookup_texture(texture, i, j, as_linear) * ((1.0 - u) * (1.0 - v))
        + lookup_texture(texture, i, jj, as_linear) * ((1.0 - u) * v)
        + lookup_texture(texture, ii, j, as_linear) * (u * (1.0 - v))
        + lookup_texture(texture, ii, jj, as_linear) * (u * v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> TextureData {
        // 2x2 black/white checker
        let b = [0_u8, 0, 0, 255];
        let w = [255_u8, 255, 255, 255];
        make_texture_b(2, 2, vec![b, w, w, b])
    }

    #[test]
    fn test_lookup_srgb_decode() {
        let tex = checker();
        let texel = lookup_texture(&tex, 1, 0, true);
        assert!((texel.x - 1.0).abs() < 1.0e-6);
        let texel = lookup_texture(&tex, 0, 0, true);
        assert!(texel.x.abs() < 1.0e-6);
    }

    #[test]
    fn test_eval_texture_wraps() {
        let tex = checker();
        let a = eval_texture(&tex, &Vector2f::new(0.25, 0.25), false);
        let b = eval_texture(&tex, &Vector2f::new(1.25, 0.25), false);
        let c = eval_texture(&tex, &Vector2f::new(-0.75, 0.25), false);
        assert!((a.x - b.x).abs() < 1.0e-6);
        assert!((a.x - c.x).abs() < 1.0e-6);
    }

    #[test]
    fn test_eval_texture_invalid_is_white() {
        let tex = TextureData::default();
        let v = eval_texture(&tex, &Vector2f::new(0.3, 0.8), true);
        assert_eq!(v, Vector4f::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_bilinear_midpoint() {
        let tex = make_texture_f(
            2,
            1,
            vec![Vector4f::new(0.0, 0.0, 0.0, 1.0), Vector4f::new(1.0, 1.0, 1.0, 1.0)],
        );
        // st = 0.5 falls halfway into the blend between the two texels
        let v = eval_texture(&tex, &Vector2f::new(0.25, 0.5), false);
        assert!((v.x - 0.5).abs() < 1.0e-6);
    }
}
