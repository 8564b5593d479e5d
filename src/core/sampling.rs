//! Draw random samples from a chosen probability distribution: uniform and
//! discrete-CDF index sampling plus the warping functions used by the
//! estimators.

// lumen
use crate::core::geometry::{basis_fromz, transform_direction, Vector2f, Vector3f};
use crate::core::lumen::{clamp_t, safe_sqrt, Float, PI};

/// Uniform index in [0, n).
pub fn sample_uniform(n: usize, r: Float) -> usize {
    clamp_t((r * n as Float) as usize, 0, n - 1)
}

pub fn sample_uniform_pdf(n: usize) -> Float {
    1.0 / n as Float
}

/// Sample an index proportionally to the weights encoded in a monotone
/// non-decreasing cumulative sum. Binary search for the first entry
/// greater than the scaled random variable.
pub fn sample_discrete(cdf: &[Float], r: Float) -> usize {
    let total: Float = *cdf.last().unwrap();
    let r: Float = clamp_t(r * total, 0.0, total - 0.00001);
    // find first cdf[i] > r
    let mut first: usize = 0;
    let mut len: usize = cdf.len();
    while len > 0 {
        let half: usize = len >> 1;
        let middle: usize = first + half;
        if cdf[middle] <= r {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    clamp_t(first, 0, cdf.len() - 1)
}

/// Probability of the returned index, normalised by the total measure.
pub fn sample_discrete_pdf(cdf: &[Float], idx: usize) -> Float {
    let total: Float = *cdf.last().unwrap();
    if idx == 0 {
        cdf[0] / total
    } else {
        (cdf[idx] - cdf[idx - 1]) / total
    }
}

/// Barycentric coordinates uniform over the unit triangle.
pub fn sample_triangle(ruv: &Vector2f) -> Vector2f {
    Vector2f {
        x: 1.0 - safe_sqrt(ruv.x),
        y: ruv.y * safe_sqrt(ruv.x),
    }
}

/// Uniform direction over the sphere.
pub fn sample_sphere(ruv: &Vector2f) -> Vector3f {
    let z: Float = 2.0 * ruv.y - 1.0;
    let r: Float = safe_sqrt(1.0 - z * z);
    let phi: Float = 2.0 * PI * ruv.x;
    Vector3f {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    }
}

pub fn sample_sphere_pdf() -> Float {
    1.0 / (4.0 * PI)
}

/// Cosine-weighted direction on the hemisphere around the given normal.
pub fn sample_hemisphere_cos(normal: &Vector3f, ruv: &Vector2f) -> Vector3f {
    let z: Float = safe_sqrt(ruv.y);
    let r: Float = safe_sqrt(1.0 - z * z);
    let phi: Float = 2.0 * PI * ruv.x;
    let local = Vector3f {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    };
    transform_direction(&basis_fromz(normal), &local)
}

pub fn sample_hemisphere_cos_pdf(normal: &Vector3f, incoming: &Vector3f) -> Float {
    let cosw: Float = crate::core::geometry::vec3_dot(normal, incoming);
    if cosw <= 0.0 {
        0.0
    } else {
        cosw / PI
    }
}

/// Uniform point on the unit disk.
pub fn sample_disk(ruv: &Vector2f) -> Vector2f {
    let r: Float = safe_sqrt(ruv.y);
    let phi: Float = 2.0 * PI * ruv.x;
    Vector2f {
        x: phi.cos() * r,
        y: phi.sin() * r,
    }
}
