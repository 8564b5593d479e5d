//! Microfacet distribution and Fresnel terms shared by the rough material
//! lobes. Roughness here is already squared (perceptual roughness is
//! remapped by the material evaluator before it reaches these functions).

// lumen
use crate::core::geometry::{
    basis_fromz, transform_direction, vec3_dot, vec3_normalize, Vector2f, Vector3f,
};
use crate::core::lumen::{clamp_t, safe_sqrt, Float, PI};

// fresnel

/// Schlick approximation of the Fresnel term.
pub fn fresnel_schlick(specular: &Vector3f, normal: &Vector3f, outgoing: &Vector3f) -> Vector3f {
    if *specular == Vector3f::default() {
        return Vector3f::default();
    }
    let cosine: Float = vec3_dot(normal, outgoing);
    *specular
        + (Vector3f::splat(1.0) - *specular)
            * clamp_t(1.0 - cosine.abs(), 0.0, 1.0).powi(5)
}

/// Exact Fresnel term for dielectrics. Handles rays from either side of
/// the interface by flipping the relative index of refraction.
pub fn fresnel_dielectric(eta: Float, normal: &Vector3f, outgoing: &Vector3f) -> Float {
    let mut eta: Float = eta;
    let mut cosw: Float = vec3_dot(normal, outgoing);
    if cosw < 0.0 {
        eta = 1.0 / eta;
        cosw = -cosw;
    }
    let sin2: Float = 1.0 - cosw * cosw;
    let eta2: Float = eta * eta;
    let cos2t: Float = 1.0 - sin2 / eta2;
    if cos2t < 0.0 {
        return 1.0; // tir
    }
    let t0: Float = safe_sqrt(cos2t);
    let t1: Float = eta * t0;
    let t2: Float = eta * cosw;
    let rs: Float = (cosw - t1) / (cosw + t1);
    let rp: Float = (t0 - t2) / (t0 + t2);
    (rs * rs + rp * rp) / 2.0
}

/// Exact Fresnel term for conductors, per channel.
pub fn fresnel_conductor(
    eta: &Vector3f,
    etak: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
) -> Vector3f {
    let cosw: Float = clamp_t(vec3_dot(normal, outgoing), -1.0, 1.0);
    if cosw <= 0.0 {
        return Vector3f::default();
    }
    let cos2: Float = cosw * cosw;
    let sin2: Float = clamp_t(1.0 - cos2, 0.0, 1.0);
    let eta2: Vector3f = *eta * *eta;
    let etak2: Vector3f = *etak * *etak;
    let t0: Vector3f = eta2 - etak2 - Vector3f::splat(sin2);
    let a2plusb2 = vec3_sqrt(&(t0 * t0 + eta2 * etak2 * 4.0));
    let t1: Vector3f = a2plusb2 + Vector3f::splat(cos2);
    let a = vec3_sqrt(&((a2plusb2 + t0) * 0.5));
    let t2: Vector3f = a * (2.0 * cosw);
    let rs: Vector3f = (t1 - t2) / (t1 + t2);
    let t3: Vector3f = a2plusb2 * cos2 + Vector3f::splat(sin2 * sin2);
    let t4: Vector3f = t2 * sin2;
    let rp: Vector3f = rs * (t3 - t4) / (t3 + t4);
    (rp + rs) * 0.5
}

fn vec3_sqrt(v: &Vector3f) -> Vector3f {
    Vector3f {
        x: safe_sqrt(v.x),
        y: safe_sqrt(v.y),
        z: safe_sqrt(v.z),
    }
}

/// Reflectivity at normal incidence for a given index of refraction.
pub fn eta_to_reflectivity(eta: &Vector3f) -> Vector3f {
    let num: Vector3f = (*eta - Vector3f::splat(1.0)) * (*eta - Vector3f::splat(1.0));
    let den: Vector3f = (*eta + Vector3f::splat(1.0)) * (*eta + Vector3f::splat(1.0));
    num / den
}

/// Index of refraction matching a given reflectivity at normal incidence.
pub fn reflectivity_to_eta(reflectivity: &Vector3f) -> Vector3f {
    let r = vec3_sqrt(&crate::core::geometry::vec3_clamp(reflectivity, 0.0, 0.99));
    (Vector3f::splat(1.0) + r) / (Vector3f::splat(1.0) - r)
}

// reflect / refract

pub fn reflect(w: &Vector3f, n: &Vector3f) -> Vector3f {
    -*w + *n * (2.0 * vec3_dot(w, n))
}

/// Snell refraction; `inv_eta` is the reciprocal relative index. Returns
/// the null vector on total internal reflection.
pub fn refract(w: &Vector3f, n: &Vector3f, inv_eta: Float) -> Vector3f {
    let cosine: Float = vec3_dot(n, w);
    let k: Float = 1.0 + inv_eta * inv_eta * (cosine * cosine - 1.0);
    if k < 0.0 {
        return Vector3f::default(); // tir
    }
    -*w * inv_eta + *n * (inv_eta * cosine - safe_sqrt(k))
}

// ggx

/// GGX normal distribution evaluated at a half vector.
pub fn microfacet_distribution(roughness: Float, normal: &Vector3f, halfway: &Vector3f) -> Float {
    let cosine: Float = vec3_dot(normal, halfway);
    if cosine <= 0.0 {
        return 0.0;
    }
    let roughness2: Float = roughness * roughness;
    let cosine2: Float = cosine * cosine;
    roughness2
        / (PI
            * (cosine2 * roughness2 + 1.0 - cosine2)
            * (cosine2 * roughness2 + 1.0 - cosine2))
}

fn microfacet_shadowing1(
    roughness: Float,
    normal: &Vector3f,
    halfway: &Vector3f,
    direction: &Vector3f,
) -> Float {
    let cosine: Float = vec3_dot(normal, direction);
    let cosineh: Float = vec3_dot(halfway, direction);
    if cosine * cosineh <= 0.0 {
        return 0.0;
    }
    let roughness2: Float = roughness * roughness;
    let cosine2: Float = cosine * cosine;
    2.0 * cosine.abs()
        / (cosine.abs() + safe_sqrt(cosine2 - roughness2 * cosine2 + roughness2))
}

/// Smith height-correlated-free shadowing: product of the per-direction
/// masking terms.
pub fn microfacet_shadowing(
    roughness: Float,
    normal: &Vector3f,
    halfway: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    microfacet_shadowing1(roughness, normal, halfway, outgoing)
        * microfacet_shadowing1(roughness, normal, halfway, incoming)
}

/// Sample a half vector proportionally to `D(h) cos(h)`.
pub fn sample_microfacet(roughness: Float, normal: &Vector3f, rn: &Vector2f) -> Vector3f {
    let phi: Float = 2.0 * PI * rn.x;
    let theta: Float = (roughness * (rn.y / (1.0 - rn.y)).sqrt()).atan();
    let local = Vector3f {
        x: theta.sin() * phi.cos(),
        y: theta.sin() * phi.sin(),
        z: theta.cos(),
    };
    transform_direction(&basis_fromz(normal), &local)
}

pub fn sample_microfacet_pdf(roughness: Float, normal: &Vector3f, halfway: &Vector3f) -> Float {
    let cosine: Float = vec3_dot(normal, halfway);
    if cosine < 0.0 {
        return 0.0;
    }
    microfacet_distribution(roughness, normal, halfway) * cosine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{make_rng, rand2f};

    #[test]
    fn test_fresnel_dielectric_limits() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        // grazing incidence tends to full reflection
        let grazing = Vector3f::new(0.999, 0.0, 0.045);
        assert!(fresnel_dielectric(1.5, &n, &vec3_normalize(&grazing)) > 0.8);
        // normal incidence matches the reflectivity formula
        let f0 = fresnel_dielectric(1.5, &n, &n);
        let expected = ((1.5 - 1.0) / (1.5 + 1.0) as Float).powi(2);
        assert!((f0 - expected).abs() < 1.0e-4);
    }

    #[test]
    fn test_eta_reflectivity_round_trip() {
        let eta = Vector3f::splat(1.45);
        let eta2 = reflectivity_to_eta(&eta_to_reflectivity(&eta));
        assert!((eta2.x - 1.45).abs() < 1.0e-3);
    }

    #[test]
    fn test_refract_straight_through() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let w = Vector3f::new(0.0, 0.0, 1.0);
        let t = refract(&w, &n, 1.0);
        assert!(crate::core::geometry::vec3_distance(&t, &-w) < 1.0e-5);
    }

    #[test]
    fn test_sample_microfacet_pdf_normalized() {
        // estimate the integral of the half-vector pdf over the hemisphere
        // with uniform directions; it must come out close to one
        let roughness: Float = 0.3 * 0.3;
        let normal = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = make_rng(41, 11);
        let n = 200_000;
        let mut integral: Float = 0.0;
        for _ in 0..n {
            let rn = rand2f(&mut rng);
            let z: Float = rn.y;
            let r: Float = safe_sqrt(1.0 - z * z);
            let phi: Float = 2.0 * PI * rn.x;
            let h = Vector3f::new(r * phi.cos(), r * phi.sin(), z);
            integral += sample_microfacet_pdf(roughness, &normal, &h);
        }
        integral *= 2.0 * PI / n as Float;
        assert!((integral - 1.0).abs() < 0.05, "integral {}", integral);
    }

    #[test]
    fn test_sample_microfacet_positive_pdf() {
        let roughness: Float = 0.2;
        let normal = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = make_rng(43, 13);
        for _ in 0..1000 {
            let h = sample_microfacet(roughness, &normal, &rand2f(&mut rng));
            assert!(sample_microfacet_pdf(roughness, &normal, &h) > 0.0);
        }
    }
}
