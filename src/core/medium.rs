//! Participating-media quantities: the Henyey-Greenstein phase function
//! and free-flight transmittance sampling against a per-channel extinction.

// lumen
use crate::core::geometry::{
    basis_fromz, transform_direction, vec3_clamp, vec3_dot, vec3_exp, Vector2f, Vector3f,
};
use crate::core::lumen::{clamp_t, safe_sqrt, Float, INV_4_PI, PI};

/// Henyey-Greenstein lobe for a pair of directions; both directions point
/// away from the scattering event.
pub fn eval_phasefunction(anisotropy: Float, outgoing: &Vector3f, incoming: &Vector3f) -> Float {
    let cosine: Float = -vec3_dot(outgoing, incoming);
    let denom: Float = 1.0 + anisotropy * anisotropy - 2.0 * anisotropy * cosine;
    if denom <= 0.0 {
        return 0.0;
    }
    INV_4_PI * (1.0 - anisotropy * anisotropy) / (denom * denom.sqrt())
}

/// Importance-sample the Henyey-Greenstein lobe.
pub fn sample_phasefunction(anisotropy: Float, outgoing: &Vector3f, rn: &Vector2f) -> Vector3f {
    let cos_theta: Float = if anisotropy.abs() < 1.0e-3 {
        1.0 - 2.0 * rn.y
    } else {
        let square: Float =
            (1.0 - anisotropy * anisotropy) / (1.0 + anisotropy - 2.0 * anisotropy * rn.y);
        (1.0 + anisotropy * anisotropy - square * square) / (2.0 * anisotropy)
    };
    let sin_theta: Float = safe_sqrt(1.0 - cos_theta * cos_theta);
    let phi: Float = 2.0 * PI * rn.x;
    let local = Vector3f {
        x: sin_theta * phi.cos(),
        y: sin_theta * phi.sin(),
        z: cos_theta,
    };
    transform_direction(&basis_fromz(&-*outgoing), &local)
}

pub fn sample_phasefunction_pdf(
    anisotropy: Float,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    eval_phasefunction(anisotropy, outgoing, incoming)
}

// transmittance

/// Beer-Lambert transmittance over the given distance.
pub fn eval_transmittance(density: &Vector3f, distance: Float) -> Vector3f {
    vec3_exp(&(-*density * distance))
}

/// Sample a free-flight distance: pick one extinction channel uniformly,
/// then draw from the exponential of that channel, clamped at the surface
/// distance so the surface event keeps its probability mass.
pub fn sample_transmittance(
    density: &Vector3f,
    max_distance: Float,
    rl: Float,
    rd: Float,
) -> Float {
    let channel: usize = clamp_t((rl * 3.0) as usize, 0, 2);
    let density_c: Float = density[channel];
    let distance: Float = if density_c == 0.0 {
        crate::core::lumen::FLT_MAX
    } else {
        -(1.0 - rd).ln() / density_c
    };
    distance.min(max_distance)
}

/// Density of `sample_transmittance`: mixture over the three channels, with
/// the surface event carrying the remaining exponential tail mass.
pub fn sample_transmittance_pdf(density: &Vector3f, distance: Float, max_distance: Float) -> Float {
    if distance < max_distance {
        let pdfs: Vector3f = *density * vec3_exp(&(-*density * distance));
        (pdfs.x + pdfs.y + pdfs.z) / 3.0
    } else {
        let tails: Vector3f = vec3_exp(&(-*density * max_distance));
        (tails.x + tails.y + tails.z) / 3.0
    }
}

/// Extinction derived from an albedo-like color and a transmission depth:
/// the darker the color, the denser the medium.
pub fn color_to_density(color: &Vector3f, trdepth: Float) -> Vector3f {
    -crate::core::geometry::vec3_log(&vec3_clamp(color, 0.0001, 1.0)) / trdepth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{make_rng, rand1f, rand2f};

    #[test]
    fn test_phase_isotropic_is_uniform() {
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 1.0, 0.0);
        let p = eval_phasefunction(0.0, &wo, &wi);
        assert!((p - INV_4_PI).abs() < 1.0e-6);
    }

    #[test]
    fn test_phase_pdf_matches_eval() {
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = make_rng(5, 21);
        for g in [-0.7, -0.1, 0.0, 0.4, 0.9_f32] {
            for _ in 0..100 {
                let wi = sample_phasefunction(g, &wo, &rand2f(&mut rng));
                let pdf = sample_phasefunction_pdf(g, &wo, &wi);
                assert!(pdf > 0.0);
                assert!((pdf - eval_phasefunction(g, &wo, &wi)).abs() < 1.0e-6);
            }
        }
    }

    #[test]
    fn test_phase_mean_cosine_matches_anisotropy() {
        // E[cos theta] of Henyey-Greenstein equals g
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = make_rng(11, 6);
        for g in [-0.5, 0.0, 0.7_f32] {
            let n = 100_000;
            let mut mean: Float = 0.0;
            for _ in 0..n {
                let wi = sample_phasefunction(g, &wo, &rand2f(&mut rng));
                mean += -vec3_dot(&wo, &wi);
            }
            mean /= n as Float;
            assert!((mean - g).abs() < 0.01, "g {} mean {}", g, mean);
        }
    }

    #[test]
    fn test_transmittance_estimator_unbiased() {
        // E[ Tr(d) / pdf(d) ] over the sampled distance equals the full
        // transmittance through the slab for each channel
        let density = Vector3f::new(0.5, 1.0, 2.0);
        let thickness: Float = 1.3;
        let mut rng = make_rng(7, 2);
        let n = 400_000;
        let mut estimate = Vector3f::default();
        for _ in 0..n {
            let d = sample_transmittance(&density, thickness, rand1f(&mut rng), rand1f(&mut rng));
            let w =
                eval_transmittance(&density, d) / sample_transmittance_pdf(&density, d, thickness);
            if d >= thickness {
                estimate += w;
            }
        }
        estimate = estimate / n as Float;
        let expected = eval_transmittance(&density, thickness);
        assert!((estimate.x - expected.x).abs() < 0.01);
        assert!((estimate.y - expected.y).abs() < 0.01);
        assert!((estimate.z - expected.z).abs() < 0.01);
    }

    #[test]
    fn test_color_to_density_white_is_thin() {
        let thin = color_to_density(&Vector3f::splat(1.0), 0.01);
        let thick = color_to_density(&Vector3f::splat(0.1), 0.01);
        assert!(thin.x < thick.x);
    }
}
