//! Closed-form evaluation, importance sampling and pdfs for every material
//! class. Each class supplies the cosine-weighted triple
//! (`eval_*`, `sample_*`, `sample_*_pdf`); materials whose scattering is a
//! Dirac distribution in direction use the distinct `*_delta` family that
//! returns Dirac-integrated quantities.
//!
//! Dispatch is a plain match on the material tag: the integrator's
//! per-bounce BSDF switch is the inner loop and a tagged union keeps it
//! branch-predictable and inlinable.

// lumen
use crate::core::geometry::{vec3_dot, vec3_mean, vec3_normalize, Vector2f, Vector3f};
use crate::core::lumen::{Float, PI};
use crate::core::microfacet::{
    eta_to_reflectivity, fresnel_conductor, fresnel_dielectric, fresnel_schlick,
    microfacet_distribution, microfacet_shadowing, reflect, reflectivity_to_eta, refract,
    sample_microfacet, sample_microfacet_pdf,
};
use crate::core::sampling::{sample_hemisphere_cos, sample_hemisphere_cos_pdf};
use crate::core::scene::{MaterialPoint, MaterialType};

fn same_hemisphere(normal: &Vector3f, outgoing: &Vector3f, incoming: &Vector3f) -> bool {
    vec3_dot(normal, outgoing) * vec3_dot(normal, incoming) >= 0.0
}

fn upnormal(normal: &Vector3f, outgoing: &Vector3f) -> Vector3f {
    if vec3_dot(normal, outgoing) <= 0.0 {
        -*normal
    } else {
        *normal
    }
}

// matte

pub fn eval_matte(
    color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if !same_hemisphere(normal, outgoing, incoming) {
        return Vector3f::default();
    }
    let up: Vector3f = upnormal(normal, outgoing);
    *color / PI * vec3_dot(&up, incoming).abs()
}

pub fn sample_matte(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rn: &Vector2f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    sample_hemisphere_cos(&up, rn)
}

pub fn sample_matte_pdf(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if !same_hemisphere(normal, outgoing, incoming) {
        return 0.0;
    }
    let up: Vector3f = upnormal(normal, outgoing);
    sample_hemisphere_cos_pdf(&up, incoming)
}

// glossy: diffuse base with a dielectric microfacet coat, Fresnel-weighted

pub fn eval_glossy(
    color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if !same_hemisphere(normal, outgoing, incoming) {
        return Vector3f::default();
    }
    let up: Vector3f = upnormal(normal, outgoing);
    let f1: Float = fresnel_dielectric(ior, &up, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
    let f: Float = fresnel_dielectric(ior, &halfway, incoming);
    let d: Float = microfacet_distribution(roughness, &up, &halfway);
    let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
    *color * (1.0 - f1) / PI * vec3_dot(&up, incoming).abs()
        + Vector3f::splat(1.0) * f * d * g
            / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, incoming))
            * vec3_dot(&up, incoming).abs()
}

pub fn sample_glossy(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
    rn: &Vector2f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    if rnl < fresnel_dielectric(ior, &up, outgoing) {
        let halfway: Vector3f = sample_microfacet(roughness, &up, rn);
        let incoming: Vector3f = reflect(outgoing, &halfway);
        if !same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    } else {
        sample_hemisphere_cos(&up, rn)
    }
}

pub fn sample_glossy_pdf(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if !same_hemisphere(normal, outgoing, incoming) {
        return 0.0;
    }
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*outgoing + *incoming));
    let f: Float = fresnel_dielectric(ior, &up, outgoing);
    f * sample_microfacet_pdf(roughness, &up, &halfway)
        / (4.0 * vec3_dot(outgoing, &halfway).abs())
        + (1.0 - f) * sample_hemisphere_cos_pdf(&up, incoming)
}

// reflective: microfacet conductor, or a perfect mirror when delta

pub fn eval_reflective(
    color: &Vector3f,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if !same_hemisphere(normal, outgoing, incoming) {
        return Vector3f::default();
    }
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
    let f: Vector3f = fresnel_conductor(
        &reflectivity_to_eta(color),
        &Vector3f::default(),
        &halfway,
        incoming,
    );
    let d: Float = microfacet_distribution(roughness, &up, &halfway);
    let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
    f * d * g / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, incoming))
        * vec3_dot(&up, incoming).abs()
}

pub fn sample_reflective(
    _color: &Vector3f,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rn: &Vector2f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = sample_microfacet(roughness, &up, rn);
    let incoming: Vector3f = reflect(outgoing, &halfway);
    if !same_hemisphere(&up, outgoing, &incoming) {
        return Vector3f::default();
    }
    incoming
}

pub fn sample_reflective_pdf(
    _color: &Vector3f,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if !same_hemisphere(normal, outgoing, incoming) {
        return 0.0;
    }
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*outgoing + *incoming));
    sample_microfacet_pdf(roughness, &up, &halfway) / (4.0 * vec3_dot(outgoing, &halfway).abs())
}

pub fn eval_reflective_delta(
    color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if !same_hemisphere(normal, outgoing, incoming) {
        return Vector3f::default();
    }
    let up: Vector3f = upnormal(normal, outgoing);
    fresnel_conductor(&reflectivity_to_eta(color), &Vector3f::default(), &up, outgoing)
}

pub fn sample_reflective_delta(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    reflect(outgoing, &up)
}

pub fn sample_reflective_delta_pdf(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if !same_hemisphere(normal, outgoing, incoming) {
        return 0.0;
    }
    1.0
}

// transparent: thin-surface beam splitter with a single dielectric Fresnel

pub fn eval_transparent(
    color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    if same_hemisphere(normal, outgoing, incoming) {
        let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
        let f: Float = fresnel_dielectric(ior, &halfway, outgoing);
        let d: Float = microfacet_distribution(roughness, &up, &halfway);
        let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
        Vector3f::splat(1.0) * f * d * g
            / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, incoming))
            * vec3_dot(&up, incoming).abs()
    } else {
        let reflected: Vector3f = reflect(&-*incoming, &up);
        let halfway: Vector3f = vec3_normalize(&(reflected + *outgoing));
        let f: Float = fresnel_dielectric(ior, &halfway, outgoing);
        let d: Float = microfacet_distribution(roughness, &up, &halfway);
        let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, &reflected);
        *color * (1.0 - f) * d * g
            / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, &reflected))
            * vec3_dot(&up, &reflected).abs()
    }
}

pub fn sample_transparent(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
    rn: &Vector2f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = sample_microfacet(roughness, &up, rn);
    if rnl < fresnel_dielectric(ior, &halfway, outgoing) {
        let incoming: Vector3f = reflect(outgoing, &halfway);
        if !same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    } else {
        let reflected: Vector3f = reflect(outgoing, &halfway);
        let incoming: Vector3f = -reflect(&reflected, &up);
        if same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    }
}

pub fn sample_transparent_pdf(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    let up: Vector3f = upnormal(normal, outgoing);
    if same_hemisphere(normal, outgoing, incoming) {
        let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
        fresnel_dielectric(ior, &halfway, outgoing)
            * sample_microfacet_pdf(roughness, &up, &halfway)
            / (4.0 * vec3_dot(outgoing, &halfway).abs())
    } else {
        let reflected: Vector3f = reflect(&-*incoming, &up);
        let halfway: Vector3f = vec3_normalize(&(reflected + *outgoing));
        let f: Float = fresnel_dielectric(ior, &halfway, outgoing);
        let d: Float = sample_microfacet_pdf(roughness, &up, &halfway);
        (1.0 - f) * d / (4.0 * vec3_dot(outgoing, &halfway).abs())
    }
}

pub fn eval_transparent_delta(
    color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    if same_hemisphere(normal, outgoing, incoming) {
        Vector3f::splat(1.0) * fresnel_dielectric(ior, &up, outgoing)
    } else {
        *color * (1.0 - fresnel_dielectric(ior, &up, outgoing))
    }
}

pub fn sample_transparent_delta(
    _color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    if rnl < fresnel_dielectric(ior, &up, outgoing) {
        reflect(outgoing, &up)
    } else {
        -*outgoing
    }
}

pub fn sample_transparent_delta_pdf(
    _color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    let up: Vector3f = upnormal(normal, outgoing);
    if same_hemisphere(normal, outgoing, incoming) {
        fresnel_dielectric(ior, &up, outgoing)
    } else {
        1.0 - fresnel_dielectric(ior, &up, outgoing)
    }
}

// refractive: true refraction with Snell's law

pub fn eval_refractive(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    if same_hemisphere(normal, outgoing, incoming) {
        let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
        let f: Float = fresnel_dielectric(rel_ior, &halfway, outgoing);
        let d: Float = microfacet_distribution(roughness, &up, &halfway);
        let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
        Vector3f::splat(1.0) * f * d * g
            / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, incoming))
            * vec3_dot(&up, incoming).abs()
    } else {
        let halfway: Vector3f = -vec3_normalize(&(*incoming * rel_ior + *outgoing))
            * if entering { 1.0 } else { -1.0 };
        let f: Float = fresnel_dielectric(rel_ior, &halfway, outgoing);
        let d: Float = microfacet_distribution(roughness, &up, &halfway);
        let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
        // jacobian of the half-vector transform for refraction
        Vector3f::splat(1.0)
            * ((vec3_dot(outgoing, &halfway) * vec3_dot(incoming, &halfway))
                / (vec3_dot(outgoing, &up) * vec3_dot(incoming, &up)))
            .abs()
            * ((1.0 - f) * d * g
                / (rel_ior * vec3_dot(&halfway, incoming) + vec3_dot(&halfway, outgoing))
                    .powi(2))
            * vec3_dot(&up, incoming).abs()
    }
}

pub fn sample_refractive(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
    rn: &Vector2f,
) -> Vector3f {
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    let halfway: Vector3f = sample_microfacet(roughness, &up, rn);
    if rnl < fresnel_dielectric(rel_ior, &halfway, outgoing) {
        let incoming: Vector3f = reflect(outgoing, &halfway);
        if !same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    } else {
        let incoming: Vector3f = refract(outgoing, &halfway, 1.0 / rel_ior);
        if same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    }
}

pub fn sample_refractive_pdf(
    _color: &Vector3f,
    ior: Float,
    roughness: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    if same_hemisphere(normal, outgoing, incoming) {
        let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
        fresnel_dielectric(rel_ior, &halfway, outgoing)
            * sample_microfacet_pdf(roughness, &up, &halfway)
            / (4.0 * vec3_dot(outgoing, &halfway).abs())
    } else {
        let halfway: Vector3f = -vec3_normalize(&(*incoming * rel_ior + *outgoing))
            * if entering { 1.0 } else { -1.0 };
        let f: Float = fresnel_dielectric(rel_ior, &halfway, outgoing);
        (1.0 - f) * sample_microfacet_pdf(roughness, &up, &halfway)
            * vec3_dot(&halfway, incoming).abs()
            / (rel_ior * vec3_dot(&halfway, incoming) + vec3_dot(&halfway, outgoing)).powi(2)
    }
}

pub fn eval_refractive_delta(
    _color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if (ior - 1.0).abs() < 1.0e-3 {
        return if vec3_dot(normal, outgoing) * vec3_dot(normal, incoming) <= 0.0 {
            Vector3f::splat(1.0)
        } else {
            Vector3f::default()
        };
    }
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    if same_hemisphere(normal, outgoing, incoming) {
        Vector3f::splat(1.0) * fresnel_dielectric(rel_ior, &up, outgoing)
    } else {
        // radiance is compressed by the squared relative index on the way in
        Vector3f::splat(1.0)
            * (1.0 / (rel_ior * rel_ior))
            * (1.0 - fresnel_dielectric(rel_ior, &up, outgoing))
    }
}

pub fn sample_refractive_delta(
    _color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
) -> Vector3f {
    if (ior - 1.0).abs() < 1.0e-3 {
        return -*outgoing;
    }
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    if rnl < fresnel_dielectric(rel_ior, &up, outgoing) {
        reflect(outgoing, &up)
    } else {
        refract(outgoing, &up, 1.0 / rel_ior)
    }
}

pub fn sample_refractive_delta_pdf(
    _color: &Vector3f,
    ior: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if (ior - 1.0).abs() < 1.0e-3 {
        return if vec3_dot(normal, outgoing) * vec3_dot(normal, incoming) < 0.0 {
            1.0
        } else {
            0.0
        };
    }
    let entering: bool = vec3_dot(normal, outgoing) >= 0.0;
    let up: Vector3f = if entering { *normal } else { -*normal };
    let rel_ior: Float = if entering { ior } else { 1.0 / ior };
    if same_hemisphere(normal, outgoing, incoming) {
        fresnel_dielectric(rel_ior, &up, outgoing)
    } else {
        1.0 - fresnel_dielectric(rel_ior, &up, outgoing)
    }
}

// gltfpbr: metal-rough workflow with Schlick Fresnel

pub fn eval_gltfpbr(
    color: &Vector3f,
    ior: Float,
    roughness: Float,
    metallic: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if !same_hemisphere(normal, outgoing, incoming) {
        return Vector3f::default();
    }
    let reflectivity: Vector3f = crate::core::geometry::vec3_lerp(
        &eta_to_reflectivity(&Vector3f::splat(ior)),
        color,
        metallic,
    );
    let up: Vector3f = upnormal(normal, outgoing);
    let f1: Vector3f = fresnel_schlick(&reflectivity, &up, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*incoming + *outgoing));
    let f: Vector3f = fresnel_schlick(&reflectivity, &halfway, incoming);
    let d: Float = microfacet_distribution(roughness, &up, &halfway);
    let g: Float = microfacet_shadowing(roughness, &up, &halfway, outgoing, incoming);
    *color * (1.0 - metallic) * (Vector3f::splat(1.0) - f1) / PI
        * vec3_dot(&up, incoming).abs()
        + f * d * g / (4.0 * vec3_dot(&up, outgoing) * vec3_dot(&up, incoming))
            * vec3_dot(&up, incoming).abs()
}

#[allow(clippy::too_many_arguments)]
pub fn sample_gltfpbr(
    color: &Vector3f,
    ior: Float,
    roughness: Float,
    metallic: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
    rn: &Vector2f,
) -> Vector3f {
    let up: Vector3f = upnormal(normal, outgoing);
    let reflectivity: Vector3f = crate::core::geometry::vec3_lerp(
        &eta_to_reflectivity(&Vector3f::splat(ior)),
        color,
        metallic,
    );
    if rnl < vec3_mean(&fresnel_schlick(&reflectivity, &up, outgoing)) {
        let halfway: Vector3f = sample_microfacet(roughness, &up, rn);
        let incoming: Vector3f = reflect(outgoing, &halfway);
        if !same_hemisphere(&up, outgoing, &incoming) {
            return Vector3f::default();
        }
        incoming
    } else {
        sample_hemisphere_cos(&up, rn)
    }
}

pub fn sample_gltfpbr_pdf(
    color: &Vector3f,
    ior: Float,
    roughness: Float,
    metallic: Float,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if !same_hemisphere(normal, outgoing, incoming) {
        return 0.0;
    }
    let up: Vector3f = upnormal(normal, outgoing);
    let halfway: Vector3f = vec3_normalize(&(*outgoing + *incoming));
    let reflectivity: Vector3f = crate::core::geometry::vec3_lerp(
        &eta_to_reflectivity(&Vector3f::splat(ior)),
        color,
        metallic,
    );
    let f: Float = vec3_mean(&fresnel_schlick(&reflectivity, &up, outgoing));
    f * sample_microfacet_pdf(roughness, &up, &halfway)
        / (4.0 * vec3_dot(outgoing, &halfway).abs())
        + (1.0 - f) * sample_hemisphere_cos_pdf(&up, incoming)
}

// passthrough: vacuum boundary of a volumetric region

pub fn eval_passthrough(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if same_hemisphere(normal, outgoing, incoming) {
        Vector3f::default()
    } else {
        Vector3f::splat(1.0)
    }
}

pub fn sample_passthrough(
    _color: &Vector3f,
    _normal: &Vector3f,
    outgoing: &Vector3f,
) -> Vector3f {
    -*outgoing
}

pub fn sample_passthrough_pdf(
    _color: &Vector3f,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if same_hemisphere(normal, outgoing, incoming) {
        0.0
    } else {
        1.0
    }
}

// dispatch on the material tag

/// True when the scattering at this point is a Dirac distribution and the
/// `*_delta` family must be used.
pub fn is_delta(material: &MaterialPoint) -> bool {
    match material.material_type {
        MaterialType::Reflective | MaterialType::Transparent | MaterialType::Refractive => {
            material.roughness == 0.0
        }
        MaterialType::Volumetric => true,
        _ => false,
    }
}

/// BSDF times the incoming cosine for non-delta materials.
pub fn eval_bsdfcos(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if material.roughness == 0.0 {
        return Vector3f::default();
    }
    match material.material_type {
        MaterialType::Matte => eval_matte(&material.color, normal, outgoing, incoming),
        MaterialType::Glossy => eval_glossy(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Reflective => eval_reflective(
            &material.color,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Transparent => eval_transparent(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Refractive | MaterialType::Subsurface => eval_refractive(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Gltfpbr => eval_gltfpbr(
            &material.color,
            material.ior,
            material.roughness,
            material.metallic,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Volumetric => Vector3f::default(),
    }
}

/// Sample an incoming direction proportionally to the cosine-weighted BSDF.
pub fn sample_bsdfcos(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
    rn: &Vector2f,
) -> Vector3f {
    if material.roughness == 0.0 {
        return Vector3f::default();
    }
    match material.material_type {
        MaterialType::Matte => sample_matte(&material.color, normal, outgoing, rn),
        MaterialType::Glossy => sample_glossy(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            rnl,
            rn,
        ),
        MaterialType::Reflective => {
            sample_reflective(&material.color, material.roughness, normal, outgoing, rn)
        }
        MaterialType::Transparent => sample_transparent(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            rnl,
            rn,
        ),
        MaterialType::Refractive | MaterialType::Subsurface => sample_refractive(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            rnl,
            rn,
        ),
        MaterialType::Gltfpbr => sample_gltfpbr(
            &material.color,
            material.ior,
            material.roughness,
            material.metallic,
            normal,
            outgoing,
            rnl,
            rn,
        ),
        MaterialType::Volumetric => Vector3f::default(),
    }
}

pub fn sample_bsdfcos_pdf(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if material.roughness == 0.0 {
        return 0.0;
    }
    match material.material_type {
        MaterialType::Matte => sample_matte_pdf(&material.color, normal, outgoing, incoming),
        MaterialType::Glossy => sample_glossy_pdf(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Reflective => sample_reflective_pdf(
            &material.color,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Transparent => sample_transparent_pdf(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Refractive | MaterialType::Subsurface => sample_refractive_pdf(
            &material.color,
            material.ior,
            material.roughness,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Gltfpbr => sample_gltfpbr_pdf(
            &material.color,
            material.ior,
            material.roughness,
            material.metallic,
            normal,
            outgoing,
            incoming,
        ),
        MaterialType::Volumetric => 0.0,
    }
}

/// Dirac-integrated scattering for delta materials.
pub fn eval_delta(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Vector3f {
    if material.roughness != 0.0 {
        return Vector3f::default();
    }
    match material.material_type {
        MaterialType::Reflective => {
            eval_reflective_delta(&material.color, normal, outgoing, incoming)
        }
        MaterialType::Transparent => {
            eval_transparent_delta(&material.color, material.ior, normal, outgoing, incoming)
        }
        MaterialType::Refractive => {
            eval_refractive_delta(&material.color, material.ior, normal, outgoing, incoming)
        }
        MaterialType::Volumetric => eval_passthrough(&material.color, normal, outgoing, incoming),
        _ => Vector3f::default(),
    }
}

pub fn sample_delta(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    rnl: Float,
) -> Vector3f {
    if material.roughness != 0.0 {
        return Vector3f::default();
    }
    match material.material_type {
        MaterialType::Reflective => sample_reflective_delta(&material.color, normal, outgoing),
        MaterialType::Transparent => {
            sample_transparent_delta(&material.color, material.ior, normal, outgoing, rnl)
        }
        MaterialType::Refractive => {
            sample_refractive_delta(&material.color, material.ior, normal, outgoing, rnl)
        }
        MaterialType::Volumetric => sample_passthrough(&material.color, normal, outgoing),
        _ => Vector3f::default(),
    }
}

pub fn sample_delta_pdf(
    material: &MaterialPoint,
    normal: &Vector3f,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    if material.roughness != 0.0 {
        return 0.0;
    }
    match material.material_type {
        MaterialType::Reflective => {
            sample_reflective_delta_pdf(&material.color, normal, outgoing, incoming)
        }
        MaterialType::Transparent => {
            sample_transparent_delta_pdf(&material.color, material.ior, normal, outgoing, incoming)
        }
        MaterialType::Refractive => {
            sample_refractive_delta_pdf(&material.color, material.ior, normal, outgoing, incoming)
        }
        MaterialType::Volumetric => {
            sample_passthrough_pdf(&material.color, normal, outgoing, incoming)
        }
        _ => 0.0,
    }
}
