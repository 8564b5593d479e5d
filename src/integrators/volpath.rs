//! Volumetric path tracing: the surface estimator of `path` extended with
//! free-flight sampling in participating media and a LIFO stack of the
//! media the path is currently inside.

// others
use smallvec::SmallVec;
// lumen
use crate::accelerators::bvh::{intersect_scene_bvh, BvhData};
use crate::core::geometry::{
    ray_point, vec3_dot, vec3_is_finite, vec3_max_component, Ray3f, Vector3f, Vector4f,
};
use crate::core::integrator::RenderParams;
use crate::core::light::{sample_lights, sample_lights_pdf, LightsData};
use crate::core::lumen::Float;
use crate::core::medium::{
    eval_phasefunction, eval_transmittance, sample_phasefunction, sample_phasefunction_pdf,
    sample_transmittance, sample_transmittance_pdf,
};
use crate::core::reflection::{
    eval_bsdfcos, eval_delta, is_delta, sample_bsdfcos, sample_bsdfcos_pdf, sample_delta,
    sample_delta_pdf,
};
use crate::core::rng::{rand1f, rand2f, RngState};
use crate::core::scene::{
    eval_emission, eval_environment, eval_material, eval_shading_normal, eval_shading_position,
    is_volumetric_instance, MaterialPoint, SceneData,
};

use super::path::OPACITY_EPS;

/// Media the path is currently inside, innermost last. Boundaries push on
/// entry and pop on exit; the stack depth is tiny in practice.
type VolumeStack = SmallVec<[MaterialPoint; 4]>;

/// In-medium scattering contribution: extinction times single-scattering
/// albedo times the phase function.
fn eval_scattering(material: &MaterialPoint, outgoing: &Vector3f, incoming: &Vector3f) -> Vector3f {
    material.density
        * material.scattering
        * eval_phasefunction(material.scanisotropy, outgoing, incoming)
}

fn sample_scattering(
    material: &MaterialPoint,
    outgoing: &Vector3f,
    _rnl: Float,
    rn: &crate::core::geometry::Vector2f,
) -> Vector3f {
    sample_phasefunction(material.scanisotropy, outgoing, rn)
}

fn sample_scattering_pdf(
    material: &MaterialPoint,
    outgoing: &Vector3f,
    incoming: &Vector3f,
) -> Float {
    sample_phasefunction_pdf(material.scanisotropy, outgoing, incoming)
}

/// Volumetric path tracing with MIS at surface and volume vertices.
pub fn shade_volpathtrace(
    scene: &SceneData,
    bvh: &BvhData,
    lights: &LightsData,
    ray: &Ray3f,
    rng: &mut RngState,
    params: &RenderParams,
) -> Vector4f {
    let mut radiance = Vector3f::default();
    let mut weight = Vector3f::splat(1.0);
    let mut ray: Ray3f = *ray;
    let mut hit: bool = false;
    let mut vstack: VolumeStack = SmallVec::new();

    let mut bounce: usize = 0;
    loop {
        // intersect next point
        let mut intersection = intersect_scene_bvh(bvh, scene, &ray, false);
        if !intersection.hit {
            radiance += weight * eval_environment(scene, &ray.d);
            break;
        }

        // sample the free-flight distance inside the innermost medium; the
        // surface keeps the probability mass of the exponential tail
        let mut in_volume: bool = false;
        if let Some(volume) = vstack.last() {
            let density: Vector3f = volume.density;
            let distance: Float = sample_transmittance(
                &density,
                intersection.distance,
                rand1f(rng),
                rand1f(rng),
            );
            weight *= eval_transmittance(&density, distance)
                / sample_transmittance_pdf(&density, distance, intersection.distance);
            in_volume = distance < intersection.distance;
            intersection.distance = distance;
        }

        if !in_volume {
            // handle surface
            let instance = &scene.instances[intersection.instance];
            let outgoing: Vector3f = -ray.d;
            let position: Vector3f = eval_shading_position(
                scene,
                instance,
                intersection.element,
                &intersection.uv,
                &outgoing,
            );
            let normal: Vector3f = eval_shading_normal(
                scene,
                instance,
                intersection.element,
                &intersection.uv,
                &outgoing,
            );
            let material = eval_material(scene, instance, intersection.element, &intersection.uv);

            // handle opacity
            if material.opacity < 1.0 && rand1f(rng) >= material.opacity {
                ray = Ray3f::new(position + ray.d * OPACITY_EPS, ray.d);
                continue;
            }

            if bounce == 0 {
                hit = true;
            }

            // accumulate emission
            radiance += weight * eval_emission(&material, &normal, &outgoing);

            // terminate at the depth bound; the last vertex only emits
            if bounce >= params.bounces {
                break;
            }

            // next direction
            let incoming: Vector3f = if !is_delta(&material) {
                let incoming = if rand1f(rng) < 0.5 {
                    sample_bsdfcos(&material, &normal, &outgoing, rand1f(rng), &rand2f(rng))
                } else {
                    sample_lights(
                        scene,
                        lights,
                        &position,
                        rand1f(rng),
                        rand1f(rng),
                        &rand2f(rng),
                    )
                };
                if incoming == Vector3f::default() {
                    break;
                }
                weight *= eval_bsdfcos(&material, &normal, &outgoing, &incoming)
                    / (0.5 * sample_bsdfcos_pdf(&material, &normal, &outgoing, &incoming)
                        + 0.5 * sample_lights_pdf(scene, bvh, lights, &position, &incoming));
                incoming
            } else {
                let incoming = sample_delta(&material, &normal, &outgoing, rand1f(rng));
                weight *= eval_delta(&material, &normal, &outgoing, &incoming)
                    / sample_delta_pdf(&material, &normal, &outgoing, &incoming);
                incoming
            };

            // update the medium stack iff the path crossed the boundary
            if is_volumetric_instance(scene, instance)
                && vec3_dot(&normal, &outgoing) * vec3_dot(&normal, &incoming) < 0.0
            {
                if vstack.is_empty() {
                    vstack.push(material);
                } else {
                    vstack.pop();
                }
            }

            // setup next iteration
            ray = Ray3f::new(position, incoming);
        } else {
            // handle an in-medium scattering event
            let outgoing: Vector3f = -ray.d;
            let position: Vector3f = ray_point(&ray, intersection.distance);
            let volume: MaterialPoint = vstack.last().unwrap().clone();

            // media may emit isotropically
            radiance += weight * volume.emission;

            // terminate at the depth bound
            if bounce >= params.bounces {
                break;
            }

            // next direction via MIS between the phase function and lights
            let incoming: Vector3f = if rand1f(rng) < 0.5 {
                sample_scattering(&volume, &outgoing, rand1f(rng), &rand2f(rng))
            } else {
                sample_lights(
                    scene,
                    lights,
                    &position,
                    rand1f(rng),
                    rand1f(rng),
                    &rand2f(rng),
                )
            };
            if incoming == Vector3f::default() {
                break;
            }
            weight *= eval_scattering(&volume, &outgoing, &incoming)
                / (0.5 * sample_scattering_pdf(&volume, &outgoing, &incoming)
                    + 0.5 * sample_lights_pdf(scene, bvh, lights, &position, &incoming));

            // setup next iteration
            ray = Ray3f::new(position, incoming);
        }

        // check weight
        if weight == Vector3f::default() || !vec3_is_finite(&weight) {
            break;
        }

        // russian roulette
        if bounce > 3 {
            let rr_prob: Float = (0.99 as Float).min(vec3_max_component(&weight));
            if rand1f(rng) >= rr_prob {
                break;
            }
            weight *= Vector3f::splat(1.0 / rr_prob);
        }

        bounce += 1;
    }

    Vector4f {
        x: radiance.x,
        y: radiance.y,
        z: radiance.z,
        w: if hit { 1.0 } else { 0.0 },
    }
}
