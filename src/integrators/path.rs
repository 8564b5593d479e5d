//! Surface path tracing with multiple importance sampling, and the naive
//! BSDF-sampling-only estimator.

// lumen
use crate::accelerators::bvh::{intersect_scene_bvh, BvhData};
use crate::core::geometry::{vec3_is_finite, vec3_max_component, Ray3f, Vector3f, Vector4f};
use crate::core::integrator::RenderParams;
use crate::core::light::{sample_lights, sample_lights_pdf, LightsData};
use crate::core::lumen::Float;
use crate::core::reflection::{
    eval_bsdfcos, eval_delta, is_delta, sample_bsdfcos, sample_bsdfcos_pdf, sample_delta,
    sample_delta_pdf,
};
use crate::core::rng::{rand1f, rand2f, RngState};
use crate::core::scene::{
    eval_emission, eval_environment, eval_material, eval_shading_normal, eval_shading_position,
    SceneData,
};

/// Offset applied when a ray is re-spawned through a stochastic opacity
/// cut-out; the skipped surface must not be re-hit.
pub const OPACITY_EPS: Float = 1.0e-2;

/// Path tracing with MIS: at every non-delta vertex the next direction
/// comes from the BSDF or the lights with equal probability, weighted by
/// the balance heuristic over both pdfs.
pub fn shade_pathtrace(
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

    let mut bounce: usize = 0;
    loop {
        // intersect next point
        let intersection = intersect_scene_bvh(bvh, scene, &ray, false);
        if !intersection.hit {
            radiance += weight * eval_environment(scene, &ray.d);
            break;
        }
        let instance = &scene.instances[intersection.instance];

        // prepare shading point
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

        // handle opacity; the skipped surface does not consume a bounce
        if material.opacity < 1.0 && rand1f(rng) >= material.opacity {
            ray = Ray3f::new(position + ray.d * OPACITY_EPS, ray.d);
            continue;
        }

        // set hit variables
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
                sample_lights(scene, lights, &position, rand1f(rng), rand1f(rng), &rand2f(rng))
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

        // setup next iteration
        ray = Ray3f::new(position, incoming);

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

/// Naive path tracing: BSDF sampling only, no light sampling and no MIS.
/// Converges to the same image as `shade_pathtrace`, slowly.
pub fn shade_naive(
    scene: &SceneData,
    bvh: &BvhData,
    _lights: &LightsData,
    ray: &Ray3f,
    rng: &mut RngState,
    params: &RenderParams,
) -> Vector4f {
    let mut radiance = Vector3f::default();
    let mut weight = Vector3f::splat(1.0);
    let mut ray: Ray3f = *ray;
    let mut hit: bool = false;

    let mut bounce: usize = 0;
    loop {
        // intersect next point
        let intersection = intersect_scene_bvh(bvh, scene, &ray, false);
        if !intersection.hit {
            radiance += weight * eval_environment(scene, &ray.d);
            break;
        }
        let instance = &scene.instances[intersection.instance];

        // prepare shading point
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

        // terminate at the depth bound
        if bounce >= params.bounces {
            break;
        }

        // next direction
        let incoming: Vector3f = if material.roughness != 0.0 {
            let incoming =
                sample_bsdfcos(&material, &normal, &outgoing, rand1f(rng), &rand2f(rng));
            if incoming == Vector3f::default() {
                break;
            }
            weight *= eval_bsdfcos(&material, &normal, &outgoing, &incoming)
                / sample_bsdfcos_pdf(&material, &normal, &outgoing, &incoming);
            incoming
        } else {
            let incoming = sample_delta(&material, &normal, &outgoing, rand1f(rng));
            if incoming == Vector3f::default() {
                break;
            }
            weight *= eval_delta(&material, &normal, &outgoing, &incoming)
                / sample_delta_pdf(&material, &normal, &outgoing, &incoming);
            incoming
        };

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

        // setup next iteration
        ray = Ray3f::new(position, incoming);
        bounce += 1;
    }

    Vector4f {
        x: radiance.x,
        y: radiance.y,
        z: radiance.z,
        w: if hit { 1.0 } else { 0.0 },
    }
}
