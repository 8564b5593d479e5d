//! Eyelight preview: lights the scene from the camera itself, chaining
//! only through delta lobes so mirrors and glass stay readable.

// lumen
use crate::accelerators::bvh::{intersect_scene_bvh, BvhData};
use crate::core::geometry::{vec3_is_finite, Ray3f, Vector3f, Vector4f};
use crate::core::integrator::RenderParams;
use crate::core::light::LightsData;
use crate::core::lumen::PI;
use crate::core::reflection::{
    eval_bsdfcos, eval_delta, is_delta, sample_delta, sample_delta_pdf,
};
use crate::core::rng::{rand1f, RngState};
use crate::core::scene::{
    eval_emission, eval_environment, eval_material, eval_shading_normal, eval_shading_position,
    SceneData,
};

use super::path::OPACITY_EPS;

/// Preview shading with the light at the eye.
pub fn shade_eyelight(
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

        // emission plus the bsdf lit from the eye direction
        let incoming: Vector3f = outgoing;
        radiance += weight * eval_emission(&material, &normal, &outgoing);
        radiance += weight * PI * eval_bsdfcos(&material, &normal, &outgoing, &incoming);

        // terminate at the depth bound
        if bounce >= params.bounces.max(4) {
            break;
        }

        // continue the path only through delta lobes
        if !is_delta(&material) {
            break;
        }
        let incoming: Vector3f = sample_delta(&material, &normal, &outgoing, rand1f(rng));
        if incoming == Vector3f::default() {
            break;
        }
        weight *= eval_delta(&material, &normal, &outgoing, &incoming)
            / sample_delta_pdf(&material, &normal, &outgoing, &incoming);
        if weight == Vector3f::default() || !vec3_is_finite(&weight) {
            break;
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
