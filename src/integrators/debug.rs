//! Auxiliary outputs for debugging: shading normals, texture coordinates
//! and material base color at the primary intersection.

// lumen
use crate::accelerators::bvh::{intersect_scene_bvh, BvhData};
use crate::core::geometry::{Ray3f, Vector3f, Vector4f};
use crate::core::integrator::RenderParams;
use crate::core::light::LightsData;
use crate::core::rng::RngState;
use crate::core::scene::{eval_material, eval_shading_normal, eval_texcoord, SceneData};

/// Shading normal as a color; alpha marks the hit.
pub fn shade_normal(
    scene: &SceneData,
    bvh: &BvhData,
    _lights: &LightsData,
    ray: &Ray3f,
    _rng: &mut RngState,
    _params: &RenderParams,
) -> Vector4f {
    let intersection = intersect_scene_bvh(bvh, scene, ray, false);
    if !intersection.hit {
        return Vector4f::default();
    }
    let instance = &scene.instances[intersection.instance];
    let outgoing: Vector3f = -ray.d;
    let normal: Vector3f = eval_shading_normal(
        scene,
        instance,
        intersection.element,
        &intersection.uv,
        &outgoing,
    );
    Vector4f {
        x: normal.x,
        y: normal.y,
        z: normal.z,
        w: 1.0,
    }
}

/// Interpolated texture coordinates as a color.
pub fn shade_texcoord(
    scene: &SceneData,
    bvh: &BvhData,
    _lights: &LightsData,
    ray: &Ray3f,
    _rng: &mut RngState,
    _params: &RenderParams,
) -> Vector4f {
    let intersection = intersect_scene_bvh(bvh, scene, ray, false);
    if !intersection.hit {
        return Vector4f::default();
    }
    let instance = &scene.instances[intersection.instance];
    let texcoord = eval_texcoord(scene, instance, intersection.element, &intersection.uv);
    Vector4f {
        x: texcoord.x,
        y: texcoord.y,
        z: 0.0,
        w: 1.0,
    }
}

/// Material base color after texturing.
pub fn shade_color(
    scene: &SceneData,
    bvh: &BvhData,
    _lights: &LightsData,
    ray: &Ray3f,
    _rng: &mut RngState,
    _params: &RenderParams,
) -> Vector4f {
    let intersection = intersect_scene_bvh(bvh, scene, ray, false);
    if !intersection.hit {
        return Vector4f::default();
    }
    let instance = &scene.instances[intersection.instance];
    let color = eval_material(scene, instance, intersection.element, &intersection.uv).color;
    Vector4f {
        x: color.x,
        y: color.y,
        z: color.z,
        w: 1.0,
    }
}
