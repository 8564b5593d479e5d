//! Direct-lighting sampler. At build time every emissive instance and
//! emissive environment yields a light descriptor with a discrete CDF over
//! its elements: triangle areas, quad areas, or per-texel importance for
//! textured environments. Sampling picks a light uniformly, an element by
//! CDF, and a point inside the element; the pdf of a direction is
//! reconstructed by summing over lights.

// others
use log::info;
// lumen
use crate::accelerators::bvh::{intersect_instance_bvh, BvhData};
use crate::core::geometry::{
    transform_direction, vec3_dot, vec3_normalize, Ray3f, Vector2f, Vector3f,
};
use crate::core::lumen::{clamp_t, Float, PI};
use crate::core::sampling::{
    sample_discrete, sample_discrete_pdf, sample_sphere, sample_sphere_pdf, sample_triangle,
    sample_uniform, sample_uniform_pdf,
};
use crate::core::scene::{eval_position, quad_area_of, triangle_area_of, SceneData};
use crate::core::texture::lookup_texture;

/// Ray walks in `sample_lights_pdf` accumulate at most this many
/// intersections along a direction. Transmissive thin-sheet meshes with
/// more layered hits than this undercount their pdf slightly.
pub const LIGHT_PDF_MAX_WALK: usize = 100;

/// One emitter: either an instance or an environment, with the discrete
/// CDF over its elements. Textureless environments keep an empty CDF and
/// are sampled uniformly over the sphere.
#[derive(Debug, Default, Clone)]
pub struct LightData {
    pub instance: Option<usize>,
    pub environment: Option<usize>,
    pub elements_cdf: Vec<Float>,
}

#[derive(Debug, Default, Clone)]
pub struct LightsData {
    pub lights: Vec<LightData>,
}

/// Enumerate emissive instances and environments and precompute their
/// element CDFs. Zero-area elements contribute nothing to the CDF.
pub fn make_lights(scene: &SceneData) -> LightsData {
    let mut lights = LightsData::default();

    for (handle, instance) in scene.instances.iter().enumerate() {
        let material = &scene.materials[instance.material];
        if material.emission == Vector3f::default() {
            continue;
        }
        let shape = &scene.shapes[instance.shape];
        if shape.triangles.is_empty() && shape.quads.is_empty() {
            continue;
        }
        let mut light = LightData {
            instance: Some(handle),
            environment: None,
            elements_cdf: Vec::new(),
        };
        if !shape.triangles.is_empty() {
            light.elements_cdf = vec![0.0; shape.triangles.len()];
            for idx in 0..shape.triangles.len() {
                light.elements_cdf[idx] = triangle_area_of(shape, idx);
                if idx != 0 {
                    light.elements_cdf[idx] += light.elements_cdf[idx - 1];
                }
            }
        }
        if !shape.quads.is_empty() {
            light.elements_cdf = vec![0.0; shape.quads.len()];
            for idx in 0..shape.quads.len() {
                light.elements_cdf[idx] = quad_area_of(shape, idx);
                if idx != 0 {
                    light.elements_cdf[idx] += light.elements_cdf[idx - 1];
                }
            }
        }
        if *light.elements_cdf.last().unwrap() <= 0.0 {
            // every element degenerate, nothing to sample
            continue;
        }
        lights.lights.push(light);
    }

    for (handle, environment) in scene.environments.iter().enumerate() {
        if environment.emission == Vector3f::default() {
            continue;
        }
        let mut light = LightData {
            instance: None,
            environment: Some(handle),
            elements_cdf: Vec::new(),
        };
        if let Some(texture_id) = environment.emission_tex {
            let texture = &scene.textures[texture_id];
            light.elements_cdf = vec![0.0; texture.width * texture.height];
            for idx in 0..light.elements_cdf.len() {
                let i: usize = idx % texture.width;
                let j: usize = idx / texture.width;
                let theta: Float = (j as Float + 0.5) * PI / texture.height as Float;
                let value = lookup_texture(texture, i, j, true);
                light.elements_cdf[idx] = value.x.max(value.y).max(value.z) * theta.sin();
                if idx != 0 {
                    light.elements_cdf[idx] += light.elements_cdf[idx - 1];
                }
            }
        }
        lights.lights.push(light);
    }

    info!("initialized {} lights", lights.lights.len());
    lights
}

/// Sample an incoming direction toward the lights from `position`.
/// Returns the null vector when there is nothing to sample.
pub fn sample_lights(
    scene: &SceneData,
    lights: &LightsData,
    position: &Vector3f,
    rl: Float,
    rel: Float,
    ruv: &Vector2f,
) -> Vector3f {
    if lights.lights.is_empty() {
        return Vector3f::default();
    }
    let light_id: usize = sample_uniform(lights.lights.len(), rl);
    let light = &lights.lights[light_id];
    if let Some(instance_id) = light.instance {
        let instance = &scene.instances[instance_id];
        let shape = &scene.shapes[instance.shape];
        let element: usize = sample_discrete(&light.elements_cdf, rel);
        let uv: Vector2f = if !shape.triangles.is_empty() {
            sample_triangle(ruv)
        } else {
            *ruv
        };
        let lposition: Vector3f = eval_position(scene, instance, element, &uv);
        vec3_normalize(&(lposition - *position))
    } else if let Some(environment_id) = light.environment {
        let environment = &scene.environments[environment_id];
        if let Some(texture_id) = environment.emission_tex {
            let texture = &scene.textures[texture_id];
            let idx: usize = sample_discrete(&light.elements_cdf, rel);
            let uv = Vector2f::new(
                ((idx % texture.width) as Float + 0.5) / texture.width as Float,
                ((idx / texture.width) as Float + 0.5) / texture.height as Float,
            );
            // texel centre mapped back to the equirect direction
            transform_direction(
                &environment.frame,
                &Vector3f::new(
                    (uv.x * 2.0 * PI).cos() * (uv.y * PI).sin(),
                    (uv.y * PI).cos(),
                    (uv.x * 2.0 * PI).sin() * (uv.y * PI).sin(),
                ),
            )
        } else {
            sample_sphere(ruv)
        }
    } else {
        Vector3f::default()
    }
}

/// Solid-angle pdf of `sample_lights` having produced `direction` from
/// `position`: the uniform-over-lights weight times the per-light pdf,
/// summed over lights. Mesh lights walk every front-facing intersection
/// along the direction because the sampled point could have been any of
/// them.
pub fn sample_lights_pdf(
    scene: &SceneData,
    bvh: &BvhData,
    lights: &LightsData,
    position: &Vector3f,
    direction: &Vector3f,
) -> Float {
    let mut pdf: Float = 0.0;
    for light in &lights.lights {
        if let Some(instance_id) = light.instance {
            let instance = &scene.instances[instance_id];
            // accumulate the area-to-solid-angle pdf of every hit
            let mut lpdf: Float = 0.0;
            let mut next_position: Vector3f = *position;
            for _ in 0..LIGHT_PDF_MAX_WALK {
                let intersection = intersect_instance_bvh(
                    bvh,
                    scene,
                    instance_id,
                    &Ray3f::new(next_position, *direction),
                    false,
                );
                if !intersection.hit {
                    break;
                }
                let lposition: Vector3f =
                    eval_position(scene, instance, intersection.element, &intersection.uv);
                let lnormal: Vector3f = crate::core::scene::eval_element_normal(
                    scene,
                    instance,
                    intersection.element,
                );
                // prob element * area element = total area of the light
                let area: Float = *light.elements_cdf.last().unwrap();
                lpdf += crate::core::geometry::vec3_distance_squared(&lposition, position)
                    / (vec3_dot(&lnormal, direction).abs() * area);
                next_position = lposition + *direction * 1.0e-3;
            }
            pdf += lpdf;
        } else if let Some(environment_id) = light.environment {
            let environment = &scene.environments[environment_id];
            if let Some(texture_id) = environment.emission_tex {
                let texture = &scene.textures[texture_id];
                let wl: Vector3f = transform_direction(
                    &crate::core::geometry::frame_inverse(&environment.frame, false),
                    direction,
                );
                let mut texcoord = Vector2f::new(
                    wl.z.atan2(wl.x) / (2.0 * PI),
                    clamp_t(wl.y, -1.0, 1.0).acos() / PI,
                );
                if texcoord.x < 0.0 {
                    texcoord.x += 1.0;
                }
                let i: usize = clamp_t(
                    (texcoord.x * texture.width as Float) as usize,
                    0,
                    texture.width - 1,
                );
                let j: usize = clamp_t(
                    (texcoord.y * texture.height as Float) as usize,
                    0,
                    texture.height - 1,
                );
                let prob: Float = sample_discrete_pdf(&light.elements_cdf, j * texture.width + i);
                let angle: Float = (2.0 * PI / texture.width as Float)
                    * (PI / texture.height as Float)
                    * (PI * (j as Float + 0.5) / texture.height as Float).sin();
                pdf += prob / angle;
            } else {
                pdf += sample_sphere_pdf();
            }
        }
    }
    pdf *= sample_uniform_pdf(lights.lights.len());
    pdf
}
