//! Render driver: configuration, per-pixel state, the progressive
//! sampling loop and the final read-out.
//!
//! Rendering is shared-nothing over pixels: each pixel owns its RNG
//! stream and its accumulator cells, so the parallel loop needs no locks,
//! only a partition of the image into disjoint chunks.

// std
use std::str::FromStr;
// others
use log::info;
use thiserror::Error;
// lumen
use crate::accelerators::bvh::{make_scene_bvh, BvhData};
use crate::core::camera::eval_camera;
use crate::core::film::{make_image, ColorImage};
use crate::core::geometry::{vec4_is_finite, Ray3f, Vector2f, Vector4f};
use crate::core::light::LightsData;
use crate::core::lumen::Float;
use crate::core::rng::{make_rng, rand1f, rand1i, rand2f, RngState};
use crate::core::scene::SceneData;
use crate::integrators::debug::{shade_color, shade_normal, shade_texcoord};
use crate::integrators::eyelight::shade_eyelight;
use crate::integrators::path::{shade_naive, shade_pathtrace};
use crate::integrators::volpath::shade_volpathtrace;

/// Shader variant selection.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ShaderType {
    Volpathtrace,
    #[default]
    Pathtrace,
    Naive,
    Eyelight,
    Normal,
    Texcoord,
    Color,
}

pub const SHADER_NAMES: [&str; 7] = [
    "volpathtrace",
    "pathtrace",
    "naive",
    "eyelight",
    "normal",
    "texcoord",
    "color",
];

/// Errors reported at driver setup, before any parallel work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown shader {0:?} (expected one of {SHADER_NAMES:?})")]
    UnknownShader(String),
    #[error("camera index {index} out of range ({count} cameras in scene)")]
    CameraOutOfRange { index: usize, count: usize },
    #[error("resolution must be positive")]
    ZeroResolution,
}

impl FromStr for ShaderType {
    type Err = RenderError;
    fn from_str(name: &str) -> Result<Self, RenderError> {
        match name {
            "volpathtrace" => Ok(ShaderType::Volpathtrace),
            "pathtrace" => Ok(ShaderType::Pathtrace),
            "naive" => Ok(ShaderType::Naive),
            "eyelight" => Ok(ShaderType::Eyelight),
            "normal" => Ok(ShaderType::Normal),
            "texcoord" => Ok(ShaderType::Texcoord),
            "color" => Ok(ShaderType::Color),
            _ => Err(RenderError::UnknownShader(name.to_string())),
        }
    }
}

/// Options recognised by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub camera: usize,
    pub resolution: usize,
    pub shader: ShaderType,
    pub samples: usize,
    pub bounces: usize,
    pub noparallel: bool,
    pub pratio: usize,
    pub exposure: Float,
    pub filmic: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            camera: 0,
            resolution: 720,
            shader: ShaderType::Pathtrace,
            samples: 512,
            bounces: 4,
            noparallel: false,
            pratio: 8,
            exposure: 0.0,
            filmic: false,
        }
    }
}

/// Check the configuration against the scene before rendering starts.
pub fn validate_params(scene: &SceneData, params: &RenderParams) -> Result<(), RenderError> {
    if params.camera >= scene.cameras.len() {
        return Err(RenderError::CameraOutOfRange {
            index: params.camera,
            count: scene.cameras.len(),
        });
    }
    if params.resolution == 0 {
        return Err(RenderError::ZeroResolution);
    }
    Ok(())
}

/// Progressive render state: linear accumulator, per-pixel hit counts and
/// per-pixel RNG streams.
#[derive(Debug, Default, Clone)]
pub struct RenderState {
    pub width: usize,
    pub height: usize,
    pub samples: usize,
    pub image: Vec<Vector4f>,
    pub hits: Vec<u32>,
    pub rngs: Vec<RngState>,
}

/// Build the scene BVH with the default quality settings.
pub fn make_bvh(scene: &SceneData, params: &RenderParams) -> BvhData {
    make_scene_bvh(scene, false, params.noparallel)
}

/// Allocate the render state: the longest image side matches
/// `resolution`, the other follows the camera aspect.
pub fn make_state(scene: &SceneData, params: &RenderParams) -> RenderState {
    let camera = &scene.cameras[params.camera];
    let (width, height) = if camera.aspect >= 1.0 {
        (
            params.resolution,
            (params.resolution as Float / camera.aspect).round() as usize,
        )
    } else {
        (
            (params.resolution as Float * camera.aspect).round() as usize,
            params.resolution,
        )
    };
    let mut state = RenderState {
        width,
        height,
        samples: 0,
        image: vec![Vector4f::default(); width * height],
        hits: vec![0; width * height],
        rngs: vec![RngState::default(); width * height],
    };
    // decorrelated streams, seeded from one master generator
    let mut master: RngState = make_rng(1301081, 1);
    for rng in state.rngs.iter_mut() {
        *rng = make_rng(961748941, (rand1i(&mut master, 1 << 31) / 2 + 1) as u64);
    }
    state
}

type ShaderFunc = fn(
    &SceneData,
    &BvhData,
    &LightsData,
    &Ray3f,
    &mut RngState,
    &RenderParams,
) -> Vector4f;

fn get_shader(params: &RenderParams) -> ShaderFunc {
    match params.shader {
        ShaderType::Volpathtrace => shade_volpathtrace,
        ShaderType::Pathtrace => shade_pathtrace,
        ShaderType::Naive => shade_naive,
        ShaderType::Eyelight => shade_eyelight,
        ShaderType::Normal => shade_normal,
        ShaderType::Texcoord => shade_texcoord,
        ShaderType::Color => shade_color,
    }
}

#[allow(clippy::too_many_arguments)]
fn render_pixel(
    scene: &SceneData,
    bvh: &BvhData,
    lights: &LightsData,
    params: &RenderParams,
    shader: ShaderFunc,
    width: usize,
    height: usize,
    idx: usize,
    rng: &mut RngState,
    center_tap: bool,
) -> Vector4f {
    let i: usize = idx % width;
    let j: usize = idx / width;
    let uv: Vector2f = if center_tap {
        Vector2f::new(
            (i as Float + 0.5) / width as Float,
            (j as Float + 0.5) / height as Float,
        )
    } else {
        Vector2f::new(
            (i as Float + rand1f(rng)) / width as Float,
            (j as Float + rand1f(rng)) / height as Float,
        )
    };
    let ray: Ray3f = eval_camera(&scene.cameras[params.camera], &uv, &rand2f(rng));
    let mut radiance: Vector4f = shader(scene, bvh, lights, &ray, rng, params);
    // pathological samples must not poison the accumulator
    if !vec4_is_finite(&radiance) {
        radiance = Vector4f::default();
    }
    radiance
}

/// Accumulate one sample per pixel into the state. Calling this
/// `params.samples` times completes the render; callers may stop between
/// calls and read a consistent partial accumulation.
pub fn render_samples(
    state: &mut RenderState,
    scene: &SceneData,
    bvh: &BvhData,
    lights: &LightsData,
    params: &RenderParams,
) {
    if state.samples >= params.samples {
        return;
    }
    let shader: ShaderFunc = get_shader(params);
    let width: usize = state.width;
    let height: usize = state.height;
    if width * height == 0 {
        return;
    }
    state.samples += 1;
    if params.samples == 1 {
        // single-sample preview taps the pixel centre with no jitter
        for idx in 0..width * height {
            let radiance = render_pixel(
                scene,
                bvh,
                lights,
                params,
                shader,
                width,
                height,
                idx,
                &mut state.rngs[idx],
                true,
            );
            state.image[idx] += radiance;
            state.hits[idx] += 1;
        }
    } else if params.noparallel {
        for idx in 0..width * height {
            let radiance = render_pixel(
                scene,
                bvh,
                lights,
                params,
                shader,
                width,
                height,
                idx,
                &mut state.rngs[idx],
                false,
            );
            state.image[idx] += radiance;
            state.hits[idx] += 1;
        }
    } else {
        // shared-nothing parallel loop over disjoint pixel chunks
        let num_cores: usize = num_cpus::get().max(1);
        let chunk: usize = ((width * height + num_cores - 1) / num_cores).max(1);
        crossbeam::scope(|scope| {
            for (band, ((image_chunk, hits_chunk), rngs_chunk)) in state
                .image
                .chunks_mut(chunk)
                .zip(state.hits.chunks_mut(chunk))
                .zip(state.rngs.chunks_mut(chunk))
                .enumerate()
            {
                let band_first: usize = band * chunk;
                scope.spawn(move |_| {
                    for offset in 0..image_chunk.len() {
                        let idx: usize = band_first + offset;
                        let radiance = render_pixel(
                            scene,
                            bvh,
                            lights,
                            params,
                            shader,
                            width,
                            height,
                            idx,
                            &mut rngs_chunk[offset],
                            false,
                        );
                        image_chunk[offset] += radiance;
                        hits_chunk[offset] += 1;
                    }
                });
            }
        })
        .unwrap();
    }
}

/// Read out the accumulated render as a linear image: the accumulator
/// divided by the sample count.
pub fn get_render(state: &RenderState) -> ColorImage {
    let mut image: ColorImage = make_image(state.width, state.height, true);
    if state.samples == 0 {
        return image;
    }
    let scale: Float = 1.0 / state.samples as Float;
    for (pixel, accum) in image.pixels.iter_mut().zip(state.image.iter()) {
        *pixel = *accum * scale;
    }
    image
}

/// Render all requested samples; convenience wrapper over
/// `render_samples` used by tests and scripts.
pub fn render_image(
    scene: &SceneData,
    bvh: &BvhData,
    lights: &LightsData,
    params: &RenderParams,
) -> ColorImage {
    let mut state = make_state(scene, params);
    info!(
        "rendering {}x{} at {} samples with {:?}",
        state.width, state.height, params.samples, params.shader
    );
    for _ in 0..params.samples {
        render_samples(&mut state, scene, bvh, lights, params);
    }
    get_render(&state)
}
