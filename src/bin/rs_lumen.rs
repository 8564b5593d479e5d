//! Command-line renderer: renders the built-in Cornell box with the
//! selected shader and writes a tonemapped PNG. Scene-file loading is
//! left to external tooling; this binary exercises the renderer end to
//! end without any I/O dependencies.

// std
use std::path::PathBuf;
// others
use anyhow::{Context, Result};
use log::info;
use pbr::ProgressBar;
use structopt::StructOpt;
// lumen
use lumen::core::film::{tonemap_image, write_png};
use lumen::core::geometry::{Frame3f, Vector3f};
use lumen::core::integrator::{
    get_render, make_bvh, make_state, render_samples, validate_params, RenderParams, ShaderType,
};
use lumen::core::light::make_lights;
use lumen::core::scene::{InstanceData, MaterialData, SceneData, ShapeData};
use lumen::shapes::catmullclark::tesselate_surfaces;

/// Render the built-in Cornell box and write a PNG.
#[derive(StructOpt)]
#[structopt(name = "rs_lumen")]
struct Cli {
    /// shader: volpathtrace, pathtrace, naive, eyelight, normal, texcoord, color
    #[structopt(long = "shader", default_value = "pathtrace")]
    shader: String,
    /// samples per pixel
    #[structopt(short = "s", long = "samples", default_value = "256")]
    samples: usize,
    /// maximum bounce depth
    #[structopt(short = "b", long = "bounces", default_value = "8")]
    bounces: usize,
    /// longest image side in pixels
    #[structopt(short = "r", long = "resolution", default_value = "720")]
    resolution: usize,
    /// camera index
    #[structopt(long = "camera", default_value = "0")]
    camera: usize,
    /// render on a single thread
    #[structopt(long = "noparallel")]
    noparallel: bool,
    /// tone-mapping exposure
    #[structopt(short = "e", long = "exposure", default_value = "0")]
    exposure: f32,
    /// use the filmic tone-mapping curve
    #[structopt(long = "filmic")]
    filmic: bool,
    /// output image path
    #[structopt(short = "o", long = "output", default_value = "cornellbox.png", parse(from_os_str))]
    output: PathBuf,
}

fn quad_shape(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3], p3: [f32; 3]) -> ShapeData {
    ShapeData {
        quads: vec![[0, 1, 2, 3]],
        positions: vec![
            Vector3f::new(p0[0], p0[1], p0[2]),
            Vector3f::new(p1[0], p1[1], p1[2]),
            Vector3f::new(p2[0], p2[1], p2[2]),
            Vector3f::new(p3[0], p3[1], p3[2]),
        ],
        ..ShapeData::default()
    }
}

fn matte(color: [f32; 3]) -> MaterialData {
    MaterialData {
        color: Vector3f::new(color[0], color[1], color[2]),
        roughness: 1.0,
        ..MaterialData::default()
    }
}

fn add_object(scene: &mut SceneData, shape: ShapeData, material: MaterialData) {
    scene.shapes.push(shape);
    scene.materials.push(material);
    scene.instances.push(InstanceData {
        frame: Frame3f::default(),
        shape: scene.shapes.len() - 1,
        material: scene.materials.len() - 1,
    });
}

/// The classic box: white floor/ceiling/back, red and green side walls,
/// two rotated boxes and one area light.
fn make_cornellbox() -> SceneData {
    let mut scene = SceneData::default();

    scene.cameras.push(lumen::core::camera::CameraData {
        frame: Frame3f {
            o: Vector3f::new(0.0, 1.0, 3.9),
            ..Frame3f::default()
        },
        lens: 0.035,
        film: 0.024,
        aspect: 1.0,
        focus: 3.9,
        aperture: 0.0,
        orthographic: false,
    });

    let white = [0.725, 0.71, 0.68];
    let red = [0.63, 0.065, 0.05];
    let green = [0.14, 0.45, 0.091];

    // floor
    add_object(
        &mut scene,
        quad_shape(
            [-1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 0.0, -1.0],
            [-1.0, 0.0, -1.0],
        ),
        matte(white),
    );
    // ceiling
    add_object(
        &mut scene,
        quad_shape(
            [-1.0, 2.0, 1.0],
            [-1.0, 2.0, -1.0],
            [1.0, 2.0, -1.0],
            [1.0, 2.0, 1.0],
        ),
        matte(white),
    );
    // back wall
    add_object(
        &mut scene,
        quad_shape(
            [-1.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
            [1.0, 2.0, -1.0],
            [-1.0, 2.0, -1.0],
        ),
        matte(white),
    );
    // right wall
    add_object(
        &mut scene,
        quad_shape(
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 1.0],
            [1.0, 2.0, 1.0],
            [1.0, 2.0, -1.0],
        ),
        matte(green),
    );
    // left wall
    add_object(
        &mut scene,
        quad_shape(
            [-1.0, 0.0, 1.0],
            [-1.0, 0.0, -1.0],
            [-1.0, 2.0, -1.0],
            [-1.0, 2.0, 1.0],
        ),
        matte(red),
    );

    // short box
    let shortbox_positions: [[f32; 3]; 20] = [
        [0.53, 0.6, 0.75],
        [0.7, 0.6, 0.17],
        [0.13, 0.6, 0.0],
        [-0.05, 0.6, 0.57],
        [-0.05, 0.0, 0.57],
        [-0.05, 0.6, 0.57],
        [0.13, 0.6, 0.0],
        [0.13, 0.0, 0.0],
        [0.53, 0.0, 0.75],
        [0.53, 0.6, 0.75],
        [-0.05, 0.6, 0.57],
        [-0.05, 0.0, 0.57],
        [0.7, 0.0, 0.17],
        [0.7, 0.6, 0.17],
        [0.53, 0.6, 0.75],
        [0.53, 0.0, 0.75],
        [0.13, 0.0, 0.0],
        [0.13, 0.6, 0.0],
        [0.7, 0.6, 0.17],
        [0.7, 0.0, 0.17],
    ];
    let mut shortbox = ShapeData::default();
    for p in &shortbox_positions {
        shortbox.positions.push(Vector3f::new(p[0], p[1], p[2]));
    }
    shortbox.quads = (0..5).map(|i| [4 * i, 4 * i + 1, 4 * i + 2, 4 * i + 3]).collect();
    add_object(&mut scene, shortbox, matte(white));

    // tall box
    let tallbox_positions: [[f32; 3]; 20] = [
        [-0.53, 1.2, 0.09],
        [0.04, 1.2, -0.09],
        [-0.14, 1.2, -0.67],
        [-0.71, 1.2, -0.49],
        [-0.53, 0.0, 0.09],
        [-0.53, 1.2, 0.09],
        [-0.71, 1.2, -0.49],
        [-0.71, 0.0, -0.49],
        [-0.71, 0.0, -0.49],
        [-0.71, 1.2, -0.49],
        [-0.14, 1.2, -0.67],
        [-0.14, 0.0, -0.67],
        [-0.14, 0.0, -0.67],
        [-0.14, 1.2, -0.67],
        [0.04, 1.2, -0.09],
        [0.04, 0.0, -0.09],
        [0.04, 0.0, -0.09],
        [0.04, 1.2, -0.09],
        [-0.53, 1.2, 0.09],
        [-0.53, 0.0, 0.09],
    ];
    let mut tallbox = ShapeData::default();
    for p in &tallbox_positions {
        tallbox.positions.push(Vector3f::new(p[0], p[1], p[2]));
    }
    tallbox.quads = (0..5).map(|i| [4 * i, 4 * i + 1, 4 * i + 2, 4 * i + 3]).collect();
    add_object(&mut scene, tallbox, matte(white));

    // area light
    add_object(
        &mut scene,
        quad_shape(
            [-0.25, 1.99, 0.25],
            [-0.25, 1.99, -0.25],
            [0.25, 1.99, -0.25],
            [0.25, 1.99, 0.25],
        ),
        MaterialData {
            emission: Vector3f::new(17.0, 12.0, 4.0),
            color: Vector3f::new(0.78, 0.78, 0.78),
            roughness: 1.0,
            ..MaterialData::default()
        },
    );

    scene
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::from_args();

    let shader: ShaderType = cli.shader.parse()?;
    let params = RenderParams {
        camera: cli.camera,
        resolution: cli.resolution,
        shader,
        samples: cli.samples,
        bounces: cli.bounces,
        noparallel: cli.noparallel,
        exposure: cli.exposure,
        filmic: cli.filmic,
        ..RenderParams::default()
    };

    let mut scene = make_cornellbox();
    validate_params(&scene, &params)?;

    info!("tesselating surfaces");
    tesselate_surfaces(&mut scene);

    info!("building bvh");
    let bvh = make_bvh(&scene, &params);

    info!("initializing lights");
    let lights = make_lights(&scene);

    let mut state = make_state(&scene, &params);
    println!(
        "rendering {}x{} with {} samples",
        state.width, state.height, params.samples
    );
    let mut progress = ProgressBar::new(params.samples as u64);
    for _ in 0..params.samples {
        render_samples(&mut state, &scene, &bvh, &lights, &params);
        progress.inc();
    }
    progress.finish_print("render done");

    let image = get_render(&state);
    let display = tonemap_image(&image, params.exposure, params.filmic);
    write_png(&cli.output, &display)
        .with_context(|| format!("saving image to {:?}", cli.output))?;
    println!("saved {:?}", cli.output);
    Ok(())
}
