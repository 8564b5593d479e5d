//! End-to-end render scenarios exercised against small analytic scenes.

use lumen::core::camera::CameraData;
use lumen::core::geometry::{Frame3f, Vector3f, Vector4f};
use lumen::core::integrator::{
    get_render, make_bvh, make_state, render_image, render_samples, RenderParams, ShaderType,
};
use lumen::core::light::make_lights;
use lumen::core::lumen::Float;
use lumen::core::scene::{
    EnvironmentData, InstanceData, MaterialData, MaterialType, SceneData, ShapeData,
};

fn constant_environment(emission: Vector3f) -> EnvironmentData {
    EnvironmentData {
        frame: Frame3f::default(),
        emission,
        emission_tex: None,
    }
}

fn unit_quad_facing_z() -> ShapeData {
    ShapeData {
        quads: vec![[0, 1, 2, 3]],
        positions: vec![
            Vector3f::new(-0.5, -0.5, 0.0),
            Vector3f::new(0.5, -0.5, 0.0),
            Vector3f::new(0.5, 0.5, 0.0),
            Vector3f::new(-0.5, 0.5, 0.0),
        ],
        ..ShapeData::default()
    }
}

fn big_quad_facing_z(half: Float, z: Float) -> ShapeData {
    ShapeData {
        quads: vec![[0, 1, 2, 3]],
        positions: vec![
            Vector3f::new(-half, -half, z),
            Vector3f::new(half, -half, z),
            Vector3f::new(half, half, z),
            Vector3f::new(-half, half, z),
        ],
        ..ShapeData::default()
    }
}

fn camera_at(origin: Vector3f) -> CameraData {
    CameraData {
        frame: Frame3f {
            o: origin,
            ..Frame3f::default()
        },
        aspect: 1.0,
        ..CameraData::default()
    }
}

fn center_pixel(image: &lumen::core::film::ColorImage) -> Vector4f {
    image.pixels[(image.height / 2) * image.width + image.width / 2]
}

#[test]
fn test_empty_scene_constant_environment() {
    // every ray escapes into the constant environment; alpha stays zero
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::default())],
        environments: vec![constant_environment(Vector3f::splat(1.0))],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 4,
        samples: 1,
        bounces: 1,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    assert_eq!(image.width, 4);
    assert_eq!(image.height, 4);
    for pixel in &image.pixels {
        assert!((pixel.x - 1.0).abs() < 1.0e-6);
        assert!((pixel.y - 1.0).abs() < 1.0e-6);
        assert!((pixel.z - 1.0).abs() < 1.0e-6);
        assert!(pixel.w.abs() < 1.0e-6);
    }
}

#[test]
fn test_lambertian_quad_under_uniform_sky() {
    // a white diffuse quad under a 0.5 environment reflects about 0.5 at
    // the centre; the primary hit sets alpha to one
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![unit_quad_facing_z()],
        materials: vec![MaterialData {
            color: Vector3f::splat(1.0),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        environments: vec![constant_environment(Vector3f::splat(0.5))],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 16,
        samples: 1024,
        bounces: 4,
        shader: ShaderType::Pathtrace,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    assert!(center.x > 0.4 && center.x < 0.6, "center {:?}", center);
    assert!(center.y > 0.4 && center.y < 0.6);
    assert!(center.z > 0.4 && center.z < 0.6);
    assert!((center.w - 1.0).abs() < 1.0e-6);
}

#[test]
fn test_mirror_reflects_emitter() {
    // camera -> mirror at z=-1 -> reflected to +z -> emissive quad at z=2;
    // the mirror silhouette carries the emitter radiance scaled by the
    // conductor Fresnel
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 1.0))],
        shapes: vec![big_quad_facing_z(4.0, -1.0), big_quad_facing_z(4.0, 2.0)],
        materials: vec![
            MaterialData {
                material_type: MaterialType::Reflective,
                color: Vector3f::splat(0.9),
                roughness: 0.0,
                ..MaterialData::default()
            },
            MaterialData {
                emission: Vector3f::splat(4.0),
                color: Vector3f::splat(1.0),
                roughness: 1.0,
                ..MaterialData::default()
            },
        ],
        instances: vec![
            InstanceData {
                frame: Frame3f::default(),
                shape: 0,
                material: 0,
            },
            InstanceData {
                frame: Frame3f::default(),
                shape: 1,
                material: 1,
            },
        ],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 8,
        samples: 16,
        bounces: 4,
        shader: ShaderType::Pathtrace,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    // mirror hit on the primary ray
    assert!((center.w - 1.0).abs() < 1.0e-6);
    // reflected emitter, dimmed by the 0.9 mirror
    assert!(center.x > 2.0 && center.x < 4.0, "center {:?}", center);
}

#[test]
fn test_absorbing_slab_transmittance() {
    // a purely absorbing slab in front of a white environment transmits
    // exp(-sigma_t * thickness) on average
    let thickness: Float = 0.4;
    let mut front = big_quad_facing_z(20.0, 0.0);
    // flip the front so both quads bound the medium between z=-0.4 and 0
    front.positions.reverse();
    let back = big_quad_facing_z(20.0, -thickness);
    // extinction of one per unit: color = exp(-1) with unit trdepth
    let volumetric = MaterialData {
        material_type: MaterialType::Volumetric,
        color: Vector3f::splat((-1.0 as Float).exp()),
        trdepth: 1.0,
        scattering: Vector3f::default(),
        roughness: 0.0,
        ..MaterialData::default()
    };
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![front, back],
        materials: vec![volumetric],
        instances: vec![
            InstanceData {
                frame: Frame3f::default(),
                shape: 0,
                material: 0,
            },
            InstanceData {
                frame: Frame3f::default(),
                shape: 1,
                material: 0,
            },
        ],
        environments: vec![constant_environment(Vector3f::splat(1.0))],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 4,
        samples: 4096,
        bounces: 8,
        shader: ShaderType::Volpathtrace,
        noparallel: true,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    let expected: Float = (-thickness).exp();
    assert!(
        (center.x - expected).abs() < 0.05,
        "transmittance {} expected {}",
        center.x,
        expected
    );
}

#[test]
fn test_bounces_zero_returns_primary_emission() {
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![unit_quad_facing_z()],
        materials: vec![MaterialData {
            emission: Vector3f::splat(3.0),
            color: Vector3f::splat(1.0),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 8,
        samples: 4,
        bounces: 0,
        shader: ShaderType::Pathtrace,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    assert!((center.x - 3.0).abs() < 1.0e-5);
    assert!((center.w - 1.0).abs() < 1.0e-6);
}

#[test]
fn test_no_lights_no_environment_is_black() {
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![unit_quad_facing_z()],
        materials: vec![MaterialData {
            color: Vector3f::splat(0.7),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 8,
        samples: 16,
        bounces: 4,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    for pixel in &image.pixels {
        assert!(pixel.x.abs() < 1.0e-6 && pixel.y.abs() < 1.0e-6 && pixel.z.abs() < 1.0e-6);
    }
}

#[test]
fn test_opacity_zero_everywhere_escapes() {
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![big_quad_facing_z(10.0, 0.0)],
        materials: vec![MaterialData {
            color: Vector3f::splat(0.7),
            roughness: 1.0,
            opacity: 0.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        environments: vec![constant_environment(Vector3f::splat(0.25))],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 4,
        samples: 16,
        bounces: 4,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    for pixel in &image.pixels {
        assert!((pixel.x - 0.25).abs() < 1.0e-5);
        assert!(pixel.w.abs() < 1.0e-6, "alpha {:?}", pixel.w);
    }
}

#[test]
fn test_alpha_is_hit_fraction() {
    // half the image sees the quad, half the environment
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![ShapeData {
            quads: vec![[0, 1, 2, 3]],
            positions: vec![
                Vector3f::new(-10.0, -10.0, 0.0),
                Vector3f::new(0.0, -10.0, 0.0),
                Vector3f::new(0.0, 10.0, 0.0),
                Vector3f::new(-10.0, 10.0, 0.0),
            ],
            ..ShapeData::default()
        }],
        materials: vec![MaterialData {
            color: Vector3f::splat(0.7),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        environments: vec![constant_environment(Vector3f::splat(1.0))],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 16,
        samples: 8,
        bounces: 2,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let mut state = make_state(&scene, &params);
    for _ in 0..params.samples {
        render_samples(&mut state, &scene, &bvh, &lights, &params);
    }
    let image = get_render(&state);
    for pixel in &image.pixels {
        assert!(pixel.w >= 0.0 && pixel.w <= 1.0);
    }
    let mean_alpha: Float =
        image.pixels.iter().map(|p| p.w).sum::<Float>() / image.pixels.len() as Float;
    assert!(mean_alpha > 0.2 && mean_alpha < 0.8, "alpha {}", mean_alpha);
}

#[test]
fn test_naive_and_mis_agree() {
    // both estimators converge to the same radiance on a diffuse quad
    // under an emissive environment
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![big_quad_facing_z(5.0, 0.0)],
        materials: vec![MaterialData {
            color: Vector3f::splat(0.6),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        environments: vec![constant_environment(Vector3f::splat(0.5))],
        ..SceneData::default()
    };
    let params_mis = RenderParams {
        resolution: 8,
        samples: 2048,
        bounces: 3,
        shader: ShaderType::Pathtrace,
        ..RenderParams::default()
    };
    let params_naive = RenderParams {
        shader: ShaderType::Naive,
        ..params_mis.clone()
    };
    let bvh = make_bvh(&scene, &params_mis);
    let lights = make_lights(&scene);
    let mis = center_pixel(&render_image(&scene, &bvh, &lights, &params_mis));
    let naive = center_pixel(&render_image(&scene, &bvh, &lights, &params_naive));
    assert!(
        (mis.x - naive.x).abs() < 0.05,
        "mis {} naive {}",
        mis.x,
        naive.x
    );
}

#[test]
fn test_debug_shaders() {
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![unit_quad_facing_z()],
        materials: vec![MaterialData {
            color: Vector3f::new(0.2, 0.4, 0.8),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 8,
        samples: 1,
        bounces: 1,
        shader: ShaderType::Color,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    assert!((center.x - 0.2).abs() < 1.0e-5);
    assert!((center.z - 0.8).abs() < 1.0e-5);
    assert!((center.w - 1.0).abs() < 1.0e-6);

    let params = RenderParams {
        shader: ShaderType::Normal,
        ..params
    };
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    // quad faces +z and the camera looks down -z
    assert!((center.z - 1.0).abs() < 1.0e-4);
}

#[test]
fn test_eyelight_sees_geometry_without_lights() {
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![unit_quad_facing_z()],
        materials: vec![MaterialData {
            color: Vector3f::splat(0.8),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![InstanceData {
            frame: Frame3f::default(),
            shape: 0,
            material: 0,
        }],
        ..SceneData::default()
    };
    let params = RenderParams {
        resolution: 8,
        samples: 4,
        bounces: 2,
        shader: ShaderType::Eyelight,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    // pi * eval_bsdfcos(wo, wo) = albedo * cos ~ 0.8 head-on
    assert!(center.x > 0.5 && center.x < 1.0, "center {:?}", center);
}

#[test]
fn test_russian_roulette_unbiased() {
    // a long-bounce render matches the analytic multi-bounce reflectance
    // of a white furnace: with albedo a under environment e the limit is
    // e (perfect white furnace) up to truncation at the bounce cap
    // two facing white plates bounce paths several times before they
    // escape sideways into the white environment
    let scene = SceneData {
        cameras: vec![camera_at(Vector3f::new(0.0, 0.0, 2.0))],
        shapes: vec![big_quad_facing_z(3.0, 0.0), big_quad_facing_z(3.0, 4.0)],
        materials: vec![MaterialData {
            color: Vector3f::splat(1.0),
            roughness: 1.0,
            ..MaterialData::default()
        }],
        instances: vec![
            InstanceData {
                frame: Frame3f::default(),
                shape: 0,
                material: 0,
            },
            InstanceData {
                frame: Frame3f::default(),
                shape: 1,
                material: 0,
            },
        ],
        environments: vec![constant_environment(Vector3f::splat(1.0))],
        ..SceneData::default()
    };
    // deep bounce budget so roulette actually engages past bounce 4
    let params = RenderParams {
        resolution: 4,
        samples: 4096,
        bounces: 32,
        shader: ShaderType::Naive,
        noparallel: true,
        ..RenderParams::default()
    };
    let bvh = make_bvh(&scene, &params);
    let lights = make_lights(&scene);
    let image = render_image(&scene, &bvh, &lights, &params);
    let center = center_pixel(&image);
    // white furnace: every pixel converges to the environment radiance
    assert!((center.x - 1.0).abs() < 0.05, "center {:?}", center);
}
