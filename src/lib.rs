//! # lumen
//!
//! A physically based offline renderer: a Monte-Carlo path tracer over
//! triangle meshes, environment maps, area lights and homogeneous
//! participating media, accelerated by a two-level bounding volume
//! hierarchy, with a Catmull-Clark subdivision tesselator preparing
//! geometry before rendering.
//!
//! The typical offline flow mirrors the `rs_lumen` binary:
//!
//! ```rust
//! use lumen::core::integrator::{make_bvh, make_state, render_samples, get_render, RenderParams};
//! use lumen::core::light::make_lights;
//! use lumen::core::scene::SceneData;
//! use lumen::shapes::catmullclark::tesselate_surfaces;
//!
//! let mut scene = SceneData::default();
//! scene.cameras.push(Default::default());
//! let params = RenderParams { resolution: 16, samples: 2, ..Default::default() };
//! tesselate_surfaces(&mut scene);
//! let bvh = make_bvh(&scene, &params);
//! let lights = make_lights(&scene);
//! let mut state = make_state(&scene, &params);
//! for _ in 0..params.samples {
//!     render_samples(&mut state, &scene, &bvh, &lights, &params);
//! }
//! let image = get_render(&state);
//! assert_eq!(image.width, 16);
//! ```

pub mod accelerators;
pub mod core;
pub mod integrators;
pub mod shapes;
