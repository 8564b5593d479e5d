//! Core building blocks: math, sampling, scene model, materials, lights,
//! media, film and the render driver.

pub mod camera;
pub mod film;
pub mod geometry;
pub mod integrator;
pub mod light;
pub mod lumen;
pub mod medium;
pub mod microfacet;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod texture;
