//! Thin-lens and orthographic camera models.

// lumen
use crate::core::geometry::{
    transform_direction, transform_point, vec3_normalize, Frame3f, Ray3f, Vector2f, Vector3f,
};
use crate::core::lumen::Float;

/// Camera pose and lens description. `film` is the size of the longest
/// film side in meters; the other side follows from `aspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    pub frame: Frame3f,
    pub orthographic: bool,
    pub lens: Float,
    pub film: Float,
    pub aspect: Float,
    pub focus: Float,
    pub aperture: Float,
}

impl Default for CameraData {
    fn default() -> Self {
        CameraData {
            frame: Frame3f::default(),
            orthographic: false,
            lens: 0.050,
            film: 0.036,
            aspect: 1.5,
            focus: 10000.0,
            aperture: 0.0,
        }
    }
}

/// Generate a ray from a camera for `image_uv` in [0,1]^2 and a lens sample
/// `lens_uv`; the camera looks down its frame's -z axis.
pub fn eval_camera(camera: &CameraData, image_uv: &Vector2f, lens_uv: &Vector2f) -> Ray3f {
    let film: Vector2f = if camera.aspect >= 1.0 {
        Vector2f::new(camera.film, camera.film / camera.aspect)
    } else {
        Vector2f::new(camera.film * camera.aspect, camera.film)
    };
    if !camera.orthographic {
        // film point behind the lens, flipped to point through it
        let q = Vector3f::new(
            film.x * (0.5 - image_uv.x),
            film.y * (image_uv.y - 0.5),
            camera.lens,
        );
        let dc: Vector3f = -vec3_normalize(&q);
        // aperture sample
        let e = Vector3f::new(
            lens_uv.x * camera.aperture / 2.0,
            lens_uv.y * camera.aperture / 2.0,
            0.0,
        );
        // focus-plane point of the central direction
        let p: Vector3f = dc * (camera.focus / dc.z.abs());
        let d: Vector3f = vec3_normalize(&(p - e));
        Ray3f::new(
            transform_point(&camera.frame, &e),
            transform_direction(&camera.frame, &d),
        )
    } else {
        let scale: Float = 1.0 / camera.lens;
        let q = Vector3f::new(
            film.x * (0.5 - image_uv.x) * scale,
            film.y * (image_uv.y - 0.5) * scale,
            camera.lens,
        );
        // orthographic rays start on the film plane itself
        let p = Vector3f::new(-q.x, -q.y, -camera.focus);
        let e = Vector3f::new(-q.x, -q.y, 0.0)
            + Vector3f::new(
                lens_uv.x * camera.aperture / 2.0,
                lens_uv.y * camera.aperture / 2.0,
                0.0,
            );
        let d: Vector3f = vec3_normalize(&(p - e));
        Ray3f::new(
            transform_point(&camera.frame, &e),
            transform_direction(&camera.frame, &d),
        )
    }
}
