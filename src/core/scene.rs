//! Scene data model (cameras, shapes, instances, materials, textures,
//! environments, subdivision descriptions) and the evaluators that
//! reconstruct positions, normals, texture coordinates, material points and
//! environment radiance at an intersection.
//!
//! The scene is a set of plain index-addressed arrays, immutable during
//! rendering; instances reference shapes and materials by index.

// lumen
use crate::core::camera::CameraData;
use crate::core::geometry::{
    frame_inverse, interpolate_line, interpolate_quad, interpolate_triangle, line_tangent,
    quad_normal, transform_direction, transform_point, triangle_normal, triangle_tangents_fromuv,
    vec3_cross, vec3_dot, vec3_normalize, vec3_orthonormalize, Frame3f, Vector2f, Vector3f,
    Vector4f,
};
use crate::core::lumen::{clamp_t, Float, PI};
use crate::core::medium::color_to_density;
use crate::core::texture::{eval_texture, TextureData};

// shapes

/// Indexed shape: one of the element arrays is non-empty. Vertex data is
/// stored in parallel arrays; normals, texcoords, colors and radii are
/// optional.
#[derive(Debug, Default, Clone)]
pub struct ShapeData {
    pub points: Vec<usize>,
    pub lines: Vec<[usize; 2]>,
    pub triangles: Vec<[usize; 3]>,
    pub quads: Vec<[usize; 4]>,
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub texcoords: Vec<Vector2f>,
    pub colors: Vec<Vector4f>,
    pub radius: Vec<Float>,
}

impl ShapeData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.lines.is_empty()
            && self.triangles.is_empty()
            && self.quads.is_empty()
    }
}

/// Area of one triangle element of a shape.
pub fn triangle_area_of(shape: &ShapeData, element: usize) -> Float {
    let t = shape.triangles[element];
    crate::core::geometry::triangle_area(
        &shape.positions[t[0]],
        &shape.positions[t[1]],
        &shape.positions[t[2]],
    )
}

/// Area of one quad element of a shape.
pub fn quad_area_of(shape: &ShapeData, element: usize) -> Float {
    let q = shape.quads[element];
    crate::core::geometry::quad_area(
        &shape.positions[q[0]],
        &shape.positions[q[1]],
        &shape.positions[q[2]],
        &shape.positions[q[3]],
    )
}

// materials

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum MaterialType {
    #[default]
    Matte,
    Glossy,
    Reflective,
    Transparent,
    Refractive,
    Subsurface,
    Gltfpbr,
    Volumetric,
}

/// Authored material. Fields not used by the tagged type keep their inert
/// defaults. Roughness is perceptual here; it is squared when the material
/// point is evaluated.
#[derive(Debug, Clone)]
pub struct MaterialData {
    pub material_type: MaterialType,
    pub emission: Vector3f,
    pub color: Vector3f,
    pub roughness: Float,
    pub metallic: Float,
    pub ior: Float,
    pub opacity: Float,
    pub scattering: Vector3f,
    pub scanisotropy: Float,
    pub trdepth: Float,
    pub emission_tex: Option<usize>,
    pub color_tex: Option<usize>,
    pub roughness_tex: Option<usize>,
    pub scattering_tex: Option<usize>,
    pub normal_tex: Option<usize>,
}

impl Default for MaterialData {
    fn default() -> Self {
        MaterialData {
            material_type: MaterialType::Matte,
            emission: Vector3f::default(),
            color: Vector3f::default(),
            roughness: 0.0,
            metallic: 0.0,
            ior: 1.5,
            opacity: 1.0,
            scattering: Vector3f::default(),
            scanisotropy: 0.0,
            trdepth: 0.01,
            emission_tex: None,
            color_tex: None,
            roughness_tex: None,
            scattering_tex: None,
            normal_tex: None,
        }
    }
}

/// Fully evaluated material at a shading point: all textures applied,
/// roughness squared, extinction derived.
#[derive(Debug, Clone)]
pub struct MaterialPoint {
    pub material_type: MaterialType,
    pub emission: Vector3f,
    pub color: Vector3f,
    pub opacity: Float,
    pub roughness: Float,
    pub metallic: Float,
    pub ior: Float,
    pub density: Vector3f,
    pub scattering: Vector3f,
    pub scanisotropy: Float,
    pub trdepth: Float,
}

impl Default for MaterialPoint {
    fn default() -> Self {
        MaterialPoint {
            material_type: MaterialType::Matte,
            emission: Vector3f::default(),
            color: Vector3f::default(),
            opacity: 1.0,
            roughness: 0.0,
            metallic: 0.0,
            ior: 1.0,
            density: Vector3f::default(),
            scattering: Vector3f::default(),
            scanisotropy: 0.0,
            trdepth: 0.01,
        }
    }
}

/// Perceptual roughness squared below this is collapsed to a delta lobe.
pub const MIN_ROUGHNESS: Float = 0.03 * 0.03;

// instances and environments

/// Rigid placement of a shape with a material; the unit of scene-level
/// BVH leaves.
#[derive(Debug, Clone)]
pub struct InstanceData {
    pub frame: Frame3f,
    pub shape: usize,
    pub material: usize,
}

#[derive(Debug, Clone)]
pub struct EnvironmentData {
    pub frame: Frame3f,
    pub emission: Vector3f,
    pub emission_tex: Option<usize>,
}

/// Face-varying subdivision surface description; tesselated into the
/// target shape before rendering.
#[derive(Debug, Default, Clone)]
pub struct SubdivData {
    pub quadspos: Vec<[usize; 4]>,
    pub quadsnorm: Vec<[usize; 4]>,
    pub quadstexcoord: Vec<[usize; 4]>,
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub texcoords: Vec<Vector2f>,
    pub subdivisions: usize,
    pub smooth: bool,
    pub displacement: Float,
    pub displacement_tex: Option<usize>,
    pub shape: usize,
}

#[derive(Debug, Default, Clone)]
pub struct SceneData {
    pub cameras: Vec<CameraData>,
    pub instances: Vec<InstanceData>,
    pub environments: Vec<EnvironmentData>,
    pub shapes: Vec<ShapeData>,
    pub textures: Vec<TextureData>,
    pub materials: Vec<MaterialData>,
    pub subdivs: Vec<SubdivData>,
}

fn scene_texture<'a>(scene: &'a SceneData, handle: Option<usize>) -> Option<&'a TextureData> {
    handle.map(|h| &scene.textures[h])
}

fn eval_scene_texture(
    scene: &SceneData,
    handle: Option<usize>,
    uv: &Vector2f,
    as_linear: bool,
) -> Vector4f {
    match scene_texture(scene, handle) {
        Some(texture) => eval_texture(texture, uv, as_linear),
        None => Vector4f::new(1.0, 1.0, 1.0, 1.0),
    }
}

// position / normal / texcoord evaluation

/// Interpolated position of a shape element, in world space.
pub fn eval_position(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
) -> Vector3f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    let local: Vector3f = if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        interpolate_triangle(
            shape.positions[t[0]],
            shape.positions[t[1]],
            shape.positions[t[2]],
            uv,
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        interpolate_quad(
            shape.positions[q[0]],
            shape.positions[q[1]],
            shape.positions[q[2]],
            shape.positions[q[3]],
            uv,
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        interpolate_line(shape.positions[l[0]], shape.positions[l[1]], uv.x)
    } else {
        shape.positions[shape.points[element]]
    };
    transform_point(&instance.frame, &local)
}

/// Per-element geometric normal (tangent for lines), in world space.
pub fn eval_element_normal(scene: &SceneData, instance: &InstanceData, element: usize) -> Vector3f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    let local: Vector3f = if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        triangle_normal(
            &shape.positions[t[0]],
            &shape.positions[t[1]],
            &shape.positions[t[2]],
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        quad_normal(
            &shape.positions[q[0]],
            &shape.positions[q[1]],
            &shape.positions[q[2]],
            &shape.positions[q[3]],
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        line_tangent(&shape.positions[l[0]], &shape.positions[l[1]])
    } else {
        Vector3f::new(0.0, 0.0, 1.0)
    };
    transform_direction(&instance.frame, &local)
}

/// Interpolated vertex normal if present, geometric normal otherwise.
pub fn eval_normal(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
) -> Vector3f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    if shape.normals.is_empty() {
        return eval_element_normal(scene, instance, element);
    }
    let local: Vector3f = if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        vec3_normalize(&interpolate_triangle(
            shape.normals[t[0]],
            shape.normals[t[1]],
            shape.normals[t[2]],
            uv,
        ))
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        vec3_normalize(&interpolate_quad(
            shape.normals[q[0]],
            shape.normals[q[1]],
            shape.normals[q[2]],
            shape.normals[q[3]],
            uv,
        ))
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        vec3_normalize(&interpolate_line(
            shape.normals[l[0]],
            shape.normals[l[1]],
            uv.x,
        ))
    } else {
        vec3_normalize(&shape.normals[shape.points[element]])
    };
    transform_direction(&instance.frame, &local)
}

/// Interpolated texture coordinates; the element uv when the shape
/// carries none.
pub fn eval_texcoord(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
) -> Vector2f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    if shape.texcoords.is_empty() {
        return *uv;
    }
    if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        interpolate_triangle(
            shape.texcoords[t[0]],
            shape.texcoords[t[1]],
            shape.texcoords[t[2]],
            uv,
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        interpolate_quad(
            shape.texcoords[q[0]],
            shape.texcoords[q[1]],
            shape.texcoords[q[2]],
            shape.texcoords[q[3]],
            uv,
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        interpolate_line(shape.texcoords[l[0]], shape.texcoords[l[1]], uv.x)
    } else {
        shape.texcoords[shape.points[element]]
    }
}

/// Interpolated vertex color; white when the shape has none.
pub fn eval_color(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
) -> Vector4f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    if shape.colors.is_empty() {
        return Vector4f::new(1.0, 1.0, 1.0, 1.0);
    }
    if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        interpolate_triangle(
            shape.colors[t[0]],
            shape.colors[t[1]],
            shape.colors[t[2]],
            uv,
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        interpolate_quad(
            shape.colors[q[0]],
            shape.colors[q[1]],
            shape.colors[q[2]],
            shape.colors[q[3]],
            uv,
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        interpolate_line(shape.colors[l[0]], shape.colors[l[1]], uv.x)
    } else {
        shape.colors[shape.points[element]]
    }
}

// shading geometry

/// uv-derived tangent and bitangent of a triangle/quad element, in world
/// space; used to anchor normal maps.
fn eval_element_tangents(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
) -> (Vector3f, Vector3f) {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    let default_uvs = [
        Vector2f::new(0.0, 0.0),
        Vector2f::new(1.0, 0.0),
        Vector2f::new(0.0, 1.0),
    ];
    let (tu, tv) = if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        let uvs: [Vector2f; 3] = if shape.texcoords.is_empty() {
            default_uvs
        } else {
            [
                shape.texcoords[t[0]],
                shape.texcoords[t[1]],
                shape.texcoords[t[2]],
            ]
        };
        triangle_tangents_fromuv(
            &shape.positions[t[0]],
            &shape.positions[t[1]],
            &shape.positions[t[2]],
            &uvs[0],
            &uvs[1],
            &uvs[2],
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        let uvs: [Vector2f; 3] = if shape.texcoords.is_empty() {
            default_uvs
        } else {
            [
                shape.texcoords[q[0]],
                shape.texcoords[q[1]],
                shape.texcoords[q[3]],
            ]
        };
        triangle_tangents_fromuv(
            &shape.positions[q[0]],
            &shape.positions[q[1]],
            &shape.positions[q[3]],
            &uvs[0],
            &uvs[1],
            &uvs[2],
        )
    } else {
        return (Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
    };
    (
        transform_direction(&instance.frame, &tu),
        transform_direction(&instance.frame, &tv),
    )
}

/// Perturb the interpolated normal by a tangent-space normal map.
fn eval_normalmap(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
    normal: &Vector3f,
) -> Vector3f {
    let material: &MaterialData = &scene.materials[instance.material];
    let shape: &ShapeData = &scene.shapes[instance.shape];
    if material.normal_tex.is_none() || (shape.triangles.is_empty() && shape.quads.is_empty()) {
        return *normal;
    }
    let texcoord: Vector2f = eval_texcoord(scene, instance, element, uv);
    let texel: Vector4f = eval_scene_texture(scene, material.normal_tex, &texcoord, false);
    let mut normalmap = Vector3f::new(texel.x, texel.y, texel.z) * 2.0 - Vector3f::splat(1.0);
    let (tu, tv) = eval_element_tangents(scene, instance, element);
    let mut frame = Frame3f {
        x: tu,
        y: tv,
        z: *normal,
        o: Vector3f::default(),
    };
    frame.x = vec3_orthonormalize(&frame.x, &frame.z);
    frame.y = vec3_normalize(&vec3_cross(&frame.z, &frame.x));
    let flip_v: bool = vec3_dot(&frame.y, &tv) < 0.0;
    normalmap.y *= if flip_v { 1.0 } else { -1.0 };
    transform_direction(&frame, &normalmap)
}

/// Shading position of an intersection.
pub fn eval_shading_position(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
    _outgoing: &Vector3f,
) -> Vector3f {
    eval_position(scene, instance, element, uv)
}

/// Shading normal: interpolated, normal-mapped, and flipped against the
/// outgoing direction except for refractive boundaries which keep their
/// geometric orientation.
pub fn eval_shading_normal(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
    outgoing: &Vector3f,
) -> Vector3f {
    let shape: &ShapeData = &scene.shapes[instance.shape];
    let material: &MaterialData = &scene.materials[instance.material];
    if !shape.triangles.is_empty() || !shape.quads.is_empty() {
        let normal: Vector3f = eval_normal(scene, instance, element, uv);
        let normal: Vector3f = if material.normal_tex.is_some() {
            eval_normalmap(scene, instance, element, uv, &normal)
        } else {
            normal
        };
        if material.material_type == MaterialType::Refractive {
            return normal;
        }
        if vec3_dot(&normal, outgoing) >= 0.0 {
            normal
        } else {
            -normal
        }
    } else if !shape.lines.is_empty() {
        // shade lines against the tangent
        let tangent: Vector3f = eval_normal(scene, instance, element, uv);
        vec3_orthonormalize(outgoing, &tangent)
    } else {
        *outgoing
    }
}

// material evaluation

/// Evaluate the material at an intersection, applying all texture
/// modulations and deriving the volumetric extinction.
pub fn eval_material(
    scene: &SceneData,
    instance: &InstanceData,
    element: usize,
    uv: &Vector2f,
) -> MaterialPoint {
    let material: &MaterialData = &scene.materials[instance.material];
    let texcoord: Vector2f = eval_texcoord(scene, instance, element, uv);
    let color_shp: Vector4f = eval_color(scene, instance, element, uv);
    let emission_tex: Vector4f = eval_scene_texture(scene, material.emission_tex, &texcoord, true);
    let color_tex: Vector4f = eval_scene_texture(scene, material.color_tex, &texcoord, true);
    let roughness_tex: Vector4f =
        eval_scene_texture(scene, material.roughness_tex, &texcoord, false);
    let scattering_tex: Vector4f =
        eval_scene_texture(scene, material.scattering_tex, &texcoord, true);

    let mut point = MaterialPoint {
        material_type: material.material_type,
        emission: material.emission * emission_tex.xyz(),
        color: material.color * color_tex.xyz() * color_shp.xyz(),
        opacity: material.opacity * color_tex.w * color_shp.w,
        metallic: material.metallic * roughness_tex.z,
        roughness: material.roughness * roughness_tex.y,
        ior: material.ior,
        scattering: material.scattering * scattering_tex.xyz(),
        scanisotropy: material.scanisotropy,
        trdepth: material.trdepth,
        density: Vector3f::default(),
    };
    // perceptual roughness is squared once here
    point.roughness = point.roughness * point.roughness;

    if matches!(
        material.material_type,
        MaterialType::Refractive | MaterialType::Volumetric | MaterialType::Subsurface
    ) {
        point.density = color_to_density(&point.color, point.trdepth);
    }

    match point.material_type {
        MaterialType::Matte | MaterialType::Gltfpbr | MaterialType::Glossy => {
            point.roughness = clamp_t(point.roughness, MIN_ROUGHNESS, 1.0);
        }
        MaterialType::Volumetric => {
            point.roughness = 0.0;
        }
        _ => {
            if point.roughness < MIN_ROUGHNESS {
                point.roughness = 0.0;
            }
        }
    }

    point
}

/// Whether crossing this instance's surface enters or leaves a medium.
pub fn is_volumetric_instance(scene: &SceneData, instance: &InstanceData) -> bool {
    matches!(
        scene.materials[instance.material].material_type,
        MaterialType::Refractive | MaterialType::Volumetric | MaterialType::Subsurface
    )
}

// emission and environments

/// Emitted radiance of a material point toward `outgoing`; emitters are
/// one-sided.
pub fn eval_emission(material: &MaterialPoint, normal: &Vector3f, outgoing: &Vector3f) -> Vector3f {
    if vec3_dot(normal, outgoing) >= 0.0 {
        material.emission
    } else {
        Vector3f::default()
    }
}

/// Equirectangular lookup of one environment for a world direction.
pub fn eval_environment_single(
    scene: &SceneData,
    environment: &EnvironmentData,
    direction: &Vector3f,
) -> Vector3f {
    let wl: Vector3f = transform_direction(&frame_inverse(&environment.frame, false), direction);
    let mut texcoord = Vector2f::new(
        wl.z.atan2(wl.x) / (2.0 * PI),
        clamp_t(wl.y, -1.0, 1.0).acos() / PI,
    );
    if texcoord.x < 0.0 {
        texcoord.x += 1.0;
    }
    environment.emission
        * eval_scene_texture(scene, environment.emission_tex, &texcoord, true).xyz()
}

/// Radiance arriving from all environments along an escaped ray.
pub fn eval_environment(scene: &SceneData, direction: &Vector3f) -> Vector3f {
    let mut emission = Vector3f::default();
    for environment in &scene.environments {
        emission += eval_environment_single(scene, environment, direction);
    }
    emission
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::lookat_frame;

    fn single_triangle_scene() -> SceneData {
        let shape = ShapeData {
            triangles: vec![[0, 1, 2]],
            positions: vec![
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(1.0, 0.0, 0.0),
                Vector3f::new(0.0, 1.0, 0.0),
            ],
            ..ShapeData::default()
        };
        SceneData {
            shapes: vec![shape],
            materials: vec![MaterialData {
                color: Vector3f::splat(0.5),
                roughness: 0.5,
                ..MaterialData::default()
            }],
            instances: vec![InstanceData {
                frame: Frame3f {
                    o: Vector3f::new(0.0, 0.0, 2.0),
                    ..Frame3f::default()
                },
                shape: 0,
                material: 0,
            }],
            ..SceneData::default()
        }
    }

    #[test]
    fn test_eval_position_applies_frame() {
        let scene = single_triangle_scene();
        let p = eval_position(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(0.0, 0.0),
        );
        assert_eq!(p, Vector3f::new(0.0, 0.0, 2.0));
        let p = eval_position(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(1.0, 0.0),
        );
        assert_eq!(p, Vector3f::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_shading_normal_flips_toward_outgoing() {
        let scene = single_triangle_scene();
        let outgoing = Vector3f::new(0.0, 0.0, -1.0);
        let n = eval_shading_normal(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(0.2, 0.2),
            &outgoing,
        );
        assert!(vec3_dot(&n, &outgoing) > 0.0);
    }

    #[test]
    fn test_material_point_roughness_squared_and_clamped() {
        let mut scene = single_triangle_scene();
        scene.materials[0].roughness = 0.5;
        let point = eval_material(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(0.3, 0.3),
        );
        assert!((point.roughness - 0.25).abs() < 1.0e-6);
        // matte roughness never collapses to a delta
        scene.materials[0].roughness = 0.0;
        let point = eval_material(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(0.3, 0.3),
        );
        assert!(point.roughness >= MIN_ROUGHNESS);
    }

    #[test]
    fn test_volumetric_density_from_color() {
        let mut scene = single_triangle_scene();
        scene.materials[0].material_type = MaterialType::Refractive;
        scene.materials[0].color = Vector3f::splat(0.5);
        scene.materials[0].trdepth = 0.1;
        let point = eval_material(
            &scene,
            &scene.instances[0],
            0,
            &Vector2f::new(0.3, 0.3),
        );
        assert!(point.density.x > 0.0);
    }

    #[test]
    fn test_eval_environment_constant() {
        let scene = SceneData {
            environments: vec![EnvironmentData {
                frame: Frame3f::default(),
                emission: Vector3f::new(0.5, 0.25, 0.125),
                emission_tex: None,
            }],
            ..SceneData::default()
        };
        let e = eval_environment(&scene, &Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(e, Vector3f::new(0.5, 0.25, 0.125));
    }

    #[test]
    fn test_emission_one_sided() {
        let point = MaterialPoint {
            emission: Vector3f::splat(2.0),
            ..MaterialPoint::default()
        };
        let n = Vector3f::new(0.0, 0.0, 1.0);
        assert_eq!(
            eval_emission(&point, &n, &Vector3f::new(0.0, 0.0, 1.0)),
            Vector3f::splat(2.0)
        );
        assert_eq!(
            eval_emission(&point, &n, &Vector3f::new(0.0, 0.0, -1.0)),
            Vector3f::default()
        );
    }

    #[test]
    fn test_lookat_camera_scene_round_trip() {
        // instances with a lookat frame keep normals unit length
        let mut scene = single_triangle_scene();
        scene.instances[0].frame = lookat_frame(
            &Vector3f::new(2.0, 1.0, 3.0),
            &Vector3f::default(),
            &Vector3f::new(0.0, 1.0, 0.0),
        );
        let n = eval_element_normal(&scene, &scene.instances[0], 0);
        assert!((vec3_dot(&n, &n) - 1.0).abs() < 1.0e-5);
    }
}
