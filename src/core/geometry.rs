//! Geometric foundation: fixed-width single-precision vectors, orthonormal
//! frames, rays, axis-aligned bounding boxes, and the ray/point tests
//! against the primitive elements (points, lines, triangles, quads).
//!
//! Positions, directions and colors all share the same vector types; the
//! distinction lives in which transform function is applied, not in the
//! type system.

// std
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};
// lumen
use crate::core::lumen::{clamp_t, safe_sqrt, Float, FLT_MAX, RAY_EPS};

// vectors

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector2f {
    pub x: Float,
    pub y: Float,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector4f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub w: Float,
}

impl Vector2f {
    pub fn new(x: Float, y: Float) -> Self {
        Vector2f { x, y }
    }
}

impl Vector3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3f { x, y, z }
    }
    pub fn splat(v: Float) -> Self {
        Vector3f { x: v, y: v, z: v }
    }
}

impl Vector4f {
    pub fn new(x: Float, y: Float, z: Float, w: Float) -> Self {
        Vector4f { x, y, z, w }
    }
    pub fn xyz(&self) -> Vector3f {
        Vector3f {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

macro_rules! impl_binop2 {
    ($trait:ident, $fn:ident, $op:tt) => {
        impl $trait for Vector2f {
            type Output = Vector2f;
            fn $fn(self, rhs: Vector2f) -> Vector2f {
                Vector2f { x: self.x $op rhs.x, y: self.y $op rhs.y }
            }
        }
        impl $trait<Float> for Vector2f {
            type Output = Vector2f;
            fn $fn(self, rhs: Float) -> Vector2f {
                Vector2f { x: self.x $op rhs, y: self.y $op rhs }
            }
        }
    };
}

macro_rules! impl_binop3 {
    ($trait:ident, $fn:ident, $op:tt) => {
        impl $trait for Vector3f {
            type Output = Vector3f;
            fn $fn(self, rhs: Vector3f) -> Vector3f {
                Vector3f {
                    x: self.x $op rhs.x,
                    y: self.y $op rhs.y,
                    z: self.z $op rhs.z,
                }
            }
        }
        impl $trait<Float> for Vector3f {
            type Output = Vector3f;
            fn $fn(self, rhs: Float) -> Vector3f {
                Vector3f { x: self.x $op rhs, y: self.y $op rhs, z: self.z $op rhs }
            }
        }
    };
}

macro_rules! impl_binop4 {
    ($trait:ident, $fn:ident, $op:tt) => {
        impl $trait for Vector4f {
            type Output = Vector4f;
            fn $fn(self, rhs: Vector4f) -> Vector4f {
                Vector4f {
                    x: self.x $op rhs.x,
                    y: self.y $op rhs.y,
                    z: self.z $op rhs.z,
                    w: self.w $op rhs.w,
                }
            }
        }
        impl $trait<Float> for Vector4f {
            type Output = Vector4f;
            fn $fn(self, rhs: Float) -> Vector4f {
                Vector4f {
                    x: self.x $op rhs,
                    y: self.y $op rhs,
                    z: self.z $op rhs,
                    w: self.w $op rhs,
                }
            }
        }
    };
}

impl_binop2!(Add, add, +);
impl_binop2!(Sub, sub, -);
impl_binop2!(Mul, mul, *);
impl_binop2!(Div, div, /);
impl_binop3!(Add, add, +);
impl_binop3!(Sub, sub, -);
impl_binop3!(Mul, mul, *);
impl_binop3!(Div, div, /);
impl_binop4!(Add, add, +);
impl_binop4!(Sub, sub, -);
impl_binop4!(Mul, mul, *);
impl_binop4!(Div, div, /);

impl Mul<Vector3f> for Float {
    type Output = Vector3f;
    fn mul(self, rhs: Vector3f) -> Vector3f {
        rhs * self
    }
}

impl Neg for Vector3f {
    type Output = Vector3f;
    fn neg(self) -> Vector3f {
        Vector3f {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl AddAssign for Vector3f {
    fn add_assign(&mut self, rhs: Vector3f) {
        *self = *self + rhs;
    }
}

impl MulAssign for Vector3f {
    fn mul_assign(&mut self, rhs: Vector3f) {
        *self = *self * rhs;
    }
}

impl MulAssign<Float> for Vector3f {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}

impl AddAssign for Vector4f {
    fn add_assign(&mut self, rhs: Vector4f) {
        *self = *self + rhs;
    }
}

impl DivAssign<Float> for Vector4f {
    fn div_assign(&mut self, rhs: Float) {
        *self = *self / rhs;
    }
}

impl Index<usize> for Vector3f {
    type Output = Float;
    fn index(&self, index: usize) -> &Float {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

pub fn vec3_dot(a: &Vector3f, b: &Vector3f) -> Float {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn vec3_cross(a: &Vector3f, b: &Vector3f) -> Vector3f {
    Vector3f {
        x: a.y * b.z - a.z * b.y,
        y: a.z * b.x - a.x * b.z,
        z: a.x * b.y - a.y * b.x,
    }
}

pub fn vec3_length_squared(v: &Vector3f) -> Float {
    vec3_dot(v, v)
}

pub fn vec3_length(v: &Vector3f) -> Float {
    vec3_dot(v, v).sqrt()
}

pub fn vec3_normalize(v: &Vector3f) -> Vector3f {
    let l: Float = vec3_length(v);
    if l != 0.0 {
        *v / l
    } else {
        *v
    }
}

pub fn vec3_distance(a: &Vector3f, b: &Vector3f) -> Float {
    vec3_length(&(*a - *b))
}

pub fn vec3_distance_squared(a: &Vector3f, b: &Vector3f) -> Float {
    vec3_length_squared(&(*a - *b))
}

pub fn vec3_max_component(v: &Vector3f) -> Float {
    v.x.max(v.y).max(v.z)
}

pub fn vec3_mean(v: &Vector3f) -> Float {
    (v.x + v.y + v.z) / 3.0
}

pub fn vec3_is_finite(v: &Vector3f) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

pub fn vec4_is_finite(v: &Vector4f) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite() && v.w.is_finite()
}

pub fn vec3_clamp(v: &Vector3f, low: Float, high: Float) -> Vector3f {
    Vector3f {
        x: clamp_t(v.x, low, high),
        y: clamp_t(v.y, low, high),
        z: clamp_t(v.z, low, high),
    }
}

pub fn vec3_exp(v: &Vector3f) -> Vector3f {
    Vector3f {
        x: v.x.exp(),
        y: v.y.exp(),
        z: v.z.exp(),
    }
}

pub fn vec3_log(v: &Vector3f) -> Vector3f {
    Vector3f {
        x: v.x.ln(),
        y: v.y.ln(),
        z: v.z.ln(),
    }
}

pub fn vec3_lerp(a: &Vector3f, b: &Vector3f, t: Float) -> Vector3f {
    *a * (1.0 as Float - t) + *b * t
}

/// Project *a* on the plane orthogonal to *b* and renormalize
/// (Gram-Schmidt step for tangent frames).
pub fn vec3_orthonormalize(a: &Vector3f, b: &Vector3f) -> Vector3f {
    vec3_normalize(&(*a - *b * vec3_dot(a, b)))
}

// frames

/// A 3x4 affine frame: three basis vectors plus an origin. Frames built by
/// the scene loader are orthonormal; non-rigid frames are honoured through
/// the general affine inverse.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame3f {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f,
    pub o: Vector3f,
}

impl Default for Frame3f {
    fn default() -> Self {
        Frame3f {
            x: Vector3f::new(1.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 1.0, 0.0),
            z: Vector3f::new(0.0, 0.0, 1.0),
            o: Vector3f::default(),
        }
    }
}

impl Frame3f {
    pub fn new(x: Vector3f, y: Vector3f, z: Vector3f, o: Vector3f) -> Self {
        Frame3f { x, y, z, o }
    }
}

/// Camera-style frame from an eye point, a target and an up vector.
pub fn lookat_frame(eye: &Vector3f, center: &Vector3f, up: &Vector3f) -> Frame3f {
    let w: Vector3f = vec3_normalize(&(*eye - *center));
    let u: Vector3f = vec3_normalize(&vec3_cross(up, &w));
    let v: Vector3f = vec3_normalize(&vec3_cross(&w, &u));
    Frame3f {
        x: u,
        y: v,
        z: w,
        o: *eye,
    }
}

pub fn transform_point(frame: &Frame3f, p: &Vector3f) -> Vector3f {
    frame.x * p.x + frame.y * p.y + frame.z * p.z + frame.o
}

pub fn transform_vector(frame: &Frame3f, v: &Vector3f) -> Vector3f {
    frame.x * v.x + frame.y * v.y + frame.z * v.z
}

pub fn transform_direction(frame: &Frame3f, d: &Vector3f) -> Vector3f {
    vec3_normalize(&transform_vector(frame, d))
}

/// Transpose-based inverse for orthonormal frames; full adjugate inverse
/// when `non_rigid` is set.
pub fn frame_inverse(frame: &Frame3f, non_rigid: bool) -> Frame3f {
    if non_rigid {
        // invert the 3x3 basis via the adjugate
        let x: Vector3f = frame.x;
        let y: Vector3f = frame.y;
        let z: Vector3f = frame.z;
        let det: Float = vec3_dot(&x, &vec3_cross(&y, &z));
        let idet: Float = if det != 0.0 { 1.0 / det } else { 0.0 };
        let rx: Vector3f = vec3_cross(&y, &z) * idet;
        let ry: Vector3f = vec3_cross(&z, &x) * idet;
        let rz: Vector3f = vec3_cross(&x, &y) * idet;
        // rows of the inverse become the new basis columns
        let minv = Frame3f {
            x: Vector3f::new(rx.x, ry.x, rz.x),
            y: Vector3f::new(rx.y, ry.y, rz.y),
            z: Vector3f::new(rx.z, ry.z, rz.z),
            o: Vector3f::default(),
        };
        let o: Vector3f = transform_vector(&minv, &frame.o);
        Frame3f {
            x: minv.x,
            y: minv.y,
            z: minv.z,
            o: -o,
        }
    } else {
        let minv = Frame3f {
            x: Vector3f::new(frame.x.x, frame.y.x, frame.z.x),
            y: Vector3f::new(frame.x.y, frame.y.y, frame.z.y),
            z: Vector3f::new(frame.x.z, frame.y.z, frame.z.z),
            o: Vector3f::default(),
        };
        let o: Vector3f = transform_vector(&minv, &frame.o);
        Frame3f {
            x: minv.x,
            y: minv.y,
            z: minv.z,
            o: -o,
        }
    }
}

/// Orthonormal basis with z aligned to the given direction.
pub fn basis_fromz(v: &Vector3f) -> Frame3f {
    let z: Vector3f = vec3_normalize(v);
    let sign: Float = if z.z >= 0.0 { 1.0 } else { -1.0 };
    let a: Float = -1.0 / (sign + z.z);
    let b: Float = z.x * z.y * a;
    Frame3f {
        x: Vector3f::new(1.0 + sign * z.x * z.x * a, sign * b, -sign * z.x),
        y: Vector3f::new(b, sign + z.y * z.y * a, -z.y),
        z,
        o: Vector3f::default(),
    }
}

// rays

#[derive(Debug, Copy, Clone)]
pub struct Ray3f {
    pub o: Vector3f,
    pub d: Vector3f,
    pub tmin: Float,
    pub tmax: Float,
}

impl Default for Ray3f {
    fn default() -> Self {
        Ray3f {
            o: Vector3f::default(),
            d: Vector3f::new(0.0, 0.0, 1.0),
            tmin: RAY_EPS,
            tmax: FLT_MAX,
        }
    }
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f) -> Self {
        Ray3f {
            o,
            d,
            tmin: RAY_EPS,
            tmax: FLT_MAX,
        }
    }
}

pub fn ray_point(ray: &Ray3f, t: Float) -> Vector3f {
    ray.o + ray.d * t
}

pub fn transform_ray(frame: &Frame3f, ray: &Ray3f) -> Ray3f {
    Ray3f {
        o: transform_point(frame, &ray.o),
        d: transform_vector(frame, &ray.d),
        tmin: ray.tmin,
        tmax: ray.tmax,
    }
}

// bounding boxes

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3f {
    pub min: Vector3f,
    pub max: Vector3f,
}

impl Default for Bounds3f {
    fn default() -> Self {
        // empty box: any union fixes it up
        Bounds3f {
            min: Vector3f::splat(FLT_MAX),
            max: Vector3f::splat(-FLT_MAX),
        }
    }
}

pub fn bbox_center(b: &Bounds3f) -> Vector3f {
    (b.min + b.max) * 0.5
}

pub fn bbox_diagonal(b: &Bounds3f) -> Vector3f {
    b.max - b.min
}

pub fn bbox_union_point(b: &Bounds3f, p: &Vector3f) -> Bounds3f {
    Bounds3f {
        min: Vector3f::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
        max: Vector3f::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
    }
}

pub fn bbox_union(a: &Bounds3f, b: &Bounds3f) -> Bounds3f {
    Bounds3f {
        min: Vector3f::new(
            a.min.x.min(b.min.x),
            a.min.y.min(b.min.y),
            a.min.z.min(b.min.z),
        ),
        max: Vector3f::new(
            a.max.x.max(b.max.x),
            a.max.y.max(b.max.y),
            a.max.z.max(b.max.z),
        ),
    }
}

pub fn bbox_expand(b: &Bounds3f, amount: Float) -> Bounds3f {
    Bounds3f {
        min: b.min - Vector3f::splat(amount),
        max: b.max + Vector3f::splat(amount),
    }
}

pub fn bbox_contains(b: &Bounds3f, p: &Vector3f) -> bool {
    p.x >= b.min.x
        && p.x <= b.max.x
        && p.y >= b.min.y
        && p.y <= b.max.y
        && p.z >= b.min.z
        && p.z <= b.max.z
}

pub fn bbox_max_extent_axis(b: &Bounds3f) -> usize {
    let d: Vector3f = bbox_diagonal(b);
    if d.x >= d.y && d.x >= d.z {
        0
    } else if d.y >= d.z {
        1
    } else {
        2
    }
}

/// Transform all eight corners and rebound.
pub fn transform_bbox(frame: &Frame3f, b: &Bounds3f) -> Bounds3f {
    let corners: [Vector3f; 8] = [
        Vector3f::new(b.min.x, b.min.y, b.min.z),
        Vector3f::new(b.min.x, b.min.y, b.max.z),
        Vector3f::new(b.min.x, b.max.y, b.min.z),
        Vector3f::new(b.min.x, b.max.y, b.max.z),
        Vector3f::new(b.max.x, b.min.y, b.min.z),
        Vector3f::new(b.max.x, b.min.y, b.max.z),
        Vector3f::new(b.max.x, b.max.y, b.min.z),
        Vector3f::new(b.max.x, b.max.y, b.max.z),
    ];
    let mut result = Bounds3f::default();
    for corner in &corners {
        result = bbox_union_point(&result, &transform_point(frame, corner));
    }
    result
}

/// Slab test with precomputed reciprocal direction. Conservative with
/// respect to rounding: only rejects boxes that are strictly missed.
pub fn intersect_bbox(ray: &Ray3f, ray_dinv: &Vector3f, bbox: &Bounds3f) -> bool {
    let it_min: Vector3f = (bbox.min - ray.o) * *ray_dinv;
    let it_max: Vector3f = (bbox.max - ray.o) * *ray_dinv;
    let tmin = Vector3f::new(
        it_min.x.min(it_max.x),
        it_min.y.min(it_max.y),
        it_min.z.min(it_max.z),
    );
    let tmax = Vector3f::new(
        it_min.x.max(it_max.x),
        it_min.y.max(it_max.y),
        it_min.z.max(it_max.z),
    );
    let t0: Float = vec3_max_component(&tmin).max(ray.tmin);
    let t1: Float = tmax.x.min(tmax.y).min(tmax.z).min(ray.tmax);
    // the 1.00000024 factor compensates the slab rounding error
    t0 <= t1 * 1.000_000_24
}

pub fn overlap_bbox_point(p: &Vector3f, dist_max: Float, bbox: &Bounds3f) -> bool {
    bbox_contains(&bbox_expand(bbox, dist_max), p)
}

// element interpolation

pub fn interpolate_line<T>(p0: T, p1: T, u: Float) -> T
where
    T: Copy + Add<Output = T> + Mul<Float, Output = T>,
{
    p0 * (1.0 as Float - u) + p1 * u
}

pub fn interpolate_triangle<T>(p0: T, p1: T, p2: T, uv: &Vector2f) -> T
where
    T: Copy + Add<Output = T> + Mul<Float, Output = T>,
{
    p0 * (1.0 as Float - uv.x - uv.y) + p1 * uv.x + p2 * uv.y
}

pub fn interpolate_quad<T>(p0: T, p1: T, p2: T, p3: T, uv: &Vector2f) -> T
where
    T: Copy + Add<Output = T> + Mul<Float, Output = T>,
{
    if uv.x + uv.y <= 1.0 {
        interpolate_triangle(p0, p1, p3, uv)
    } else {
        interpolate_triangle(p2, p3, p1, &Vector2f::new(1.0 - uv.x, 1.0 - uv.y))
    }
}

// element geometry

pub fn line_tangent(p0: &Vector3f, p1: &Vector3f) -> Vector3f {
    vec3_normalize(&(*p1 - *p0))
}

pub fn triangle_normal(p0: &Vector3f, p1: &Vector3f, p2: &Vector3f) -> Vector3f {
    vec3_normalize(&vec3_cross(&(*p1 - *p0), &(*p2 - *p0)))
}

pub fn triangle_area(p0: &Vector3f, p1: &Vector3f, p2: &Vector3f) -> Float {
    vec3_length(&vec3_cross(&(*p1 - *p0), &(*p2 - *p0))) / 2.0
}

pub fn quad_normal(p0: &Vector3f, p1: &Vector3f, p2: &Vector3f, p3: &Vector3f) -> Vector3f {
    vec3_normalize(&(triangle_normal(p0, p1, p3) + triangle_normal(p2, p3, p1)))
}

pub fn quad_area(p0: &Vector3f, p1: &Vector3f, p2: &Vector3f, p3: &Vector3f) -> Float {
    triangle_area(p0, p1, p3) + triangle_area(p2, p3, p1)
}

/// Tangent and bitangent of a triangle with respect to its uv
/// parametrization; used to build normal-mapping frames.
pub fn triangle_tangents_fromuv(
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    uv0: &Vector2f,
    uv1: &Vector2f,
    uv2: &Vector2f,
) -> (Vector3f, Vector3f) {
    let p: Vector3f = *p1 - *p0;
    let q: Vector3f = *p2 - *p0;
    let s = Vector2f::new(uv1.x - uv0.x, uv2.x - uv0.x);
    let t = Vector2f::new(uv1.y - uv0.y, uv2.y - uv0.y);
    let div: Float = s.x * t.y - s.y * t.x;
    if div != 0.0 {
        let tu = Vector3f::new(
            t.y * p.x - t.x * q.x,
            t.y * p.y - t.x * q.y,
            t.y * p.z - t.x * q.z,
        ) / div;
        let tv = Vector3f::new(
            s.x * q.x - s.y * p.x,
            s.x * q.y - s.y * p.y,
            s.x * q.z - s.y * p.z,
        ) / div;
        (tu, tv)
    } else {
        (Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 1.0, 0.0))
    }
}

// ray-element intersection

/// Outcome of a primitive hit: barycentric/bilinear uv plus distance.
#[derive(Debug, Default, Copy, Clone)]
pub struct ElementHit {
    pub uv: Vector2f,
    pub distance: Float,
    pub hit: bool,
}

pub fn intersect_point(ray: &Ray3f, p: &Vector3f, r: Float) -> ElementHit {
    // distance of the point from the ray, compared against the radius
    let w: Vector3f = *p - ray.o;
    let t: Float = vec3_dot(&w, &ray.d) / vec3_dot(&ray.d, &ray.d);
    if t < ray.tmin || t > ray.tmax {
        return ElementHit::default();
    }
    let rp: Vector3f = ray_point(ray, t);
    let prp: Vector3f = *p - rp;
    if vec3_length_squared(&prp) > r * r {
        return ElementHit::default();
    }
    ElementHit {
        uv: Vector2f::default(),
        distance: t,
        hit: true,
    }
}

pub fn intersect_line(
    ray: &Ray3f,
    p0: &Vector3f,
    p1: &Vector3f,
    r0: Float,
    r1: Float,
) -> ElementHit {
    // closest approach between the ray and the segment
    let u: Vector3f = ray.d;
    let v: Vector3f = *p1 - *p0;
    let w: Vector3f = ray.o - *p0;
    let a: Float = vec3_dot(&u, &u);
    let b: Float = vec3_dot(&u, &v);
    let c: Float = vec3_dot(&v, &v);
    let d: Float = vec3_dot(&u, &w);
    let e: Float = vec3_dot(&v, &w);
    let det: Float = a * c - b * b;
    if det == 0.0 {
        return ElementHit::default();
    }
    let t: Float = (b * e - c * d) / det;
    if t < ray.tmin || t > ray.tmax {
        return ElementHit::default();
    }
    let s: Float = clamp_t((a * e - b * d) / det, 0.0, 1.0);
    let pr: Vector3f = ray_point(ray, t);
    let pl: Vector3f = *p0 + v * s;
    let prpl: Vector3f = pl - pr;
    let r: Float = r0 * (1.0 - s) + r1 * s;
    let d2: Float = vec3_length_squared(&prpl);
    if d2 > r * r {
        return ElementHit::default();
    }
    ElementHit {
        uv: Vector2f::new(s, safe_sqrt(d2) / r),
        distance: t,
        hit: true,
    }
}

pub fn intersect_triangle(ray: &Ray3f, p0: &Vector3f, p1: &Vector3f, p2: &Vector3f) -> ElementHit {
    // Moeller-Trumbore
    let edge1: Vector3f = *p1 - *p0;
    let edge2: Vector3f = *p2 - *p0;
    let pvec: Vector3f = vec3_cross(&ray.d, &edge2);
    let det: Float = vec3_dot(&edge1, &pvec);
    if det == 0.0 {
        return ElementHit::default();
    }
    let inv_det: Float = 1.0 / det;
    let tvec: Vector3f = ray.o - *p0;
    let u: Float = vec3_dot(&tvec, &pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return ElementHit::default();
    }
    let qvec: Vector3f = vec3_cross(&tvec, &edge1);
    let v: Float = vec3_dot(&ray.d, &qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return ElementHit::default();
    }
    let t: Float = vec3_dot(&edge2, &qvec) * inv_det;
    if t < ray.tmin || t > ray.tmax {
        return ElementHit::default();
    }
    ElementHit {
        uv: Vector2f::new(u, v),
        distance: t,
        hit: true,
    }
}

/// Quads are tested as two triangles (p0,p1,p3) and (p2,p3,p1), the second
/// with its uv remapped to `1 - uv` so the bilinear parametrization is
/// continuous across the diagonal.
pub fn intersect_quad(
    ray: &Ray3f,
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    p3: &Vector3f,
) -> ElementHit {
    if p2 == p3 {
        return intersect_triangle(ray, p0, p1, p3);
    }
    let mut ray = *ray;
    let mut best = ElementHit::default();
    let hit1 = intersect_triangle(&ray, p0, p1, p3);
    if hit1.hit {
        best = hit1;
        ray.tmax = hit1.distance;
    }
    let hit2 = intersect_triangle(&ray, p2, p3, p1);
    if hit2.hit {
        best = ElementHit {
            uv: Vector2f::new(1.0 - hit2.uv.x, 1.0 - hit2.uv.y),
            distance: hit2.distance,
            hit: true,
        };
    }
    best
}

// point-element overlap

pub fn overlap_point(pos: &Vector3f, dist_max: Float, p: &Vector3f, r: Float) -> ElementHit {
    let d2: Float = vec3_distance_squared(pos, p);
    if d2 > (dist_max + r) * (dist_max + r) {
        return ElementHit::default();
    }
    ElementHit {
        uv: Vector2f::default(),
        distance: d2.sqrt(),
        hit: true,
    }
}

fn closestuv_line(pos: &Vector3f, p0: &Vector3f, p1: &Vector3f) -> Float {
    let ab: Vector3f = *p1 - *p0;
    let d: Float = vec3_dot(&ab, &ab);
    if d == 0.0 {
        return 0.0;
    }
    clamp_t(vec3_dot(&(*pos - *p0), &ab) / d, 0.0, 1.0)
}

pub fn overlap_line(
    pos: &Vector3f,
    dist_max: Float,
    p0: &Vector3f,
    p1: &Vector3f,
    r0: Float,
    r1: Float,
) -> ElementHit {
    let u: Float = closestuv_line(pos, p0, p1);
    let pl: Vector3f = *p0 + (*p1 - *p0) * u;
    let r: Float = r0 * (1.0 - u) + r1 * u;
    let d2: Float = vec3_distance_squared(pos, &pl);
    if d2 > (dist_max + r) * (dist_max + r) {
        return ElementHit::default();
    }
    ElementHit {
        uv: Vector2f::new(u, 0.0),
        distance: d2.sqrt(),
        hit: true,
    }
}

fn closestuv_triangle(pos: &Vector3f, p0: &Vector3f, p1: &Vector3f, p2: &Vector3f) -> Vector2f {
    // region classification against the edges of the triangle
    let ab: Vector3f = *p1 - *p0;
    let ac: Vector3f = *p2 - *p0;
    let ap: Vector3f = *pos - *p0;
    let d1: Float = vec3_dot(&ab, &ap);
    let d2: Float = vec3_dot(&ac, &ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return Vector2f::new(0.0, 0.0);
    }
    let bp: Vector3f = *pos - *p1;
    let d3: Float = vec3_dot(&ab, &bp);
    let d4: Float = vec3_dot(&ac, &bp);
    if d3 >= 0.0 && d4 <= d3 {
        return Vector2f::new(1.0, 0.0);
    }
    let vc: Float = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return Vector2f::new(d1 / (d1 - d3), 0.0);
    }
    let cp: Vector3f = *pos - *p2;
    let d5: Float = vec3_dot(&ab, &cp);
    let d6: Float = vec3_dot(&ac, &cp);
    if d6 >= 0.0 && d5 <= d6 {
        return Vector2f::new(0.0, 1.0);
    }
    let vb: Float = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return Vector2f::new(0.0, d2 / (d2 - d6));
    }
    let va: Float = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
        let w: Float = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return Vector2f::new(1.0 - w, w);
    }
    let denom: Float = 1.0 / (va + vb + vc);
    Vector2f::new(vb * denom, vc * denom)
}

#[allow(clippy::too_many_arguments)]
pub fn overlap_triangle(
    pos: &Vector3f,
    dist_max: Float,
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    r0: Float,
    r1: Float,
    r2: Float,
) -> ElementHit {
    let uv: Vector2f = closestuv_triangle(pos, p0, p1, p2);
    let p: Vector3f = interpolate_triangle(*p0, *p1, *p2, &uv);
    let r: Float = r0 * (1.0 - uv.x - uv.y) + r1 * uv.x + r2 * uv.y;
    let dd: Float = vec3_distance_squared(&p, pos);
    if dd > (dist_max + r) * (dist_max + r) {
        return ElementHit::default();
    }
    ElementHit {
        uv,
        distance: dd.sqrt(),
        hit: true,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn overlap_quad(
    pos: &Vector3f,
    dist_max: Float,
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    p3: &Vector3f,
    r0: Float,
    r1: Float,
    r2: Float,
    r3: Float,
) -> ElementHit {
    if p2 == p3 {
        return overlap_triangle(pos, dist_max, p0, p1, p3, r0, r1, r3);
    }
    let mut dist_max = dist_max;
    let mut best = ElementHit::default();
    let hit1 = overlap_triangle(pos, dist_max, p0, p1, p3, r0, r1, r3);
    if hit1.hit {
        best = hit1;
        dist_max = hit1.distance;
    }
    let hit2 = overlap_triangle(pos, dist_max, p2, p3, p1, r2, r3, r1);
    if hit2.hit {
        best = ElementHit {
            uv: Vector2f::new(1.0 - hit2.uv.x, 1.0 - hit2.uv.y),
            distance: hit2.distance,
            hit: true,
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_inverse_rigid() {
        let frame = lookat_frame(
            &Vector3f::new(1.0, 2.0, 3.0),
            &Vector3f::default(),
            &Vector3f::new(0.0, 1.0, 0.0),
        );
        let inv = frame_inverse(&frame, false);
        let p = Vector3f::new(0.3, -0.7, 2.1);
        let back = transform_point(&inv, &transform_point(&frame, &p));
        assert!(vec3_distance(&p, &back) < 1.0e-5);
    }

    #[test]
    fn test_frame_inverse_non_rigid() {
        let frame = Frame3f {
            x: Vector3f::new(2.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 3.0, 0.0),
            z: Vector3f::new(0.0, 0.5, 1.0),
            o: Vector3f::new(1.0, -2.0, 0.5),
        };
        let inv = frame_inverse(&frame, true);
        let p = Vector3f::new(0.3, -0.7, 2.1);
        let back = transform_point(&inv, &transform_point(&frame, &p));
        assert!(vec3_distance(&p, &back) < 1.0e-4);
    }

    #[test]
    fn test_basis_fromz_orthonormal() {
        for v in [
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(1.0, 2.0, -0.3),
        ] {
            let basis = basis_fromz(&v);
            assert!(vec3_dot(&basis.x, &basis.y).abs() < 1.0e-5);
            assert!(vec3_dot(&basis.x, &basis.z).abs() < 1.0e-5);
            assert!((vec3_length(&basis.x) - 1.0).abs() < 1.0e-5);
        }
    }

    #[test]
    fn test_intersect_triangle_hit_and_miss() {
        let p0 = Vector3f::new(-1.0, -1.0, 0.0);
        let p1 = Vector3f::new(1.0, -1.0, 0.0);
        let p2 = Vector3f::new(0.0, 1.0, 0.0);
        let hit = intersect_triangle(
            &Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0)),
            &p0,
            &p1,
            &p2,
        );
        assert!(hit.hit);
        assert!((hit.distance - 2.0).abs() < 1.0e-5);
        let miss = intersect_triangle(
            &Ray3f::new(Vector3f::new(5.0, 5.0, 2.0), Vector3f::new(0.0, 0.0, -1.0)),
            &p0,
            &p1,
            &p2,
        );
        assert!(!miss.hit);
    }

    #[test]
    fn test_intersect_quad_second_triangle_uv() {
        let p0 = Vector3f::new(0.0, 0.0, 0.0);
        let p1 = Vector3f::new(1.0, 0.0, 0.0);
        let p2 = Vector3f::new(1.0, 1.0, 0.0);
        let p3 = Vector3f::new(0.0, 1.0, 0.0);
        let hit = intersect_quad(
            &Ray3f::new(Vector3f::new(0.9, 0.9, 1.0), Vector3f::new(0.0, 0.0, -1.0)),
            &p0,
            &p1,
            &p2,
            &p3,
        );
        assert!(hit.hit);
        let p = interpolate_quad(p0, p1, p2, p3, &hit.uv);
        assert!(vec3_distance(&p, &Vector3f::new(0.9, 0.9, 0.0)) < 1.0e-4);
    }

    #[test]
    fn test_intersect_bbox() {
        let bbox = Bounds3f {
            min: Vector3f::new(-1.0, -1.0, -1.0),
            max: Vector3f::new(1.0, 1.0, 1.0),
        };
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let dinv = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        assert!(intersect_bbox(&ray, &dinv, &bbox));
        let ray2 = Ray3f::new(Vector3f::new(3.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(!intersect_bbox(&ray2, &dinv, &bbox));
    }

    #[test]
    fn test_overlap_triangle_closest() {
        let p0 = Vector3f::new(0.0, 0.0, 0.0);
        let p1 = Vector3f::new(2.0, 0.0, 0.0);
        let p2 = Vector3f::new(0.0, 2.0, 0.0);
        let hit = overlap_triangle(
            &Vector3f::new(0.5, 0.5, 1.0),
            2.0,
            &p0,
            &p1,
            &p2,
            0.0,
            0.0,
            0.0,
        );
        assert!(hit.hit);
        assert!((hit.distance - 1.0).abs() < 1.0e-5);
    }
}
