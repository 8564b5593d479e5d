//! Two-level bounding volume hierarchy: per-shape trees over elements and
//! a scene tree over instances whose leaves recurse into the shape trees.
//! Nodes live in a pre-order array; internal nodes store the index of
//! their first child, leaves an offset into the primitive-index array.

// std
use std::time::Instant;
// others
use log::info;
use smallvec::SmallVec;
// lumen
use crate::core::geometry::{
    bbox_center, bbox_expand, bbox_max_extent_axis, bbox_union, bbox_union_point, frame_inverse,
    intersect_bbox, intersect_line, intersect_point, intersect_quad, intersect_triangle,
    overlap_bbox_point, overlap_line, overlap_point, overlap_quad, overlap_triangle,
    transform_bbox, transform_point, transform_ray, Bounds3f, Ray3f, Vector2f, Vector3f,
};
use crate::core::lumen::Float;
use crate::core::scene::{SceneData, ShapeData};

/// Maximum number of primitives in a leaf.
pub const BVH_MAX_PRIMS: usize = 4;
/// Number of bins evaluated by the SAH split.
pub const BVH_SAH_BINS: usize = 16;

/// One node of a BVH. Leaf and internal nodes are identical except for the
/// meaning of `start`: first child index for internal nodes, offset into
/// `primitives` for leaves.
#[derive(Debug, Copy, Clone)]
pub struct BvhNode {
    pub bbox: Bounds3f,
    pub start: usize,
    pub num: u16,
    pub axis: u8,
    pub internal: bool,
}

impl Default for BvhNode {
    fn default() -> Self {
        BvhNode {
            bbox: Bounds3f::default(),
            start: 0,
            num: 0,
            axis: 0,
            internal: false,
        }
    }
}

/// BVH stored as flat arrays. For scene BVHs, `shapes` holds the per-shape
/// trees indexed by shape id; for shape BVHs it is empty.
#[derive(Debug, Default, Clone)]
pub struct BvhData {
    pub nodes: Vec<BvhNode>,
    pub primitives: Vec<usize>,
    pub shapes: Vec<BvhData>,
}

/// Result of intersect and overlap queries. `instance` is only set by
/// scene-level queries.
#[derive(Debug, Copy, Clone)]
pub struct BvhIntersection {
    pub instance: usize,
    pub element: usize,
    pub uv: Vector2f,
    pub distance: Float,
    pub hit: bool,
}

impl Default for BvhIntersection {
    fn default() -> Self {
        BvhIntersection {
            instance: usize::MAX,
            element: usize::MAX,
            uv: Vector2f::default(),
            distance: 0.0,
            hit: false,
        }
    }
}

// building

/// Midpoint split along the largest centroid axis; falls back to an
/// equal-count median when the partition degenerates.
fn split_middle(
    primitives: &mut [usize],
    bboxes: &[Bounds3f],
    left: usize,
    right: usize,
) -> (usize, u8) {
    let mut cbbox = Bounds3f::default();
    for &prim in &primitives[left..right] {
        cbbox = bbox_union_point(&cbbox, &bbox_center(&bboxes[prim]));
    }
    let axis: usize = bbox_max_extent_axis(&cbbox);
    if cbbox.max[axis] == cbbox.min[axis] {
        return ((left + right) / 2, axis as u8);
    }
    let split: Float = bbox_center(&cbbox)[axis];
    let mid: usize = left
        + partition_in_place(&mut primitives[left..right], |prim| {
            bbox_center(&bboxes[prim])[axis] < split
        });
    if mid == left || mid == right {
        // degenerate split, use the balanced median instead
        let mid: usize = (left + right) / 2;
        primitives[left..right].select_nth_unstable_by(mid - left, |&a, &b| {
            bbox_center(&bboxes[a])[axis]
                .partial_cmp(&bbox_center(&bboxes[b])[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        return (mid, axis as u8);
    }
    (mid, axis as u8)
}

// in-place partition returning the split index
fn partition_in_place<F>(slice: &mut [usize], mut pred: F) -> usize
where
    F: FnMut(usize) -> bool,
{
    let mut first: usize = 0;
    for i in 0..slice.len() {
        if pred(slice[i]) {
            slice.swap(first, i);
            first += 1;
        }
    }
    first
}

fn bbox_area(b: &Bounds3f) -> Float {
    if b.max.x < b.min.x {
        return 0.0;
    }
    let d: Vector3f = b.max - b.min;
    2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
}

/// Binned surface-area-heuristic split along the largest centroid axis.
fn split_sah(
    primitives: &mut [usize],
    bboxes: &[Bounds3f],
    left: usize,
    right: usize,
) -> (usize, u8) {
    let mut cbbox = Bounds3f::default();
    for &prim in &primitives[left..right] {
        cbbox = bbox_union_point(&cbbox, &bbox_center(&bboxes[prim]));
    }
    let axis: usize = bbox_max_extent_axis(&cbbox);
    let cmin: Float = cbbox.min[axis];
    let cmax: Float = cbbox.max[axis];
    if cmax == cmin {
        return ((left + right) / 2, axis as u8);
    }

    // bin the primitives by centroid
    let mut bin_bounds = [Bounds3f::default(); BVH_SAH_BINS];
    let mut bin_counts = [0_usize; BVH_SAH_BINS];
    let scale: Float = BVH_SAH_BINS as Float / (cmax - cmin);
    let bin_of = |prim: usize| -> usize {
        let b = ((bbox_center(&bboxes[prim])[axis] - cmin) * scale) as usize;
        b.min(BVH_SAH_BINS - 1)
    };
    for &prim in &primitives[left..right] {
        let b: usize = bin_of(prim);
        bin_counts[b] += 1;
        bin_bounds[b] = bbox_union(&bin_bounds[b], &bboxes[prim]);
    }

    // sweep the candidate planes between bins
    let mut left_bounds = [Bounds3f::default(); BVH_SAH_BINS];
    let mut left_counts = [0_usize; BVH_SAH_BINS];
    let mut acc = Bounds3f::default();
    let mut count: usize = 0;
    for b in 0..BVH_SAH_BINS {
        acc = bbox_union(&acc, &bin_bounds[b]);
        count += bin_counts[b];
        left_bounds[b] = acc;
        left_counts[b] = count;
    }
    let mut best_cost: Float = Float::MAX;
    let mut best_bin: usize = 0;
    let mut right_acc = Bounds3f::default();
    let mut right_count: usize = 0;
    for b in (1..BVH_SAH_BINS).rev() {
        right_acc = bbox_union(&right_acc, &bin_bounds[b]);
        right_count += bin_counts[b];
        let lc: usize = left_counts[b - 1];
        if lc == 0 || right_count == 0 {
            continue;
        }
        let cost: Float = bbox_area(&left_bounds[b - 1]) * lc as Float
            + bbox_area(&right_acc) * right_count as Float;
        if cost < best_cost {
            best_cost = cost;
            best_bin = b;
        }
    }
    if best_cost == Float::MAX {
        return split_middle(primitives, bboxes, left, right);
    }

    let mid: usize = left
        + partition_in_place(&mut primitives[left..right], |prim| bin_of(prim) < best_bin);
    if mid == left || mid == right {
        return split_middle(primitives, bboxes, left, right);
    }
    (mid, axis as u8)
}

/// Build a node array over the given primitive bounds.
fn build_bvh_nodes(bboxes: &[Bounds3f], highquality: bool) -> (Vec<BvhNode>, Vec<usize>) {
    let mut primitives: Vec<usize> = (0..bboxes.len()).collect();
    let mut nodes: Vec<BvhNode> = Vec::new();
    if bboxes.is_empty() {
        return (nodes, primitives);
    }
    nodes.reserve(2 * bboxes.len());
    nodes.push(BvhNode::default());
    // explicit recursion stack of (node, range) triples
    let mut stack: Vec<(usize, usize, usize)> = vec![(0, 0, bboxes.len())];
    while let Some((nodeid, left, right)) = stack.pop() {
        let mut bbox = Bounds3f::default();
        for &prim in &primitives[left..right] {
            bbox = bbox_union(&bbox, &bboxes[prim]);
        }
        nodes[nodeid].bbox = bbox;
        if right - left > BVH_MAX_PRIMS {
            let (mid, axis) = if highquality {
                split_sah(&mut primitives, bboxes, left, right)
            } else {
                split_middle(&mut primitives, bboxes, left, right)
            };
            let first_child: usize = nodes.len();
            nodes.push(BvhNode::default());
            nodes.push(BvhNode::default());
            nodes[nodeid].internal = true;
            nodes[nodeid].axis = axis;
            nodes[nodeid].num = 2;
            nodes[nodeid].start = first_child;
            stack.push((first_child, left, mid));
            stack.push((first_child + 1, mid, right));
        } else {
            nodes[nodeid].internal = false;
            nodes[nodeid].start = left;
            nodes[nodeid].num = (right - left) as u16;
        }
    }
    nodes.shrink_to_fit();
    (nodes, primitives)
}

/// Bounds of every element of a shape; degenerate elements produce their
/// point bounds and are still carried (zero-area triangles never report
/// hits from the element tests).
fn shape_bboxes(shape: &ShapeData) -> Vec<Bounds3f> {
    let radius = |idx: usize| -> Float {
        if shape.radius.is_empty() {
            0.0
        } else {
            shape.radius[idx]
        }
    };
    if !shape.triangles.is_empty() {
        shape
            .triangles
            .iter()
            .map(|t| {
                let mut b = Bounds3f::default();
                for &v in t {
                    b = bbox_union_point(&b, &shape.positions[v]);
                }
                b
            })
            .collect()
    } else if !shape.quads.is_empty() {
        shape
            .quads
            .iter()
            .map(|q| {
                let mut b = Bounds3f::default();
                for &v in q {
                    b = bbox_union_point(&b, &shape.positions[v]);
                }
                b
            })
            .collect()
    } else if !shape.lines.is_empty() {
        shape
            .lines
            .iter()
            .map(|l| {
                let b = bbox_union_point(
                    &bbox_union_point(&Bounds3f::default(), &shape.positions[l[0]]),
                    &shape.positions[l[1]],
                );
                bbox_expand(&b, radius(l[0]).max(radius(l[1])))
            })
            .collect()
    } else {
        shape
            .points
            .iter()
            .map(|&p| {
                bbox_expand(
                    &bbox_union_point(&Bounds3f::default(), &shape.positions[p]),
                    radius(p),
                )
            })
            .collect()
    }
}

/// Build the BVH of a single shape.
pub fn make_shape_bvh(shape: &ShapeData, highquality: bool) -> BvhData {
    let bboxes: Vec<Bounds3f> = shape_bboxes(shape);
    let (nodes, primitives) = build_bvh_nodes(&bboxes, highquality);
    BvhData {
        nodes,
        primitives,
        shapes: Vec::new(),
    }
}

fn instance_bbox(scene: &SceneData, bvh: &BvhData, instance: usize) -> Bounds3f {
    let instance = &scene.instances[instance];
    let shape_bvh: &BvhData = &bvh.shapes[instance.shape];
    if shape_bvh.nodes.is_empty() {
        Bounds3f::default()
    } else {
        transform_bbox(&instance.frame, &shape_bvh.nodes[0].bbox)
    }
}

/// Build the scene BVH: per-shape BVHs first, then the instance tree.
pub fn make_scene_bvh(scene: &SceneData, highquality: bool, noparallel: bool) -> BvhData {
    let start = Instant::now();
    let mut bvh = BvhData::default();
    // per-shape trees, in parallel over shapes unless disabled
    if noparallel || scene.shapes.len() <= 1 {
        bvh.shapes = scene
            .shapes
            .iter()
            .map(|shape| make_shape_bvh(shape, highquality))
            .collect();
    } else {
        let num_cores: usize = num_cpus::get().min(scene.shapes.len());
        let mut shapes: Vec<BvhData> = vec![BvhData::default(); scene.shapes.len()];
        let chunk: usize = (scene.shapes.len() + num_cores - 1) / num_cores;
        crossbeam::scope(|scope| {
            for (band, out) in shapes.chunks_mut(chunk).enumerate() {
                let first: usize = band * chunk;
                scope.spawn(move |_| {
                    for (offset, slot) in out.iter_mut().enumerate() {
                        *slot = make_shape_bvh(&scene.shapes[first + offset], highquality);
                    }
                });
            }
        })
        .unwrap();
        bvh.shapes = shapes;
    }
    // instance tree over transformed shape bounds
    let bboxes: Vec<Bounds3f> = (0..scene.instances.len())
        .map(|idx| instance_bbox(scene, &bvh, idx))
        .collect();
    let (nodes, primitives) = build_bvh_nodes(&bboxes, highquality);
    bvh.nodes = nodes;
    bvh.primitives = primitives;
    info!(
        "built scene bvh: {} instances, {} nodes in {:.2?}",
        scene.instances.len(),
        bvh.nodes.len(),
        start.elapsed()
    );
    bvh
}

// refitting

/// Recompute node bounds bottom-up along the existing topology. Children
/// always follow their parent in the pre-order array, so a reverse sweep
/// sees both children before each internal node.
fn refit_bvh_nodes(nodes: &mut [BvhNode], primitives: &[usize], bboxes: &[Bounds3f]) {
    for nodeid in (0..nodes.len()).rev() {
        let node = nodes[nodeid];
        let mut bbox = Bounds3f::default();
        if node.internal {
            bbox = bbox_union(&nodes[node.start].bbox, &nodes[node.start + 1].bbox);
        } else {
            for i in 0..node.num as usize {
                bbox = bbox_union(&bbox, &bboxes[primitives[node.start + i]]);
            }
        }
        nodes[nodeid].bbox = bbox;
    }
}

/// Refit a shape BVH after vertex updates.
pub fn update_shape_bvh(bvh: &mut BvhData, shape: &ShapeData) {
    let bboxes: Vec<Bounds3f> = shape_bboxes(shape);
    refit_bvh_nodes(&mut bvh.nodes, &bvh.primitives, &bboxes);
}

/// Refit the scene BVH: listed shapes are refitted first, then the
/// instance tree is rebounded over all instances.
pub fn update_scene_bvh(
    bvh: &mut BvhData,
    scene: &SceneData,
    updated_instances: &[usize],
    updated_shapes: &[usize],
) {
    for &shape in updated_shapes {
        let mut shape_bvh = std::mem::take(&mut bvh.shapes[shape]);
        update_shape_bvh(&mut shape_bvh, &scene.shapes[shape]);
        bvh.shapes[shape] = shape_bvh;
    }
    info!(
        "refitting scene bvh: {} instances moved, {} shapes deformed",
        updated_instances.len(),
        updated_shapes.len()
    );
    let bboxes: Vec<Bounds3f> = (0..scene.instances.len())
        .map(|idx| instance_bbox(scene, bvh, idx))
        .collect();
    let mut nodes = std::mem::take(&mut bvh.nodes);
    refit_bvh_nodes(&mut nodes, &bvh.primitives, &bboxes);
    bvh.nodes = nodes;
}

// ray traversal

type NodeStack = SmallVec<[usize; 64]>;

/// Intersect a ray with a shape BVH; closest hit, or first hit when
/// `find_any` is set.
pub fn intersect_shape_bvh(
    bvh: &BvhData,
    shape: &ShapeData,
    ray: &Ray3f,
    find_any: bool,
) -> BvhIntersection {
    let mut intersection = BvhIntersection::default();
    if bvh.nodes.is_empty() {
        return intersection;
    }
    let mut ray: Ray3f = *ray;
    let ray_dinv = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
    let ray_dsign = [ray.d.x < 0.0, ray.d.y < 0.0, ray.d.z < 0.0];
    let mut stack: NodeStack = SmallVec::new();
    stack.push(0);
    while let Some(nodeid) = stack.pop() {
        let node = &bvh.nodes[nodeid];
        if !intersect_bbox(&ray, &ray_dinv, &node.bbox) {
            continue;
        }
        if node.internal {
            // front-to-back: the far child is pushed first
            if ray_dsign[node.axis as usize] {
                stack.push(node.start);
                stack.push(node.start + 1);
            } else {
                stack.push(node.start + 1);
                stack.push(node.start);
            }
        } else {
            for i in 0..node.num as usize {
                let element: usize = bvh.primitives[node.start + i];
                let hit = intersect_shape_element(shape, element, &ray);
                if hit.hit {
                    intersection = BvhIntersection {
                        instance: usize::MAX,
                        element,
                        uv: hit.uv,
                        distance: hit.distance,
                        hit: true,
                    };
                    ray.tmax = hit.distance;
                    if find_any {
                        return intersection;
                    }
                }
            }
        }
    }
    intersection
}

fn intersect_shape_element(
    shape: &ShapeData,
    element: usize,
    ray: &Ray3f,
) -> crate::core::geometry::ElementHit {
    let radius = |idx: usize| -> Float {
        if shape.radius.is_empty() {
            0.0
        } else {
            shape.radius[idx]
        }
    };
    if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        intersect_triangle(
            ray,
            &shape.positions[t[0]],
            &shape.positions[t[1]],
            &shape.positions[t[2]],
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        intersect_quad(
            ray,
            &shape.positions[q[0]],
            &shape.positions[q[1]],
            &shape.positions[q[2]],
            &shape.positions[q[3]],
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        intersect_line(
            ray,
            &shape.positions[l[0]],
            &shape.positions[l[1]],
            radius(l[0]),
            radius(l[1]),
        )
    } else {
        let p = shape.points[element];
        intersect_point(ray, &shape.positions[p], radius(p))
    }
}

/// Intersect a ray with the scene BVH: traverse the instance tree and
/// recurse into shape BVHs with the ray mapped into the instance frame and
/// `tmax` tightened to the current best hit.
pub fn intersect_scene_bvh(
    bvh: &BvhData,
    scene: &SceneData,
    ray: &Ray3f,
    find_any: bool,
) -> BvhIntersection {
    let mut intersection = BvhIntersection::default();
    if bvh.nodes.is_empty() {
        return intersection;
    }
    let mut ray: Ray3f = *ray;
    let ray_dinv = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
    let ray_dsign = [ray.d.x < 0.0, ray.d.y < 0.0, ray.d.z < 0.0];
    let mut stack: NodeStack = SmallVec::new();
    stack.push(0);
    while let Some(nodeid) = stack.pop() {
        let node = &bvh.nodes[nodeid];
        if !intersect_bbox(&ray, &ray_dinv, &node.bbox) {
            continue;
        }
        if node.internal {
            if ray_dsign[node.axis as usize] {
                stack.push(node.start);
                stack.push(node.start + 1);
            } else {
                stack.push(node.start + 1);
                stack.push(node.start);
            }
        } else {
            for i in 0..node.num as usize {
                let instance_id: usize = bvh.primitives[node.start + i];
                let instance = &scene.instances[instance_id];
                let inv_ray: Ray3f =
                    transform_ray(&frame_inverse(&instance.frame, true), &ray);
                let sub = intersect_shape_bvh(
                    &bvh.shapes[instance.shape],
                    &scene.shapes[instance.shape],
                    &inv_ray,
                    find_any,
                );
                if sub.hit {
                    intersection = BvhIntersection {
                        instance: instance_id,
                        element: sub.element,
                        uv: sub.uv,
                        distance: sub.distance,
                        hit: true,
                    };
                    ray.tmax = sub.distance;
                    if find_any {
                        return intersection;
                    }
                }
            }
        }
    }
    intersection
}

/// Intersect a ray against a single instance only; used by the light
/// sampler to reconstruct per-light pdfs.
pub fn intersect_instance_bvh(
    bvh: &BvhData,
    scene: &SceneData,
    instance_id: usize,
    ray: &Ray3f,
    find_any: bool,
) -> BvhIntersection {
    let instance = &scene.instances[instance_id];
    let inv_ray: Ray3f = transform_ray(&frame_inverse(&instance.frame, true), ray);
    let mut intersection = intersect_shape_bvh(
        &bvh.shapes[instance.shape],
        &scene.shapes[instance.shape],
        &inv_ray,
        find_any,
    );
    intersection.instance = instance_id;
    intersection
}

// point overlap

/// Closest shape element within `max_distance` of a point.
pub fn overlap_shape_bvh(
    bvh: &BvhData,
    shape: &ShapeData,
    pos: &Vector3f,
    max_distance: Float,
    find_any: bool,
) -> BvhIntersection {
    let mut intersection = BvhIntersection::default();
    if bvh.nodes.is_empty() {
        return intersection;
    }
    let mut max_distance: Float = max_distance;
    let mut stack: NodeStack = SmallVec::new();
    stack.push(0);
    while let Some(nodeid) = stack.pop() {
        let node = &bvh.nodes[nodeid];
        if !overlap_bbox_point(pos, max_distance, &node.bbox) {
            continue;
        }
        if node.internal {
            stack.push(node.start);
            stack.push(node.start + 1);
        } else {
            for i in 0..node.num as usize {
                let element: usize = bvh.primitives[node.start + i];
                let hit = overlap_shape_element(shape, element, pos, max_distance);
                if hit.hit {
                    intersection = BvhIntersection {
                        instance: usize::MAX,
                        element,
                        uv: hit.uv,
                        distance: hit.distance,
                        hit: true,
                    };
                    max_distance = hit.distance;
                    if find_any {
                        return intersection;
                    }
                }
            }
        }
    }
    intersection
}

fn overlap_shape_element(
    shape: &ShapeData,
    element: usize,
    pos: &Vector3f,
    max_distance: Float,
) -> crate::core::geometry::ElementHit {
    let radius = |idx: usize| -> Float {
        if shape.radius.is_empty() {
            0.0
        } else {
            shape.radius[idx]
        }
    };
    if !shape.triangles.is_empty() {
        let t = shape.triangles[element];
        overlap_triangle(
            pos,
            max_distance,
            &shape.positions[t[0]],
            &shape.positions[t[1]],
            &shape.positions[t[2]],
            radius(t[0]),
            radius(t[1]),
            radius(t[2]),
        )
    } else if !shape.quads.is_empty() {
        let q = shape.quads[element];
        overlap_quad(
            pos,
            max_distance,
            &shape.positions[q[0]],
            &shape.positions[q[1]],
            &shape.positions[q[2]],
            &shape.positions[q[3]],
            radius(q[0]),
            radius(q[1]),
            radius(q[2]),
            radius(q[3]),
        )
    } else if !shape.lines.is_empty() {
        let l = shape.lines[element];
        overlap_line(
            pos,
            max_distance,
            &shape.positions[l[0]],
            &shape.positions[l[1]],
            radius(l[0]),
            radius(l[1]),
        )
    } else {
        let p = shape.points[element];
        overlap_point(pos, max_distance, &shape.positions[p], radius(p))
    }
}

/// Closest scene element within `max_distance` of a point.
pub fn overlap_scene_bvh(
    bvh: &BvhData,
    scene: &SceneData,
    pos: &Vector3f,
    max_distance: Float,
    find_any: bool,
) -> BvhIntersection {
    let mut intersection = BvhIntersection::default();
    if bvh.nodes.is_empty() {
        return intersection;
    }
    let mut max_distance: Float = max_distance;
    let mut stack: NodeStack = SmallVec::new();
    stack.push(0);
    while let Some(nodeid) = stack.pop() {
        let node = &bvh.nodes[nodeid];
        if !overlap_bbox_point(pos, max_distance, &node.bbox) {
            continue;
        }
        if node.internal {
            stack.push(node.start);
            stack.push(node.start + 1);
        } else {
            for i in 0..node.num as usize {
                let instance_id: usize = bvh.primitives[node.start + i];
                let instance = &scene.instances[instance_id];
                let inv_pos: Vector3f =
                    transform_point(&frame_inverse(&instance.frame, true), pos);
                let sub = overlap_shape_bvh(
                    &bvh.shapes[instance.shape],
                    &scene.shapes[instance.shape],
                    &inv_pos,
                    max_distance,
                    find_any,
                );
                if sub.hit {
                    intersection = BvhIntersection {
                        instance: instance_id,
                        element: sub.element,
                        uv: sub.uv,
                        distance: sub.distance,
                        hit: true,
                    };
                    max_distance = sub.distance;
                    if find_any {
                        return intersection;
                    }
                }
            }
        }
    }
    intersection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Frame3f, Vector3f};
    use crate::core::rng::{make_rng, rand1f};
    use crate::core::scene::{InstanceData, MaterialData};

    fn random_triangle_shape(n: usize, seed: u64) -> ShapeData {
        let mut rng = make_rng(seed, 1);
        let mut shape = ShapeData::default();
        for i in 0..n {
            let base = Vector3f::new(
                rand1f(&mut rng) * 10.0 - 5.0,
                rand1f(&mut rng) * 10.0 - 5.0,
                rand1f(&mut rng) * 10.0 - 5.0,
            );
            for _ in 0..3 {
                shape.positions.push(
                    base + Vector3f::new(rand1f(&mut rng), rand1f(&mut rng), rand1f(&mut rng)),
                );
            }
            shape.triangles.push([3 * i, 3 * i + 1, 3 * i + 2]);
        }
        shape
    }

    fn brute_force_intersect(shape: &ShapeData, ray: &Ray3f) -> BvhIntersection {
        let mut best = BvhIntersection::default();
        let mut ray = *ray;
        for (element, t) in shape.triangles.iter().enumerate() {
            let hit = intersect_triangle(
                &ray,
                &shape.positions[t[0]],
                &shape.positions[t[1]],
                &shape.positions[t[2]],
            );
            if hit.hit {
                best = BvhIntersection {
                    instance: usize::MAX,
                    element,
                    uv: hit.uv,
                    distance: hit.distance,
                    hit: true,
                };
                ray.tmax = hit.distance;
            }
        }
        best
    }

    fn check_node_containment(bvh: &BvhData, bboxes: &[Bounds3f], nodeid: usize) {
        let node = &bvh.nodes[nodeid];
        if node.internal {
            for child in node.start..node.start + 2 {
                let cb = &bvh.nodes[child].bbox;
                assert!(cb.min.x >= node.bbox.min.x - 1.0e-4);
                assert!(cb.max.x <= node.bbox.max.x + 1.0e-4);
                check_node_containment(bvh, bboxes, child);
            }
        } else {
            assert!(node.num > 0 && node.num as usize <= BVH_MAX_PRIMS);
            for i in 0..node.num as usize {
                let b = &bboxes[bvh.primitives[node.start + i]];
                assert!(b.min.x >= node.bbox.min.x - 1.0e-4);
                assert!(b.max.y <= node.bbox.max.y + 1.0e-4);
            }
        }
    }

    #[test]
    fn test_bvh_bounds_contain_primitives() {
        for highquality in [false, true] {
            let shape = random_triangle_shape(300, 11);
            let bvh = make_shape_bvh(&shape, highquality);
            let bboxes = shape_bboxes(&shape);
            check_node_containment(&bvh, &bboxes, 0);
        }
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let shape = random_triangle_shape(200, 13);
        for highquality in [false, true] {
            let bvh = make_shape_bvh(&shape, highquality);
            let mut rng = make_rng(17, 3);
            for _ in 0..500 {
                let ray = Ray3f::new(
                    Vector3f::new(
                        rand1f(&mut rng) * 16.0 - 8.0,
                        rand1f(&mut rng) * 16.0 - 8.0,
                        -10.0,
                    ),
                    crate::core::geometry::vec3_normalize(&Vector3f::new(
                        rand1f(&mut rng) - 0.5,
                        rand1f(&mut rng) - 0.5,
                        1.0,
                    )),
                );
                let fast = intersect_shape_bvh(&bvh, &shape, &ray, false);
                let slow = brute_force_intersect(&shape, &ray);
                assert_eq!(fast.hit, slow.hit);
                if fast.hit {
                    assert!((fast.distance - slow.distance).abs() < 1.0e-4);
                    assert_eq!(fast.element, slow.element);
                }
            }
        }
    }

    #[test]
    fn test_scene_bvh_instancing() {
        let shape = random_triangle_shape(50, 19);
        let scene = SceneData {
            shapes: vec![shape],
            materials: vec![MaterialData::default()],
            instances: vec![
                InstanceData {
                    frame: Frame3f::default(),
                    shape: 0,
                    material: 0,
                },
                InstanceData {
                    frame: Frame3f {
                        o: Vector3f::new(100.0, 0.0, 0.0),
                        ..Frame3f::default()
                    },
                    shape: 0,
                    material: 0,
                },
            ],
            ..SceneData::default()
        };
        let bvh = make_scene_bvh(&scene, true, true);
        // a ray into the moved copy reports the second instance
        let ray = Ray3f::new(
            Vector3f::new(100.0, 0.0, -20.0),
            Vector3f::new(0.0, 0.0, 1.0),
        );
        let hit = intersect_scene_bvh(&bvh, &scene, &ray, false);
        if hit.hit {
            assert_eq!(hit.instance, 1);
        }
    }

    #[test]
    fn test_refit_preserves_hits() {
        let shape = random_triangle_shape(120, 23);
        let scene = SceneData {
            shapes: vec![shape],
            materials: vec![MaterialData::default()],
            instances: vec![InstanceData {
                frame: Frame3f::default(),
                shape: 0,
                material: 0,
            }],
            ..SceneData::default()
        };
        let mut bvh = make_scene_bvh(&scene, false, true);
        let ray = Ray3f::new(
            Vector3f::new(0.3, 0.1, -20.0),
            Vector3f::new(0.0, 0.0, 1.0),
        );
        let before = intersect_scene_bvh(&bvh, &scene, &ray, false);
        // refit with zero displacement must not change anything
        update_scene_bvh(&mut bvh, &scene, &[0], &[0]);
        let after = intersect_scene_bvh(&bvh, &scene, &ray, false);
        assert_eq!(before.hit, after.hit);
        if before.hit {
            assert_eq!(before.element, after.element);
            assert!((before.distance - after.distance).abs() < 1.0e-6);
        }
    }

    #[test]
    fn test_overlap_finds_closest() {
        let mut shape = ShapeData::default();
        shape.positions = vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(5.0, 0.0, 0.0),
            Vector3f::new(6.0, 0.0, 0.0),
            Vector3f::new(5.0, 1.0, 0.0),
        ];
        shape.triangles = vec![[0, 1, 2], [3, 4, 5]];
        let bvh = make_shape_bvh(&shape, false);
        let hit = overlap_shape_bvh(&bvh, &shape, &Vector3f::new(0.2, 0.2, 0.5), 10.0, false);
        assert!(hit.hit);
        assert_eq!(hit.element, 0);
        assert!((hit.distance - 0.5).abs() < 1.0e-5);
    }

    #[test]
    fn test_scene_overlap_transforms_query_point() {
        let mut shape = ShapeData::default();
        shape.positions = vec![
            Vector3f::new(-1.0, -1.0, 0.0),
            Vector3f::new(1.0, -1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ];
        shape.triangles = vec![[0, 1, 2]];
        let scene = SceneData {
            shapes: vec![shape],
            materials: vec![MaterialData::default()],
            instances: vec![InstanceData {
                frame: Frame3f {
                    o: Vector3f::new(10.0, 0.0, 0.0),
                    ..Frame3f::default()
                },
                shape: 0,
                material: 0,
            }],
            ..SceneData::default()
        };
        let bvh = make_scene_bvh(&scene, false, true);
        let hit = overlap_scene_bvh(&bvh, &scene, &Vector3f::new(10.0, 0.0, 2.0), 5.0, false);
        assert!(hit.hit);
        assert_eq!(hit.instance, 0);
        assert!((hit.distance - 2.0).abs() < 1.0e-5);
        let miss = overlap_scene_bvh(&bvh, &scene, &Vector3f::new(10.0, 0.0, 2.0), 1.0, false);
        assert!(!miss.hit);
    }

    #[test]
    fn test_empty_scene_no_hit() {
        let scene = SceneData::default();
        let bvh = make_scene_bvh(&scene, false, true);
        let ray = Ray3f::new(Vector3f::default(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!intersect_scene_bvh(&bvh, &scene, &ray, false).hit);
    }
}
