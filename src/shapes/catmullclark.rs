//! Catmull-Clark subdivision of face-varying quad meshes, with optional
//! displacement mapping. Triangles ride along as quads whose last two
//! indices coincide. Positions and texture coordinates are refined with
//! their own topologies; texcoords lock their boundary so UV seams do not
//! slide.

// std
use std::collections::HashMap;
use std::ops::{Add, Mul, Sub};
// others
use log::info;
// lumen
use crate::core::geometry::{
    quad_area, quad_normal, triangle_area, triangle_normal, vec3_mean, vec3_normalize, Vector2f,
    Vector3f,
};
use crate::core::lumen::Float;
use crate::core::scene::{ShapeData, SubdivData};
use crate::core::texture::{eval_texture, TextureData};

// edge maps

#[derive(Debug, Default, Copy, Clone)]
struct EdgeInfo {
    index: usize,
    nfaces: usize,
}

/// Undirected edges of a face-varying quad topology, each with a unique
/// index and the number of faces using it.
#[derive(Debug, Default)]
pub struct EdgeMap {
    edges: HashMap<(usize, usize), EdgeInfo>,
}

fn make_edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl EdgeMap {
    fn insert(&mut self, a: usize, b: usize) {
        let next: usize = self.edges.len();
        let info = self.edges.entry(make_edge_key(a, b)).or_insert(EdgeInfo {
            index: next,
            nfaces: 0,
        });
        info.nfaces += 1;
    }

    pub fn edge_index(&self, a: usize, b: usize) -> usize {
        self.edges[&make_edge_key(a, b)].index
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges ordered by their index.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut edges = vec![[0_usize; 2]; self.edges.len()];
        for (&(a, b), info) in &self.edges {
            edges[info.index] = [a, b];
        }
        edges
    }

    /// Edges used by exactly one face.
    pub fn boundary(&self) -> Vec<[usize; 2]> {
        let mut boundary: Vec<[usize; 2]> = self
            .edges
            .iter()
            .filter(|(_, info)| info.nfaces == 1)
            .map(|(&(a, b), _)| [a, b])
            .collect();
        boundary.sort_by_key(|e| self.edge_index(e[0], e[1]));
        boundary
    }
}

/// Build the edge map of a quad topology; quads with `z == w` are
/// triangles and contribute three edges.
pub fn make_edge_map(quads: &[[usize; 4]]) -> EdgeMap {
    let mut emap = EdgeMap::default();
    for q in quads {
        if q[2] != q[3] {
            emap.insert(q[0], q[1]);
            emap.insert(q[1], q[2]);
            emap.insert(q[2], q[3]);
            emap.insert(q[3], q[0]);
        } else {
            emap.insert(q[0], q[1]);
            emap.insert(q[1], q[2]);
            emap.insert(q[2], q[0]);
        }
    }
    emap
}

// one refinement step

/// One Catmull-Clark step over a face-varying topology, producing the
/// refined quads and vertex attributes in place. Vertex classes: 2 for
/// interior, 1 for crease, 0 for corner (locked).
pub fn tesselate_catmullclark<T>(quads: &mut Vec<[usize; 4]>, vert: &mut Vec<T>, lock_boundary: bool)
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + Mul<Float, Output = T>,
{
    let emap: EdgeMap = make_edge_map(quads);
    let edges: Vec<[usize; 2]> = emap.edges();
    let boundary: Vec<[usize; 2]> = emap.boundary();

    let nv: usize = vert.len();
    let ne: usize = edges.len();

    // refined vertices: originals, then edge midpoints, then face centres
    let mut tverts: Vec<T> = Vec::with_capacity(nv + ne + quads.len());
    tverts.extend_from_slice(vert);
    for e in &edges {
        tverts.push((vert[e[0]] + vert[e[1]]) * 0.5);
    }
    for q in quads.iter() {
        if q[2] != q[3] {
            tverts.push((vert[q[0]] + vert[q[1]] + vert[q[2]] + vert[q[3]]) * 0.25);
        } else {
            tverts.push((vert[q[0]] + vert[q[1]] + vert[q[2]]) * (1.0 / 3.0));
        }
    }

    // refined faces: one quad per original corner
    let mut tquads: Vec<[usize; 4]> = Vec::with_capacity(4 * quads.len());
    for (i, q) in quads.iter().enumerate() {
        if q[2] != q[3] {
            tquads.push([
                q[0],
                nv + emap.edge_index(q[0], q[1]),
                nv + ne + i,
                nv + emap.edge_index(q[3], q[0]),
            ]);
            tquads.push([
                q[1],
                nv + emap.edge_index(q[1], q[2]),
                nv + ne + i,
                nv + emap.edge_index(q[0], q[1]),
            ]);
            tquads.push([
                q[2],
                nv + emap.edge_index(q[2], q[3]),
                nv + ne + i,
                nv + emap.edge_index(q[1], q[2]),
            ]);
            tquads.push([
                q[3],
                nv + emap.edge_index(q[3], q[0]),
                nv + ne + i,
                nv + emap.edge_index(q[2], q[3]),
            ]);
        } else {
            tquads.push([
                q[0],
                nv + emap.edge_index(q[0], q[1]),
                nv + ne + i,
                nv + emap.edge_index(q[2], q[0]),
            ]);
            tquads.push([
                q[1],
                nv + emap.edge_index(q[1], q[2]),
                nv + ne + i,
                nv + emap.edge_index(q[0], q[1]),
            ]);
            tquads.push([
                q[2],
                nv + emap.edge_index(q[2], q[0]),
                nv + ne + i,
                nv + emap.edge_index(q[1], q[2]),
            ]);
        }
    }

    // refined boundary: each boundary edge splits at its midpoint
    let mut tboundary: Vec<[usize; 2]> = Vec::with_capacity(2 * boundary.len());
    for e in &boundary {
        tboundary.push([e[0], nv + emap.edge_index(e[0], e[1])]);
        tboundary.push([nv + emap.edge_index(e[0], e[1]), e[1]]);
    }
    let mut tcrease_edges: Vec<[usize; 2]> = Vec::new();
    let mut tcrease_verts: Vec<usize> = Vec::new();
    if lock_boundary {
        for b in &tboundary {
            tcrease_verts.push(b[0]);
            tcrease_verts.push(b[1]);
        }
    } else {
        for b in &tboundary {
            tcrease_edges.push(*b);
        }
    }

    // vertex classes
    let mut tverts_val: Vec<u8> = vec![2; tverts.len()];
    for e in &tboundary {
        tverts_val[e[0]] = if lock_boundary { 0 } else { 1 };
        tverts_val[e[1]] = if lock_boundary { 0 } else { 1 };
    }

    // averaging pass
    let mut avert: Vec<T> = vec![T::default(); tverts.len()];
    let mut acount: Vec<usize> = vec![0; tverts.len()];
    for &p in &tcrease_verts {
        if tverts_val[p] != 0 {
            continue;
        }
        avert[p] = avert[p] + tverts[p];
        acount[p] += 1;
    }
    for e in &tcrease_edges {
        let c: T = (tverts[e[0]] + tverts[e[1]]) * 0.5;
        for &vid in e {
            if tverts_val[vid] != 1 {
                continue;
            }
            avert[vid] = avert[vid] + c;
            acount[vid] += 1;
        }
    }
    for q in &tquads {
        let c: T = (tverts[q[0]] + tverts[q[1]] + tverts[q[2]] + tverts[q[3]]) * 0.25;
        for &vid in q {
            if tverts_val[vid] != 2 {
                continue;
            }
            avert[vid] = avert[vid] + c;
            acount[vid] += 1;
        }
    }
    for i in 0..tverts.len() {
        avert[i] = avert[i] * (1.0 / acount[i] as Float);
    }

    // interior correction keeps the limit close to the B-spline surface
    for i in 0..tverts.len() {
        if tverts_val[i] != 2 {
            continue;
        }
        avert[i] = tverts[i] + (avert[i] - tverts[i]) * (4.0 / acount[i] as Float);
    }

    *vert = avert;
    *quads = tquads;
}

// mesh utilities

/// Area-weighted vertex normals of a quad mesh.
pub fn quads_normals(quads: &[[usize; 4]], positions: &[Vector3f]) -> Vec<Vector3f> {
    let mut normals: Vec<Vector3f> = vec![Vector3f::default(); positions.len()];
    for q in quads {
        let normal: Vector3f = quad_normal(
            &positions[q[0]],
            &positions[q[1]],
            &positions[q[2]],
            &positions[q[3]],
        );
        let area: Float = quad_area(
            &positions[q[0]],
            &positions[q[1]],
            &positions[q[2]],
            &positions[q[3]],
        );
        for &v in &q[0..if q[2] != q[3] { 4 } else { 3 }] {
            normals[v] += normal * area;
        }
    }
    normals.iter().map(vec3_normalize).collect()
}

/// Area-weighted vertex normals of a triangle mesh.
pub fn triangles_normals(triangles: &[[usize; 3]], positions: &[Vector3f]) -> Vec<Vector3f> {
    let mut normals: Vec<Vector3f> = vec![Vector3f::default(); positions.len()];
    for t in triangles {
        let normal: Vector3f =
            triangle_normal(&positions[t[0]], &positions[t[1]], &positions[t[2]]);
        let area: Float = triangle_area(&positions[t[0]], &positions[t[1]], &positions[t[2]]);
        for &v in t {
            normals[v] += normal * area;
        }
    }
    normals.iter().map(vec3_normalize).collect()
}

/// Convert quads to triangles; degenerate quads yield one triangle.
pub fn quads_to_triangles(quads: &[[usize; 4]]) -> Vec<[usize; 3]> {
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(2 * quads.len());
    for q in quads {
        triangles.push([q[0], q[1], q[3]]);
        if q[2] != q[3] {
            triangles.push([q[2], q[3], q[1]]);
        }
    }
    triangles
}

/// Merge a face-varying topology (separate index arrays for positions,
/// normals and texcoords) into a single indexed quad mesh by uniquing the
/// per-corner index triples.
#[allow(clippy::type_complexity)]
pub fn split_facevarying(
    quadspos: &[[usize; 4]],
    quadsnorm: &[[usize; 4]],
    quadstexcoord: &[[usize; 4]],
    positions: &[Vector3f],
    normals: &[Vector3f],
    texcoords: &[Vector2f],
) -> (Vec<[usize; 4]>, Vec<Vector3f>, Vec<Vector3f>, Vec<Vector2f>) {
    let mut split_quads: Vec<[usize; 4]> = Vec::with_capacity(quadspos.len());
    let mut vertex_of: HashMap<(usize, usize, usize), usize> = HashMap::new();
    let mut split_positions: Vec<Vector3f> = Vec::new();
    let mut split_normals: Vec<Vector3f> = Vec::new();
    let mut split_texcoords: Vec<Vector2f> = Vec::new();
    for (fid, qpos) in quadspos.iter().enumerate() {
        let mut q = [0_usize; 4];
        for c in 0..4 {
            let key = (
                qpos[c],
                if quadsnorm.is_empty() {
                    0
                } else {
                    quadsnorm[fid][c]
                },
                if quadstexcoord.is_empty() {
                    0
                } else {
                    quadstexcoord[fid][c]
                },
            );
            let next: usize = vertex_of.len();
            let vid: usize = *vertex_of.entry(key).or_insert(next);
            if vid == split_positions.len() {
                split_positions.push(positions[key.0]);
                if !normals.is_empty() {
                    split_normals.push(normals[key.1]);
                }
                if !texcoords.is_empty() {
                    split_texcoords.push(texcoords[key.2]);
                }
            }
            q[c] = vid;
        }
        split_quads.push(q);
    }
    (split_quads, split_positions, split_normals, split_texcoords)
}

// driver

/// Tesselate one subdivision surface into its target shape: iterate the
/// refinement on positions (free boundary) and texcoords (locked
/// boundary), rebuild smooth normals, merge the face-varying topology,
/// triangulate, then displace along normals.
pub fn tesselate_surface(shape: &mut ShapeData, subdiv_: &SubdivData, textures: &[TextureData]) {
    let mut subdiv = subdiv_.clone();
    if subdiv.subdivisions != 0 {
        for _ in 0..subdiv.subdivisions {
            tesselate_catmullclark(&mut subdiv.quadspos, &mut subdiv.positions, false);
        }
        for _ in 0..subdiv.subdivisions {
            tesselate_catmullclark(&mut subdiv.quadstexcoord, &mut subdiv.texcoords, true);
        }
        if subdiv.smooth {
            subdiv.normals = quads_normals(&subdiv.quadspos, &subdiv.positions);
            subdiv.quadsnorm = subdiv.quadspos.clone();
        } else {
            subdiv.normals = Vec::new();
            subdiv.quadsnorm = Vec::new();
        }
    }

    let (quads, positions, normals, texcoords) = split_facevarying(
        &subdiv.quadspos,
        &subdiv.quadsnorm,
        &subdiv.quadstexcoord,
        &subdiv.positions,
        &subdiv.normals,
        &subdiv.texcoords,
    );
    shape.positions = positions;
    shape.normals = normals;
    shape.texcoords = texcoords;
    shape.triangles = quads_to_triangles(&quads);
    shape.quads = Vec::new();
    shape.points = Vec::new();
    shape.lines = Vec::new();
    shape.colors = Vec::new();
    shape.radius = Vec::new();

    if subdiv.displacement != 0.0 && subdiv.displacement_tex.is_some() && !shape.triangles.is_empty()
    {
        if shape.normals.is_empty() {
            shape.normals = triangles_normals(&shape.triangles, &shape.positions);
        }
        let displacement_tex = &textures[subdiv.displacement_tex.unwrap()];
        for idx in 0..shape.positions.len() {
            let texel = eval_texture(displacement_tex, &shape.texcoords[idx], true);
            let mut disp: Float = vec3_mean(&texel.xyz());
            // byte textures put the zero level at mid-grey
            if !displacement_tex.pixelsb.is_empty() {
                disp -= 0.5;
            }
            shape.positions[idx] += shape.normals[idx] * (subdiv.displacement * disp);
        }
        if subdiv.smooth {
            shape.normals = triangles_normals(&shape.triangles, &shape.positions);
        } else {
            shape.normals = Vec::new();
        }
    }
}

/// Tesselate every subdivision surface of the scene into its target shape.
pub fn tesselate_surfaces(scene: &mut crate::core::scene::SceneData) {
    let subdivs: Vec<SubdivData> = scene.subdivs.clone();
    for subdiv in &subdivs {
        let mut shape = std::mem::take(&mut scene.shapes[subdiv.shape]);
        tesselate_surface(&mut shape, subdiv, &scene.textures);
        scene.shapes[subdiv.shape] = shape;
        info!(
            "tesselated subdiv into {} triangles",
            scene.shapes[subdiv.shape].triangles.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{vec3_length, Vector4f};

    fn cube() -> (Vec<[usize; 4]>, Vec<Vector3f>) {
        let positions = vec![
            Vector3f::new(-0.5, -0.5, -0.5),
            Vector3f::new(0.5, -0.5, -0.5),
            Vector3f::new(0.5, 0.5, -0.5),
            Vector3f::new(-0.5, 0.5, -0.5),
            Vector3f::new(-0.5, -0.5, 0.5),
            Vector3f::new(0.5, -0.5, 0.5),
            Vector3f::new(0.5, 0.5, 0.5),
            Vector3f::new(-0.5, 0.5, 0.5),
        ];
        let quads = vec![
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [1, 2, 6, 5],
            [3, 0, 4, 7],
        ];
        (quads, positions)
    }

    #[test]
    fn test_edge_map_cube() {
        let (quads, _) = cube();
        let emap = make_edge_map(&quads);
        assert_eq!(emap.num_edges(), 12);
        // a closed surface has no boundary
        assert!(emap.boundary().is_empty());
    }

    #[test]
    fn test_vertex_count_recurrence() {
        // V' = V + E + F at every level
        let (mut quads, mut positions) = cube();
        for _ in 0..3 {
            let emap = make_edge_map(&quads);
            let expected: usize = positions.len() + emap.num_edges() + quads.len();
            tesselate_catmullclark(&mut quads, &mut positions, true);
            assert_eq!(positions.len(), expected);
        }
        assert_eq!(positions.len(), 386);
        assert_eq!(quads.len(), 384);
    }

    #[test]
    fn test_cube_converges_to_round_shape() {
        let (mut quads, mut positions) = cube();
        for _ in 0..3 {
            tesselate_catmullclark(&mut quads, &mut positions, true);
        }
        let radii: Vec<Float> = positions.iter().map(vec3_length).collect();
        let rmin: Float = radii.iter().cloned().fold(Float::MAX, Float::min);
        let rmax: Float = radii.iter().cloned().fold(0.0, Float::max);
        // pulled well inside the original corners and nearly spherical
        assert!(rmax < 0.75);
        assert!(rmin > 0.3);
        assert!(rmax - rmin < 0.12, "radius spread {}", rmax - rmin);
    }

    #[test]
    fn test_open_grid_boundary_lock() {
        // a single quad has four boundary edges; with the boundary locked
        // its corners never move
        let mut quads = vec![[0, 1, 2, 3]];
        let mut positions = vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(1.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ];
        tesselate_catmullclark(&mut quads, &mut positions, true);
        assert_eq!(quads.len(), 4);
        assert_eq!(positions[0], Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(positions[2], Vector3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_split_facevarying_uniques_corners() {
        let (quads, positions) = cube();
        let (squads, spositions, snormals, stexcoords) =
            split_facevarying(&quads, &[], &[], &positions, &[], &[]);
        assert_eq!(squads.len(), quads.len());
        assert_eq!(spositions.len(), positions.len());
        assert!(snormals.is_empty());
        assert!(stexcoords.is_empty());
    }

    #[test]
    fn test_quads_to_triangles_counts() {
        let (quads, _) = cube();
        assert_eq!(quads_to_triangles(&quads).len(), 12);
        // degenerate quad is a triangle
        assert_eq!(quads_to_triangles(&[[0, 1, 2, 2]]).len(), 1);
    }

    #[test]
    fn test_displacement_moves_vertices() {
        use crate::core::scene::SceneData;
        let (quads, positions) = cube();
        let mut scene = SceneData {
            shapes: vec![ShapeData::default()],
            textures: vec![crate::core::texture::make_texture_f(
                1,
                1,
                vec![Vector4f::new(1.0, 1.0, 1.0, 1.0)],
            )],
            subdivs: vec![SubdivData {
                quadspos: quads,
                positions,
                subdivisions: 1,
                smooth: true,
                displacement: 0.1,
                displacement_tex: Some(0),
                shape: 0,
                ..SubdivData::default()
            }],
            ..SceneData::default()
        };
        tesselate_surfaces(&mut scene);
        let shape = &scene.shapes[0];
        assert!(!shape.triangles.is_empty());
        // every vertex pushed outward by the constant white displacement
        let mean_radius: Float =
            shape.positions.iter().map(vec3_length).sum::<Float>() / shape.positions.len() as Float;
        assert!(mean_radius > 0.4);
    }
}
