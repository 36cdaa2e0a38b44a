//! End-to-end checks of the conditioning pipeline on small synthetic
//! primitives: attribute synthesis, vertex welding and the meshlet LOD
//! hierarchy.

use glint_forge::processor::{
    condition_primitive, MAX_MESHLET_TRIANGLES, MAX_MESHLET_VERTICES,
};
use glint_forge::scene::{Primitive, SkinnedVertex, Vertex};

fn rigid(name: &str, vertices: Vec<Vertex>, indices: Vec<u32>) -> Primitive {
    Primitive {
        name: name.to_owned(),
        vertices,
        indices,
        ..Default::default()
    }
}

/// Structural invariants every conditioned primitive must satisfy.
fn check_invariants(primitive: &Primitive) {
    assert_eq!(primitive.indices.len() % 3, 0);
    let vertex_count = primitive.vertex_count();
    assert!(primitive
        .indices
        .iter()
        .all(|&index| (index as usize) < vertex_count));

    for meshlet in &primitive.meshlets {
        assert!(meshlet.vertex_count as usize <= MAX_MESHLET_VERTICES);
        assert!(meshlet.triangle_count() as usize <= MAX_MESHLET_TRIANGLES);
        assert_eq!(meshlet.index_count % 3, 0);
        assert!(
            (meshlet.vertex_offset + meshlet.vertex_count) as usize
                <= primitive.meshlet_vertex_indices.len()
        );
        assert!(
            (meshlet.index_offset + meshlet.index_count) as usize
                <= primitive.meshlet_indices.len()
        );
        for i in 0..meshlet.index_count {
            let local = primitive.meshlet_indices[(meshlet.index_offset + i) as usize];
            assert!((local as u32) < meshlet.vertex_count);
        }
        for i in 0..meshlet.vertex_count {
            let global = primitive.meshlet_vertex_indices[(meshlet.vertex_offset + i) as usize];
            assert!((global as usize) < vertex_count);
        }
    }

    // coarser levels always come after finer ones
    for pair in primitive.meshlets.windows(2) {
        assert!(pair[0].lod <= pair[1].lod);
    }
}

#[test]
fn unit_triangle_without_attributes() {
    let mut primitive = rigid(
        "triangle",
        vec![
            Vertex {
                position: [0.0, 0.0, 0.0],
                ..Default::default()
            },
            Vertex {
                position: [1.0, 0.0, 0.0],
                ..Default::default()
            },
            Vertex {
                position: [0.0, 1.0, 0.0],
                ..Default::default()
            },
        ],
        vec![0, 1, 2],
    );
    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    assert_eq!(primitive.vertices.len(), 3);
    assert_eq!(primitive.indices, vec![0, 1, 2]);
    assert_eq!(primitive.meshlets.len(), 1);
    assert_eq!(primitive.meshlets[0].lod, 0);
    assert_eq!(primitive.meshlets[0].index_count, 3);
    assert_eq!(primitive.meshlets[0].vertex_count, 3);

    for vertex in &primitive.vertices {
        let normal = glam::Vec3::from(vertex.normal);
        assert!((normal - glam::Vec3::Z).length() < 1e-5, "normal {normal}");
        // no UVs means the repair pass assigns the first edge as tangent
        assert_eq!(vertex.tangent, [1.0, 0.0, 0.0, 1.0]);
    }
    assert!(primitive.had_normals && primitive.had_tangents && primitive.had_tex_coords);
}

#[test]
fn quad_with_normals_and_uvs() {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    let mut primitive = rigid(
        "quad",
        positions
            .iter()
            .map(|&position| Vertex {
                position,
                normal: [0.0, 0.0, 1.0],
                uv: [position[0], position[1]],
                ..Default::default()
            })
            .collect(),
        vec![0, 1, 2, 0, 2, 3],
    );
    primitive.had_normals = true;
    primitive.had_tex_coords = true;

    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    assert_eq!(primitive.vertices.len(), 4);
    assert_eq!(primitive.indices.len(), 6);
    assert_eq!(primitive.meshlets.len(), 1);
    assert_eq!(primitive.meshlets[0].lod, 0);

    // conditioning again must reproduce the exact same output
    let once = primitive.clone();
    condition_primitive(&mut primitive);
    assert_eq!(primitive.vertices, once.vertices);
    assert_eq!(primitive.indices, once.indices);
    assert_eq!(primitive.meshlets, once.meshlets);
    assert_eq!(primitive.meshlet_vertex_indices, once.meshlet_vertex_indices);
    assert_eq!(primitive.meshlet_indices, once.meshlet_indices);
}

fn cube_with_duplicated_face_vertices() -> Primitive {
    // 6 faces x 4 vertex records; per-face normals keep the records apart
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corner_uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for (face, &(normal, tangent, bitangent)) in faces.iter().enumerate() {
        let normal_v = glam::Vec3::from(normal);
        let tangent_v = glam::Vec3::from(tangent);
        let bitangent_v = glam::Vec3::from(bitangent);
        let base = (face * 4) as u32;
        for (corner, &uv) in corner_uvs.iter().enumerate() {
            let s = [-0.5, 0.5, 0.5, -0.5][corner];
            let t = [-0.5, -0.5, 0.5, 0.5][corner];
            let position = normal_v * 0.5 + tangent_v * s + bitangent_v * t;
            vertices.push(Vertex {
                position: position.to_array(),
                normal,
                tangent: [tangent[0], tangent[1], tangent[2], 1.0],
                uv,
                color: [1.0, 1.0, 1.0],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut primitive = rigid("cube", vertices, indices);
    primitive.had_normals = true;
    primitive.had_tangents = true;
    primitive.had_tex_coords = true;
    primitive
}

#[test]
fn cube_keeps_per_face_vertices() {
    let mut primitive = cube_with_duplicated_face_vertices();
    let source_vertices = primitive.vertices.clone();

    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    // different normals per face prevent any merge across faces
    assert_eq!(primitive.vertices.len(), 24);
    assert_eq!(primitive.indices.len(), 36);
    assert_eq!(primitive.meshlets.len(), 1);
    assert_eq!(primitive.meshlets[0].lod, 0);

    // the set of unique attribute tuples is untouched by the round trip
    let key = |vertex: &Vertex| -> [u32; 15] { bytemuck::cast(*vertex) };
    let mut before: Vec<[u32; 15]> = source_vertices.iter().map(key).collect();
    let mut after: Vec<[u32; 15]> = primitive.vertices.iter().map(key).collect();
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after);
}

fn grid_primitive(side: usize) -> Primitive {
    let mut vertices = Vec::new();
    for y in 0..=side {
        for x in 0..=side {
            vertices.push(Vertex {
                position: [x as f32, y as f32, 0.0],
                normal: [0.0, 0.0, 1.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                color: [1.0, 1.0, 1.0],
                uv: [x as f32 / side as f32, y as f32 / side as f32],
            });
        }
    }
    let mut indices = Vec::new();
    let stride = (side + 1) as u32;
    for y in 0..side as u32 {
        for x in 0..side as u32 {
            let corner = y * stride + x;
            indices.extend_from_slice(&[corner, corner + 1, corner + stride]);
            indices.extend_from_slice(&[corner + 1, corner + stride + 1, corner + stride]);
        }
    }
    let mut primitive = rigid("grid", vertices, indices);
    primitive.had_normals = true;
    primitive.had_tangents = true;
    primitive.had_tex_coords = true;
    primitive
}

#[test]
fn dense_grid_builds_a_hierarchy() {
    let mut primitive = grid_primitive(64);
    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    let max_lod = primitive
        .meshlets
        .iter()
        .map(|meshlet| meshlet.lod)
        .max()
        .unwrap();
    assert!(max_lod >= 1, "expected at least one simplified level");

    // each level must shrink the meshlet count
    let mut per_level = vec![0usize; (max_lod + 1) as usize];
    for meshlet in &primitive.meshlets {
        per_level[meshlet.lod as usize] += 1;
    }
    assert!(per_level[0] >= 8);
    for pair in per_level.windows(2) {
        assert!(pair[1] < pair[0], "levels were {per_level:?}");
    }
}

#[test]
fn conditioning_is_idempotent_on_a_dense_grid() {
    let mut primitive = grid_primitive(32);
    condition_primitive(&mut primitive);
    let once = primitive.clone();

    condition_primitive(&mut primitive);
    assert_eq!(primitive.vertices, once.vertices);
    assert_eq!(primitive.indices, once.indices);
    assert_eq!(primitive.meshlets, once.meshlets);
    assert_eq!(primitive.meshlet_vertex_indices, once.meshlet_vertex_indices);
    assert_eq!(primitive.meshlet_indices, once.meshlet_indices);
}

#[test]
fn degenerate_triangle_survives_the_pipeline() {
    // a triangle that references the same vertex twice
    let mut primitive = rigid(
        "degenerate",
        vec![
            Vertex {
                position: [0.0, 0.0, 0.0],
                ..Default::default()
            },
            Vertex {
                position: [1.0, 0.0, 0.0],
                ..Default::default()
            },
        ],
        vec![0, 0, 1],
    );
    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    // preserved at full resolution
    assert_eq!(primitive.indices.len(), 3);
    assert_eq!(primitive.meshlets.len(), 1);
}

#[test]
fn skinned_quad_keeps_bone_data() {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    let mut primitive = Primitive {
        name: "skinned quad".to_owned(),
        is_skinned: true,
        skinned_vertices: positions
            .iter()
            .enumerate()
            .map(|(i, &position)| SkinnedVertex {
                position,
                uv: [position[0], position[1]],
                bone_ids: [i as u32, 0, 0, 0],
                bone_weights: [1.0, 0.0, 0.0, 0.0],
                ..Default::default()
            })
            .collect(),
        indices: vec![0, 1, 2, 0, 2, 3],
        had_tex_coords: true,
        ..Default::default()
    };

    condition_primitive(&mut primitive);
    check_invariants(&primitive);

    assert!(primitive.vertices.is_empty());
    assert_eq!(primitive.skinned_vertices.len(), 4);
    assert_eq!(primitive.meshlets.len(), 1);
    let mut bone_ids: Vec<u32> = primitive
        .skinned_vertices
        .iter()
        .map(|vertex| vertex.bone_ids[0])
        .collect();
    bone_ids.sort_unstable();
    assert_eq!(bone_ids, vec![0, 1, 2, 3]);
}
