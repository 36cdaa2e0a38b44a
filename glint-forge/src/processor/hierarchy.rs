use meshopt::{SimplifyOptions, VertexDataAdapter};

use crate::scene::Primitive;

use super::grouper::{group_meshlets, MeshletGroup};
use super::meshlet::append_meshlets;

/// Hard cap on the number of simplification levels.
pub const MAX_LOD: u32 = 25;
/// Each level targets half the previous level's index count.
const SIMPLIFY_TARGET_RATIO: f32 = 0.5;

/// Concatenate the triangles of a group's meshlets, translated back into
/// primitive-global vertex indices.
fn gather_group_indices(
    primitive: &Primitive,
    first_meshlet: usize,
    group: &MeshletGroup,
) -> Vec<u32> {
    let mut group_indices = Vec::new();
    for &meshlet_index in &group.meshlets {
        let meshlet = &primitive.meshlets[first_meshlet + meshlet_index];
        group_indices.reserve(meshlet.index_count as usize);
        for i in 0..meshlet.index_count {
            let slot = primitive.meshlet_indices[(meshlet.index_offset + i) as usize];
            group_indices
                .push(primitive.meshlet_vertex_indices[(meshlet.vertex_offset + slot as u32) as usize]);
        }
    }
    group_indices
}

/// Simplify one group with its border locked; the border is the seam
/// shared with neighboring groups at this level and must stay stitchable.
fn simplify_group(primitive: &Primitive, group_indices: &[u32], lod: u32) -> Vec<u32> {
    let t = lod as f32 / MAX_LOD as f32;
    let target_index_count = (group_indices.len() as f32 * SIMPLIFY_TARGET_RATIO) as usize;
    let target_error = 0.9 * t + 0.01 * (1.0 - t);

    let (bytes, stride) = primitive.position_data();
    let positions = VertexDataAdapter::new(bytes, stride, 0)
        .expect("vertex buffer carries a position stream at offset 0");
    let mut simplification_error = 0.0;
    meshopt::simplify(
        group_indices,
        &positions,
        target_index_count,
        target_error,
        SimplifyOptions::LockBorder,
        Some(&mut simplification_error),
    )
}

/// Build the multi-level meshlet hierarchy for a conditioned primitive:
/// emit the full resolution clusters, then repeatedly group, simplify and
/// re-emit until the mesh stops shrinking.
pub fn build_cluster_hierarchy(primitive: &mut Primitive) {
    primitive.meshlets.clear();
    primitive.meshlet_vertex_indices.clear();
    primitive.meshlet_indices.clear();

    // level 0 covers the primitive's own index buffer
    let index_buffer = std::mem::take(&mut primitive.indices);
    append_meshlets(primitive, &index_buffer);
    primitive.indices = index_buffer;

    let mut previous_meshlets_start = 0;
    for lod in 0..MAX_LOD {
        if primitive.meshlets.len() - previous_meshlets_start <= 1 {
            return;
        }

        let groups = group_meshlets(primitive, previous_meshlets_start);

        let new_meshlets_start = primitive.meshlets.len();
        for group in &groups {
            // the partitioner is allowed to emit empty parts
            if group.meshlets.is_empty() {
                continue;
            }

            let group_indices = gather_group_indices(primitive, previous_meshlets_start, group);
            let simplified = simplify_group(primitive, &group_indices, lod);
            if simplified.len() == group_indices.len() {
                // could not simplify this group any further
                continue;
            }

            append_meshlets(primitive, &simplified);
        }

        if new_meshlets_start == primitive.meshlets.len() {
            // no group made progress, the hierarchy is finished
            return;
        }
        for meshlet in &mut primitive.meshlets[new_meshlets_start..] {
            meshlet.lod = lod + 1;
        }
        previous_meshlets_start = new_meshlets_start;
    }
}
