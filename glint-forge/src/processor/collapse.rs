use crate::scene::{Primitive, SkinnedVertex};

use super::expand::ExpandedMesh;
use super::SIMILARITY_TOLERANCE;

fn similar(a: &[f32], b: &[f32]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - y).abs() < SIMILARITY_TOLERANCE)
}

fn are_same_vertices(a: &SkinnedVertex, b: &SkinnedVertex) -> bool {
    similar(&a.position, &b.position)
        && similar(&a.normal, &b.normal)
        && similar(&a.tangent, &b.tangent)
        && similar(&a.uv, &b.uv)
        && similar(&a.color, &b.color)
        && similar(&a.bone_weights, &b.bone_weights)
        && a.bone_ids == b.bone_ids
}

/// Re-index the expanded soup, replacing the primitive's vertex and index
/// buffers. Corners that came from the same source vertex and still carry
/// the same attributes share one output vertex.
pub fn collapse_into_primitive(primitive: &mut Primitive, mut mesh: ExpandedMesh) {
    primitive.vertices.clear();
    primitive.skinned_vertices.clear();
    primitive.indices.clear();

    let mut next_index: u32 = 0;
    for corner in 0..mesh.vertices.len() {
        assert!(
            mesh.vertices[corner].new_index.is_none(),
            "corner must not already have an index in the collapsed mesh"
        );

        // reuse a sibling that is already in the vertex buffer and still
        // matches this corner component-wise
        let mut index_to_reuse = None;
        for &sibling in &mesh.duplicated_vertices[mesh.vertices[corner].original_index as usize] {
            let sibling = &mesh.vertices[sibling as usize];
            let Some(new_index) = sibling.new_index else {
                continue;
            };
            if are_same_vertices(&sibling.vertex, &mesh.vertices[corner].vertex) {
                index_to_reuse = Some(new_index);
                break;
            }
        }

        if let Some(index) = index_to_reuse {
            primitive.indices.push(index);
        } else {
            mesh.vertices[corner].new_index = Some(next_index);
            primitive.indices.push(next_index);
            next_index += 1;
            if primitive.is_skinned {
                primitive.skinned_vertices.push(mesh.vertices[corner].vertex);
            } else {
                primitive
                    .vertices
                    .push(mesh.vertices[corner].vertex.to_rigid());
            }
        }
    }
}
