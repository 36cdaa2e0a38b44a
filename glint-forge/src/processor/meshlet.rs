use meshopt::VertexDataAdapter;
use rayon::prelude::*;

use crate::scene::{Meshlet, Primitive};

use super::{MAX_MESHLET_TRIANGLES, MAX_MESHLET_VERTICES, MESHLET_CONE_WEIGHT};

/// Tile sizes for the data-parallel buffer appends; each chunk writes a
/// disjoint range so execution order does not matter.
const COPY_TILE: usize = 1024;
const METADATA_TILE: usize = 32;

/// Split `index_buffer` into meshlets and append them, with their vertex
/// and triangle data, to the primitive's shared meshlet arrays. New
/// meshlets are tagged with lod 0; the hierarchy loop re-tags coarser
/// levels after the fact.
pub fn append_meshlets(primitive: &mut Primitive, index_buffer: &[u32]) {
    if index_buffer.is_empty() {
        return;
    }

    // the builder result is already trimmed to the sizes implied by its
    // last meshlet (triangle bytes padded to a multiple of 4)
    let built = {
        let (bytes, stride) = primitive.position_data();
        let positions = VertexDataAdapter::new(bytes, stride, 0)
            .expect("vertex buffer carries a position stream at offset 0");
        meshopt::build_meshlets(
            index_buffer,
            &positions,
            MAX_MESHLET_VERTICES,
            MAX_MESHLET_TRIANGLES,
            MESHLET_CONE_WEIGHT,
        )
    };

    let vertex_base = primitive.meshlet_vertex_indices.len();
    let index_base = primitive.meshlet_indices.len();
    primitive
        .meshlet_vertex_indices
        .resize(vertex_base + built.vertices.len(), 0);
    primitive
        .meshlet_indices
        .resize(index_base + built.triangles.len(), 0);

    primitive.meshlet_vertex_indices[vertex_base..]
        .par_chunks_mut(COPY_TILE)
        .zip(built.vertices.par_chunks(COPY_TILE))
        .for_each(|(dst, src)| dst.copy_from_slice(src));
    primitive.meshlet_indices[index_base..]
        .par_chunks_mut(COPY_TILE)
        .zip(built.triangles.par_chunks(COPY_TILE))
        .for_each(|(dst, src)| dst.copy_from_slice(src));

    let appended: Vec<Meshlet> = built
        .meshlets
        .par_iter()
        .with_min_len(METADATA_TILE)
        .map(|meshlet| Meshlet {
            vertex_offset: vertex_base as u32 + meshlet.vertex_offset,
            vertex_count: meshlet.vertex_count,
            index_offset: index_base as u32 + meshlet.triangle_offset,
            index_count: meshlet.triangle_count * 3,
            lod: 0,
        })
        .collect();
    primitive.meshlets.extend(appended);
}
