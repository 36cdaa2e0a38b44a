use crate::scene::{Primitive, SkinnedVertex};

/// One triangle corner of the expanded soup. Rigid vertices travel
/// through the skinned layout with zeroed bone fields so the pipeline
/// has a single working type.
#[derive(Clone, Debug)]
pub struct ExpandedVertex {
    pub vertex: SkinnedVertex,
    /// Index into the source vertex buffer this corner was copied from.
    pub original_index: u32,
    /// Index in the collapsed vertex buffer, assigned during collapse.
    pub new_index: Option<u32>,
}

/// The un-indexed form of a primitive: one vertex copy per triangle
/// corner, plus the reverse mapping from source vertex to the corners
/// that referenced it.
#[derive(Debug, Default)]
pub struct ExpandedMesh {
    pub vertices: Vec<ExpandedVertex>,
    pub duplicated_vertices: Vec<Vec<u32>>,
}

/// Undo indexing: separate the vertex data for each face, otherwise
/// per-corner attribute generation would bleed across shared vertices.
pub fn expand_primitive(primitive: &Primitive) -> ExpandedMesh {
    let vertex_count = primitive.vertex_count();
    let mut expanded = ExpandedMesh {
        vertices: Vec::with_capacity(primitive.indices.len()),
        duplicated_vertices: vec![Vec::new(); vertex_count],
    };

    for (corner, &index) in primitive.indices.iter().enumerate() {
        assert!(
            (index as usize) < vertex_count,
            "mesh {} references vertex {index} out of {vertex_count}",
            primitive.name
        );
        let vertex = if primitive.is_skinned {
            primitive.skinned_vertices[index as usize]
        } else {
            primitive.vertices[index as usize].into()
        };
        expanded.vertices.push(ExpandedVertex {
            vertex,
            original_index: index,
            new_index: None,
        });
        expanded.duplicated_vertices[index as usize].push(corner as u32);
    }

    expanded
}
