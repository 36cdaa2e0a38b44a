use serde::{Deserialize, Serialize};

use super::meshlet::Meshlet;
use super::vertex::{SkinnedVertex, Vertex};

/// The unit of conditioning: one indexed triangle list plus the meshlet
/// hierarchy generated for it. Exactly one of `vertices` /
/// `skinned_vertices` is populated, selected by `is_skinned`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Primitive {
    pub name: String,
    pub material_index: Option<u32>,
    pub is_skinned: bool,
    pub vertices: Vec<Vertex>,
    pub skinned_vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    /// Which attributes were actually present on disk. When a flag is
    /// false the conditioner synthesizes the attribute.
    pub had_normals: bool,
    pub had_tangents: bool,
    pub had_tex_coords: bool,
    pub meshlets: Vec<Meshlet>,
    /// Meshlet-local vertex slot -> index into the primitive vertex buffer.
    pub meshlet_vertex_indices: Vec<u32>,
    /// Meshlet-local triangle corners, three per triangle.
    pub meshlet_indices: Vec<u8>,
}

impl Primitive {
    pub fn vertex_count(&self) -> usize {
        if self.is_skinned {
            self.skinned_vertices.len()
        } else {
            self.vertices.len()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes and stride; the position stream sits at offset 0
    /// of either layout.
    pub(crate) fn position_data(&self) -> (&[u8], usize) {
        if self.is_skinned {
            (
                bytemuck::cast_slice(&self.skinned_vertices),
                std::mem::size_of::<SkinnedVertex>(),
            )
        } else {
            (
                bytemuck::cast_slice(&self.vertices),
                std::mem::size_of::<Vertex>(),
            )
        }
    }
}
