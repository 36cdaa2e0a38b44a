use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One cluster of the LOD hierarchy. Offsets index into the owning
/// primitive's shared `meshlet_vertex_indices` / `meshlet_indices` arrays.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Meshlet {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    /// 3 x triangle count.
    pub index_count: u32,
    /// Hierarchy level, 0 for the full resolution clusters.
    pub lod: u32,
}

impl Meshlet {
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}
