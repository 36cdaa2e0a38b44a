use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One rigid vertex, laid out exactly as the GPU buffer expects it.
/// `tangent.w` is the bitangent handedness sign (+1 or -1).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

/// A vertex with skinning data. Bone weights are non-negative and sum to ~1.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub color: [f32; 3],
    pub uv: [f32; 2],
    pub bone_ids: [u32; 4],
    pub bone_weights: [f32; 4],
}

impl From<Vertex> for SkinnedVertex {
    fn from(vertex: Vertex) -> Self {
        Self {
            position: vertex.position,
            normal: vertex.normal,
            tangent: vertex.tangent,
            color: vertex.color,
            uv: vertex.uv,
            bone_ids: [0; 4],
            bone_weights: [0.0; 4],
        }
    }
}

impl SkinnedVertex {
    pub fn to_rigid(self) -> Vertex {
        Vertex {
            position: self.position,
            normal: self.normal,
            tangent: self.tangent,
            color: self.color,
            uv: self.uv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 60);
        assert_eq!(std::mem::size_of::<SkinnedVertex>(), 92);
    }
}
