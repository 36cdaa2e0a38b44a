use glam::{Vec3, Vec4, Vec4Swizzles};

use super::expand::{ExpandedMesh, ExpandedVertex};
use super::{COLLINEARITY_TOLERANCE, DEGENERATE_EDGE_TOLERANCE};

/// Assign per-face normals to every corner. Each corner uses the cross
/// product of its own two edges so a degenerate edge only zeroes the
/// corners it touches.
pub fn generate_flat_normals(mesh: &mut ExpandedMesh) {
    for (face, corners) in mesh.vertices.chunks_exact_mut(3).enumerate() {
        let a = Vec3::from(corners[0].vertex.position);
        let b = Vec3::from(corners[1].vertex.position);
        let c = Vec3::from(corners[2].vertex.position);

        let ab = b - a;
        let bc = c - b;
        let ac = c - a;

        if ab.length_squared() <= DEGENERATE_EDGE_TOLERANCE
            || bc.length_squared() <= DEGENERATE_EDGE_TOLERANCE
            || ac.length_squared() <= DEGENERATE_EDGE_TOLERANCE
        {
            log::warn!("degenerate triangle (face = {face})");
        }

        corners[0].vertex.normal = ab.cross(ac).normalize_or_zero().to_array();
        corners[1].vertex.normal = bc.cross(-ab).normalize_or_zero().to_array();
        corners[2].vertex.normal = (-ac).cross(-bc).normalize_or_zero().to_array();
    }
}

struct TangentMesh<'a>(&'a mut [ExpandedVertex]);

impl mikktspace::Geometry for TangentMesh<'_> {
    fn num_faces(&self) -> usize {
        self.0.len() / 3
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.0[face * 3 + vert].vertex.position
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.0[face * 3 + vert].vertex.normal
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.0[face * 3 + vert].vertex.uv
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        self.0[face * 3 + vert].vertex.tangent = tangent;
    }
}

/// Run MikkTSpace over the expanded soup. Failure is not fatal; the
/// cleanup pass repairs whatever is left.
pub fn generate_tangent_space(mesh: &mut ExpandedMesh, name: &str) {
    let mut geometry = TangentMesh(&mut mesh.vertices);
    if !mikktspace::generate_tangents(&mut geometry) {
        log::error!("could not generate tangents for mesh {name}");
    }
}

fn is_close_to_collinear(normal: Vec3, tangent: Vec3) -> bool {
    let rejected = tangent - normal.dot(tangent) * normal;
    rejected
        .abs()
        .cmplt(Vec3::splat(COLLINEARITY_TOLERANCE))
        .all()
}

/// If tangents came out collinear with their normals, make each tangent
/// follow an edge of its triangle instead. This happens when MikkTSpace
/// runs with no usable UV mapping (here or in authoring tools).
pub fn cleanup_tangents(mesh: &mut ExpandedMesh) {
    assert!(
        mesh.vertices.len() % 3 == 0,
        "only triangle meshes are supported"
    );

    let mut needs_regeneration = false;
    'detect: for corners in mesh.vertices.chunks_exact(3) {
        for corner in corners {
            let normal = Vec3::from(corner.vertex.normal);
            let tangent = Vec4::from(corner.vertex.tangent).xyz();
            if !tangent.is_finite() || is_close_to_collinear(normal, tangent) {
                needs_regeneration = true;
                break 'detect;
            }
        }
        // a triangle mapped to a single UV point has no tangent basis at all
        let uv = corners[0].vertex.uv;
        if corners[1].vertex.uv == uv && corners[2].vertex.uv == uv {
            needs_regeneration = true;
            break 'detect;
        }
    }
    if !needs_regeneration {
        return;
    }

    log::warn!("found collinear or degenerate tangents (maybe due to missing UV mapping), generating basic tangents");
    for corners in mesh.vertices.chunks_exact_mut(3) {
        let edge = Vec3::from(corners[1].vertex.position) - Vec3::from(corners[0].vertex.position);
        let tangent = edge.normalize_or_zero();
        for corner in corners {
            // the +1 handedness carries no meaning beyond being non-zero
            corner.vertex.tangent = [tangent.x, tangent.y, tangent.z, 1.0];
        }
    }
}
