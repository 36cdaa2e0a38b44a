use rayon::prelude::*;

use crate::scene::{Primitive, Scene};

mod attributes;
mod collapse;
mod expand;
mod grouper;
mod hierarchy;
mod meshlet;

pub use attributes::{cleanup_tangents, generate_flat_normals, generate_tangent_space};
pub use collapse::collapse_into_primitive;
pub use expand::{expand_primitive, ExpandedMesh, ExpandedVertex};
pub use grouper::{group_meshlets, MeshletGroup};
pub use hierarchy::{build_cluster_hierarchy, MAX_LOD};
pub use meshlet::append_meshlets;

pub const MAX_MESHLET_VERTICES: usize = 64;
pub const MAX_MESHLET_TRIANGLES: usize = 128;
/// Cone culling bias for the meshlet builder, currently unused.
pub const MESHLET_CONE_WEIGHT: f32 = 0.0;

/// Two vertices collapse into one when every attribute component differs
/// by less than this.
pub const SIMILARITY_TOLERANCE: f32 = 1e-6;
/// A tangent whose rejection against its normal is below this in every
/// component is considered collinear and gets regenerated.
pub const COLLINEARITY_TOLERANCE: f32 = 1e-12;
/// Squared edge length below which a triangle edge counts as degenerate.
pub const DEGENERATE_EDGE_TOLERANCE: f32 = 1e-16;

/// Condition every primitive of the scene. Primitives are independent, so
/// they are processed in parallel; the stages within one primitive are
/// strictly sequential.
pub fn process_scene(scene: &mut Scene) {
    let primitives: Vec<&mut Primitive> = scene.primitives_mut().collect();
    primitives
        .into_par_iter()
        .for_each(|primitive| condition_primitive(primitive));
}

/// Run the full conditioning pipeline on one primitive: rebuild the
/// triangle soup, synthesize missing attributes, weld vertices back into
/// an indexed mesh and emit the meshlet LOD hierarchy.
pub fn condition_primitive(primitive: &mut Primitive) {
    if primitive.indices.is_empty() {
        log::warn!("mesh {} has no triangles, skipping", primitive.name);
        return;
    }
    assert!(
        primitive.indices.len() % 3 == 0,
        "mesh {} index count is not a multiple of 3",
        primitive.name
    );

    let mut expanded = expand_primitive(primitive);

    if !primitive.had_normals {
        log::info!("mesh {} has no normals, generating flat normals", primitive.name);
        generate_flat_normals(&mut expanded);
    }
    if !primitive.had_tangents {
        log::info!("mesh {} has no tangents, generating tangents", primitive.name);
        generate_tangent_space(&mut expanded, &primitive.name);
    }
    cleanup_tangents(&mut expanded);

    collapse_into_primitive(primitive, expanded);
    build_cluster_hierarchy(primitive);

    // every attribute is materialized in the output now
    primitive.had_normals = true;
    primitive.had_tangents = true;
    primitive.had_tex_coords = true;
}
