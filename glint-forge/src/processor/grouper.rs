use std::collections::HashMap;

use crate::scene::Primitive;

/// Meshlets to simplify together, identified by their index within the
/// level range handed to [`group_meshlets`].
#[derive(Clone, Debug)]
pub struct MeshletGroup {
    pub meshlets: Vec<usize>,
}

/// A triangle edge in primitive-global vertex space, canonicalized so the
/// smaller index comes first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct MeshletEdge(u32, u32);

impl MeshletEdge {
    fn new(a: u32, b: u32) -> Self {
        Self(a.min(b), a.max(b))
    }
}

/// Partition the meshlets from `first_meshlet` to the end of the
/// primitive's meshlet list into groups of roughly four, such that
/// meshlets sharing triangle edges land in the same group. The group
/// borders are what the simplifier later locks.
pub fn group_meshlets(primitive: &Primitive, first_meshlet: usize) -> Vec<MeshletGroup> {
    let meshlets = &primitive.meshlets[first_meshlet..];
    let single_group = || {
        vec![MeshletGroup {
            meshlets: (0..meshlets.len()).collect(),
        }]
    };
    if meshlets.len() < 8 {
        return single_group();
    }

    let mut edges_to_meshlets: HashMap<MeshletEdge, Vec<usize>> = HashMap::new();
    let mut meshlets_to_edges: Vec<Vec<MeshletEdge>> = vec![Vec::new(); meshlets.len()];
    for (meshlet_index, meshlet) in meshlets.iter().enumerate() {
        let global_vertex = |local: usize| {
            let slot = primitive.meshlet_indices[meshlet.index_offset as usize + local];
            primitive.meshlet_vertex_indices[(meshlet.vertex_offset + slot as u32) as usize]
        };
        for triangle in 0..meshlet.triangle_count() as usize {
            for i in 0..3 {
                let edge = MeshletEdge::new(
                    global_vertex(triangle * 3 + i),
                    global_vertex(triangle * 3 + (i + 1) % 3),
                );
                let users = edges_to_meshlets.entry(edge).or_default();
                // meshlets are visited in order, so one check both dedups
                // and keeps the list sorted
                if users.last() != Some(&meshlet_index) {
                    users.push(meshlet_index);
                }
                meshlets_to_edges[meshlet_index].push(edge);
            }
        }
    }

    // edges interior to one meshlet do not connect anything
    edges_to_meshlets.retain(|_, users| users.len() > 1);
    if edges_to_meshlets.is_empty() {
        return single_group();
    }

    let nparts = (meshlets.len() / 4) as i32;
    assert!(nparts > 1, "partitioning needs at least 2 parts");

    // CSR adjacency: each window lists every distinct neighbor once
    let mut xadj: Vec<i32> = Vec::with_capacity(meshlets.len() + 1);
    let mut adjncy: Vec<i32> = Vec::new();
    for (meshlet_index, edges) in meshlets_to_edges.iter().enumerate() {
        let first = adjncy.len();
        xadj.push(first as i32);
        for edge in edges {
            let Some(users) = edges_to_meshlets.get(edge) else {
                continue;
            };
            for &other in users {
                if other != meshlet_index && !adjncy[first..].contains(&(other as i32)) {
                    adjncy.push(other as i32);
                }
            }
        }
    }
    xadj.push(adjncy.len() as i32);

    let mut partition = vec![0i32; meshlets.len()];
    metis::Graph::new(1, nparts, &xadj, &adjncy)
        .expect("meshlet adjacency is a valid graph")
        .part_kway(&mut partition)
        .expect("graph partitioning failed");

    let mut groups: Vec<MeshletGroup> = (0..nparts)
        .map(|_| MeshletGroup {
            meshlets: Vec::new(),
        })
        .collect();
    for (meshlet_index, &part) in partition.iter().enumerate() {
        groups[part as usize].meshlets.push(meshlet_index);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Meshlet, Vertex};

    /// A primitive whose meshlets each hold one triangle over the global
    /// vertices `first..first + 3`, so consecutive meshlets share an edge
    /// when their windows overlap.
    fn strip_primitive(meshlet_count: usize, overlap: bool) -> Primitive {
        let step = if overlap { 1 } else { 3 };
        let vertex_count = (meshlet_count - 1) * step + 3;
        let mut primitive = Primitive {
            name: "strip".to_owned(),
            vertices: vec![Vertex::default(); vertex_count],
            ..Default::default()
        };
        for i in 0..meshlet_count {
            let first = (i * step) as u32;
            primitive.meshlets.push(Meshlet {
                vertex_offset: primitive.meshlet_vertex_indices.len() as u32,
                vertex_count: 3,
                index_offset: primitive.meshlet_indices.len() as u32,
                index_count: 3,
                lod: 0,
            });
            primitive
                .meshlet_vertex_indices
                .extend([first, first + 1, first + 2]);
            primitive.meshlet_indices.extend([0, 1, 2, 0]);
        }
        primitive
    }

    #[test]
    fn short_ranges_become_one_group() {
        let primitive = strip_primitive(7, true);
        let groups = group_meshlets(&primitive, 0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].meshlets, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn disconnected_meshlets_fall_back_to_one_group() {
        let primitive = strip_primitive(9, false);
        let groups = group_meshlets(&primitive, 0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].meshlets.len(), 9);
    }

    #[test]
    fn connected_meshlets_are_partitioned() {
        let primitive = strip_primitive(8, true);
        let groups = group_meshlets(&primitive, 0);

        assert_eq!(groups.len(), 2);
        let mut seen: Vec<usize> = groups
            .iter()
            .flat_map(|group| group.meshlets.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn grouping_honors_the_range_start() {
        let primitive = strip_primitive(10, true);
        // only the last 4 meshlets belong to the level under grouping
        let groups = group_meshlets(&primitive, 6);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].meshlets, vec![0, 1, 2, 3]);
    }
}
