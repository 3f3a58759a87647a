// Rewrites the in-memory {parent, left, right} binary tree into the
// on-disk {parent, firstChild, escape} layout stackless GPU traversal
// expects, via a single pre-order DFS. Root lands at index 0; the
// high bit of `first_child` marks a leaf child, same convention as the
// in-memory pool's `left` field.
use crate::bvh::BoundingVolume;
use crate::memory::pool::{LeafIndex, NodePool, LEAF_BIT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskNode {
    pub parent: u32,
    pub first_child: u32,
    pub escape: u32,
}

// No node after the root's whole subtree: this sentinel closes off
// traversal once the escape chain bottoms out.
pub const NO_ESCAPE: u32 = u32::MAX;

pub fn flatten<Bv: BoundingVolume + Copy>(
    nodes: &NodePool<Bv>,
    root: u32,
) -> (Vec<DiskNode>, Vec<Bv>) {
    let mut sizes = vec![0u32; nodes.len()];
    compute_sizes(nodes, root, &mut sizes);

    let total = sizes[root as usize] as usize;
    let mut out_nodes = Vec::with_capacity(total);
    let mut out_bounds = Vec::with_capacity(total);
    place(nodes, &sizes, root, NO_ESCAPE, NO_ESCAPE, &mut out_nodes, &mut out_bounds);
    (out_nodes, out_bounds)
}

fn compute_sizes<Bv: BoundingVolume + Copy>(nodes: &NodePool<Bv>, idx: u32, sizes: &mut [u32]) -> u32 {
    let node = nodes.node(idx);
    let size = if node.left & LEAF_BIT != 0 {
        1
    } else {
        1 + compute_sizes(nodes, node.left, sizes) + compute_sizes(nodes, node.right, sizes)
    };
    sizes[idx as usize] = size;
    size
}

fn place<Bv: BoundingVolume + Copy>(
    nodes: &NodePool<Bv>,
    sizes: &[u32],
    mem_idx: u32,
    parent_disk: u32,
    escape_disk: u32,
    out_nodes: &mut Vec<DiskNode>,
    out_bounds: &mut Vec<Bv>,
) {
    let my_pos = out_nodes.len() as u32;
    out_nodes.push(DiskNode {
        parent: parent_disk,
        first_child: 0,
        escape: escape_disk,
    });
    out_bounds.push(nodes.bound(mem_idx as usize));

    let node = nodes.node(mem_idx);
    if node.left & LEAF_BIT != 0 {
        out_nodes[my_pos as usize].first_child = node.left;
        return;
    }

    out_nodes[my_pos as usize].first_child = my_pos + 1;
    let left_size = sizes[node.left as usize];
    let right_escape = my_pos + 1 + left_size;

    place(nodes, sizes, node.left, my_pos, right_escape, out_nodes, out_bounds);
    place(nodes, sizes, node.right, my_pos, escape_disk, out_nodes, out_bounds);
}

pub fn leaf_index(first_child: u32) -> Option<LeafIndex> {
    if first_child & LEAF_BIT != 0 {
        Some(first_child & !LEAF_BIT)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::build::kdtree;
    use crate::bvh::fit::AABoxEngine;
    use crate::geometry::{GeometryStore, TriangleIndex, Vertex};
    use crate::math::vector::Vec3f;

    fn grid_geometry(n: usize) -> GeometryStore {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..n {
            let x = i as f32;
            vertices.push(Vertex {
                position: Vec3f::new(x, 0.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            vertices.push(Vertex {
                position: Vec3f::new(x + 1.0, 0.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            vertices.push(Vertex {
                position: Vec3f::new(x, 1.0, 0.0),
                normal: Vec3f::new(0.0, 1.0, 0.0),
                texcoord: [0.0, 0.0],
            });
            let base = (i * 3) as u32;
            triangles.push(TriangleIndex {
                vertices: [base, base + 1, base + 2],
                material: 0,
            });
        }
        GeometryStore::new(vertices, triangles)
    }

    #[test]
    fn root_is_at_index_zero_and_every_node_visited_once() {
        let geometry = grid_geometry(40);
        let built = kdtree::build(&geometry, &AABoxEngine).unwrap();
        let (flat, bounds) = flatten(&built.nodes, built.root);
        assert_eq!(flat.len(), built.nodes.len());
        assert_eq!(bounds.len(), built.nodes.len());

        // Walk the stackless layout from 0 following first_child/escape
        // and confirm it terminates having visited every node exactly once.
        let mut visited = vec![false; flat.len()];
        let mut cur = 0u32;
        loop {
            assert!(!visited[cur as usize], "node visited twice");
            visited[cur as usize] = true;
            let node = flat[cur as usize];
            let next = if leaf_index(node.first_child).is_some() {
                node.escape
            } else {
                node.first_child
            };
            if next == NO_ESCAPE {
                break;
            }
            cur = next;
        }
        assert!(visited.iter().all(|&v| v));
    }
}
