// Full-sweep SAH build: triangles pre-sorted in Morton/z-order, then
// for every candidate split point the surface-area-heuristic cost is
// evaluated by growing the bounding volume from both ends of the
// range inward, using the pool's reserved scratch slots.
use crate::bvh::build::{fill_leaf, new_inner_node, new_pools, sah_cost, BuildOutput};
use crate::bvh::fit::FitEngine;
use crate::bvh::BoundingVolume;
use crate::config::{BuildConfig, NUM_PRIMITIVES};
use crate::error::{build_invariant, BvhError};
use crate::geometry::GeometryStore;
use crate::math::morton::morton_sort;
use crate::memory::pool::{LeafPool, NodePool};

pub fn build<F: FitEngine>(
    geometry: &GeometryStore,
    fit: &F,
    config: &BuildConfig,
) -> Result<BuildOutput<F::Bv>, BvhError> {
    let n = geometry.num_triangles();
    if n == 0 {
        return Err(build_invariant("empty geometry"));
    }

    let centroids: Vec<_> = (0..n).map(|i| geometry.centroid(i)).collect();
    let mut sorted: Vec<u32> = (0..n).collect();
    morton_sort(&mut sorted, &centroids);

    let (mut nodes, mut leaves) = new_pools(fit, geometry);
    let root = recurse(geometry, fit, config, &mut nodes, &mut leaves, &sorted, 0, n - 1)?;

    Ok(BuildOutput {
        nodes,
        leaves,
        root,
    })
}

#[allow(clippy::too_many_arguments)]
fn recurse<F: FitEngine>(
    geometry: &GeometryStore,
    fit: &F,
    config: &BuildConfig,
    nodes: &mut NodePool<F::Bv>,
    leaves: &mut LeafPool,
    sorted: &[u32],
    min: u32,
    max: u32,
) -> Result<u32, BvhError> {
    let node_idx = new_inner_node(nodes)?;
    let indices = &sorted[min as usize..=max as usize];

    if (max - min) < NUM_PRIMITIVES as u32 {
        let leaf_idx = leaves.new_leaf()?;
        fill_leaf(leaves, leaf_idx, geometry, indices);
        let bv = fit.from_triangles(geometry, indices);
        nodes.set_bound(node_idx as usize, bv);
        nodes.node_mut(node_idx).left = 0x8000_0000 | leaf_idx;
        nodes.node_mut(node_idx).right = 0;
        return Ok(node_idx);
    }

    // Only used to normalize the SAH cost below, never stored: an inner
    // node's real bound is the union of its children once they exist,
    // set after recursion returns (fit.from_triangles over the raw range
    // would re-run the ellipsoid engine's swarm search instead). Parked in
    // the pool's scratch-temp slot rather than a local, alongside the
    // running left/right volumes below.
    let scratch = nodes.scratch();
    nodes.set_bound(scratch.temp(), fit.from_triangles(geometry, indices));
    let parent_surface = nodes.bound(scratch.temp()).surface();
    let range = (max - min) as usize;

    // heuristics[i].0 = cost of putting sorted[min..=min+i] on the left,
    // heuristics[i].1 = cost of putting sorted[min+i+1..=max] on the right,
    // for every internal split point i in 0..range. The running left/right
    // volumes themselves live in the pool's two other reserved scratch
    // slots, grown one triangle at a time from each end of the range.
    let mut cost_left = vec![0.0f32; range];
    let mut cost_right = vec![0.0f32; range];

    nodes.set_bound(scratch.left(), fit.from_triangle(geometry, sorted[min as usize]));
    nodes.set_bound(scratch.right(), fit.from_triangle(geometry, sorted[max as usize]));

    for i in 0..range {
        let li = min as usize + i;
        let left_bv = fit.union(nodes.bound(scratch.left()), fit.from_triangle(geometry, sorted[li]));
        nodes.set_bound(scratch.left(), left_bv);
        cost_left[i] = sah_cost(
            config,
            left_bv.surface(),
            parent_surface,
            (i + 1) as u32,
            (range - i) as u32,
        )?;

        let ri = max as usize - i;
        let right_bv = fit.union(nodes.bound(scratch.right()), fit.from_triangle(geometry, sorted[ri]));
        nodes.set_bound(scratch.right(), right_bv);
        cost_right[range - 1 - i] = sah_cost(
            config,
            right_bv.surface(),
            parent_surface,
            (range - i) as u32,
            (i + 1) as u32,
        )?;
    }

    let mut split_index = 0usize;
    let mut min_cost = f32::INFINITY;
    for i in 1..range {
        let cost = cost_left[i] + cost_right[i];
        if cost < min_cost {
            min_cost = cost;
            split_index = i;
        }
    }

    let split = min + split_index as u32;
    let left = recurse(geometry, fit, config, nodes, leaves, sorted, min, split)?;
    let right = recurse(geometry, fit, config, nodes, leaves, sorted, split + 1, max)?;
    nodes.node_mut(node_idx).left = left;
    nodes.node_mut(node_idx).right = right;
    let bv = fit.union(nodes.bound(left as usize), nodes.bound(right as usize));
    nodes.set_bound(node_idx as usize, bv);

    Ok(node_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::fit::AABoxEngine;
    use crate::geometry::{TriangleIndex, Vertex};
    use crate::math::vector::Vec3f;

    fn two_clusters(n_per_cluster: usize) -> GeometryStore {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for cluster in 0..2 {
            let offset = cluster as f32 * 100.0;
            for i in 0..n_per_cluster {
                let x = offset + i as f32 * 0.1;
                vertices.push(Vertex {
                    position: Vec3f::new(x, 0.0, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [0.0, 0.0],
                });
                vertices.push(Vertex {
                    position: Vec3f::new(x + 0.05, 0.0, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [0.0, 0.0],
                });
                vertices.push(Vertex {
                    position: Vec3f::new(x, 0.05, 0.0),
                    normal: Vec3f::new(0.0, 1.0, 0.0),
                    texcoord: [0.0, 0.0],
                });
                let base = vertices.len() as u32 - 3;
                triangles.push(TriangleIndex {
                    vertices: [base, base + 1, base + 2],
                    material: 0,
                });
            }
        }
        GeometryStore::new(vertices, triangles)
    }

    #[test]
    fn two_clusters_build_without_error() {
        let geometry = two_clusters(10);
        let out = build(&geometry, &AABoxEngine, &BuildConfig::default()).unwrap();
        assert!(out.nodes.len() > 1);
    }

    #[test]
    fn determinism_rebuild_is_identical() {
        let geometry = two_clusters(10);
        let a = build(&geometry, &AABoxEngine, &BuildConfig::default()).unwrap();
        let b = build(&geometry, &AABoxEngine, &BuildConfig::default()).unwrap();
        assert_eq!(a.nodes.len(), b.nodes.len());
        assert_eq!(a.leaves.len(), b.leaves.len());
        for (na, nb) in a.nodes.nodes().iter().zip(b.nodes.nodes().iter()) {
            assert_eq!(na.left, nb.left);
            assert_eq!(na.right, nb.right);
        }
    }
}
