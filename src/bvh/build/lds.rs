// Largest-Dimension-Split: project centroids onto the principal axis
// of their covariance (found via Jacobi/QL eigendecomposition) and
// split along that projection using the same cost-sweep the `sweep`
// strategy uses, rather than a plain median.
use crate::bvh::build::{fill_leaf, new_inner_node, new_pools, sah_cost, BuildOutput};
use crate::bvh::fit::FitEngine;
use crate::bvh::BoundingVolume;
use crate::config::{BuildConfig, NUM_PRIMITIVES};
use crate::error::{build_invariant, BvhError};
use crate::geometry::GeometryStore;
use crate::math::eigen::{decompose_ql, Sym3x3};
use crate::math::vector::Vec3f;
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
    let mut ids: Vec<u32> = (0..n).collect();
    let (mut nodes, mut leaves) = new_pools(fit, geometry);
    let root = recurse(geometry, fit, config, &mut nodes, &mut leaves, &mut ids, 0, n - 1)?;

    Ok(BuildOutput {
        nodes,
        leaves,
        root,
    })
}

// Picks the split direction for the range `ids[min..=max]`: the
// eigenvector of largest eigenvalue of the centroid covariance matrix,
// or axis 0 when the centroids are degenerate (all identical, so the
// covariance is exactly zero and handing it to the solver would be
// meaningless).
fn split_direction(geometry: &GeometryStore, ids: &[u32]) -> Vec3f {
    let n = ids.len() as f32;
    let mean = ids
        .iter()
        .fold(Vec3f::zero(), |acc, &i| acc + geometry.centroid(i))
        .scale(1.0 / n);

    let mut cov = Sym3x3::zero();
    for &i in ids {
        cov.add_outer(geometry.centroid(i) - mean);
    }
    if ids.len() > 1 {
        cov.scale(1.0 / (ids.len() as f32 - 1.0));
    }

    if cov.is_zero() {
        return Vec3f::new(1.0, 0.0, 0.0);
    }

    let (eigenvalues, eigenvectors) = decompose_ql(cov);
    let (l0, l1, l2) = (eigenvalues[0], eigenvalues[1], eigenvalues[2]);
    if l0 > l1 && l0 > l2 {
        eigenvectors[0]
    } else if l1 > l2 {
        eigenvectors[1]
    } else {
        eigenvectors[2]
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse<F: FitEngine>(
    geometry: &GeometryStore,
    fit: &F,
    config: &BuildConfig,
    nodes: &mut NodePool<F::Bv>,
    leaves: &mut LeafPool,
    ids: &mut [u32],
    min: u32,
    max: u32,
) -> Result<u32, BvhError> {
    let node_idx = new_inner_node(nodes)?;
    let range_ids = &mut ids[min as usize..=max as usize];

    if (max - min) < NUM_PRIMITIVES as u32 {
        let leaf_idx = leaves.new_leaf()?;
        fill_leaf(leaves, leaf_idx, geometry, range_ids);
        let bv = fit.from_triangles(geometry, range_ids);
        nodes.set_bound(node_idx as usize, bv);
        nodes.node_mut(node_idx).left = 0x8000_0000 | leaf_idx;
        nodes.node_mut(node_idx).right = 0;
        return Ok(node_idx);
    }

    let direction = split_direction(geometry, range_ids);
    range_ids.sort_by(|&a, &b| {
        let pa = geometry.centroid(a).dot(direction);
        let pb = geometry.centroid(b).dot(direction);
        pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
    });

    // Only used to normalize the SAH cost below, never stored: an inner
    // node's real bound is the union of its children once they exist,
    // set after recursion returns. Parked in the pool's scratch-temp slot
    // rather than a local, alongside the running left/right volumes below.
    let scratch = nodes.scratch();
    nodes.set_bound(scratch.temp(), fit.from_triangles(geometry, range_ids));
    let parent_surface = nodes.bound(scratch.temp()).surface();

    let range = (max - min) as usize;
    let mut cost_left = vec![0.0f32; range];
    let mut cost_right = vec![0.0f32; range];

    nodes.set_bound(scratch.left(), fit.from_triangle(geometry, range_ids[0]));
    nodes.set_bound(scratch.right(), fit.from_triangle(geometry, range_ids[range]));

    for i in 0..range {
        let left_bv = fit.union(nodes.bound(scratch.left()), fit.from_triangle(geometry, range_ids[i]));
        nodes.set_bound(scratch.left(), left_bv);
        cost_left[i] = sah_cost(
            config,
            left_bv.surface(),
            parent_surface,
            (i + 1) as u32,
            (range - i) as u32,
        )?;

        let ri = range - i;
        let right_bv = fit.union(nodes.bound(scratch.right()), fit.from_triangle(geometry, range_ids[ri]));
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
    let left = recurse(geometry, fit, config, nodes, leaves, ids, min, split)?;
    let right = recurse(geometry, fit, config, nodes, leaves, ids, split + 1, max)?;
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

    fn coplanar_grid(side: usize) -> GeometryStore {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for r in 0..side {
            for c in 0..side {
                let x = c as f32;
                let y = r as f32;
                vertices.push(Vertex {
                    position: Vec3f::new(x, y, 0.0),
                    normal: Vec3f::new(0.0, 0.0, 1.0),
                    texcoord: [0.0, 0.0],
                });
                vertices.push(Vertex {
                    position: Vec3f::new(x + 1.0, y, 0.0),
                    normal: Vec3f::new(0.0, 0.0, 1.0),
                    texcoord: [0.0, 0.0],
                });
                vertices.push(Vertex {
                    position: Vec3f::new(x, y + 1.0, 0.0),
                    normal: Vec3f::new(0.0, 0.0, 1.0),
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
    fn coplanar_triangles_build_without_degenerate_split_panic() {
        // All z=0: the covariance has a zero eigenvalue in z, which
        // must not crash the eigensolver or the split-direction pick.
        let geometry = coplanar_grid(8);
        let out = build(&geometry, &AABoxEngine, &BuildConfig::default()).unwrap();
        assert!(out.nodes.len() > 0);
    }

    #[test]
    fn single_triangle_is_one_leaf() {
        let geometry = coplanar_grid(1);
        let out = build(&geometry, &AABoxEngine, &BuildConfig::default()).unwrap();
        assert_eq!(out.leaves.len(), 1);
        assert_eq!(out.leaves.leaves()[0].triangles[0].is_valid(), true);
    }
}
