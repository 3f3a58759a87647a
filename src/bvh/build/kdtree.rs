// Median kd-tree: three centroid-sorted index arrays (one per axis),
// recursively split at the median along the widest centroid extent.
use crate::bvh::build::{fill_leaf, new_inner_node, new_pools, BuildOutput};
use crate::bvh::fit::FitEngine;
use crate::config::NUM_PRIMITIVES;
use crate::error::BvhError;
use crate::geometry::GeometryStore;
use crate::math::vector::Vec3f;
use crate::memory::pool::{LeafPool, NodePool};

pub fn build<F: FitEngine>(
    geometry: &GeometryStore,
    fit: &F,
) -> Result<BuildOutput<F::Bv>, BvhError> {
    let n = geometry.num_triangles();
    let mut centers: Vec<Vec3f> = (0..n).map(|i| geometry.centroid(i)).collect();

    let mut sorted: [Vec<u32>; 3] = [
        (0..n).collect(),
        (0..n).collect(),
        (0..n).collect(),
    ];
    for axis in 0..3 {
        sorted[axis].sort_by(|&a, &b| {
            centers[a as usize][axis]
                .partial_cmp(&centers[b as usize][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let (mut nodes, mut leaves) = new_pools(fit, geometry);
    let root = if n == 0 {
        return Err(crate::error::build_invariant("empty geometry"));
    } else {
        recurse(
            geometry,
            fit,
            &mut nodes,
            &mut leaves,
            &mut sorted,
            &mut centers,
            0,
            n - 1,
        )?
    };

    Ok(BuildOutput {
        nodes,
        leaves,
        root,
    })
}

// Stable partition of `list` by whether `centers[elem][dim] <= split_plane`,
// preserving the relative order within each half. A plain sort-based
// (Hoare-style) partition would scramble ties and corrupt the other two
// sorted-axis arrays for the recursive calls below.
fn split_stable(list: &mut [u32], centers: &[Vec3f], dim: usize, split_plane: f32) {
    let mut left = Vec::with_capacity(list.len());
    let mut right = Vec::with_capacity(list.len());
    for &elem in list.iter() {
        if centers[elem as usize][dim] <= split_plane {
            left.push(elem);
        } else {
            right.push(elem);
        }
    }
    for (slot, v) in list.iter_mut().zip(left.into_iter().chain(right)) {
        *slot = v;
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse<F: FitEngine>(
    geometry: &GeometryStore,
    fit: &F,
    nodes: &mut NodePool<F::Bv>,
    leaves: &mut LeafPool,
    sorted: &mut [Vec<u32>; 3],
    centers: &mut [Vec3f],
    min: u32,
    max: u32,
) -> Result<u32, BvhError> {
    let node_idx = new_inner_node(nodes)?;

    if (max - min) < NUM_PRIMITIVES as u32 {
        let leaf_idx = leaves.new_leaf()?;
        let indices: Vec<u32> = sorted[0][min as usize..=max as usize].to_vec();
        fill_leaf(leaves, leaf_idx, geometry, &indices);

        nodes.node_mut(node_idx).left = 0x8000_0000 | leaf_idx;
        nodes.node_mut(node_idx).right = 0;

        let bv = fit.from_triangles(geometry, &indices);
        nodes.set_bound(node_idx as usize, bv);
        return Ok(node_idx);
    }

    // Widest centroid extent among the three axes picks the split dim,
    // axis 0 winning ties (matches the tie-break the pool property test
    // exercises on a perfectly cubic set of centroids).
    let lo = Vec3f::new(
        centers[sorted[0][min as usize] as usize].x,
        centers[sorted[1][min as usize] as usize].y,
        centers[sorted[2][min as usize] as usize].z,
    );
    let hi = Vec3f::new(
        centers[sorted[0][max as usize] as usize].x,
        centers[sorted[1][max as usize] as usize].y,
        centers[sorted[2][max as usize] as usize].z,
    );
    let w = hi - lo;
    let mut dim = 0;
    if w.y > w.x && w.y > w.z {
        dim = 1;
    }
    if w.z > w.x && w.z > w.y {
        dim = 2;
    }
    let codim1 = (dim + 1) % 3;
    let codim2 = (dim + 2) % 3;

    let m = (min + max) / 2;
    let split_plane = centers[sorted[dim][m as usize] as usize][dim];

    // Perturb ties at the boundary so the partition below lands exactly
    // at (size+1)/2, then put the perturbed values back.
    let mut num_changed = 0u32;
    while m + num_changed < max
        && centers[sorted[dim][(m + 1 + num_changed) as usize] as usize][dim] == split_plane
    {
        centers[sorted[dim][(m + 1 + num_changed) as usize] as usize][dim] += 1.0;
        num_changed += 1;
    }

    split_stable(
        &mut sorted[codim1][min as usize..=max as usize],
        centers,
        dim,
        split_plane,
    );
    split_stable(
        &mut sorted[codim2][min as usize..=max as usize],
        centers,
        dim,
        split_plane,
    );

    for i in (m + 1)..(m + 1 + num_changed) {
        centers[sorted[dim][i as usize] as usize][dim] = split_plane;
    }

    let left = recurse(geometry, fit, nodes, leaves, sorted, centers, min, m)?;
    let right = recurse(geometry, fit, nodes, leaves, sorted, centers, m + 1, max)?;

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
    use crate::bvh::BoundingVolume;
    use crate::geometry::{TriangleIndex, Vertex};

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
    fn exactly_eight_triangles_is_a_single_leaf() {
        let geometry = grid_geometry(8);
        let out = build(&geometry, &crate::bvh::fit::AABoxEngine).unwrap();
        assert_eq!(out.leaves.len(), 1);
        assert_eq!(out.nodes.len(), 1);
    }

    #[test]
    fn nine_triangles_splits_into_two_leaves() {
        let geometry = grid_geometry(9);
        let out = build(&geometry, &crate::bvh::fit::AABoxEngine).unwrap();
        assert_eq!(out.leaves.len(), 2);
        let total: usize = out
            .leaves
            .leaves()
            .iter()
            .flat_map(|l| l.triangles.iter())
            .filter(|t| t.is_valid())
            .count();
        assert_eq!(total, 9);
    }

    #[test]
    fn root_bound_encloses_every_centroid() {
        let geometry = grid_geometry(20);
        let out = build(&geometry, &crate::bvh::fit::AABoxEngine).unwrap();
        let root_bv = out.nodes.bound(out.root as usize);
        for i in 0..geometry.num_triangles() {
            let c = geometry.centroid(i);
            for axis in 0..3 {
                assert!(root_bv.axis_min(axis) - 1e-4 <= c[axis]);
                assert!(root_bv.axis_max(axis) + 1e-4 >= c[axis]);
            }
        }
    }
}
