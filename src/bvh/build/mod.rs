pub mod kdtree;
pub mod lds;
pub mod sweep;

use crate::bvh::fit::FitEngine;
use crate::bvh::BoundingVolume;
use crate::config::BuildConfig;
use crate::error::{build_invariant, BvhError};
use crate::geometry::{GeometryStore, TriangleIndex};
use crate::memory::pool::{estimate_inner_nodes, estimate_leaves, InnerNode, LeafPool, NodePool};

// What every build strategy hands back: the populated node and leaf
// pools, plus the root node index (always 0 once the tree is built,
// since the very first call to new_node() is for the root).
pub struct BuildOutput<Bv: BoundingVolume + Copy> {
    pub nodes: NodePool<Bv>,
    pub leaves: LeafPool,
    pub root: u32,
}

// The surface-area-heuristic cost of putting `n_this` primitives into
// the child whose bounding volume is `target`, relative to `parent`,
// with `n_other` in the sibling. Asserted in [0,3] as in the reference
// tool; violating that is a build invariant, not a soft warning, since
// it would mean the cost model itself is broken.
pub fn sah_cost(
    config: &BuildConfig,
    target_surface: f32,
    parent_surface: f32,
    n_this: u32,
    n_other: u32,
) -> Result<f32, BvhError> {
    let num_primitives = crate::config::NUM_PRIMITIVES as f32;
    let underful = (num_primitives - n_this as f32).max(0.0);
    let balance = 1.0 - (n_other as f32 / n_this as f32).min(n_this as f32 / n_other as f32);

    let val = (target_surface / parent_surface) * config.sah.c_trav
        + underful * config.sah.c_under / num_primitives
        + balance.powf(8.0) * config.sah.c_imbal;

    if !(0.0..=3.0).contains(&val) {
        return Err(build_invariant(format!(
            "SAH cost {} outside expected [0,3] range",
            val
        )));
    }
    Ok(val)
}

// Fills a leaf slot with `indices` (at most NUM_PRIMITIVES of them),
// padding the remainder with INVALID_TRIANGLE, mirroring the
// reference's leaf-construction loop.
pub fn fill_leaf(leaves: &mut LeafPool, leaf_idx: u32, geometry: &GeometryStore, indices: &[u32]) {
    let leaf = leaves.leaf_mut(leaf_idx);
    for (slot, &i) in leaf.triangles.iter_mut().zip(indices.iter()) {
        *slot = geometry.triangle(i);
    }
    for slot in leaf.triangles.iter_mut().skip(indices.len()) {
        *slot = TriangleIndex::INVALID;
    }
}

pub(crate) fn new_pools<F: FitEngine>(
    fit: &F,
    geometry: &GeometryStore,
) -> (NodePool<F::Bv>, LeafPool) {
    let n = geometry.num_triangles();
    (
        NodePool::with_capacity(estimate_inner_nodes(n), fit.empty()),
        LeafPool::with_capacity(estimate_leaves(n)),
    )
}

pub(crate) fn new_inner_node<Bv: BoundingVolume + Copy>(
    nodes: &mut NodePool<Bv>,
) -> Result<u32, BvhError> {
    let idx = nodes.new_node()?;
    *nodes.node_mut(idx) = InnerNode::empty();
    Ok(idx)
}
