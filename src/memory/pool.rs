// Pre-allocated, monotonically-growing node and leaf storage. Unlike
// the teacher's StackAlloc this hands out plain indices rather than
// references, so a build strategy can hold onto a node index across
// recursive calls without fighting the borrow checker (see the design
// notes on why a handle-based scratch allocator beats raw arithmetic
// against "the last few slots").
use crate::bvh::BoundingVolume;
use crate::error::{build_invariant, BvhError};
use crate::geometry::TriangleIndex;

pub type NodeIndex = u32;
pub type LeafIndex = u32;

pub const LEAF_BIT: u32 = 0x8000_0000;

#[derive(Clone, Copy, Debug)]
pub struct InnerNode {
    pub parent: u32,
    pub left: u32,
    pub right: u32,
}

impl InnerNode {
    pub fn empty() -> Self {
        InnerNode {
            parent: u32::MAX,
            left: u32::MAX,
            right: u32::MAX,
        }
    }
}

pub const NUM_PRIMITIVES: usize = crate::config::NUM_PRIMITIVES;

#[derive(Clone, Copy, Debug)]
pub struct LeafSlot {
    pub triangles: [TriangleIndex; NUM_PRIMITIVES],
}

impl LeafSlot {
    pub fn empty() -> Self {
        LeafSlot {
            triangles: [TriangleIndex::INVALID; NUM_PRIMITIVES],
        }
    }
}

// Three scratch bounding-volume slots reserved at the top of the
// node pool's bounding-volume array, used transiently by the SAH
// sweep and the LDS sweep split-mode while probing split costs.
pub struct ScratchVolumes {
    base: usize,
}

impl ScratchVolumes {
    pub fn left(&self) -> usize {
        self.base
    }
    pub fn right(&self) -> usize {
        self.base + 1
    }
    pub fn temp(&self) -> usize {
        self.base + 2
    }
}

pub struct NodePool<Bv: BoundingVolume + Copy> {
    nodes: Vec<InnerNode>,
    bounds: Vec<Bv>,
    next: usize,
    // bounds.len() includes 3 scratch slots past this point.
    capacity: usize,
}

impl<Bv: BoundingVolume + Copy> NodePool<Bv> {
    // Estimate per original_source/bvhmake/buildmethods/*.cpp's
    // EstimateNodeCounts: 4 * triangle_count / NUM_PRIMITIVES inner
    // nodes, plus 3 reserved scratch volume slots.
    pub fn with_capacity(estimated_inner: usize, empty_bv: Bv) -> Self {
        let capacity = estimated_inner.max(1);
        NodePool {
            nodes: Vec::with_capacity(capacity),
            bounds: vec![empty_bv; capacity + 3],
            next: 0,
            capacity,
        }
    }

    pub fn scratch(&self) -> ScratchVolumes {
        ScratchVolumes {
            base: self.capacity,
        }
    }

    pub fn new_node(&mut self) -> Result<NodeIndex, BvhError> {
        if self.next >= self.capacity {
            return Err(build_invariant(format!(
                "node pool exhausted: capacity {} exceeded",
                self.capacity
            )));
        }
        let idx = self.next as NodeIndex;
        self.nodes.push(InnerNode::empty());
        self.next += 1;
        Ok(idx)
    }

    pub fn node(&self, idx: NodeIndex) -> &InnerNode {
        &self.nodes[idx as usize]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut InnerNode {
        &mut self.nodes[idx as usize]
    }

    pub fn bound(&self, idx: usize) -> Bv {
        self.bounds[idx]
    }

    pub fn set_bound(&mut self, idx: usize, bv: Bv) {
        self.bounds[idx] = bv;
    }

    pub fn len(&self) -> usize {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    pub fn nodes(&self) -> &[InnerNode] {
        &self.nodes
    }
}

pub struct LeafPool {
    leaves: Vec<LeafSlot>,
    capacity: usize,
}

impl LeafPool {
    pub fn with_capacity(estimated_leaves: usize) -> Self {
        LeafPool {
            leaves: Vec::with_capacity(estimated_leaves.max(1)),
            capacity: estimated_leaves.max(1),
        }
    }

    pub fn new_leaf(&mut self) -> Result<LeafIndex, BvhError> {
        if self.leaves.len() >= self.capacity {
            return Err(build_invariant(format!(
                "leaf pool exhausted: capacity {} exceeded",
                self.capacity
            )));
        }
        let idx = self.leaves.len() as LeafIndex;
        self.leaves.push(LeafSlot::empty());
        Ok(idx)
    }

    pub fn leaf_mut(&mut self, idx: LeafIndex) -> &mut LeafSlot {
        &mut self.leaves[idx as usize]
    }

    pub fn leaves(&self) -> &[LeafSlot] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

// The two estimates used to size both pools before a build starts.
pub fn estimate_inner_nodes(triangle_count: u32) -> usize {
    (4 * triangle_count as usize) / NUM_PRIMITIVES + 1
}

pub fn estimate_leaves(triangle_count: u32) -> usize {
    (2 * triangle_count as usize) / NUM_PRIMITIVES + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::fit::aabox::AABox;

    #[test]
    fn pool_exhaustion_is_reported_not_panicked() {
        let mut pool: NodePool<AABox> = NodePool::with_capacity(1, AABox::empty());
        assert!(pool.new_node().is_ok());
        assert!(pool.new_node().is_err());
    }

    #[test]
    fn scratch_slots_sit_past_capacity() {
        let pool: NodePool<AABox> = NodePool::with_capacity(4, AABox::empty());
        let scratch = pool.scratch();
        assert_eq!(scratch.left(), 4);
        assert_eq!(scratch.right(), 5);
        assert_eq!(scratch.temp(), 6);
    }
}
