// Axis-aligned box fit: min/max accumulation over a triangle's three
// vertices, or a union of two child boxes.
use crate::bvh::fit::{AABoxEngine, FitEngine};
use crate::bvh::BoundingVolume;
use crate::geometry::GeometryStore;
use crate::math::bbox::BBox3;
use crate::math::vector::Vec3f;

#[derive(Clone, Copy, Debug)]
pub struct AABox {
    bbox: BBox3<f32>,
}

impl AABox {
    pub fn empty() -> Self {
        AABox { bbox: BBox3::new() }
    }

    pub fn from_points(points: &[Vec3f]) -> Self {
        let mut bbox = BBox3::new();
        for &p in points {
            bbox = bbox.combine_pnt(p);
        }
        assert_sound(bbox);
        AABox { bbox }
    }

    pub fn bbox(&self) -> BBox3<f32> {
        self.bbox
    }
}

// `BBox3::new()`'s empty sentinel has pmin > pmax on every axis by
// construction (max_value/min_value), so it's excluded here; any other
// box must satisfy min <= max on every axis or the fit went wrong.
fn assert_sound(bbox: BBox3<f32>) {
    if bbox.pmin.x > bbox.pmax.x {
        return;
    }
    for axis in 0..3 {
        debug_assert!(
            bbox.pmin[axis] <= bbox.pmax[axis],
            "AABB min exceeds max on axis {}: {} > {}",
            axis,
            bbox.pmin[axis],
            bbox.pmax[axis]
        );
    }
}

impl BoundingVolume for AABox {
    fn surface(&self) -> f32 {
        self.bbox.surface_area()
    }

    fn volume(&self) -> f32 {
        let d = self.bbox.diagonal();
        d.x * d.y * d.z
    }

    fn axis_min(&self, axis: usize) -> f32 {
        self.bbox.pmin[axis]
    }

    fn axis_max(&self, axis: usize) -> f32 {
        self.bbox.pmax[axis]
    }

    fn union(&self, other: &Self) -> Self {
        let bbox = self.bbox.combine_bnd(other.bbox);
        assert_sound(bbox);
        AABox { bbox }
    }
}

impl FitEngine for AABoxEngine {
    type Bv = AABox;

    fn empty(&self) -> Self::Bv {
        AABox::empty()
    }

    fn from_triangle(&self, geometry: &GeometryStore, triangle_index: u32) -> Self::Bv {
        let verts = geometry.triangle_vertices(triangle_index);
        AABox::from_points(&verts)
    }
}
