pub mod aabox;
pub mod aaellipsoid;

use crate::bvh::BoundingVolume;
use crate::config::BuildConfig;
use crate::geometry::GeometryStore;
use crate::math::vector::Vec3f;

// A fit engine decides which bounding-volume geometry is used and how
// it is computed, mirroring the reference tool's FitMethod interface
// (operator() from two children, operator() from a leaf's triangles).
pub trait FitEngine {
    type Bv: BoundingVolume + Copy;

    fn empty(&self) -> Self::Bv;

    fn from_triangle(&self, geometry: &GeometryStore, triangle_index: u32) -> Self::Bv;

    fn union(&self, left: Self::Bv, right: Self::Bv) -> Self::Bv {
        left.union(&right)
    }

    // Fits a single bounding volume over an arbitrary subset of
    // triangles, used for leaves (which may be under-full).
    fn from_triangles(&self, geometry: &GeometryStore, indices: &[u32]) -> Self::Bv {
        indices.iter().fold(self.empty(), |acc, &i| {
            acc.union(&self.from_triangle(geometry, i))
        })
    }

    fn centroid(&self, bv: &Self::Bv) -> Vec3f {
        Vec3f::new(
            0.5 * (bv.axis_min(0) + bv.axis_max(0)),
            0.5 * (bv.axis_min(1) + bv.axis_max(1)),
            0.5 * (bv.axis_min(2) + bv.axis_max(2)),
        )
    }
}

pub struct AABoxEngine;
pub struct AAEllipsoidEngine {
    pub config: BuildConfig,
}
