pub mod build;
pub mod fit;
pub mod flatten;

// A bounding volume type usable by every build strategy without the
// strategy code knowing whether it is an axis-aligned box or an
// axis-aligned ellipsoid underneath. Kept generic (monomorphized at
// build-start) rather than dynamically dispatched, since SAH sweep
// calls this in the hottest loop in the crate.
pub trait BoundingVolume {
    fn surface(&self) -> f32;
    fn volume(&self) -> f32;
    fn axis_min(&self, axis: usize) -> f32;
    fn axis_max(&self, axis: usize) -> f32;
    fn union(&self, other: &Self) -> Self;
}
