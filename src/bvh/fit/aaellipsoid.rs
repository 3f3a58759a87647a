// Axis-aligned ellipsoid fit. Unlike the box engine, the ellipsoid's
// center isn't simply the average of its points: a bounded swarm
// search picks the center that minimizes the fitted ellipsoid's
// surface area, then `fit_from_center` grows radii just enough to
// enclose every vertex.
use crate::bvh::fit::{AAEllipsoidEngine, FitEngine};
use crate::bvh::BoundingVolume;
use crate::geometry::GeometryStore;
use crate::math::vector::Vec3f;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Clone, Copy, Debug)]
pub struct AAEllipsoid {
    pub center: Vec3f,
    pub radii: Vec3f,
}

impl AAEllipsoid {
    pub fn empty() -> Self {
        AAEllipsoid {
            center: Vec3f::zero(),
            radii: Vec3f::zero(),
        }
    }

    fn contains(&self, p: Vec3f) -> bool {
        let d = p - self.center;
        if self.radii.x == 0.0 || self.radii.y == 0.0 || self.radii.z == 0.0 {
            return d.x == 0.0 && d.y == 0.0 && d.z == 0.0;
        }
        let nx = d.x / self.radii.x;
        let ny = d.y / self.radii.y;
        let nz = d.z / self.radii.z;
        nx * nx + ny * ny + nz * nz <= 1.0
    }
}

// Grows a zero-radius ellipsoid at `center` just enough to contain
// every vertex in `points`, enlarging only (a point once enclosed
// never falls back outside as later points are folded in).
pub fn fit_from_center(points: &[Vec3f], center: Vec3f) -> AAEllipsoid {
    let mut ellipsoid = AAEllipsoid {
        center,
        radii: Vec3f::zero(),
    };
    for &p in points {
        if ellipsoid.contains(p) {
            continue;
        }
        let diff = p - center;
        let nonzero = [diff.x, diff.y, diff.z]
            .iter()
            .filter(|v| **v != 0.0)
            .count();
        let scale = (nonzero as f32).sqrt();
        let radii = diff.abs().scale(scale);
        ellipsoid.radii = ellipsoid.radii.max(radii);
    }
    ellipsoid
}

fn ellipsoid_surface(e: &AAEllipsoid) -> f32 {
    // Thomsen's p=1.6 approximation for an ellipsoid's surface area,
    // degrading gracefully to 0 for degenerate (zero-radius) shapes.
    let (a, b, c) = (e.radii.x, e.radii.y, e.radii.z);
    if a == 0.0 && b == 0.0 && c == 0.0 {
        return 0.0;
    }
    let p = 1.6f32;
    let ap = a.powf(p);
    let bp = b.powf(p);
    let cp = c.powf(p);
    (4.0 * std::f32::consts::PI * ((ap * bp + ap * cp + bp * cp) / 3.0).powf(1.0 / p)).max(0.0)
}

// Bounded swarm optimizer over a fixed iteration count. Deterministic:
// seeded from a fixed constant rather than OS entropy, since the whole
// build is required to be byte-identical across runs.
fn optimize_center(
    min: Vec3f,
    max: Vec3f,
    points: &[Vec3f],
    iterations: u32,
) -> Vec3f {
    const SWARM_SIZE: usize = 8;
    const SEED: u64 = 0x5EED_BA5E_5EED_BA5E;

    let mut rng = Pcg32::seed_from_u64(SEED);
    let extent = max - min;

    let sample = |rng: &mut Pcg32| -> Vec3f {
        Vec3f::new(
            min.x + rng.gen::<f32>() * extent.x,
            min.y + rng.gen::<f32>() * extent.y,
            min.z + rng.gen::<f32>() * extent.z,
        )
    };

    let mut positions: Vec<Vec3f> = (0..SWARM_SIZE).map(|_| sample(&mut rng)).collect();
    let mut velocities: Vec<Vec3f> = vec![Vec3f::zero(); SWARM_SIZE];
    let mut personal_best = positions.clone();
    let mut personal_best_cost: Vec<f32> = positions
        .iter()
        .map(|&p| ellipsoid_surface(&fit_from_center(points, p)))
        .collect();

    let mut global_best_idx = 0;
    for i in 1..SWARM_SIZE {
        if personal_best_cost[i] < personal_best_cost[global_best_idx] {
            global_best_idx = i;
        }
    }
    let mut global_best = personal_best[global_best_idx];

    const INERTIA: f32 = 0.5;
    const COGNITIVE: f32 = 1.2;
    const SOCIAL: f32 = 1.2;

    for _ in 0..iterations {
        for i in 0..SWARM_SIZE {
            let r1: f32 = rng.gen();
            let r2: f32 = rng.gen();
            velocities[i] = velocities[i].scale(INERTIA)
                + (personal_best[i] - positions[i]).scale(COGNITIVE * r1)
                + (global_best - positions[i]).scale(SOCIAL * r2);
            positions[i] = (positions[i] + velocities[i]).min(max).max(min);

            let cost = ellipsoid_surface(&fit_from_center(points, positions[i]));
            if cost < personal_best_cost[i] {
                personal_best_cost[i] = cost;
                personal_best[i] = positions[i];
                if cost < personal_best_cost[global_best_idx] {
                    global_best_idx = i;
                    global_best = positions[i];
                }
            }
        }
    }

    global_best
}

impl BoundingVolume for AAEllipsoid {
    fn surface(&self) -> f32 {
        ellipsoid_surface(self)
    }

    fn volume(&self) -> f32 {
        (4.0 / 3.0) * std::f32::consts::PI * self.radii.x * self.radii.y * self.radii.z
    }

    fn axis_min(&self, axis: usize) -> f32 {
        self.center[axis] - self.radii[axis]
    }

    fn axis_max(&self, axis: usize) -> f32 {
        self.center[axis] + self.radii[axis]
    }

    fn union(&self, other: &Self) -> Self {
        // Reconstruct the inscribed boxes (radii / sqrt(3)) and fit a
        // fresh ellipsoid around their combined box, matching the
        // reference implementation's union rule.
        const INV_SQRT_3: f32 = 0.577_350_27;
        let lo = self.radii.scale(INV_SQRT_3);
        let ro = other.radii.scale(INV_SQRT_3);
        let pmin = (self.center - lo).min(other.center - ro);
        let pmax = (self.center + lo).max(other.center + ro);
        let center = (pmin + pmax).scale(0.5);
        let radii = (pmax - pmin).scale(0.5);
        AAEllipsoid { center, radii }
    }
}

impl FitEngine for AAEllipsoidEngine {
    type Bv = AAEllipsoid;

    fn empty(&self) -> Self::Bv {
        AAEllipsoid::empty()
    }

    fn from_triangle(&self, geometry: &GeometryStore, triangle_index: u32) -> Self::Bv {
        self.from_triangles(geometry, &[triangle_index])
    }

    fn from_triangles(&self, geometry: &GeometryStore, indices: &[u32]) -> Self::Bv {
        let mut points = Vec::with_capacity(indices.len() * 3);
        let mut min = Vec3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Vec3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &i in indices {
            for v in geometry.triangle_vertices(i) {
                min = min.min(v);
                max = max.max(v);
                points.push(v);
            }
        }
        if points.is_empty() {
            return AAEllipsoid::empty();
        }
        let center = optimize_center(min, max, &points, self.config.ellipsoid_iterations);
        fit_from_center(&points, center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_from_center_encloses_every_point() {
        let points = vec![
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(-1.0, 2.0, 0.0),
            Vec3f::new(0.0, 0.0, 3.0),
        ];
        let e = fit_from_center(&points, Vec3f::zero());
        for &p in &points {
            assert!(e.contains(p));
        }
    }

    #[test]
    fn union_encloses_both_children() {
        let a = fit_from_center(&[Vec3f::new(1.0, 0.0, 0.0)], Vec3f::zero());
        let b = fit_from_center(&[Vec3f::new(-1.0, -1.0, -1.0)], Vec3f::new(-1.0, -1.0, -1.0));
        let u = a.union(&b);
        assert!(u.contains(Vec3f::new(1.0, 0.0, 0.0)));
        assert!(u.contains(Vec3f::new(-1.0, -1.0, -1.0)));
    }

    #[test]
    fn optimizer_is_deterministic() {
        let points = vec![
            Vec3f::new(1.0, 0.5, 0.0),
            Vec3f::new(-1.0, 0.2, 1.0),
            Vec3f::new(0.3, -1.0, -0.4),
        ];
        let c1 = optimize_center(Vec3f::new(-1.0, -1.0, -1.0), Vec3f::new(1.0, 1.0, 1.0), &points, 15);
        let c2 = optimize_center(Vec3f::new(-1.0, -1.0, -1.0), Vec3f::new(1.0, 1.0, 1.0), &points, 15);
        assert_eq!(c1, c2);
    }
}
