use crate::math::numbers::Float;
use crate::math::vector::Vec3;

use num_traits::Bounded;

use std::ops::{Index, Sub};

#[derive(Clone, Copy, Debug)]
pub struct BBox3<T: PartialOrd + Bounded + Copy> {
    pub pmin: Vec3<T>,
    pub pmax: Vec3<T>,
}

impl<T: PartialOrd + Bounded + Copy> BBox3<T> {
    // An empty box: any combine_pnt/combine_bnd against this yields the
    // other operand back out, which is what the pool's "not yet fit"
    // slots start from.
    pub fn new() -> Self {
        BBox3 {
            pmin: Vec3 {
                x: T::max_value(),
                y: T::max_value(),
                z: T::max_value(),
            },
            pmax: Vec3 {
                x: T::min_value(),
                y: T::min_value(),
                z: T::min_value(),
            },
        }
    }

    pub fn from_pnts(pnt0: Vec3<T>, pnt1: Vec3<T>) -> Self {
        BBox3 {
            pmin: pnt0.min(pnt1),
            pmax: pnt0.max(pnt1),
        }
    }

    pub fn from_pnt(pnt: Vec3<T>) -> Self {
        BBox3 {
            pmin: pnt,
            pmax: pnt,
        }
    }

    pub fn corner(self, i: usize) -> Vec3<T> {
        let x = self[i & 1].x;
        let y = self[if i & 2 != 0 { 1 } else { 0 }].y;
        let z = self[if i & 4 != 0 { 1 } else { 0 }].z;
        Vec3 { x, y, z }
    }

    pub fn combine_pnt(self, pnt: Vec3<T>) -> Self {
        let pmin = self.pmin.min(pnt);
        let pmax = self.pmax.max(pnt);
        BBox3 { pmin, pmax }
    }

    pub fn combine_bnd(self, bnd: BBox3<T>) -> Self {
        let pmin = self.pmin.min(bnd.pmin);
        let pmax = self.pmax.max(bnd.pmax);
        BBox3 { pmin, pmax }
    }
}

impl<T: Float + Bounded> BBox3<T> {
    // Continuous position of a point relative to the corners of the box:
    // pmin maps to (0,0,0), pmax maps to (1,1,1).
    pub fn offset(self, pnt: Vec3<T>) -> Vec3<T> {
        let o = pnt - self.pmin;
        Vec3 {
            x: if self.pmax.x > self.pmin.x {
                o.x / (self.pmax.x - self.pmin.x)
            } else {
                o.x
            },
            y: if self.pmax.y > self.pmin.y {
                o.y / (self.pmax.y - self.pmin.y)
            } else {
                o.y
            },
            z: if self.pmax.z > self.pmin.z {
                o.z / (self.pmax.z - self.pmin.z)
            } else {
                o.z
            },
        }
    }

    pub fn surface_area(self) -> T {
        let d = self.diagonal();
        T::two() * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn centroid(self) -> Vec3<T> {
        (self.pmin + self.pmax).scale(T::half())
    }
}

impl<T: Sub<Output = T> + PartialOrd + Bounded + Copy> BBox3<T> {
    pub fn diagonal(self) -> Vec3<T> {
        self.pmax - self.pmin
    }

    pub fn max_dim(self) -> usize {
        self.diagonal().max_dim()
    }
}

impl<T: PartialOrd + Bounded + Copy> Index<usize> for BBox3<T> {
    type Output = Vec3<T>;

    fn index(&self, i: usize) -> &Vec3<T> {
        match i {
            0 => &self.pmin,
            1 => &self.pmax,
            _ => panic!("Index out of range for BBox3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_grows_to_enclose() {
        let b = BBox3::<f32>::new()
            .combine_pnt(Vec3::new(1.0, 2.0, -3.0))
            .combine_pnt(Vec3::new(-1.0, 5.0, 0.0));
        assert_eq!(b.pmin, Vec3::new(-1.0, 2.0, -3.0));
        assert_eq!(b.pmax, Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = BBox3::from_pnts(Vec3::new(0.0f32, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!((b.surface_area() - 6.0).abs() < 1e-6);
    }
}
