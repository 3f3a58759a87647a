// Z-order (Morton) ordering of 3D points via the "most significant
// differing bit" comparator: two floats compared by XOR-ing their raw
// bit patterns relies on IEEE-754 floats sharing their ordering with
// their binary representation once shifted non-negative.
use crate::math::vector::Vec3f;

// Compare if the floor base-2 logarithm of x0^x1 is smaller than that
// of y0^y1. All four inputs must be non-negative.
fn less_msb(x0: f32, x1: f32, y0: f32, y1: f32) -> bool {
    debug_assert!(x0 >= 0.0 && x1 >= 0.0 && y0 >= 0.0 && y1 >= 0.0);
    let x = x0.to_bits() ^ x1.to_bits();
    let y = y0.to_bits() ^ y1.to_bits();
    x < y && x < (x ^ y)
}

fn zorder_dim(a: Vec3f, b: Vec3f) -> usize {
    let mut d = 0;
    for i in 1..3 {
        if less_msb(a[d], b[d], a[i], b[i]) {
            d = i;
        }
    }
    d
}

// Total order over non-negative centroids approximating Morton order,
// without materializing the interleaved code itself.
pub fn zorder_cmp(a: Vec3f, b: Vec3f) -> std::cmp::Ordering {
    let d = zorder_dim(a, b);
    a[d].partial_cmp(&b[d]).unwrap_or(std::cmp::Ordering::Equal)
}

// Sorts indices into `centroids` into Morton/z-order, after shifting
// every centroid into the non-negative octant.
pub fn morton_sort(indices: &mut [u32], centroids: &[Vec3f]) {
    let mut min_center = Vec3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    for &i in indices.iter() {
        min_center = min_center.min(centroids[i as usize]);
    }
    let shifted: Vec<Vec3f> = centroids.iter().map(|&c| c - min_center).collect();
    indices.sort_by(|&a, &b| zorder_cmp(shifted[a as usize], shifted[b as usize]));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_without_panicking_on_negative_input() {
        let centroids = vec![
            Vec3f::new(-1.0, 2.0, 3.0),
            Vec3f::new(5.0, -2.0, 0.0),
            Vec3f::new(0.0, 0.0, 0.0),
        ];
        let mut idx: Vec<u32> = (0..centroids.len() as u32).collect();
        morton_sort(&mut idx, &centroids);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn less_msb_picks_larger_magnitude_difference() {
        assert!(less_msb(1.0, 9.0, 1.0, 2.0));
    }
}
