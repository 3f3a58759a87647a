// Tunables shared by every build strategy and the fit engines. Bundled
// here rather than scattered as free constants so a caller embedding
// this crate can override them (e.g. for a test exercising the pool
// bound with a tiny NUM_PRIMITIVES).

pub const NUM_PRIMITIVES: usize = 8;

#[derive(Clone, Copy, Debug)]
pub struct SahConstants {
    pub c_trav: f32,
    pub c_under: f32,
    pub c_imbal: f32,
}

impl Default for SahConstants {
    fn default() -> Self {
        SahConstants {
            c_trav: 1.0,
            c_under: 0.01,
            c_imbal: 0.88,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BuildConfig {
    pub sah: SahConstants,
    // Hard cap on the ellipsoid center swarm optimizer's iteration count.
    pub ellipsoid_iterations: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            sah: SahConstants::default(),
            ellipsoid_iterations: 15,
        }
    }
}
