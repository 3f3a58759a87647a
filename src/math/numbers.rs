// This holds traits that are used throughout the program
// to make things easy for us:

use num_traits;

// This is my own float trait versus the num_traits one:

pub trait Float: num_traits::Float + num_traits::Bounded {
    fn two() -> Self;
    fn half() -> Self;
}

impl Float for f32 {
    fn two() -> Self {
        2f32
    }

    fn half() -> Self {
        0.5f32
    }
}
