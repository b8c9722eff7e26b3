mod blend;
pub mod complex;
mod conformal;
mod core;
mod noise;

pub use blend::{BlendMode, ParseBlendModeError};
pub use complex::Complex;
pub use conformal::{
    Direction, Mobius, SINGULAR_MAGNITUDE, conic_map, conic_mobius, cylindrical_map,
    stereographic_backward, stereographic_forward,
};
pub use self::core::{Point2, Point3, Tolerance};
pub use noise::{FractalNoise, fractal_noise_2d, value_noise_2d};

#[cfg(test)]
mod tests;
