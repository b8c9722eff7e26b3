//! Deterministic 2D value noise and its fractal (multi-octave) sum.

/// Simple deterministic 2D noise function (value noise with lattice interpolation).
/// Returns a value in the range [-1, 1].
#[must_use]
pub fn value_noise_2d(x: f64, y: f64, seed: u32) -> f64 {
    let xi = x.floor() as i32;
    let yi = y.floor() as i32;

    let xf = x - x.floor();
    let yf = y - y.floor();

    // Smoothstep for interpolation
    let u = xf * xf * (3.0 - 2.0 * xf);
    let v = yf * yf * (3.0 - 2.0 * yf);

    let n00 = lattice_hash(xi, yi, seed);
    let n10 = lattice_hash(xi.wrapping_add(1), yi, seed);
    let n01 = lattice_hash(xi, yi.wrapping_add(1), seed);
    let n11 = lattice_hash(xi.wrapping_add(1), yi.wrapping_add(1), seed);

    let n0 = n00 * (1.0 - u) + n10 * u;
    let n1 = n01 * (1.0 - u) + n11 * u;

    n0 * (1.0 - v) + n1 * v
}

/// Hash of a lattice corner, mapped to [-1, 1].
fn lattice_hash(x: i32, y: i32, seed: u32) -> f64 {
    let mut n = x
        .wrapping_mul(374_761_393_i32)
        .wrapping_add(y.wrapping_mul(668_265_263_i32))
        .wrapping_add(seed as i32);
    n = n ^ (n >> 13);
    n = n.wrapping_mul(
        n.wrapping_mul(n.wrapping_mul(60493_i32).wrapping_add(19_990_303_i32))
            .wrapping_add(1_376_312_589_i32),
    );
    let normalized = f64::from(n as u32) / f64::from(u32::MAX);
    normalized * 2.0 - 1.0
}

/// Octave parameters for [`fractal_noise_2d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalNoise {
    /// Lattice frequency of the first octave (world units → lattice units).
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude ratio between consecutive octaves.
    pub persistence: f64,
    pub seed: u32,
}

impl FractalNoise {
    /// Sums `octaves` layers of value noise, doubling the frequency and
    /// scaling the amplitude by `persistence` each layer. The sum is divided
    /// by the total amplitude so the result stays in [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let octaves = self.octaves.max(1);
        let mut frequency = self.scale;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut norm = 0.0;

        for octave in 0..octaves {
            let seed = self.seed.wrapping_add(octave.wrapping_mul(1013));
            total += value_noise_2d(x * frequency, y * frequency, seed) * amplitude;
            norm += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }

        if norm > 0.0 { total / norm } else { 0.0 }
    }
}

/// Convenience wrapper around [`FractalNoise::sample`].
#[must_use]
pub fn fractal_noise_2d(x: f64, y: f64, params: FractalNoise) -> f64 {
    params.sample(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_noise_range() {
        for i in 0..200 {
            let x = f64::from(i) * 0.37 - 20.0;
            let y = f64::from(i) * 0.91 - 40.0;
            let n = value_noise_2d(x, y, 42);
            assert!((-1.0..=1.0).contains(&n), "noise out of range: {n}");
        }
    }

    #[test]
    fn test_value_noise_deterministic() {
        assert_eq!(value_noise_2d(1.3, 2.7, 7), value_noise_2d(1.3, 2.7, 7));
        assert_ne!(value_noise_2d(1.3, 2.7, 7), value_noise_2d(1.3, 2.7, 8));
    }

    #[test]
    fn test_value_noise_continuous_across_cells() {
        let a = value_noise_2d(0.999_999, 0.5, 3);
        let b = value_noise_2d(1.000_001, 0.5, 3);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn test_fractal_noise_range() {
        let params = FractalNoise {
            scale: 0.05,
            octaves: 4,
            persistence: 0.5,
            seed: 11,
        };
        for i in 0..100 {
            let v = fractal_noise_2d(f64::from(i) * 3.3, f64::from(i) * -1.7, params);
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
