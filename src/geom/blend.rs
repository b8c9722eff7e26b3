//! Falloff profiles that turn distance-to-center into an influence weight.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Falloff profile of a domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// 1 inside the radius, 0 outside.
    Sharp,
    /// `1 - d/r`, clamped at 0.
    Linear,
    /// Cosine falloff with zero slope at the center and at the radius.
    #[default]
    Smooth,
}

impl BlendMode {
    pub const ALL: [Self; 3] = [Self::Sharp, Self::Linear, Self::Smooth];

    /// Weight in `[0, 1]` of a point at `distance` from a domain of `radius`.
    #[must_use]
    pub fn weight(self, distance: f64, radius: f64) -> f64 {
        if radius.is_nan() || radius <= 0.0 || !distance.is_finite() {
            return 0.0;
        }
        let t = distance.abs() / radius;
        match self {
            Self::Sharp => {
                if t < 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Linear => (1.0 - t).max(0.0),
            Self::Smooth => {
                let w = 0.5 * (1.0 + (PI * t.min(1.0)).cos());
                // cos(pi) is not exactly -1 in floating point
                if t >= 1.0 { 0.0 } else { w.clamp(0.0, 1.0) }
            }
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sharp => "sharp",
            Self::Linear => "linear",
            Self::Smooth => "smooth",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a blend mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode `{0}` (expected sharp, linear or smooth)")]
pub struct ParseBlendModeError(pub String);

impl FromStr for BlendMode {
    type Err = ParseBlendModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharp" => Ok(Self::Sharp),
            "linear" => Ok(Self::Linear),
            "smooth" => Ok(Self::Smooth),
            other => Err(ParseBlendModeError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharp_is_step() {
        assert_eq!(BlendMode::Sharp.weight(0.0, 10.0), 1.0);
        assert_eq!(BlendMode::Sharp.weight(9.999, 10.0), 1.0);
        assert_eq!(BlendMode::Sharp.weight(10.0, 10.0), 0.0);
        assert_eq!(BlendMode::Sharp.weight(20.0, 10.0), 0.0);
    }

    #[test]
    fn test_linear_profile() {
        assert_eq!(BlendMode::Linear.weight(5.0, 10.0), 0.5);
        assert_eq!(BlendMode::Linear.weight(10.0, 10.0), 0.0);
        assert_eq!(BlendMode::Linear.weight(30.0, 10.0), 0.0);
    }

    #[test]
    fn test_smooth_profile() {
        assert_eq!(BlendMode::Smooth.weight(0.0, 10.0), 1.0);
        assert!((BlendMode::Smooth.weight(5.0, 10.0) - 0.5).abs() < 1e-12);
        assert_eq!(BlendMode::Smooth.weight(10.0, 10.0), 0.0);
    }

    #[test]
    fn test_degenerate_radius() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.weight(0.0, 0.0), 0.0);
            assert_eq!(mode.weight(1.0, -5.0), 0.0);
            assert_eq!(mode.weight(f64::NAN, 5.0), 0.0);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Smooth".parse::<BlendMode>().unwrap(), BlendMode::Smooth);
        assert_eq!(" sharp ".parse::<BlendMode>().unwrap(), BlendMode::Sharp);
        assert!("cubic".parse::<BlendMode>().is_err());
    }
}
