//! Point types and related functionality

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A 3D point with single precision coordinates, as uploaded to the GPU
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates, used by the CPU pipeline
pub type Point3d = Point3<f64>;

/// Color used for detected keypoints when painting a cloud
pub const KEYPOINT_COLOR: [u8; 3] = [255, 0, 0];

/// Color used for every other point when painting a cloud
pub const BACKGROUND_COLOR: [u8; 3] = [128, 128, 128];

/// A point with color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3f {
    pub position: Point3f,
    pub color: [u8; 3],
}

impl ColoredPoint3f {
    pub fn new(position: Point3f, color: [u8; 3]) -> Self {
        Self { position, color }
    }
}

impl Default for ColoredPoint3f {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: BACKGROUND_COLOR,
        }
    }
}

/// Narrow a double precision point to single precision.
pub fn to_point3f(point: &Point3d) -> Point3f {
    Point3f::new(point.x as f32, point.y as f32, point.z as f32)
}

/// Returns true when all three coordinates are finite.
pub fn is_finite_point(point: &Point3d) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_point3f() {
        let p = to_point3f(&Point3d::new(1.5, -2.25, 1e-3));
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.y, -2.25);
        assert_relative_eq!(p.z, 1e-3, epsilon = 1e-9);
    }

    #[test]
    fn test_is_finite_point() {
        assert!(is_finite_point(&Point3d::new(0.0, 1.0, 2.0)));
        assert!(!is_finite_point(&Point3d::new(f64::NAN, 1.0, 2.0)));
        assert!(!is_finite_point(&Point3d::new(0.0, f64::INFINITY, 2.0)));
        assert!(!is_finite_point(&Point3d::new(0.0, 1.0, f64::NEG_INFINITY)));
    }

    #[test]
    fn test_colored_point_default_is_background() {
        let p = ColoredPoint3f::default();
        assert_eq!(p.color, BACKGROUND_COLOR);
        assert_eq!(p.position, Point3f::origin());
    }
}
