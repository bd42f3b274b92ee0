//! Point cloud container
//!
//! A point's position in [`PointCloud::points`] is its identity for the whole
//! detection run: neighborhoods, saliency values and keypoint masks are all
//! indexed the same way.

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A generic point cloud container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with double precision points
pub type PointCloud3d = PointCloud<Point3d>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrow the points as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.points
    }
}

impl PointCloud<Point3d> {
    /// Build a cloud from a flat `[x0, y0, z0, x1, y1, z1, ...]` array.
    ///
    /// This is the shape handed over by scan readers and samplers.
    pub fn from_flat(coords: &[f64]) -> Result<Self> {
        if coords.len() % 3 != 0 {
            return Err(Error::InvalidInput(format!(
                "flat coordinate array length {} is not a multiple of 3",
                coords.len()
            )));
        }

        Ok(coords
            .chunks_exact(3)
            .map(|c| Point3d::new(c[0], c[1], c[2]))
            .collect())
    }

    /// Check that the cloud is non-empty and every coordinate is finite.
    pub fn validate(&self) -> Result<()> {
        validate_points(&self.points)
    }

    /// Paint keypoints red and everything else gray.
    ///
    /// The mask must have one entry per point.
    pub fn colorize_keypoints(&self, mask: &[bool]) -> Result<PointCloud<ColoredPoint3f>> {
        if mask.len() != self.len() {
            return Err(Error::InvalidInput(format!(
                "mask has {} entries but the cloud has {} points",
                mask.len(),
                self.len()
            )));
        }

        Ok(self
            .points
            .iter()
            .zip(mask)
            .map(|(p, &is_keypoint)| {
                let color = if is_keypoint { KEYPOINT_COLOR } else { BACKGROUND_COLOR };
                ColoredPoint3f::new(to_point3f(p), color)
            })
            .collect())
    }
}

/// Reject empty inputs and NaN/Inf coordinates.
pub fn validate_points(points: &[Point3d]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::InvalidInput("point cloud is empty".to_string()));
    }

    if let Some(idx) = points.iter().position(|p| !is_finite_point(p)) {
        return Err(Error::InvalidInput(format!(
            "point {} has a non-finite coordinate: {:?}",
            idx, points[idx]
        )));
    }

    Ok(())
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}
