//! Core traits for keycloud

use crate::{neighborhood::Neighborhoods, point::Point3d, Result};

/// Backend answering fixed-radius neighbor queries for a whole cloud.
///
/// Every implementation must return, for each point `i`, the ascending list of
/// indices `j` with `|p_j - p_i| <= radius` (Euclidean), `i` included. Backends
/// are interchangeable inside the detector and must agree up to the precision
/// they compute distances in.
pub trait NeighborhoodIndex: Send + Sync {
    /// Short backend name used in log output
    fn name(&self) -> &str;

    /// Compute the radius neighborhood of every point
    fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods>;
}

impl<T: NeighborhoodIndex + ?Sized> NeighborhoodIndex for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods> {
        (**self).radius_neighborhoods(points, radius)
    }
}
