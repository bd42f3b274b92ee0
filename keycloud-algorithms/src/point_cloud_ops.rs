//! Keypoint operations on point clouds

use crate::keypoints::{IssDetector, IssKeypoints};
use crate::nearest_neighbor::RTreeIndex;
use keycloud_core::{IssConfig, NeighborhoodIndex, Neighborhoods, Point3d, PointCloud, Result};

/// Extension trait for PointCloud to add ISS keypoint detection
pub trait PointCloudKeypoints {
    /// Detect ISS keypoints using the tree backend
    ///
    /// # Example
    /// ```rust
    /// use keycloud_core::{IssConfig, Point3d, PointCloud};
    /// use keycloud_algorithms::PointCloudKeypoints;
    ///
    /// let cloud = PointCloud::from_points(vec![
    ///     Point3d::new(0.0, 0.0, 0.0),
    ///     Point3d::new(1.0, 0.0, 0.0),
    ///     Point3d::new(0.0, 0.5, 0.0),
    ///     Point3d::new(0.0, 0.0, 0.25),
    /// ]);
    ///
    /// let keypoints = cloud.iss_keypoints(&IssConfig::new(0.9, 0.9, 1.5)).unwrap();
    /// assert_eq!(keypoints.mask.len(), cloud.len());
    /// ```
    fn iss_keypoints(&self, config: &IssConfig) -> Result<IssKeypoints>;

    /// Detect ISS keypoints and return them as a new point cloud
    fn extract_keypoints(&self, config: &IssConfig) -> Result<PointCloud<Point3d>>;

    /// Radius neighborhood of every point using the tree backend
    fn radius_neighborhoods(&self, radius: f64) -> Result<Neighborhoods>;
}

impl PointCloudKeypoints for PointCloud<Point3d> {
    fn iss_keypoints(&self, config: &IssConfig) -> Result<IssKeypoints> {
        IssDetector::default().detect(&self.points, config)
    }

    fn extract_keypoints(&self, config: &IssConfig) -> Result<PointCloud<Point3d>> {
        let keypoints = self.iss_keypoints(config)?;
        Ok(keypoints.indices().into_iter().map(|idx| self.points[idx]).collect())
    }

    fn radius_neighborhoods(&self, radius: f64) -> Result<Neighborhoods> {
        RTreeIndex.radius_neighborhoods(&self.points, radius)
    }
}
