//! # keycloud Algorithms
//!
//! Intrinsic Shape Signatures (ISS) keypoint detection for 3D point clouds.
//!
//! The pipeline searches radius neighborhoods, scores every point from the
//! eigenvalues of its weighted local covariance, and suppresses all but the
//! most salient candidate in each neighborhood.
//!
//! ```rust
//! use keycloud_core::Point3d;
//! use keycloud_algorithms::find_keypoints;
//!
//! let points = vec![
//!     Point3d::new(0.0, 0.0, 0.0),
//!     Point3d::new(1.0, 0.0, 0.0),
//!     Point3d::new(0.0, 0.5, 0.0),
//!     Point3d::new(0.0, 0.0, 0.25),
//! ];
//! let mask = find_keypoints(&points, 0.9, 0.9, 1.5, None).unwrap();
//! assert_eq!(mask.len(), points.len());
//! ```

pub mod nearest_neighbor;
pub mod saliency;
pub mod nms;
pub mod keypoints;
pub mod point_cloud_ops;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use saliency::*;
pub use nms::*;
pub use keypoints::*;
pub use point_cloud_ops::*;
