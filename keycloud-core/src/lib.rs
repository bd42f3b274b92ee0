//! Core data structures and traits for keycloud
//!
//! This crate provides the fundamental types shared by the keypoint detection
//! pipeline: points, point clouds, radius neighborhoods, detector configuration
//! and the neighborhood search trait implemented by the CPU and GPU backends.

pub mod point;
pub mod point_cloud;
pub mod neighborhood;
pub mod traits;
pub mod config;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use neighborhood::*;
pub use traits::*;
pub use config::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3};
