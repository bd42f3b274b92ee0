//! # keycloud GPU
//!
//! GPU-accelerated radius neighborhood search using WGPU.
//!
//! [`GpuRadiusIndex`] implements the same neighborhood backend trait as the
//! CPU indices, so it can be handed straight to the keypoint detector.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use keycloud_gpu::GpuContext;
//! use keycloud_core::Point3d;
//!
//! async fn example() -> keycloud_core::Result<()> {
//!     let gpu_context = GpuContext::new().await?;
//!
//!     let points = vec![Point3d::new(0.0, 0.0, 0.0), Point3d::new(0.1, 0.0, 0.0)];
//!     let neighborhoods = gpu_context.radius_neighborhoods(&points, 0.5).await?;
//!     assert_eq!(neighborhoods.size(0), 2);
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod radius_search;
pub mod utils;

// Re-export commonly used items
pub use device::GpuContext;
pub use radius_search::*;
pub use utils::*;
