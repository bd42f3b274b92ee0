//! Error types for keycloud

use thiserror::Error;

/// Main error type for keycloud operations
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any computation starts: empty clouds, non-finite
    /// coordinates, out-of-range parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Result type alias for keycloud operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "gpu")]
impl From<wgpu::BufferAsyncError> for Error {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Error::Gpu(e.to_string())
    }
}

#[cfg(feature = "gpu")]
impl From<wgpu::RequestDeviceError> for Error {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Error::Gpu(format!("Failed to create device: {}", e))
    }
}
