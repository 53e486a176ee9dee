//! Filter operations
//!
//! This module provides convolution filters for image processing.

/// Filter kernels
pub mod kernels;

/// Square convolution kernel type
mod kernel;
pub use kernel::Kernel;

/// Errors raised by the filter operations
mod error;
pub use error::FilterError;

/// 2D convolution
mod convolution;
pub use convolution::*;
