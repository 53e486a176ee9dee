#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for encoding and decoding failures.
pub mod error;

/// JPEG image encoding and decoding.
///
/// Pure Rust JPEG codec operating on in-memory buffers.
pub mod jpeg;

pub use crate::error::IoError;
