#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Command line and validated server settings.
pub mod config;

/// Content type check, body reading and JPEG decoding.
pub mod decode;

/// The per-request pipeline and the shared application state.
pub mod dispatch;

/// Pipeline errors and their HTTP rendering.
pub mod error;

/// Operation names and the built-in kernels.
pub mod registry;

/// HTTP routes and middleware.
pub mod routes;

/// Filtering and JPEG encoding of decoded images.
pub mod service;

pub use crate::dispatch::AppState;
pub use crate::error::{KernelError, PipelineError};
pub use crate::routes::router;
