use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use graphics_imgproc::filter::FilterError;
use serde::Serialize;

/// A custom kernel that cannot be used for filtering.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KernelError {
    /// The kernel is missing or is not a JSON matrix of finite numbers.
    #[error("Malformed kernel. {0}")]
    Malformed(String),

    /// The kernel matrix is empty, ragged, not square or has an even side length.
    #[error("Invalid kernel shape {rows}x{cols}: kernel must be square with an odd side length")]
    InvalidShape {
        /// Number of rows in the submitted matrix.
        rows: usize,
        /// Number of columns in the submitted matrix (the longest row for ragged input).
        cols: usize,
    },
}

impl From<FilterError> for KernelError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidKernelShape { rows, cols } => Self::InvalidShape { rows, cols },
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Every way a filter request can fail.
///
/// Each variant maps to one machine readable [`category`](PipelineError::category) and one
/// HTTP status. Client errors carry their detail to the caller; internal errors are logged
/// and answered with a generic message.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The declared content type is not `image/jpeg`.
    #[error("Unsupported content type '{0}', expected image/jpeg")]
    UnsupportedContentType(String),

    /// The request body could not be read completely.
    #[error("Error reading file. {0}")]
    Read(String),

    /// The body is not a well formed JPEG image.
    #[error("Error decoding image. {0}")]
    Decode(String),

    /// The custom kernel was rejected.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// The filter capability failed on a valid request.
    #[error("Error applying filter. {0}")]
    Filter(#[from] FilterError),

    /// The filtered image could not be encoded.
    #[error("Error encoding image. {0}")]
    Encode(String),

    /// A blocking pipeline step panicked or was cancelled.
    #[error("Pipeline task failed. {0}")]
    Task(String),

    /// The route does not name a known operation.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}

impl PipelineError {
    /// Machine readable name of the failure, sent as `error_type`.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType(_) => "unsupported_content_type",
            Self::Read(_) => "read_error",
            Self::Decode(_) => "decode_error",
            Self::Kernel(KernelError::Malformed(_)) => "kernel_malformed",
            Self::Kernel(KernelError::InvalidShape { .. }) => "kernel_invalid_shape",
            Self::Filter(_) => "filter_error",
            Self::Encode(_) => "encode_error",
            Self::Task(_) => "internal_error",
            Self::UnknownOperation(_) => "unknown_operation",
        }
    }

    /// HTTP status the failure is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Read(_) | Self::Decode(_) | Self::Kernel(_) => StatusCode::BAD_REQUEST,
            Self::Filter(_) | Self::Encode(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::UnknownOperation(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Whether the failure originates on the server side of the pipeline.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Filter(_) | Self::Encode(_) | Self::Task(_))
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// See [`PipelineError::category`].
    pub error_type: &'static str,
    /// Human readable description.
    pub message: String,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        let message = if err.is_internal() {
            String::from("Failed to transform image")
        } else {
            err.to_string()
        };

        Self {
            error_type: err.category(),
            message,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            log::error!("{}: {self}", self.category());
        } else {
            log::debug!("rejected request with {}: {self}", self.category());
        }

        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}
