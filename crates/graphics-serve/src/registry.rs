use std::{fmt, str::FromStr};

use graphics_imgproc::filter::{kernels, Kernel};

use crate::error::{KernelError, PipelineError};

/// Logical operation named by the request route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationName {
    /// Sharpen the image.
    Sharpen,
    /// Laplacian edge detection.
    EdgeDetection,
    /// 3x3 binomial blur.
    GaussianBlur,
    /// 3x3 mean blur.
    BoxBlur,
    /// Kernel supplied by the caller.
    Custom,
}

impl OperationName {
    /// Every operation, in route order.
    pub const ALL: [OperationName; 5] = [
        Self::Sharpen,
        Self::EdgeDetection,
        Self::GaussianBlur,
        Self::BoxBlur,
        Self::Custom,
    ];

    /// Canonical route segment of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sharpen => "sharpen",
            Self::EdgeDetection => "edge-detection",
            Self::GaussianBlur => "gaussian-blur",
            Self::BoxBlur => "box-blur",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharpen" => Ok(Self::Sharpen),
            "edge-detection" | "edgedetection" => Ok(Self::EdgeDetection),
            "gaussian-blur" | "gaussianblur" => Ok(Self::GaussianBlur),
            "box-blur" | "boxblur" => Ok(Self::BoxBlur),
            "custom" => Ok(Self::Custom),
            other => Err(PipelineError::UnknownOperation(other.to_owned())),
        }
    }
}

/// A resolved operation, carrying its kernel when the caller supplied one.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// See [`kernels::sharpen`].
    Sharpen,
    /// See [`kernels::edge_detection`].
    EdgeDetection,
    /// See [`kernels::gaussian_blur`].
    GaussianBlur,
    /// See [`kernels::box_blur`].
    BoxBlur,
    /// A validated caller supplied kernel.
    Custom(Kernel),
}

impl Operation {
    /// Build the operation for a request.
    ///
    /// `kernel_param` is only read for [`OperationName::Custom`], where it is required.
    ///
    /// # Errors
    ///
    /// See [`parse_custom_kernel`]. A custom request without a kernel is
    /// [`KernelError::Malformed`].
    pub fn resolve_request(
        name: OperationName,
        kernel_param: Option<&str>,
    ) -> Result<Self, KernelError> {
        Ok(match name {
            OperationName::Sharpen => Self::Sharpen,
            OperationName::EdgeDetection => Self::EdgeDetection,
            OperationName::GaussianBlur => Self::GaussianBlur,
            OperationName::BoxBlur => Self::BoxBlur,
            OperationName::Custom => {
                let raw = kernel_param.ok_or_else(|| {
                    KernelError::Malformed(String::from("missing 'kernel' parameter"))
                })?;
                Self::Custom(parse_custom_kernel(raw)?)
            }
        })
    }

    /// Name of the operation.
    pub fn name(&self) -> OperationName {
        match self {
            Self::Sharpen => OperationName::Sharpen,
            Self::EdgeDetection => OperationName::EdgeDetection,
            Self::GaussianBlur => OperationName::GaussianBlur,
            Self::BoxBlur => OperationName::BoxBlur,
            Self::Custom(_) => OperationName::Custom,
        }
    }
}

/// Parse a custom kernel given as a JSON array of numeric rows, e.g. `[[0,-1,0],[-1,5,-1],[0,-1,0]]`.
///
/// # Errors
///
/// [`KernelError::Malformed`] if the input is not a JSON matrix of finite numbers and
/// [`KernelError::InvalidShape`] if the matrix is empty, ragged, not square or even sided.
pub fn parse_custom_kernel(raw: &str) -> Result<Kernel, KernelError> {
    let rows: Vec<Vec<f32>> =
        serde_json::from_str(raw).map_err(|e| KernelError::Malformed(e.to_string()))?;
    Ok(Kernel::from_rows(&rows)?)
}

/// The built-in kernels, built once at start-up and shared read-only.
#[derive(Clone, Debug)]
pub struct KernelRegistry {
    sharpen: Kernel,
    edge_detection: Kernel,
    gaussian_blur: Kernel,
    box_blur: Kernel,
}

impl KernelRegistry {
    /// Registry holding the four named 3x3 kernels.
    pub fn builtin() -> Self {
        Self {
            sharpen: kernels::sharpen(),
            edge_detection: kernels::edge_detection(),
            gaussian_blur: kernels::gaussian_blur(),
            box_blur: kernels::box_blur(),
        }
    }

    /// Kernel to convolve with for `operation`.
    pub fn resolve<'a>(&'a self, operation: &'a Operation) -> &'a Kernel {
        match operation {
            Operation::Sharpen => &self.sharpen,
            Operation::EdgeDetection => &self.edge_detection,
            Operation::GaussianBlur => &self.gaussian_blur,
            Operation::BoxBlur => &self.box_blur,
            Operation::Custom(kernel) => kernel,
        }
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
