use graphics_image::{ImageError, ImageSize};

/// An error type for the filter module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel matrix is empty, not square or has an even side length.
    #[error("Invalid kernel shape {rows}x{cols}: kernel must be square with an odd side length")]
    InvalidKernelShape {
        /// Number of rows in the offending matrix.
        rows: usize,
        /// Number of columns in the offending matrix (the longest row for ragged input).
        cols: usize,
    },

    /// A kernel weight is NaN or infinite.
    #[error("Kernel weight at index {0} is not a finite number")]
    NonFiniteWeight(usize),

    /// The kernel weights overflow when summed into the normalization factor.
    #[error("Kernel weights do not sum to a finite number")]
    NonFiniteWeightSum,

    /// Source and destination images differ in size.
    #[error("Source ({0}) and destination ({1}) image sizes do not match")]
    SizeMismatch(ImageSize, ImageSize),

    /// Error while allocating or accessing an image.
    #[error("Image error. {0}")]
    Image(#[from] ImageError),
}
