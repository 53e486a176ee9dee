/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when one of the image dimensions is zero.
    #[error("Invalid image size: width ({0}) and height ({1}) must be greater than zero")]
    InvalidImageSize(usize, usize),

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),
}
