/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error to decode the JPEG image.
    #[error("Error with Jpeg decoding. {0}")]
    JpegDecodingError(#[from] zune_jpeg::errors::DecodeErrors),

    /// The JPEG stream ends before its end of image marker.
    #[error("Error with Jpeg decoding. The stream is truncated before the end of image marker")]
    JpegTruncated,

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[from] jpeg_encoder::EncodingError),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] graphics_image::ImageError),

    /// The image does not fit the JPEG 16 bit dimension fields.
    #[error("Image of size {0}x{1} is too large to be encoded as JPEG")]
    ImageTooLarge(usize, usize),
}
