use std::{fmt, sync::Arc};

use graphics_imgproc::filter::{FilterError, Kernel};
use graphics_io::jpeg::{encode_image_jpeg_rgb8, DEFAULT_JPEG_QUALITY};

use crate::{decode::DecodedImage, error::PipelineError};

/// Content type of every successful response.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// The filter capability used by [`TransformService`].
///
/// Implementations must return a new image with the dimensions of the input.
pub trait ImageFilter: Send + Sync {
    /// Convolve `image` with `kernel`.
    fn apply_filter(&self, image: &DecodedImage, kernel: &Kernel)
        -> Result<DecodedImage, FilterError>;
}

/// [`ImageFilter`] backed by [`graphics_imgproc::filter::apply_filter`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ConvolutionFilter;

impl ImageFilter for ConvolutionFilter {
    fn apply_filter(
        &self,
        image: &DecodedImage,
        kernel: &Kernel,
    ) -> Result<DecodedImage, FilterError> {
        graphics_imgproc::filter::apply_filter(image, kernel)
    }
}

/// Encoded output of a successful request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedResult {
    /// The encoded image.
    pub bytes: Vec<u8>,
    /// Always [`OUTPUT_CONTENT_TYPE`].
    pub content_type: &'static str,
}

/// Filters decoded images and encodes the result as JPEG.
///
/// Holds no mutable state, a single instance is shared by all requests.
#[derive(Clone)]
pub struct TransformService {
    filter: Arc<dyn ImageFilter>,
    quality: u8,
}

impl TransformService {
    /// Service using [`ConvolutionFilter`] and the given JPEG quality.
    pub fn new(quality: u8) -> Self {
        Self::with_filter(Arc::new(ConvolutionFilter), quality)
    }

    /// Service using a custom filter capability.
    pub fn with_filter(filter: Arc<dyn ImageFilter>, quality: u8) -> Self {
        Self { filter, quality }
    }

    /// JPEG quality of the encoded output.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Apply `kernel` to `image`, checking that the dimensions are preserved.
    pub fn filter(
        &self,
        image: &DecodedImage,
        kernel: &Kernel,
    ) -> Result<DecodedImage, PipelineError> {
        let filtered = self.filter.apply_filter(image, kernel)?;

        if filtered.size() != image.size() {
            return Err(FilterError::SizeMismatch(image.size(), filtered.size()).into());
        }

        Ok(filtered)
    }

    /// Encode a filtered image.
    pub fn encode(&self, image: &DecodedImage) -> Result<EncodedResult, PipelineError> {
        let bytes = encode_image_jpeg_rgb8(image, self.quality)
            .map_err(|e| PipelineError::Encode(e.to_string()))?;

        Ok(EncodedResult {
            bytes,
            content_type: OUTPUT_CONTENT_TYPE,
        })
    }

    /// Filter and encode in one step.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Filter`] when the filter capability fails or changes the image
    /// dimensions, [`PipelineError::Encode`] when the output cannot be encoded.
    pub fn transform(
        &self,
        image: DecodedImage,
        kernel: &Kernel,
    ) -> Result<EncodedResult, PipelineError> {
        let filtered = self.filter(&image, kernel)?;
        drop(image);
        self.encode(&filtered)
    }
}

impl Default for TransformService {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl fmt::Debug for TransformService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformService")
            .field("quality", &self.quality)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphics_image::ImageSize;
    use graphics_imgproc::filter::kernels;
    use graphics_io::jpeg::decode_image_jpeg_rgb8;

    struct CroppingFilter;

    impl ImageFilter for CroppingFilter {
        fn apply_filter(
            &self,
            image: &DecodedImage,
            _kernel: &Kernel,
        ) -> Result<DecodedImage, FilterError> {
            let size = ImageSize {
                width: image.width() - 1,
                height: image.height(),
            };
            Ok(DecodedImage::from_size_val(size, 0)?)
        }
    }

    struct BrokenFilter;

    impl ImageFilter for BrokenFilter {
        fn apply_filter(
            &self,
            _image: &DecodedImage,
            _kernel: &Kernel,
        ) -> Result<DecodedImage, FilterError> {
            Err(FilterError::NonFiniteWeight(0))
        }
    }

    fn stripes(width: usize, height: usize) -> Result<DecodedImage, PipelineError> {
        let data = (0..height)
            .flat_map(|_| (0..width).map(|x| if x % 4 < 2 { 250 } else { 10 }))
            .flat_map(|v| [v, v, v])
            .collect();
        DecodedImage::new([width, height].into(), data)
            .map_err(|e| PipelineError::Decode(e.to_string()))
    }

    #[test]
    fn builtin_kernels_preserve_dimensions() -> Result<(), PipelineError> {
        let service = TransformService::default();
        assert_eq!(service.quality(), DEFAULT_JPEG_QUALITY);

        for kernel in [
            kernels::sharpen(),
            kernels::edge_detection(),
            kernels::gaussian_blur(),
            kernels::box_blur(),
        ] {
            let result = service.transform(stripes(37, 21)?, &kernel)?;
            assert_eq!(result.content_type, OUTPUT_CONTENT_TYPE);

            let decoded = decode_image_jpeg_rgb8(&result.bytes)
                .map_err(|e| PipelineError::Decode(e.to_string()))?;
            assert_eq!(decoded.width(), 37);
            assert_eq!(decoded.height(), 21);
        }
        Ok(())
    }

    #[test]
    fn transform_is_deterministic() -> Result<(), PipelineError> {
        let service = TransformService::new(90);
        let first = service.transform(stripes(32, 32)?, &kernels::sharpen())?;
        let second = service.transform(stripes(32, 32)?, &kernels::sharpen())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn filter_failure_is_internal() -> Result<(), PipelineError> {
        let service = TransformService::with_filter(Arc::new(BrokenFilter), 75);
        let res = service.transform(stripes(8, 8)?, &kernels::box_blur());
        assert!(matches!(res, Err(PipelineError::Filter(_))));
        Ok(())
    }

    #[test]
    fn dimension_change_is_a_filter_error() -> Result<(), PipelineError> {
        let service = TransformService::with_filter(Arc::new(CroppingFilter), 75);
        let res = service.transform(stripes(8, 8)?, &kernels::box_blur());
        assert!(matches!(
            res,
            Err(PipelineError::Filter(FilterError::SizeMismatch(..)))
        ));
        Ok(())
    }

    #[test]
    fn oversized_output_is_an_encode_error() -> Result<(), PipelineError> {
        let service = TransformService::default();
        let res = service.transform(stripes(70_000, 1)?, &kernels::box_blur());
        assert!(matches!(res, Err(PipelineError::Encode(_))));
        Ok(())
    }
}
