use graphics_image::Image;

use super::{FilterError, Kernel};
use crate::parallel::{for_each_row, ExecutionStrategy};

/// Clamp a possibly out of range index to `[0, len - 1]` (replicate border).
#[inline]
fn clamp_index(idx: isize, len: usize) -> usize {
    idx.clamp(0, len as isize - 1) as usize
}

/// Convolve an image with a square kernel using a replicate border.
///
/// Each output channel is the weighted sum of the kernel neighbourhood divided by
/// [`Kernel::normalization`], rounded and clamped back to `u8`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
/// * `strategy` - Whether rows are processed serially or on the rayon pool.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn filter2d_with_strategy<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    if src.size() != dst.size() {
        return Err(FilterError::SizeMismatch(src.size(), dst.size()));
    }

    let rows = src.rows();
    let cols = src.cols();
    let row_stride = cols * C;
    let radius = kernel.radius() as isize;
    let side = kernel.side();
    let norm = kernel.normalization();
    let src_data = src.as_slice();

    for_each_row(
        dst.as_slice_mut(),
        row_stride,
        src.size().num_pixels(),
        strategy,
        |y, dst_row| {
            for (x, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
                let mut acc = [0.0f32; C];

                for ky in 0..side {
                    let sy = clamp_index(y as isize + ky as isize - radius, rows);
                    let src_row = &src_data[sy * row_stride..(sy + 1) * row_stride];

                    for kx in 0..side {
                        let w = kernel.weight(ky, kx);
                        if w == 0.0 {
                            continue;
                        }
                        let sx = clamp_index(x as isize + kx as isize - radius, cols);
                        let src_pixel = &src_row[sx * C..(sx + 1) * C];
                        acc.iter_mut()
                            .zip(src_pixel.iter())
                            .for_each(|(a, &v)| *a += w * v as f32);
                    }
                }

                dst_pixel
                    .iter_mut()
                    .zip(acc.iter())
                    .for_each(|(d, &a)| *d = (a / norm).round().clamp(0.0, 255.0) as u8);
            }
        },
    );

    Ok(())
}

/// Convolve an image with a square kernel.
///
/// Uses [`ExecutionStrategy::Auto`]. For explicit control, use [`filter2d_with_strategy`].
pub fn filter2d<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
) -> Result<(), FilterError> {
    filter2d_with_strategy(src, dst, kernel, ExecutionStrategy::Auto)
}

/// Apply a kernel to an image, returning a new image of the same size.
///
/// The source image is never modified.
///
/// # Examples
///
/// ```
/// use graphics_image::Image;
/// use graphics_imgproc::filter::{apply_filter, kernels};
///
/// let image = Image::<u8, 3>::from_size_val([8, 4].into(), 100).unwrap();
/// let blurred = apply_filter(&image, &kernels::box_blur()).unwrap();
///
/// assert_eq!(blurred.size(), image.size());
/// assert_eq!(blurred.as_slice(), image.as_slice());
/// ```
pub fn apply_filter<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
) -> Result<Image<u8, C>, FilterError> {
    let mut dst = Image::from_size_val(src.size(), 0u8)?;
    filter2d(src, &mut dst, kernel)?;
    Ok(dst)
}
