use super::{FilterError, Kernel};

// NOTE: the named kernels are valid by construction
fn fixed_3x3(weights: [f32; 9]) -> Kernel {
    Kernel::new(3, weights.to_vec())
        .unwrap_or_else(|e| unreachable!("fixed 3x3 kernel must be valid: {e}"))
}

/// Create a 3x3 sharpen kernel.
///
/// ```text
///  0 -1  0
/// -1  5 -1
///  0 -1  0
/// ```
pub fn sharpen() -> Kernel {
    fixed_3x3([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
}

/// Create a 3x3 edge detection (laplacian) kernel.
///
/// ```text
/// -1 -1 -1
/// -1  8 -1
/// -1 -1 -1
/// ```
pub fn edge_detection() -> Kernel {
    fixed_3x3([-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0])
}

/// Create a 3x3 binomial gaussian blur kernel, normalized by 16.
pub fn gaussian_blur() -> Kernel {
    fixed_3x3([1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0])
}

/// Create a 3x3 box blur kernel, normalized by 9.
pub fn box_blur() -> Kernel {
    fixed_3x3([1.0; 9])
}

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Build a square 2D kernel from the outer product of a 1D kernel with itself.
///
/// # Errors
///
/// Fails with [`FilterError::InvalidKernelShape`] when the 1D kernel is empty or has an
/// even length.
pub fn outer_product(kernel_1d: &[f32]) -> Result<Kernel, FilterError> {
    let weights = kernel_1d
        .iter()
        .flat_map(|&ky| kernel_1d.iter().map(move |&kx| ky * kx))
        .collect();
    Kernel::new(kernel_1d.len(), weights)
}
