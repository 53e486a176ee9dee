use super::FilterError;

/// A square convolution kernel with an odd side length.
///
/// The weights are stored row-major. Every convolution result is divided by
/// [`Kernel::normalization`], which is the sum of the weights, or `1.0` when
/// the weights sum to exactly zero (e.g. edge detectors).
///
/// # Examples
///
/// ```
/// use graphics_imgproc::filter::Kernel;
///
/// let rows: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
/// let kernel = Kernel::from_rows(&rows).unwrap();
///
/// assert_eq!(kernel.side(), 3);
/// assert_eq!(kernel.radius(), 1);
/// assert_eq!(kernel.normalization(), 16.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    side: usize,
    weights: Vec<f32>,
    normalization: f32,
}

impl Kernel {
    /// Create a kernel from a row-major list of `side * side` weights.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelShape`] if `side` is zero or even, or if the
    /// number of weights is not `side * side`, [`FilterError::NonFiniteWeight`] if
    /// any weight is NaN or infinite, and [`FilterError::NonFiniteWeightSum`] if the
    /// weights overflow when summed.
    pub fn new(side: usize, weights: Vec<f32>) -> Result<Self, FilterError> {
        if side == 0 || side % 2 == 0 || weights.len() != side * side {
            return Err(FilterError::InvalidKernelShape {
                rows: side,
                cols: weights.len().checked_div(side).unwrap_or(0),
            });
        }

        if let Some(idx) = weights.iter().position(|w| !w.is_finite()) {
            return Err(FilterError::NonFiniteWeight(idx));
        }

        let sum = weights.iter().sum::<f32>();
        if !sum.is_finite() {
            return Err(FilterError::NonFiniteWeightSum);
        }
        let normalization = if sum != 0.0 { sum } else { 1.0 };

        Ok(Self {
            side,
            weights,
            normalization,
        })
    }

    /// Create a kernel from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelShape`] if there are no rows, if any row length
    /// differs from the number of rows, or if the side length is even.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, FilterError> {
        let num_rows = rows.len();
        let num_cols = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);

        let is_square = rows.iter().all(|r| r.as_ref().len() == num_rows);
        if num_rows == 0 || !is_square || num_rows % 2 == 0 {
            return Err(FilterError::InvalidKernelShape {
                rows: num_rows,
                cols: num_cols,
            });
        }

        let weights = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();

        Self::new(num_rows, weights)
    }

    /// Side length of the square matrix.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Distance from the center to the border of the matrix.
    pub fn radius(&self) -> usize {
        self.side / 2
    }

    /// Weight at `(row, col)`.
    ///
    /// PRECONDITION: `row` and `col` are smaller than [`Kernel::side`].
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.side + col]
    }

    /// Factor every convolution sum is divided by.
    pub fn normalization(&self) -> f32 {
        self.normalization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_from_rows() -> Result<(), FilterError> {
        let rows: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];
        let kernel = Kernel::from_rows(&rows)?;
        assert_eq!(kernel.side(), 3);
        assert_eq!(kernel.weight(1, 1), 5.0);
        assert_eq!(kernel.weight(0, 1), -1.0);
        assert_eq!(kernel.normalization(), 1.0);
        Ok(())
    }

    #[test]
    fn kernel_single_weight() -> Result<(), FilterError> {
        let kernel = Kernel::new(1, vec![3.0])?;
        assert_eq!(kernel.radius(), 0);
        assert_eq!(kernel.normalization(), 3.0);
        Ok(())
    }

    #[test]
    fn zero_sum_kernel_is_not_normalized() -> Result<(), FilterError> {
        let kernel = Kernel::new(3, vec![-1., -1., -1., -1., 8., -1., -1., -1., -1.])?;
        assert_eq!(kernel.normalization(), 1.0);
        Ok(())
    }

    #[test]
    fn kernel_rejects_even_side() {
        let rows: [[f32; 2]; 2] = [[1.0, 1.0], [1.0, 1.0]];
        let res = Kernel::from_rows(&rows);
        assert_eq!(res, Err(FilterError::InvalidKernelShape { rows: 2, cols: 2 }));

        let res = Kernel::new(4, vec![1.0; 16]);
        assert_eq!(res, Err(FilterError::InvalidKernelShape { rows: 4, cols: 4 }));
    }

    #[test]
    fn kernel_rejects_non_square() {
        let rows: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0]];
        let res = Kernel::from_rows(&rows);
        assert_eq!(res, Err(FilterError::InvalidKernelShape { rows: 3, cols: 3 }));

        let rows: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0]];
        let res = Kernel::from_rows(&rows);
        assert_eq!(res, Err(FilterError::InvalidKernelShape { rows: 1, cols: 3 }));
    }

    #[test]
    fn kernel_rejects_empty() {
        let rows: Vec<Vec<f32>> = vec![];
        assert_eq!(
            Kernel::from_rows(&rows),
            Err(FilterError::InvalidKernelShape { rows: 0, cols: 0 })
        );

        let rows: Vec<Vec<f32>> = vec![vec![]];
        assert_eq!(
            Kernel::from_rows(&rows),
            Err(FilterError::InvalidKernelShape { rows: 1, cols: 0 })
        );

        assert_eq!(
            Kernel::new(0, vec![]),
            Err(FilterError::InvalidKernelShape { rows: 0, cols: 0 })
        );
    }

    #[test]
    fn tiny_sum_kernel_is_normalized() -> Result<(), FilterError> {
        let kernel = Kernel::new(1, vec![1e-7])?;
        assert_eq!(kernel.normalization(), 1e-7);

        let kernel = Kernel::new(3, vec![1e-8; 9])?;
        assert!((kernel.normalization() - 9e-8).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn kernel_rejects_overflowing_sum() {
        let res = Kernel::new(3, vec![3e38; 9]);
        assert_eq!(res, Err(FilterError::NonFiniteWeightSum));
    }

    #[test]
    fn kernel_rejects_non_finite() {
        let res = Kernel::new(1, vec![f32::NAN]);
        assert_eq!(res, Err(FilterError::NonFiniteWeight(0)));

        let rows: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, f32::INFINITY, 1.0], [1.0, 1.0, 1.0]];
        let res = Kernel::from_rows(&rows);
        assert_eq!(res, Err(FilterError::NonFiniteWeight(4)));
    }
}
