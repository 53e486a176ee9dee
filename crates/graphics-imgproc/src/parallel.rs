use rayon::prelude::*;

/// Images with at least this many pixels are processed in parallel by [`ExecutionStrategy::Auto`].
pub const AUTO_PARALLEL_MIN_PIXELS: usize = 100_000;

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Pick [`ExecutionStrategy::ParallelRows`] for images with at least
    /// [`AUTO_PARALLEL_MIN_PIXELS`] pixels, [`ExecutionStrategy::Serial`] otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether an image with `num_pixels` pixels should be processed in parallel.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::ParallelRows => true,
            ExecutionStrategy::Auto => num_pixels >= AUTO_PARALLEL_MIN_PIXELS,
        }
    }
}

/// Apply `f` to every output row, passing the row index and the mutable row slice.
///
/// `row_stride` is the number of elements in one row (width * channels) and
/// `num_pixels` drives the [`ExecutionStrategy::Auto`] decision.
pub fn for_each_row<T, F>(
    dst: &mut [T],
    row_stride: usize,
    num_pixels: usize,
    strategy: ExecutionStrategy,
    f: F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_stride == 0 {
        return;
    }

    if strategy.is_parallel(num_pixels) {
        dst.par_chunks_exact_mut(row_stride)
            .enumerate()
            .for_each(|(row, chunk)| f(row, chunk));
    } else {
        dst.chunks_exact_mut(row_stride)
            .enumerate()
            .for_each(|(row, chunk)| f(row, chunk));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_switches_on_pixel_count() {
        assert!(!ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_MIN_PIXELS - 1));
        assert!(ExecutionStrategy::Auto.is_parallel(AUTO_PARALLEL_MIN_PIXELS));
        assert!(ExecutionStrategy::ParallelRows.is_parallel(1));
        assert!(!ExecutionStrategy::Serial.is_parallel(usize::MAX));
    }

    #[test]
    fn rows_are_visited_in_both_modes() {
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelRows] {
            let mut data = vec![0usize; 4 * 3];
            for_each_row(&mut data, 4, 12, strategy, |row, chunk| {
                chunk.iter_mut().for_each(|v| *v = row);
            });
            assert_eq!(data, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
        }
    }
}
