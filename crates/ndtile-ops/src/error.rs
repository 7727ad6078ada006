use ndtile_array::LayoutError;
use thiserror::Error;

/// An error type for kernel preconditions.
///
/// Kernels only check what is cheap to verify at entry: buffer sizes, counts, tile
/// divisibility and the O(rank) extent of strided views.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// A buffer does not hold the number of elements the operation requires.
    #[error("Size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch {
        /// The number of elements required.
        expected: usize,
        /// The number of elements provided.
        actual: usize,
    },

    /// An explicit element count disagrees with the view it describes.
    #[error("Count mismatch: {count} elements requested but the view addresses {numel}")]
    CountMismatch {
        /// The count passed by the caller.
        count: usize,
        /// The number of elements addressed by the view.
        numel: usize,
    },

    /// The matrix dimensions are not multiples of the tile size.
    #[error("Dimensions m={m}, n={n}, p={p} are not multiples of the tile size {tile}")]
    NotTileMultiple {
        /// Rows of the left operand and of the output.
        m: usize,
        /// Columns of the left operand and rows of the right operand.
        n: usize,
        /// Columns of the right operand and of the output.
        p: usize,
        /// The tile size.
        tile: usize,
    },

    /// The element count implied by the dimensions does not fit in `usize`.
    #[error("Size overflow: dimensions {0:?} do not fit in the address space")]
    SizeOverflow(Vec<usize>),

    /// The reduction block size is zero.
    #[error("Invalid block size: reductions need at least one element per block")]
    InvalidBlockSize,

    /// The strided view does not fit the buffer.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Returns the product of `dims`, failing instead of wrapping on overflow.
pub(crate) fn checked_size(dims: &[usize]) -> Result<usize, KernelError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| KernelError::SizeOverflow(dims.to_vec()))
}

/// Checks that a buffer holds exactly `expected` elements.
pub(crate) fn check_len(actual: usize, expected: usize) -> Result<(), KernelError> {
    if actual != expected {
        return Err(KernelError::SizeMismatch { expected, actual });
    }
    Ok(())
}
