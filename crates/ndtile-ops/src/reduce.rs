use ndtile_array::{AlignedBuffer, BufferAllocator, Scalar};

use crate::error::{checked_size, KernelError};
use crate::kernels::maximum;

/// Reduces consecutive blocks of `reduce_size` elements to their maximum.
///
/// A block containing NaN reduces to NaN.
///
/// # Arguments
///
/// * `a` - Compact input of `out.len() * reduce_size` elements.
/// * `out` - One output per block, in block order.
/// * `reduce_size` - The number of elements per block.
///
/// # Errors
///
/// * `InvalidBlockSize` if `reduce_size` is zero.
/// * `SizeMismatch` if `a` does not hold `out.len() * reduce_size` elements.
///
/// # Example
///
/// ```
/// use ndtile_array::AlignedBuffer;
/// use ndtile_ops::reduce::reduce_max;
///
/// let a = AlignedBuffer::from_slice(&[3.0, 1.0, 2.0, 1.0, 2.0, 3.0]).unwrap();
/// let mut out = AlignedBuffer::new(2).unwrap();
/// reduce_max(&a, &mut out, 3).unwrap();
/// assert_eq!(out.as_slice(), &[3.0, 3.0]);
/// ```
pub fn reduce_max<A1: BufferAllocator, A2: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    reduce_size: usize,
) -> Result<(), KernelError> {
    check_blocks(a.len(), out.len(), reduce_size)?;

    a.as_slice()
        .chunks_exact(reduce_size)
        .zip(out.as_mut_slice())
        .for_each(|(block, o)| {
            *o = block[1..].iter().fold(block[0], |acc, &v| maximum(acc, v));
        });

    Ok(())
}

/// Reduces consecutive blocks of `reduce_size` elements to their sum.
///
/// The sum accumulates in single precision, left to right within each block.
///
/// # Errors
///
/// * `InvalidBlockSize` if `reduce_size` is zero.
/// * `SizeMismatch` if `a` does not hold `out.len() * reduce_size` elements.
pub fn reduce_sum<A1: BufferAllocator, A2: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    reduce_size: usize,
) -> Result<(), KernelError> {
    check_blocks(a.len(), out.len(), reduce_size)?;

    a.as_slice()
        .chunks_exact(reduce_size)
        .zip(out.as_mut_slice())
        .for_each(|(block, o)| {
            *o = block.iter().fold(0.0 as Scalar, |acc, &v| acc + v);
        });

    Ok(())
}

fn check_blocks(len: usize, blocks: usize, reduce_size: usize) -> Result<(), KernelError> {
    if reduce_size == 0 {
        return Err(KernelError::InvalidBlockSize);
    }
    let expected = checked_size(&[blocks, reduce_size])?;
    if len != expected {
        return Err(KernelError::SizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}
