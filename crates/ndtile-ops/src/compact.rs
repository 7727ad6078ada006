use ndtile_array::{AlignedBuffer, BufferAllocator, Scalar, StridedLayout};

use crate::error::KernelError;

/// Copies the elements addressed by a strided view into a compact buffer.
///
/// The elements are written in canonical order (last axis fastest), so `out` holds the
/// view as a zero-offset, row-major array.
///
/// # Arguments
///
/// * `a` - The buffer the view reads from.
/// * `out` - The compact destination; it must hold at least `layout.numel()` elements.
/// * `layout` - Shape, strides and offset of the view into `a`.
///
/// # Errors
///
/// * `Layout` if the view addresses positions outside `a`.
/// * `SizeMismatch` if `out` is too small.
///
/// # Example
///
/// ```
/// use ndtile_array::{AlignedBuffer, StridedLayout};
/// use ndtile_ops::compact::compact;
///
/// let a = AlignedBuffer::from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let mut out = AlignedBuffer::new(6).unwrap();
///
/// // transpose of the 2x3 array
/// let layout = StridedLayout::new(vec![3, 2], vec![1, 3], 0).unwrap();
/// compact(&a, &mut out, &layout).unwrap();
/// assert_eq!(out.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
/// ```
pub fn compact<A1: BufferAllocator, A2: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    layout: &StridedLayout,
) -> Result<(), KernelError> {
    layout.validate(a.len())?;
    let numel = layout.numel();
    check_capacity(out.len(), numel)?;

    log::trace!(
        "compact: shape={:?} strides={:?} offset={}",
        layout.shape,
        layout.strides,
        layout.offset
    );

    let src = a.as_slice();
    out.as_mut_slice()
        .iter_mut()
        .zip(layout.positions())
        .for_each(|(dst, pos)| *dst = src[pos]);

    Ok(())
}

/// Scatters a compact buffer into the positions addressed by a strided view.
///
/// This is the inverse of [`compact`]: element `k` of `a` lands on the `k`-th position of
/// the view in canonical order.
///
/// # Arguments
///
/// * `a` - The compact source; it must hold at least `layout.numel()` elements.
/// * `out` - The buffer the view writes into.
/// * `layout` - Shape, strides and offset of the view into `out`.
///
/// # Errors
///
/// * `Layout` if the view addresses positions outside `out`.
/// * `SizeMismatch` if `a` is too small.
pub fn ewise_setitem<A1: BufferAllocator, A2: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    layout: &StridedLayout,
) -> Result<(), KernelError> {
    layout.validate(out.len())?;
    let numel = layout.numel();
    check_capacity(a.len(), numel)?;

    log::trace!(
        "ewise_setitem: shape={:?} strides={:?} offset={}",
        layout.shape,
        layout.strides,
        layout.offset
    );

    let dst = out.as_mut_slice();
    a.as_slice()
        .iter()
        .zip(layout.positions())
        .for_each(|(&val, pos)| dst[pos] = val);

    Ok(())
}

/// Writes `val` to every position addressed by a strided view.
///
/// # Arguments
///
/// * `size` - The number of positions to write; must equal `layout.numel()`.
/// * `val` - The value to write.
/// * `out` - The buffer the view writes into.
/// * `layout` - Shape, strides and offset of the view into `out`.
///
/// # Errors
///
/// * `CountMismatch` if `size` is not the number of addressed elements.
/// * `Layout` if the view addresses positions outside `out`.
pub fn scalar_setitem<A: BufferAllocator>(
    size: usize,
    val: Scalar,
    out: &mut AlignedBuffer<A>,
    layout: &StridedLayout,
) -> Result<(), KernelError> {
    let numel = layout.numel();
    if size != numel {
        return Err(KernelError::CountMismatch { count: size, numel });
    }
    layout.validate(out.len())?;

    log::trace!(
        "scalar_setitem: shape={:?} strides={:?} offset={} val={}",
        layout.shape,
        layout.strides,
        layout.offset,
        val
    );

    let dst = out.as_mut_slice();
    layout.positions().for_each(|pos| dst[pos] = val);

    Ok(())
}

fn check_capacity(actual: usize, required: usize) -> Result<(), KernelError> {
    if actual < required {
        return Err(KernelError::SizeMismatch {
            expected: required,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndtile_array::{BufferAllocatorError, CpuAllocator, LayoutError};
    use std::alloc::Layout;

    fn arange(n: usize) -> Result<AlignedBuffer, BufferAllocatorError> {
        let data: Vec<Scalar> = (0..n).map(|i| i as Scalar).collect();
        AlignedBuffer::from_slice(&data)
    }

    #[test]
    fn test_compact_identity() -> Result<(), Box<dyn std::error::Error>> {
        let a = arange(6)?;
        let mut out = AlignedBuffer::new(6)?;
        compact(&a, &mut out, &StridedLayout::compact(&[2, 3]))?;
        assert_eq!(out.as_slice(), a.as_slice());
        Ok(())
    }

    #[test]
    fn test_compact_slice_with_offset() -> Result<(), Box<dyn std::error::Error>> {
        // rows 1..3, columns 1..3 of a 4x4 array
        let a = arange(16)?;
        let mut out = AlignedBuffer::new(4)?;
        let layout = StridedLayout::new(vec![2, 2], vec![4, 1], 5)?;
        compact(&a, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[5.0, 6.0, 9.0, 10.0]);
        Ok(())
    }

    #[test]
    fn test_compact_broadcast() -> Result<(), Box<dyn std::error::Error>> {
        let a = AlignedBuffer::from_slice(&[1.0, 2.0, 3.0])?;
        let mut out = AlignedBuffer::new(6)?;
        let layout = StridedLayout::new(vec![2, 3], vec![0, 1], 0)?;
        compact(&a, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_compact_rank_zero() -> Result<(), Box<dyn std::error::Error>> {
        let a = arange(4)?;
        let mut out = AlignedBuffer::new(1)?;
        let layout = StridedLayout::new(vec![], vec![], 3)?;
        compact(&a, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[3.0]);
        Ok(())
    }

    #[test]
    fn test_compact_out_of_bounds() -> Result<(), Box<dyn std::error::Error>> {
        let a = arange(6)?;
        let mut out = AlignedBuffer::new(6)?;
        let layout = StridedLayout::new(vec![2, 3], vec![3, 1], 1)?;
        let res = compact(&a, &mut out, &layout);
        assert_eq!(
            res,
            Err(KernelError::Layout(LayoutError::OutOfBounds {
                position: 6,
                len: 6
            }))
        );
        Ok(())
    }

    #[test]
    fn test_compact_overflowing_view() -> Result<(), Box<dyn std::error::Error>> {
        // the last position 4 * 2^62 does not fit in isize
        let layout = StridedLayout::new(vec![5], vec![1 << 62], 0)?;
        let a = arange(4)?;
        let mut out = AlignedBuffer::new(5)?;
        let mut dst = arange(4)?;
        let overflow = Err(KernelError::Layout(LayoutError::Overflow));

        assert_eq!(compact(&a, &mut out, &layout), overflow);
        assert_eq!(ewise_setitem(&out, &mut dst, &layout), overflow);
        assert_eq!(scalar_setitem(5, 1.0, &mut out, &layout), overflow);
        Ok(())
    }

    #[test]
    fn test_compact_across_allocators() -> Result<(), Box<dyn std::error::Error>> {
        /// Forwards to the system allocator under a distinct type.
        #[derive(Clone)]
        struct PoolAllocator;

        impl BufferAllocator for PoolAllocator {
            fn alloc(&self, layout: Layout) -> Result<*mut u8, BufferAllocatorError> {
                CpuAllocator.alloc(layout)
            }
            fn dealloc(&self, ptr: *mut u8, layout: Layout) {
                CpuAllocator.dealloc(ptr, layout)
            }
        }

        let a = arange(6)?;
        let mut pooled = AlignedBuffer::new_in(6, PoolAllocator)?;
        let transposed = StridedLayout::new(vec![3, 2], vec![1, 3], 0)?;
        compact(&a, &mut pooled, &transposed)?;
        assert_eq!(pooled.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);

        let mut back = AlignedBuffer::new(6)?;
        ewise_setitem(&pooled, &mut back, &transposed)?;
        assert_eq!(back.as_slice(), a.as_slice());
        Ok(())
    }

    #[test]
    fn test_compact_out_too_small() -> Result<(), Box<dyn std::error::Error>> {
        let a = arange(6)?;
        let mut out = AlignedBuffer::new(5)?;
        let res = compact(&a, &mut out, &StridedLayout::compact(&[2, 3]));
        assert_eq!(
            res,
            Err(KernelError::SizeMismatch {
                expected: 6,
                actual: 5
            })
        );
        Ok(())
    }

    #[test]
    fn test_ewise_setitem_transposed() -> Result<(), Box<dyn std::error::Error>> {
        let a = arange(6)?;
        let mut out = AlignedBuffer::new(6)?;
        let layout = StridedLayout::new(vec![2, 3], vec![1, 2], 0)?;
        ewise_setitem(&a, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        Ok(())
    }

    #[test]
    fn test_ewise_setitem_leaves_other_positions() -> Result<(), Box<dyn std::error::Error>> {
        let a = AlignedBuffer::from_slice(&[7.0, 8.0])?;
        let mut out = AlignedBuffer::new(5)?;
        out.fill(-1.0);
        let layout = StridedLayout::new(vec![2], vec![2], 1)?;
        ewise_setitem(&a, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[-1.0, 7.0, -1.0, 8.0, -1.0]);
        Ok(())
    }

    #[test]
    fn test_scalar_setitem() -> Result<(), Box<dyn std::error::Error>> {
        let mut out = AlignedBuffer::new(9)?;
        // the diagonal of a 3x3 array
        let layout = StridedLayout::new(vec![3], vec![4], 0)?;
        scalar_setitem(3, 1.0, &mut out, &layout)?;
        assert_eq!(
            out.as_slice(),
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        Ok(())
    }

    #[test]
    fn test_scalar_setitem_rank_zero() -> Result<(), Box<dyn std::error::Error>> {
        let mut out = AlignedBuffer::new(3)?;
        let layout = StridedLayout::new(vec![], vec![], 2)?;
        scalar_setitem(1, 4.0, &mut out, &layout)?;
        assert_eq!(out.as_slice(), &[0.0, 0.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_scalar_setitem_count_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let mut out = AlignedBuffer::new(6)?;
        let res = scalar_setitem(5, 1.0, &mut out, &StridedLayout::compact(&[2, 3]));
        assert_eq!(res, Err(KernelError::CountMismatch { count: 5, numel: 6 }));
        Ok(())
    }
}
