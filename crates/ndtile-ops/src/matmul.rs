//! Matrix multiplication over compact buffers.
//!
//! Two algorithms share one summation order: every output cell accumulates its products
//! with ascending reduction index, starting from zero. The tiled path only changes which
//! cells are worked on together, so both paths produce bit-identical results.

use ndtile_array::{AlignedBuffer, BufferAllocator, Scalar, StridedLayout, TILE, TILE_AREA};

use crate::compact::{compact, ewise_setitem};
use crate::error::{check_len, checked_size, KernelError};

/// Multiplies a compact `m x n` matrix by a compact `n x p` matrix.
///
/// `out` is fully overwritten with the compact `m x p` product.
///
/// # Errors
///
/// * `SizeOverflow` if a product of the dimensions does not fit in `usize`.
/// * `SizeMismatch` if a buffer does not hold the number of elements its dimensions imply.
///
/// # Example
///
/// ```
/// use ndtile_array::AlignedBuffer;
/// use ndtile_ops::matmul::matmul;
///
/// let a = AlignedBuffer::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let b = AlignedBuffer::from_slice(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
/// let mut out = AlignedBuffer::new(4).unwrap();
/// matmul(&a, &b, &mut out, 2, 3, 2).unwrap();
/// assert_eq!(out.as_slice(), &[4.0, 5.0, 10.0, 11.0]);
/// ```
pub fn matmul<A1: BufferAllocator, A2: BufferAllocator, A3: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    b: &AlignedBuffer<A2>,
    out: &mut AlignedBuffer<A3>,
    m: usize,
    n: usize,
    p: usize,
) -> Result<(), KernelError> {
    check_dims(a.len(), b.len(), out.len(), m, n, p)?;

    log::trace!("matmul: m={} n={} p={}", m, n, p);

    let (a, b, out) = (a.as_slice(), b.as_slice(), out.as_mut_slice());
    for i in 0..m {
        for j in 0..p {
            let mut acc = 0.0;
            for k in 0..n {
                acc += a[i * n + k] * b[k * p + j];
            }
            out[i * p + j] = acc;
        }
    }

    Ok(())
}

/// Multiplies two `TILE x TILE` blocks and adds the product to `out`.
///
/// The blocks are compact row-major tiles. The borrow rules already guarantee that `out`
/// does not alias the inputs; re-slicing to the exact tile length lets the optimizer drop
/// bounds checks and vectorize the inner loop.
///
/// # Panics
///
/// Panics if any slice holds fewer than `TILE_AREA` elements.
#[inline]
pub fn aligned_dot(a: &[Scalar], b: &[Scalar], out: &mut [Scalar]) {
    let a = &a[..TILE_AREA];
    let b = &b[..TILE_AREA];
    let out = &mut out[..TILE_AREA];

    for i in 0..TILE {
        for k in 0..TILE {
            let a_ik = a[i * TILE + k];
            for j in 0..TILE {
                out[i * TILE + j] += a_ik * b[k * TILE + j];
            }
        }
    }
}

/// Multiplies two matrices stored as compact 4D arrays of tiles.
///
/// `a` is laid out as `(m/T) x (n/T) x T x T`, `b` as `(n/T) x (p/T) x T x T` and `out`
/// receives `(m/T) x (p/T) x T x T`, with `T` = [`TILE`]. Use [`tile_matrix`] and
/// [`untile_matrix`] to move between this layout and plain row-major matrices.
///
/// # Errors
///
/// * `NotTileMultiple` if `m`, `n` or `p` is not a multiple of [`TILE`].
/// * `SizeOverflow` if a product of the dimensions does not fit in `usize`.
/// * `SizeMismatch` if a buffer does not hold the number of elements its dimensions imply.
pub fn matmul_tiled<A1: BufferAllocator, A2: BufferAllocator, A3: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    b: &AlignedBuffer<A2>,
    out: &mut AlignedBuffer<A3>,
    m: usize,
    n: usize,
    p: usize,
) -> Result<(), KernelError> {
    if m % TILE != 0 || n % TILE != 0 || p % TILE != 0 {
        return Err(KernelError::NotTileMultiple {
            m,
            n,
            p,
            tile: TILE,
        });
    }
    check_dims(a.len(), b.len(), out.len(), m, n, p)?;

    log::trace!("matmul_tiled: m={} n={} p={}", m, n, p);

    out.fill(0.0);

    let (a, b, out) = (a.as_slice(), b.as_slice(), out.as_mut_slice());
    for i in (0..m).step_by(TILE) {
        for j in (0..p).step_by(TILE) {
            // tile (i/T, j/T) starts at (i/T * p/T + j/T) * T * T
            let out_start = i * p + j * TILE;
            let out_tile = &mut out[out_start..out_start + TILE_AREA];
            for k in (0..n).step_by(TILE) {
                let a_start = i * n + k * TILE;
                let b_start = k * p + j * TILE;
                aligned_dot(
                    &a[a_start..a_start + TILE_AREA],
                    &b[b_start..b_start + TILE_AREA],
                    out_tile,
                );
            }
        }
    }

    Ok(())
}

/// Rearranges a compact `rows x cols` matrix into the tiled layout of [`matmul_tiled`].
///
/// # Errors
///
/// Returns an error if the dimensions are not tile multiples or a buffer has the wrong size.
pub fn tile_matrix<A1: BufferAllocator, A2: BufferAllocator>(
    src: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    rows: usize,
    cols: usize,
) -> Result<(), KernelError> {
    let size = checked_size(&[rows, cols])?;
    check_len(src.len(), size)?;
    check_len(out.len(), size)?;
    compact(src, out, &StridedLayout::tiled(rows, cols)?)
}

/// Rearranges a tiled matrix back into a compact `rows x cols` matrix.
///
/// # Errors
///
/// Returns an error if the dimensions are not tile multiples or a buffer has the wrong size.
pub fn untile_matrix<A1: BufferAllocator, A2: BufferAllocator>(
    src: &AlignedBuffer<A1>,
    out: &mut AlignedBuffer<A2>,
    rows: usize,
    cols: usize,
) -> Result<(), KernelError> {
    let size = checked_size(&[rows, cols])?;
    check_len(src.len(), size)?;
    check_len(out.len(), size)?;
    ewise_setitem(src, out, &StridedLayout::tiled(rows, cols)?)
}

fn check_dims(
    a: usize,
    b: usize,
    out: usize,
    m: usize,
    n: usize,
    p: usize,
) -> Result<(), KernelError> {
    check_len(a, checked_size(&[m, n])?)?;
    check_len(b, checked_size(&[n, p])?)?;
    check_len(out, checked_size(&[m, p])?)
}
