use ndtile_array::{AlignedBuffer, BufferAllocator, Scalar, StridedLayout};

use crate::error::{check_len, checked_size, KernelError};

/// Returns the view of the interior of a `B x C x (H+2) x (W+2)` padded source.
///
/// The view has shape `[B*C, H, W]` and skips the one-element border, so
/// [`ewise_setitem`](crate::compact::ewise_setitem) can scatter a compact `B x C x H x W`
/// image into a padded buffer ready for [`grid_sample`].
///
/// # Errors
///
/// Returns `SizeOverflow` if the padded dimensions do not fit in the address space.
pub fn padded_interior(shape: [usize; 4]) -> Result<StridedLayout, KernelError> {
    let [b, c, h, w] = shape;
    let (rows, row) = padded_dims(h, w)?;
    let plane = checked_size(&[rows, row])?;
    let overflow = || KernelError::SizeOverflow(shape.to_vec());
    Ok(StridedLayout {
        shape: vec![checked_size(&[b, c])?, h, w],
        strides: vec![
            isize::try_from(plane).map_err(|_| overflow())?,
            isize::try_from(row).map_err(|_| overflow())?,
            1,
        ],
        offset: row + 1,
    })
}

/// Returns the height and width of the padded source.
fn padded_dims(h: usize, w: usize) -> Result<(usize, usize), KernelError> {
    match (h.checked_add(2), w.checked_add(2)) {
        (Some(rows), Some(row)) => Ok((rows, row)),
        _ => Err(KernelError::SizeOverflow(vec![h, w])),
    }
}

/// Samples a padded image at normalized coordinates with bilinear interpolation.
///
/// # Arguments
///
/// * `a` - The compact source of shape `B x C x (H+2) x (W+2)`, padded by one element on
///   every spatial border.
/// * `grid` - The compact `B x H x W x 2` sampling grid of `(x, y)` pairs in `[-1, 1]`,
///   shared by all the channels of a batch.
/// * `out` - The compact `B x C x H x W` destination. The interpolated values are added
///   to its contents, so it is normally zeroed first.
/// * `shape` - The output shape `[B, C, H, W]`.
///
/// A normalized coordinate `x` maps to the padded column `x * W / 2 + (W + 1) / 2`, so
/// `-1` and `1` land on the centres of the padding columns and `0` on the image centre.
///
/// # Errors
///
/// * `SizeOverflow` if the element counts implied by `shape` do not fit in `usize`.
/// * `SizeMismatch` if a buffer does not hold the number of elements `shape` implies.
///
/// # Panics
///
/// Panics if a coordinate falls outside the padded source. Keeping the grid within
/// `[-1, 1]` guarantees it does not.
pub fn grid_sample<A1: BufferAllocator, A2: BufferAllocator, A3: BufferAllocator>(
    a: &AlignedBuffer<A1>,
    grid: &AlignedBuffer<A2>,
    out: &mut AlignedBuffer<A3>,
    shape: [usize; 4],
) -> Result<(), KernelError> {
    let [b, c, h, w] = shape;
    let hw = checked_size(&[h, w])?;
    let chw = checked_size(&[c, hw])?;
    let (rows, row) = padded_dims(h, w)?;
    let plane = checked_size(&[rows, row])?;

    check_len(a.len(), checked_size(&[b, c, plane])?)?;
    check_len(grid.len(), checked_size(&[b, hw, 2])?)?;
    check_len(out.len(), checked_size(&[b, chw])?)?;

    log::trace!("grid_sample: shape={:?}", shape);

    let (w_f, h_f) = (w as Scalar, h as Scalar);
    let (offset_x, offset_y) = ((w_f + 1.0) / 2.0, (h_f + 1.0) / 2.0);

    let (src, grid) = (a.as_slice(), grid.as_slice());
    for (i, o) in out.as_mut_slice().iter_mut().enumerate() {
        // the grid is indexed by (batch, h, w) and ignores the channel
        let g = ((i / chw) * hw + i % hw) * 2;
        let x = grid[g] * w_f / 2.0 + offset_x;
        let y = grid[g + 1] * h_f / 2.0 + offset_y;

        let (x0, y0) = (x.floor(), y.floor());
        let (dx, dy) = (x - x0, y - y0);

        let base = ((i / hw) * plane) as isize + y0 as isize * row as isize + x0 as isize;
        let top = base as usize;
        let bottom = top + row;

        *o += src[top] * (1.0 - dx) * (1.0 - dy)
            + src[top + 1] * dx * (1.0 - dy)
            + src[bottom] * (1.0 - dx) * dy
            + src[bottom + 1] * dx * dy;
    }

    Ok(())
}
