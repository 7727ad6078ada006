use num_traits::Float;

use crate::error::{check_len, KernelError};

/// Applies a binary operator to two slices element by element.
///
/// # Arguments
///
/// * `a` - Left operand.
/// * `b` - Right operand, same length as `a`.
/// * `out` - Destination, same length as `a`.
/// * `op` - The operator applied to each pair.
///
/// # Errors
///
/// If the lengths of the slices don't match, a `SizeMismatch` error is returned.
///
/// Example:
/// ```
/// use ndtile_ops::kernels::map_binary;
///
/// let mut out = [0.0; 3];
/// map_binary(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &mut out, |a, b| a * b).unwrap();
/// assert_eq!(out, [4.0, 10.0, 18.0]);
/// ```
pub fn map_binary<T, F>(a: &[T], b: &[T], out: &mut [T], op: F) -> Result<(), KernelError>
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    check_len(b.len(), a.len())?;
    check_len(out.len(), a.len())?;

    out.iter_mut()
        .zip(a.iter().zip(b.iter()))
        .for_each(|(o, (&x, &y))| *o = op(x, y));

    Ok(())
}

/// Applies a binary operator between each element of a slice and a scalar.
///
/// # Errors
///
/// If `out` and `a` have different lengths, a `SizeMismatch` error is returned.
pub fn map_scalar<T, F>(a: &[T], val: T, out: &mut [T], op: F) -> Result<(), KernelError>
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    check_len(out.len(), a.len())?;

    out.iter_mut()
        .zip(a.iter())
        .for_each(|(o, &x)| *o = op(x, val));

    Ok(())
}

/// Applies a unary operator to each element of a slice.
///
/// # Errors
///
/// If `out` and `a` have different lengths, a `SizeMismatch` error is returned.
pub fn map_unary<T, F>(a: &[T], out: &mut [T], op: F) -> Result<(), KernelError>
where
    T: Copy,
    F: Fn(T) -> T,
{
    check_len(out.len(), a.len())?;

    out.iter_mut().zip(a.iter()).for_each(|(o, &x)| *o = op(x));

    Ok(())
}

/// Returns the larger of two values, or NaN if either value is NaN.
///
/// Unlike [`Float::max`], a NaN operand poisons the result, so the outcome of a
/// chain of maxima does not depend on where the NaN sits.
#[inline]
pub fn maximum<T: Float>(a: T, b: T) -> T {
    if a.is_nan() || b.is_nan() {
        T::nan()
    } else if a >= b {
        a
    } else {
        b
    }
}

/// Maps a boolean to `1` or `0` in the float domain.
#[inline]
pub fn indicator<T: Float>(cond: bool) -> T {
    if cond {
        T::one()
    } else {
        T::zero()
    }
}
