//! Elementwise and scalar kernels over compact buffers.
//!
//! Every kernel here is one instantiation of the slice kernels in [`crate::kernels`]
//! with a different operator. Inputs and output must hold the same number of elements.
//! Arithmetic edge cases (division by zero, log of a negative number) follow IEEE
//! semantics and produce NaN or infinity rather than errors.

use ndtile_array::{AlignedBuffer, BufferAllocator, Scalar};

use crate::error::KernelError;
use crate::kernels::{indicator, map_binary, map_scalar, map_unary, maximum};

macro_rules! ewise_binary {
    ($(#[$doc:meta])* $name:ident, $op:expr) => {
        $(#[$doc])*
        pub fn $name<A1: BufferAllocator, A2: BufferAllocator, A3: BufferAllocator>(
            a: &AlignedBuffer<A1>,
            b: &AlignedBuffer<A2>,
            out: &mut AlignedBuffer<A3>,
        ) -> Result<(), KernelError> {
            map_binary(a.as_slice(), b.as_slice(), out.as_mut_slice(), $op)
        }
    };
}

macro_rules! ewise_scalar {
    ($(#[$doc:meta])* $name:ident, $op:expr) => {
        $(#[$doc])*
        pub fn $name<A1: BufferAllocator, A2: BufferAllocator>(
            a: &AlignedBuffer<A1>,
            val: Scalar,
            out: &mut AlignedBuffer<A2>,
        ) -> Result<(), KernelError> {
            map_scalar(a.as_slice(), val, out.as_mut_slice(), $op)
        }
    };
}

macro_rules! ewise_unary {
    ($(#[$doc:meta])* $name:ident, $op:expr) => {
        $(#[$doc])*
        pub fn $name<A1: BufferAllocator, A2: BufferAllocator>(
            a: &AlignedBuffer<A1>,
            out: &mut AlignedBuffer<A2>,
        ) -> Result<(), KernelError> {
            map_unary(a.as_slice(), out.as_mut_slice(), $op)
        }
    };
}

ewise_binary!(
    /// Writes `a + b` into `out`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtile_array::AlignedBuffer;
    /// use ndtile_ops::ewise::ewise_add;
    ///
    /// let a = AlignedBuffer::from_slice(&[1.0, 2.0]).unwrap();
    /// let b = AlignedBuffer::from_slice(&[10.0, 20.0]).unwrap();
    /// let mut out = AlignedBuffer::new(2).unwrap();
    /// ewise_add(&a, &b, &mut out).unwrap();
    /// assert_eq!(out.as_slice(), &[11.0, 22.0]);
    /// ```
    ewise_add,
    |x: Scalar, y: Scalar| x + y
);

ewise_scalar!(
    /// Writes `a + val` into `out`.
    scalar_add,
    |x: Scalar, y: Scalar| x + y
);

ewise_binary!(
    /// Writes `a * b` into `out`.
    ewise_mul,
    |x: Scalar, y: Scalar| x * y
);

ewise_scalar!(
    /// Writes `a * val` into `out`.
    scalar_mul,
    |x: Scalar, y: Scalar| x * y
);

ewise_binary!(
    /// Writes `a / b` into `out`.
    ewise_div,
    |x: Scalar, y: Scalar| x / y
);

ewise_scalar!(
    /// Writes `a / val` into `out`.
    scalar_div,
    |x: Scalar, y: Scalar| x / y
);

ewise_scalar!(
    /// Raises every element of `a` to the power `val`.
    scalar_power,
    |x: Scalar, y: Scalar| x.powf(y)
);

ewise_binary!(
    /// Writes the elementwise maximum of `a` and `b` into `out`. NaN propagates.
    ewise_maximum,
    maximum::<Scalar>
);

ewise_scalar!(
    /// Writes the maximum of each element of `a` and `val` into `out`. NaN propagates.
    scalar_maximum,
    maximum::<Scalar>
);

ewise_binary!(
    /// Writes `1.0` where `a == b` and `0.0` elsewhere.
    ewise_eq,
    |x: Scalar, y: Scalar| indicator::<Scalar>(x == y)
);

ewise_scalar!(
    /// Writes `1.0` where `a == val` and `0.0` elsewhere.
    scalar_eq,
    |x: Scalar, y: Scalar| indicator::<Scalar>(x == y)
);

ewise_binary!(
    /// Writes `1.0` where `a >= b` and `0.0` elsewhere.
    ewise_ge,
    |x: Scalar, y: Scalar| indicator::<Scalar>(x >= y)
);

ewise_scalar!(
    /// Writes `1.0` where `a >= val` and `0.0` elsewhere.
    scalar_ge,
    |x: Scalar, y: Scalar| indicator::<Scalar>(x >= y)
);

ewise_unary!(
    /// Writes the natural logarithm of `a` into `out`.
    ewise_log,
    Scalar::ln
);

ewise_unary!(
    /// Writes the exponential of `a` into `out`.
    ewise_exp,
    Scalar::exp
);

ewise_unary!(
    /// Writes the hyperbolic tangent of `a` into `out`.
    ewise_tanh,
    Scalar::tanh
);
