#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Every kernel borrows its inputs immutably and writes into a caller-provided output
//! buffer; nothing here allocates an output or keeps state between calls.

/// Error types for kernel preconditions.
///
/// Defines [`KernelError`] for the checks done at kernel entry.
pub mod error;

/// Generic slice kernels parameterized by the operator they apply.
pub mod kernels;

/// Data movement between strided views and compact buffers.
///
/// [`compact`](compact::compact), [`ewise_setitem`](compact::ewise_setitem) and
/// [`scalar_setitem`](compact::scalar_setitem) share one canonical enumeration order, so
/// compacting a view and scattering it back is lossless.
pub mod compact;

/// Elementwise and scalar arithmetic, comparison and transcendental kernels.
pub mod ewise;

/// Block reductions.
pub mod reduce;

/// Naive and tiled matrix multiplication.
pub mod matmul;

/// Bilinear grid sampling over padded images.
pub mod grid_sample;

pub use error::KernelError;
