#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `ndtile-array` is the storage half of the `ndtile` compute kernel. It provides a flat,
//! aligned buffer of single-precision values and the addressing rules used to interpret that
//! buffer as an N-dimensional array through an externally supplied shape, stride vector and
//! offset.
//!
//! - **AlignedBuffer**: owned storage aligned to [`ALIGNMENT`] bytes
//! - **StridedLayout**: a `(shape, strides, offset)` view and its canonical enumeration order
//! - **BufferAllocator**: trait-based allocation so the memory source can be swapped
//!
//! # Quick Start
//!
//! ```rust
//! use ndtile_array::{AlignedBuffer, StridedLayout};
//!
//! let buf = AlignedBuffer::from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//!
//! // read the 2x3 array column by column
//! let view = StridedLayout::new(vec![3, 2], vec![1, 3], 0).unwrap();
//! view.validate(buf.len()).unwrap();
//!
//! let values: Vec<f32> = view.positions().map(|p| buf.as_slice()[p]).collect();
//! assert_eq!(values, vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
//! ```

/// Allocator module containing the memory management utilities.
///
/// This module provides the [`BufferAllocator`] trait and the default [`CpuAllocator`].
pub mod allocator;

/// Buffer module containing the aligned storage type.
pub mod buffer;

/// Layout module containing strided views and their enumeration order.
pub mod layout;

pub use crate::allocator::{BufferAllocator, BufferAllocatorError, CpuAllocator};
pub use crate::buffer::AlignedBuffer;
pub use crate::layout::{compact_strides, LayoutError, StridedLayout, StridedPositions};

/// The element type of every buffer.
pub type Scalar = f32;

/// The size in bytes of one element.
pub const ELEM_SIZE: usize = std::mem::size_of::<Scalar>();

/// The side length of the square tiles used by the tiled matrix multiplication.
pub const TILE: usize = 8;

/// The number of elements in one tile.
pub const TILE_AREA: usize = TILE * TILE;

/// The byte boundary every buffer is aligned to.
pub const ALIGNMENT: usize = 256;

const _: () = assert!(ALIGNMENT.is_power_of_two());
const _: () = assert!(ALIGNMENT % (TILE * ELEM_SIZE) == 0);
