#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use ndtile_array as array;

#[doc(inline)]
pub use ndtile_ops as ops;

/// The compute device exposed to binding layers.
pub mod device;
