use ndtile_array::{ALIGNMENT, ELEM_SIZE, TILE};

/// The single-threaded CPU device.
///
/// A binding layer reads these constants to size and tile the arrays it hands over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice;

impl CpuDevice {
    /// The device name.
    pub const NAME: &'static str = "cpu";

    /// The tile side length expected by the tiled matrix multiplication.
    pub const TILE_SIZE: usize = TILE;

    /// The byte alignment of every buffer.
    pub const ALIGNMENT: usize = ALIGNMENT;

    /// The size in bytes of one element.
    pub const ELEM_SIZE: usize = ELEM_SIZE;
}

impl std::fmt::Display for CpuDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::NAME)
    }
}
