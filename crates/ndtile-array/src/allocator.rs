use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

/// An error type for buffer allocation.
#[derive(Debug, Error, PartialEq)]
pub enum BufferAllocatorError {
    /// The requested size and alignment do not form a valid layout.
    #[error("Invalid buffer layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The requested element count does not fit in the address space.
    #[error("Buffer of {0} elements overflows the address space")]
    CapacityOverflow(usize),

    /// The allocator was asked for zero bytes.
    #[error("Zero-sized allocation")]
    ZeroSized,

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,
}

/// A trait for allocating and deallocating the memory behind a buffer.
///
/// # Safety
///
/// `dealloc` is only ever called with a pointer previously returned by `alloc`
/// on the same allocator, together with the layout used for that call.
pub trait BufferAllocator: Clone {
    /// Allocates memory with the given layout.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, BufferAllocatorError>;

    /// Deallocates memory with the given layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// A buffer allocator that uses the system allocator.
#[derive(Clone, Debug, Default)]
pub struct CpuAllocator;

impl BufferAllocator for CpuAllocator {
    /// Allocates memory with the given layout.
    ///
    /// # Arguments
    ///
    /// * `layout` - The layout of the buffer. Its size must be non-zero.
    ///
    /// # Returns
    ///
    /// A non-null pointer to the allocated memory if successful, otherwise an error.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, BufferAllocatorError> {
        if layout.size() == 0 {
            return Err(BufferAllocatorError::ZeroSized);
        }
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            return Err(BufferAllocatorError::NullPointer);
        }
        Ok(ptr)
    }

    /// Deallocates memory with the given layout.
    ///
    /// # Arguments
    ///
    /// * `ptr` - A non-null pointer to the allocated memory.
    /// * `layout` - The layout used to allocate it.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}
