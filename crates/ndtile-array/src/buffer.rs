use std::{alloc::Layout, ptr::NonNull};

use crate::allocator::{BufferAllocator, BufferAllocatorError, CpuAllocator};
use crate::{Scalar, ALIGNMENT, ELEM_SIZE};

/// An owned, flat region of [`Scalar`] elements aligned to [`ALIGNMENT`] bytes.
///
/// The buffer is the only storage type of the engine. Its element count is fixed at
/// construction and the memory is released exactly once, when the buffer is dropped.
/// The buffer carries no shape: every kernel receives the logical view separately.
///
/// Freshly constructed buffers are zero-filled.
///
/// # Examples
///
/// ```rust
/// use ndtile_array::{AlignedBuffer, ALIGNMENT};
///
/// let mut buf = AlignedBuffer::new(16).unwrap();
/// assert_eq!(buf.len(), 16);
/// assert_eq!(buf.ptr_as_int() % ALIGNMENT, 0);
///
/// buf.fill(2.0);
/// assert!(buf.as_slice().iter().all(|&v| v == 2.0));
/// ```
pub struct AlignedBuffer<A: BufferAllocator = CpuAllocator> {
    /// The pointer to the buffer memory.
    ptr: NonNull<Scalar>,
    /// The number of elements in the buffer.
    len: usize,
    /// The layout used to allocate the buffer memory.
    layout: Layout,
    /// The allocator that owns the buffer memory.
    alloc: A,
}

// Safety:
// AlignedBuffer owns its memory exclusively; it is thread safe if the allocator is.
unsafe impl<A: BufferAllocator + Send> Send for AlignedBuffer<A> {}
unsafe impl<A: BufferAllocator + Sync> Sync for AlignedBuffer<A> {}

impl AlignedBuffer<CpuAllocator> {
    /// Creates a zero-filled buffer of `size` elements with the system allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if the size overflows or the allocation fails.
    pub fn new(size: usize) -> Result<Self, BufferAllocatorError> {
        Self::new_in(size, CpuAllocator)
    }

    /// Creates a buffer holding a copy of `data`.
    ///
    /// This is the load path for contiguous host arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn from_slice(data: &[Scalar]) -> Result<Self, BufferAllocatorError> {
        let mut buffer = Self::new(data.len())?;
        buffer.as_mut_slice().copy_from_slice(data);
        Ok(buffer)
    }
}

impl<A: BufferAllocator> AlignedBuffer<A> {
    /// Creates a zero-filled buffer of `size` elements with the given allocator.
    ///
    /// # Arguments
    ///
    /// * `size` - The number of elements.
    /// * `alloc` - The allocator that provides and releases the memory.
    ///
    /// # Errors
    ///
    /// * [`BufferAllocatorError::CapacityOverflow`] if `size * ELEM_SIZE` overflows.
    /// * [`BufferAllocatorError::LayoutError`] if the aligned size exceeds `isize::MAX`.
    /// * [`BufferAllocatorError::NullPointer`] if the allocator fails.
    pub fn new_in(size: usize, alloc: A) -> Result<Self, BufferAllocatorError> {
        let bytes = size
            .checked_mul(ELEM_SIZE)
            .ok_or(BufferAllocatorError::CapacityOverflow(size))?;

        // the global allocator rejects zero-sized layouts
        let layout = Layout::from_size_align(bytes.max(ELEM_SIZE), ALIGNMENT)
            .map_err(BufferAllocatorError::LayoutError)?;

        let raw_ptr = alloc.alloc(layout)?;
        let ptr = NonNull::new(raw_ptr as *mut Scalar).ok_or(BufferAllocatorError::NullPointer)?;

        // SAFETY: ptr is valid for `layout.size()` bytes which covers `size` elements.
        unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0, size) };

        log::debug!(
            "allocated buffer of {} elements ({} bytes) at {:p}",
            size,
            layout.size(),
            ptr
        );

        Ok(Self {
            ptr,
            len: size,
            layout,
            alloc,
        })
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the pointer to the buffer memory.
    #[inline]
    pub fn as_ptr(&self) -> *const Scalar {
        self.ptr.as_ptr() as *const Scalar
    }

    /// Returns the mutable pointer to the buffer memory.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut Scalar {
        self.ptr.as_ptr()
    }

    /// Returns the address of the buffer memory as an integer.
    ///
    /// Binding layers use this together with [`len`](Self::len) to build zero-copy
    /// array views over the buffer.
    #[inline]
    pub fn ptr_as_int(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Returns the layout used to allocate the buffer.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the allocator of the buffer.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    /// Returns the buffer elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Scalar] {
        // SAFETY: ptr is valid and initialized for `len` elements.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Returns the buffer elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        // SAFETY: ptr is valid and initialized for `len` elements and uniquely borrowed.
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Overwrites every element with `value`.
    pub fn fill(&mut self, value: Scalar) {
        self.as_mut_slice().fill(value);
    }

    /// Copies all elements from `src` into the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `src` does not have the same length as the buffer.
    pub fn copy_from_slice(&mut self, src: &[Scalar]) {
        self.as_mut_slice().copy_from_slice(src);
    }

    /// Copies the buffer elements into a new vector.
    pub fn to_vec(&self) -> Vec<Scalar> {
        self.as_slice().to_vec()
    }
}

impl<A: BufferAllocator> Drop for AlignedBuffer<A> {
    fn drop(&mut self) {
        self.alloc
            .dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
    }
}

impl<A: BufferAllocator> std::fmt::Debug for AlignedBuffer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_buffer_create() -> Result<(), BufferAllocatorError> {
        let buffer = AlignedBuffer::new(10)?;
        assert_eq!(buffer.len(), 10);
        assert!(!buffer.is_empty());
        assert!(!buffer.as_ptr().is_null());
        assert_eq!(buffer.as_slice(), &[0.0; 10]);
        assert_eq!(buffer.layout().align(), ALIGNMENT);
        Ok(())
    }

    #[test]
    fn test_buffer_alignment() -> Result<(), BufferAllocatorError> {
        for size in [1, 3, 7, 8, 63, 64, 65, 1000, 4096] {
            let buffer = AlignedBuffer::new(size)?;
            assert_eq!(buffer.ptr_as_int() % ALIGNMENT, 0, "size {size}");
        }
        Ok(())
    }

    #[test]
    fn test_buffer_empty() -> Result<(), BufferAllocatorError> {
        let buffer = AlignedBuffer::new(0)?;
        assert!(buffer.is_empty());
        assert!(buffer.as_slice().is_empty());
        assert_eq!(buffer.ptr_as_int() % ALIGNMENT, 0);
        Ok(())
    }

    #[test]
    fn test_buffer_capacity_overflow() {
        let res = AlignedBuffer::new(usize::MAX);
        assert!(matches!(
            res,
            Err(BufferAllocatorError::CapacityOverflow(usize::MAX))
        ));

        let res = AlignedBuffer::new(usize::MAX / ELEM_SIZE);
        assert!(matches!(res, Err(BufferAllocatorError::LayoutError(_))));
    }

    #[test]
    fn test_buffer_fill() -> Result<(), BufferAllocatorError> {
        let mut buffer = AlignedBuffer::new(5)?;
        buffer.fill(3.5);
        assert_eq!(buffer.as_slice(), &[3.5; 5]);
        buffer.fill(-1.0);
        assert_eq!(buffer.to_vec(), vec![-1.0; 5]);
        Ok(())
    }

    #[test]
    fn test_buffer_from_slice() -> Result<(), BufferAllocatorError> {
        let mut buffer = AlignedBuffer::from_slice(&[1.0, 2.0, 3.0])?;
        assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0]);

        buffer.copy_from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(buffer.to_vec(), vec![4.0, 5.0, 6.0]);

        buffer.as_mut_slice()[1] = 10.0;
        unsafe {
            *buffer.as_mut_ptr().add(2) = 20.0;
        }
        assert_eq!(buffer.as_slice(), &[4.0, 10.0, 20.0]);
        Ok(())
    }

    #[test]
    fn test_buffer_lifecycle() -> Result<(), BufferAllocatorError> {
        /// An allocator that counts the bytes currently allocated.
        #[derive(Clone)]
        struct TestAllocator {
            bytes_allocated: Rc<RefCell<usize>>,
        }

        impl BufferAllocator for TestAllocator {
            fn alloc(&self, layout: Layout) -> Result<*mut u8, BufferAllocatorError> {
                *self.bytes_allocated.borrow_mut() += layout.size();
                CpuAllocator.alloc(layout)
            }
            fn dealloc(&self, ptr: *mut u8, layout: Layout) {
                *self.bytes_allocated.borrow_mut() -= layout.size();
                CpuAllocator.dealloc(ptr, layout)
            }
        }

        let allocator = TestAllocator {
            bytes_allocated: Rc::new(RefCell::new(0)),
        };

        {
            let _buffer = AlignedBuffer::new_in(1024, allocator.clone())?;
            assert_eq!(*allocator.bytes_allocated.borrow(), 1024 * ELEM_SIZE);
        }
        assert_eq!(*allocator.bytes_allocated.borrow(), 0);

        Ok(())
    }

    #[test]
    fn test_buffer_failing_allocator() {
        #[derive(Clone)]
        struct FailingAllocator;

        impl BufferAllocator for FailingAllocator {
            fn alloc(&self, _layout: Layout) -> Result<*mut u8, BufferAllocatorError> {
                Err(BufferAllocatorError::NullPointer)
            }
            fn dealloc(&self, _ptr: *mut u8, _layout: Layout) {
                panic!("nothing was allocated");
            }
        }

        let res = AlignedBuffer::new_in(16, FailingAllocator);
        assert_eq!(res.unwrap_err(), BufferAllocatorError::NullPointer);
    }
}
